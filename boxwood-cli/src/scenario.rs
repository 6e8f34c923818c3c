//! JSON scenarios: a sequence of tree mutations, style changes and layout
//! passes replayed against one box tree.
//!
//! ```json
//! {
//!   "viewport": { "width": 800, "height": 600 },
//!   "steps": [
//!     { "op": "element", "name": "body", "style": { "display": "block" } },
//!     { "op": "text", "name": "hello", "text": "Hello" },
//!     { "op": "append", "parent": "root", "child": "body" },
//!     { "op": "append", "parent": "body", "child": "hello" },
//!     { "op": "layout" }
//!   ]
//! }
//! ```
//!
//! Boxes are referred to by the names given when they were created; `root`
//! names the tree's root box.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use boxwood_layout::{
    BoxId, BoxTree, BoxType, ElementId, ElementKind, LayoutScheduler, PassReport,
};
use boxwood_style::{ComputedStyle, StyleDifference};
use serde::Deserialize;

use crate::flow::FlowLayout;

/// The name that always refers to the root box.
pub const ROOT_NAME: &str = "root";

/// A scenario file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Scenario {
    /// Viewport the root box is laid out in.
    #[serde(default)]
    pub viewport: Viewport,
    /// Style of the root box; a block by default.
    #[serde(default)]
    pub root_style: Option<ComputedStyle>,
    /// The steps, in order.
    pub steps: Vec<Step>,
}

/// Size of the initial containing block.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Which kind of element a principal box is generated by.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementSpec {
    /// Any element.
    #[default]
    Generic,
    /// `<fieldset>`.
    Fieldset,
    /// An image or other replaced element.
    Replaced,
}

impl From<ElementSpec> for ElementKind {
    fn from(spec: ElementSpec) -> Self {
        match spec {
            ElementSpec::Generic => Self::Generic,
            ElementSpec::Fieldset => Self::Fieldset,
            ElementSpec::Replaced => Self::Replaced,
        }
    }
}

/// One scenario step.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
pub enum Step {
    /// Create a detached box for an element.
    Element {
        /// Name to refer to the box by.
        name: String,
        /// Kind of element.
        #[serde(default)]
        kind: ElementSpec,
        /// Computed style; unspecified properties take their initial value.
        #[serde(default)]
        style: ComputedStyle,
    },
    /// Create a detached text run.
    Text {
        /// Name to refer to the box by.
        name: String,
        /// The text.
        text: String,
    },
    /// Append a detached box to a parent.
    Append {
        /// The parent.
        parent: String,
        /// The new child.
        child: String,
    },
    /// Insert a detached box before a box inside `parent`.
    Insert {
        /// The parent.
        parent: String,
        /// The new child.
        child: String,
        /// Insert before this box.
        before: String,
    },
    /// Detach a box from wherever it currently sits.
    Remove {
        /// The box to detach.
        child: String,
    },
    /// Destroy a box and its subtree.
    Destroy {
        /// The box to destroy.
        target: String,
    },
    /// Replace a box's style.
    SetStyle {
        /// The restyled box.
        target: String,
        /// The new style.
        style: ComputedStyle,
    },
    /// Mark a box dirty.
    Mark {
        /// The box.
        target: String,
        /// Only its position changed.
        #[serde(default)]
        position_only: bool,
    },
    /// Run a layout pass.
    Layout,
}

/// What replaying a scenario produced.
#[derive(Debug)]
pub struct Outcome {
    /// The final tree.
    pub tree: BoxTree,
    /// Names given to boxes, for printing.
    pub names: HashMap<BoxId, String>,
    /// One report per layout step.
    pub passes: Vec<PassReport>,
    /// Style changes and how they were classified.
    pub restyles: Vec<(String, StyleDifference)>,
}

/// Replays steps, keeping the mapping from names to boxes.
struct Replay {
    tree: BoxTree,
    boxes: HashMap<String, BoxId>,
    next_element: u64,
    restyles: Vec<(String, StyleDifference)>,
}

impl Replay {
    fn lookup(&self, name: &str) -> Result<BoxId> {
        if name == ROOT_NAME {
            return Ok(self.tree.root());
        }
        let Some(&id) = self.boxes.get(name) else {
            bail!("unknown box '{name}'");
        };
        if !self.tree.is_live(id) {
            bail!("box '{name}' ({id}) has been destroyed");
        }
        Ok(id)
    }

    fn define(&mut self, name: &str, id: BoxId) -> Result<()> {
        if name == ROOT_NAME || self.boxes.contains_key(name) {
            bail!("box name '{name}' is already in use");
        }
        let _ = self.boxes.insert(name.to_string(), id);
        Ok(())
    }

    fn apply(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Element { name, kind, style } => {
                self.next_element += 1;
                let element = ElementId(self.next_element);
                let id = self
                    .tree
                    .create_box(BoxType::Principal(element, (*kind).into()), style.clone());
                self.define(name, id)?;
            }
            Step::Text { name, text } => {
                let id = self.tree.create_text(text.as_str());
                self.define(name, id)?;
            }
            Step::Append { parent, child } => {
                let (parent, child) = (self.lookup(parent)?, self.lookup(child)?);
                self.tree.append_child(parent, child)?;
            }
            Step::Insert {
                parent,
                child,
                before,
            } => {
                let parent = self.lookup(parent)?;
                let child = self.lookup(child)?;
                let before = self.lookup(before)?;
                self.tree.insert_child(parent, child, Some(before))?;
            }
            Step::Remove { child } => {
                let id = self.lookup(child)?;
                let Some(parent) = self.tree.parent(id) else {
                    bail!("box '{child}' is not attached");
                };
                self.tree.remove_child(parent, id)?;
            }
            Step::Destroy { target } => {
                let id = self.lookup(target)?;
                self.tree.destroy_box(id)?;
            }
            Step::SetStyle { target, style } => {
                let id = self.lookup(target)?;
                let difference = self.tree.set_style(id, style.clone())?;
                self.restyles.push((target.clone(), difference));
            }
            Step::Mark {
                target,
                position_only,
            } => {
                let id = self.lookup(target)?;
                if *position_only {
                    self.tree.mark_needs_position_only_layout(id);
                } else {
                    self.tree.mark_needs_layout(id);
                }
            }
            // Handled by the caller, which owns the scheduler.
            Step::Layout => {}
        }
        Ok(())
    }
}

impl Scenario {
    /// Parse a scenario from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid scenario JSON")
    }

    /// Replay every step. Errors name the failing step.
    pub fn replay(&self, scheduler: &mut LayoutScheduler) -> Result<Outcome> {
        let root_style = self.root_style.clone().unwrap_or_else(ComputedStyle::block);
        let mut replay = Replay {
            tree: BoxTree::new(root_style),
            boxes: HashMap::new(),
            next_element: 0,
            restyles: Vec::new(),
        };
        let mut layout = FlowLayout::new(self.viewport.width, self.viewport.height);
        let mut passes = Vec::new();

        for (index, step) in self.steps.iter().enumerate() {
            log::debug!(target: "boxwood::cli", "step {index}: {step:?}");
            if matches!(step, Step::Layout) {
                passes.push(scheduler.run_pass(&mut replay.tree, &mut layout));
                continue;
            }
            replay
                .apply(step)
                .with_context(|| format!("step {index} failed"))?;
        }

        let names = replay
            .boxes
            .into_iter()
            .map(|(name, id)| (id, name))
            .collect();
        Ok(Outcome {
            tree: replay.tree,
            names,
            passes,
            restyles: replay.restyles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_builds_named_boxes() {
        let scenario = Scenario::from_json(
            r#"{
                "steps": [
                    { "op": "element", "name": "div", "style": { "display": "block" } },
                    { "op": "text", "name": "hello", "text": "Hello" },
                    { "op": "append", "parent": "root", "child": "hello" },
                    { "op": "append", "parent": "root", "child": "div" },
                    { "op": "layout" }
                ]
            }"#,
        )
        .unwrap();

        let outcome = scenario.replay(&mut LayoutScheduler::default()).unwrap();

        assert_eq!(outcome.passes.len(), 1);
        assert!(outcome.tree.check_invariants().is_empty());
        let root = outcome.tree.root();
        // The text was wrapped when the block arrived.
        assert_eq!(outcome.tree.children(root).len(), 2);
        assert!(outcome.names.values().any(|name| name == "div"));
    }

    #[test]
    fn test_unknown_box_names_the_step() {
        let scenario = Scenario::from_json(
            r#"{ "steps": [ { "op": "destroy", "target": "missing" } ] }"#,
        )
        .unwrap();

        let error = scenario
            .replay(&mut LayoutScheduler::default())
            .unwrap_err();
        assert_eq!(error.to_string(), "step 0 failed");
        assert!(format!("{error:#}").contains("unknown box 'missing'"));
    }

    #[test]
    fn test_style_changes_are_recorded() {
        let scenario = Scenario::from_json(
            r#"{
                "steps": [
                    { "op": "element", "name": "abs", "style": { "display": "block", "position": "absolute" } },
                    { "op": "append", "parent": "root", "child": "abs" },
                    { "op": "set-style", "target": "abs", "style": { "display": "block", "position": "absolute", "offsets": { "top": 10 } } }
                ]
            }"#,
        )
        .unwrap();

        let outcome = scenario.replay(&mut LayoutScheduler::default()).unwrap();
        assert_eq!(
            outcome.restyles,
            vec![("abs".to_string(), StyleDifference::SimplifiedLayout)]
        );
    }
}
