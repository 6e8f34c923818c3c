//! Text rendering of the box tree.
//!
//! One line per box, indented two spaces per level:
//!
//! ```text
//! [#0 Viewport] block-children
//!   [#3 Anonymous(Block)] inline-children anonymous
//!     [#1 Text("a")]
//!   [#2 <1>] inline-children continuation
//! ```

use crate::box_model::Rect;
use crate::tree::{BoxId, BoxTree, BoxType, ContainerKind, LayoutBox, PseudoElement};

/// What [`BoxTree::dump_with`] prints besides the structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpOptions {
    /// Print each box's content rectangle.
    pub geometry: bool,
    /// Print each box's layout and visual overflow when it has any.
    pub overflow: bool,
}

/// One rendered box.
#[derive(Debug, Clone, PartialEq)]
pub struct DumpEntry {
    /// Nesting level below the dumped root.
    pub depth: usize,
    /// The box.
    pub id: BoxId,
    /// Box type, e.g. `Anonymous(Block)` or `Text("a")`.
    pub label: String,
    /// Children state and lifecycle markers, in print order.
    pub markers: Vec<&'static str>,
    /// Optional geometry and overflow lines.
    pub details: Vec<String>,
}

impl DumpEntry {
    /// Whether the box was generated by the tree rather than by content.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.markers.contains(&"anonymous")
    }
}

const TEXT_PREVIEW: usize = 30;

fn type_label(box_type: &BoxType) -> String {
    match box_type {
        BoxType::Viewport => "Viewport".to_string(),
        BoxType::Principal(element, kind) => format!("<{}> {kind:?}", element.0),
        BoxType::Text(text) => {
            let preview: String = text.chars().take(TEXT_PREVIEW).collect();
            let suffix = if text.chars().count() > TEXT_PREVIEW {
                "..."
            } else {
                ""
            };
            format!("Text(\"{}{suffix}\")", preview.replace('\n', "\\n"))
        }
        BoxType::ListMarker => "ListMarker".to_string(),
        BoxType::Pseudo(pseudo, element) => {
            let name = match pseudo {
                PseudoElement::Before => "::before",
                PseudoElement::After => "::after",
                PseudoElement::FirstLetter => "::first-letter",
            };
            format!("<{}>{name}", element.0)
        }
        BoxType::Anonymous(kind) => format!("Anonymous({kind:?})"),
    }
}

fn markers(layout_box: &LayoutBox) -> Vec<&'static str> {
    let mut markers = Vec::new();
    match layout_box.container_kind() {
        ContainerKind::Leaf => {}
        _ if layout_box.children().is_empty() => {}
        _ if layout_box.children_inline() => markers.push("inline-children"),
        _ => markers.push("block-children"),
    }
    if layout_box.is_anonymous() {
        markers.push("anonymous");
    }
    if layout_box.is_in_continuation_chain() {
        markers.push("continuation");
    }
    if layout_box.is_floating() {
        markers.push("float");
    } else if layout_box.is_out_of_flow() {
        markers.push("out-of-flow");
    }
    if layout_box.is_being_destroyed() {
        markers.push("destroying");
    }
    markers
}

fn format_rect(rect: &Rect) -> String {
    format!(
        "x={:.1} y={:.1} w={:.1} h={:.1}",
        rect.x, rect.y, rect.width, rect.height
    )
}

impl BoxTree {
    /// Structure of the subtree at `root`, without geometry.
    #[must_use]
    pub fn dump(&self, root: BoxId) -> String {
        self.dump_with(root, DumpOptions::default())
    }

    /// Render the subtree at `root` as indented text.
    #[must_use]
    pub fn dump_with(&self, root: BoxId, options: DumpOptions) -> String {
        let mut out = String::new();
        for entry in self.dump_entries(root, options) {
            let indent = "  ".repeat(entry.depth);
            out.push_str(&format!("{indent}[{} {}]", entry.id, entry.label));
            for marker in &entry.markers {
                out.push(' ');
                out.push_str(marker);
            }
            out.push('\n');
            for detail in &entry.details {
                out.push_str(&format!("{indent}  {detail}\n"));
            }
        }
        out
    }

    /// The entries [`Self::dump_with`] renders, in document order.
    #[must_use]
    pub fn dump_entries(&self, root: BoxId, options: DumpOptions) -> Vec<DumpEntry> {
        let mut entries = Vec::new();
        let mut stack = vec![(root, 0)];
        while let Some((id, depth)) = stack.pop() {
            let Some(layout_box) = self.get(id) else {
                continue;
            };
            let mut details = Vec::new();
            if options.geometry {
                details.push(format!(
                    "content: {}",
                    format_rect(&layout_box.dimensions.content)
                ));
            }
            if options.overflow
                && let Some(record) = layout_box.overflow()
            {
                details.push(format!("layout-overflow: {}", format_rect(&record.layout)));
                details.push(format!("visual-overflow: {}", format_rect(&record.visual)));
            }
            entries.push(DumpEntry {
                depth,
                id,
                label: type_label(layout_box.box_type()),
                markers: markers(layout_box),
                details,
            });
            for &child in layout_box.children().iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        entries
    }
}
