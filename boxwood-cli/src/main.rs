//! Boxwood CLI
//!
//! Replays a JSON scenario of box tree mutations, style changes and layout
//! passes, then prints the resulting tree.
//!
//! Run with: cargo run --bin boxwood -- scenarios/sample.json

mod flow;
mod scenario;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use boxwood_layout::{
    BoxId, BoxTree, DescendantIndex, DumpEntry, DumpOptions, LayoutScheduler, SchedulerConfig,
    ScrollInfoBatch,
};
use clap::Parser;
use owo_colors::OwoColorize;

use scenario::Scenario;

/// Boxwood: replay box tree scenarios and inspect the result
#[derive(Parser, Debug)]
#[command(name = "boxwood")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Replay a scenario and print the final box tree
    boxwood scenarios/sample.json

    # Also print geometry and overflow rectangles
    boxwood --geometry --overflow scenarios/sample.json

    # Print the positioned and percent-height descendant indices
    boxwood --indices scenarios/sample.json

    # Lay out as paginated content, with debug logging
    boxwood --paginated -v scenarios/sample.json
"#)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Path to a JSON scenario file
    #[arg(value_name = "SCENARIO")]
    scenario: PathBuf,

    /// Lay out as paginated content
    #[arg(long)]
    paginated: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Log layout decisions (debug level)
    #[arg(short, long)]
    verbose: bool,

    /// Print the positioned and percent-height descendant indices
    #[arg(long)]
    indices: bool,

    /// Print each box's content rectangle
    #[arg(long)]
    geometry: bool,

    /// Print layout and visual overflow rectangles
    #[arg(long)]
    overflow: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let json = fs::read_to_string(&cli.scenario)
        .with_context(|| format!("failed to read {}", cli.scenario.display()))?;
    let scenario = Scenario::from_json(&json)
        .with_context(|| format!("failed to parse {}", cli.scenario.display()))?;

    let scroll_updates = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&scroll_updates);
    let batch = ScrollInfoBatch::new(move |id: BoxId| sink.borrow_mut().push(id));
    let config = SchedulerConfig {
        paginated: cli.paginated,
    };
    let mut scheduler = LayoutScheduler::new(config, batch);

    let outcome = scenario.replay(&mut scheduler)?;
    let printer = Printer {
        color: !cli.no_color,
        names: &outcome.names,
    };

    println!("{}", printer.heading("Box Tree"));
    let options = DumpOptions {
        geometry: cli.geometry,
        overflow: cli.overflow,
    };
    for entry in outcome.tree.dump_entries(outcome.tree.root(), options) {
        printer.print_entry(&entry);
    }

    if !outcome.passes.is_empty() {
        println!("\n{}", printer.heading("Layout Passes"));
        for (index, report) in outcome.passes.iter().enumerate() {
            println!(
                "  pass {}: {} full, {} position-only, {} escalated, {} overflow-only, {} reclaimed",
                index + 1,
                report.full,
                report.position_only,
                report.escalated,
                report.overflow_only,
                report.reclaimed
            );
        }
    }

    if !outcome.restyles.is_empty() {
        println!("\n{}", printer.heading("Style Changes"));
        for (name, difference) in &outcome.restyles {
            println!("  {name}: {difference:?}");
        }
    }

    let updates = scroll_updates.borrow();
    if !updates.is_empty() {
        println!("\n{}", printer.heading("Scroll Updates"));
        for &id in updates.iter() {
            println!("  {}", printer.box_name(id));
        }
    }

    if cli.indices {
        println!("\n{}", printer.heading("Positioned Descendants"));
        printer.print_index(&outcome.tree, outcome.tree.positioned_index());
        println!("\n{}", printer.heading("Percent-Height Descendants"));
        printer.print_index(&outcome.tree, outcome.tree.percent_height_index());
    }

    let violations = outcome.tree.check_invariants();
    println!("\n{}", printer.heading("Invariants"));
    if violations.is_empty() {
        println!("  {}", printer.paint("ok", Paint::Good));
    } else {
        for violation in &violations {
            println!("  - {}", printer.paint(&violation.to_string(), Paint::Bad));
        }
        anyhow::bail!("{} invariant violation(s)", violations.len());
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Paint {
    Heading,
    Id,
    Label,
    Anonymous,
    Text,
    Marker,
    Detail,
    Good,
    Bad,
}

/// Renders scenario output, optionally colored.
struct Printer<'a> {
    color: bool,
    names: &'a HashMap<BoxId, String>,
}

impl Printer<'_> {
    fn paint(&self, text: &str, paint: Paint) -> String {
        if !self.color {
            return text.to_string();
        }
        match paint {
            Paint::Heading => text.bold().to_string(),
            Paint::Id | Paint::Detail => text.dimmed().to_string(),
            Paint::Label => text.cyan().to_string(),
            Paint::Anonymous => text.yellow().to_string(),
            Paint::Text => text.green().to_string(),
            Paint::Marker => text.magenta().to_string(),
            Paint::Good => text.green().bold().to_string(),
            Paint::Bad => text.red().bold().to_string(),
        }
    }

    fn heading(&self, title: &str) -> String {
        self.paint(&format!("=== {title} ==="), Paint::Heading)
    }

    /// `#3 (body)` for named boxes, `#3` otherwise.
    fn box_name(&self, id: BoxId) -> String {
        self.names
            .get(&id)
            .map_or_else(|| id.to_string(), |name| format!("{id} ({name})"))
    }

    fn print_entry(&self, entry: &DumpEntry) {
        let indent = "  ".repeat(entry.depth);
        let label_paint = if entry.is_anonymous() {
            Paint::Anonymous
        } else if entry.label.starts_with("Text(") {
            Paint::Text
        } else {
            Paint::Label
        };
        let mut line = format!(
            "{indent}[{} {}]",
            self.paint(&entry.id.to_string(), Paint::Id),
            self.paint(&entry.label, label_paint)
        );
        for marker in &entry.markers {
            line.push(' ');
            line.push_str(&self.paint(marker, Paint::Marker));
        }
        if let Some(name) = self.names.get(&entry.id) {
            line.push_str(&format!("  ({name})"));
        }
        println!("{line}");
        for detail in &entry.details {
            println!("{indent}  {}", self.paint(detail, Paint::Detail));
        }
    }

    fn print_index(&self, tree: &BoxTree, index: &DescendantIndex) {
        let mut memberships = index.memberships();
        if memberships.is_empty() {
            println!("  (empty)");
            return;
        }
        memberships.sort_unstable();
        let mut current = None;
        for (container, descendant) in memberships {
            if current != Some(container) {
                current = Some(container);
                println!("  {}:", self.box_name(container));
            }
            let state = tree.layout_state(descendant);
            println!("    {} [{state}]", self.box_name(descendant));
        }
    }
}
