//! `diagrams check-missing`: find diagrams that have no rendered artifact.

use serde::Serialize;

use diagram_cache::ExpectedArtifacts;
use diagram_common::{ArtifactKey, DiagramType};

use crate::pipeline::{print_json, show_text, Context};
use crate::{CheckArgs, GlobalArgs, ReportFormat};

#[derive(Debug, Serialize)]
struct Finding {
    key: String,
    diagram_type: DiagramType,
    sources: Vec<String>,
}

impl Finding {
    fn new(key: &ArtifactKey, expected: &ExpectedArtifacts) -> Self {
        Self {
            key: key.file_name(),
            diagram_type: key.diagram_type(),
            sources: expected.sources(key).iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CheckReport {
    diagrams_dir: String,
    expected: usize,
    missing: Vec<Finding>,
    pending: Vec<Finding>,
}

/// Runs the `diagrams check-missing` command.
///
/// Returns exit code 1 if any expected artifact is missing, or with
/// `--strict`, still a placeholder.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let ctx = Context::load(global)?;
    run_with(&ctx, args, global)
}

pub(crate) fn run_with(
    ctx: &Context,
    args: &CheckArgs,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let reconciler = ctx.reconciler();
    let expected = reconciler.expected(&args.docs)?;
    let listing = ctx.store.list()?;

    let missing = expected.missing_from(&listing);
    let pending = reconciler.pending_in(&expected)?;

    let report = CheckReport {
        diagrams_dir: ctx.store.root().display().to_string(),
        expected: expected.len(),
        missing: missing.iter().map(|k| Finding::new(k, &expected)).collect(),
        pending: pending.iter().map(|k| Finding::new(k, &expected)).collect(),
    };

    match global.format {
        ReportFormat::Json => print_json(&report)?,
        ReportFormat::Text => print_text(&report, args.strict, global),
    }

    let failed = !report.missing.is_empty() || (args.strict && !report.pending.is_empty());
    Ok(if failed { 1 } else { 0 })
}

fn print_text(report: &CheckReport, strict: bool, global: &GlobalArgs) {
    for finding in &report.missing {
        println!("missing {}{}", finding.key, from_clause(&finding.sources));
    }
    if strict {
        for finding in &report.pending {
            println!("pending {}{}", finding.key, from_clause(&finding.sources));
        }
    }

    if show_text(global) {
        eprintln!(
            "   Checked {} diagram(s): {} missing, {} pending",
            report.expected,
            report.missing.len(),
            report.pending.len()
        );
    }
}

fn from_clause(sources: &[String]) -> String {
    if sources.is_empty() {
        String::new()
    } else {
        format!(" (from {})", sources.join(", "))
    }
}
