//! `diagrams clean`: find and remove artifacts no page references.
//!
//! Dry run by default. Exits 1 when orphans exist and `--delete` was not given.

use serde::Serialize;

use crate::pipeline::{print_json, show_text, Context};
use crate::{CleanArgs, GlobalArgs, ReportFormat};

#[derive(Debug, Serialize)]
struct CleanReport {
    diagrams_dir: String,
    orphaned: Vec<String>,
    deleted: Vec<String>,
}

/// Runs the `diagrams clean` command.
pub fn run(args: &CleanArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let ctx = Context::load(global)?;
    run_with(&ctx, args, global)
}

pub(crate) fn run_with(
    ctx: &Context,
    args: &CleanArgs,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let reconciler = ctx.reconciler();
    let orphans = reconciler.find_orphaned(&args.docs)?;

    let deleted = if args.delete {
        reconciler.delete_orphans(&orphans)?
    } else {
        Vec::new()
    };

    let report = CleanReport {
        diagrams_dir: ctx.store.root().display().to_string(),
        orphaned: orphans.iter().cloned().collect(),
        deleted,
    };

    match global.format {
        ReportFormat::Json => print_json(&report)?,
        ReportFormat::Text => print_text(&report, args.delete, global),
    }

    if !report.orphaned.is_empty() && !args.delete {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn print_text(report: &CleanReport, delete: bool, global: &GlobalArgs) {
    if report.orphaned.is_empty() {
        if show_text(global) {
            eprintln!("   No orphaned diagrams in {}", report.diagrams_dir);
        }
        return;
    }

    if delete {
        for name in &report.deleted {
            println!("deleted {name}");
        }
        if show_text(global) {
            eprintln!("   Removed {} orphaned diagram(s)", report.deleted.len());
        }
    } else {
        for name in &report.orphaned {
            println!("{name}");
        }
        if show_text(global) {
            eprintln!(
                "   Found {} orphaned diagram(s); rerun with --delete to remove them",
                report.orphaned.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagram_config::ResolveBase;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn global() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
            diagrams_dir: None,
            format: ReportFormat::Text,
        }
    }

    fn site(root: &Path) -> Context {
        let docs = root.join("docs");
        fs::create_dir_all(docs.join("public/diagrams")).unwrap();
        fs::write(docs.join("index.md"), "```mermaid\ngraph TD; A-->B\n```\n").unwrap();
        Context::load_from(&global(), &ResolveBase::at(root)).unwrap()
    }

    fn args(root: &Path, delete: bool) -> CleanArgs {
        CleanArgs {
            delete,
            docs: root.join("docs"),
        }
    }

    fn orphan_path(ctx: &Context) -> PathBuf {
        ctx.store.root().join("mermaid-00000000000000000000000000000000.svg")
    }

    #[test]
    fn clean_store_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = site(dir.path());
        assert_eq!(run_with(&ctx, &args(dir.path(), false), &global()).unwrap(), 0);
    }

    #[test]
    fn dry_run_reports_and_keeps_orphans() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = site(dir.path());
        fs::write(orphan_path(&ctx), b"<svg/>").unwrap();

        assert_eq!(run_with(&ctx, &args(dir.path(), false), &global()).unwrap(), 1);
        assert!(orphan_path(&ctx).exists());
    }

    #[test]
    fn delete_removes_orphans() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = site(dir.path());
        fs::write(orphan_path(&ctx), b"<svg/>").unwrap();

        assert_eq!(run_with(&ctx, &args(dir.path(), true), &global()).unwrap(), 0);
        assert!(!orphan_path(&ctx).exists());
    }

    #[test]
    fn missing_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        let ctx = Context::load_from(&global(), &ResolveBase::at(dir.path())).unwrap();
        let err = run_with(&ctx, &args(dir.path(), false), &global()).unwrap_err();
        assert!(err.to_string().contains("no diagrams directory found"));
    }
}
