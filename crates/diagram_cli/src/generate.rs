//! `diagrams generate`: render every diagram the documentation tree needs.
//!
//! Runs a full resolver pass over the tree and waits for the renders, so a
//! following `check-missing` finds nothing missing unless a render failed.

use std::sync::Arc;

use serde::Serialize;

use diagram_cache::{FragmentOptions, KrokiRenderer, Renderer, Resolver};

use crate::pipeline::{print_json, show_text, Context};
use crate::{GenerateArgs, GlobalArgs, ReportFormat};

#[derive(Debug, Serialize)]
struct GenerateReport {
    diagrams_dir: String,
    diagrams: usize,
    rendered: usize,
    failed: usize,
    discarded: usize,
}

/// Runs the `diagrams generate` command.
///
/// Returns exit code 1 if any render failed.
pub fn run(args: &GenerateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let ctx = Context::load(global)?;
    let renderer = Arc::new(KrokiRenderer::from_config(&ctx.config.render));
    run_with(&ctx, renderer, args, global)
}

pub(crate) fn run_with(
    ctx: &Context,
    renderer: Arc<dyn Renderer>,
    args: &GenerateArgs,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let occurrences = ctx.extractor.scan_tree(&args.docs)?;
    if show_text(global) {
        eprintln!(
            "   Resolving {} diagram(s) into {}",
            occurrences.len(),
            ctx.store.root().display()
        );
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let resolver = Resolver::new(
        ctx.store.clone(),
        renderer,
        FragmentOptions::from(&ctx.config.store),
        runtime.handle().clone(),
    )?
    .with_extractor(ctx.extractor.clone());
    resolver.resolve_all(&occurrences);
    let summary = runtime.block_on(resolver.wait_idle());

    let report = GenerateReport {
        diagrams_dir: ctx.store.root().display().to_string(),
        diagrams: occurrences.len(),
        rendered: summary.rendered,
        failed: summary.failed,
        discarded: summary.discarded,
    };

    match global.format {
        ReportFormat::Json => print_json(&report)?,
        ReportFormat::Text => {
            if show_text(global) {
                eprintln!(
                    "   Result: {} rendered, {} failed, {} up to date",
                    report.rendered,
                    report.failed,
                    report
                        .diagrams
                        .saturating_sub(report.rendered + report.failed + report.discarded)
                );
            }
        }
    }

    Ok(if report.failed > 0 { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagram_cache::RenderError;
    use diagram_common::DiagramType;
    use diagram_config::ResolveBase;
    use std::fs;
    use std::path::Path;

    struct StaticRenderer;

    impl Renderer for StaticRenderer {
        fn render(&self, _ty: DiagramType, source: &str) -> Result<String, RenderError> {
            Ok(format!("<svg>{source}</svg>"))
        }
    }

    struct DownRenderer;

    impl Renderer for DownRenderer {
        fn render(&self, _ty: DiagramType, _source: &str) -> Result<String, RenderError> {
            Err(RenderError::Transport("connection refused".to_string()))
        }
    }

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
        fs::create_dir_all(&docs).unwrap();
        fs::write(
            docs.join("index.md"),
            "```mermaid\ngraph TD; A-->B\n```\n\n```d2\na -> b\n```\n",
        )
        .unwrap();
        Context::load_from(&global(), &ResolveBase::at(root)).unwrap()
    }

    fn args(root: &Path) -> GenerateArgs {
        GenerateArgs {
            docs: root.join("docs"),
        }
    }

    #[test]
    fn generate_then_check_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = site(dir.path());

        let code = run_with(&ctx, Arc::new(StaticRenderer), &args(dir.path()), &global()).unwrap();
        assert_eq!(code, 0);
        assert_eq!(ctx.store.list().unwrap().len(), 2);

        let missing = ctx.reconciler().find_missing(&dir.path().join("docs")).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn failed_render_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = site(dir.path());
        let code = run_with(&ctx, Arc::new(DownRenderer), &args(dir.path()), &global()).unwrap();
        assert_eq!(code, 1);
        assert_eq!(
            ctx.reconciler()
                .find_pending(&dir.path().join("docs"))
                .unwrap()
                .len(),
            2
        );
    }
}
