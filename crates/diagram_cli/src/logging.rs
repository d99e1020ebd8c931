//! Log output for the CLI.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::GlobalArgs;

/// Installs the global subscriber writing to stderr.
///
/// `--verbose` and `--quiet` override `RUST_LOG`; without either, `RUST_LOG`
/// applies and defaults to warnings.
pub fn init(global: &GlobalArgs) {
    let filter = match level_override(global) {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    // Fails only if a subscriber is already set.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

fn level_override(global: &GlobalArgs) -> Option<&'static str> {
    if global.verbose {
        Some("debug")
    } else if global.quiet {
        Some("error")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReportFormat;

    fn global(quiet: bool, verbose: bool) -> GlobalArgs {
        GlobalArgs {
            quiet,
            verbose,
            config: None,
            diagrams_dir: None,
            format: ReportFormat::Text,
        }
    }

    #[test]
    fn verbose_wins_over_quiet() {
        assert_eq!(level_override(&global(true, true)), Some("debug"));
        assert_eq!(level_override(&global(true, false)), Some("error"));
        assert_eq!(level_override(&global(false, false)), None);
    }
}
