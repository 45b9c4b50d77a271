use crate::config::LOG_ENV;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Targets that `-v` raises: the library and the binary's own events.
const CRATE_TARGETS: [&str; 2] = ["defdeploy", "deploy_definition"];

/// Install the global subscriber.
///
/// Diagnostics go to stderr so stdout carries only prompts and outcome lines.
/// `DEFDEPLOY_LOG` takes a standard filter directive; otherwise `verbosity`
/// picks the crate level (0 = warn, 1 = info, 2+ = debug).
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}

fn default_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    CRATE_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
