//! Tracing setup for the `agentc` binary.
//!
//! Log lines always go to stderr. Under `--json`, stdout carries the command's
//! JSON result and stderr carries JSON log lines, so each stream parses on its
//! own.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is unset: agentc crates at `level`,
/// dependencies at warn.
fn default_directives(level: Level) -> String {
    format!("warn,agentc_core={level},agentc={level}")
}

/// Install the global subscriber. Later calls leave the first one in place.
pub fn init_tracing(json: bool, level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = installed {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}
