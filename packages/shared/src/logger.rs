//! Logging setup utilities for the collaboration gateway and client.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose logs are enabled at the default level.
const WORKSPACE_TARGETS: [&str; 3] = ["atelier_shared", "atelier_server", "atelier_client"];

/// Build the default filter directive used when `RUST_LOG` is not set.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "atelier-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
pub fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    let binary_target = binary_name.replace('-', "_");
    let mut directives: Vec<String> = WORKSPACE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, default_log_level))
        .collect();
    if !WORKSPACE_TARGETS.contains(&binary_target.as_str()) {
        directives.push(format!("{}={}", binary_target, default_log_level));
    }
    directives.push(format!("tower_http={}", default_log_level));
    directives.join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Examples
///
/// ```no_run
/// use atelier_shared::logger::setup_logger;
///
/// setup_logger("atelier-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
