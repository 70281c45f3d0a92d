//! Log output for hosts that do not install their own subscriber.
//!
//! Dumps are usually printed to stdout, so the subscriber writes to stderr to
//! keep the two apart.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "introspect_core=debug";
static INSTALLED: OnceLock<()> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum TelemetryInitError {
    #[error("invalid tracing filter `{directive}`: {source}")]
    InvalidFilter {
        directive: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("another tracing subscriber is already installed: {0}")]
    SetGlobalDefault(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Installs a compact stderr subscriber filtered by `RUST_LOG`, or by
/// `introspect_core=debug` when that is unset or unparsable. Later calls are
/// no-ops.
pub fn init_tracing() -> Result<(), TelemetryInitError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_filter(DEFAULT_FILTER)?,
    };
    install(filter)
}

/// Same as [`init_tracing`] with an explicit filter directive, ignoring
/// `RUST_LOG`.
pub fn init_tracing_with(directive: &str) -> Result<(), TelemetryInitError> {
    install(parse_filter(directive)?)
}

fn parse_filter(directive: &str) -> Result<EnvFilter, TelemetryInitError> {
    EnvFilter::try_new(directive).map_err(|source| TelemetryInitError::InvalidFilter {
        directive: directive.to_string(),
        source,
    })
}

fn install(filter: EnvFilter) -> Result<(), TelemetryInitError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = INSTALLED.set(());
    Ok(())
}
