//! Telemetry initialization.
//!
//! Controlled by two environment variables:
//! - `RUST_LOG` → standard `EnvFilter` directives (default `warn`)
//! - `BLAMEFMT_LOG=json` → JSON events to stderr instead of compact text

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// Default directive when `RUST_LOG` is unset or unparsable.
const DEFAULT_FILTER: &str = "warn";

/// Output format for log events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Install the global subscriber. `quiet` raises the default level to
/// `error` when `RUST_LOG` is unset.
pub fn init(quiet: bool) {
    let default = if quiet { "error" } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let format = LogFormat::from_env_value(std::env::var("BLAMEFMT_LOG").ok().as_deref());

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .without_time()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("warning: logging already initialized: {e}");
    }
}
