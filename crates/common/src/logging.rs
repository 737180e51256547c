use crate::config::{Environment, LogLevel};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    layer::{Layered, SubscriberExt},
    util::{SubscriberInitExt, TryInitError},
};

/// Subscriber stack below the exporter and formatter layers.
pub(crate) type FilteredRegistry = Layered<EnvFilter, Registry>;

pub(crate) type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// `RUST_LOG` when set, otherwise the configured level.
fn level_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

fn fmt_layer(environment: Environment) -> BoxedLayer {
    match environment {
        Environment::Production => tracing_subscriber::fmt::layer()
            .json()
            .with_level(true)
            .boxed(),
        Environment::Development => tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(true)
            .boxed(),
    }
}

/// Install the global subscriber: level filter, `otel`, then the
/// environment's log format.
pub(crate) fn install_subscriber(
    level: LogLevel,
    environment: Environment,
    otel: BoxedLayer,
) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(level_filter(level))
        .with(vec![otel, fmt_layer(environment)])
        .try_init()
}

/// Pretty logs in development, JSON in production.
///
/// Spans are also handed to whatever global tracer provider is installed, so
/// nothing is exported unless telemetry was set up separately.
pub fn setup_logging(level: LogLevel, environment: Environment) {
    let otel = tracing_opentelemetry::layer().boxed();

    if let Err(e) = install_subscriber(level, environment, otel) {
        tracing::debug!(error = %e, "Global subscriber already installed");
    }
}
