//! Logging initialization, with optional OpenTelemetry export.

use crate::LoggingSettings;
use tokenfeed_error::{ServerError, ServerErrorKind, TokenfeedResult};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "observability")]
use opentelemetry::{KeyValue, global, trace::TracerProvider};
#[cfg(feature = "observability")]
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};

/// Keeps exporters alive until shutdown.
#[must_use = "dropping the guard early stops span export"]
pub struct ObservabilityGuard {
    #[cfg(feature = "observability")]
    provider: SdkTracerProvider,
}

impl ObservabilityGuard {
    /// Flush and stop exporters.
    pub fn shutdown(self) {
        #[cfg(feature = "observability")]
        if let Err(e) = self.provider.shutdown() {
            tracing::warn!(error = %e, "Failed to shut down tracer provider");
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `settings.level`. With the
/// `observability` feature, spans are also exported to stdout through
/// OpenTelemetry.
pub fn init_observability(settings: &LoggingSettings) -> TokenfeedResult<ObservabilityGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| telemetry_error(e.to_string()))?;

    let fmt_layer = if settings.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .boxed()
    };

    let subscriber = tracing_subscriber::registry().with(env_filter).with(fmt_layer);

    #[cfg(feature = "observability")]
    let (subscriber, provider) = {
        let provider = tracer_provider();
        global::set_tracer_provider(provider.clone());
        let tracer = provider.tracer(env!("CARGO_PKG_NAME"));
        (
            subscriber.with(tracing_opentelemetry::layer().with_tracer(tracer)),
            provider,
        )
    };

    subscriber
        .try_init()
        .map_err(|e| telemetry_error(e.to_string()))?;

    Ok(ObservabilityGuard {
        #[cfg(feature = "observability")]
        provider,
    })
}

#[cfg(feature = "observability")]
fn tracer_provider() -> SdkTracerProvider {
    let resource = Resource::builder()
        .with_service_name(env!("CARGO_PKG_NAME"))
        .with_attributes(vec![KeyValue::new(
            "service.version",
            env!("CARGO_PKG_VERSION"),
        )])
        .build();

    SdkTracerProvider::builder()
        .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
        .with_resource(resource)
        .build()
}

#[track_caller]
fn telemetry_error(message: String) -> ServerError {
    ServerError::new(ServerErrorKind::Telemetry(message))
}
