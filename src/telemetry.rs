use crate::config::{LogFormat, TelemetryConfig};
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    metrics::{PeriodicReader, SdkMeterProvider},
    propagation::TraceContextPropagator,
    trace::SdkTracerProvider,
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE: &str = "fcm-adapter";

/// Keeps the OpenTelemetry providers alive until [`TelemetryGuard::shutdown`].
#[derive(Debug, Default)]
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    meter_provider: Option<SdkMeterProvider>,
}

impl TelemetryGuard {
    /// Flushes remaining spans and metrics.
    pub fn shutdown(self) {
        if let Some(provider) = self.tracer_provider
            && let Err(e) = provider.shutdown()
        {
            tracing::warn!(error = %e, "Failed to shut down tracer provider");
        }
        if let Some(provider) = self.meter_provider
            && let Err(e) = provider.shutdown()
        {
            tracing::warn!(error = %e, "Failed to shut down meter provider");
        }
    }
}

/// Installs the global tracing subscriber and, when an OTLP endpoint is
/// configured, the OpenTelemetry trace and metric pipelines.
///
/// # Errors
/// Returns an error if a log directive is invalid or an OTLP exporter cannot be built.
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    let mut guard = TelemetryGuard::default();

    // OTLP export is opt-in; without an endpoint only the fmt layer is installed.
    let otel_layer = match &config.otlp_endpoint {
        Some(endpoint) => {
            let (tracer_provider, meter_provider) = otlp_providers(endpoint)?;
            let tracer = opentelemetry::trace::TracerProvider::tracer(&tracer_provider, SERVICE);
            guard.tracer_provider = Some(tracer_provider);
            guard.meter_provider = Some(meter_provider);
            Some(OpenTelemetryLayer::new(tracer))
        }
        None => None,
    };

    let registry = Registry::default().with(log_filter(&config.log_level)?).with(otel_layer);
    match config.log_format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init()?,
    }

    Ok(guard)
}

/// `RUST_LOG` wins over the configured level. HTTP client internals are capped at `warn`.
fn log_filter(default_level: &str) -> anyhow::Result<EnvFilter> {
    Ok(EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level))
        .add_directive("hyper=warn".parse()?)
        .add_directive("h2=warn".parse()?)
        .add_directive("reqwest=warn".parse()?))
}

/// Builds the trace and metric providers exporting to `endpoint` and registers them globally.
fn otlp_providers(endpoint: &str) -> anyhow::Result<(SdkTracerProvider, SdkMeterProvider)> {
    let resource = Resource::builder()
        .with_attributes(vec![
            KeyValue::new(SERVICE_NAME, SERVICE),
            KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
        ])
        .build();

    global::set_text_map_propagator(TraceContextPropagator::new());

    let span_exporter =
        opentelemetry_otlp::SpanExporter::builder().with_http().with_endpoint(format!("{endpoint}/v1/traces")).build()?;
    let tracer_provider =
        SdkTracerProvider::builder().with_resource(resource.clone()).with_batch_exporter(span_exporter).build();
    global::set_tracer_provider(tracer_provider.clone());

    let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_http()
        .with_endpoint(format!("{endpoint}/v1/metrics"))
        .build()?;
    let meter_provider = SdkMeterProvider::builder()
        .with_resource(resource)
        .with_reader(PeriodicReader::builder(metric_exporter).build())
        .build();
    global::set_meter_provider(meter_provider.clone());

    Ok((tracer_provider, meter_provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_accepts_level_and_directives() {
        assert!(log_filter("info").is_ok());
        assert!(log_filter("fcm_adapter=debug,warn").is_ok());
    }
}
