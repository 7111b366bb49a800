use kvfuzz::logging::JsonLines;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{ExporterBuildError, LogExporter, SpanExporter, WithExportConfig as _};
use opentelemetry_sdk::{Resource, logs::SdkLoggerProvider, trace::SdkTracerProvider};
use tracing::{Subscriber, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{
    EnvFilter, Layer, layer::SubscriberExt as _, registry::LookupSpan,
    util::SubscriberInitExt as _,
};

const SERVICE_NAME: &str = "kvfuzz";

// the exporters' own transport logs through tracing too, keep it from feeding back into itself
const QUIET_TARGETS: [&str; 8] = [
    "h2=off",
    "hyper=off",
    "hyper_util=off",
    "tonic=off",
    "tower=off",
    "opentelemetry=off",
    "opentelemetry_sdk=off",
    "opentelemetry_otlp=off",
];

struct Providers {
    logs: SdkLoggerProvider,
    traces: SdkTracerProvider,
}

/// Owns the OTLP pipelines, if there are any. Call [`Telemetry::shutdown`] before exiting so
/// buffered records get flushed.
pub struct Telemetry {
    providers: Option<Providers>,
}

impl Telemetry {
    pub fn shutdown(self) {
        let Some(providers) = self.providers else {
            return;
        };

        if let Err(error) = providers.traces.shutdown() {
            warn!("span export did not shut down cleanly: {error}");
        }

        // last, so the warning above still gets exported
        if let Err(error) = providers.logs.shutdown() {
            warn!("log export did not shut down cleanly: {error}");
        }
    }
}

fn providers(endpoint: &str) -> Result<Providers, ExporterBuildError> {
    let resource = Resource::builder().with_service_name(SERVICE_NAME).build();

    let log_exporter = LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;
    let span_exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    Ok(Providers {
        logs: SdkLoggerProvider::builder()
            .with_batch_exporter(log_exporter)
            .with_resource(resource.clone())
            .build(),
        traces: SdkTracerProvider::builder()
            .with_batch_exporter(span_exporter)
            .with_resource(resource)
            .build(),
    })
}

/// Every event becomes an OTLP log record, every span an OTLP span.
fn export_layer<S>(logs: &SdkLoggerProvider, traces: &SdkTracerProvider) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    OpenTelemetryTracingBridge::new(logs)
        .and_then(tracing_opentelemetry::layer().with_tracer(traces.tracer(SERVICE_NAME)))
}

fn env_filter() -> EnvFilter {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    for directive in QUIET_TARGETS {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    filter
}

/// JSON lines on stdout always, mirrored over OTLP when `endpoint` is set and the exporters
/// could be built. Export failures never reach the caller.
pub fn init(endpoint: Option<&str>) -> Telemetry {
    let (providers, setup_error) = match endpoint.map(providers) {
        Some(Ok(providers)) => (Some(providers), None),
        Some(Err(error)) => (None, Some(error)),
        None => (None, None),
    };

    let otel_layer = providers
        .as_ref()
        .map(|providers| export_layer(&providers.logs, &providers.traces));

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(JsonLines)
                .with_writer(std::io::stdout),
        )
        .with(otel_layer)
        .init();

    match (endpoint, setup_error) {
        (Some(endpoint), Some(error)) => {
            warn!(endpoint, "telemetry export disabled, logging locally only: {error}");
        }
        (Some(endpoint), None) => info!(endpoint, "exporting telemetry over otlp"),
        (None, _) => info!("telemetry export not configured, logging locally only"),
    }

    Telemetry { providers }
}
