use crate::environment::Environment;
use serde_json::Value;
use std::collections::HashMap;
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

pub struct Telemetry<T>
where
    T: SubscriberExt + Send + Sync + 'static,
{
    pub subscriber: T,
}

/// Bunyan JSON logs tagged with the deployment environment.
/// `RUST_LOG` takes precedence over `env_filter`.
pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    environment: Environment,
    sink: Sink,
) -> Telemetry<impl SubscriberExt + Send + Sync + 'static>
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let default_fields = HashMap::from([(
        "environment".to_string(),
        Value::String(environment.to_string()),
    )]);
    let formatting_layer: BunyanFormattingLayer<Sink> =
        BunyanFormattingLayer::with_default_fields(name, sink, default_fields);

    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));

    Telemetry {
        subscriber: Registry::default()
            .with(filter_layer)
            .with(JsonStorageLayer)
            .with(formatting_layer),
    }
}

/// Installs the subscriber globally and routes `log` records into it.
/// Panics if called twice.
pub fn init_subscriber(telemetry: Telemetry<impl SubscriberExt + Send + Sync + 'static>) {
    LogTracer::init().expect("Failed to set logger");
    set_global_default(telemetry.subscriber).expect("Failed to set subscriber");
}
