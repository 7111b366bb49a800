//! One JSON object per log line.
//!
//! Every record carries `timestamp`, `level`, `message`, `logger_name` (the event target),
//! `source_module`, `source_function` (the innermost span, operations are instrumented so
//! this is the operation name) and `source_line`. Any other event fields go into `fields`.

use std::{error::Error, fmt};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{
    Event, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{
    fmt::{
        FmtContext, FormatEvent, FormatFields,
        format::Writer,
        time::{FormatTime, SystemTime},
    },
    registry::LookupSpan,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLines;

#[derive(Serialize)]
struct Record<'a> {
    timestamp: String,
    level: &'static str,
    message: String,
    logger_name: &'a str,
    source_module: Option<&'a str>,
    source_function: Option<&'static str>,
    source_line: Option<u32>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    fields: Map<String, Value>,
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = match value {
                Value::String(message) => message,
                other => other.to_string(),
            };
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        self.insert(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::from(format!("{value:?}")));
    }
}

impl<S, N> FormatEvent<S, N> for JsonLines
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        let mut timestamp = String::new();
        SystemTime.format_time(&mut Writer::new(&mut timestamp))?;

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let source_function = ctx
            .event_scope()
            .and_then(|mut scope| scope.next())
            .map(|span| span.name());

        let record = Record {
            timestamp,
            level: metadata.level().as_str(),
            message: visitor.message,
            logger_name: metadata.target(),
            source_module: metadata.module_path(),
            source_function,
            source_line: metadata.line(),
            fields: visitor.fields,
        };

        let line = serde_json::to_string(&record).map_err(|_| fmt::Error)?;

        writeln!(writer, "{line}")
    }
}
