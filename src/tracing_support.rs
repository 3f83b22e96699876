//! Assembles [`Record`]s from `tracing` events.
//!
//! This is input assembly only: no layer is installed here, no
//! filtering happens and no I/O is performed. A host subscriber calls
//! [`Record::from_event`] from its own `on_event` and hands the result
//! to a [`crate::formatter::JsonFormatter`].

use crate::record::{Extras, Level, Record};
use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::Event;

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warning,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Field visitor that routes the `message` field out of the extras map.
pub struct FieldVisitor<'a> {
    pub extras: &'a mut Extras,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.extras
                .insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.extras.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.extras.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.extras.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.extras.insert(field.name().to_string(), Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.extras.insert(
                field.name().to_string(),
                Value::String(format!("{:?}", value)),
            );
        }
    }
}

impl Record {
    /// Assemble a record from a `tracing` event.
    ///
    /// Event metadata supplies level, target and source location; the
    /// `message` field becomes the record message and every other field
    /// lands in extras. The current timestamp and process/thread
    /// identity are captured here, like any record built through
    /// [`Record::new`].
    pub fn from_event(event: &Event<'_>) -> Self {
        let mut extras = Extras::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor {
            extras: &mut extras,
            message: &mut message,
        };
        event.record(&mut visitor);

        let meta = event.metadata();
        let mut record = Record::new(Level::from(*meta.level()), message.unwrap_or_default())
            .with_target(meta.target())
            .with_extras(extras);
        if let Some(module_path) = meta.module_path() {
            record = record.with_module_path(module_path);
        }
        if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
            record = record.with_source(file, line);
        }
        record
    }
}
