use crate::error::FormatError;
use crate::record::{ExceptionInfo, Record};
use crate::serializer::{JsonRecord, JsonSerializer, Serializer};
use chrono::SecondsFormat;
use serde_json::Value;
use std::error::Error;

/// Hook run after the json record is assembled, before finalization.
/// Receives the rendered message, the working mapping and the source
/// record; returns the mapping to keep.
pub type BuildHook = dyn Fn(&str, JsonRecord, &Record) -> JsonRecord + Send + Sync;

/// Last-mile mutation hook run on the mapping just before
/// serialization.
pub type FinalizeHook = dyn Fn(JsonRecord) -> JsonRecord + Send + Sync;

/// Renderer turning attached exception info into the `exc_info` text.
/// A returned error propagates as [`FormatError::Render`].
pub type TraceRenderer =
    dyn Fn(&ExceptionInfo) -> Result<String, Box<dyn Error + Send + Sync>> + Send + Sync;

/// How the record timestamp is written under the `time` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    /// ISO-8601 with microsecond precision and no timezone suffix,
    /// e.g. `2015-09-01T06:09:42.797203`.
    #[default]
    Iso8601,
    /// Hand the timestamp to the backend in its native serde rendering
    /// (RFC 3339 with a `Z` suffix).
    Passthrough,
}

impl TimeFormat {
    fn render(self, timestamp: chrono::DateTime<chrono::Utc>) -> Value {
        match self {
            TimeFormat::Iso8601 => {
                Value::String(timestamp.format("%Y-%m-%dT%H:%M:%S%.6f").to_string())
            }
            TimeFormat::Passthrough => serde_json::to_value(timestamp).unwrap_or_else(|_| {
                Value::String(timestamp.to_rfc3339_opts(SecondsFormat::Micros, true))
            }),
        }
    }
}

/// Built-in record attributes the verbose variant copies into the
/// output before extras are merged, so callers can still override any
/// of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinAttr {
    Filename,
    FuncName,
    LevelName,
    LineNo,
    Module,
    Name,
    PathName,
    Process,
    ProcessName,
    StackInfo,
    Thread,
    ThreadName,
}

impl BuiltinAttr {
    /// The full allow-list used by [`JsonFormatter::verbose`].
    pub const ALL: [BuiltinAttr; 12] = [
        BuiltinAttr::Filename,
        BuiltinAttr::FuncName,
        BuiltinAttr::LevelName,
        BuiltinAttr::LineNo,
        BuiltinAttr::Module,
        BuiltinAttr::Name,
        BuiltinAttr::PathName,
        BuiltinAttr::Process,
        BuiltinAttr::ProcessName,
        BuiltinAttr::StackInfo,
        BuiltinAttr::Thread,
        BuiltinAttr::ThreadName,
    ];

    /// Output key for this attribute.
    pub fn key(self) -> &'static str {
        match self {
            BuiltinAttr::Filename => "filename",
            BuiltinAttr::FuncName => "funcName",
            BuiltinAttr::LevelName => "levelname",
            BuiltinAttr::LineNo => "lineno",
            BuiltinAttr::Module => "module",
            BuiltinAttr::Name => "name",
            BuiltinAttr::PathName => "pathname",
            BuiltinAttr::Process => "process",
            BuiltinAttr::ProcessName => "processName",
            BuiltinAttr::StackInfo => "stack_info",
            BuiltinAttr::Thread => "thread",
            BuiltinAttr::ThreadName => "threadName",
        }
    }

    fn value(self, record: &Record) -> Value {
        fn opt(text: Option<&str>) -> Value {
            text.map(|s| Value::String(s.to_string()))
                .unwrap_or(Value::Null)
        }

        match self {
            BuiltinAttr::Filename => opt(record.filename()),
            BuiltinAttr::FuncName => opt(record.function.as_deref()),
            BuiltinAttr::LevelName => Value::String(record.level.as_str().to_string()),
            BuiltinAttr::LineNo => record.line.map(Value::from).unwrap_or(Value::Null),
            BuiltinAttr::Module => opt(record.module_path.as_deref()),
            BuiltinAttr::Name => Value::String(record.target.clone()),
            BuiltinAttr::PathName => opt(record.file.as_deref()),
            BuiltinAttr::Process => Value::from(record.process_id),
            BuiltinAttr::ProcessName => opt(record.process_name.as_deref()),
            BuiltinAttr::StackInfo => opt(record.stack_info.as_deref()),
            BuiltinAttr::Thread => opt(record.thread_id.as_deref()),
            BuiltinAttr::ThreadName => opt(record.thread_name.as_deref()),
        }
    }
}

/// Formats a [`Record`] into a single line of JSON.
///
/// All configuration is fixed at construction time; `format` builds a
/// fresh mapping per call and shares no mutable state, so one formatter
/// may serve concurrent callers.
///
/// ```
/// use json_log_line::formatter::JsonFormatter;
/// use json_log_line::record::{Level, Record};
///
/// let formatter = JsonFormatter::new();
/// let record = Record::new(Level::Info, "Sign up").with_extra("referral_code", "52d6ce");
/// let line = formatter.format(&record).unwrap();
/// assert!(line.contains(r#""referral_code":"52d6ce""#));
/// ```
pub struct JsonFormatter {
    builtin_attrs: Vec<BuiltinAttr>,
    time_format: TimeFormat,
    serializer: Box<dyn Serializer>,
    build: Option<Box<BuildHook>>,
    finalize: Option<Box<FinalizeHook>>,
    trace_renderer: Option<Box<TraceRenderer>>,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonFormatter {
    /// Minimal variant: message, time and caller extras only.
    pub fn new() -> Self {
        Self {
            builtin_attrs: Vec::new(),
            time_format: TimeFormat::default(),
            serializer: Box::new(JsonSerializer),
            build: None,
            finalize: None,
            trace_renderer: None,
        }
    }

    /// Verbose variant: additionally copies every [`BuiltinAttr`] into
    /// the output.
    pub fn verbose() -> Self {
        Self::new().with_builtin_attrs(&BuiltinAttr::ALL)
    }

    /// Flat variant: like [`JsonFormatter::new`] but arrays and objects
    /// in the output are stringified to their compact JSON text, for
    /// sinks that only index flat documents. Implemented as a provided
    /// build hook, so installing a custom one replaces the flattening.
    pub fn flat() -> Self {
        Self::new().with_build_hook(|_message, record, _source| flatten(record))
    }

    /// Replace the built-in attribute allow-list.
    pub fn with_builtin_attrs(mut self, attrs: &[BuiltinAttr]) -> Self {
        self.builtin_attrs = attrs.to_vec();
        self
    }

    pub fn with_time_format(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }

    /// Swap the serialization backend.
    pub fn with_serializer(mut self, serializer: impl Serializer + 'static) -> Self {
        self.serializer = Box::new(serializer);
        self
    }

    /// Install the post-assembly hook (inject or strip domain fields).
    pub fn with_build_hook(
        mut self,
        hook: impl Fn(&str, JsonRecord, &Record) -> JsonRecord + Send + Sync + 'static,
    ) -> Self {
        self.build = Some(Box::new(hook));
        self
    }

    /// Install the last-mile mutation hook.
    pub fn with_finalize_hook(
        mut self,
        hook: impl Fn(JsonRecord) -> JsonRecord + Send + Sync + 'static,
    ) -> Self {
        self.finalize = Some(Box::new(hook));
        self
    }

    /// Replace the default [`ExceptionInfo::render`] with a custom
    /// trace renderer.
    pub fn with_trace_renderer(
        mut self,
        renderer: impl Fn(&ExceptionInfo) -> Result<String, Box<dyn Error + Send + Sync>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.trace_renderer = Some(Box::new(renderer));
        self
    }

    /// Format one record into a single JSON line, no trailing newline.
    pub fn format(&self, record: &Record) -> Result<String, FormatError> {
        let json_record = self.json_record(record)?;
        let json_record = match &self.build {
            Some(hook) => hook(&record.message, json_record, record),
            None => json_record,
        };
        let json_record = match &self.finalize {
            Some(hook) => hook(json_record),
            None => json_record,
        };
        self.serializer
            .serialize(&json_record)
            .map_err(FormatError::serialization)
    }

    /// Assemble the working mapping. Precedence, later wins: built-ins,
    /// then caller extras, then message / time / exc_info.
    fn json_record(&self, record: &Record) -> Result<JsonRecord, FormatError> {
        let mut out = JsonRecord::new();

        for attr in &self.builtin_attrs {
            out.insert(attr.key().to_string(), attr.value(record));
        }

        for (key, value) in &record.extras {
            out.insert(key.clone(), value.clone());
        }

        out.insert(
            "message".to_string(),
            Value::String(record.message.clone()),
        );

        if !out.contains_key("time") {
            out.insert("time".to_string(), self.time_format.render(record.timestamp));
        }

        if let Some(exception) = &record.exception {
            let text = match &self.trace_renderer {
                Some(renderer) => renderer(exception).map_err(FormatError::render)?,
                None => exception.render(),
            };
            out.insert("exc_info".to_string(), Value::String(text));
        }

        Ok(out)
    }
}

/// Keep JSON scalars, stringify arrays and objects.
fn flatten(record: JsonRecord) -> JsonRecord {
    record
        .into_iter()
        .map(|(key, value)| match value {
            Value::Array(_) | Value::Object(_) => (key, Value::String(value.to_string())),
            scalar => (key, scalar),
        })
        .collect()
}
