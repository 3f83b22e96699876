use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Caller-supplied structured fields attached to a logging call.
///
/// Keys are unique by construction; values are already JSON values, so
/// anything that reaches the formatter is encodable. Use
/// [`crate::serializer::value_or_debug`] to coerce arbitrary types at
/// this boundary.
pub type Extras = BTreeMap<String, Value>;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// Upper-case name as emitted under the `levelname` key.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single logging event as assembled by the host framework.
///
/// The host guarantees message interpolation is already done and the
/// timestamp is populated before the record reaches the formatter. The
/// formatter only reads a `Record`; it never mutates or retains one.
#[derive(Debug, Clone)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    /// Logger name, emitted under the `name` key by the verbose variant.
    pub target: String,
    pub module_path: Option<String>,
    /// Full path of the source file that produced the event.
    pub file: Option<String>,
    pub line: Option<u32>,
    pub function: Option<String>,
    pub process_id: u32,
    pub process_name: Option<String>,
    /// Numeric thread id rendered as text; `ThreadId` exposes no stable
    /// integer accessor.
    pub thread_id: Option<String>,
    pub thread_name: Option<String>,
    pub stack_info: Option<String>,
    pub message: String,
    pub extras: Extras,
    pub exception: Option<ExceptionInfo>,
}

impl Record {
    /// Create a record with the current timestamp and the calling
    /// process/thread identity filled in.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        let thread = std::thread::current();
        Self {
            timestamp: Utc::now(),
            level,
            target: String::new(),
            module_path: None,
            file: None,
            line: None,
            function: None,
            process_id: std::process::id(),
            process_name: None,
            thread_id: Some(thread_id_text(thread.id())),
            thread_name: thread.name().map(|s| s.to_string()),
            stack_info: None,
            message: message.into(),
            extras: Extras::new(),
            exception: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_module_path(mut self, module_path: impl Into<String>) -> Self {
        self.module_path = Some(module_path.into());
        self
    }

    /// Set the source location (`pathname` / `lineno` in verbose output).
    pub fn with_source(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    pub fn with_stack_info(mut self, stack_info: impl Into<String>) -> Self {
        self.stack_info = Some(stack_info.into());
        self
    }

    /// Attach one extra field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// Replace the extras map wholesale.
    pub fn with_extras(mut self, extras: Extras) -> Self {
        self.extras = extras;
        self
    }

    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Basename of [`Record::file`], the `filename` built-in.
    pub fn filename(&self) -> Option<&str> {
        self.file
            .as_deref()
            .map(|path| path.rsplit(['/', '\\']).next().unwrap_or(path))
    }
}

/// Strip the `ThreadId(..)` wrapper from the debug rendering so the
/// `thread` built-in carries just the number.
fn thread_id_text(id: std::thread::ThreadId) -> String {
    let text = format!("{:?}", id);
    text.trim_start_matches("ThreadId(")
        .trim_end_matches(')')
        .to_string()
}

/// Structured trace of an error attached to a logging call.
///
/// Carries the error type name, its message, the `source` chain and an
/// optional captured backtrace. [`ExceptionInfo::render`] turns it into
/// the human-readable text stored under `exc_info`.
#[derive(Debug, Clone)]
pub struct ExceptionInfo {
    pub kind: String,
    pub message: String,
    /// Messages of the `source` chain, outermost cause first.
    pub chain: Vec<String>,
    pub backtrace: Option<String>,
}

impl ExceptionInfo {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            chain: Vec::new(),
            backtrace: None,
        }
    }

    /// Capture an error's type name, message and `source` chain.
    pub fn from_error<E: std::error::Error>(err: &E) -> Self {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        Self {
            kind: short_type_name::<E>().to_string(),
            message: err.to_string(),
            chain,
            backtrace: None,
        }
    }

    pub fn with_backtrace(mut self, backtrace: impl Into<String>) -> Self {
        self.backtrace = Some(backtrace.into());
        self
    }

    /// Render the trace as human-readable text.
    pub fn render(&self) -> String {
        let mut out = format!("{}: {}", self.kind, self.message);
        for cause in &self.chain {
            out.push_str("\ncaused by: ");
            out.push_str(cause);
        }
        if let Some(backtrace) = &self.backtrace {
            out.push('\n');
            out.push_str(backtrace);
        }
        out
    }
}

/// Last path segment of a type name, `my_crate::io::ReadError` →
/// `ReadError`.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
