//! Formats log records into single-line JSON documents for
//! line-oriented collectors like Logstash.
//!
//! The whole crate is one pure transformation: a [`record::Record`]
//! assembled by the host logging framework goes in, a single line of
//! JSON text comes out. Dispatch, filtering and sinks stay host-side.
//!
//! ```
//! use json_log_line::formatter::JsonFormatter;
//! use json_log_line::record::{Level, Record};
//!
//! let formatter = JsonFormatter::new();
//! let record = Record::new(Level::Info, "Sign up").with_extra("referral_code", "52d6ce");
//! let line = formatter.format(&record).unwrap();
//! // {"referral_code":"52d6ce","message":"Sign up","time":"2015-09-01T06:06:26.524448"}
//! ```

pub mod error;
pub mod formatter;
pub mod record;
pub mod serializer;

#[cfg(feature = "tracing")]
pub mod tracing_support;

pub use error::FormatError;
pub use formatter::{BuiltinAttr, JsonFormatter, TimeFormat};
pub use record::{ExceptionInfo, Extras, Level, Record};
pub use serializer::{JsonRecord, JsonSerializer, Serializer};
