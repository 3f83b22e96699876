use serde_json::Value;
use std::error::Error;
use std::fmt::Debug;

/// The assembled output mapping, built fresh per call and serialized to
/// a single line.
pub type JsonRecord = serde_json::Map<String, Value>;

/// Serialization backend turning a [`JsonRecord`] into a single line of
/// JSON text.
///
/// Implementations must return UTF-8 text with no embedded or trailing
/// newline; the host sink owns line termination. A returned error is
/// surfaced to the caller as
/// [`FormatError::Serialization`](crate::error::FormatError::Serialization) —
/// backends must not drop fields silently.
pub trait Serializer: Send + Sync {
    fn serialize(&self, record: &JsonRecord) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// Default backend on top of `serde_json`.
///
/// The record map already holds JSON values, so this backend is total
/// over its input and never drops fields. Coercion of arbitrary caller
/// values happens earlier, at the [`value_or_debug`] boundary.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, record: &JsonRecord) -> Result<String, Box<dyn Error + Send + Sync>> {
        serde_json::to_string(record).map_err(Into::into)
    }
}

impl<F> Serializer for F
where
    F: Fn(&JsonRecord) -> Result<String, Box<dyn Error + Send + Sync>> + Send + Sync,
{
    fn serialize(&self, record: &JsonRecord) -> Result<String, Box<dyn Error + Send + Sync>> {
        self(record)
    }
}

/// Convert any serializable value into a JSON value, falling back to
/// its `Debug` rendering as a string when serde_json cannot encode it
/// (non-string map keys, for example). Best-effort by design: a lossy
/// string beats a lost record.
pub fn value_or_debug<T: serde::Serialize + Debug>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|_| Value::String(format!("{:?}", value)))
}
