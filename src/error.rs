use thiserror::Error;

/// Errors surfaced by [`crate::formatter::JsonFormatter::format`].
///
/// The formatter performs no local recovery: swallowing a formatting
/// error would silently drop log data, so both kinds propagate to the
/// host, whose own error path decides what happens next.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The serialization backend rejected the assembled json record.
    #[error("json record could not be serialized: {source}")]
    Serialization {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A custom exception-trace renderer failed.
    #[error("exception trace could not be rendered: {source}")]
    Render {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl FormatError {
    pub(crate) fn serialization(source: Box<dyn std::error::Error + Send + Sync>) -> Self {
        FormatError::Serialization { source }
    }

    pub(crate) fn render(source: Box<dyn std::error::Error + Send + Sync>) -> Self {
        FormatError::Render { source }
    }
}
