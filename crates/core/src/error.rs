/// Result alias that carries the custom [`ProgressError`] type.
pub type Result<T> = std::result::Result<T, ProgressError>;

/// Common error type for the core crate.
///
/// Animation and geometry never fail; only loading configuration from the
/// outside world does.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// Free-form message surfaced to the caller as-is.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration documents that fail to parse.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// Colour literals that are not `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
    #[error("invalid color `{0}`")]
    InvalidColor(String),
}

impl ProgressError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}
