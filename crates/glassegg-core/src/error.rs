use thiserror::Error;

pub type Result<T> = std::result::Result<T, OverlayError>;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("invalid config field `{field}`: {message}")]
    InvalidConfig { field: &'static str, message: String },

    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OverlayError {
    #[must_use]
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            message: message.into(),
        }
    }

    /// Name of the offending config field, if this is a validation error.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidConfig { field, .. } => Some(*field),
            Self::Json(_) => None,
        }
    }
}
