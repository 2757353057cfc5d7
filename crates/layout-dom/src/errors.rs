use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("frame content is not accessible")]
    CrossOrigin,
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl LayoutError {
    pub fn invalid_selector(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }

    /// Short failure name reported in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            LayoutError::InvalidSelector { .. } => "InvalidSelector",
            LayoutError::CrossOrigin => "CrossOrigin",
            LayoutError::Unsupported(_) => "Unsupported",
        }
    }
}

pub type LayoutResult<T> = Result<T, LayoutError>;
