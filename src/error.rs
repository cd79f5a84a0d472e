//! Error taxonomy for parsing and rendering.
//!
//! Every variant is fatal: a request that hits one gets the error document
//! and a client-error status, never a partial image. Invalid color tokens are
//! not errors; the palette resolver treats them as "not found".

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("direction is required")]
    MissingDirection,

    #[error("direction must be 'right' or 'bottom' (got '{0}')")]
    InvalidDirection(String),

    #[error("data is required")]
    MissingData,

    #[error("invalid data token '{token}': {reason}")]
    MalformedToken { token: String, reason: String },

    #[error("{name} must be a positive number (got '{value}')")]
    InvalidDimension { name: &'static str, value: String },
}

impl RenderError {
    pub(crate) fn malformed(token: &str, reason: impl Into<String>) -> Self {
        RenderError::MalformedToken {
            token: token.to_string(),
            reason: reason.into(),
        }
    }

    /// HTTP-style status paired with the error document.
    pub fn status(&self) -> u16 {
        400
    }
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_names_token() {
        let err = RenderError::malformed("3-x", "not a number");
        assert_eq!(err.to_string(), "invalid data token '3-x': not a number");
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_dimension_message() {
        let err = RenderError::InvalidDimension { name: "width", value: "abc".into() };
        assert_eq!(err.to_string(), "width must be a positive number (got 'abc')");
    }
}
