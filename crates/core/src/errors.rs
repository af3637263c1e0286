use thiserror::Error;

/// Terminal pipeline failures. Both variants carry a seller-facing message
/// and indicate the request itself was the problem, not the service.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValuationError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InsufficientInformation(String),
}

impl ValuationError {
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message) | Self::InsufficientInformation(message) => message,
        }
    }
}
