//! Error types for the question service client.

use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// The only two external failure kinds the controller distinguishes:
/// question retrieval failed, or answer verification failed.
#[derive(Error, Debug, Clone)]
pub enum ServiceError {
    #[error("question fetch failed: {0}")]
    Fetch(String),

    #[error("answer check failed: {0}")]
    Check(String),

    #[error("mock response not configured for: {0}")]
    NotConfigured(String),
}

impl ServiceError {
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }

    pub fn is_check(&self) -> bool {
        matches!(self, Self::Check(_))
    }
}
