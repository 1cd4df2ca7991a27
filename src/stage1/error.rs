use thiserror::Error;

/// Errors raised while constructing a [`FastFilter`](super::FastFilter).
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid pattern for {term:?}: {reason}")]
    InvalidPattern { term: String, reason: String },

    #[error("invalid stage-1 configuration: {reason}")]
    InvalidConfig { reason: String },
}
