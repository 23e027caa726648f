//! Error taxonomy for price computation and refresh

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricingError {
    /// A price or rate feed could not be reached or returned an unusable payload.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Product fields are outside the ranges a price can be computed for.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("product store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl PricingError {
    pub fn upstream(message: impl Into<String>) -> Self {
        PricingError::UpstreamUnavailable(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PricingError::Validation(message.into())
    }
}
