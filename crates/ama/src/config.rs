//! Service configuration.

use ama_core::Limits;

/// Configuration for the AMA service.
#[derive(Debug, Clone, Default)]
pub struct AmaConfig {
    /// Length limits applied to titles, descriptions and questions.
    pub limits: Limits,
}

impl AmaConfig {
    pub fn with_limits(limits: Limits) -> Self {
        Self { limits }
    }
}
