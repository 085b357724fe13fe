//! Error types for the permissions module.

use thiserror::Error;

use crate::capability::Capability;

/// Errors that can occur during permission checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermsError {
    /// The presented token does not grant the required role.
    #[error("permission denied: {required} token required")]
    PermissionDenied { required: Capability },
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
