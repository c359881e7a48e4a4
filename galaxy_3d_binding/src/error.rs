//! Error types for the Galaxy3D binding layer
//!
//! Only build-time failures (shader reflection, layout construction, root
//! signature finalization) surface as errors. Bind-time problems are logged
//! and never returned.

use std::fmt;

/// Result type for Galaxy3D binding operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D binding errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (reflection backend, native API, etc.)
    BackendError(String),

    /// Invalid resource (shader, layout, cache, etc.)
    InvalidResource(String),

    /// Initialization failed (pipeline state, binding, subsystems)
    InitializationFailed(String),

    /// Shader declares a resource category the binding model cannot express
    UnsupportedResource(String),

    /// Shader bytecode could not be reflected
    ReflectionFailed(String),

    /// Root signature or layout failed its consistency checks
    LayoutValidation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::UnsupportedResource(msg) => write!(f, "Unsupported resource: {}", msg),
            Error::ReflectionFailed(msg) => write!(f, "Reflection failed: {}", msg),
            Error::LayoutValidation(msg) => write!(f, "Layout validation failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
