//! Error types for Vulkaneer
//!
//! This module defines the error types used throughout the crate,
//! including shader reflection, layout merging, descriptor allocation
//! and device object creation.

use std::fmt;

/// Result type for Vulkaneer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Vulkaneer errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan call failure, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Shader bytecode metadata could not be decoded
    ReflectionFailed(String),

    /// Two shader stages disagree on the declaration of one binding
    LayoutMismatch(String),

    /// Shader module could not be loaded or created
    CompileFailed(String),

    /// Descriptor allocator could not provide a new descriptor set
    AllocatorExhausted(String),

    /// API used out of order (reflect twice, bind an unreflected effect, ...)
    InvalidOperation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::ReflectionFailed(msg) => write!(f, "Shader reflection failed: {}", msg),
            Error::LayoutMismatch(msg) => write!(f, "Descriptor layout mismatch: {}", msg),
            Error::CompileFailed(msg) => write!(f, "Shader compilation failed: {}", msg),
            Error::AllocatorExhausted(msg) => write!(f, "Descriptor allocator exhausted: {}", msg),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
