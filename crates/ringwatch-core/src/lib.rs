//! # Ringwatch Core
//!
//! Shared abstractions for the ringwatch analysis crates.
//!
//! This crate provides:
//! - The error type and `Result` alias
//! - Kernel metadata
//! - Trait definitions for analysis kernels
//! - Logging configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod kernel;
pub mod logging;
pub mod traits;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Result, RingwatchError};
    pub use crate::kernel::KernelMetadata;
    pub use crate::logging::LogConfig;
    pub use crate::traits::{BatchKernel, Kernel};
}
