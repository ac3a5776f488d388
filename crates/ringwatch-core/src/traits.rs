//! Core kernel traits.
//!
//! - `Kernel`: base trait exposing metadata
//! - `BatchKernel`: one-shot execution over a complete input

use crate::error::Result;
use crate::kernel::KernelMetadata;

/// Base trait for all analysis kernels.
pub trait Kernel: Send + Sync {
    /// Returns the kernel metadata.
    fn metadata(&self) -> &KernelMetadata;

    /// Returns the kernel id.
    fn id(&self) -> &str {
        &self.metadata().id
    }
}

/// Trait for batch kernels.
///
/// Batch kernels take a complete, immutable input and either produce a full
/// output or fail; there are no partial results.
pub trait BatchKernel<I, O>: Kernel {
    /// Execute the kernel on the given input.
    fn execute(&self, input: I) -> Result<O>;

    /// Validate input before execution.
    fn validate_input(&self, _input: &I) -> Result<()> {
        Ok(())
    }
}
