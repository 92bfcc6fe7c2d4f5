/*!
 * Error Types
 * Domain error taxonomy with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Allocation errors raised by strategies, resources, factories, and the
/// device allocator registry.
///
/// The split between `OutOfMemory` and `Runtime` mirrors the native runtime's
/// status codes: exhaustion is recoverable by pooling/eviction layers above,
/// anything else is treated as a configuration or driver bug. Native
/// diagnostic text is preserved verbatim in `reason`.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum AllocError {
    #[error("Out of memory: requested {requested} bytes ({reason})")]
    #[diagnostic(
        code(hetmem::out_of_memory),
        help("The backing memory space is exhausted. Free allocations or reduce the request.")
    )]
    OutOfMemory { requested: usize, reason: String },

    #[error("Runtime error: {reason}")]
    #[diagnostic(
        code(hetmem::runtime_error),
        help("The native runtime reported a non-exhaustion failure. Check device state and drivers.")
    )]
    Runtime { reason: String },

    #[error("Configuration error: {reason}")]
    #[diagnostic(
        code(hetmem::configuration_error),
        help("A requested trait, platform, or name is not supported by this build/backend.")
    )]
    Configuration { reason: String },

    #[error("Capacity reached: registry limit of {limit} device allocators")]
    #[diagnostic(
        code(hetmem::capacity_error),
        help("All registry slots are in use. Destroy existing device allocators first.")
    )]
    Capacity { limit: usize },
}

/// Result type for allocation operations
pub type AllocResult<T> = std::result::Result<T, AllocError>;
