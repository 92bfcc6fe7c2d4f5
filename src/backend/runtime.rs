/*!
 * Device Runtime Contract
 * The native allocate/free primitives an accelerator runtime must expose
 */

use crate::core::types::{Granularity, Vendor};
use thiserror::Error;

/// Status classes a native runtime call can report.
///
/// `OutOfMemory` is the only class upstream layers treat as recoverable;
/// everything else maps to a domain runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeErrorKind {
    OutOfMemory,
    InvalidValue,
    NotInitialized,
    NotSupported,
    Unknown,
}

/// A failed native runtime call, carrying the runtime's diagnostic text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct NativeError {
    kind: NativeErrorKind,
    message: String,
}

impl NativeError {
    pub fn new(kind: NativeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> NativeErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result of a native runtime call
pub type NativeResult<T> = std::result::Result<T, NativeError>;

/// Contract a native accelerator runtime satisfies to plug into the crate.
///
/// One implementation ships with the crate ([`super::SimDeviceRuntime`]);
/// vendor runtimes implement the same surface over their driver APIs. All
/// allocation calls are synchronous: they complete or fail, with no
/// cancellation or timeout semantics.
pub trait DeviceRuntime: Send + Sync {
    /// Human-readable runtime name
    fn name(&self) -> &str;

    /// Vendor of the underlying accelerator stack
    fn vendor(&self) -> Vendor;

    /// Number of accelerator devices this runtime drives
    fn device_count(&self) -> u32;

    /// Whether coherence-granularity-qualified allocation calls exist in
    /// this runtime build
    fn supports_granularity(&self) -> bool;

    /// Allocate `bytes` on the heap of device `device`
    fn alloc_device(&self, device: u32, bytes: usize) -> NativeResult<*mut u8>;

    /// Allocate `bytes` on device `device` with an explicit coherence mode.
    /// Callers must check [`Self::supports_granularity`] first.
    fn alloc_device_with_granularity(
        &self,
        device: u32,
        bytes: usize,
        granularity: Granularity,
    ) -> NativeResult<*mut u8>;

    /// Allocate `bytes` of page-locked host memory
    fn alloc_pinned(&self, bytes: usize) -> NativeResult<*mut u8>;

    /// Allocate pinned host memory with an explicit coherence mode
    fn alloc_pinned_with_granularity(
        &self,
        bytes: usize,
        granularity: Granularity,
    ) -> NativeResult<*mut u8>;

    /// Allocate `bytes` of unified/managed memory
    fn alloc_unified(&self, bytes: usize) -> NativeResult<*mut u8>;

    /// Free a device allocation
    fn free_device(&self, ptr: *mut u8) -> NativeResult<()>;

    /// Free a pinned host allocation
    fn free_pinned(&self, ptr: *mut u8) -> NativeResult<()>;

    /// Free a unified allocation
    fn free_unified(&self, ptr: *mut u8) -> NativeResult<()>;

    /// Publish a host table location into the accelerator-visible global.
    ///
    /// This is the synchronization primitive of the device allocator
    /// registry: it establishes the happens-before edge between host table
    /// mutation and subsequent kernel reads.
    fn publish_allocator_table(&self, table: *const (), len: usize);

    /// Read the accelerator-visible global last written by
    /// [`Self::publish_allocator_table`]; `(null, 0)` before the first publish.
    fn allocator_table(&self) -> (*const (), usize);

    /// Bytes currently allocated through this runtime, per its own counters
    fn bytes_in_use(&self) -> usize;
}
