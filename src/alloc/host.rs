/*!
 * Host Heap Allocator
 * Wraps malloc/free as the plain host allocation strategy
 */

use super::BlockAllocator;
use crate::core::errors::{AllocError, AllocResult};
use log::debug;
use std::ffi::c_void;

/// Allocation strategy over the process heap (`malloc`/`free`).
///
/// Addresses are aligned to at least
/// [`HOST_ALLOCATION_ALIGNMENT`](crate::core::limits::HOST_ALLOCATION_ALIGNMENT),
/// malloc's guarantee on 64-bit platforms. The host heap has no coherence
/// granularity; requests for qualified modes are rejected by the factory
/// layer before a strategy is ever constructed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostHeapAllocator;

impl HostHeapAllocator {
    pub fn new() -> Self {
        Self
    }
}

impl BlockAllocator for HostHeapAllocator {
    fn allocate(&self, bytes: usize) -> AllocResult<*mut u8> {
        // SAFETY: malloc with any size is sound; null is handled below
        let ptr = unsafe { libc::malloc(bytes) } as *mut u8;
        debug!("::malloc( bytes = {} ) returning {:p}", bytes, ptr);

        // malloc(0) may legally return null; only nonzero requests can fail
        if ptr.is_null() && bytes > 0 {
            return Err(AllocError::OutOfMemory {
                requested: bytes,
                reason: format!("::malloc( bytes = {} ) returned null", bytes),
            });
        }
        Ok(ptr)
    }

    fn deallocate(&self, ptr: *mut u8) -> AllocResult<()> {
        debug!("::free( ptr = {:p} )", ptr);
        if ptr.is_null() {
            return Ok(());
        }
        // SAFETY: ptr was returned by malloc via this strategy and not yet
        // freed (caller invariant)
        unsafe { libc::free(ptr as *mut c_void) };
        Ok(())
    }
}
