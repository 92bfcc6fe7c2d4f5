/*!
 * Unified Heap Allocator
 * Unified/managed memory allocation strategy
 */

use super::{classify_alloc_failure, classify_free_failure, BlockAllocator};
use crate::backend::DeviceRuntime;
use crate::core::errors::AllocResult;
use log::debug;
use std::sync::Arc;

/// Allocation strategy over unified/managed memory.
///
/// No granularity-qualified variant exists for unified allocation; the
/// factory layer rejects such traits before construction.
#[derive(Clone)]
pub struct UnifiedHeapAllocator {
    runtime: Arc<dyn DeviceRuntime>,
}

impl UnifiedHeapAllocator {
    pub fn new(runtime: Arc<dyn DeviceRuntime>) -> Self {
        Self { runtime }
    }
}

impl BlockAllocator for UnifiedHeapAllocator {
    fn allocate(&self, bytes: usize) -> AllocResult<*mut u8> {
        debug!("alloc_unified( bytes = {} )", bytes);
        let ptr = self
            .runtime
            .alloc_unified(bytes)
            .map_err(|error| classify_alloc_failure(bytes, error))?;
        debug!("( bytes = {} ) returning {:p}", bytes, ptr);
        Ok(ptr)
    }

    fn deallocate(&self, ptr: *mut u8) -> AllocResult<()> {
        debug!("free_unified( ptr = {:p} )", ptr);
        if ptr.is_null() {
            return Ok(());
        }
        self.runtime.free_unified(ptr).map_err(classify_free_failure)
    }
}
