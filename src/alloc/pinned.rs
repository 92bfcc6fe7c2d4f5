/*!
 * Pinned Heap Allocator
 * Page-locked host allocation strategy with coherence-granularity dispatch
 */

use super::{classify_alloc_failure, classify_free_failure, BlockAllocator};
use crate::backend::DeviceRuntime;
use crate::core::errors::{AllocError, AllocResult};
use crate::core::types::Granularity;
use log::debug;
use std::sync::Arc;

/// Allocation strategy over the runtime's pinned (page-locked) host pool
#[derive(Clone)]
pub struct PinnedHeapAllocator {
    runtime: Arc<dyn DeviceRuntime>,
    granularity: Granularity,
}

impl PinnedHeapAllocator {
    pub fn new(runtime: Arc<dyn DeviceRuntime>, granularity: Granularity) -> Self {
        Self {
            runtime,
            granularity,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }
}

impl BlockAllocator for PinnedHeapAllocator {
    fn allocate(&self, bytes: usize) -> AllocResult<*mut u8> {
        let ptr = match self.granularity {
            Granularity::Unknown => {
                debug!("alloc_pinned( bytes = {} )", bytes);
                self.runtime.alloc_pinned(bytes)
            }
            granularity @ (Granularity::FineGrained | Granularity::CoarseGrained) => {
                if !self.runtime.supports_granularity() {
                    return Err(AllocError::Configuration {
                        reason: format!(
                            "{} memory coherence not supported for pinned allocation",
                            granularity
                        ),
                    });
                }
                debug!(
                    "alloc_pinned_with_granularity( bytes = {}, granularity = {} )",
                    bytes, granularity
                );
                self.runtime.alloc_pinned_with_granularity(bytes, granularity)
            }
        }
        .map_err(|error| classify_alloc_failure(bytes, error))?;

        debug!("( bytes = {} ) returning {:p}", bytes, ptr);
        Ok(ptr)
    }

    fn deallocate(&self, ptr: *mut u8) -> AllocResult<()> {
        debug!("free_pinned( ptr = {:p} )", ptr);
        if ptr.is_null() {
            return Ok(());
        }
        self.runtime.free_pinned(ptr).map_err(classify_free_failure)
    }
}
