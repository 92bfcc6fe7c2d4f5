/*!
 * Device Heap Allocator
 * Device-heap allocation strategy with coherence-granularity dispatch
 */

use super::{classify_alloc_failure, classify_free_failure, BlockAllocator};
use crate::backend::DeviceRuntime;
use crate::core::errors::{AllocError, AllocResult};
use crate::core::types::Granularity;
use log::debug;
use std::sync::Arc;

/// Allocation strategy over one device's heap.
///
/// Granularity dispatch: `Unknown` selects the runtime's default allocation
/// call; the qualified modes require [`DeviceRuntime::supports_granularity`]
/// and fail fast with a configuration error before any native call otherwise.
#[derive(Clone)]
pub struct DeviceHeapAllocator {
    runtime: Arc<dyn DeviceRuntime>,
    device: u32,
    granularity: Granularity,
}

impl DeviceHeapAllocator {
    pub fn new(runtime: Arc<dyn DeviceRuntime>, device: u32, granularity: Granularity) -> Self {
        Self {
            runtime,
            device,
            granularity,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }
}

impl BlockAllocator for DeviceHeapAllocator {
    fn allocate(&self, bytes: usize) -> AllocResult<*mut u8> {
        let ptr = match self.granularity {
            Granularity::Unknown => {
                debug!("alloc_device( device = {}, bytes = {} )", self.device, bytes);
                self.runtime.alloc_device(self.device, bytes)
            }
            granularity @ (Granularity::FineGrained | Granularity::CoarseGrained) => {
                if !self.runtime.supports_granularity() {
                    return Err(AllocError::Configuration {
                        reason: format!(
                            "{} memory coherence not supported for device allocation",
                            granularity
                        ),
                    });
                }
                debug!(
                    "alloc_device_with_granularity( device = {}, bytes = {}, granularity = {} )",
                    self.device, bytes, granularity
                );
                self.runtime
                    .alloc_device_with_granularity(self.device, bytes, granularity)
            }
        }
        .map_err(|error| classify_alloc_failure(bytes, error))?;

        debug!("( bytes = {} ) returning {:p}", bytes, ptr);
        Ok(ptr)
    }

    fn deallocate(&self, ptr: *mut u8) -> AllocResult<()> {
        debug!("free_device( ptr = {:p} )", ptr);
        if ptr.is_null() {
            return Ok(());
        }
        self.runtime.free_device(ptr).map_err(classify_free_failure)
    }
}
