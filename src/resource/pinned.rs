/*!
 * Pinned Memory Resource
 */

use super::{MemoryResource, MemoryResourceTraits, ResourceBase};
use crate::alloc::{BlockAllocator, PinnedHeapAllocator};
use crate::core::errors::AllocResult;
use crate::core::types::{Platform, ResourceId};
use log::debug;

/// Memory resource over page-locked host memory visible to one accelerator.
///
/// Addresses are dereferenceable from the host and from the accelerator the
/// resource serves, but not from unrelated accelerators.
pub struct PinnedMemoryResource {
    base: ResourceBase,
    allocator: PinnedHeapAllocator,
}

impl PinnedMemoryResource {
    pub fn new(
        platform: Platform,
        name: impl Into<String>,
        id: ResourceId,
        traits: MemoryResourceTraits,
        allocator: PinnedHeapAllocator,
    ) -> Self {
        Self {
            base: ResourceBase::new(name, id, platform, traits),
            allocator,
        }
    }
}

impl MemoryResource for PinnedMemoryResource {
    fn allocate(&self, bytes: usize) -> AllocResult<*mut u8> {
        let ptr = self.allocator.allocate(bytes)?;
        debug!("{}: ( bytes = {} ) returning {:p}", self.base.name(), bytes, ptr);
        Ok(ptr)
    }

    fn deallocate(&self, ptr: *mut u8, _size: usize) -> AllocResult<()> {
        debug!("{}: ( ptr = {:p} )", self.base.name(), ptr);
        self.allocator.deallocate(ptr)
    }

    fn is_accessible_from(&self, platform: Platform) -> bool {
        platform == Platform::Host || platform == self.base.platform()
    }

    fn platform(&self) -> Platform {
        self.base.platform()
    }

    fn name(&self) -> &str {
        self.base.name()
    }

    fn id(&self) -> ResourceId {
        self.base.id()
    }

    fn traits(&self) -> &MemoryResourceTraits {
        self.base.traits()
    }
}
