/*!
 * Host Memory Resource
 */

use super::{MemoryResource, MemoryResourceTraits, ResourceBase};
use crate::alloc::{BlockAllocator, HostHeapAllocator};
use crate::core::errors::AllocResult;
use crate::core::types::{Platform, ResourceId};
use log::debug;

/// Memory resource over the plain process heap, accessible from the host only
pub struct HostMemoryResource {
    base: ResourceBase,
    allocator: HostHeapAllocator,
}

impl HostMemoryResource {
    pub fn new(name: impl Into<String>, id: ResourceId, traits: MemoryResourceTraits) -> Self {
        Self {
            base: ResourceBase::new(name, id, Platform::Host, traits),
            allocator: HostHeapAllocator::new(),
        }
    }
}

impl MemoryResource for HostMemoryResource {
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
        platform == Platform::Host
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
