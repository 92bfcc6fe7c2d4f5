/*!
 * Unified Memory Resource
 */

use super::{MemoryResource, MemoryResourceTraits, ResourceBase};
use crate::alloc::{BlockAllocator, UnifiedHeapAllocator};
use crate::core::errors::AllocResult;
use crate::core::types::{Platform, ResourceId};
use log::debug;

/// Memory resource over unified/managed memory.
///
/// Unified addresses migrate on demand, so they are dereferenceable from the
/// host and from every accelerator the runtime drives.
pub struct UnifiedMemoryResource {
    base: ResourceBase,
    allocator: UnifiedHeapAllocator,
}

impl UnifiedMemoryResource {
    pub fn new(
        platform: Platform,
        name: impl Into<String>,
        id: ResourceId,
        traits: MemoryResourceTraits,
        allocator: UnifiedHeapAllocator,
    ) -> Self {
        Self {
            base: ResourceBase::new(name, id, platform, traits),
            allocator,
        }
    }
}

impl MemoryResource for UnifiedMemoryResource {
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
        matches!(platform, Platform::Host | Platform::Device(_))
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
