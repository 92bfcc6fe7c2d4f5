/*!
 * Allocator Handle
 * Thin shareable handle over a memory resource
 */

use super::{MemoryResource, MemoryResourceTraits};
use crate::core::errors::AllocResult;
use crate::core::types::{Platform, ResourceId};
use std::fmt;
use std::sync::Arc;

/// Cloneable handle the rest of the library passes around in place of a
/// concrete resource. The named lookup service that hands these out to user
/// code is an external collaborator; this crate only defines the handle.
#[derive(Clone)]
pub struct Allocator {
    resource: Arc<dyn MemoryResource>,
}

impl Allocator {
    pub fn new(resource: Box<dyn MemoryResource>) -> Self {
        Self {
            resource: Arc::from(resource),
        }
    }

    pub fn from_arc(resource: Arc<dyn MemoryResource>) -> Self {
        Self { resource }
    }

    pub fn allocate(&self, bytes: usize) -> AllocResult<*mut u8> {
        self.resource.allocate(bytes)
    }

    pub fn deallocate(&self, ptr: *mut u8, size: usize) -> AllocResult<()> {
        self.resource.deallocate(ptr, size)
    }

    pub fn is_accessible_from(&self, platform: Platform) -> bool {
        self.resource.is_accessible_from(platform)
    }

    pub fn platform(&self) -> Platform {
        self.resource.platform()
    }

    pub fn name(&self) -> &str {
        self.resource.name()
    }

    pub fn id(&self) -> ResourceId {
        self.resource.id()
    }

    pub fn traits(&self) -> MemoryResourceTraits {
        *self.resource.traits()
    }
}

impl fmt::Debug for Allocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocator")
            .field("name", &self.resource.name())
            .field("id", &self.resource.id())
            .field("platform", &self.resource.platform())
            .finish()
    }
}
