/*!
 * Memory Resources
 * Polymorphic allocation units binding a strategy to a stable identity
 */

pub mod allocator;
pub mod factory;
pub mod traits;

mod device;
mod host;
mod pinned;
mod unified;

pub use allocator::Allocator;
pub use device::DeviceMemoryResource;
pub use factory::{
    DeviceResourceFactory, HostResourceFactory, MemoryResourceFactory, PinnedResourceFactory,
    UnifiedResourceFactory,
};
pub use host::HostMemoryResource;
pub use pinned::PinnedMemoryResource;
pub use traits::MemoryResourceTraits;
pub use unified::UnifiedMemoryResource;

use crate::core::errors::AllocResult;
use crate::core::types::{Platform, ResourceId};

/// The polymorphic unit the rest of the library is built on.
///
/// `deallocate` accepts a size for interface symmetry with size-tracking
/// resources; the resources in this crate ignore it. A resource does not
/// track which pointers it issued; that bookkeeping belongs to layers above.
pub trait MemoryResource: Send + Sync {
    /// Allocate `bytes` through the owned backend strategy
    fn allocate(&self, bytes: usize) -> AllocResult<*mut u8>;

    /// Release an address issued by this resource.
    /// A null pointer is a silent no-op.
    fn deallocate(&self, ptr: *mut u8, size: usize) -> AllocResult<()>;

    /// Whether code executing in context `platform` may dereference
    /// addresses this resource issues
    fn is_accessible_from(&self, platform: Platform) -> bool;

    /// The resource's own execution context, fixed at construction
    fn platform(&self) -> Platform;

    /// Unique human-readable name (uniqueness enforced by the surrounding
    /// registry, not by this type)
    fn name(&self) -> &str;

    /// Dense id, stable for the process lifetime
    fn id(&self) -> ResourceId;

    /// Immutable allocation-affecting descriptor
    fn traits(&self) -> &MemoryResourceTraits;
}

impl std::fmt::Debug for dyn MemoryResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryResource")
            .field("name", &self.name())
            .field("id", &self.id())
            .field("platform", &self.platform())
            .finish_non_exhaustive()
    }
}

/// Shared identity state embedded in each concrete resource
#[derive(Debug, Clone)]
pub(crate) struct ResourceBase {
    name: String,
    id: ResourceId,
    platform: Platform,
    traits: MemoryResourceTraits,
}

impl ResourceBase {
    pub(crate) fn new(
        name: impl Into<String>,
        id: ResourceId,
        platform: Platform,
        traits: MemoryResourceTraits,
    ) -> Self {
        Self {
            name: name.into(),
            id,
            platform,
            traits,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn id(&self) -> ResourceId {
        self.id
    }

    pub(crate) fn platform(&self) -> Platform {
        self.platform
    }

    pub(crate) fn traits(&self) -> &MemoryResourceTraits {
        &self.traits
    }
}
