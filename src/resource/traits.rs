/*!
 * Memory Resource Traits
 * Immutable allocation-affecting descriptor attached to every resource
 */

use crate::core::types::{Granularity, ResourceKind, Vendor};
use serde::{Deserialize, Serialize};

/// Descriptor of allocation-affecting properties of a memory resource.
///
/// Pure data, immutable once a resource is constructed; factories compare it
/// against their backend's capabilities when creating resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryResourceTraits {
    /// Kind of memory the resource hands out
    pub kind: ResourceKind,
    /// Coherence granularity mode for allocations
    pub granularity: Granularity,
    /// Vendor of the backing accelerator stack
    pub vendor: Vendor,
    /// Device ordinal for device/pinned/unified resources
    pub device: u32,
}
