/*!
 * Memory Resource Factories
 * Construct memory resources by name with eager trait validation
 */

use super::{
    DeviceMemoryResource, HostMemoryResource, MemoryResource, MemoryResourceTraits,
    PinnedMemoryResource, UnifiedMemoryResource,
};
use crate::alloc::{DeviceHeapAllocator, PinnedHeapAllocator, UnifiedHeapAllocator};
use crate::backend::DeviceRuntime;
use crate::core::errors::{AllocError, AllocResult};
use crate::core::types::{Granularity, Platform, ResourceId, ResourceKind};
use log::info;
use std::sync::Arc;

/// Constructs memory resources from a name.
///
/// `is_valid_resource_name` serves an upstream factory-selection step and
/// must not allocate or mutate state. All trait validation happens eagerly in
/// `create_with_traits`, before any native call is attempted.
pub trait MemoryResourceFactory: Send + Sync {
    /// Whether this factory handles resources with the given name
    fn is_valid_resource_name(&self, name: &str) -> bool;

    /// The traits used absent an explicit override; always internally
    /// consistent (granularity `Unknown` is a safe default everywhere)
    fn default_traits(&self) -> MemoryResourceTraits;

    /// Create a resource with this factory's default traits
    fn create(&self, name: &str, id: ResourceId) -> AllocResult<Box<dyn MemoryResource>> {
        self.create_with_traits(name, id, self.default_traits())
    }

    /// Create a resource with explicit traits, failing with a configuration
    /// error if the backend cannot honor them
    fn create_with_traits(
        &self,
        name: &str,
        id: ResourceId,
        traits: MemoryResourceTraits,
    ) -> AllocResult<Box<dyn MemoryResource>>;
}

fn check_kind(traits: &MemoryResourceTraits, expected: ResourceKind) -> AllocResult<()> {
    if traits.kind != ResourceKind::Unknown && traits.kind != expected {
        return Err(AllocError::Configuration {
            reason: format!(
                "resource kind {} cannot be created by the {} factory",
                traits.kind, expected
            ),
        });
    }
    Ok(())
}

fn check_device_ordinal(runtime: &dyn DeviceRuntime, device: u32) -> AllocResult<()> {
    if device >= runtime.device_count() {
        return Err(AllocError::Configuration {
            reason: format!(
                "device ordinal {} out of range (device count {})",
                device,
                runtime.device_count()
            ),
        });
    }
    Ok(())
}

fn check_granularity_supported(
    runtime: &dyn DeviceRuntime,
    traits: &MemoryResourceTraits,
) -> AllocResult<()> {
    if traits.granularity != Granularity::Unknown && !runtime.supports_granularity() {
        return Err(AllocError::Configuration {
            reason: format!(
                "{} memory coherence not supported by runtime '{}'",
                traits.granularity,
                runtime.name()
            ),
        });
    }
    Ok(())
}

fn reject_granularity(traits: &MemoryResourceTraits, kind: ResourceKind) -> AllocResult<()> {
    if traits.granularity != Granularity::Unknown {
        return Err(AllocError::Configuration {
            reason: format!(
                "{} resources have no coherence-qualified allocation variant",
                kind
            ),
        });
    }
    Ok(())
}

// ============================================================================
// Host
// ============================================================================

/// Factory for `"HOST"`, backed by the process heap
#[derive(Debug, Clone, Copy, Default)]
pub struct HostResourceFactory;

impl HostResourceFactory {
    pub fn new() -> Self {
        Self
    }
}

impl MemoryResourceFactory for HostResourceFactory {
    fn is_valid_resource_name(&self, name: &str) -> bool {
        name == "HOST"
    }

    fn default_traits(&self) -> MemoryResourceTraits {
        MemoryResourceTraits {
            kind: ResourceKind::Host,
            ..Default::default()
        }
    }

    fn create_with_traits(
        &self,
        name: &str,
        id: ResourceId,
        traits: MemoryResourceTraits,
    ) -> AllocResult<Box<dyn MemoryResource>> {
        check_kind(&traits, ResourceKind::Host)?;
        reject_granularity(&traits, ResourceKind::Host)?;
        info!("creating host memory resource '{}' (id {})", name, id);
        Ok(Box::new(HostMemoryResource::new(name, id, traits)))
    }
}

// ============================================================================
// Device
// ============================================================================

/// Factory for `"DEVICE"` and `"DEVICE::<ordinal>"`, backed by a device heap
pub struct DeviceResourceFactory {
    runtime: Arc<dyn DeviceRuntime>,
}

impl DeviceResourceFactory {
    pub fn new(runtime: Arc<dyn DeviceRuntime>) -> Self {
        Self { runtime }
    }
}

/// Parse the ordinal suffix of a `DEVICE::<ordinal>` name
fn parse_device_ordinal(name: &str) -> Option<u32> {
    name.strip_prefix("DEVICE::")?.parse().ok()
}

impl MemoryResourceFactory for DeviceResourceFactory {
    fn is_valid_resource_name(&self, name: &str) -> bool {
        name == "DEVICE"
            || parse_device_ordinal(name).is_some_and(|ordinal| ordinal < self.runtime.device_count())
    }

    fn default_traits(&self) -> MemoryResourceTraits {
        MemoryResourceTraits {
            kind: ResourceKind::Device,
            vendor: self.runtime.vendor(),
            ..Default::default()
        }
    }

    fn create_with_traits(
        &self,
        name: &str,
        id: ResourceId,
        traits: MemoryResourceTraits,
    ) -> AllocResult<Box<dyn MemoryResource>> {
        check_kind(&traits, ResourceKind::Device)?;
        check_granularity_supported(self.runtime.as_ref(), &traits)?;

        // The ordinal form of the name overrides traits.device
        let mut traits = traits;
        if name != "DEVICE" {
            traits.device = parse_device_ordinal(name).ok_or_else(|| AllocError::Configuration {
                reason: format!("'{}' is not a valid device resource name", name),
            })?;
        }
        check_device_ordinal(self.runtime.as_ref(), traits.device)?;

        info!(
            "creating device memory resource '{}' (id {}, device {})",
            name, id, traits.device
        );
        let allocator =
            DeviceHeapAllocator::new(self.runtime.clone(), traits.device, traits.granularity);
        Ok(Box::new(DeviceMemoryResource::new(
            Platform::Device(traits.device),
            name,
            id,
            traits,
            allocator,
        )))
    }
}

// ============================================================================
// Pinned
// ============================================================================

/// Factory for `"PINNED"`, backed by page-locked host memory
pub struct PinnedResourceFactory {
    runtime: Arc<dyn DeviceRuntime>,
}

impl PinnedResourceFactory {
    pub fn new(runtime: Arc<dyn DeviceRuntime>) -> Self {
        Self { runtime }
    }
}

impl MemoryResourceFactory for PinnedResourceFactory {
    fn is_valid_resource_name(&self, name: &str) -> bool {
        name == "PINNED"
    }

    fn default_traits(&self) -> MemoryResourceTraits {
        MemoryResourceTraits {
            kind: ResourceKind::Pinned,
            vendor: self.runtime.vendor(),
            ..Default::default()
        }
    }

    fn create_with_traits(
        &self,
        name: &str,
        id: ResourceId,
        traits: MemoryResourceTraits,
    ) -> AllocResult<Box<dyn MemoryResource>> {
        check_kind(&traits, ResourceKind::Pinned)?;
        check_granularity_supported(self.runtime.as_ref(), &traits)?;
        check_device_ordinal(self.runtime.as_ref(), traits.device)?;

        info!(
            "creating pinned memory resource '{}' (id {}, device {})",
            name, id, traits.device
        );
        let allocator = PinnedHeapAllocator::new(self.runtime.clone(), traits.granularity);
        // A pinned resource reports the accelerator it serves as its platform
        Ok(Box::new(PinnedMemoryResource::new(
            Platform::Device(traits.device),
            name,
            id,
            traits,
            allocator,
        )))
    }
}

// ============================================================================
// Unified
// ============================================================================

/// Factory for `"UM"` and `"UNIFIED"`, backed by unified/managed memory
pub struct UnifiedResourceFactory {
    runtime: Arc<dyn DeviceRuntime>,
}

impl UnifiedResourceFactory {
    pub fn new(runtime: Arc<dyn DeviceRuntime>) -> Self {
        Self { runtime }
    }
}

impl MemoryResourceFactory for UnifiedResourceFactory {
    fn is_valid_resource_name(&self, name: &str) -> bool {
        name == "UM" || name == "UNIFIED"
    }

    fn default_traits(&self) -> MemoryResourceTraits {
        MemoryResourceTraits {
            kind: ResourceKind::Unified,
            vendor: self.runtime.vendor(),
            ..Default::default()
        }
    }

    fn create_with_traits(
        &self,
        name: &str,
        id: ResourceId,
        traits: MemoryResourceTraits,
    ) -> AllocResult<Box<dyn MemoryResource>> {
        check_kind(&traits, ResourceKind::Unified)?;
        reject_granularity(&traits, ResourceKind::Unified)?;
        check_device_ordinal(self.runtime.as_ref(), traits.device)?;

        info!("creating unified memory resource '{}' (id {})", name, id);
        let allocator = UnifiedHeapAllocator::new(self.runtime.clone());
        Ok(Box::new(UnifiedMemoryResource::new(
            Platform::Device(traits.device),
            name,
            id,
            traits,
            allocator,
        )))
    }
}
