/*!
 * Memory Resource Factory Tests
 * Name validation, default traits, and eager trait rejection
 */

use hetmem::{
    AllocError, DeviceResourceFactory, DeviceRuntime, Granularity, HostResourceFactory,
    MemoryResourceFactory, MemoryResourceTraits, PinnedResourceFactory, Platform, ResourceId,
    ResourceKind, SimDeviceRuntime, SimRuntimeConfig, UnifiedResourceFactory, Vendor,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn runtime_with(config: SimRuntimeConfig) -> Arc<SimDeviceRuntime> {
    Arc::new(SimDeviceRuntime::with_config(config))
}

#[test]
fn test_factories_accept_their_names_only() {
    let runtime = runtime_with(SimRuntimeConfig::default().with_device_count(2));

    let host = HostResourceFactory::new();
    assert!(host.is_valid_resource_name("HOST"));
    assert!(!host.is_valid_resource_name("host"));
    assert!(!host.is_valid_resource_name("DEVICE"));

    let device = DeviceResourceFactory::new(runtime.clone());
    assert!(device.is_valid_resource_name("DEVICE"));
    assert!(device.is_valid_resource_name("DEVICE::0"));
    assert!(device.is_valid_resource_name("DEVICE::1"));
    assert!(!device.is_valid_resource_name("DEVICE::2"));
    assert!(!device.is_valid_resource_name("DEVICE::x"));
    assert!(!device.is_valid_resource_name("PINNED"));

    let pinned = PinnedResourceFactory::new(runtime.clone());
    assert!(pinned.is_valid_resource_name("PINNED"));
    assert!(!pinned.is_valid_resource_name("UM"));

    let unified = UnifiedResourceFactory::new(runtime);
    assert!(unified.is_valid_resource_name("UM"));
    assert!(unified.is_valid_resource_name("UNIFIED"));
    assert!(!unified.is_valid_resource_name("HOST"));
}

#[test]
fn test_default_traits_are_internally_consistent() {
    let runtime = runtime_with(SimRuntimeConfig::default());
    let factories: Vec<(Box<dyn MemoryResourceFactory>, ResourceKind)> = vec![
        (Box::new(HostResourceFactory::new()), ResourceKind::Host),
        (
            Box::new(DeviceResourceFactory::new(runtime.clone())),
            ResourceKind::Device,
        ),
        (
            Box::new(PinnedResourceFactory::new(runtime.clone())),
            ResourceKind::Pinned,
        ),
        (
            Box::new(UnifiedResourceFactory::new(runtime)),
            ResourceKind::Unified,
        ),
    ];

    for (factory, kind) in factories {
        let traits = factory.default_traits();
        assert_eq!(traits.kind, kind);
        // Unknown granularity is always a safe default
        assert_eq!(traits.granularity, Granularity::Unknown);
    }
}

#[test]
fn test_create_equals_create_with_default_traits() {
    let runtime = runtime_with(SimRuntimeConfig::default());
    let factory = DeviceResourceFactory::new(runtime);

    let via_create = factory.create("DEVICE", ResourceId(1)).unwrap();
    let via_traits = factory
        .create_with_traits("DEVICE", ResourceId(1), factory.default_traits())
        .unwrap();

    assert_eq!(via_create.platform(), via_traits.platform());
    assert_eq!(via_create.traits(), via_traits.traits());
    assert_eq!(via_create.name(), via_traits.name());
}

#[test]
fn test_device_ordinal_name_selects_device() {
    let runtime = runtime_with(SimRuntimeConfig::default().with_device_count(2));
    let factory = DeviceResourceFactory::new(runtime);

    let resource = factory.create("DEVICE::1", ResourceId(5)).unwrap();
    assert_eq!(resource.platform(), Platform::Device(1));
    assert_eq!(resource.traits().device, 1);
}

#[test]
fn test_out_of_range_ordinal_is_configuration_error() {
    let runtime = runtime_with(SimRuntimeConfig::default().with_device_count(1));
    let factory = DeviceResourceFactory::new(runtime.clone());

    let calls_before = runtime.native_call_count();
    let err = factory.create("DEVICE::3", ResourceId(0)).unwrap_err();
    assert!(matches!(err, AllocError::Configuration { .. }));
    // Rejected at construction, never reaching the native layer
    assert_eq!(runtime.native_call_count(), calls_before);
}

#[test]
fn test_unsupported_granularity_rejected_at_construction() {
    let runtime = runtime_with(SimRuntimeConfig::default().with_granularity_support(false));
    let factory = PinnedResourceFactory::new(runtime.clone());

    let traits = MemoryResourceTraits {
        kind: ResourceKind::Pinned,
        granularity: Granularity::FineGrained,
        ..Default::default()
    };
    let calls_before = runtime.native_call_count();
    let err = factory
        .create_with_traits("PINNED", ResourceId(0), traits)
        .unwrap_err();
    assert!(matches!(err, AllocError::Configuration { .. }));
    assert_eq!(runtime.native_call_count(), calls_before);
}

#[test]
fn test_host_and_unified_reject_any_granularity() {
    let runtime = runtime_with(SimRuntimeConfig::default());

    let host_traits = MemoryResourceTraits {
        kind: ResourceKind::Host,
        granularity: Granularity::CoarseGrained,
        ..Default::default()
    };
    let err = HostResourceFactory::new()
        .create_with_traits("HOST", ResourceId(0), host_traits)
        .unwrap_err();
    assert!(matches!(err, AllocError::Configuration { .. }));

    let unified_traits = MemoryResourceTraits {
        kind: ResourceKind::Unified,
        granularity: Granularity::FineGrained,
        ..Default::default()
    };
    let err = UnifiedResourceFactory::new(runtime)
        .create_with_traits("UM", ResourceId(0), unified_traits)
        .unwrap_err();
    assert!(matches!(err, AllocError::Configuration { .. }));
}

#[test]
fn test_mismatched_kind_rejected() {
    let runtime = runtime_with(SimRuntimeConfig::default());
    let factory = DeviceResourceFactory::new(runtime);

    let traits = MemoryResourceTraits {
        kind: ResourceKind::Pinned,
        ..Default::default()
    };
    let err = factory
        .create_with_traits("DEVICE", ResourceId(0), traits)
        .unwrap_err();
    assert!(matches!(err, AllocError::Configuration { .. }));
}

#[test]
fn test_unknown_kind_accepted_and_filled_by_factory() {
    let runtime = runtime_with(SimRuntimeConfig::default());
    let factory = UnifiedResourceFactory::new(runtime);

    let traits = MemoryResourceTraits::default();
    let resource = factory
        .create_with_traits("UNIFIED", ResourceId(9), traits)
        .unwrap();
    assert_eq!(resource.platform(), Platform::Device(0));
}

#[test]
fn test_factory_vendor_default_comes_from_runtime() {
    let runtime = runtime_with(SimRuntimeConfig::default());
    let factory = DeviceResourceFactory::new(runtime.clone());
    assert_eq!(factory.default_traits().vendor, runtime.vendor());
    assert_eq!(factory.default_traits().vendor, Vendor::Unknown);
}
