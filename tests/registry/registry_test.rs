/*!
 * Device Allocator Registry Tests
 * Slot capacity, name handling, teardown, and host-side lookups
 */

use hetmem::core::limits::TOTAL_DEVICE_ALLOCATORS;
use hetmem::{
    AllocError, Allocator, DeviceAllocatorRegistry, DeviceRuntime, HostResourceFactory,
    MemoryResourceFactory, PinnedResourceFactory, ResourceId, SimDeviceRuntime,
    UnifiedResourceFactory,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn pinned_allocator(runtime: Arc<SimDeviceRuntime>) -> Allocator {
    Allocator::new(
        PinnedResourceFactory::new(runtime)
            .create("PINNED", ResourceId(0))
            .unwrap(),
    )
}

fn unified_allocator(runtime: Arc<SimDeviceRuntime>) -> Allocator {
    Allocator::new(
        UnifiedResourceFactory::new(runtime)
            .create("UM", ResourceId(1))
            .unwrap(),
    )
}

#[test]
fn test_registry_rejects_host_only_table_allocator() {
    let runtime = Arc::new(SimDeviceRuntime::new());
    let host = Allocator::new(
        HostResourceFactory::new()
            .create("HOST", ResourceId(0))
            .unwrap(),
    );

    let err = DeviceAllocatorRegistry::new(runtime, host).unwrap_err();
    assert!(matches!(err, AllocError::Configuration { .. }));
}

#[test]
fn test_capacity_error_on_slot_exhaustion_and_recovery_after_destroy() {
    let runtime = Arc::new(SimDeviceRuntime::new());
    let table = pinned_allocator(runtime.clone());
    let backing = unified_allocator(runtime.clone());
    let mut registry = DeviceAllocatorRegistry::with_capacity(runtime, table, 4).unwrap();

    for _ in 0..4 {
        registry.make_device_allocator(&backing, 256, None).unwrap();
    }
    let err = registry
        .make_device_allocator(&backing, 256, None)
        .unwrap_err();
    assert_eq!(err, AllocError::Capacity { limit: 4 });

    registry.destroy_device_allocators().unwrap();
    assert!(registry.is_empty());

    // The same sequence succeeds again and ids restart at 0
    for expected_id in 0..4u32 {
        let record = registry.make_device_allocator(&backing, 256, None).unwrap();
        assert_eq!(record.id(), expected_id);
    }
}

#[test]
fn test_default_capacity_is_the_fixed_limit() {
    let runtime = Arc::new(SimDeviceRuntime::new());
    let table = pinned_allocator(runtime.clone());
    let backing = unified_allocator(runtime.clone());
    let mut registry = DeviceAllocatorRegistry::new(runtime, table).unwrap();
    assert_eq!(registry.capacity(), TOTAL_DEVICE_ALLOCATORS);

    for _ in 0..TOTAL_DEVICE_ALLOCATORS {
        registry.make_device_allocator(&backing, 64, None).unwrap();
    }
    let err = registry.make_device_allocator(&backing, 64, None).unwrap_err();
    assert_eq!(
        err,
        AllocError::Capacity {
            limit: TOTAL_DEVICE_ALLOCATORS
        }
    );
}

#[test]
fn test_duplicate_name_is_configuration_error() {
    let runtime = Arc::new(SimDeviceRuntime::new());
    let table = pinned_allocator(runtime.clone());
    let backing = unified_allocator(runtime.clone());
    let mut registry = DeviceAllocatorRegistry::with_capacity(runtime, table, 8).unwrap();

    registry
        .make_device_allocator(&backing, 128, Some("scratch"))
        .unwrap();
    let err = registry
        .make_device_allocator(&backing, 128, Some("scratch"))
        .unwrap_err();
    assert!(matches!(err, AllocError::Configuration { .. }));

    // Unnamed records never collide
    registry.make_device_allocator(&backing, 128, None).unwrap();
    registry.make_device_allocator(&backing, 128, None).unwrap();
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_empty_and_oversized_names_rejected() {
    let runtime = Arc::new(SimDeviceRuntime::new());
    let table = pinned_allocator(runtime.clone());
    let backing = unified_allocator(runtime.clone());
    let mut registry = DeviceAllocatorRegistry::with_capacity(runtime, table, 2).unwrap();

    let err = registry
        .make_device_allocator(&backing, 64, Some(""))
        .unwrap_err();
    assert!(matches!(err, AllocError::Configuration { .. }));

    let long_name = "x".repeat(200);
    let err = registry
        .make_device_allocator(&backing, 64, Some(&long_name))
        .unwrap_err();
    assert!(matches!(err, AllocError::Configuration { .. }));
    assert!(registry.is_empty());
}

#[test]
fn test_exists_lifecycle() {
    let runtime = Arc::new(SimDeviceRuntime::new());
    let table = pinned_allocator(runtime.clone());
    let backing = unified_allocator(runtime.clone());
    let mut registry = DeviceAllocatorRegistry::with_capacity(runtime, table, 8).unwrap();

    for id in 0..8 {
        assert!(!registry.exists(id));
    }
    assert!(!registry.exists_by_name("pool"));

    let record = registry
        .make_device_allocator(&backing, 512, Some("pool"))
        .unwrap();
    assert!(registry.exists(record.id()));
    assert!(registry.exists_by_name("pool"));

    registry.destroy_device_allocators().unwrap();
    for id in 0..8 {
        assert!(!registry.exists(id));
    }
    assert!(!registry.exists_by_name("pool"));
}

#[test]
fn test_host_lookups_return_matching_record() {
    let runtime = Arc::new(SimDeviceRuntime::new());
    let table = pinned_allocator(runtime.clone());
    let backing = unified_allocator(runtime.clone());
    let mut registry = DeviceAllocatorRegistry::with_capacity(runtime, table, 4).unwrap();

    let made = registry
        .make_device_allocator(&backing, 1024, Some("frames"))
        .unwrap();

    let by_id = registry.get(made.id()).unwrap();
    assert_eq!(by_id.capacity(), 1024);
    assert_eq!(by_id.name(), Some("frames"));

    let by_name = registry.get_by_name("frames").unwrap();
    assert_eq!(by_name.id(), made.id());

    assert!(registry.get(3).is_none());
    assert!(registry.get_by_name("nope").is_none());
}

#[test]
fn test_destroy_is_idempotent_and_returns_backing_storage() {
    let runtime = Arc::new(SimDeviceRuntime::new());
    let table = pinned_allocator(runtime.clone());
    let backing = unified_allocator(runtime.clone());
    let mut registry = DeviceAllocatorRegistry::with_capacity(runtime.clone(), table, 4).unwrap();

    // No active records: a no-op, not an error
    registry.destroy_device_allocators().unwrap();

    let baseline = runtime.bytes_in_use();
    registry
        .make_device_allocator(&backing, 4096, Some("a"))
        .unwrap();
    registry.make_device_allocator(&backing, 2048, None).unwrap();
    assert!(runtime.bytes_in_use() > baseline);

    registry.destroy_device_allocators().unwrap();
    assert_eq!(runtime.bytes_in_use(), baseline);
    registry.destroy_device_allocators().unwrap();
}

#[test]
fn test_registry_drop_releases_everything() {
    let runtime = Arc::new(SimDeviceRuntime::new());
    {
        let table = pinned_allocator(runtime.clone());
        let backing = unified_allocator(runtime.clone());
        let mut registry =
            DeviceAllocatorRegistry::with_capacity(runtime.clone(), table, 4).unwrap();
        registry
            .make_device_allocator(&backing, 8192, Some("leaky"))
            .unwrap();
        // Dropped with an active record: teardown is best-effort in Drop
    }
    assert_eq!(runtime.bytes_in_use(), 0);
}

#[test]
fn test_allocation_failure_leaves_registry_unchanged() {
    let runtime = Arc::new(SimDeviceRuntime::new());
    let table = pinned_allocator(runtime.clone());
    let backing = unified_allocator(runtime.clone());
    let mut registry = DeviceAllocatorRegistry::with_capacity(runtime.clone(), table, 4).unwrap();

    let baseline = runtime.bytes_in_use();
    // Far beyond the unified budget
    let err = registry
        .make_device_allocator(&backing, usize::MAX / 2, Some("huge"))
        .unwrap_err();
    assert!(matches!(err, AllocError::OutOfMemory { .. }));
    assert!(registry.is_empty());
    assert!(!registry.exists_by_name("huge"));
    assert_eq!(runtime.bytes_in_use(), baseline);
}
