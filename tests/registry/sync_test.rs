/*!
 * Synchronization Tests
 * Publish semantics between the host table and accelerator-side views
 */

use hetmem::{
    Allocator, DeviceAllocatorRegistry, DeviceTableView, MemoryResourceFactory,
    PinnedResourceFactory, ResourceId, SimDeviceRuntime, UnifiedResourceFactory,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn setup(
    capacity: usize,
) -> (
    Arc<SimDeviceRuntime>,
    DeviceAllocatorRegistry,
    Allocator,
) {
    let runtime = Arc::new(SimDeviceRuntime::new());
    let table = Allocator::new(
        PinnedResourceFactory::new(runtime.clone())
            .create("PINNED", ResourceId(0))
            .unwrap(),
    );
    let backing = Allocator::new(
        UnifiedResourceFactory::new(runtime.clone())
            .create("UM", ResourceId(1))
            .unwrap(),
    );
    let registry = DeviceAllocatorRegistry::with_capacity(runtime.clone(), table, capacity).unwrap();
    (runtime, registry, backing)
}

#[test]
fn test_view_before_first_publish_is_inert() {
    let (runtime, _registry, _backing) = setup(4);

    let view = DeviceTableView::capture(runtime.as_ref());
    assert!(!view.is_published());
    assert!(view.is_empty());
    assert!(!view.exists(0));
    assert!(!view.exists_by_name("anything"));
    assert!(!view.get(0).is_initialized());
    assert!(view.get(0).allocate(16).is_null());
}

#[test]
fn test_record_visible_after_synchronize() {
    let (runtime, mut registry, backing) = setup(4);

    let made = registry
        .make_device_allocator(&backing, 2048, Some("frames"))
        .unwrap();
    registry.synchronize();

    let view = DeviceTableView::capture(runtime.as_ref());
    assert!(view.is_published());
    assert_eq!(view.len(), 1);

    let record = view.get(made.id());
    assert!(record.is_initialized());
    assert_eq!(record.capacity(), 2048);
    assert_eq!(record.name(), Some("frames"));

    assert!(view.exists(made.id()));
    assert!(view.exists_by_name("frames"));
    assert_eq!(view.get_by_name("frames").id(), made.id());
}

#[test]
fn test_records_created_after_publish_are_invisible_until_next_publish() {
    let (runtime, mut registry, backing) = setup(4);

    registry.make_device_allocator(&backing, 256, None).unwrap();
    registry.synchronize();
    registry
        .make_device_allocator(&backing, 256, Some("late"))
        .unwrap();

    // The view reflects the last publish only
    let stale = DeviceTableView::capture(runtime.as_ref());
    assert_eq!(stale.len(), 1);
    assert!(stale.exists(0));
    assert!(!stale.exists(1));
    assert!(!stale.exists_by_name("late"));

    registry.synchronize();
    let fresh = DeviceTableView::capture(runtime.as_ref());
    assert_eq!(fresh.len(), 2);
    assert!(fresh.exists_by_name("late"));
}

#[test]
fn test_bumps_through_view_handles_are_shared_with_host_handles() {
    let (runtime, mut registry, backing) = setup(4);

    let made = registry.make_device_allocator(&backing, 1024, None).unwrap();
    registry.synchronize();

    let view = DeviceTableView::capture(runtime.as_ref());
    let kernel_handle = view.get(made.id());
    let chunk = kernel_handle.allocate(128);
    assert!(!chunk.is_null());

    // The offset cell is shared by every copy of the record
    assert_eq!(made.used(), 128);
    assert_eq!(registry.get(made.id()).unwrap().used(), 128);

    made.reset();
    assert_eq!(kernel_handle.used(), 0);
}

#[test]
fn test_registry_drop_retracts_the_published_table() {
    let runtime = Arc::new(SimDeviceRuntime::new());
    {
        let table = Allocator::new(
            PinnedResourceFactory::new(runtime.clone())
                .create("PINNED", ResourceId(0))
                .unwrap(),
        );
        let backing = Allocator::new(
            UnifiedResourceFactory::new(runtime.clone())
                .create("UM", ResourceId(1))
                .unwrap(),
        );
        let mut registry =
            DeviceAllocatorRegistry::with_capacity(runtime.clone(), table, 4).unwrap();
        registry.make_device_allocator(&backing, 256, None).unwrap();
        registry.synchronize();
        assert!(DeviceTableView::capture(runtime.as_ref()).is_published());
        // Registry dropped here; its table memory is returned to the
        // table allocator
    }

    // The device symbol must not keep pointing at the freed table
    let view = DeviceTableView::capture(runtime.as_ref());
    assert!(!view.is_published());
    assert!(view.is_empty());
    assert!(!view.exists(0));
    assert!(!view.get(0).is_initialized());
}

#[test]
fn test_stale_view_after_destroy_reads_empty_slots() {
    let (runtime, mut registry, backing) = setup(4);

    registry
        .make_device_allocator(&backing, 512, Some("gone"))
        .unwrap();
    registry.synchronize();
    let stale = DeviceTableView::capture(runtime.as_ref());
    assert!(stale.exists(0));

    registry.destroy_device_allocators().unwrap();

    // Contract leaves pre-republish reads unspecified; the table must simply
    // not be corrupted, and emptied slots read as uninitialized
    assert!(!stale.get(0).is_initialized());
    assert!(stale.get(0).allocate(8).is_null());
    assert!(!stale.exists_by_name("gone"));

    registry.synchronize();
    let fresh = DeviceTableView::capture(runtime.as_ref());
    assert!(fresh.is_empty());
}
