/*!
 * hetmem
 *
 * Portable memory-allocation abstraction for heterogeneous (host/device)
 * computing: a uniform allocate/deallocate interface over plain heap, pinned
 * host, device, and unified memory, plus a bounded device allocator registry
 * visible from both host orchestration code and accelerator kernels.
 *
 * The crate is vendor-neutral: [`backend::DeviceRuntime`] is the contract a
 * native accelerator runtime satisfies to plug in, and
 * [`backend::SimDeviceRuntime`] is a complete host-simulated implementation
 * used for development and testing.
 */

pub mod alloc;
pub mod backend;
pub mod core;
pub mod registry;
pub mod resource;

// Re-exports
pub use crate::core::{AllocError, AllocResult, Granularity, Platform, ResourceId, ResourceKind, Vendor};
pub use alloc::{
    BlockAllocator, DeviceHeapAllocator, HostHeapAllocator, PinnedHeapAllocator,
    UnifiedHeapAllocator,
};
pub use backend::{DeviceRuntime, NativeError, NativeErrorKind, SimDeviceRuntime, SimRuntimeConfig};
pub use registry::{DeviceAllocator, DeviceAllocatorRegistry, DeviceTableView};
pub use resource::{
    Allocator, DeviceResourceFactory, HostResourceFactory, MemoryResource, MemoryResourceFactory,
    MemoryResourceTraits, PinnedResourceFactory, UnifiedResourceFactory,
};
