/*!
 * Simulated Device Runtime
 * Host-simulated accelerator runtime with per-space budgets and fault injection
 */

use super::runtime::{DeviceRuntime, NativeError, NativeErrorKind, NativeResult};
use crate::core::limits::{
    DEFAULT_SIM_DEVICE_COUNT, DEFAULT_SIM_DEVICE_MEMORY, DEFAULT_SIM_PINNED_MEMORY,
    DEFAULT_SIM_UNIFIED_MEMORY, DEVICE_ALLOCATION_ALIGNMENT,
};
use crate::core::types::{Granularity, Vendor};
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, info};
use parking_lot::Mutex;
use std::alloc::{alloc, dealloc, Layout};
use std::sync::atomic::{AtomicPtr, AtomicU64, AtomicUsize, Ordering};

/// Memory space a simulated allocation lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Space {
    Device(u32),
    Pinned,
    Unified,
}

impl Space {
    fn label(&self) -> &'static str {
        match self {
            Space::Device(_) => "device",
            Space::Pinned => "pinned",
            Space::Unified => "unified",
        }
    }
}

/// Bookkeeping for one live simulated allocation
struct LiveAllocation {
    size: usize,
    space: Space,
}

/// Configuration for [`SimDeviceRuntime`]
#[derive(Debug, Clone)]
pub struct SimRuntimeConfig {
    /// Number of simulated accelerator devices
    pub device_count: u32,
    /// Whether coherence-qualified allocation entry points exist
    pub supports_granularity: bool,
    /// Simulated device heap budget per ordinal
    pub device_memory: usize,
    /// Simulated pinned host pool budget
    pub pinned_memory: usize,
    /// Simulated unified memory budget
    pub unified_memory: usize,
}

impl Default for SimRuntimeConfig {
    fn default() -> Self {
        Self {
            device_count: DEFAULT_SIM_DEVICE_COUNT,
            supports_granularity: true,
            device_memory: DEFAULT_SIM_DEVICE_MEMORY,
            pinned_memory: DEFAULT_SIM_PINNED_MEMORY,
            unified_memory: DEFAULT_SIM_UNIFIED_MEMORY,
        }
    }
}

impl SimRuntimeConfig {
    pub fn with_device_count(mut self, count: u32) -> Self {
        self.device_count = count;
        self
    }

    pub fn with_granularity_support(mut self, supported: bool) -> Self {
        self.supports_granularity = supported;
        self
    }

    pub fn with_device_memory(mut self, bytes: usize) -> Self {
        self.device_memory = bytes;
        self
    }

    pub fn with_pinned_memory(mut self, bytes: usize) -> Self {
        self.pinned_memory = bytes;
        self
    }

    pub fn with_unified_memory(mut self, bytes: usize) -> Self {
        self.unified_memory = bytes;
        self
    }
}

/// Host-simulated accelerator runtime.
///
/// Backs every space with the process heap (aligned to
/// [`DEVICE_ALLOCATION_ALIGNMENT`]) while enforcing per-space byte budgets,
/// so exhaustion, invalid-pointer faults, and the publish/read device symbol
/// behave like a real runtime without requiring accelerator hardware.
pub struct SimDeviceRuntime {
    config: SimRuntimeConfig,
    /// Live allocations by address, for free validation and leak accounting
    live: DashMap<usize, LiveAllocation, RandomState>,
    device_used: Vec<AtomicUsize>,
    pinned_used: AtomicUsize,
    unified_used: AtomicUsize,
    /// Total native calls attempted (allocations and frees)
    native_calls: AtomicU64,
    /// Single-shot injected fault, consumed by the next allocation
    injected: Mutex<Option<NativeErrorKind>>,
    /// The accelerator-visible global holding the published table location
    table_ptr: AtomicPtr<()>,
    table_len: AtomicUsize,
}

impl SimDeviceRuntime {
    pub fn new() -> Self {
        Self::with_config(SimRuntimeConfig::default())
    }

    /// Create a runtime with custom budgets/capabilities (useful for testing)
    pub fn with_config(config: SimRuntimeConfig) -> Self {
        info!(
            "Simulated device runtime initialized: {} device(s), granularity support: {}",
            config.device_count, config.supports_granularity
        );
        let device_used = (0..config.device_count).map(|_| AtomicUsize::new(0)).collect();
        Self {
            config,
            live: DashMap::with_hasher(RandomState::new()),
            device_used,
            pinned_used: AtomicUsize::new(0),
            unified_used: AtomicUsize::new(0),
            native_calls: AtomicU64::new(0),
            injected: Mutex::new(None),
            table_ptr: AtomicPtr::new(std::ptr::null_mut()),
            table_len: AtomicUsize::new(0),
        }
    }

    /// Make the next allocation fail with the given native status
    pub fn inject_failure(&self, kind: NativeErrorKind) {
        *self.injected.lock() = Some(kind);
    }

    /// Native calls attempted so far (allocations and frees)
    pub fn native_call_count(&self) -> u64 {
        self.native_calls.load(Ordering::Relaxed)
    }

    /// Bytes live on one simulated device heap
    pub fn device_bytes_in_use(&self, device: u32) -> usize {
        self.device_used
            .get(device as usize)
            .map_or(0, |used| used.load(Ordering::SeqCst))
    }

    /// Bytes live in the simulated pinned pool
    pub fn pinned_bytes_in_use(&self) -> usize {
        self.pinned_used.load(Ordering::SeqCst)
    }

    /// Bytes live in the simulated unified pool
    pub fn unified_bytes_in_use(&self) -> usize {
        self.unified_used.load(Ordering::SeqCst)
    }

    fn budget_of(&self, space: Space) -> (&AtomicUsize, usize) {
        match space {
            Space::Device(ordinal) => (
                &self.device_used[ordinal as usize],
                self.config.device_memory,
            ),
            Space::Pinned => (&self.pinned_used, self.config.pinned_memory),
            Space::Unified => (&self.unified_used, self.config.unified_memory),
        }
    }

    fn check_device(&self, device: u32, primitive: &str) -> NativeResult<()> {
        if device >= self.config.device_count {
            return Err(NativeError::new(
                NativeErrorKind::InvalidValue,
                format!(
                    "{}: invalid device ordinal {} (device count {})",
                    primitive, device, self.config.device_count
                ),
            ));
        }
        Ok(())
    }

    fn alloc_in(&self, space: Space, bytes: usize, primitive: &str) -> NativeResult<*mut u8> {
        self.native_calls.fetch_add(1, Ordering::Relaxed);

        if let Some(kind) = self.injected.lock().take() {
            return Err(NativeError::new(
                kind,
                format!("{}( bytes = {} ) failed with injected fault", primitive, bytes),
            ));
        }

        // Zero-byte requests succeed with a null address, malloc-style
        if bytes == 0 {
            debug!("{}( bytes = 0 ) returning null", primitive);
            return Ok(std::ptr::null_mut());
        }

        let (used, budget) = self.budget_of(space);
        let before = used.fetch_add(bytes, Ordering::SeqCst);
        if before + bytes > budget {
            used.fetch_sub(bytes, Ordering::SeqCst);
            return Err(NativeError::new(
                NativeErrorKind::OutOfMemory,
                format!(
                    "{}( bytes = {} ) failed: {} space exhausted ({} used / {} total)",
                    primitive,
                    bytes,
                    space.label(),
                    before,
                    budget
                ),
            ));
        }

        let layout = match Layout::from_size_align(bytes, DEVICE_ALLOCATION_ALIGNMENT) {
            Ok(layout) => layout,
            Err(_) => {
                used.fetch_sub(bytes, Ordering::SeqCst);
                return Err(NativeError::new(
                    NativeErrorKind::InvalidValue,
                    format!("{}( bytes = {} ) failed: invalid layout", primitive, bytes),
                ));
            }
        };
        // SAFETY: layout has nonzero size and valid power-of-two alignment
        let ptr = unsafe { alloc(layout) };
        if ptr.is_null() {
            used.fetch_sub(bytes, Ordering::SeqCst);
            return Err(NativeError::new(
                NativeErrorKind::OutOfMemory,
                format!("{}( bytes = {} ) failed: host heap exhausted", primitive, bytes),
            ));
        }

        self.live
            .insert(ptr as usize, LiveAllocation { size: bytes, space });
        debug!("{}( bytes = {} ) returning {:p}", primitive, bytes, ptr);
        Ok(ptr)
    }

    fn free_in(
        &self,
        ptr: *mut u8,
        expected: fn(Space) -> bool,
        primitive: &str,
    ) -> NativeResult<()> {
        self.native_calls.fetch_add(1, Ordering::Relaxed);
        debug!("{}( ptr = {:p} )", primitive, ptr);

        if ptr.is_null() {
            return Ok(());
        }

        let (address, record) = self.live.remove(&(ptr as usize)).ok_or_else(|| {
            NativeError::new(
                NativeErrorKind::InvalidValue,
                format!("{}( ptr = {:p} ) failed: unknown or already freed pointer", primitive, ptr),
            )
        })?;

        if !expected(record.space) {
            // Pointer belongs to a different space; put it back untouched
            self.live.insert(address, record);
            return Err(NativeError::new(
                NativeErrorKind::InvalidValue,
                format!(
                    "{}( ptr = {:p} ) failed: pointer belongs to a different memory space",
                    primitive, ptr
                ),
            ));
        }

        let (used, _) = self.budget_of(record.space);
        used.fetch_sub(record.size, Ordering::SeqCst);
        // SAFETY: ptr came from alloc with this exact layout and was removed
        // from the live table, so it is freed exactly once
        unsafe {
            let layout = Layout::from_size_align_unchecked(record.size, DEVICE_ALLOCATION_ALIGNMENT);
            dealloc(ptr, layout);
        }
        Ok(())
    }

    fn granularity_gate(&self, primitive: &str, granularity: Granularity) -> NativeResult<()> {
        if !self.config.supports_granularity {
            self.native_calls.fetch_add(1, Ordering::Relaxed);
            return Err(NativeError::new(
                NativeErrorKind::NotSupported,
                format!(
                    "{}: {} coherence granularity not supported by this runtime build",
                    primitive, granularity
                ),
            ));
        }
        Ok(())
    }
}

impl Default for SimDeviceRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRuntime for SimDeviceRuntime {
    fn name(&self) -> &str {
        "sim"
    }

    fn vendor(&self) -> Vendor {
        Vendor::Unknown
    }

    fn device_count(&self) -> u32 {
        self.config.device_count
    }

    fn supports_granularity(&self) -> bool {
        self.config.supports_granularity
    }

    fn alloc_device(&self, device: u32, bytes: usize) -> NativeResult<*mut u8> {
        self.check_device(device, "simDeviceMalloc")?;
        self.alloc_in(Space::Device(device), bytes, "simDeviceMalloc")
    }

    fn alloc_device_with_granularity(
        &self,
        device: u32,
        bytes: usize,
        granularity: Granularity,
    ) -> NativeResult<*mut u8> {
        self.granularity_gate("simDeviceMallocWithFlags", granularity)?;
        self.check_device(device, "simDeviceMallocWithFlags")?;
        self.alloc_in(Space::Device(device), bytes, "simDeviceMallocWithFlags")
    }

    fn alloc_pinned(&self, bytes: usize) -> NativeResult<*mut u8> {
        self.alloc_in(Space::Pinned, bytes, "simHostMalloc")
    }

    fn alloc_pinned_with_granularity(
        &self,
        bytes: usize,
        granularity: Granularity,
    ) -> NativeResult<*mut u8> {
        self.granularity_gate("simHostMallocWithFlags", granularity)?;
        self.alloc_in(Space::Pinned, bytes, "simHostMallocWithFlags")
    }

    fn alloc_unified(&self, bytes: usize) -> NativeResult<*mut u8> {
        self.alloc_in(Space::Unified, bytes, "simMallocManaged")
    }

    fn free_device(&self, ptr: *mut u8) -> NativeResult<()> {
        self.free_in(ptr, |space| matches!(space, Space::Device(_)), "simDeviceFree")
    }

    fn free_pinned(&self, ptr: *mut u8) -> NativeResult<()> {
        self.free_in(ptr, |space| space == Space::Pinned, "simHostFree")
    }

    fn free_unified(&self, ptr: *mut u8) -> NativeResult<()> {
        self.free_in(ptr, |space| space == Space::Unified, "simFreeManaged")
    }

    fn publish_allocator_table(&self, table: *const (), len: usize) {
        // Len first so a racing reader never pairs the new pointer with a
        // larger stale length
        self.table_len.store(len, Ordering::SeqCst);
        self.table_ptr.store(table as *mut (), Ordering::SeqCst);
        debug!("published allocator table {:p} (len {})", table, len);
    }

    fn allocator_table(&self) -> (*const (), usize) {
        let ptr = self.table_ptr.load(Ordering::SeqCst) as *const ();
        let len = self.table_len.load(Ordering::SeqCst);
        (ptr, len)
    }

    fn bytes_in_use(&self) -> usize {
        let device: usize = self
            .device_used
            .iter()
            .map(|used| used.load(Ordering::SeqCst))
            .sum();
        device + self.pinned_bytes_in_use() + self.unified_bytes_in_use()
    }
}

impl Drop for SimDeviceRuntime {
    fn drop(&mut self) {
        // Return leaked blocks to the host heap so the process stays clean;
        // the leak is still observable through bytes_in_use before drop
        for entry in self.live.iter() {
            let record = entry.value();
            // SAFETY: every live entry was allocated with this layout
            unsafe {
                let layout =
                    Layout::from_size_align_unchecked(record.size, DEVICE_ALLOCATION_ALIGNMENT);
                dealloc(*entry.key() as *mut u8, layout);
            }
        }
    }
}
