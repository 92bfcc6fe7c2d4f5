/*!
 * System Limits and Constants
 *
 * Centralized location for all fixed limits, alignments, and defaults.
 * All values include rationale comments explaining WHY they exist.
 */

// =============================================================================
// DEVICE ALLOCATOR REGISTRY
// =============================================================================

/// Maximum number of device allocators live at once.
/// The registry table is replicated into accelerator-visible memory, so its
/// size is fixed at startup rather than grown dynamically.
pub const TOTAL_DEVICE_ALLOCATORS: usize = 64;

/// Fixed name buffer inside each registry record.
/// Records must be self-contained POD usable from accelerator code, so names
/// are stored inline rather than as host heap strings.
pub const DEVICE_ALLOCATOR_NAME_LEN: usize = 64;

// =============================================================================
// ALLOCATION ALIGNMENT
// =============================================================================

/// Alignment of simulated device/pinned/unified allocations (256B).
/// Matches the texture/coalescing alignment real accelerator heaps hand out.
pub const DEVICE_ALLOCATION_ALIGNMENT: usize = 256;

/// Alignment of host heap allocations (16B).
/// Matches malloc's guarantee on 64-bit platforms.
pub const HOST_ALLOCATION_ALIGNMENT: usize = 16;

// =============================================================================
// SIMULATED RUNTIME DEFAULTS
// =============================================================================

/// Default simulated device heap per ordinal (256MB).
/// Large enough for realistic workloads, small enough to force OOM in tests.
pub const DEFAULT_SIM_DEVICE_MEMORY: usize = 256 * 1024 * 1024;

/// Default simulated pinned host pool (64MB).
/// Pinned memory is a scarce page-locked resource; the budget reflects that.
pub const DEFAULT_SIM_PINNED_MEMORY: usize = 64 * 1024 * 1024;

/// Default simulated unified memory pool (128MB)
pub const DEFAULT_SIM_UNIFIED_MEMORY: usize = 128 * 1024 * 1024;

/// Default simulated device count
pub const DEFAULT_SIM_DEVICE_COUNT: u32 = 1;
