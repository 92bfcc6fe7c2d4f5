/*!
 * Backend Allocator Strategies
 * Minimal value-type wrappers around one native allocation primitive each
 */

mod device;
mod host;
mod pinned;
mod unified;

pub use device::DeviceHeapAllocator;
pub use host::HostHeapAllocator;
pub use pinned::PinnedHeapAllocator;
pub use unified::UnifiedHeapAllocator;

use crate::backend::{NativeError, NativeErrorKind};
use crate::core::errors::{AllocError, AllocResult};

/// Contract every backend allocation strategy satisfies.
///
/// An address returned by `allocate` uniquely owns its bytes until passed to
/// `deallocate` of the same strategy type, exactly once. Strategies own no
/// memory themselves and are observationally stateless beyond the native
/// subsystem's bookkeeping.
pub trait BlockAllocator: Send + Sync {
    /// Request `bytes` from the native primitive this strategy wraps
    fn allocate(&self, bytes: usize) -> AllocResult<*mut u8>;

    /// Release an address via the matching native free primitive.
    /// A null pointer is a silent no-op.
    fn deallocate(&self, ptr: *mut u8) -> AllocResult<()>;
}

/// Map a failed native allocation into the domain taxonomy: exhaustion
/// becomes `OutOfMemory`, everything else `Runtime`, native text preserved.
pub(crate) fn classify_alloc_failure(requested: usize, error: NativeError) -> AllocError {
    match error.kind() {
        NativeErrorKind::OutOfMemory => AllocError::OutOfMemory {
            requested,
            reason: error.message().to_string(),
        },
        _ => AllocError::Runtime {
            reason: error.message().to_string(),
        },
    }
}

/// Native free failures are never exhaustion; they surface as `Runtime`
pub(crate) fn classify_free_failure(error: NativeError) -> AllocError {
    AllocError::Runtime {
        reason: error.message().to_string(),
    }
}
