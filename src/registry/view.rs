/*!
 * Device Table View
 * Accelerator-side lookup surface over the last-published table location
 */

use super::record::DeviceAllocator;
use crate::backend::DeviceRuntime;

/// What a kernel sees: the allocator table as of the last publish.
///
/// A view captures the runtime's device symbol at a point in time and is
/// never written through; it models accelerator code reading the global.
/// Lookup misses (out-of-range id, unknown name, capture before the first
/// publish) return an uninitialized handle whose every operation is inert,
/// rather than touching memory outside the table.
#[derive(Debug, Clone, Copy)]
pub struct DeviceTableView {
    table: *const DeviceAllocator,
    len: usize,
}

// SAFETY: the view is read-only over records whose only mutable state is an
// atomic cell; staleness relative to host mutation is the documented
// synchronization contract, not a data race on the view itself
unsafe impl Send for DeviceTableView {}
unsafe impl Sync for DeviceTableView {}

impl DeviceTableView {
    /// Read the runtime's accelerator-visible table global
    pub fn capture(runtime: &dyn DeviceRuntime) -> Self {
        let (table, len) = runtime.allocator_table();
        Self {
            table: table as *const DeviceAllocator,
            len,
        }
    }

    /// False until the first publish
    pub fn is_published(&self) -> bool {
        !self.table.is_null()
    }

    /// Records visible through this view
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Id-indexed lookup
    pub fn get(&self, id: u32) -> DeviceAllocator {
        if self.table.is_null() || id as usize >= self.len {
            return DeviceAllocator::uninitialized();
        }
        // SAFETY: id < len, inside the published table
        unsafe { *self.table.add(id as usize) }
    }

    /// Linear name lookup
    pub fn get_by_name(&self, name: &str) -> DeviceAllocator {
        self.records()
            .find(|record| record.name_matches(name))
            .unwrap_or_else(DeviceAllocator::uninitialized)
    }

    /// Whether an id resolves to an active record in this view
    pub fn exists(&self, id: u32) -> bool {
        self.get(id).is_initialized()
    }

    /// Whether a name resolves to an active record in this view
    pub fn exists_by_name(&self, name: &str) -> bool {
        self.get_by_name(name).is_initialized()
    }

    fn records(&self) -> impl Iterator<Item = DeviceAllocator> + '_ {
        let table = self.table;
        let len = if table.is_null() { 0 } else { self.len };
        // SAFETY: slot < len and the table is non-null on this path
        (0..len).map(move |slot| unsafe { *table.add(slot) })
    }
}
