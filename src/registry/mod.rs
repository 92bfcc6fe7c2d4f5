/*!
 * Device Allocator Registry
 *
 * A fixed-capacity table of device-usable allocator records, replicated
 * between host-addressable and accelerator-addressable memory.
 *
 * The host owns a mutable table; the accelerator side reads a separately
 * published copy of the table's location (the runtime's device symbol). The
 * two are kept in agreement only by the explicit [`DeviceAllocatorRegistry::synchronize`]
 * step: records created or destroyed after the last publish are not visible
 * to accelerator code until the next one. That publish is the happens-before
 * edge between host mutation and kernel reads; the registry never
 * resynchronizes implicitly.
 *
 * Host-side mutation takes `&mut self`, so cross-thread mutation must be
 * serialized by the caller (wrap the registry in a lock). Lookups and
 * synchronization take `&self`.
 */

pub mod record;
pub mod view;

pub use record::DeviceAllocator;
pub use view::DeviceTableView;

use crate::backend::DeviceRuntime;
use crate::core::errors::{AllocError, AllocResult};
use crate::core::limits::{DEVICE_ALLOCATOR_NAME_LEN, TOTAL_DEVICE_ALLOCATORS};
use crate::core::types::Platform;
use crate::resource::Allocator;
use log::{error, info, warn};
use std::mem::size_of;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

/// Host-side bookkeeping for one active record: where its block and offset
/// cell came from, so teardown can return them
struct RecordBacking {
    allocator: Allocator,
    data: *mut u8,
    bytes: usize,
    counter: *mut AtomicUsize,
}

/// Host-side orchestration of the mirrored device allocator table
pub struct DeviceAllocatorRegistry {
    runtime: Arc<dyn DeviceRuntime>,
    /// Supplies the table and every offset cell; must be accessible from
    /// both host and its own device context
    table_allocator: Allocator,
    table: *mut DeviceAllocator,
    capacity: usize,
    len: usize,
    backing: Vec<RecordBacking>,
}

impl std::fmt::Debug for DeviceAllocatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceAllocatorRegistry")
            .field("table", &self.table)
            .field("capacity", &self.capacity)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl DeviceAllocatorRegistry {
    pub fn new(runtime: Arc<dyn DeviceRuntime>, table_allocator: Allocator) -> AllocResult<Self> {
        Self::with_capacity(runtime, table_allocator, TOTAL_DEVICE_ALLOCATORS)
    }

    /// Create a registry with a custom slot count (useful for testing)
    pub fn with_capacity(
        runtime: Arc<dyn DeviceRuntime>,
        table_allocator: Allocator,
        capacity: usize,
    ) -> AllocResult<Self> {
        // The table and offset cells are read from kernels and written from
        // the host, so the backing resource must be visible to both
        let platform = table_allocator.platform();
        if !matches!(platform, Platform::Device(_))
            || !table_allocator.is_accessible_from(Platform::Host)
            || !table_allocator.is_accessible_from(platform)
        {
            return Err(AllocError::Configuration {
                reason: format!(
                    "table allocator '{}' must be accessible from both host and its device context",
                    table_allocator.name()
                ),
            });
        }

        let table = table_allocator.allocate(capacity * size_of::<DeviceAllocator>())?
            as *mut DeviceAllocator;
        for slot in 0..capacity {
            // SAFETY: slot < capacity, inside the block just allocated
            unsafe { table.add(slot).write(DeviceAllocator::uninitialized()) };
        }

        info!(
            "device allocator registry initialized: {} slots, table from '{}'",
            capacity,
            table_allocator.name()
        );
        Ok(Self {
            runtime,
            table_allocator,
            table,
            capacity,
            len: 0,
            backing: Vec::with_capacity(capacity),
        })
    }

    /// Create a record backed by `bytes` drawn from `allocator`, claiming the
    /// next free slot, and return it by value.
    ///
    /// Fails with a capacity error when all slots are claimed and with a
    /// configuration error on a duplicate or oversized non-empty name. The
    /// new record is reachable from host lookups immediately but not from
    /// accelerator code until the next [`Self::synchronize`].
    pub fn make_device_allocator(
        &mut self,
        allocator: &Allocator,
        bytes: usize,
        name: Option<&str>,
    ) -> AllocResult<DeviceAllocator> {
        if self.len == self.capacity {
            return Err(AllocError::Capacity {
                limit: self.capacity,
            });
        }

        if let Some(name) = name {
            if name.is_empty() {
                return Err(AllocError::Configuration {
                    reason: "device allocator name must be non-empty; omit it for an unnamed record"
                        .into(),
                });
            }
            if name.len() >= DEVICE_ALLOCATOR_NAME_LEN {
                return Err(AllocError::Configuration {
                    reason: format!(
                        "device allocator name '{}' exceeds {} bytes",
                        name,
                        DEVICE_ALLOCATOR_NAME_LEN - 1
                    ),
                });
            }
            if self.active_slots().any(|record| record.name_matches(name)) {
                return Err(AllocError::Configuration {
                    reason: format!("device allocator named '{}' already exists", name),
                });
            }
        }

        // The offset cell lives in the same host+device-accessible space as
        // the table so every handle copy and both sides share one value
        let counter = self.table_allocator.allocate(size_of::<AtomicUsize>())? as *mut AtomicUsize;
        // SAFETY: counter points to a fresh, suitably sized block
        unsafe { counter.write(AtomicUsize::new(0)) };

        let data = match allocator.allocate(bytes) {
            Ok(data) => data,
            Err(err) => {
                if let Err(free_err) = self
                    .table_allocator
                    .deallocate(counter as *mut u8, size_of::<AtomicUsize>())
                {
                    error!("failed to release offset cell after allocation failure: {}", free_err);
                }
                return Err(err);
            }
        };

        let id = self.len as u32;
        let record = DeviceAllocator::new(id, name, data, bytes, counter);
        // SAFETY: len < capacity was checked above
        unsafe { self.table.add(self.len).write(record) };
        self.backing.push(RecordBacking {
            allocator: allocator.clone(),
            data,
            bytes,
            counter,
        });
        self.len += 1;

        info!(
            "created device allocator {} ('{}', {} bytes from '{}')",
            id,
            name.unwrap_or("<unnamed>"),
            bytes,
            allocator.name()
        );
        Ok(record)
    }

    /// Host-side lookup by id
    pub fn get(&self, id: u32) -> Option<DeviceAllocator> {
        if (id as usize) < self.len {
            // SAFETY: id < len <= capacity
            Some(unsafe { *self.table.add(id as usize) })
        } else {
            None
        }
    }

    /// Host-side lookup by name
    pub fn get_by_name(&self, name: &str) -> Option<DeviceAllocator> {
        self.active_slots().find(|record| record.name_matches(name))
    }

    /// Whether an active record with this id exists; safe to call speculatively
    pub fn exists(&self, id: u32) -> bool {
        self.get(id).is_some_and(|record| record.is_initialized())
    }

    /// Whether an active record with this name exists; safe to call speculatively
    pub fn exists_by_name(&self, name: &str) -> bool {
        self.get_by_name(name).is_some()
    }

    /// Release every active record's backing storage to its originating
    /// allocator and return all slots to empty. All-or-nothing by design:
    /// there is no per-record destruction. Idempotent on an empty registry.
    ///
    /// The sweep always completes; the first deallocation failure is
    /// returned after it.
    ///
    /// Handles copied out before teardown become invalid: their block and
    /// offset cell are released here, and using one afterwards is a caller
    /// bug this registry does not detect.
    pub fn destroy_device_allocators(&mut self) -> AllocResult<()> {
        if self.backing.is_empty() {
            return Ok(());
        }

        let destroyed = self.backing.len();
        let mut first_error = None;
        for backing in self.backing.drain(..) {
            if let Err(err) = backing.allocator.deallocate(backing.data, backing.bytes) {
                error!(
                    "failed to return device allocator block to '{}': {}",
                    backing.allocator.name(),
                    err
                );
                first_error.get_or_insert(err);
            }
            if let Err(err) = self
                .table_allocator
                .deallocate(backing.counter as *mut u8, size_of::<AtomicUsize>())
            {
                error!("failed to release offset cell: {}", err);
                first_error.get_or_insert(err);
            }
        }

        for slot in 0..self.len {
            // SAFETY: slot < len <= capacity
            unsafe { self.table.add(slot).write(DeviceAllocator::uninitialized()) };
        }
        self.len = 0;

        info!("destroyed {} device allocator(s)", destroyed);
        match first_error {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Republish the host table's location into the accelerator-visible
    /// global. Manual and explicit: callers must invoke this between host
    /// mutation and the next accelerator-side access.
    pub fn synchronize(&self) {
        self.runtime
            .publish_allocator_table(self.table as *const (), self.len);
        info!("synchronized device allocator table ({} active record(s))", self.len);
    }

    /// Number of active records
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fixed slot capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn active_slots(&self) -> impl Iterator<Item = DeviceAllocator> + '_ {
        // SAFETY: slots below len always hold initialized records
        (0..self.len).map(move |slot| unsafe { *self.table.add(slot) })
    }
}

impl Drop for DeviceAllocatorRegistry {
    fn drop(&mut self) {
        if self.len > 0 {
            warn!(
                "device allocator registry dropped with {} active record(s); tearing down",
                self.len
            );
        }
        if let Err(err) = self.destroy_device_allocators() {
            error!("teardown during registry drop failed: {}", err);
        }
        // Retract the published symbol before the table memory goes away so
        // no later view can capture a location about to be freed
        if self.runtime.allocator_table().0 == self.table as *const () {
            self.runtime.publish_allocator_table(std::ptr::null(), 0);
        }
        if let Err(err) = self.table_allocator.deallocate(
            self.table as *mut u8,
            self.capacity * size_of::<DeviceAllocator>(),
        ) {
            error!("failed to release device allocator table: {}", err);
        }
    }
}
