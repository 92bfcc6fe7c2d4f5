/*!
 * Device Allocator Record
 * POD record/handle with atomic bump allocation over a device-visible block
 */

use crate::core::limits::DEVICE_ALLOCATOR_NAME_LEN;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One registry record, simultaneously the table entry and the handle.
///
/// Handles are by-value copies of the record: copies share state through the
/// interior `counter` pointer, so a bump made through any copy (host or
/// accelerator side) is visible through all of them. The record is
/// self-contained: accelerator code needs only the handle and the
/// last-published table location, never a host-only pointer.
///
/// The name is stored inline in a fixed buffer so the record stays POD and
/// usable from accelerator code.
///
/// Handles are valid only while the registry's records are alive: after
/// registry-wide teardown, previously copied handles still read as
/// initialized but their `data`/`counter` point at released memory. Using
/// one past teardown is a caller contract violation the record cannot
/// detect.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct DeviceAllocator {
    id: u32,
    name_len: u32,
    name: [u8; DEVICE_ALLOCATOR_NAME_LEN],
    data: *mut u8,
    capacity: usize,
    /// Offset/high-water cell in host+device-accessible memory, shared by
    /// every copy of this record
    counter: *mut AtomicUsize,
    initialized: bool,
}

// SAFETY: the only mutable state reachable from a handle is the atomic
// offset cell; `data` is handed out raw and ownership of its bytes is the
// caller's concern, as with any allocator
unsafe impl Send for DeviceAllocator {}
unsafe impl Sync for DeviceAllocator {}

impl DeviceAllocator {
    pub(crate) fn new(
        id: u32,
        name: Option<&str>,
        data: *mut u8,
        capacity: usize,
        counter: *mut AtomicUsize,
    ) -> Self {
        let mut name_buf = [0u8; DEVICE_ALLOCATOR_NAME_LEN];
        let mut name_len = 0u32;
        if let Some(name) = name {
            name_buf[..name.len()].copy_from_slice(name.as_bytes());
            name_len = name.len() as u32;
        }
        Self {
            id,
            name_len,
            name: name_buf,
            data,
            capacity,
            counter,
            initialized: true,
        }
    }

    /// An empty slot / miss sentinel: every operation on it is inert
    pub(crate) fn uninitialized() -> Self {
        Self {
            id: 0,
            name_len: 0,
            name: [0u8; DEVICE_ALLOCATOR_NAME_LEN],
            data: std::ptr::null_mut(),
            capacity: 0,
            counter: std::ptr::null_mut(),
            initialized: false,
        }
    }

    /// Bump-allocate `bytes` from the record's block.
    ///
    /// Returns null on exhaustion (accelerator threads cannot unwind) and on
    /// an uninitialized handle. Offsets are raw: no per-allocation alignment
    /// is applied.
    pub fn allocate(&self, bytes: usize) -> *mut u8 {
        if !self.initialized {
            return std::ptr::null_mut();
        }
        // SAFETY: initialized records carry a counter cell that stays live
        // until registry teardown; the caller must not use handles past it
        let counter = unsafe { &*self.counter };
        let offset = counter.fetch_add(bytes, Ordering::SeqCst);
        match offset.checked_add(bytes) {
            // SAFETY: offset + bytes <= capacity, so the result stays inside
            // the record's block
            Some(end) if end <= self.capacity => unsafe { self.data.add(offset) },
            _ => {
                counter.fetch_sub(bytes, Ordering::SeqCst);
                std::ptr::null_mut()
            }
        }
    }

    /// Rewind the shared offset to zero, reclaiming the whole block.
    ///
    /// Host-side operation between launches; the caller must ensure no
    /// kernel is concurrently allocating from this record.
    pub fn reset(&self) {
        if !self.initialized {
            return;
        }
        // SAFETY: see allocate
        unsafe { &*self.counter }.store(0, Ordering::SeqCst);
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        if self.name_len == 0 {
            return None;
        }
        std::str::from_utf8(&self.name[..self.name_len as usize]).ok()
    }

    pub(crate) fn name_matches(&self, name: &str) -> bool {
        self.name_len as usize == name.len() && &self.name[..name.len()] == name.as_bytes()
    }

    /// Start of the backing block
    pub fn data(&self) -> *mut u8 {
        self.data
    }

    /// Total capacity of the backing block in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current offset/high-water mark, clamped to capacity
    pub fn used(&self) -> usize {
        if !self.initialized {
            return 0;
        }
        // SAFETY: see allocate. Clamp: a racing failed bump may transiently
        // push the cell past capacity before backing off.
        unsafe { &*self.counter }.load(Ordering::SeqCst).min(self.capacity)
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.used()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl fmt::Debug for DeviceAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceAllocator")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("capacity", &self.capacity)
            .field("initialized", &self.initialized)
            .finish()
    }
}
