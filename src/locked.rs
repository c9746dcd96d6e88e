//! Lock-wrapped buddy allocator.
//!
//! [`BuddyAllocator`] itself is single-threaded. This wrapper serializes every
//! call behind a spin lock so one instance can be shared.

use core::sync::atomic::{AtomicBool, Ordering};

use kspin::SpinNoIrq;

#[cfg(feature = "log")]
use log::warn;

use crate::buddy::{BuddyAllocator, FreeListDump};
use crate::{AllocError, AllocResult};

/// Buddy allocator behind a spin lock, initialized once at runtime
pub struct LockedBuddyAllocator {
    inner: SpinNoIrq<Option<BuddyAllocator>>,
    initialized: AtomicBool,
}

impl LockedBuddyAllocator {
    pub const fn new() -> Self {
        Self {
            inner: SpinNoIrq::new(None),
            initialized: AtomicBool::new(false),
        }
    }

    /// Initialize the allocator for `[base, last]`
    pub fn init(&self, base: usize, last: usize, max_order_cap: usize) -> AllocResult<()> {
        let mut inner = self.inner.lock();
        if inner.is_some() {
            warn!("buddy allocator: already initialized");
            return Err(AllocError::InvalidParam);
        }

        *inner = Some(BuddyAllocator::new(base, last, max_order_cap)?);
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn allocate(&self, size: usize) -> AllocResult<usize> {
        self.inner
            .lock()
            .as_mut()
            .ok_or(AllocError::NoMemory)?
            .allocate(size)
    }

    pub fn deallocate(&self, address: usize, size: usize) -> AllocResult<()> {
        self.inner
            .lock()
            .as_mut()
            .ok_or(AllocError::InvalidFree)?
            .deallocate(address, size)
    }

    /// Snapshot of the free lists, or `None` before initialization
    pub fn dump_free_lists(&self) -> Option<FreeListDump> {
        self.inner.lock().as_ref().map(BuddyAllocator::dump_free_lists)
    }

    /// Run `f` with exclusive access to the underlying allocator
    pub fn with_allocator<R>(&self, f: impl FnOnce(&mut BuddyAllocator) -> R) -> Option<R> {
        self.inner.lock().as_mut().map(f)
    }
}

impl Default for LockedBuddyAllocator {
    fn default() -> Self {
        Self::new()
    }
}
