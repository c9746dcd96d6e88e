//! Buddy range allocator
//!
//! This crate manages a fixed, contiguous offset range with the buddy system,
//! featuring:
//! - Order computation for power-of-two size classes
//! - LIFO free lists per order backed by a shared node arena
//! - Split parity bitmaps deciding when two buddies may coalesce
//! - Live-allocation tracking that rejects invalid frees
//! - A lock-wrapped handle for shared use

#![no_std]

extern crate alloc;

use core::fmt;

// Logging support - conditionally import log crate
#[cfg(feature = "log")]
extern crate log;

// Stub macros when log is disabled - these become no-ops
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! error {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! warn {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! info {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// The error type used for allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// Invalid construction range, or the allocator was initialized twice.
    InvalidParam,
    /// Requested size is zero or larger than the managed range.
    InvalidSize,
    /// No free block of a sufficient order is available.
    NoMemory,
    /// Deallocation of an address that is not outstanding, or with a size
    /// different from the one it was allocated with.
    InvalidFree,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            AllocError::InvalidParam => "invalid allocator parameters",
            AllocError::InvalidSize => "invalid allocation size",
            AllocError::NoMemory => "out of memory",
            AllocError::InvalidFree => "invalid free",
        };
        f.write_str(msg)
    }
}

/// A [`Result`] type with [`AllocError`] as the error type.
pub type AllocResult<T = ()> = Result<T, AllocError>;

pub mod buddy;
#[cfg(feature = "tracking")]
pub use buddy::BuddyStats;
pub use buddy::{BuddyAllocator, BuddyBlock, FreeListDump, DEFAULT_MAX_ORDER};

pub mod locked;
pub use locked::LockedBuddyAllocator;
