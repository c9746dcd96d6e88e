//! Buddy allocator module
//!
//! This module provides the buddy system over a fixed offset range:
//! - Order computation and block geometry
//! - LIFO free lists per order backed by a shared node arena
//! - Split parity bitmaps for the merge decision
//! - Free list snapshots and optional statistics

pub mod buddy_allocator;
pub mod buddy_block;
pub mod dump;
pub mod free_area;
pub mod node_pool;
pub mod order;
pub mod split_parity;
#[cfg(feature = "tracking")]
pub mod stats;

pub use buddy_allocator::BuddyAllocator;
pub use buddy_block::{BuddyBlock, DEFAULT_MAX_ORDER};
pub use dump::FreeListDump;
pub use free_area::{FreeAreaTable, PooledLinkedList};
pub use node_pool::{ListNode, NodePool};
pub use order::order_of;
pub use split_parity::{PairState, SplitParityTracker};
#[cfg(feature = "tracking")]
pub use stats::BuddyStats;
