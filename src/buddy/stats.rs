//! Statistics and debugging for buddy allocator
//!
//! Provides free/used accounting per order and failure reporting.

use alloc::vec;
use alloc::vec::Vec;

#[cfg(feature = "log")]
use log::error;

use super::node_pool::NodePoolStats;

/// Buddy system statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuddyStats {
    pub total_size: usize,
    pub free_size: usize,
    pub used_size: usize,
    pub live_allocations: usize,
    pub free_blocks_by_order: Vec<usize>,
    /// Free list node arena usage
    pub node_pool: NodePoolStats,
}

impl BuddyStats {
    pub fn new(max_order: usize) -> Self {
        Self {
            total_size: 0,
            free_size: 0,
            used_size: 0,
            live_allocations: 0,
            free_blocks_by_order: vec![0; max_order + 1],
            node_pool: NodePoolStats::default(),
        }
    }

    /// Largest order that currently has a free block
    pub fn largest_free_order(&self) -> Option<usize> {
        self.free_blocks_by_order.iter().rposition(|&count| count > 0)
    }
}

/// Detailed memory statistics reporter
pub struct MemoryStatsReporter;

impl MemoryStatsReporter {
    /// Print detailed allocation failure statistics
    /// This is a standalone function to keep allocation logic clean
    #[allow(unused_variables)]
    pub fn print_alloc_failure_stats(
        base: usize,
        stats: &BuddyStats,
        request_size: usize,
        request_order: usize,
    ) {
        error!("========================================");
        error!(
            "Request: {} units (order {}) from range based at {:#x}",
            request_size, request_order, base
        );
        error!("  Total size: {}", stats.total_size);
        error!("  Free size: {}", stats.free_size);
        error!(
            "  Used size: {} in {} allocations",
            stats.used_size, stats.live_allocations
        );
        error!("  Free blocks by order:");

        for (order, &count) in stats.free_blocks_by_order.iter().enumerate().rev() {
            if count > 0 {
                let block_size = 1usize << order;
                error!(
                    "    Order {}: {} blocks ({} each, {} total)",
                    order,
                    count,
                    block_size,
                    count * block_size
                );
            }
        }
        error!(
            "  List nodes: {} in use, {} free",
            stats.node_pool.allocated_nodes, stats.node_pool.free_nodes
        );
        error!("========================================");
    }
}
