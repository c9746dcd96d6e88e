//! Buddy allocator over a fixed offset range
//!
//! Splits power-of-two blocks on demand and coalesces freed buddies, using a
//! parity bit per buddy pair to decide when both halves are free.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::{AllocError, AllocResult};

#[cfg(feature = "log")]
use log::{debug, error, trace, warn};

#[cfg(feature = "tracking")]
use super::stats::{BuddyStats, MemoryStatsReporter};
use super::{
    buddy_block::{pair_index, BuddyBlock, DEFAULT_MAX_ORDER},
    dump::FreeListDump,
    free_area::FreeAreaTable,
    order::{floor_log2, order_of, size_for_order},
    split_parity::{PairState, SplitParityTracker},
};

/// Buddy allocator managing the inclusive range `[base, last]`
///
/// Free blocks are kept in one LIFO list per order. Every outstanding
/// allocation is recorded so that invalid frees are rejected instead of
/// corrupting the free lists.
pub struct BuddyAllocator {
    base: usize,
    total_size: usize,
    max_order: usize,
    free_area: FreeAreaTable,
    parity: SplitParityTracker,
    /// Outstanding allocations: address -> requested size
    live: BTreeMap<usize, usize>,
    free_bytes: usize,
    #[cfg(feature = "tracking")]
    stats: BuddyStats,
}

impl BuddyAllocator {
    /// Create an allocator for `[base, last]` whose largest block order is
    /// at most `max_order_cap`.
    ///
    /// The range is carved into the largest blocks that fit, top order first,
    /// so a size that is not a power of two is covered by progressively
    /// smaller blocks.
    pub fn new(base: usize, last: usize, max_order_cap: usize) -> AllocResult<Self> {
        if last < base {
            error!(
                "buddy allocator: invalid range [{:#x}, {:#x}]",
                base, last
            );
            return Err(AllocError::InvalidParam);
        }
        let total_size = (last - base)
            .checked_add(1)
            .ok_or(AllocError::InvalidParam)?;
        let max_order = floor_log2(total_size).min(max_order_cap);

        let mut allocator = Self {
            base,
            total_size,
            max_order,
            free_area: FreeAreaTable::new(max_order),
            parity: SplitParityTracker::new(total_size, max_order),
            live: BTreeMap::new(),
            free_bytes: 0,
            #[cfg(feature = "tracking")]
            stats: BuddyStats::new(max_order),
        };

        let mut cursor = 0;
        for order in (0..=max_order).rev() {
            let block_size = size_for_order(order);
            while total_size - cursor >= block_size {
                allocator.push_free(order, cursor);
                cursor += block_size;
            }
        }
        debug_assert_eq!(cursor, total_size);

        debug!(
            "buddy allocator: range [{:#x}, {:#x}] size {} max order {}",
            base, last, total_size, max_order
        );
        #[cfg(feature = "tracking")]
        allocator.update_stats();

        Ok(allocator)
    }

    /// Create an allocator for `[base, last]` with [`DEFAULT_MAX_ORDER`]
    pub fn with_default_order(base: usize, last: usize) -> AllocResult<Self> {
        Self::new(base, last, DEFAULT_MAX_ORDER)
    }

    pub fn base(&self) -> usize {
        self.base
    }

    /// Number of units managed by this allocator
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn max_order(&self) -> usize {
        self.max_order
    }

    /// Units currently held in free lists
    pub fn free_bytes(&self) -> usize {
        self.free_bytes
    }

    /// Units handed out, counted at block granularity
    pub fn used_bytes(&self) -> usize {
        self.total_size - self.free_bytes
    }

    /// Number of free blocks of the given order
    pub fn free_block_count(&self, order: usize) -> usize {
        self.free_area.len(order)
    }

    /// Whether `address` is an outstanding allocation
    pub fn is_allocated(&self, address: usize) -> bool {
        self.live.contains_key(&address)
    }

    /// Outstanding allocations as `(address, size)`, ordered by address
    pub fn live_allocations(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.live.iter().map(|(&addr, &size)| (addr, size))
    }

    /// Parity state of the buddy pair containing the block at `offset`
    pub fn pair_state(&self, order: usize, offset: usize) -> Option<PairState> {
        (order <= self.max_order && offset < self.total_size)
            .then(|| self.parity.pair_state(offset, order))
    }

    #[cfg(feature = "tracking")]
    pub fn get_stats(&self) -> BuddyStats {
        self.stats.clone()
    }

    /// Allocate a block of at least `size` units and return its address
    pub fn allocate(&mut self, size: usize) -> AllocResult<usize> {
        if size == 0 || size > self.total_size {
            debug!(
                "buddy allocator: rejected size {} (total {})",
                size, self.total_size
            );
            return Err(AllocError::InvalidSize);
        }

        let order = order_of(size);
        if order > self.max_order {
            return Err(self.out_of_memory(size, order));
        }

        loop {
            if let Some(block) = self.pop_free(order) {
                let address = self.base + block.first;
                self.live.insert(address, size);
                trace!(
                    "buddy allocator: allocated {} at {:#x} (order {})",
                    size,
                    address,
                    order
                );
                #[cfg(feature = "tracking")]
                self.update_stats();
                return Ok(address);
            }

            // Nothing at this order: split the nearest larger block and retry
            let candidate = (order + 1..=self.max_order).find(|&o| !self.free_area.is_empty(o));
            match candidate {
                Some(candidate) => self.split(candidate),
                None => return Err(self.out_of_memory(size, order)),
            }
        }
    }

    /// Return an allocation made with [`allocate`](Self::allocate).
    ///
    /// `size` must be the size passed to the matching `allocate` call.
    #[cfg_attr(not(feature = "log"), allow(unused_variables))]
    pub fn deallocate(&mut self, address: usize, size: usize) -> AllocResult {
        match self.live.get(&address) {
            Some(&recorded) if recorded == size => {}
            Some(&recorded) => {
                warn!(
                    "buddy allocator: free of {:#x} with size {} but it was allocated with {}",
                    address, size, recorded
                );
                return Err(AllocError::InvalidFree);
            }
            None => {
                warn!(
                    "buddy allocator: free of {:#x} which is not allocated",
                    address
                );
                return Err(AllocError::InvalidFree);
            }
        }
        self.live.remove(&address);

        let order = order_of(size);
        self.merge(order, address - self.base);
        trace!(
            "buddy allocator: freed {} at {:#x} (order {})",
            size,
            address,
            order
        );
        #[cfg(feature = "tracking")]
        self.update_stats();
        Ok(())
    }

    /// Snapshot of every free list, most recently inserted block first
    pub fn dump_free_lists(&self) -> FreeListDump {
        let orders = (0..=self.max_order)
            .map(|order| self.free_area.iter(order).copied().collect::<Vec<_>>())
            .collect();
        FreeListDump::new(orders)
    }

    /// Insert the block of `order` at `first` into its free list.
    ///
    /// Returns whether its pair is now mixed.
    fn push_free(&mut self, order: usize, first: usize) -> bool {
        self.free_area.push(order, BuddyBlock::new(order, first));
        self.free_bytes += size_for_order(order);
        self.parity.toggle(first, order)
    }

    fn pop_free(&mut self, order: usize) -> Option<BuddyBlock> {
        let block = self.free_area.pop(order)?;
        self.parity.toggle(block.first, order);
        self.free_bytes -= block.size();
        Some(block)
    }

    fn take_pair_member(&mut self, order: usize, pair: usize) -> Option<BuddyBlock> {
        let block = self.free_area.remove_pair_member(order, pair)?;
        self.parity.toggle(block.first, order);
        self.free_bytes -= block.size();
        Some(block)
    }

    /// Split the most recent free block of `order` into two halves one order down
    fn split(&mut self, order: usize) {
        let Some(block) = self.pop_free(order) else {
            return;
        };
        let (low, high) = block.split();
        trace!(
            "buddy allocator: split {} at order {} into {} and {}",
            block,
            order,
            low,
            high
        );
        // Lower half ends up on top so allocations fill from low offsets
        self.push_free(order - 1, high.first);
        self.push_free(order - 1, low.first);
    }

    /// Insert a freed block and coalesce it with its buddy as long as both
    /// halves are free.
    fn merge(&mut self, mut order: usize, mut first: usize) {
        loop {
            let mixed = self.push_free(order, first);
            if mixed || order == self.max_order {
                return;
            }

            let pair = pair_index(first, order);
            match (
                self.take_pair_member(order, pair),
                self.take_pair_member(order, pair),
            ) {
                (Some(a), Some(b)) => {
                    first = a.first.min(b.first);
                    trace!(
                        "buddy allocator: merged {} and {} into order {}",
                        a,
                        b,
                        order + 1
                    );
                    order += 1;
                }
                (a, b) => {
                    error!(
                        "buddy allocator: parity of pair {} at order {} out of sync",
                        pair, order
                    );
                    for block in [a, b].into_iter().flatten() {
                        self.push_free(order, block.first);
                    }
                    return;
                }
            }
        }
    }

    #[cfg_attr(
        not(any(feature = "log", feature = "tracking")),
        allow(unused_variables)
    )]
    fn out_of_memory(&self, size: usize, order: usize) -> AllocError {
        debug!(
            "buddy allocator: Allocation failure: {} units (order {}), {} free",
            size, order, self.free_bytes
        );
        #[cfg(feature = "tracking")]
        MemoryStatsReporter::print_alloc_failure_stats(self.base, &self.stats, size, order);
        AllocError::NoMemory
    }

    #[cfg(feature = "tracking")]
    fn update_stats(&mut self) {
        let mut stats = BuddyStats::new(self.max_order);
        stats.total_size = self.total_size;
        for order in 0..=self.max_order {
            stats.free_blocks_by_order[order] = self.free_area.len(order);
        }
        stats.free_size = self.free_bytes;
        stats.used_size = self.used_bytes();
        stats.live_allocations = self.live.len();
        stats.node_pool = self.free_area.pool().get_stats();
        self.stats = stats;
    }
}
