//! Shared node arena for the per-order free lists
//!
//! Provides a single pool of list nodes shared across all orders. Nodes are
//! slots in a growable vector addressed by index, so removing an entry never
//! invalidates the position of any other entry.

use alloc::vec::Vec;

use super::buddy_block::BuddyBlock;

/// Simple linked list node stored in the pool
#[derive(Debug, Clone, Copy)]
pub struct ListNode<T> {
    pub data: T,
    pub next: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Used(ListNode<BuddyBlock>),
    Free { next_free: Option<usize> },
}

/// Node pool - all orders share nodes from this pool
///
/// Released slots are chained into a free list and reused before the
/// backing vector grows.
pub struct NodePool {
    slots: Vec<Slot>,
    /// Free list head - index of the first reusable slot
    free_head: Option<usize>,
    /// Current number of free slots in the pool
    free_nodes: usize,
    /// Allocation statistics
    total_allocations: usize,
    total_deallocations: usize,
}

impl NodePool {
    /// Create an empty pool
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            free_nodes: 0,
            total_allocations: 0,
            total_deallocations: 0,
        }
    }

    /// Create a pool with room for `capacity` nodes before growing
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Store `data` in a node and return its index
    pub fn alloc_node(&mut self, data: BuddyBlock, next: Option<usize>) -> usize {
        let node = Slot::Used(ListNode { data, next });
        self.total_allocations += 1;

        match self.free_head {
            Some(idx) => {
                if let Slot::Free { next_free } = self.slots[idx] {
                    self.free_head = next_free;
                }
                self.free_nodes -= 1;
                self.slots[idx] = node;
                idx
            }
            None => {
                self.slots.push(node);
                self.slots.len() - 1
            }
        }
    }

    /// Release a node back to the pool and return the block it held
    ///
    /// The node should not be part of any active list when freed
    pub fn dealloc_node(&mut self, node_idx: usize) -> Option<BuddyBlock> {
        let data = match self.slots.get(node_idx)? {
            Slot::Used(node) => node.data,
            Slot::Free { .. } => return None,
        };

        self.slots[node_idx] = Slot::Free {
            next_free: self.free_head,
        };
        self.free_head = Some(node_idx);
        self.total_deallocations += 1;
        self.free_nodes += 1;
        Some(data)
    }

    /// Get a reference to a node by index
    pub fn get_node(&self, node_idx: usize) -> Option<&ListNode<BuddyBlock>> {
        match self.slots.get(node_idx)? {
            Slot::Used(node) => Some(node),
            Slot::Free { .. } => None,
        }
    }

    /// Get a mutable reference to a node by index
    pub fn get_node_mut(&mut self, node_idx: usize) -> Option<&mut ListNode<BuddyBlock>> {
        match self.slots.get_mut(node_idx)? {
            Slot::Used(node) => Some(node),
            Slot::Free { .. } => None,
        }
    }

    /// Get the number of reusable slots in the pool
    pub fn free_node_count(&self) -> usize {
        self.free_nodes
    }

    /// Get the number of nodes currently linked into lists
    pub fn allocated_node_count(&self) -> usize {
        self.slots.len() - self.free_nodes
    }

    /// Get pool statistics
    pub fn get_stats(&self) -> NodePoolStats {
        NodePoolStats {
            total_nodes: self.slots.len(),
            free_nodes: self.free_nodes,
            allocated_nodes: self.allocated_node_count(),
            total_allocations: self.total_allocations,
            total_deallocations: self.total_deallocations,
        }
    }
}

impl Default for NodePool {
    fn default() -> Self {
        Self::new()
    }
}

/// Node pool statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NodePoolStats {
    pub total_nodes: usize,
    pub free_nodes: usize,
    pub allocated_nodes: usize,
    pub total_allocations: usize,
    pub total_deallocations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_dealloc() {
        let mut pool = NodePool::new();

        let idx1 = pool.alloc_node(BuddyBlock::new(0, 1), None);
        let idx2 = pool.alloc_node(BuddyBlock::new(0, 2), Some(idx1));
        assert_eq!(pool.allocated_node_count(), 2);
        assert_eq!(pool.get_node(idx2).unwrap().next, Some(idx1));

        assert_eq!(pool.dealloc_node(idx1), Some(BuddyBlock::new(0, 1)));
        assert_eq!(pool.free_node_count(), 1);
        assert!(pool.get_node(idx1).is_none());

        // Double release is refused
        assert_eq!(pool.dealloc_node(idx1), None);
        assert_eq!(pool.free_node_count(), 1);
    }

    #[test]
    fn test_slots_are_reused() {
        let mut pool = NodePool::with_capacity(4);
        let a = pool.alloc_node(BuddyBlock::new(1, 0), None);
        let b = pool.alloc_node(BuddyBlock::new(1, 2), None);
        pool.dealloc_node(a);
        pool.dealloc_node(b);

        // LIFO reuse of released slots
        assert_eq!(pool.alloc_node(BuddyBlock::new(1, 4), None), b);
        assert_eq!(pool.alloc_node(BuddyBlock::new(1, 6), None), a);
        assert_eq!(pool.get_stats().total_nodes, 2);
    }

    #[test]
    fn test_node_access() {
        let mut pool = NodePool::new();
        let idx = pool.alloc_node(BuddyBlock::new(0, 0), None);

        if let Some(node) = pool.get_node_mut(idx) {
            node.data = BuddyBlock::new(2, 4);
        }

        let node = pool.get_node(idx).unwrap();
        assert_eq!(node.data.first, 4);
        assert_eq!(node.data.last, 7);
    }

    #[test]
    fn test_stats() {
        let mut pool = NodePool::new();
        let idx1 = pool.alloc_node(BuddyBlock::new(0, 0), None);
        let _idx2 = pool.alloc_node(BuddyBlock::new(0, 1), None);

        let stats = pool.get_stats();
        assert_eq!(stats.total_nodes, 2);
        assert_eq!(stats.allocated_nodes, 2);
        assert_eq!(stats.total_allocations, 2);
        assert_eq!(stats.total_deallocations, 0);

        pool.dealloc_node(idx1);
        let stats2 = pool.get_stats();
        assert_eq!(stats2.free_nodes, 1);
        assert_eq!(stats2.total_deallocations, 1);
    }
}
