//! Per-order free lists drawing nodes from a shared pool
//!
//! Each order keeps a LIFO list of free blocks. Only the list structure
//! (head/len) lives in the list itself; nodes come from [`NodePool`].

use alloc::vec::Vec;

#[cfg(feature = "log")]
use log::error;

use super::{buddy_block::BuddyBlock, node_pool::NodePool};

/// Pooled linked list - uses nodes from the shared pool
///
/// Behaves as a stack: the most recently pushed block is popped first.
pub struct PooledLinkedList {
    head: Option<usize>,
    len: usize,
}

impl PooledLinkedList {
    /// Create a new empty pooled linked list
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Push a block on top of the list
    pub fn push_front(&mut self, pool: &mut NodePool, data: BuddyBlock) {
        let idx = pool.alloc_node(data, self.head);
        self.head = Some(idx);
        self.len += 1;
    }

    /// Pop the most recently pushed block
    pub fn pop_front(&mut self, pool: &mut NodePool) -> Option<BuddyBlock> {
        let head_idx = self.head?;
        let next = match pool.get_node(head_idx) {
            Some(node) => node.next,
            None => {
                error!("Head node {} is corrupted", head_idx);
                return None;
            }
        };

        self.head = next;
        self.len -= 1;
        pool.dealloc_node(head_idx)
    }

    /// Find the first node whose block satisfies `pred`
    ///
    /// Returns (node_idx, prev_idx) where prev_idx is the node before it (or None if head)
    pub fn find<F>(&self, pool: &NodePool, mut pred: F) -> Option<(usize, Option<usize>)>
    where
        F: FnMut(&BuddyBlock) -> bool,
    {
        let mut prev_idx = None;
        let mut current_idx = self.head;
        let mut visited = 0;

        while let Some(idx) = current_idx {
            if visited > self.len {
                error!("Potential cycle detected during search");
                return None;
            }

            let node = pool.get_node(idx)?;
            if pred(&node.data) {
                return Some((idx, prev_idx));
            }
            prev_idx = current_idx;
            current_idx = node.next;
            visited += 1;
        }

        None
    }

    /// Remove a node using its known predecessor
    pub fn remove_with_prev(
        &mut self,
        pool: &mut NodePool,
        node_idx: usize,
        prev_idx: Option<usize>,
    ) -> Option<BuddyBlock> {
        let next_idx = pool.get_node(node_idx)?.next;

        match prev_idx {
            Some(prev) => pool.get_node_mut(prev)?.next = next_idx,
            None => {
                if self.head != Some(node_idx) {
                    error!("prev_idx is None but node_idx {} is not head", node_idx);
                    return None;
                }
                self.head = next_idx;
            }
        }

        self.len -= 1;
        pool.dealloc_node(node_idx)
    }

    /// Remove the first block satisfying `pred`
    pub fn remove_first<F>(&mut self, pool: &mut NodePool, pred: F) -> Option<BuddyBlock>
    where
        F: FnMut(&BuddyBlock) -> bool,
    {
        let (idx, prev) = self.find(pool, pred)?;
        self.remove_with_prev(pool, idx, prev)
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the length of the list
    pub fn len(&self) -> usize {
        self.len
    }

    /// Get iterator over elements, top of the stack first
    pub fn iter<'a>(&'a self, pool: &'a NodePool) -> PooledListIter<'a> {
        PooledListIter {
            pool,
            current: self.head,
        }
    }
}

impl Default for PooledLinkedList {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator for PooledLinkedList
pub struct PooledListIter<'a> {
    pool: &'a NodePool,
    current: Option<usize>,
}

impl<'a> Iterator for PooledListIter<'a> {
    type Item = &'a BuddyBlock;

    fn next(&mut self) -> Option<Self::Item> {
        self.current.and_then(|idx| {
            if let Some(node) = self.pool.get_node(idx) {
                self.current = node.next;
                Some(&node.data)
            } else {
                self.current = None;
                None
            }
        })
    }
}

/// Free lists for every order `0..=max_order`
pub struct FreeAreaTable {
    pool: NodePool,
    lists: Vec<PooledLinkedList>,
}

impl FreeAreaTable {
    /// Create empty lists for orders `0..=max_order`
    pub fn new(max_order: usize) -> Self {
        let mut lists = Vec::with_capacity(max_order + 1);
        lists.resize_with(max_order + 1, PooledLinkedList::new);
        Self {
            pool: NodePool::with_capacity(2 * (max_order + 1)),
            lists,
        }
    }

    /// Push a free block to the list of `order`
    pub fn push(&mut self, order: usize, block: BuddyBlock) {
        debug_assert_eq!(block.order(), order);
        self.lists[order].push_front(&mut self.pool, block);
    }

    /// Pop the most recently pushed block of `order`
    pub fn pop(&mut self, order: usize) -> Option<BuddyBlock> {
        self.lists[order].pop_front(&mut self.pool)
    }

    /// Remove the first block of `order` belonging to buddy pair `pair`
    pub fn remove_pair_member(&mut self, order: usize, pair: usize) -> Option<BuddyBlock> {
        self.lists[order].remove_first(&mut self.pool, |b| b.pair_index(order) == pair)
    }

    /// Check if the list of `order` is empty
    pub fn is_empty(&self, order: usize) -> bool {
        self.lists[order].is_empty()
    }

    /// Number of free blocks of `order`
    pub fn len(&self, order: usize) -> usize {
        self.lists.get(order).map_or(0, PooledLinkedList::len)
    }

    /// Iterate over the free blocks of `order`, most recent first
    pub fn iter(&self, order: usize) -> PooledListIter<'_> {
        self.lists[order].iter(&self.pool)
    }

    /// Access the node pool backing the lists
    pub fn pool(&self) -> &NodePool {
        &self.pool
    }
}
