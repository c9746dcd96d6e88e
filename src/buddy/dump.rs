//! Read-only snapshot of the free lists

use alloc::vec::Vec;
use core::fmt;

use super::buddy_block::BuddyBlock;

/// Free blocks of every order, most recently freed first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeListDump {
    orders: Vec<Vec<BuddyBlock>>,
}

impl FreeListDump {
    pub(crate) fn new(orders: Vec<Vec<BuddyBlock>>) -> Self {
        Self { orders }
    }

    /// Highest order present in the snapshot
    pub fn max_order(&self) -> usize {
        self.orders.len() - 1
    }

    /// Free blocks of `order`; empty for orders above the maximum
    pub fn blocks(&self, order: usize) -> &[BuddyBlock] {
        self.orders.get(order).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over `(order, blocks)` from order 0 upwards
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[BuddyBlock])> {
        self.orders.iter().map(Vec::as_slice).enumerate()
    }

    /// Total number of free units across all orders
    pub fn free_bytes(&self) -> usize {
        self.orders.iter().flatten().map(BuddyBlock::size).sum()
    }
}

impl fmt::Display for FreeListDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (order, blocks) in self.iter() {
            write!(f, "|ORDER {:02}|", order)?;
            for block in blocks {
                write!(f, " ---> {} ", block)?;
            }
            writeln!(f)?;
        }
        writeln!(f)
    }
}
