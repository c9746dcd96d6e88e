//! Split parity bitmaps
//!
//! One bit per buddy pair and order. The bit of a pair flips every time one
//! of its halves enters or leaves the free list of that order, so it reads
//! 1 exactly when one half is free and the other is not.

use alloc::vec;
use alloc::vec::Vec;

use super::buddy_block::pair_index;

const WORD_BITS: usize = usize::BITS as usize;

/// Observable state of a buddy pair derived from its parity bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    /// Both halves free, or neither half in the free list
    Symmetric,
    /// Exactly one half is in the free list
    Mixed,
}

/// Parity bitmaps for orders `0..=max_order`, sized for the managed range
pub struct SplitParityTracker {
    maps: Vec<Vec<usize>>,
}

impl SplitParityTracker {
    /// Create cleared bitmaps covering `total_size` units
    pub fn new(total_size: usize, max_order: usize) -> Self {
        let maps = (0..=max_order)
            .map(|order| {
                let pairs = (total_size >> (order + 1)) + 1;
                vec![0usize; pairs.div_ceil(WORD_BITS)]
            })
            .collect();
        Self { maps }
    }

    #[inline]
    fn locate(first: usize, order: usize) -> (usize, usize) {
        let bit = pair_index(first, order);
        (bit / WORD_BITS, 1 << (bit % WORD_BITS))
    }

    /// Flip the bit of the pair containing the block at `first` and return
    /// whether it is now set.
    pub fn toggle(&mut self, first: usize, order: usize) -> bool {
        let (word, mask) = Self::locate(first, order);
        let slot = &mut self.maps[order][word];
        *slot ^= mask;
        *slot & mask != 0
    }

    /// Returns whether the bit of the pair containing `first` is set
    pub fn test(&self, first: usize, order: usize) -> bool {
        let (word, mask) = Self::locate(first, order);
        self.maps[order][word] & mask != 0
    }

    /// State of the pair containing the block at `first`
    pub fn pair_state(&self, first: usize, order: usize) -> PairState {
        if self.test(first, order) {
            PairState::Mixed
        } else {
            PairState::Symmetric
        }
    }
}
