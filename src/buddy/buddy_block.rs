//! Buddy block metadata
//!
//! Represents a free block of the managed range as an inclusive offset range.

use core::fmt;

/// Maximum order used when the caller does not pick one
pub const DEFAULT_MAX_ORDER: usize = 10;

/// Buddy block metadata
///
/// `first` and `last` are offsets relative to the allocator base; the block
/// always spans `2^order` units.
#[derive(Debug, Clone, Copy)]
pub struct BuddyBlock {
    pub first: usize,
    pub last: usize,
}

impl BuddyBlock {
    /// Create the block of the given order starting at `first`
    pub const fn new(order: usize, first: usize) -> Self {
        Self {
            first,
            last: first + (1 << order) - 1,
        }
    }

    /// Number of units covered by this block
    pub const fn size(&self) -> usize {
        self.last - self.first + 1
    }

    /// Order of this block, i.e. log2 of its size
    pub const fn order(&self) -> usize {
        self.size().trailing_zeros() as usize
    }

    /// Index of the buddy pair this block belongs to at `order`.
    ///
    /// Both halves of a parent block share the same pair index, which is the
    /// parent's position at `order + 1`.
    pub const fn pair_index(&self, order: usize) -> usize {
        pair_index(self.first, order)
    }

    /// Split into the lower and upper halves
    pub const fn split(&self) -> (BuddyBlock, BuddyBlock) {
        let mid = self.first + (self.last - self.first) / 2;
        (
            BuddyBlock {
                first: self.first,
                last: mid,
            },
            BuddyBlock {
                first: mid + 1,
                last: self.last,
            },
        )
    }
}

/// Pair index of the block at `first` in the given order
#[inline]
pub const fn pair_index(first: usize, order: usize) -> usize {
    first >> (order + 1)
}

impl PartialEq for BuddyBlock {
    fn eq(&self, other: &Self) -> bool {
        self.first == other.first && self.last == other.last
    }
}

impl Eq for BuddyBlock {}

impl fmt::Display for BuddyBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>4}, {:>4}]", self.first, self.last)
    }
}
