//! Size class computation

/// Smallest order whose block size `2^order` is at least `size`.
///
/// `size` must be non-zero; callers reject empty requests first.
#[inline]
pub fn order_of(size: usize) -> usize {
    debug_assert!(size > 0, "order_of called with zero size");
    if size.is_power_of_two() {
        size.trailing_zeros() as usize
    } else {
        // next_power_of_two() overflows for sizes above the top bit
        (usize::BITS - (size - 1).leading_zeros()) as usize
    }
}

/// Largest order whose block size fits into `size`, i.e. `floor(log2(size))`.
#[inline]
pub fn floor_log2(size: usize) -> usize {
    debug_assert!(size > 0, "floor_log2 called with zero size");
    (usize::BITS - 1 - size.leading_zeros()) as usize
}

/// Number of units in a block of the given order
#[inline]
pub const fn size_for_order(order: usize) -> usize {
    1 << order
}
