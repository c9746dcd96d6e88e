//! Randomized alternating allocate/free workload
//!
//! Drives the allocator the way a small test harness would: flip a coin,
//! either allocate 1..=8 units or release the oldest outstanding block, and
//! print the free lists after each step. Every step re-checks coverage and
//! the buddy pair parity of all orders.

#![no_std]

extern crate alloc;
extern crate buddy_range_allocator;

use alloc::collections::VecDeque;
use alloc::format;
use alloc::vec;
use alloc::vec::Vec;
use buddy_range_allocator::buddy::{order_of, PairState};
use buddy_range_allocator::{AllocError, BuddyAllocator, FreeListDump};

const TEST_MIN: usize = 1;
const TEST_MAX: usize = 1024;

/// `(base, last, max order cap)` of the ranges under test
const RANGES: [(usize, usize, usize); 6] = [
    (TEST_MIN, TEST_MAX, 10),
    (0, 999, 10),
    (5, 4100, 6),
    (0, 1499, 10),
    (7, 307, 3),
    (0, 0, 10),
];

/// Deterministic xorshift64 generator
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, n: u64) -> usize {
        (self.next() % n) as usize
    }
}

/// Free blocks and outstanding allocations are disjoint and cover the range
fn assert_tiles_range(allocator: &BuddyAllocator, dump: &FreeListDump) {
    let mut ranges: Vec<(usize, usize)> = dump
        .iter()
        .flat_map(|(_, blocks)| blocks.iter().map(|b| (b.first, b.last)))
        .collect();
    for (addr, size) in allocator.live_allocations() {
        let first = addr - allocator.base();
        ranges.push((first, first + (1 << order_of(size)) - 1));
    }
    ranges.sort_unstable();

    let mut expected_first = 0;
    for (first, last) in ranges {
        assert_eq!(first, expected_first, "gap or overlap at offset {}", first);
        expected_first = last + 1;
    }
    assert_eq!(expected_first, allocator.total_size());
}

/// Each pair bit is set exactly when one of its halves is listed, and below
/// the top order no pair has both halves listed.
fn assert_pair_parity(allocator: &BuddyAllocator, dump: &FreeListDump) {
    let total = allocator.total_size();
    for order in 0..=allocator.max_order() {
        let shift = order + 1;
        let mut listed = vec![0u8; (total >> shift) + 1];
        for block in dump.blocks(order) {
            listed[block.first >> shift] += 1;
        }

        for (pair, &count) in listed.iter().enumerate() {
            let first = pair << shift;
            if first >= total {
                continue;
            }
            if order < allocator.max_order() {
                assert!(
                    count < 2,
                    "both halves of pair {} listed at order {}",
                    pair,
                    order
                );
            }
            let mixed = allocator.pair_state(order, first) == Some(PairState::Mixed);
            assert_eq!(mixed, count % 2 == 1, "pair {} at order {}", pair, order);
        }
    }
}

fn check_invariants(allocator: &BuddyAllocator, outstanding: &VecDeque<(usize, usize)>) {
    let live: usize = outstanding.iter().map(|&(_, sz)| 1 << order_of(sz)).sum();
    let dump = allocator.dump_free_lists();
    assert_eq!(dump.free_bytes() + live, allocator.total_size());
    assert_eq!(dump.free_bytes(), allocator.free_bytes());
    assert_eq!(allocator.live_allocations().count(), outstanding.len());

    assert_tiles_range(allocator, &dump);
    assert_pair_parity(allocator, &dump);
}

fn sorted_firsts(dump: &FreeListDump, order: usize) -> Vec<usize> {
    let mut firsts: Vec<usize> = dump.blocks(order).iter().map(|b| b.first).collect();
    firsts.sort_unstable();
    firsts
}

fn run_workload(base: usize, last: usize, cap: usize, seed: u64, count: usize) {
    let mut allocator = BuddyAllocator::new(base, last, cap).unwrap();
    let initial = allocator.dump_free_lists();
    let mut rng = XorShift(seed);
    let mut outstanding: VecDeque<(usize, usize)> = VecDeque::new();
    check_invariants(&allocator, &outstanding);

    for _ in 0..count {
        if rng.below(2) == 1 {
            let sz = rng.below(8) + 1;
            match allocator.allocate(sz) {
                Ok(addr) => {
                    assert!(addr >= base && addr + sz - 1 <= last);
                    outstanding.push_back((addr, sz));
                }
                Err(AllocError::NoMemory) => {}
                Err(AllocError::InvalidSize) => assert!(sz > allocator.total_size()),
                Err(e) => panic!("unexpected error {:?}", e),
            }
        } else if let Some((addr, sz)) = outstanding.pop_front() {
            allocator.deallocate(addr, sz).unwrap();
        }

        let rendered = format!("{}", allocator.dump_free_lists());
        assert_eq!(rendered.lines().count(), allocator.max_order() + 2);
        check_invariants(&allocator, &outstanding);
    }

    while let Some((addr, sz)) = outstanding.pop_front() {
        allocator.deallocate(addr, sz).unwrap();
        check_invariants(&allocator, &outstanding);
    }

    let restored = allocator.dump_free_lists();
    for order in 0..=allocator.max_order() {
        assert_eq!(
            sorted_firsts(&restored, order),
            sorted_firsts(&initial, order),
            "order {}",
            order
        );
    }
}

#[test]
fn test_random_workload_short() {
    run_workload(TEST_MIN, TEST_MAX, 10, 0x9e37_79b9_7f4a_7c15, 64);
}

#[test]
fn test_random_workload_long() {
    for seed in 1..=4u64 {
        run_workload(
            TEST_MIN,
            TEST_MAX,
            10,
            seed.wrapping_mul(0x2545_f491_4f6c_dd1d),
            2000,
        );
    }
}

#[test]
fn test_random_workload_ranges() {
    for (i, &(base, last, cap)) in RANGES.iter().enumerate() {
        let seed = (i as u64 + 1).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        run_workload(base, last, cap, seed, 1500);
    }
}

#[test]
fn test_allocate_until_exhausted() {
    for seed in [42u64, 7, 0xdead_beef] {
        let mut allocator = BuddyAllocator::with_default_order(TEST_MIN, TEST_MAX).unwrap();
        let mut rng = XorShift(seed);
        let mut outstanding = VecDeque::new();

        let failed_size = loop {
            let sz = rng.below(8) + 1;
            match allocator.allocate(sz) {
                Ok(addr) => outstanding.push_back((addr, sz)),
                Err(e) => {
                    assert_eq!(e, AllocError::NoMemory);
                    break sz;
                }
            }
        };
        check_invariants(&allocator, &outstanding);

        // Nothing at or above the failed order may be left free
        let failed_order = order_of(failed_size);
        for (order, blocks) in allocator.dump_free_lists().iter() {
            if order >= failed_order {
                assert!(blocks.is_empty(), "free block left at order {}", order);
            }
        }

        while let Some((addr, sz)) = outstanding.pop_back() {
            allocator.deallocate(addr, sz).unwrap();
        }
        assert_eq!(allocator.free_bytes(), TEST_MAX - TEST_MIN + 1);
        assert_eq!(allocator.free_block_count(10), 1);
    }
}
