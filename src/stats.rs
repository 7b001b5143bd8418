//! C8 — statistics & consistency check.
//!
//! Read-only traversals. Nothing here is on the allocation hot path; the
//! spec.md §2 control-flow note is explicit that C8 is only invoked by
//! external observers, so unlike C7 it is free to use ordinary buffered
//! `eprintln!` (spec.md §9's open question about stderr reentrancy is
//! moot for an entry point that is never called from inside the
//! recursion guard).

use crate::block::Block;

/// A single snapshot of `memory_usage_stats()` (spec.md §4.5). Header
/// bytes are excluded from both totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryUsageStats {
  pub allocated_bytes: usize,
  pub free_bytes: usize,
  pub allocated_count: usize,
  pub free_count: usize,
}

/// Single traversal producing usage counters.
///
/// # Safety
///
/// `base` must be null or point to the head of a well-formed block list.
pub unsafe fn memory_usage_stats(base: *mut Block) -> MemoryUsageStats {
  unsafe {
    let mut stats = MemoryUsageStats::default();
    let mut current = base;
    while !current.is_null() {
      if (*current).is_free {
        stats.free_bytes += (*current).size;
        stats.free_count += 1;
      } else {
        stats.allocated_bytes += (*current).size;
        stats.allocated_count += 1;
      }
      current = (*current).next;
    }
    stats
  }
}

/// `1.0 - largest_free / total_free`, or `0.0` when there is no free
/// memory at all (spec.md §4.5). Range is always `[0.0, 1.0]`.
///
/// # Safety
///
/// `base` must be null or point to the head of a well-formed block list.
pub unsafe fn fragmentation_rate(base: *mut Block) -> f64 {
  unsafe {
    let mut total_free = 0u64;
    let mut largest_free = 0u64;
    let mut current = base;
    while !current.is_null() {
      if (*current).is_free {
        let size = (*current).size as u64;
        total_free += size;
        largest_free = largest_free.max(size);
      }
      current = (*current).next;
    }

    if total_free == 0 {
      0.0
    } else {
      1.0 - (largest_free as f64 / total_free as f64)
    }
  }
}

/// Scans the list, printing a diagnostic line to stderr for every
/// violation of spec.md §3's invariants #1 (`next.prev == self`) and #4
/// (no two list-adjacent free blocks are physically contiguous). Returns
/// the number of violations found.
///
/// # Safety
///
/// `base` must be null or point to the head of a well-formed block list.
pub unsafe fn check_consistency(base: *mut Block) -> usize {
  unsafe {
    let mut violations = 0usize;
    let mut current = base;
    while !current.is_null() {
      if let Some(next) = (*current).next.as_ref() {
        if next.prev != current {
          eprintln!(
            "rallocator: consistency violation: block {:p}.next.prev != block {:p}",
            current, current
          );
          violations += 1;
        }

        if (*current).is_free && next.is_free && crate::block::contiguous(current, (*current).next) {
          eprintln!(
            "rallocator: consistency violation: free, physically contiguous neighbors {:p} and {:p} were not coalesced",
            current, (*current).next
          );
          violations += 1;
        }
      }
      current = (*current).next;
    }
    violations
  }
}
