//! C5 — the allocator API's core logic.
//!
//! This module holds the actual `alloc`/`free`/`calloc`/`realloc`
//! algorithms, independent of both the C ABI wrapper (`capi.rs`) and the
//! recursion guard (`guard.rs`) that gates entry to them. Every public
//! function here assumes the caller has already established that this
//! thread is not reentering the allocator.

use crate::align::align_up;
use crate::block::{contiguous, Block};
use crate::eventlog::log;
use crate::heaplist::heap;
use crate::mapping::extend_heap;
use crate::merge::{coalesce, split};
use crate::placement::find_free_block;
use crate::policy;
use crate::validate::find_in_use_block;
use std::ptr;

/// Finds or creates a suitably sized, now `IN_USE` block and returns its
/// payload pointer, without emitting a log record itself (callers log
/// under their own operation name: `malloc` vs. `calloc`).
///
/// # Safety
///
/// `aligned_size` must already be a positive multiple of
/// [`crate::align::ALIGNMENT`]. Single-mutator discipline applies.
unsafe fn alloc_raw(aligned_size: usize) -> *mut u8 {
  unsafe {
    let state = heap();

    if state.is_empty() {
      let b = extend_heap(aligned_size);
      return if b.is_null() { ptr::null_mut() } else { Block::payload_ptr(b) };
    }

    let found = find_free_block(state.base, policy::current(), aligned_size);
    if !found.is_null() {
      split(found, aligned_size);
      (*found).is_free = false;
      return Block::payload_ptr(found);
    }

    let b = extend_heap(aligned_size);
    if b.is_null() { ptr::null_mut() } else { Block::payload_ptr(b) }
  }
}

/// `alloc(size)` (spec.md §4.4). `size == 0` returns null.
///
/// # Safety
///
/// Single-mutator discipline applies (no concurrent call into the
/// allocator from another thread).
pub unsafe fn alloc(size: usize) -> *mut u8 {
  unsafe {
    if size == 0 {
      return ptr::null_mut();
    }

    let aligned = align_up(size);
    let ptr = alloc_raw(aligned);
    if !ptr.is_null() {
      log(&format_args!("malloc requested={} aligned={} ptr={:p}", size, aligned, ptr));
    }
    ptr
  }
}

/// `free(p)` (spec.md §4.4). A null pointer is a no-op; an invalid
/// pointer is logged and otherwise ignored (never aborts).
///
/// # Safety
///
/// Single-mutator discipline applies.
pub unsafe fn free(p: *mut u8) {
  unsafe {
    if p.is_null() {
      return;
    }

    let state = heap();
    let block = find_in_use_block(state.base, p);
    if block.is_null() {
      log(&format_args!("free invalid ptr={:p}", p));
      return;
    }

    (*block).is_free = true;
    coalesce(block);
    log(&format_args!("free ptr={:p}", p));
  }
}

/// `calloc(n, elem_size)` (spec.md §4.4). Returns null on overflow of
/// `n * elem_size` or on a zero product; otherwise the returned payload
/// is zeroed for exactly `n * elem_size` bytes.
///
/// # Safety
///
/// Single-mutator discipline applies.
pub unsafe fn calloc(n: usize, elem_size: usize) -> *mut u8 {
  unsafe {
    let Some(total) = n.checked_mul(elem_size) else {
      log(&format_args!("calloc overflow n={} elem_size={}", n, elem_size));
      return ptr::null_mut();
    };

    if total == 0 {
      return ptr::null_mut();
    }

    let aligned = align_up(total);
    let payload = alloc_raw(aligned);
    if !payload.is_null() {
      ptr::write_bytes(payload, 0, total);
      log(&format_args!(
        "calloc n={} elem_size={} total={} ptr={:p}",
        n, elem_size, total, payload
      ));
    }
    payload
  }
}

/// `realloc(p, size)` (spec.md §4.4), implementing all six cases from
/// spec.md §4.4 in order: null pointer, zero size, invalid pointer,
/// in-place shrink, in-place forward-merge expansion, and move.
///
/// # Safety
///
/// Single-mutator discipline applies.
pub unsafe fn realloc(p: *mut u8, size: usize) -> *mut u8 {
  unsafe {
    if p.is_null() {
      return alloc(size);
    }

    if size == 0 {
      free(p);
      return ptr::null_mut();
    }

    let state = heap();
    let block = find_in_use_block(state.base, p);
    if block.is_null() {
      log(&format_args!("realloc invalid ptr={:p}", p));
      return ptr::null_mut();
    }

    let new_size = align_up(size);

    // Case 4: the request already fits; shrink in place via split.
    if new_size <= (*block).size {
      split(block, new_size);
      log(&format_args!("realloc in-place shrink ptr={:p} new_size={}", p, new_size));
      return p;
    }

    // Case 5: a free, physically contiguous successor covers the
    // request once merged forward.
    let next = (*block).next;
    if !next.is_null() && (*next).is_free && contiguous(block, next) {
      let combined = (*block).size + Block::header_size() + (*next).size;
      if combined >= new_size {
        (*block).size = combined;
        (*block).next = (*next).next;
        if !(*block).next.is_null() {
          (*(*block).next).prev = block;
        } else {
          heap().note_tail_candidate(block);
        }
        log(&format_args!("coalesce absorbed={:p} into={:p}", next, block));

        split(block, new_size);
        log(&format_args!("realloc in-place expand ptr={:p} new_size={}", p, new_size));
        return p;
      }
    }

    // Case 6: move. On failure the original pointer is left valid
    // (spec.md §9's restored standard-C guarantee) — we never free it
    // before the new allocation succeeds.
    let new_ptr = alloc(new_size);
    if new_ptr.is_null() {
      return ptr::null_mut();
    }

    let copy_len = (*block).size.min(new_size);
    ptr::copy_nonoverlapping(p, new_ptr, copy_len);
    free(p);
    log(&format_args!("realloc moved old_ptr={:p} new_ptr={:p} new_size={}", p, new_ptr, new_size));
    new_ptr
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::heaplist::heap;
  use crate::policy::Policy;
  use crate::stats::memory_usage_stats;

  fn reset() {
    unsafe { heap().reset() };
  }

  #[test]
  fn zero_size_alloc_returns_null() {
    let _guard = crate::testutil::lock();
    reset();
    unsafe {
      assert!(alloc(0).is_null());
    }
    reset();
  }

  #[test]
  fn coalesce_cascade_scenario() {
    let _guard = crate::testutil::lock();
    reset();
    unsafe {
      let p1 = alloc(100);
      let p2 = alloc(100);
      let p3 = alloc(100);
      assert!(!p1.is_null() && !p2.is_null() && !p3.is_null());

      free(p2);
      assert_eq!(memory_usage_stats(heap().base).free_count, 1);

      free(p1);
      assert_eq!(
        memory_usage_stats(heap().base).free_count,
        1,
        "p1 and p2 are only contiguous if they came from the same mapping"
      );

      free(p3);
      assert_eq!(memory_usage_stats(heap().base).free_count, 1);
    }
    reset();
  }

  #[test]
  fn split_on_oversized_free_scenario() {
    let _guard = crate::testutil::lock();
    reset();
    unsafe {
      let big = alloc(2048);
      assert!(!big.is_null());
      free(big);
      assert_eq!(memory_usage_stats(heap().base).free_count, 1);

      let small = alloc(128);
      assert!(!small.is_null());
      let stats = memory_usage_stats(heap().base);
      assert_eq!(stats.allocated_count, 1);
      assert_eq!(stats.free_count, 1);
    }
    reset();
  }

  #[test]
  fn realloc_shrink_preserves_prefix() {
    let _guard = crate::testutil::lock();
    reset();
    unsafe {
      let p = alloc(50) as *mut u8;
      assert!(!p.is_null());
      let text = b"Este es un texto de prueba largo";
      ptr::copy_nonoverlapping(text.as_ptr(), p, text.len());

      let shrunk = realloc(p, 20);
      assert_eq!(shrunk, p);
      assert_eq!(std::slice::from_raw_parts(shrunk, 20), &text[..20]);
    }
    reset();
  }

  #[test]
  fn realloc_expands_in_place_into_freed_contiguous_neighbor() {
    let _guard = crate::testutil::lock();
    reset();
    unsafe {
      let p1 = alloc(32);
      let p2 = alloc(32);
      assert!(!p1.is_null() && !p2.is_null());
      ptr::copy_nonoverlapping(b"data".as_ptr(), p1, 4);

      free(p2);
      let grown = realloc(p1, 64);
      assert_eq!(grown, p1, "in-place expansion must keep the same pointer");
      assert_eq!(std::slice::from_raw_parts(grown, 4), b"data");
    }
    reset();
  }

  #[test]
  fn realloc_forced_move_preserves_prefix_and_changes_pointer() {
    let _guard = crate::testutil::lock();
    reset();
    unsafe {
      let p = alloc(50);
      assert!(!p.is_null());
      ptr::copy_nonoverlapping(b"hello world, this is a test".as_ptr(), p, 28);
      let _placeholder = alloc(16); // blocks the in-place expansion path

      let moved = realloc(p, 100);
      assert_ne!(moved, p);
      assert_eq!(std::slice::from_raw_parts(moved, 28), b"hello world, this is a test");
    }
    reset();
  }

  #[test]
  fn calloc_zeroes_payload() {
    let _guard = crate::testutil::lock();
    reset();
    unsafe {
      let p = calloc(100, 1);
      assert!(!p.is_null());
      assert!(std::slice::from_raw_parts(p, 100).iter().all(|&b| b == 0));
    }
    reset();
  }

  #[test]
  fn calloc_overflow_returns_null() {
    let _guard = crate::testutil::lock();
    reset();
    unsafe {
      assert!(calloc(usize::MAX, 2).is_null());
    }
    reset();
  }

  #[test]
  fn realloc_null_pointer_behaves_like_alloc() {
    let _guard = crate::testutil::lock();
    reset();
    unsafe {
      let p = realloc(ptr::null_mut(), 16);
      assert!(!p.is_null());
    }
    reset();
  }

  #[test]
  fn realloc_zero_size_behaves_like_free() {
    let _guard = crate::testutil::lock();
    reset();
    unsafe {
      let p = alloc(16);
      assert!(realloc(p, 0).is_null());
      assert_eq!(memory_usage_stats(heap().base).allocated_count, 0);
    }
    reset();
  }

  #[test]
  fn realloc_invalid_pointer_returns_null() {
    let _guard = crate::testutil::lock();
    reset();
    unsafe {
      let bogus = 0x1234usize as *mut u8;
      assert!(realloc(bogus, 16).is_null());
    }
    reset();
  }

  #[test]
  fn free_invalid_pointer_is_not_fatal() {
    let _guard = crate::testutil::lock();
    reset();
    unsafe {
      free(0x1234usize as *mut u8);
    }
    reset();
  }

  #[test]
  fn policy_selection_affects_placement_with_mixed_free_sizes() {
    let _guard = crate::testutil::lock();
    reset();
    unsafe {
      // Build free blocks of size 16, 64, 32 in that list order.
      let a = alloc(16);
      let b = alloc(64);
      let c = alloc(32);
      free(a);
      free(b);
      free(c);

      crate::policy::set(Policy::FirstFit as i32);
      let first = alloc(16);
      assert_eq!(first, a, "first-fit takes the earliest sufficient block");
      free(first);

      crate::policy::set(Policy::BestFit as i32);
      let best = alloc(16);
      assert_eq!(best, a, "best-fit short-circuits on the perfect 16-byte fit");
      free(best);

      crate::policy::set(Policy::WorstFit as i32);
      let worst = alloc(16);
      assert_eq!(worst, b, "worst-fit takes the largest sufficient block");

      crate::policy::set(Policy::FirstFit as i32);
    }
    reset();
  }
}
