//! C4 — split and coalesce.
//!
//! The single most important correctness property of this design (per
//! spec.md §9) is that list-adjacency never substitutes for physical
//! adjacency: every merge decision here re-checks `contiguous` even
//! though the blocks involved are already known to be list-neighbors.

use crate::align::ALIGNMENT;
use crate::block::{contiguous, Block};
use crate::eventlog::log;
use crate::heaplist::heap;

/// Subdivides `b` into an exact-size front of `requested_size` bytes and
/// a free trailing remainder, if the remainder would be large enough to
/// host a usable fragment (`b.size >= requested_size + HEADER_SIZE +
/// ALIGNMENT`). Otherwise leaves `b` as-is (accepted internal
/// fragmentation).
///
/// Precondition: `(*b).size >= requested_size`.
///
/// # Safety
///
/// `b` must be a valid, reachable, currently `IN_USE`-bound block header
/// about to be marked in use by the caller.
pub unsafe fn split(b: *mut Block, requested_size: usize) {
  unsafe {
    debug_assert!((*b).size >= requested_size);

    let header_size = Block::header_size();
    if (*b).size < requested_size + header_size + ALIGNMENT {
      return;
    }

    let remainder_size = (*b).size - requested_size - header_size;
    let remainder_addr = Block::payload_ptr(b).add(requested_size) as *mut Block;

    Block::init(remainder_addr, remainder_size, b);
    (*remainder_addr).is_free = true;
    (*remainder_addr).next = (*b).next;

    if let Some(next) = (*b).next.as_mut() {
      next.prev = remainder_addr;
    } else {
      heap().note_tail_candidate(remainder_addr);
    }

    (*b).next = remainder_addr;
    (*b).size = requested_size;

    log(&format_args!(
      "split_block original={:p} front_size={} remainder={:p} remainder_size={}",
      b, requested_size, remainder_addr, remainder_size
    ));
  }
}

/// Merges `b` with a free, physically contiguous predecessor and/or
/// successor. Returns the (possibly different) block pointer that now
/// represents the merged free region.
///
/// # Safety
///
/// `b` must be a valid, reachable, currently `FREE` block header.
pub unsafe fn coalesce(mut b: *mut Block) -> *mut Block {
  unsafe {
    // Backward: absorb `b` into a free, physically contiguous `prev`.
    if let Some(prev) = (*b).prev.as_mut() {
      let prev_ptr: *mut Block = prev;
      if prev.is_free && contiguous(prev_ptr, b) {
        prev.size += Block::header_size() + (*b).size;
        prev.next = (*b).next;
        if let Some(next) = (*b).next.as_mut() {
          next.prev = prev_ptr;
        } else {
          heap().note_tail_candidate(prev_ptr);
        }
        log(&format_args!("coalesce absorbed={:p} into={:p}", b, prev_ptr));
        b = prev_ptr;
      }
    }

    // Forward: absorb a free, physically contiguous `next` into `b`.
    if let Some(next) = (*b).next.as_mut() {
      let next_ptr: *mut Block = next;
      if next.is_free && contiguous(b, next_ptr) {
        (*b).size += Block::header_size() + next.size;
        (*b).next = next.next;
        if let Some(next_next) = next.next.as_mut() {
          next_next.prev = b;
        } else {
          heap().note_tail_candidate(b);
        }
        log(&format_args!("coalesce absorbed={:p} into={:p}", next_ptr, b));
      }
    }

    b
  }
}
