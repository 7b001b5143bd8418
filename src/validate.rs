//! Pointer validation (spec.md §4.5).
//!
//! `is_valid_address` adopts the computed-address variant of the two
//! inconsistent validity checks spec.md §9 notes were found in the
//! source this design was distilled from: a reachable, `IN_USE` block
//! whose payload address equals `p`, found by an O(n) scan. It is used
//! only from `free`/`realloc`, never from the hot `alloc` path.

use crate::block::Block;

/// True iff there exists a reachable, in-use block whose payload address
/// equals `p`. False for a null `p` or an empty heap.
///
/// # Safety
///
/// `base` must be null or point to the head of a well-formed block list.
pub unsafe fn is_valid_address(base: *mut Block, p: *mut u8) -> bool {
  unsafe {
    if p.is_null() {
      return false;
    }

    let mut current = base;
    while !current.is_null() {
      if !(*current).is_free && Block::payload_ptr(current) == p {
        return true;
      }
      current = (*current).next;
    }
    false
  }
}

/// Finds the reachable, in-use block whose payload address equals `p`,
/// or null.
///
/// # Safety
///
/// `base` must be null or point to the head of a well-formed block list.
pub unsafe fn find_in_use_block(base: *mut Block, p: *mut u8) -> *mut Block {
  unsafe {
    if p.is_null() {
      return std::ptr::null_mut();
    }

    let mut current = base;
    while !current.is_null() {
      if !(*current).is_free && Block::payload_ptr(current) == p {
        return current;
      }
      current = (*current).next;
    }
    std::ptr::null_mut()
  }
}
