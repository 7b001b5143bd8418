//! C3 — the placement engine.
//!
//! There is no free-list optimization (spec.md §4.2): every search walks
//! the block list from `base`. `first_fit`/`best_fit`'s perfect-fit
//! short-circuit can return before reaching the tail, so the search is
//! not always a full scan; the list's real tail is instead tracked
//! independently and kept current for free by `heaplist::HeapState::tail`
//! (`push_tail`/`note_tail_candidate`, updated from `mapping.rs`/
//! `merge.rs`/`engine.rs` whenever a block's `next` changes), which is
//! what C2 actually uses to splice a new extension on without its own
//! walk.

use crate::block::Block;
use crate::policy::Policy;
use std::ptr;

/// Searches the global list (via `base`) for a free block able to host
/// `requested_size` bytes of payload, per `policy`. `requested_size` must
/// already be aligned. Returns null if no candidate exists.
///
/// # Safety
///
/// `base` must be null or point to the head of a well-formed block list.
pub unsafe fn find_free_block(base: *mut Block, policy: Policy, requested_size: usize) -> *mut Block {
  unsafe {
    match policy {
      Policy::FirstFit => first_fit(base, requested_size),
      Policy::BestFit => best_fit(base, requested_size),
      Policy::WorstFit => worst_fit(base, requested_size),
    }
  }
}

unsafe fn first_fit(base: *mut Block, requested_size: usize) -> *mut Block {
  unsafe {
    let mut current = base;
    while !current.is_null() {
      if (*current).is_free && (*current).size >= requested_size {
        return current;
      }
      current = (*current).next;
    }
    ptr::null_mut()
  }
}

unsafe fn best_fit(base: *mut Block, requested_size: usize) -> *mut Block {
  unsafe {
    let mut best: *mut Block = ptr::null_mut();
    let mut best_slack = usize::MAX;

    let mut current = base;
    while !current.is_null() {
      if (*current).is_free && (*current).size >= requested_size {
        let slack = (*current).size - requested_size;
        if slack == 0 {
          return current; // perfect fit short-circuits the search
        }
        if slack < best_slack {
          best = current;
          best_slack = slack;
        }
      }
      current = (*current).next;
    }
    best
  }
}

unsafe fn worst_fit(base: *mut Block, requested_size: usize) -> *mut Block {
  unsafe {
    let mut worst: *mut Block = ptr::null_mut();
    let mut worst_size = 0usize;

    let mut current = base;
    while !current.is_null() {
      if (*current).is_free && (*current).size >= requested_size && (*current).size > worst_size {
        worst = current;
        worst_size = (*current).size;
      }
      current = (*current).next;
    }
    worst
  }
}
