//! C1 — the global block list.
//!
//! `heap_base` and the list it anchors are process-wide, single-mutator
//! state (spec.md §5: "no internal locking is required or provided").
//! It lives behind a bare `UnsafeCell`, not a `Mutex`: taking a lock here
//! would be both unnecessary under the single-mutator assumption and
//! actively wrong for re-entrant calls serviced by the recursion guard
//! (`guard.rs`), which must never block.

use crate::block::Block;
use std::cell::UnsafeCell;
use std::ptr;

/// Head and tail of the block list. `tail` caches the last node so that a
/// new extension can be spliced on in O(1) instead of re-walking the list
/// (this is the "last block visited" anchor spec.md §4.2 describes as a
/// side effect of the placement search — the search always walks the
/// full list, so the node it last visits is always the real tail).
pub struct HeapState {
  pub base: *mut Block,
  pub tail: *mut Block,
}

struct HeapCell(UnsafeCell<HeapState>);

// SAFETY: the allocator is documented single-mutator (spec.md §5); every
// entry point that touches `HEAP` does so without yielding to another
// thread's mutation. The recursion guard (C6) is what makes this hold
// even when the "mutator" is reentered from within libc.
unsafe impl Sync for HeapCell {}

static HEAP: HeapCell = HeapCell(UnsafeCell::new(HeapState { base: ptr::null_mut(), tail: ptr::null_mut() }));

/// Borrows the global heap state.
///
/// # Safety
///
/// The caller must not be concurrently holding another `&mut HeapState`
/// borrow (single-mutator discipline, spec.md §5).
pub unsafe fn heap() -> &'static mut HeapState {
  unsafe { &mut *HEAP.0.get() }
}

impl HeapState {
  pub fn is_empty(&self) -> bool {
    self.base.is_null()
  }

  /// Appends `block` as the new list tail.
  ///
  /// # Safety
  ///
  /// `block` must be a freshly initialized, unlinked header (`next` and
  /// `prev` set by the caller to reflect being appended after the
  /// current tail).
  pub unsafe fn push_tail(&mut self, block: *mut Block) {
    unsafe {
      if self.base.is_null() {
        self.base = block;
        self.tail = block;
      } else {
        (*self.tail).next = block;
        (*block).prev = self.tail;
        self.tail = block;
      }
    }
  }

  /// Must be called whenever a block's `next` changes from null to
  /// non-null (i.e. a split inserted a new node after the previous
  /// tail), so `tail` keeps pointing at the real list end.
  pub fn note_tail_candidate(&mut self, candidate: *mut Block) {
    self.tail = candidate;
  }

  /// Abandons the entire list (spec.md §6 `reset-heap`, test-only). All
  /// OS mappings created so far are leaked — this is the documented,
  /// accepted behavior for a teaching-grade single-mutator allocator.
  pub fn reset(&mut self) {
    self.base = ptr::null_mut();
    self.tail = ptr::null_mut();
  }
}
