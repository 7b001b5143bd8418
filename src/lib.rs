//! # rallocator — a process-wide replacement allocator
//!
//! This crate replaces the process's `malloc`/`free`/`calloc`/`realloc`
//! with a single-mutator, mmap-backed allocator that supports a
//! selectable placement policy, live heap introspection, and a
//! recursion-safe event log.
//!
//! ## Overview
//!
//! Unlike a pure bump allocator, blocks are tracked in a doubly-linked
//! list in creation order and may be reused once freed:
//!
//! ```text
//!   Heap list (creation order, NOT necessarily address order):
//!
//!   heap_base ──►┌─────────┐    ┌─────────┐    ┌─────────┐
//!                │ Block 1 │◄──►│ Block 2 │◄──►│ Block 3 │◄── tail
//!                │ in use  │    │  free   │    │ in use  │
//!                └─────────┘    └─────────┘    └─────────┘
//!
//!   Each block is one OS mmap mapping's worth of memory, or a fragment
//!   split out of one. Two list-adjacent blocks are only merged back
//!   together if they are also physically contiguous in the address
//!   space — list-adjacency alone is never enough (see `block::contiguous`).
//! ```
//!
//! ## Crate structure
//!
//! ```text
//!   rallocator
//!   ├── align       - fixed 8-byte alignment helpers
//!   ├── block       - block header layout and the contiguity predicate     (C1)
//!   ├── heaplist    - the global block list                                (C1)
//!   ├── mapping     - OS mmap extension                                    (C2)
//!   ├── policy      - placement policy configuration
//!   ├── placement   - first/best/worst-fit search                         (C3)
//!   ├── merge       - split and coalesce                                  (C4)
//!   ├── validate    - pointer validation                                   (part of C5)
//!   ├── engine      - alloc/free/calloc/realloc core logic                 (C5)
//!   ├── guard       - per-thread recursion guard + fallback allocator      (C6)
//!   ├── eventlog    - non-allocating append-only log                      (C7)
//!   ├── stats       - usage stats, fragmentation rate, consistency check   (C8)
//!   └── capi        - the `malloc`/`free`/`calloc`/`realloc` C ABI
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use rallocator::{self, Policy};
//!
//! rallocator::reset_heap_for_testing();
//! rallocator::set_policy(Policy::BestFit as i32);
//!
//! unsafe {
//!     let ptr = rallocator::alloc(64);
//!     assert!(!ptr.is_null());
//!     rallocator::free(ptr);
//! }
//!
//! let stats = rallocator::memory_usage_stats();
//! assert_eq!(stats.allocated_count, 0);
//! # rallocator::reset_heap_for_testing();
//! ```
//!
//! ## Symbol interposition
//!
//! The crate also exports C-ABI `malloc`/`free`/`calloc`/`realloc`
//! symbols (see `capi`), intended for `LD_PRELOAD`:
//!
//! ```text
//!   cargo build --release
//!   LD_PRELOAD=target/release/librallocator.so some_program
//! ```
//!
//! ## Non-goals
//!
//! Thread-safe concurrent allocation across multiple mutators; memory
//! returned to the OS on free; size-class/slab specialization; guard
//! pages; hardened metadata (checksums, canaries); compaction. This is a
//! teaching-grade single-mutator design that deliberately leaks virtual
//! mappings on `reset_heap_for_testing`.
//!
//! ## Safety
//!
//! Nearly every operation here is `unsafe`: it manipulates a process-wide
//! block list through raw pointers with no borrow-checker protection.
//! Callers must uphold the single-mutator discipline described in each
//! function's safety section.

pub mod align;
mod block;
mod capi;
mod engine;
mod eventlog;
mod guard;
mod heaplist;
mod mapping;
mod merge;
mod placement;
mod policy;
mod stats;
#[cfg(test)]
mod testutil;
mod validate;

pub use policy::Policy;
pub use stats::MemoryUsageStats;

/// `alloc(size)` (spec.md §4.4), without going through the recursion
/// guard or the C ABI — for embedding this allocator's logic directly
/// in Rust code, or for tests.
///
/// # Safety
///
/// Single-mutator discipline applies: no concurrent call into any
/// `rallocator` entry point from another thread.
pub unsafe fn alloc(size: usize) -> *mut u8 {
  unsafe { engine::alloc(size) }
}

/// `free(p)` (spec.md §4.4). See [`alloc`].
///
/// # Safety
///
/// `p` must be null or a pointer returned by this allocator and not
/// already freed. Single-mutator discipline applies.
pub unsafe fn free(p: *mut u8) {
  unsafe { engine::free(p) }
}

/// `calloc(n, elem_size)` (spec.md §4.4). See [`alloc`].
///
/// # Safety
///
/// Single-mutator discipline applies.
pub unsafe fn calloc(n: usize, elem_size: usize) -> *mut u8 {
  unsafe { engine::calloc(n, elem_size) }
}

/// `realloc(p, size)` (spec.md §4.4). See [`alloc`].
///
/// # Safety
///
/// `p` must be null or a pointer returned by this allocator and not
/// already freed. Single-mutator discipline applies.
pub unsafe fn realloc(p: *mut u8, size: usize) -> *mut u8 {
  unsafe { engine::realloc(p, size) }
}

/// Sets the placement policy (spec.md §6). Out-of-range values are
/// rejected silently; returns whether `value` was recognized.
pub fn set_policy(value: i32) -> bool {
  policy::set(value)
}

/// Returns the allocator's current placement policy.
pub fn current_policy() -> Policy {
  policy::current()
}

/// Opens (truncate-on-open) the event log at `path`. Returns `true` on
/// success.
pub fn init_log(path: &str) -> bool {
  eventlog::init_log(path)
}

/// Disables the event log, closing its file descriptor if one was open.
pub fn close_log() {
  eventlog::close_log()
}

/// Single-traversal snapshot of live heap usage (spec.md §4.5).
pub fn memory_usage_stats() -> MemoryUsageStats {
  // SAFETY: single-mutator discipline; the global list is always
  // well-formed between calls.
  unsafe { stats::memory_usage_stats(heaplist::heap().base) }
}

/// `1.0 - largest_free/total_free`, or `0.0` with no free memory
/// (spec.md §4.5).
pub fn fragmentation_rate() -> f64 {
  // SAFETY: see `memory_usage_stats`.
  unsafe { stats::fragmentation_rate(heaplist::heap().base) }
}

/// Scans the heap for structural diagnostics, printing one line per
/// violation to stderr (spec.md §4.5). Returns the number found.
pub fn check_consistency() -> usize {
  // SAFETY: see `memory_usage_stats`.
  unsafe { stats::check_consistency(heaplist::heap().base) }
}

/// Test-only entry point (spec.md §6): abandons the entire block list by
/// resetting `heap_base` to null. Every OS mapping created so far is
/// leaked — documented, accepted behavior for a teaching-grade
/// single-mutator allocator (spec.md §1 Non-goals).
pub fn reset_heap_for_testing() {
  // SAFETY: single-mutator discipline; callers are expected to use this
  // only between otherwise-independent test cases.
  unsafe { heaplist::heap().reset() }
}
