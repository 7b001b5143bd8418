//! The public C ABI: `malloc`, `free`, `calloc`, `realloc`.
//!
//! Each function consults the recursion guard (C6) before doing
//! anything else, exactly as spec.md §2's control-flow summary
//! describes: "C5 consults the recursion guard; if reentrant it forwards
//! to the fallback allocator."
//!
//! `#[unsafe(no_mangle)]` is applied only in release builds, following the
//! pattern in `other_examples/7bd489ed_..._malloc_abi.rs.rs`
//! (`not(debug_assertions)`). This has to be a profile-wide cfg rather than
//! `not(test)`: `cfg(test)` is only set when this crate itself is compiled
//! with `--test`, not when it is pulled in as an ordinary dependency — which
//! is exactly what happens when `tests/integration.rs` or
//! `demos/walkthrough.rs` link against the `rallocator` rlib under `cargo
//! test`/`cargo build`. Gating on `not(test)` would still export these
//! symbols into that dev build, silently replacing the test/demo binary's
//! own allocator for its whole lifetime. Gating on `not(debug_assertions)`
//! keeps the symbols unexported in every debug build (`cargo test` included)
//! and exports them only in `--release`, where `LD_PRELOAD` is meant to use
//! them.

use crate::{engine, guard};
use std::ffi::c_void;

/// POSIX `malloc`.
///
/// # Safety
///
/// Standard C `malloc` contract: the returned pointer, if non-null, must
/// eventually be passed to `free` exactly once.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn malloc(size: usize) -> *mut c_void {
  let Some(_token) = guard::enter() else {
    return guard::fallback_malloc(size);
  };

  unsafe { engine::alloc(size) as *mut c_void }
}

/// POSIX `free`.
///
/// # Safety
///
/// `ptr` must be null or have been returned by this allocator's
/// `malloc`/`calloc`/`realloc` and not already freed.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn free(ptr: *mut c_void) {
  // Reentrant frees are dropped rather than forwarded: per spec.md
  // §4.6, the pointer either came from the fallback allocator already
  // (in which case forwarding to our own free would be wrong) or from a
  // prior non-reentrant call (in which case dropping it here beats
  // risking unbounded recursion from, e.g., a logging routine that
  // allocates).
  let Some(_token) = guard::enter() else {
    return;
  };

  unsafe { engine::free(ptr as *mut u8) }
}

/// POSIX `calloc`.
///
/// # Safety
///
/// Standard C `calloc` contract.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn calloc(nmemb: usize, size: usize) -> *mut c_void {
  let Some(_token) = guard::enter() else {
    return guard::fallback_calloc(nmemb, size);
  };

  unsafe { engine::calloc(nmemb, size) as *mut c_void }
}

/// POSIX `realloc`.
///
/// # Safety
///
/// Standard C `realloc` contract.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn realloc(ptr: *mut c_void, size: usize) -> *mut c_void {
  let Some(_token) = guard::enter() else {
    return guard::fallback_realloc(ptr, size);
  };

  unsafe { engine::realloc(ptr as *mut u8, size) as *mut c_void }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn malloc_free_roundtrip_through_the_c_abi() {
    let _guard = crate::testutil::lock();
    unsafe {
      crate::heaplist::heap().reset();
      let p = malloc(64);
      assert!(!p.is_null());
      free(p);
      crate::heaplist::heap().reset();
    }
  }

  #[test]
  fn calloc_through_the_c_abi_zeroes_memory() {
    let _guard = crate::testutil::lock();
    unsafe {
      crate::heaplist::heap().reset();
      let p = calloc(8, 8) as *mut u8;
      assert!(!p.is_null());
      assert!(std::slice::from_raw_parts(p, 64).iter().all(|&b| b == 0));
      free(p as *mut c_void);
      crate::heaplist::heap().reset();
    }
  }

  #[test]
  fn realloc_through_the_c_abi_grows_a_block() {
    let _guard = crate::testutil::lock();
    unsafe {
      crate::heaplist::heap().reset();
      let p = malloc(16);
      assert!(!p.is_null());
      let grown = realloc(p, 32);
      assert!(!grown.is_null());
      free(grown);
      crate::heaplist::heap().reset();
    }
  }
}
