//! C6 — the recursion guard.
//!
//! Replacing the process's `malloc`/`free`/`calloc`/`realloc` means any
//! host-runtime routine that itself allocates — dynamic symbol
//! resolution, thread startup, formatted I/O — re-enters this allocator
//! before it is safe to. A per-thread flag, set on entry to `alloc`/
//! `free` and cleared on every return path, forwards any such re-entry to
//! a fallback allocator instead of recursing (spec.md §4.6).
//!
//! The flag is `thread_local!` rather than process-global so the design
//! remains correct under a future multi-threading extension (spec.md
//! §4.6) — it is not, and must not be treated as, a substitute for
//! locking the allocator itself (spec.md §5 is explicit that this
//! allocator has none).
//!
//! Modeled on the `ALLOCATOR_REENTRY_DEPTH` guard in frankenlibc's ABI
//! layer, simplified from a depth counter to a flag: this design forwards
//! reentrant calls to a fallback rather than merely counting how deep the
//! reentrancy goes.

use std::cell::Cell;
use std::ffi::{c_char, c_void};
use std::sync::OnceLock;

thread_local! {
  static REENTRANT: Cell<bool> = const { Cell::new(false) };
}

/// RAII token held for the duration of a non-reentrant `alloc`/`free`
/// call; clears the thread-local flag on every return path, including
/// early exits, via `Drop`.
pub struct Guard {
  _private: (),
}

impl Drop for Guard {
  fn drop(&mut self) {
    REENTRANT.with(|flag| flag.set(false));
  }
}

/// Attempts to enter a non-reentrant section. Returns `None` if the
/// calling thread is already inside one (i.e. this call is itself a
/// reentrant call made from within `alloc`/`free`).
pub fn enter() -> Option<Guard> {
  REENTRANT.with(|flag| {
    if flag.get() {
      None
    } else {
      flag.set(true);
      Some(Guard { _private: () })
    }
  })
}

/// Function pointers resolved once from the next loaded library that
/// provides the standard allocation symbols (typically libc), used to
/// service reentrant calls.
struct Fallback {
  malloc: unsafe extern "C" fn(usize) -> *mut c_void,
  calloc: unsafe extern "C" fn(usize, usize) -> *mut c_void,
  realloc: unsafe extern "C" fn(*mut c_void, usize) -> *mut c_void,
  free: unsafe extern "C" fn(*mut c_void),
}

// SAFETY: the resolved function pointers are plain C function addresses,
// valid to call from any thread for the lifetime of the process.
unsafe impl Send for Fallback {}
unsafe impl Sync for Fallback {}

static FALLBACK: OnceLock<Option<Fallback>> = OnceLock::new();

unsafe fn resolve_symbol(name: &[u8]) -> *mut c_void {
  unsafe { libc::dlsym(libc::RTLD_NEXT, name.as_ptr() as *const c_char) }
}

fn fallback() -> Option<&'static Fallback> {
  FALLBACK
    .get_or_init(|| unsafe {
      let malloc = resolve_symbol(b"malloc\0");
      let calloc = resolve_symbol(b"calloc\0");
      let realloc = resolve_symbol(b"realloc\0");
      let free = resolve_symbol(b"free\0");

      if malloc.is_null() || calloc.is_null() || realloc.is_null() || free.is_null() {
        crate::eventlog::log(&format_args!(
          "symbol lookup failed: fallback allocator could not be resolved"
        ));
        eprintln!("rallocator: fallback allocator symbol lookup failed");
        return None;
      }

      Some(Fallback {
        malloc: std::mem::transmute::<*mut c_void, unsafe extern "C" fn(usize) -> *mut c_void>(malloc),
        calloc: std::mem::transmute::<*mut c_void, unsafe extern "C" fn(usize, usize) -> *mut c_void>(calloc),
        realloc: std::mem::transmute::<*mut c_void, unsafe extern "C" fn(*mut c_void, usize) -> *mut c_void>(realloc),
        free: std::mem::transmute::<*mut c_void, unsafe extern "C" fn(*mut c_void)>(free),
      })
    })
    .as_ref()
}

/// Services a reentrant `malloc`/`calloc` by forwarding to the fallback
/// allocator. Returns null if the fallback could not be resolved.
pub fn fallback_malloc(size: usize) -> *mut c_void {
  match fallback() {
    Some(f) => unsafe { (f.malloc)(size) },
    None => std::ptr::null_mut(),
  }
}

pub fn fallback_calloc(nmemb: usize, size: usize) -> *mut c_void {
  match fallback() {
    Some(f) => unsafe { (f.calloc)(nmemb, size) },
    None => std::ptr::null_mut(),
  }
}

pub fn fallback_realloc(ptr: *mut c_void, size: usize) -> *mut c_void {
  match fallback() {
    Some(f) => unsafe { (f.realloc)(ptr, size) },
    None => std::ptr::null_mut(),
  }
}
