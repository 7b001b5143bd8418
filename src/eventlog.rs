//! C7 — the event log.
//!
//! A non-allocating, append-only text log. Every record is built in a
//! fixed 256-byte stack buffer and written with a single raw `write(2)`
//! call — never a buffered stream. This is load-bearing, not a style
//! choice: the allocator replaces the process's `malloc`, so anything in
//! this path that itself allocates (a `String`, a buffered `io::Write`)
//! would recurse back into the allocator it is trying to log (spec.md
//! §9 "recursion through host I/O").
//!
//! Message format is free-form UTF-8 text, one record per line, silently
//! truncated to 254 bytes plus a trailing newline (spec.md §6). The
//! format is documented as stable only in the sense that it names the
//! operation (`malloc`, `free`, `calloc`, `realloc`, `extend_heap`,
//! `split_block`, `coalesce`) and relevant pointer/size values — not a
//! stable binary format.

use std::fmt::{self, Write as _};
use std::os::raw::c_void;
use std::sync::atomic::{AtomicI32, Ordering};

const BUF_CAP: usize = 256;

/// -1 means "logging disabled"; anything else is an open file descriptor
/// obtained from `init_log`, replaced atomically by further
/// `init_log`/`close_log` calls.
static LOG_FD: AtomicI32 = AtomicI32::new(-1);

struct StackBuf {
  bytes: [u8; BUF_CAP],
  len: usize,
}

impl StackBuf {
  fn new() -> Self {
    Self { bytes: [0u8; BUF_CAP], len: 0 }
  }
}

impl fmt::Write for StackBuf {
  fn write_str(&mut self, s: &str) -> fmt::Result {
    // Reserve one byte for the trailing newline `log` appends after
    // formatting, and one more to keep text capped at 254 bytes per the
    // documented "truncated to 254 bytes plus newline" contract (not
    // 255); truncate silently rather than error (a log line is never
    // allowed to fail an allocation call).
    let capacity = BUF_CAP - 2;
    let remaining = capacity.saturating_sub(self.len);
    let take = remaining.min(s.len());
    self.bytes[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
    self.len += take;
    Ok(())
  }
}

/// Opens (truncate-on-open) the log at `path`, replacing any previously
/// open log. Returns `true` on success.
pub fn init_log(path: &str) -> bool {
  let Ok(cpath) = std::ffi::CString::new(path) else { return false };

  // SAFETY: `cpath` is a valid, nul-terminated C string for the
  // duration of the call.
  let fd = unsafe {
    libc::open(
      cpath.as_ptr(),
      libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
      0o644,
    )
  };

  if fd < 0 {
    return false;
  }

  let previous = LOG_FD.swap(fd, Ordering::SeqCst);
  if previous >= 0 {
    // SAFETY: `previous` was a valid fd opened by a prior `init_log`.
    unsafe { libc::close(previous) };
  }

  true
}

/// Disables the log, closing the underlying file descriptor if one was
/// open. A no-op when logging is already disabled.
pub fn close_log() {
  let previous = LOG_FD.swap(-1, Ordering::SeqCst);
  if previous >= 0 {
    // SAFETY: `previous` was a valid fd opened by `init_log`.
    unsafe { libc::close(previous) };
  }
}

/// Appends one record, built from `args` into the stack buffer, to the
/// log. A no-op (not even a buffer build) when logging is disabled.
pub fn log(args: &fmt::Arguments<'_>) {
  let fd = LOG_FD.load(Ordering::SeqCst);
  if fd < 0 {
    return;
  }

  let mut buf = StackBuf::new();
  // Formatting into `StackBuf` only ever copies bytes into the stack
  // array; it cannot allocate or fail in a way that matters here.
  let _ = buf.write_fmt(*args);
  buf.bytes[buf.len] = b'\n';
  buf.len += 1;

  // SAFETY: `fd` was returned by a successful `open` and `buf.bytes` is
  // a valid, initialized stack buffer of at least `buf.len` bytes.
  unsafe {
    libc::write(fd, buf.bytes.as_ptr() as *const c_void, buf.len);
  }
}
