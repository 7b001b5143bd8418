//! Block header layout.
//!
//! A block is a contiguous `[header | payload]` region. The header is an
//! in-band, fixed-size, `#[repr(C)]` struct; the allocator never hands out
//! a safe reference to one, only raw pointers obtained through the helpers
//! below. Links are non-owning navigation handles — the allocator owns
//! every header uniformly, so there is no owning smart pointer wrapping
//! `next`/`prev`.

use crate::align::align_up;
use std::mem;
use std::ptr;

/// In-band metadata preceding each user payload.
#[repr(C)]
pub struct Block {
  /// Size of the user payload in bytes, excluding this header. Always a
  /// positive multiple of [`crate::align::ALIGNMENT`].
  pub size: usize,
  /// `true` when the block holds no live allocation.
  pub is_free: bool,
  /// Next block in creation order, or null for the list tail.
  pub next: *mut Block,
  /// Previous block in creation order, or null for `heap_base`.
  pub prev: *mut Block,
}

impl Block {
  /// Size of a header once rounded up to the alignment unit — the
  /// distance from a header's address to its payload's address.
  pub fn header_size() -> usize {
    align_up(mem::size_of::<Block>())
  }

  /// Writes a freshly created, `IN_USE` header at `addr`, linked after
  /// `prev` with no successor yet.
  ///
  /// # Safety
  ///
  /// `addr` must point to at least `header_size() + size` bytes of valid,
  /// writable memory that nothing else is using.
  pub unsafe fn init(addr: *mut Block, size: usize, prev: *mut Block) {
    unsafe {
      ptr::write(
        addr,
        Block { size, is_free: false, next: ptr::null_mut(), prev },
      );
    }
  }

  /// The address of this header's payload.
  ///
  /// # Safety
  ///
  /// `b` must be a valid, non-null block pointer.
  pub unsafe fn payload_ptr(b: *mut Block) -> *mut u8 {
    unsafe { (b as *mut u8).add(Self::header_size()) }
  }

  /// Recovers the header pointer from a payload pointer previously
  /// produced by [`Block::payload_ptr`].
  ///
  /// # Safety
  ///
  /// `payload` must have been returned by `Block::payload_ptr` for some
  /// still-reachable header.
  pub unsafe fn from_payload_ptr(payload: *mut u8) -> *mut Block {
    unsafe { payload.sub(Self::header_size()) as *mut Block }
  }

  /// The address one byte past this block's payload — the address the
  /// next physically contiguous block would start at.
  ///
  /// # Safety
  ///
  /// `b` must be a valid, non-null block pointer.
  pub unsafe fn payload_end(b: *mut Block) -> *mut u8 {
    unsafe { Self::payload_ptr(b).add((*b).size) }
  }
}

/// `contiguous(a, b)` from spec.md §3: true iff `b` begins exactly where
/// `a`'s payload ends, i.e. the two blocks came from memory that is
/// physically adjacent rather than merely list-adjacent.
///
/// # Safety
///
/// `a` and `b` must be valid, non-null block pointers.
pub unsafe fn contiguous(a: *mut Block, b: *mut Block) -> bool {
  unsafe { Block::payload_end(a) == b as *mut u8 }
}
