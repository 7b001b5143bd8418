//! C2 — the OS mapping layer.
//!
//! Every heap extension is an independent anonymous, private virtual
//! memory mapping obtained from the kernel with `mmap`. Unlike the
//! teacher allocator (which grows a single contiguous region with
//! `sbrk`), two extensions here are not generally adjacent in address
//! space: the list is the only authoritative adjacency relation
//! (spec.md §3, §9 "physical vs. logical adjacency").

use crate::block::Block;
use crate::eventlog::log;
use crate::heaplist::heap;
use std::ptr;

/// Requests `header_size() + payload_size` bytes of fresh, zeroed,
/// read-write memory from the OS, places a header at the start, and
/// splices it onto the tail of the global list.
///
/// Returns the new block, or null if the kernel refuses the mapping.
///
/// # Safety
///
/// Must be called with the single-mutator discipline the allocator
/// assumes (no concurrent heap-state mutation).
pub unsafe fn extend_heap(payload_size: usize) -> *mut Block {
  unsafe {
    let total = Block::header_size() + payload_size;

    let addr = libc::mmap(
      ptr::null_mut(),
      total,
      libc::PROT_READ | libc::PROT_WRITE,
      libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
      -1,
      0,
    );

    if addr == libc::MAP_FAILED {
      log(&format_args!("extend_heap failed size={}", total));
      return ptr::null_mut();
    }

    let block = addr as *mut Block;
    let state = heap();
    Block::init(block, payload_size, state.tail);
    state.push_tail(block);

    log(&format_args!(
      "extend_heap size={} addr={:p}",
      payload_size, block
    ));

    block
  }
}
