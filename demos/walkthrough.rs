use std::io::Read;

use rallocator::Policy;

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`,
/// `htop`, `gdb`, or just visually track how allocations change as the
/// process maps and unmaps memory.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn print_stats(label: &str) {
  let stats = rallocator::memory_usage_stats();
  println!(
    "[{}] allocated={}B ({} blocks), free={}B ({} blocks), fragmentation={:.3}",
    label,
    stats.allocated_bytes,
    stats.allocated_count,
    stats.free_bytes,
    stats.free_count,
    rallocator::fragmentation_rate(),
  );
}

fn main() {
  rallocator::reset_heap_for_testing();
  rallocator::init_log("/tmp/rallocator-demo.log");

  unsafe {
    println!("[0] PID = {}", std::process::id());
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 1) Three same-size allocations, one of which is freed.
    // --------------------------------------------------------------------
    let a = rallocator::alloc(256);
    let b = rallocator::alloc(256);
    let c = rallocator::alloc(256);
    println!("\n[1] a={:?} b={:?} c={:?}", a, b, c);
    print_stats("1");
    block_until_enter_pressed();

    rallocator::free(b);
    println!("\n[2] freed b, a freed block now sits between two live ones");
    print_stats("2");
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 3) A small allocation can reuse the freed middle block.
    // --------------------------------------------------------------------
    let d = rallocator::alloc(64);
    println!(
      "\n[3] allocated 64 bytes, reused freed block? {}",
      if d == b { "yes" } else { "no" }
    );
    print_stats("3");
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 4) Placement policy changes where the next request lands.
    // --------------------------------------------------------------------
    rallocator::free(a);
    rallocator::free(c);
    rallocator::free(d);
    print_stats("4 (everything freed)");

    rallocator::set_policy(Policy::WorstFit as i32);
    let e = rallocator::alloc(32);
    println!("\n[4] worst-fit placed a 32-byte request at {:?}", e);
    rallocator::free(e);

    rallocator::set_policy(Policy::FirstFit as i32);
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 5) realloc growing in place vs. moving.
    // --------------------------------------------------------------------
    let f = rallocator::alloc(64);
    std::ptr::copy_nonoverlapping(b"hello".as_ptr(), f, 5);
    let grown = rallocator::realloc(f, 512);
    println!(
      "\n[5] realloc grew 64 -> 512 bytes, moved? {}",
      if grown != f { "yes" } else { "no (expanded in place)" }
    );
    print_stats("5");

    rallocator::free(grown);
    println!("\n[6] consistency violations found: {}", rallocator::check_consistency());
  }

  rallocator::close_log();
  println!("\n[7] End of demo. Event log written to /tmp/rallocator-demo.log");
}
