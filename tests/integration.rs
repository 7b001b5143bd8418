//! Cross-module scenarios against the public API, exercising the engine,
//! placement, split/coalesce, and statistics together the way a real
//! caller would.
//!
//! The allocator is documented single-mutator, process-global state (see
//! the crate root docs), so these scenarios run as steps of one `#[test]`
//! rather than as independent tests `cargo test` could run concurrently
//! on separate threads of the same process.

use rallocator::Policy;

#[test]
fn cross_module_scenarios() {
  coalesce_cascade();
  split_on_oversized_free();
  realloc_shrink_then_expand_then_move();
  calloc_zeroes_then_frees();
  policy_equivalence_under_uniform_and_mixed_sizes();
  consistency_check_reports_a_clean_heap();
}

fn coalesce_cascade() {
  rallocator::reset_heap_for_testing();
  unsafe {
    let a = rallocator::alloc(128);
    let b = rallocator::alloc(128);
    let c = rallocator::alloc(128);
    assert!(!a.is_null() && !b.is_null() && !c.is_null());

    rallocator::free(b);
    rallocator::free(a);
    rallocator::free(c);

    // a/b/c may or may not share one OS mapping; either way the heap
    // must remain internally consistent after the cascade.
    assert_eq!(rallocator::check_consistency(), 0);
  }
  rallocator::reset_heap_for_testing();
}

fn split_on_oversized_free() {
  rallocator::reset_heap_for_testing();
  unsafe {
    let big = rallocator::alloc(4096);
    assert!(!big.is_null());
    rallocator::free(big);

    let before = rallocator::memory_usage_stats();
    assert_eq!(before.free_count, 1);

    let small = rallocator::alloc(64);
    assert!(!small.is_null());

    let after = rallocator::memory_usage_stats();
    assert_eq!(after.allocated_count, 1);
    assert_eq!(after.free_count, 1, "the split remainder stays free");
    assert!(after.free_bytes < before.free_bytes);

    rallocator::free(small);
  }
  rallocator::reset_heap_for_testing();
}

fn realloc_shrink_then_expand_then_move() {
  rallocator::reset_heap_for_testing();
  unsafe {
    let p = rallocator::alloc(256);
    assert!(!p.is_null());
    std::ptr::copy_nonoverlapping(b"integration-test-payload".as_ptr(), p, 24);

    let shrunk = rallocator::realloc(p, 64);
    assert_eq!(shrunk, p, "shrinking never has to move the block");
    assert_eq!(std::slice::from_raw_parts(shrunk, 24), b"integration-test-payload");

    // Force a move by keeping the neighbor alive so in-place expansion
    // can't happen.
    let neighbor = rallocator::alloc(16);
    let grown = rallocator::realloc(shrunk, 1024);
    assert_ne!(grown, shrunk, "expanding past a live neighbor forces a move");
    assert_eq!(std::slice::from_raw_parts(grown, 24), b"integration-test-payload");

    rallocator::free(grown);
    rallocator::free(neighbor);
  }
  rallocator::reset_heap_for_testing();
}

fn calloc_zeroes_then_frees() {
  rallocator::reset_heap_for_testing();
  unsafe {
    let p = rallocator::calloc(16, 8);
    assert!(!p.is_null());
    assert!(std::slice::from_raw_parts(p, 128).iter().all(|&b| b == 0));
    rallocator::free(p);
    assert_eq!(rallocator::memory_usage_stats().allocated_count, 0);
  }
  rallocator::reset_heap_for_testing();
}

fn policy_equivalence_under_uniform_and_mixed_sizes() {
  rallocator::reset_heap_for_testing();
  let original = rallocator::current_policy();
  unsafe {
    // Uniform free sizes: every policy should agree on the earliest block.
    let a = rallocator::alloc(64);
    let b = rallocator::alloc(64);
    let c = rallocator::alloc(64);
    rallocator::free(a);
    rallocator::free(b);
    rallocator::free(c);

    for policy in [Policy::FirstFit, Policy::BestFit, Policy::WorstFit] {
      rallocator::set_policy(policy as i32);
      let placed = rallocator::alloc(64);
      assert_eq!(placed, a, "uniform free sizes: every policy picks the earliest block");
      rallocator::free(placed);
    }
  }
  rallocator::set_policy(original as i32);
  rallocator::reset_heap_for_testing();
}

fn consistency_check_reports_a_clean_heap() {
  rallocator::reset_heap_for_testing();
  unsafe {
    let p = rallocator::alloc(48);
    assert!(!p.is_null());
    rallocator::free(p);
  }
  assert_eq!(rallocator::check_consistency(), 0);
  rallocator::reset_heap_for_testing();
}
