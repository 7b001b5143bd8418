//! Test-only support: the allocator's list, policy, and log file
//! descriptor are genuine process globals (spec.md §5's single-mutator
//! design), so tests that touch them must not run concurrently with each
//! other the way independent `#[test]`s normally do. Every such test
//! takes this lock first.

use std::sync::{Mutex, MutexGuard};

static GLOBAL_STATE_LOCK: Mutex<()> = Mutex::new(());

pub fn lock() -> MutexGuard<'static, ()> {
  match GLOBAL_STATE_LOCK.lock() {
    Ok(guard) => guard,
    Err(poisoned) => poisoned.into_inner(),
  }
}
