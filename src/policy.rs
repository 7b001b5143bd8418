//! Placement policy configuration.
//!
//! The current policy is a single process-global value (spec.md §9
//! "policy state"); per-request override is explicitly a non-goal. The
//! enum values match the C ABI contract in spec.md §6
//! (`first=0, best=1, worst=2`).

use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Policy {
  FirstFit = 0,
  BestFit = 1,
  WorstFit = 2,
}

impl Policy {
  fn from_u8(value: u8) -> Option<Policy> {
    match value {
      0 => Some(Policy::FirstFit),
      1 => Some(Policy::BestFit),
      2 => Some(Policy::WorstFit),
      _ => None,
    }
  }
}

static CURRENT_POLICY: AtomicU8 = AtomicU8::new(Policy::FirstFit as u8);

/// Returns the allocator's current placement policy.
pub fn current() -> Policy {
  // SAFETY net: the stored value is only ever written through `set`,
  // which rejects anything outside the enum's range.
  Policy::from_u8(CURRENT_POLICY.load(Ordering::SeqCst)).unwrap_or(Policy::FirstFit)
}

/// Sets the placement policy. Out-of-range values are rejected silently
/// (spec.md §6), leaving the previous policy in effect; returns whether
/// the value was recognized.
pub fn set(value: i32) -> bool {
  let Ok(value) = u8::try_from(value) else { return false };
  let Some(policy) = Policy::from_u8(value) else { return false };
  CURRENT_POLICY.store(policy as u8, Ordering::SeqCst);
  true
}
