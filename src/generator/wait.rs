//! Wait and backoff strategies for sequence exhaustion and clock rollback
//!
//! Both cases wait for the clock to reach a target millisecond: `last + 1`
//! after the sequence runs out, `last` after the clock moved backwards.

use std::thread;
use std::time::Duration;

use crate::layout::Layout;

/// Maximum backoff duration in milliseconds
pub const MAX_BACKOFF_MS: u64 = 100;

/// Spin on the clock until it reaches `target`
///
/// Returns Some(now) once `now >= target`, None if spin loops are exhausted
#[inline]
pub fn spin_wait<F>(target: i64, layout: &Layout, get_time: F) -> Option<i64>
where
    F: Fn() -> i64,
{
    if !layout.spin_enabled() || layout.spin_loops() == 0 {
        return None;
    }

    let yield_every = layout.spin_yield_every();

    for i in 0..layout.spin_loops() {
        let now = get_time();
        if now >= target {
            return Some(now);
        }

        std::hint::spin_loop();

        if yield_every != 0 && i % yield_every == yield_every - 1 {
            thread::yield_now();
        }
    }

    None
}

/// Sleep with exponential backoff until the clock reaches `target`
#[inline]
pub fn sleep_until<F>(target: i64, mut backoff_ms: u64, get_time: F) -> i64
where
    F: Fn() -> i64,
{
    loop {
        thread::sleep(Duration::from_millis(backoff_ms));
        let now = get_time();
        if now >= target {
            return now;
        }
        backoff_ms = next_backoff(backoff_ms);
    }
}

/// Calculate next backoff duration with exponential growth capped at MAX_BACKOFF_MS
#[inline(always)]
pub const fn next_backoff(current: u64) -> u64 {
    let next = current.saturating_mul(2);
    if next > MAX_BACKOFF_MS {
        MAX_BACKOFF_MS
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_next_backoff() {
        assert_eq!(next_backoff(1), 2);
        assert_eq!(next_backoff(50), 100);
        assert_eq!(next_backoff(100), 100);
        assert_eq!(next_backoff(200), 100);
    }

    #[test]
    fn test_spin_wait_disabled() {
        let layout = Layout::builder().enable_spin(false).build().unwrap();
        assert!(spin_wait(100, &layout, || 200).is_none());
    }

    #[test]
    fn test_spin_wait_reaches_target_inclusive() {
        let layout = Layout::builder()
            .enable_spin(true)
            .spin_loops(10)
            .build()
            .unwrap();
        assert_eq!(spin_wait(100, &layout, || 100), Some(100));
    }

    #[test]
    fn test_spin_wait_gives_up() {
        let layout = Layout::builder()
            .spin_loops(4)
            .spin_yield_every(2)
            .build()
            .unwrap();
        assert_eq!(spin_wait(100, &layout, || 99), None);
    }

    #[test]
    fn test_sleep_until_polls_clock() {
        let reads = Cell::new(0);
        let now = sleep_until(103, 1, || {
            reads.set(reads.get() + 1);
            100 + reads.get()
        });
        assert_eq!(now, 103);
        assert_eq!(reads.get(), 3);
    }
}
