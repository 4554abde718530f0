//! ID generation logic
//!
//! Core generate() implementation with fast and slow paths

use std::convert::Infallible;
use std::sync::atomic::Ordering;

use super::state::State;
use super::wait::next_backoff;
use super::Generator;
use crate::clock::Clock;
use crate::error::SnowError;
use crate::id::Id;

impl<C: Clock> Generator<C> {
    /// Generate a new ID.
    ///
    /// Blocks while the sequence for the current millisecond is exhausted and,
    /// if the clock moved backwards, until it catches up with the last issued
    /// timestamp. Use [`Generator::try_generate`] to get an error instead of
    /// waiting out a rollback.
    ///
    /// # Panics
    /// When the time since the epoch no longer fits the layout's timestamp
    /// field. Issuing anything then would repeat earlier IDs;
    /// [`Generator::try_generate`] reports [`SnowError::TimestampExhausted`]
    /// instead.
    #[inline]
    pub fn generate(&self) -> Id {
        if let Some(id) = self.fast_path() {
            return id;
        }
        let result = self.generate_slow_path(
            |current, now| self.wait_out_rollback(current, now),
            |elapsed, max| -> Infallible {
                panic!("{}", SnowError::TimestampExhausted { elapsed, max })
            },
        );
        match result {
            Ok(id) => id,
            Err(never) => match never {},
        }
    }

    /// Generate a new ID, failing on clock rollback.
    ///
    /// Sequence exhaustion still waits for the next millisecond.
    ///
    /// # Errors
    /// [`SnowError::ClockMovedBackwards`] when the clock reads earlier than the
    /// last issued timestamp, [`SnowError::TimestampExhausted`] once the time
    /// since the epoch outgrows the timestamp field. No ID is issued in either
    /// case.
    #[inline]
    pub fn try_generate(&self) -> Result<Id, SnowError> {
        if let Some(id) = self.fast_path() {
            return Ok(id);
        }
        self.generate_slow_path(
            |current, now| {
                Err(SnowError::ClockMovedBackwards {
                    delta: current.timestamp() - now,
                })
            },
            |elapsed, max| SnowError::TimestampExhausted { elapsed, max },
        )
    }

    /// Load the state before reading the clock. A timestamp claimed by another
    /// thread was read earlier than `now`, so `now < last` is a real rollback.
    #[inline(always)]
    fn observe(&self) -> (State, i64) {
        let current = self.load_state();
        (current, self.now_ms())
    }

    #[inline(always)]
    fn fast_path(&self) -> Option<Id> {
        let (current, now) = self.observe();

        // Fast path 1: time advanced
        if now > current.timestamp() && now <= self.max_ts {
            return self.try_claim_millisecond(current, now);
        }

        // Fast path 2: same millisecond, sequence available
        if now == current.timestamp() {
            return self.try_increment_sequence(current);
        }

        None
    }

    /// Try to claim new millisecond with sequence 0
    #[inline]
    pub(crate) fn try_claim_millisecond(&self, current: State, new_ts: i64) -> Option<Id> {
        let new_state = State::new(new_ts, 0);
        self.cas_state(current, new_state)
            .then(|| self.assemble_id(new_ts, 0))
    }

    /// Try to increment sequence within current millisecond
    #[inline]
    pub(crate) fn try_increment_sequence(&self, current: State) -> Option<Id> {
        if current.sequence() >= self.max_seq {
            return None;
        }
        let new_seq = current.sequence() + 1;
        let new_state = State::new(current.timestamp(), new_seq);
        self.cas_state(current, new_state)
            .then(|| self.assemble_id(current.timestamp(), new_seq))
    }

    /// Atomic compare-and-swap on state
    #[inline(always)]
    pub(crate) fn cas_state(&self, expected: State, new: State) -> bool {
        self.state
            .compare_exchange_weak(
                expected.pack(self.seq_bits),
                new.pack(self.seq_bits),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    fn wait_out_rollback(&self, current: State, now: i64) -> Result<(), Infallible> {
        let delta = current.timestamp() - now;
        tracing::warn!(delta, "clock moved backwards, waiting for it to catch up");
        self.wait_until(current.timestamp(), 1);
        Ok(())
    }

    /// Slow path for contention, sequence exhaustion, clock rollback and a
    /// full timestamp field
    #[cold]
    #[inline(never)]
    fn generate_slow_path<E, F, X>(&self, mut on_rollback: F, on_exhausted: X) -> Result<Id, E>
    where
        F: FnMut(State, i64) -> Result<(), E>,
        X: FnOnce(i64, i64) -> E,
    {
        let mut backoff_ms = 1u64;

        loop {
            let (current, now) = self.observe();

            if now > current.timestamp() {
                if now > self.max_ts {
                    tracing::error!(elapsed = now, max = self.max_ts, "timestamp field exhausted");
                    return Err(on_exhausted(now, self.max_ts));
                }
                if let Some(id) = self.try_claim_millisecond(current, now) {
                    return Ok(id);
                }
                continue;
            }

            if now < current.timestamp() {
                on_rollback(current, now)?;
                continue;
            }

            if let Some(id) = self.try_increment_sequence(current) {
                return Ok(id);
            }

            if current.sequence() >= self.max_seq {
                tracing::trace!(
                    timestamp = current.timestamp(),
                    "sequence exhausted, waiting for next millisecond"
                );
                self.wait_until(current.timestamp() + 1, backoff_ms);
                backoff_ms = next_backoff(backoff_ms);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use crate::tests::test_utils::ManualClock;

    #[test]
    fn test_first_id_claims_millisecond_with_sequence_zero() {
        let clock = ManualClock::new(Layout::standard().epoch() + 5_000);
        let generator = Generator::with_clock(3, Layout::standard(), clock).unwrap();

        let id = generator.generate();
        assert_eq!(generator.decompose(id), (5_000, 3, 0));
    }

    #[test]
    fn test_clock_on_epoch_starts_after_initial_state() {
        let layout = Layout::builder().epoch(1_000).build().unwrap();
        let generator = Generator::with_clock(3, layout, ManualClock::new(1_000)).unwrap();

        let first = generator.generate();
        let second = generator.generate();
        assert_eq!(generator.decompose(first), (0, 3, 1));
        assert_eq!(generator.decompose(second), (0, 3, 2));
    }

    #[test]
    fn test_same_millisecond_increments_sequence() {
        let clock = ManualClock::new(Layout::standard().epoch() + 5_000);
        let generator = Generator::with_clock(3, Layout::standard(), clock).unwrap();

        let steps: Vec<i64> = (0..4).map(|_| generator.step_of(generator.generate())).collect();
        assert_eq!(steps, vec![0, 1, 2, 3]);
        assert_eq!(generator.step(), 3);
    }

    #[test]
    fn test_try_generate_reports_rollback() {
        let clock = ManualClock::new(Layout::standard().epoch() + 5_000);
        let generator =
            Generator::with_clock(3, Layout::standard(), clock.clone()).unwrap();

        let first = generator.try_generate().unwrap();
        clock.set(Layout::standard().epoch() + 4_990);

        assert_eq!(
            generator.try_generate(),
            Err(SnowError::ClockMovedBackwards { delta: 10 })
        );
        // State untouched by the refused call
        assert_eq!(generator.load_state(), State::new(5_000, 0));

        clock.set(Layout::standard().epoch() + 5_000);
        let second = generator.try_generate().unwrap();
        assert!(second > first);
    }
}
