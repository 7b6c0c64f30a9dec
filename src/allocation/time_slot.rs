use crate::persistence::{BookingLookup, StoreError, StoreResult};
use crate::retry::{Outcome, RetryPolicy};
use crate::timeline::Interval;
use chrono::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A slot handed back by [`TimeSlotAllocator::allocate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAllocation {
    pub interval: Interval,
    /// Candidates sampled before this one was returned, this one included.
    pub attempts: usize,
    /// Set when the retry budget ran out and `interval` is known to collide
    /// with an existing booking on the resource.
    pub overlap_accepted: bool,
}

/// Samples start times inside a project window and checks them against the
/// resource's existing bookings.
#[derive(Debug, Clone, Copy)]
pub struct TimeSlotAllocator {
    retry: RetryPolicy,
}

impl Default for TimeSlotAllocator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS)
    }
}

impl TimeSlotAllocator {
    pub const DEFAULT_MAX_ATTEMPTS: usize = 50;

    pub fn new(max_attempts: usize) -> Self {
        Self {
            retry: RetryPolicy::new(max_attempts),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.retry.max_attempts()
    }

    /// Draws one interval of length `duration` with a uniformly random start.
    ///
    /// The start is taken from `[window.start, window.end - duration]`. When the
    /// duration leaves no slack the upper bound becomes `window.start + 1 day`, so
    /// the start never precedes the window but the end may run past it.
    pub fn candidate<R: Rng + ?Sized>(window: &Interval, duration: Duration, rng: &mut R) -> Interval {
        let mut latest_start = window.end - duration;
        if latest_start <= window.start {
            latest_start = window.start + Duration::days(1);
        }
        let span = (latest_start - window.start).num_seconds();
        let offset = rng.random_range(0..=span);
        Interval::starting_at(window.start + Duration::seconds(offset), duration)
    }

    pub fn allocate<B, R>(
        &self,
        bookings: &B,
        resource_id: i64,
        window: &Interval,
        duration: Duration,
        rng: &mut R,
    ) -> StoreResult<SlotAllocation>
    where
        B: BookingLookup + ?Sized,
        R: Rng + ?Sized,
    {
        let attempted = self.retry.attempt(|_| {
            let candidate = Self::candidate(window, duration, rng);
            let clashes = bookings.count_overlapping(resource_id, &candidate)?;
            Ok::<_, StoreError>(if clashes == 0 {
                Outcome::Accept(candidate)
            } else {
                Outcome::Reject(candidate)
            })
        })?;

        Ok(SlotAllocation {
            interval: attempted.value,
            attempts: attempted.attempts,
            overlap_accepted: attempted.exhausted,
        })
    }
}
