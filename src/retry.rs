/// Verdict of a single attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Accept(T),
    Reject(T),
}

/// Result of running a [`RetryPolicy`]. When every attempt was rejected,
/// `value` holds the last rejected candidate and `exhausted` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempted<T> {
    pub value: T,
    pub attempts: usize,
    pub exhausted: bool,
}

/// Bounded retry that degrades to the last candidate instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Calls `attempt` until it accepts a candidate or the budget runs out.
    /// Errors from `attempt` end the loop immediately.
    pub fn attempt<T, E, F>(&self, mut attempt: F) -> Result<Attempted<T>, E>
    where
        F: FnMut(usize) -> Result<Outcome<T>, E>,
    {
        let mut tries = 0;
        loop {
            tries += 1;
            match attempt(tries)? {
                Outcome::Accept(value) => {
                    return Ok(Attempted {
                        value,
                        attempts: tries,
                        exhausted: false,
                    });
                }
                Outcome::Reject(value) if tries >= self.max_attempts => {
                    return Ok(Attempted {
                        value,
                        attempts: tries,
                        exhausted: true,
                    });
                }
                Outcome::Reject(_) => {}
            }
        }
    }
}
