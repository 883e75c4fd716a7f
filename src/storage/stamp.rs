use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Millisecond timestamps that never repeat within the process.
///
/// When two calls land in the same millisecond (or the wall clock steps
/// back) the next stamp is the previous one plus one.
#[derive(Debug, Default)]
pub struct StampClock {
    last: AtomicI64,
}

impl StampClock {
    pub fn new() -> Self {
        StampClock {
            last: AtomicI64::new(0),
        }
    }

    pub fn next(&self) -> i64 {
        self.next_from(Utc::now().timestamp_millis())
    }

    fn next_from(&self, now: i64) -> i64 {
        let mut prev = self.last.load(Ordering::Acquire);

        loop {
            let candidate = if now > prev { now } else { prev + 1 };

            match self.last.compare_exchange_weak(
                prev,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire
            ) {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}
