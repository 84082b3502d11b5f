use std::fmt::{Debug, Display, Formatter};

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::Serialize;

/// Timezone-aware instant.
pub type Instant = DateTime<FixedOffset>;

/// Pricing slot length.
pub const SLOT: TimeDelta = TimeDelta::minutes(30);

#[derive(Copy, Clone, Eq, PartialEq, Serialize)]
#[must_use]
pub struct Interval {
    /// Inclusive.
    pub start: Instant,

    /// Exclusive.
    pub end: Instant,
}

impl Debug for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}–{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

impl Interval {
    pub const fn new(start: Instant, end: Instant) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn duration(self) -> TimeDelta {
        self.end - self.start
    }

    #[must_use]
    pub fn contains(self, other: Instant) -> bool {
        (self.start <= other) && (other < self.end)
    }

    /// Starts of the half-hour slots that lie fully inside the interval.
    pub fn slot_starts(self) -> impl Iterator<Item = Instant> {
        std::iter::successors(Some(self.start), |start| Some(*start + SLOT))
            .take_while(move |start| *start + SLOT <= self.end)
    }
}
