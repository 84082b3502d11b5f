use std::fmt::{Display, Formatter};

use chrono::{Days, NaiveDate, NaiveTime, TimeZone};

use crate::core::{
    interval::{Instant, Interval},
    rate::RateSlot,
    timestamp::at_local_in,
};

/// Vehicle gets plugged in at this local time…
pub const PLUG_IN_TIME: NaiveTime = NaiveTime::from_hms_opt(17, 0, 0).unwrap();

/// …and is driven away at this local time the next day.
pub const PLUG_OUT_TIME: NaiveTime = NaiveTime::from_hms_opt(7, 0, 0).unwrap();

/// Number of nights considered, tonight included.
pub const HORIZON: u64 = 7;

/// Overnight plug window, identified by the date on which it starts.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[must_use]
pub struct Night {
    pub date: NaiveDate,
    pub window: Interval,
}

impl Night {
    /// Night starting on the local date of `now`, in the fixed offset of `now`.
    pub fn tonight(now: Instant) -> Self {
        Self::tonight_in(now, now.offset())
    }

    /// Night starting on the date of `now` in the timezone.
    pub fn tonight_in<Tz: TimeZone>(now: Instant, timezone: &Tz) -> Self {
        Self::starting_on(now.with_timezone(timezone).date_naive(), timezone)
    }

    /// Plug window of the date, at the wall-clock times in effect on that date.
    pub fn starting_on<Tz: TimeZone>(date: NaiveDate, timezone: &Tz) -> Self {
        let window = Interval::new(
            at_local_in(date, PLUG_IN_TIME, timezone),
            at_local_in(date + Days::new(1), PLUG_OUT_TIME, timezone),
        );
        Self { date, window }
    }

    /// Tonight and the following nights, in the fixed offset of `now`.
    #[must_use]
    pub fn horizon(now: Instant) -> Vec<Self> {
        Self::horizon_in(now, now.offset())
    }

    /// Tonight and the following nights, each resolved separately in the timezone.
    #[must_use]
    pub fn horizon_in<Tz: TimeZone>(now: Instant, timezone: &Tz) -> Vec<Self> {
        let tonight = Self::tonight_in(now, timezone);
        (0..HORIZON)
            .map(|n_days| Self::starting_on(tonight.date + Days::new(n_days), timezone))
            .collect()
    }

    /// Slice of the sorted rates that fall inside the plug window.
    #[must_use]
    pub fn slots<'a>(&self, rates: &'a [RateSlot]) -> &'a [RateSlot] {
        let from = rates.partition_point(|slot| slot.start < self.window.start);
        let to = rates.partition_point(|slot| slot.start < self.window.end);
        &rates[from..to]
    }
}

impl Display for Night {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.date.format("%a %d %b"))
    }
}
