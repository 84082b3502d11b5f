use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::{
    core::{
        interval::{Interval, SLOT},
        rate::RateSlot,
    },
    quantity::{rate::PencePerKilowattHour, time::Hours},
};

/// Run of consecutive half-hour slots.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Block {
    #[serde(flatten)]
    pub interval: Interval,

    pub n_slots: usize,
    pub mean_price: PencePerKilowattHour,
}

impl Block {
    #[must_use]
    pub fn duration(&self) -> Hours {
        Hours::from_half_hour_slots(self.n_slots)
    }
}

/// Find the cheapest run of exactly `n_slots` consecutive slots.
///
/// A missing half-hour partitions the sequence: no block ever spans a gap.
/// Of equally cheap runs the earliest one wins.
#[must_use]
pub fn find_cheapest_block(slots: &[RateSlot], n_slots: usize) -> Option<Block> {
    if n_slots == 0 || slots.len() < n_slots {
        return None;
    }
    let (total, window) = slots
        .windows(n_slots)
        .filter(|window| is_contiguous(window))
        .map(|window| (window.iter().map(|slot| slot.price).sum::<PencePerKilowattHour>(), window))
        .min_by_key(|(total, _)| OrderedFloat(total.0))?;
    let first = window.first()?;
    let last = window.last()?;
    #[expect(clippy::cast_precision_loss)]
    let mean_price = total / n_slots as f64;
    Some(Block { interval: Interval::new(first.start, last.start + SLOT), n_slots, mean_price })
}

fn is_contiguous(window: &[RateSlot]) -> bool {
    window.iter().tuple_windows().all(|(previous, next)| next.start == previous.start + SLOT)
}
