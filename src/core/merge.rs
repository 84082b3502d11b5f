use std::collections::BTreeMap;

use crate::core::rate::RateSlot;

/// Merge the forecast timeline with the confirmed one.
///
/// On a start collision the confirmed price wins. The result is unique by start and sorted.
#[must_use]
pub fn merge(confirmed: &[RateSlot], forecast: &[RateSlot]) -> Vec<RateSlot> {
    let mut by_start: BTreeMap<_, _> = forecast.iter().map(|slot| (slot.start, *slot)).collect();
    by_start.extend(confirmed.iter().map(|slot| (slot.start, *slot)));
    by_start.into_values().collect()
}
