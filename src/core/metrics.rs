use serde::Serialize;

use crate::{
    core::{interval::Interval, rate::RateSlot},
    quantity::{
        cost::Pence,
        energy::KilowattHours,
        percent::Percent,
        power::Kilowatts,
        time::Hours,
    },
};

/// Share of the wall energy that ends up in the battery.
pub const CHARGING_EFFICIENCY: f64 = 0.90;

/// Charge that has to be added to the battery, expressed in several ways.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ChargeNeed {
    pub soc: Percent,
    pub energy: KilowattHours,
    pub hours: Hours,
    pub n_slots: usize,
}

impl ChargeNeed {
    #[must_use]
    pub fn new(soc: Percent, battery_capacity: KilowattHours, charger_power: Kilowatts) -> Self {
        let soc = soc.max(Percent::ZERO);
        let energy = (battery_capacity * soc).max(KilowattHours::ZERO);
        let hours = if charger_power > Kilowatts::ZERO {
            (energy / CHARGING_EFFICIENCY) / charger_power
        } else {
            Hours::ZERO
        };
        Self { soc, energy, hours, n_slots: hours.to_half_hour_slots() }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ChargeMetrics {
    /// What tomorrow morning still needs.
    #[serde(flatten)]
    pub needed: ChargeNeed,

    /// Slots in tonight's window, zero when not charging.
    pub planned_slots: usize,

    /// Absent when not charging or when the window has a hole in the rates.
    pub estimated_cost: Option<Pence>,
}

/// Estimate the cost of charging at full power through the window.
///
/// Returns [`None`] when any half-hour of the window has no known rate.
#[must_use]
pub fn estimate_cost(
    window: Interval,
    rates: &[RateSlot],
    charger_power: Kilowatts,
) -> Option<Pence> {
    if charger_power <= Kilowatts::ZERO {
        return Some(Pence::ZERO);
    }
    let energy_per_slot = charger_power * Hours::HALF;
    window
        .slot_starts()
        .map(|start| {
            rates
                .binary_search_by_key(&start, |slot| slot.start)
                .ok()
                .map(|index| energy_per_slot * rates[index].price)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{DateTime, TimeDelta};

    use super::*;
    use crate::{
        core::interval::{Instant, SLOT},
        quantity::rate::PencePerKilowattHour,
    };

    fn at(text: &str) -> Instant {
        DateTime::parse_from_rfc3339(text).unwrap()
    }

    #[test]
    fn test_need_exactly_two_hours() {
        let need =
            ChargeNeed::new(Percent::from(18.0), KilowattHours::from(70.0), Kilowatts::from(7.0));
        assert_abs_diff_eq!(need.energy.0, 12.6, epsilon = 1e-9);
        assert_abs_diff_eq!(need.hours.0, 2.0, epsilon = 1e-9);
        assert_eq!(need.n_slots, 4);
    }

    #[test]
    fn test_need_rounds_up() {
        let need =
            ChargeNeed::new(Percent::from(40.0), KilowattHours::from(75.0), Kilowatts::from(7.0));
        assert_eq!(need.n_slots, 10);
    }

    #[test]
    fn test_need_without_charger() {
        let need = ChargeNeed::new(Percent::from(40.0), KilowattHours::from(75.0), Kilowatts::ZERO);
        assert_abs_diff_eq!(need.energy.0, 30.0);
        assert_abs_diff_eq!(need.hours.0, 0.0);
        assert_eq!(need.n_slots, 0);
    }

    #[test]
    fn test_need_with_negligible_charger_saturates() {
        let need = ChargeNeed::new(
            Percent::from(100.0),
            KilowattHours::from(1e300),
            Kilowatts::from(1e-300),
        );
        assert_eq!(need.n_slots, usize::MAX);
    }

    #[test]
    fn test_need_is_never_negative() {
        let need =
            ChargeNeed::new(Percent::from(-5.0), KilowattHours::from(75.0), Kilowatts::from(7.0));
        assert_abs_diff_eq!(need.soc.0, 0.0);
        assert_eq!(need.n_slots, 0);
    }

    #[test]
    fn test_estimate_cost() {
        let start = at("2025-12-28T23:00:00Z");
        let rates = [
            RateSlot::new(start, PencePerKilowattHour::from(10.0)),
            RateSlot::new(start + SLOT, PencePerKilowattHour::from(10.0)),
        ];
        let window = Interval::new(start, start + TimeDelta::hours(1));
        let cost = estimate_cost(window, &rates, Kilowatts::from(7.0)).unwrap();
        assert_abs_diff_eq!(cost.0, 70.0);
    }

    #[test]
    fn test_estimate_cost_with_missing_slot() {
        let start = at("2025-12-28T23:00:00Z");
        let rates = [
            RateSlot::new(start, PencePerKilowattHour::from(10.0)),
            RateSlot::new(start + SLOT * 2, PencePerKilowattHour::from(10.0)),
        ];
        let window = Interval::new(start, start + TimeDelta::hours(1));
        assert_eq!(estimate_cost(window, &rates, Kilowatts::from(7.0)), None);
    }

    #[test]
    fn test_estimate_cost_without_power() {
        let start = at("2025-12-28T23:00:00Z");
        let window = Interval::new(start, start + TimeDelta::hours(1));
        assert_eq!(estimate_cost(window, &[], Kilowatts::ZERO), Some(Pence::ZERO));
    }
}
