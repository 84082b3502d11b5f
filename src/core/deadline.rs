use std::collections::BTreeMap;

use chrono::NaiveDate;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::{
    core::{
        block::{Block, find_cheapest_block},
        inputs::PlannerInputs,
        interval::Instant,
        night::Night,
        rate::RateSlot,
    },
    prelude::*,
    quantity::percent::Percent,
};

/// Longest block considered on a single night: the whole 14-hour window.
const MAX_BLOCK_SLOTS: usize = 28;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, derive_more::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeadlineState {
    #[display("ON_TRACK")]
    OnTrack,

    #[display("AT_RISK")]
    AtRisk,

    #[display("DISABLED")]
    Disabled,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeadlineStatus {
    pub status: DeadlineState,
    pub summary: String,

    /// At most one block per night, keyed by the night's date.
    pub blocks: BTreeMap<NaiveDate, Block>,
}

impl DeadlineStatus {
    pub(crate) fn without_blocks(status: DeadlineState, summary: impl Into<String>) -> Self {
        Self { status, summary: summary.into(), blocks: BTreeMap::new() }
    }
}

/// Spread the charge needed by the deadline over the cheapest blocks of the eligible nights.
///
/// Candidate blocks of every even length on every eligible night are ranked by mean price.
/// The ranking is then walked greedily: each night is used at most once and receives the cheapest
/// block of the length it can still contribute.
#[instrument(skip_all, fields(full_by = ?inputs.full_by, target = %inputs.deadline_target_soc))]
pub fn allocate(rates: &[RateSlot], horizon: &[Night], inputs: &PlannerInputs) -> DeadlineStatus {
    let Some(full_by) = inputs.full_by.filter(|_| inputs.deadline_enabled) else {
        return DeadlineStatus::without_blocks(DeadlineState::Disabled, "Deadline mode disabled.");
    };
    if inputs.deadline_target_soc <= Percent::ZERO {
        return DeadlineStatus::without_blocks(
            DeadlineState::Disabled,
            "Deadline target SoC invalid.",
        );
    }
    if full_by <= inputs.now {
        return DeadlineStatus::without_blocks(
            DeadlineState::Disabled,
            "Deadline has already passed.",
        );
    }

    let eligible = horizon.iter().filter(|night| night.window.start < full_by).collect_vec();
    if eligible.is_empty() {
        return DeadlineStatus::without_blocks(
            DeadlineState::AtRisk,
            "No eligible nights before deadline.",
        );
    }

    let need = inputs.deadline_need();
    debug!(soc = %need.soc, n_slots = need.n_slots, n_nights = eligible.len(), "needed");
    if need.n_slots == 0 {
        return DeadlineStatus::without_blocks(
            DeadlineState::OnTrack,
            "Already at or above deadline target SoC.",
        );
    }

    let candidates = eligible
        .iter()
        .flat_map(|night| {
            let slots = night.slots(rates);
            (2..=MAX_BLOCK_SLOTS.min(slots.len()))
                .step_by(2)
                .filter_map(move |n_slots| find_cheapest_block(slots, n_slots))
                .map(move |block| (**night, block))
        })
        .sorted_by_key(|(_, block)| OrderedFloat(block.mean_price.0))
        .collect_vec();
    if candidates.is_empty() {
        return DeadlineStatus::without_blocks(
            DeadlineState::AtRisk,
            "No rate coverage for eligible nights before deadline.",
        );
    }

    let mut remaining = need.n_slots;
    let mut blocks = BTreeMap::new();
    for (night, candidate) in candidates {
        if remaining == 0 {
            break;
        }
        if blocks.contains_key(&night.date) {
            continue;
        }
        let n_slots = candidate.n_slots.min(remaining);
        let Some(block) = find_cheapest_block(night.slots(rates), n_slots) else {
            continue;
        };
        trace!(%night, interval = %block.interval, %block.mean_price, "allocated");
        blocks.insert(night.date, block);
        remaining -= n_slots;
    }

    let status = if remaining == 0 { DeadlineState::OnTrack } else { DeadlineState::AtRisk };
    info!(%status, n_blocks = blocks.len(), remaining, "allocated");
    let summary = summarize(status, &blocks, full_by);
    DeadlineStatus { status, summary, blocks }
}

fn summarize(
    status: DeadlineState,
    blocks: &BTreeMap<NaiveDate, Block>,
    full_by: Instant,
) -> String {
    if blocks.is_empty() {
        return "No charging blocks planned before deadline.".to_string();
    }
    let label = match status {
        DeadlineState::OnTrack => "ON TRACK",
        DeadlineState::AtRisk => "AT RISK",
        DeadlineState::Disabled => "DISABLED",
    };
    let parts = blocks
        .iter()
        .map(|(date, block)| {
            format!("{:.1}h on {} {}", block.duration().0, date.format("%a %d %b"), block.interval)
        })
        .join(", ");
    format!("{label}: {parts}. Full by {}.", full_by.format("%a %d %b %H:%M"))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeDelta};

    use super::*;
    use crate::{
        core::interval::SLOT,
        quantity::{
            energy::KilowattHours,
            power::Kilowatts,
            rate::PencePerKilowattHour,
        },
    };

    fn at(text: &str) -> Instant {
        DateTime::parse_from_rfc3339(text).unwrap()
    }

    fn inputs(now: Instant, full_by: Option<Instant>) -> PlannerInputs {
        PlannerInputs::builder()
            .now(now)
            .current_soc(Percent::from(50.0))
            .daily_usage(Percent::from(10.0))
            .battery_capacity(KilowattHours::from(75.0))
            .charger_power(Kilowatts::from(7.0))
            .min_morning_soc(Percent::from(40.0))
            .soc_buffer(Percent::from(5.0))
            .deadline_enabled(true)
            .maybe_full_by(full_by)
            .deadline_target_soc(Percent::from(90.0))
            .build()
    }

    /// Flat rates through every night from 17:00 to 07:00.
    fn uniform_rates(horizon: &[Night], price: f64) -> Vec<RateSlot> {
        horizon
            .iter()
            .flat_map(|night| night.window.slot_starts())
            .map(|start| RateSlot::new(start, PencePerKilowattHour::from(price)))
            .collect()
    }

    #[test]
    fn test_on_track_over_three_nights() {
        let now = at("2025-12-28T18:00:00Z");
        let full_by = at("2025-12-31T07:00:00Z");
        let horizon = Night::horizon(now);
        let rates = uniform_rates(&horizon, 20.0);
        let inputs = PlannerInputs {
            deadline_target_soc: Percent::from(60.0),
            ..inputs(now, Some(full_by))
        };

        let status = allocate(&rates, &horizon, &inputs);
        assert_eq!(status.status, DeadlineState::OnTrack);
        assert_eq!(
            status.summary,
            "ON TRACK: 1.0h on Sun 28 Dec 17:00–18:00, 0.5h on Mon 29 Dec 17:00–17:30. \
             Full by Wed 31 Dec 07:00.",
        );

        // 10 % of 75 kWh at 90 % efficiency and 7 kW rounds up to 3 slots:
        let n_allocated: usize = status.blocks.values().map(|block| block.n_slots).sum();
        assert_eq!(n_allocated, 3);
        assert!(status.blocks.values().all(|block| block.interval.start < full_by));
    }

    #[test]
    fn test_cheapest_night_goes_first() {
        let now = at("2025-12-28T18:00:00Z");
        let horizon = Night::horizon(now);
        let mut rates = uniform_rates(&horizon[..1], 20.0);
        rates.extend(uniform_rates(&horizon[1..2], 5.0));
        let inputs = PlannerInputs {
            deadline_target_soc: Percent::from(60.0),
            ..inputs(now, Some(at("2025-12-30T06:00:00Z")))
        };

        let status = allocate(&rates, &horizon, &inputs);
        assert_eq!(status.status, DeadlineState::OnTrack);
        assert_eq!(status.blocks[&horizon[1].date].n_slots, 2);
        assert_eq!(status.blocks[&horizon[0].date].n_slots, 1);
    }

    #[test]
    fn test_greedy_takes_the_cheapest_block_length_first() {
        let now = at("2025-12-28T18:00:00Z");
        let full_by = at("2025-12-31T07:00:00Z");
        let horizon = Night::horizon(now);
        let rates = uniform_rates(&horizon, 20.0);

        // Equal prices rank the shortest blocks first, so each night contributes one hour only:
        let status = allocate(&rates, &horizon, &inputs(now, Some(full_by)));
        assert_eq!(status.status, DeadlineState::AtRisk);
        assert_eq!(status.blocks.len(), 3);
        assert!(status.blocks.values().all(|block| block.n_slots == 2));
    }

    #[test]
    fn test_no_block_on_ineligible_night() {
        let now = at("2025-12-28T18:00:00Z");
        let full_by = at("2025-12-29T12:00:00Z");
        let horizon = Night::horizon(now);
        let rates = uniform_rates(&horizon, 20.0);

        let status = allocate(&rates, &horizon, &inputs(now, Some(full_by)));
        assert!(status.blocks.keys().all(|date| *date == horizon[0].date));
    }

    #[test]
    fn test_at_risk_when_not_enough_slots() {
        let now = at("2025-12-28T18:00:00Z");
        let full_by = at("2025-12-29T12:00:00Z");
        let horizon = Night::horizon(now);
        let start = horizon[0].window.start + TimeDelta::hours(6);
        let rates = (0..4)
            .map(|index| RateSlot::new(start + SLOT * index, PencePerKilowattHour::from(10.0)))
            .collect_vec();

        let status = allocate(&rates, &horizon, &inputs(now, Some(full_by)));
        assert_eq!(status.status, DeadlineState::AtRisk);
        let summary = &status.summary;
        assert!(summary.starts_with("AT RISK: 1.0h on Sun 28 Dec 23:00–00:00"), "{summary}");
    }

    #[test]
    fn test_disabled() {
        let now = at("2025-12-28T18:00:00Z");
        let horizon = Night::horizon(now);
        let inputs = PlannerInputs {
            deadline_enabled: false,
            ..inputs(now, Some(at("2025-12-31T07:00:00Z")))
        };

        let status = allocate(&[], &horizon, &inputs);
        assert_eq!(status.status, DeadlineState::Disabled);
        assert_eq!(status.summary, "Deadline mode disabled.");
    }

    #[test]
    fn test_enabled_without_deadline() {
        let now = at("2025-12-28T18:00:00Z");
        let status = allocate(&[], &Night::horizon(now), &inputs(now, None));
        assert_eq!(status.status, DeadlineState::Disabled);
    }

    #[test]
    fn test_invalid_target() {
        let now = at("2025-12-28T18:00:00Z");
        let inputs = PlannerInputs {
            deadline_target_soc: Percent::ZERO,
            ..inputs(now, Some(at("2025-12-31T07:00:00Z")))
        };
        let status = allocate(&[], &Night::horizon(now), &inputs);
        assert_eq!(status.status, DeadlineState::Disabled);
        assert_eq!(status.summary, "Deadline target SoC invalid.");
    }

    #[test]
    fn test_past_deadline() {
        let now = at("2025-12-28T18:00:00Z");
        let inputs = inputs(now, Some(at("2025-12-28T07:00:00Z")));
        let status = allocate(&[], &Night::horizon(now), &inputs);
        assert_eq!(status.status, DeadlineState::Disabled);
        assert!(status.blocks.is_empty());
    }

    #[test]
    fn test_no_eligible_nights() {
        let now = at("2025-12-28T12:00:00Z");
        let inputs = inputs(now, Some(at("2025-12-28T16:00:00Z")));
        let status = allocate(&[], &Night::horizon(now), &inputs);
        assert_eq!(status.status, DeadlineState::AtRisk);
        assert_eq!(status.summary, "No eligible nights before deadline.");
    }

    #[test]
    fn test_already_at_target() {
        let now = at("2025-12-28T18:00:00Z");
        let inputs = PlannerInputs {
            current_soc: Percent::from(95.0),
            ..inputs(now, Some(at("2025-12-31T07:00:00Z")))
        };
        let status = allocate(&[], &Night::horizon(now), &inputs);
        assert_eq!(status.status, DeadlineState::OnTrack);
        assert!(status.blocks.is_empty());
    }

    #[test]
    fn test_no_coverage_on_eligible_nights() {
        let now = at("2025-12-28T18:00:00Z");
        let rates = [RateSlot::new(at("2026-01-02T17:00:00Z"), PencePerKilowattHour::from(10.0))];
        let inputs = inputs(now, Some(at("2025-12-31T07:00:00Z")));
        let status = allocate(&rates, &Night::horizon(now), &inputs);
        assert_eq!(status.status, DeadlineState::AtRisk);
        assert_eq!(status.summary, "No rate coverage for eligible nights before deadline.");
    }
}
