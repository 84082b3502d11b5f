use chrono::TimeZone;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::{
    core::{
        block::{Block, find_cheapest_block},
        deadline::{DeadlineState, DeadlineStatus, allocate},
        inputs::PlannerInputs,
        interval::{Instant, Interval},
        merge::merge,
        metrics::{ChargeMetrics, ChargeNeed, estimate_cost},
        night::Night,
        rate::RateSlot,
    },
    prelude::*,
    quantity::time::Hours,
};

/// Length of the opportunistic top-up when nothing is strictly needed.
const OPPORTUNISTIC_SLOTS: usize = 2;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, derive_more::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanState {
    /// Charging window is scheduled.
    #[display("PLUG_IN")]
    PlugIn,

    #[display("NO_NEED")]
    NoNeed,

    /// No rates at all, or none inside tonight's window.
    #[display("NO_DATA")]
    NoData,

    /// Charge is required, but tonight's rates have no long enough contiguous run.
    #[display("AT_RISK")]
    AtRisk,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TonightPlan {
    pub state: PlanState,

    /// Present only together with [`TonightPlan::end`].
    pub start: Option<Instant>,

    pub end: Option<Instant>,
    pub duration_hours: Hours,
    pub reason: String,
}

impl TonightPlan {
    fn plug_in(interval: Interval, duration_hours: Hours, reason: impl Into<String>) -> Self {
        Self {
            state: PlanState::PlugIn,
            start: Some(interval.start),
            end: Some(interval.end),
            duration_hours,
            reason: reason.into(),
        }
    }

    fn from_block(block: &Block, reason: impl Into<String>) -> Self {
        Self::plug_in(block.interval, block.duration(), reason)
    }

    fn idle(state: PlanState, reason: impl Into<String>) -> Self {
        Self { state, start: None, end: None, duration_hours: Hours::ZERO, reason: reason.into() }
    }

    #[must_use]
    pub fn window(&self) -> Option<Interval> {
        Some(Interval::new(self.start?, self.end?))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlannerOutputs {
    pub tonight: TonightPlan,

    /// The next deadline block when tonight is not charging.
    pub next_charge: Option<TonightPlan>,

    pub deadline: DeadlineStatus,
    pub metrics: ChargeMetrics,
}

/// Decide whether, when, and for how long to charge tonight.
///
/// Plug windows are built in the fixed offset of `now`. Use [`plan_in`] to follow a timezone's
/// DST rules across the horizon.
#[must_use]
pub fn plan(
    confirmed_rates: &[RateSlot],
    forecast_rates: &[RateSlot],
    inputs: &PlannerInputs,
) -> PlannerOutputs {
    plan_in(confirmed_rates, forecast_rates, inputs, inputs.now.offset())
}

/// Decide whether, when, and for how long to charge tonight, with plug windows in the timezone.
///
/// Pure function of its arguments: the rate sequences are merged with confirmed prices taking
/// precedence, and nothing is retained between calls.
#[instrument(
    skip_all,
    fields(
        now = %inputs.now,
        n_confirmed = confirmed_rates.len(),
        n_forecast = forecast_rates.len()
    )
)]
pub fn plan_in<Tz: TimeZone>(
    confirmed_rates: &[RateSlot],
    forecast_rates: &[RateSlot],
    inputs: &PlannerInputs,
    timezone: &Tz,
) -> PlannerOutputs {
    let rates = merge(confirmed_rates, forecast_rates);
    let planner = Planner {
        inputs,
        rates: &rates,
        tonight: Night::tonight_in(inputs.now, timezone),
        horizon: Night::horizon_in(inputs.now, timezone),
    };

    let need = inputs.tomorrow_need();
    debug!(
        required = %inputs.required_morning_soc(),
        projected = %inputs.projected_morning_soc(),
        n_slots = need.n_slots,
        "morning",
    );

    let deadline = if rates.is_empty() {
        DeadlineStatus::without_blocks(DeadlineState::Disabled, "Deadline mode disabled.")
    } else {
        allocate(&rates, &planner.horizon, inputs)
    };
    let tonight = planner.plan_tonight(&need, &deadline);
    let next_charge = planner.next_charge(&tonight, &deadline);
    let metrics = planner.metrics(need, &tonight);
    info!(
        state = %tonight.state,
        window = ?tonight.window(),
        deadline = %deadline.status,
        cost = ?metrics.estimated_cost,
        "planned",
    );

    PlannerOutputs { tonight, next_charge, deadline, metrics }
}

struct Planner<'a> {
    inputs: &'a PlannerInputs,
    rates: &'a [RateSlot],
    tonight: Night,
    horizon: Vec<Night>,
}

impl Planner<'_> {
    fn plan_tonight(&self, need: &ChargeNeed, deadline: &DeadlineStatus) -> TonightPlan {
        if self.rates.is_empty() {
            return TonightPlan::idle(
                PlanState::NoData,
                "No rate data available (confirmed or forecast).",
            );
        }
        if let Some(block) = deadline.blocks.get(&self.tonight.date) {
            return TonightPlan::from_block(
                block,
                "Deadline mode: charging scheduled tonight as part of full-by plan.",
            );
        }

        let slots = self.tonight.slots(self.rates);
        if slots.is_empty() {
            return TonightPlan::idle(
                PlanState::NoData,
                "No rate coverage in tonight's plug window (17:00–07:00).",
            );
        }

        if need.n_slots == 0 {
            return self.plan_opportunistic();
        }
        find_cheapest_block(slots, need.n_slots).map_or_else(
            || {
                TonightPlan::idle(
                    PlanState::AtRisk,
                    format!(
                        "Not enough contiguous rate slots tonight to reach {} by tomorrow morning.",
                        self.inputs.required_morning_soc(),
                    ),
                )
            },
            |block| {
                TonightPlan::from_block(
                    &block,
                    format!(
                        "Charge required to reach {} by tomorrow morning: cheapest {} block at {}.",
                        self.inputs.required_morning_soc(),
                        block.duration(),
                        block.mean_price,
                    ),
                )
            },
        )
    }

    /// Top up for an hour only when tonight has the cheapest hour of the whole horizon.
    fn plan_opportunistic(&self) -> TonightPlan {
        let cheapest = self
            .horizon
            .iter()
            .filter_map(|night| {
                find_cheapest_block(night.slots(self.rates), OPPORTUNISTIC_SLOTS)
                    .map(|block| (night, block))
            })
            .min_by_key(|(_, block)| OrderedFloat(block.mean_price.0));
        match cheapest {
            None => TonightPlan::idle(
                PlanState::NoNeed,
                "Above morning target; no opportunistic data for the next 7 nights.",
            ),
            Some((night, block)) if night.date == self.tonight.date => TonightPlan::from_block(
                &block,
                "Opportunistic: tonight has the cheapest 1-hour window across the next 7 nights.",
            ),
            Some((night, block)) => TonightPlan::idle(
                PlanState::NoNeed,
                format!(
                    "Above morning target; the cheapest 1-hour window is on {night} {} at {}.",
                    block.interval, block.mean_price,
                ),
            ),
        }
    }

    fn next_charge(&self, tonight: &TonightPlan, deadline: &DeadlineStatus) -> Option<TonightPlan> {
        if tonight.state == PlanState::PlugIn {
            return None;
        }
        deadline
            .blocks
            .iter()
            .find(|(date, _)| **date > self.tonight.date)
            .map(|(_, block)| {
                TonightPlan::from_block(block, "Next scheduled charge from deadline plan.")
            })
    }

    fn metrics(&self, needed: ChargeNeed, tonight: &TonightPlan) -> ChargeMetrics {
        let (planned_slots, estimated_cost) = match tonight.window() {
            Some(window) if tonight.state == PlanState::PlugIn => (
                window.slot_starts().count(),
                estimate_cost(window, self.rates, self.inputs.charger_power),
            ),
            _ => (0, None),
        };
        ChargeMetrics { needed, planned_slots, estimated_cost }
    }
}
