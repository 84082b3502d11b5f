//! Overnight EV charge planner over half-hourly electricity prices.
//!
//! Raw price payloads go through [`normalize`], the confirmed and forecast streams are combined
//! by [`merge`], and [`plan`] decides what to do tonight and, optionally, how to meet a
//! multi-night deadline.

pub mod core;
pub mod prelude;
pub mod quantity;
pub mod store;

pub use self::core::{
    block::{Block, find_cheapest_block},
    deadline::{DeadlineState, DeadlineStatus},
    inputs::PlannerInputs,
    merge::merge,
    metrics::ChargeMetrics,
    normalize::{extract_rate_records, normalize},
    planner::{PlanState, PlannerOutputs, TonightPlan, plan, plan_in},
    rate::RateSlot,
};
