use serde::{Deserialize, Serialize};

use crate::{core::interval::Instant, quantity::rate::PencePerKilowattHour};

/// Half-hour price slot identified by its start.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, derive_more::Constructor)]
pub struct RateSlot {
    pub start: Instant,
    pub price: PencePerKilowattHour,
}
