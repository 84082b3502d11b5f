use bon::Builder;

use crate::{
    core::{interval::Instant, metrics::ChargeNeed},
    quantity::{energy::KilowattHours, percent::Percent, power::Kilowatts},
};

/// Snapshot of everything a single planning run depends on.
#[derive(Clone, Debug, Builder)]
#[must_use]
pub struct PlannerInputs {
    pub now: Instant,

    pub current_soc: Percent,

    /// Expected state-of-charge drop over the next day of driving.
    pub daily_usage: Percent,

    pub battery_capacity: KilowattHours,
    pub charger_power: Kilowatts,

    /// Lowest acceptable state of charge in the morning…
    pub min_morning_soc: Percent,

    /// …plus this margin on top of it.
    pub soc_buffer: Percent,

    /// Replace the morning floor with [`PlannerInputs::full_tomorrow_target_soc`].
    #[builder(default)]
    pub full_tomorrow_enabled: bool,

    #[builder(default = Percent::from(90.0))]
    pub full_tomorrow_target_soc: Percent,

    #[builder(default)]
    pub deadline_enabled: bool,

    /// Hard completion deadline.
    pub full_by: Option<Instant>,

    #[builder(default = Percent::from(90.0))]
    pub deadline_target_soc: Percent,
}

impl PlannerInputs {
    #[must_use]
    pub fn required_morning_soc(&self) -> Percent {
        if self.full_tomorrow_enabled {
            self.full_tomorrow_target_soc
        } else {
            self.min_morning_soc + self.soc_buffer
        }
    }

    /// State of charge tomorrow morning if the vehicle is not charged tonight.
    #[must_use]
    pub fn projected_morning_soc(&self) -> Percent {
        (self.current_soc - self.daily_usage).max(Percent::ZERO)
    }

    #[must_use]
    pub fn tomorrow_need(&self) -> ChargeNeed {
        self.need_for(self.required_morning_soc() - self.projected_morning_soc())
    }

    /// Charge needed to reach the deadline target from the current state of charge.
    ///
    /// Daily usage is deliberately not subtracted: the deadline is an instant, not a morning.
    #[must_use]
    pub fn deadline_need(&self) -> ChargeNeed {
        self.need_for(self.deadline_target_soc - self.current_soc)
    }

    fn need_for(&self, soc: Percent) -> ChargeNeed {
        ChargeNeed::new(soc, self.battery_capacity, self.charger_power)
    }
}
