use std::{fs, path::PathBuf};

use chrono::{FixedOffset, Local, TimeDelta, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use ev_planner::{
    PlannerInputs,
    RateSlot,
    core::{
        interval::Instant,
        normalize::{extract_rate_records, normalize},
        timestamp::{parse_aware_instant, parse_offset},
    },
    prelude::*,
    quantity::{energy::KilowattHours, percent::Percent, power::Kilowatts},
    store::ConfirmedRateStore,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decide whether, when, and for how long to charge tonight.
    #[clap(name = "plan")]
    Plan(Box<PlanArgs>),

    /// Print the merged rate timeline.
    #[clap(name = "rates")]
    Rates(RatesArgs),
}

#[derive(Parser)]
pub struct PlanArgs {
    #[clap(flatten)]
    pub sources: RateSourceArgs,

    #[clap(flatten)]
    pub vehicle: VehicleArgs,

    #[clap(flatten)]
    pub target: TargetArgs,

    #[clap(flatten)]
    pub deadline: DeadlineArgs,

    /// Planning instant with a UTC offset, defaults to the current time.
    #[clap(long, env = "PLANNER_NOW", value_parser = parse_aware_instant)]
    pub now: Option<Instant>,

    /// IANA timezone of the plug windows, for example `Europe/London`, defaults to the system one.
    #[clap(long, env = "PLANNER_TIMEZONE", value_parser = parse_timezone)]
    pub timezone: Option<Tz>,

    /// Print the plan as JSON instead of tables.
    #[clap(long)]
    pub json: bool,
}

impl PlanArgs {
    pub fn now(&self) -> Instant {
        self.now.unwrap_or_else(|| match self.timezone {
            Some(timezone) => Utc::now().with_timezone(&timezone).fixed_offset(),
            None => Local::now().fixed_offset(),
        })
    }

    pub fn inputs(&self, now: Instant) -> PlannerInputs {
        PlannerInputs::builder()
            .now(now)
            .current_soc(self.vehicle.current_soc)
            .daily_usage(self.vehicle.daily_usage)
            .battery_capacity(self.vehicle.battery_capacity)
            .charger_power(self.vehicle.charger_power)
            .min_morning_soc(self.target.min_morning_soc)
            .soc_buffer(self.target.soc_buffer)
            .full_tomorrow_enabled(self.target.full_tomorrow)
            .full_tomorrow_target_soc(self.target.full_tomorrow_target_soc)
            .deadline_enabled(self.deadline.enabled)
            .maybe_full_by(self.deadline.full_by)
            .deadline_target_soc(self.deadline.target_soc)
            .build()
    }
}

#[derive(Parser)]
pub struct RatesArgs {
    #[clap(flatten)]
    pub sources: RateSourceArgs,

    /// Instant used to prune the confirmed rate store, defaults to the current time.
    #[clap(long, env = "PLANNER_NOW", value_parser = parse_aware_instant)]
    pub now: Option<Instant>,
}

#[derive(Parser)]
pub struct RateSourceArgs {
    /// JSON payload with the confirmed day-ahead prices.
    #[clap(long = "confirmed", env = "CONFIRMED_RATES_PATH")]
    pub confirmed_path: Option<PathBuf>,

    /// JSON payload with the forecast prices.
    #[clap(long = "forecast", env = "FORECAST_RATES_PATH")]
    pub forecast_path: Option<PathBuf>,

    /// UTC offset assumed for timestamps that carry none, for example `+01:00`.
    #[clap(long, env = "TIMEZONE_HINT", value_parser = parse_offset)]
    pub timezone_hint: Option<FixedOffset>,

    /// TOML file that keeps the confirmed prices between runs.
    #[clap(long = "store", env = "CONFIRMED_RATE_STORE_PATH")]
    pub store_path: Option<PathBuf>,
}

/// What loading the rates does to the confirmed rate store.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StoreMode {
    /// Absorb the confirmed payload, prune old slots, and write the store back.
    Update,

    /// Merge the store with the confirmed payload in memory and leave the file untouched.
    ReadOnly,
}

/// Normalized rate streams.
pub struct Rates {
    pub confirmed: Vec<RateSlot>,
    pub forecast: Vec<RateSlot>,
}

impl RateSourceArgs {
    /// Confirmed slots older than this are dropped from the store.
    const STORE_RETENTION: TimeDelta = TimeDelta::days(1);

    #[instrument(skip(self, now))]
    pub fn load(&self, now: Instant, store_mode: StoreMode) -> Result<Rates> {
        let mut confirmed = self.read_payload(self.confirmed_path.as_ref())?;
        let forecast = self.read_payload(self.forecast_path.as_ref())?;
        info!(n_confirmed = confirmed.len(), n_forecast = forecast.len(), "loaded the payloads");

        if let Some(store_path) = &self.store_path {
            let mut store = ConfirmedRateStore::read_from(store_path)?;
            let n_changed = store.absorb(&confirmed);
            let n_pruned = store.prune_before(now - Self::STORE_RETENTION);
            info!(n_changed, n_pruned, n_stored = store.len(), "merged with the store");
            if store_mode == StoreMode::Update {
                store.write_to(store_path)?;
            }
            confirmed = store.slots().to_vec();
        }

        Ok(Rates { confirmed, forecast })
    }

    fn read_payload(&self, path: Option<&PathBuf>) -> Result<Vec<RateSlot>> {
        let Some(path) = path else {
            return Ok(Vec::new());
        };
        let payload: serde_json::Value = serde_json::from_slice(
            &fs::read(path).with_context(|| format!("failed to read `{}`", path.display()))?,
        )
        .with_context(|| format!("`{}` is not valid JSON", path.display()))?;
        let records = extract_rate_records(&payload);
        if records.is_empty() {
            warn!(path = %path.display(), "no rate records found");
        }
        Ok(normalize(records, self.timezone_hint))
    }
}

fn parse_timezone(text: &str) -> Result<Tz> {
    text.parse().map_err(|_| Error::msg(format!("unknown timezone `{text}`")))
}

#[derive(Copy, Clone, Parser)]
pub struct VehicleArgs {
    /// Current vehicle state of charge.
    #[clap(long = "current-soc-percent", env = "CURRENT_SOC_PERCENT")]
    pub current_soc: Percent,

    /// Expected state-of-charge drop over a day of driving.
    #[clap(long = "daily-usage-percent", default_value = "10", env = "DAILY_USAGE_PERCENT")]
    pub daily_usage: Percent,

    /// Usable battery capacity.
    #[clap(long = "battery-capacity-kwh", default_value = "75", env = "BATTERY_CAPACITY_KWH")]
    pub battery_capacity: KilowattHours,

    /// Charger power.
    #[clap(long = "charger-power-kw", default_value = "7", env = "CHARGER_POWER_KW")]
    pub charger_power: Kilowatts,
}

#[derive(Copy, Clone, Parser)]
pub struct TargetArgs {
    /// Lowest acceptable state of charge in the morning.
    #[clap(
        long = "min-morning-soc-percent",
        default_value = "40",
        env = "MIN_MORNING_SOC_PERCENT"
    )]
    pub min_morning_soc: Percent,

    /// Margin added on top of the morning minimum.
    #[clap(long = "soc-buffer-percent", default_value = "5", env = "SOC_BUFFER_PERCENT")]
    pub soc_buffer: Percent,

    /// Charge to the full-tomorrow target instead of the morning minimum.
    #[clap(long = "full-tomorrow", env = "FULL_TOMORROW")]
    pub full_tomorrow: bool,

    #[clap(
        long = "full-tomorrow-target-soc-percent",
        default_value = "90",
        env = "FULL_TOMORROW_TARGET_SOC_PERCENT"
    )]
    pub full_tomorrow_target_soc: Percent,
}

#[derive(Copy, Clone, Parser)]
pub struct DeadlineArgs {
    /// Plan the charge over several nights to finish by `--full-by`.
    #[clap(long = "deadline", env = "DEADLINE_ENABLED")]
    pub enabled: bool,

    /// Deadline instant with a UTC offset, for example `2025-12-31T07:00:00+00:00`.
    #[clap(long = "full-by", env = "FULL_BY", value_parser = parse_aware_instant)]
    pub full_by: Option<Instant>,

    #[clap(
        long = "deadline-target-soc-percent",
        default_value = "90",
        env = "DEADLINE_TARGET_SOC_PERCENT"
    )]
    pub target_soc: Percent,
}
