//! Confirmed prices remembered across runs.

use std::{fmt::Debug, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    core::{interval::Instant, merge::merge, rate::RateSlot},
    prelude::*,
    quantity::rate::PencePerKilowattHour,
};

/// Confirmed slots owned by the caller and passed into every planning run.
///
/// Confirmed prices are published only a day ahead, so they are kept here to survive until the
/// night they apply to.
#[derive(Default, Serialize, Deserialize)]
#[must_use]
pub struct ConfirmedRateStore {
    /// Sorted by start, one slot per start.
    #[serde(default)]
    slots: Vec<RateSlot>,
}

impl ConfirmedRateStore {
    #[instrument(name = "reading the confirmed rates…")]
    pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(Self::default());
        }
        let mut store: Self = toml::from_slice(
            &fs::read(path).with_context(|| format!("failed to read `{}`", path.display()))?,
        )
        .with_context(|| format!("failed to parse `{}`", path.display()))?;
        store.slots = merge(&store.slots, &[]);
        debug!(n_slots = store.slots.len(), "read");
        Ok(store)
    }

    #[instrument(
        skip(self),
        fields(n_slots = self.slots.len()),
        name = "writing the confirmed rates…"
    )]
    pub fn write_to<P: AsRef<Path> + Debug>(&self, path: P) -> Result {
        let path = path.as_ref();
        fs::write(path, toml::to_string(self)?)
            .with_context(|| format!("failed to write `{}`", path.display()))?;
        Ok(())
    }

    /// Overwrite the stored prices with the fresh ones.
    ///
    /// Returns the number of slots that were added or changed their price.
    pub fn absorb(&mut self, slots: &[RateSlot]) -> usize {
        let n_changed =
            slots.iter().filter(|slot| self.price_at(slot.start) != Some(slot.price)).count();
        self.slots = merge(slots, &self.slots);
        n_changed
    }

    /// Forget the slots that started before the cutoff, returning how many were dropped.
    pub fn prune_before(&mut self, cutoff: Instant) -> usize {
        let n_before = self.slots.len();
        self.slots.retain(|slot| slot.start >= cutoff);
        n_before - self.slots.len()
    }

    #[must_use]
    pub fn slots(&self) -> &[RateSlot] {
        &self.slots
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn price_at(&self, start: Instant) -> Option<PencePerKilowattHour> {
        self.slots
            .binary_search_by_key(&start, |slot| slot.start)
            .ok()
            .map(|index| self.slots[index].price)
    }
}
