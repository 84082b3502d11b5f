//! Conversion of loosely-shaped upstream price payloads into rate slots.

use chrono::FixedOffset;
use serde_json::{Map, Value};

use crate::{
    core::{rate::RateSlot, timestamp::Timestamp},
    prelude::*,
    quantity::rate::PencePerKilowattHour,
};

/// Attribute keys that may hold the list of price records, in priority order.
pub const LIST_KEYS: [&str; 5] = ["rates", "prices", "data", "slots", "items"];

/// Record keys that may hold the slot start, in priority order.
pub const TIMESTAMP_KEYS: [&str; 4] = ["start", "date_time", "datetime", "from"];

/// Record keys that may hold the price, in priority order.
pub const PRICE_KEYS: [&str; 6] =
    ["price_p_per_kwh", "p_per_kwh", "agile_pred", "price", "value", "value_inc_vat"];

/// Why a record did not make it into the rate sequence.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Rejection {
    #[display("not an object")]
    NotAnObject,

    #[display("no timestamp")]
    MissingTimestamp,

    #[display("unparseable timestamp")]
    InvalidTimestamp,

    #[display("timestamp has no timezone")]
    NaiveTimestamp,

    #[display("no price")]
    MissingPrice,

    #[display("non-numeric price")]
    InvalidPrice,
}

/// Locate the list of price records inside a payload.
///
/// The payload is either the list itself or an attribute object carrying it
/// under one of the [`LIST_KEYS`].
#[must_use]
pub fn extract_rate_records(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(records) => records.as_slice(),
        Value::Object(attributes) => LIST_KEYS
            .iter()
            .find_map(|key| attributes.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    }
}

/// Normalize the records into rate slots sorted by start.
///
/// Malformed records are skipped. Duplicate starts are kept.
#[instrument(skip_all, fields(n_records = records.len()))]
#[must_use]
pub fn normalize(records: &[Value], timezone_hint: Option<FixedOffset>) -> Vec<RateSlot> {
    let mut slots: Vec<RateSlot> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| match normalize_record(record, timezone_hint) {
            Ok(slot) => Some(slot),
            Err(rejection) => {
                debug!(index, %rejection, "skipped the record");
                None
            }
        })
        .collect();
    slots.sort_by_key(|slot| slot.start);
    debug!(n_slots = slots.len(), "normalized");
    slots
}

fn normalize_record(
    record: &Value,
    timezone_hint: Option<FixedOffset>,
) -> Result<RateSlot, Rejection> {
    let record = record.as_object().ok_or(Rejection::NotAnObject)?;

    let start = first_present(record, &TIMESTAMP_KEYS)
        .ok_or(Rejection::MissingTimestamp)?
        .as_str()
        .and_then(Timestamp::parse)
        .ok_or(Rejection::InvalidTimestamp)?
        .resolve(timezone_hint)
        .ok_or(Rejection::NaiveTimestamp)?;

    let price = first_present(record, &PRICE_KEYS)
        .ok_or(Rejection::MissingPrice)
        .and_then(|value| parse_price(value).ok_or(Rejection::InvalidPrice))?;

    Ok(RateSlot::new(start, PencePerKilowattHour::from_raw(price)))
}

/// First candidate key holding a non-null value.
fn first_present<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| record.get(*key).filter(|value| !value.is_null()))
}

fn parse_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }?;
    price.is_finite().then_some(price)
}
