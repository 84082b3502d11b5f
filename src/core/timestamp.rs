//! Timestamp parsing shared by the rate normalizer and the host boundary.

use chrono::{
    DateTime,
    FixedOffset,
    LocalResult,
    NaiveDate,
    NaiveDateTime,
    NaiveTime,
    Offset,
    TimeDelta,
    TimeZone,
};

use crate::{core::interval::Instant, prelude::*};

const AWARE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];

const NAIVE_FORMATS: [&str; 4] =
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// Parsed timestamp text, which may or may not carry a UTC offset.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Timestamp {
    Aware(Instant),
    Naive(NaiveDateTime),
}

impl Timestamp {
    /// Parse an ISO 8601 timestamp. The `Z` suffix stands for UTC.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = match text.strip_suffix(['Z', 'z']) {
            Some(stripped) => format!("{stripped}+00:00"),
            None => text.to_owned(),
        };
        if let Some(instant) = DateTime::parse_from_rfc3339(&text)
            .ok()
            .or_else(|| {
                AWARE_FORMATS
                    .iter()
                    .find_map(|format| DateTime::parse_from_str(&text, format).ok())
            })
        {
            return Some(Self::Aware(instant));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&text, format).ok())
            .map(Self::Naive)
    }

    /// Attach the hint to a naive timestamp. Without a hint, a naive timestamp stays unresolved.
    #[must_use]
    pub fn resolve(self, timezone_hint: Option<FixedOffset>) -> Option<Instant> {
        match (self, timezone_hint) {
            (Self::Aware(instant), _) => Some(instant),
            (Self::Naive(naive), Some(offset)) => {
                Some(at_local(naive.date(), naive.time(), offset))
            }
            (Self::Naive(_), None) => None,
        }
    }
}

/// Parse a timestamp that must carry its own UTC offset.
pub fn parse_aware_instant(text: &str) -> Result<Instant> {
    match Timestamp::parse(text) {
        Some(Timestamp::Aware(instant)) => Ok(instant),
        Some(Timestamp::Naive(_)) => {
            bail!("`{text}` has no UTC offset, refusing to guess the timezone")
        }
        None => bail!("`{text}` is not an ISO 8601 timestamp"),
    }
}

/// Parse a bare UTC offset like `+01:00`, `-05:00` or `Z`.
pub fn parse_offset(text: &str) -> Result<FixedOffset> {
    let instant = parse_aware_instant(&format!("2000-01-01T00:00:00{}", text.trim()))
        .with_context(|| format!("`{text}` is not a UTC offset"))?;
    Ok(*instant.offset())
}

/// Instant of the local wall-clock time in the fixed offset.
pub fn at_local(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> Instant {
    let utc = date.and_time(time) - TimeDelta::seconds(offset.local_minus_utc().into());
    DateTime::from_naive_utc_and_offset(utc, offset)
}

/// Instant of the local wall-clock time in the timezone, honouring its DST rules.
///
/// An ambiguous time resolves to the earlier instant. A time skipped by a DST gap keeps the
/// offset in effect before the gap.
pub fn at_local_in<Tz: TimeZone>(date: NaiveDate, time: NaiveTime, timezone: &Tz) -> Instant {
    let local = date.and_time(time);
    match local.and_local_timezone(timezone.clone()) {
        LocalResult::Single(instant) | LocalResult::Ambiguous(instant, _) => instant.fixed_offset(),
        LocalResult::None => {
            let before = local - TimeDelta::days(1);
            at_local(date, time, timezone.offset_from_utc_datetime(&before).fix())
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    #[test]
    fn test_parse_zulu() -> Result {
        let instant = parse_aware_instant("2025-12-28T16:00:00Z")?;
        assert_eq!(instant, DateTime::parse_from_rfc3339("2025-12-28T16:00:00+00:00")?);
        Ok(())
    }

    #[test]
    fn test_parse_space_separated_with_offset() -> Result {
        let instant = parse_aware_instant("2025-12-28 16:00:00+01:00")?;
        assert_eq!(instant.hour(), 16);
        assert_eq!(instant.offset().local_minus_utc(), 3600);
        Ok(())
    }

    #[test]
    fn test_parse_naive() {
        assert!(matches!(Timestamp::parse("2025-12-28T16:00:00"), Some(Timestamp::Naive(_))));
        assert!(matches!(Timestamp::parse("2025-12-28T16:00:00.000"), Some(Timestamp::Naive(_))));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(Timestamp::parse("yesterday"), None);
        assert_eq!(Timestamp::parse(""), None);
    }

    #[test]
    fn test_aware_instant_rejects_naive() {
        let error = parse_aware_instant("2025-12-28T16:00:00").unwrap_err();
        assert!(error.to_string().contains("no UTC offset"));
    }

    #[test]
    fn test_resolve_with_hint() -> Result {
        let offset = parse_offset("+01:00")?;
        let naive = Timestamp::parse("2025-12-28T17:00:00").unwrap();
        let instant = naive.resolve(Some(offset)).unwrap();
        assert_eq!(instant, DateTime::parse_from_rfc3339("2025-12-28T16:00:00Z")?);
        assert_eq!(naive.resolve(None), None);
        Ok(())
    }

    #[test]
    fn test_at_local_in_follows_dst() -> Result {
        let london = chrono_tz::Europe::London;
        let time = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        let summer = at_local_in(NaiveDate::from_ymd_opt(2025, 10, 24).unwrap(), time, &london);
        let winter = at_local_in(NaiveDate::from_ymd_opt(2025, 10, 27).unwrap(), time, &london);
        assert_eq!(summer, DateTime::parse_from_rfc3339("2025-10-24T16:00:00Z")?);
        assert_eq!(winter, DateTime::parse_from_rfc3339("2025-10-27T17:00:00Z")?);
        assert_eq!(winter.hour(), 17);
        Ok(())
    }

    #[test]
    fn test_at_local_in_gap() -> Result {
        let london = chrono_tz::Europe::London;
        let time = NaiveTime::from_hms_opt(1, 30, 0).unwrap();
        let instant = at_local_in(NaiveDate::from_ymd_opt(2025, 3, 30).unwrap(), time, &london);
        assert_eq!(instant, DateTime::parse_from_rfc3339("2025-03-30T01:30:00Z")?);
        Ok(())
    }

    #[test]
    fn test_parse_offset_zulu() -> Result {
        assert_eq!(parse_offset("Z")?.local_minus_utc(), 0);
        Ok(())
    }
}
