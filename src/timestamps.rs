use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};

use crate::config::TimeBasis;
use crate::errors::TimestampError;
use crate::types::{EpochSeconds, Year};

/// Parse a base-10 integer epoch-seconds value.
///
/// Surrounding whitespace and a leading sign are accepted. Anything else
/// (empty strings, decimals, words) is `NotAnInteger`.
pub fn parse_epoch_seconds(raw: &str) -> Result<EpochSeconds, TimestampError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<EpochSeconds>()
        .map_err(|_| TimestampError::NotAnInteger(trimmed.to_string()))
}

impl TimeBasis {
    /// Calendar date of `timestamp` on this clock.
    pub fn civil_date(self, timestamp: EpochSeconds) -> Result<NaiveDate, TimestampError> {
        let utc = DateTime::from_timestamp(timestamp, 0)
            .ok_or(TimestampError::OutOfRange(timestamp))?;
        match self {
            TimeBasis::Utc => Ok(utc.date_naive()),
            TimeBasis::Local => Local
                .timestamp_opt(timestamp, 0)
                .single()
                .map(|local| local.date_naive())
                .ok_or(TimestampError::OutOfRange(timestamp)),
        }
    }

    /// Calendar year of `timestamp` on this clock.
    pub fn year(self, timestamp: EpochSeconds) -> Result<Year, TimestampError> {
        self.civil_date(timestamp).map(|date| date.year())
    }
}

/// Parse a raw field and resolve its year in one step.
///
/// Returns the parsed timestamp alongside the year so callers can sort on it later.
pub fn timestamp_and_year(
    raw: Option<&str>,
    basis: TimeBasis,
) -> Result<(EpochSeconds, Year), TimestampError> {
    let raw = raw.ok_or(TimestampError::Missing)?;
    let timestamp = parse_epoch_seconds(raw)?;
    let year = basis.year(timestamp)?;
    Ok((timestamp, year))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_epoch_seconds() {
        assert_eq!(parse_epoch_seconds("1609459200"), Ok(1_609_459_200));
        assert_eq!(parse_epoch_seconds(" 1609459200\t"), Ok(1_609_459_200));
        assert_eq!(parse_epoch_seconds("+42"), Ok(42));
        assert_eq!(parse_epoch_seconds("-86400"), Ok(-86_400));
    }

    #[test]
    fn rejects_non_integer_values() {
        assert_eq!(
            parse_epoch_seconds("not_a_number"),
            Err(TimestampError::NotAnInteger("not_a_number".into()))
        );
        assert!(parse_epoch_seconds("").is_err());
        assert!(parse_epoch_seconds("1609459200.5").is_err());
        assert!(parse_epoch_seconds("99999999999999999999").is_err());
    }

    #[test]
    fn utc_dates_and_years_follow_epoch_boundaries() {
        let basis = TimeBasis::Utc;
        assert_eq!(
            basis.civil_date(1_609_459_200),
            Ok(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap())
        );
        assert_eq!(basis.year(1_609_459_199), Ok(2020));
        assert_eq!(basis.year(1_640_995_200), Ok(2022));
        assert_eq!(basis.year(0), Ok(1970));
        assert_eq!(basis.year(-1), Ok(1969));
    }

    #[test]
    fn out_of_range_timestamps_are_rejected() {
        assert_eq!(
            TimeBasis::Utc.year(i64::MAX),
            Err(TimestampError::OutOfRange(i64::MAX))
        );
        assert_eq!(
            TimeBasis::Local.year(i64::MIN),
            Err(TimestampError::OutOfRange(i64::MIN))
        );
    }

    #[test]
    fn local_basis_stays_within_a_day_of_utc() {
        let ts = 1_625_097_600; // 2021-07-01T00:00:00Z
        let utc = TimeBasis::Utc.civil_date(ts).unwrap();
        let local = TimeBasis::Local.civil_date(ts).unwrap();
        assert!((local - utc).num_days().abs() <= 1);
    }

    #[test]
    fn timestamp_and_year_reports_each_failure_kind() {
        assert_eq!(
            timestamp_and_year(Some("1577836800"), TimeBasis::Utc),
            Ok((1_577_836_800, 2020))
        );
        assert_eq!(
            timestamp_and_year(None, TimeBasis::Utc),
            Err(TimestampError::Missing)
        );
        assert_eq!(
            timestamp_and_year(Some("abc"), TimeBasis::Utc),
            Err(TimestampError::NotAnInteger("abc".into()))
        );
    }
}
