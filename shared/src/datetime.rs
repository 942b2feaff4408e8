//! Spring temporal normalization
//!
//! Jackson serializes `LocalDate` / `LocalTime` either as ISO strings or, when
//! `WRITE_DATES_AS_TIMESTAMPS` is on, as JSON arrays (`[2025, 11, 20]`,
//! `[9, 5]`). The ledger only stores the string forms.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A date or time value as it arrives from the Spring backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemporalValue {
    /// Already formatted (`"2025-11-20"`, `"09:05:00"`)
    Text(String),
    /// Array form (`[y, m, d]` or `[h, m, s?, nanos?]`)
    Parts(Vec<i64>),
}

impl From<&str> for TemporalValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<i64>> for TemporalValue {
    fn from(value: Vec<i64>) -> Self {
        Self::Parts(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemporalError {
    #[error("invalid date parts: {0:?}")]
    InvalidDate(Vec<i64>),

    #[error("invalid time parts: {0:?}")]
    InvalidTime(Vec<i64>),
}

/// Normalize a date to `YYYY-MM-DD`.
///
/// Strings are passed through untouched.
pub fn format_date(value: &TemporalValue) -> Result<String, TemporalError> {
    match value {
        TemporalValue::Text(text) => Ok(text.clone()),
        TemporalValue::Parts(parts) => {
            let invalid = || TemporalError::InvalidDate(parts.clone());
            let [year, month, day] = parts.as_slice() else {
                return Err(invalid());
            };
            let year = i32::try_from(*year).map_err(|_| invalid())?;
            let month = u32::try_from(*month).map_err(|_| invalid())?;
            let day = u32::try_from(*day).map_err(|_| invalid())?;
            let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
            Ok(date.format("%Y-%m-%d").to_string())
        }
    }
}

/// Normalize a time to `HH:MM:SS`.
///
/// Jackson omits trailing zero seconds, so `[h, m]` is accepted; nanoseconds
/// are dropped.
pub fn format_time(value: &TemporalValue) -> Result<String, TemporalError> {
    match value {
        TemporalValue::Text(text) => Ok(text.clone()),
        TemporalValue::Parts(parts) => {
            let invalid = || TemporalError::InvalidTime(parts.clone());
            let (hour, minute, second) = match parts.as_slice() {
                [h, m] => (*h, *m, 0),
                [h, m, s] | [h, m, s, _] => (*h, *m, *s),
                _ => return Err(invalid()),
            };
            let hour = u32::try_from(hour).map_err(|_| invalid())?;
            let minute = u32::try_from(minute).map_err(|_| invalid())?;
            let second = u32::try_from(second).map_err(|_| invalid())?;
            let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(invalid)?;
            Ok(time.format("%H:%M:%S").to_string())
        }
    }
}

pub fn format_optional_date(value: Option<&TemporalValue>) -> Result<Option<String>, TemporalError> {
    value.map(format_date).transpose()
}

pub fn format_optional_time(value: Option<&TemporalValue>) -> Result<Option<String>, TemporalError> {
    value.map(format_time).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_parts_are_zero_padded() {
        assert_eq!(
            format_date(&vec![2025, 11, 20].into()).unwrap(),
            "2025-11-20"
        );
        assert_eq!(format_date(&vec![2025, 1, 5].into()).unwrap(), "2025-01-05");
    }

    #[test]
    fn date_string_is_unchanged() {
        assert_eq!(format_date(&"2025-11-20".into()).unwrap(), "2025-11-20");
        // no reformatting of text, even when it is not a plain date
        assert_eq!(
            format_date(&"2025-11-20T08:00:00".into()).unwrap(),
            "2025-11-20T08:00:00"
        );
    }

    #[test]
    fn invalid_date_parts_are_rejected() {
        assert_eq!(
            format_date(&vec![2025, 11].into()),
            Err(TemporalError::InvalidDate(vec![2025, 11]))
        );
        assert!(format_date(&vec![2025, 2, 30].into()).is_err());
        assert!(format_date(&vec![2025, -1, 3].into()).is_err());
    }

    #[test]
    fn time_parts_are_zero_padded() {
        assert_eq!(format_time(&vec![9, 5, 0].into()).unwrap(), "09:05:00");
        assert_eq!(format_time(&vec![14, 30, 15].into()).unwrap(), "14:30:15");
    }

    #[test]
    fn time_without_seconds_gets_zero_seconds() {
        assert_eq!(format_time(&vec![9, 5].into()).unwrap(), "09:05:00");
    }

    #[test]
    fn time_nanos_are_dropped() {
        assert_eq!(
            format_time(&vec![9, 5, 7, 500_000_000].into()).unwrap(),
            "09:05:07"
        );
    }

    #[test]
    fn invalid_time_parts_are_rejected() {
        assert!(format_time(&vec![9].into()).is_err());
        assert!(format_time(&vec![24, 0, 0].into()).is_err());
        assert!(format_time(&vec![9, 60].into()).is_err());
    }

    #[test]
    fn time_string_is_unchanged() {
        assert_eq!(format_time(&"09:05".into()).unwrap(), "09:05");
    }

    #[test]
    fn deserializes_both_shapes() {
        let text: TemporalValue = serde_json::from_str(r#""2025-11-20""#).unwrap();
        assert_eq!(text, TemporalValue::Text("2025-11-20".into()));

        let parts: TemporalValue = serde_json::from_str("[2025,11,20]").unwrap();
        assert_eq!(parts, TemporalValue::Parts(vec![2025, 11, 20]));
    }

    #[test]
    fn optional_helpers_pass_none_through() {
        assert_eq!(format_optional_date(None).unwrap(), None);
        assert_eq!(
            format_optional_time(Some(&vec![8, 0].into())).unwrap(),
            Some("08:00:00".to_string())
        );
    }
}
