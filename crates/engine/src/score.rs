//! Score normalization
//!
//! Time-based competitions collect hours/minutes/seconds and store a single
//! count of seconds. Count-based competitions store the integer as given.
//! No range checks are applied: negative or oversized components pass through.

use crate::types::ScoreFormat;
use thiserror::Error;

/// A score as entered on the submission form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreInput {
    Duration { hours: i64, minutes: i64, seconds: i64 },
    Count(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreInputError {
    #[error("missing score: {0}")]
    Missing(&'static str),

    #[error("'{value}' is not a whole number ({field})")]
    NotANumber { field: &'static str, value: String },
}

impl ScoreInput {
    /// Build a score from raw form fields, picking the fields that match `format`.
    ///
    /// For durations, blank components count as zero but at least one of the
    /// three must be filled in.
    pub fn from_fields(
        format: ScoreFormat,
        hours: Option<&str>,
        minutes: Option<&str>,
        seconds: Option<&str>,
        number_score: Option<&str>,
    ) -> Result<Self, ScoreInputError> {
        match format {
            ScoreFormat::Time => {
                let hours = parse_field("hours", hours)?;
                let minutes = parse_field("minutes", minutes)?;
                let seconds = parse_field("seconds", seconds)?;
                if hours.is_none() && minutes.is_none() && seconds.is_none() {
                    return Err(ScoreInputError::Missing("hours, minutes or seconds"));
                }
                Ok(Self::Duration {
                    hours: hours.unwrap_or(0),
                    minutes: minutes.unwrap_or(0),
                    seconds: seconds.unwrap_or(0),
                })
            }
            ScoreFormat::Count => parse_field("number_score", number_score)?
                .map(Self::Count)
                .ok_or(ScoreInputError::Missing("number_score")),
        }
    }

    /// The single integer stored for this score
    pub fn normalize(&self) -> i64 {
        match *self {
            Self::Duration {
                hours,
                minutes,
                seconds,
            } => hours
                .saturating_mul(3600)
                .saturating_add(minutes.saturating_mul(60))
                .saturating_add(seconds),
            Self::Count(n) => n,
        }
    }
}

fn parse_field(field: &'static str, raw: Option<&str>) -> Result<Option<i64>, ScoreInputError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ScoreInputError::NotANumber {
                field,
                value: value.to_string(),
            }),
    }
}

/// Render a stored score for display: `H:MM:SS` for time, plain integer for count
pub fn format_score(format: ScoreFormat, score: i64) -> String {
    match format {
        ScoreFormat::Time => {
            let sign = if score < 0 { "-" } else { "" };
            let total = score.unsigned_abs();
            format!(
                "{sign}{}:{:02}:{:02}",
                total / 3600,
                (total % 3600) / 60,
                total % 60
            )
        }
        ScoreFormat::Count => score.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_collapses_to_seconds() {
        let input = ScoreInput::Duration {
            hours: 1,
            minutes: 2,
            seconds: 3,
        };
        assert_eq!(input.normalize(), 3723);
    }

    #[test]
    fn test_count_passes_through() {
        assert_eq!(ScoreInput::Count(42).normalize(), 42);
    }

    #[test]
    fn test_no_range_validation() {
        let input = ScoreInput::Duration {
            hours: 0,
            minutes: 90,
            seconds: -5,
        };
        assert_eq!(input.normalize(), 5395);
        assert_eq!(ScoreInput::Count(-3).normalize(), -3);
    }

    #[test]
    fn test_from_fields_time() {
        let input =
            ScoreInput::from_fields(ScoreFormat::Time, Some("1"), Some("2"), Some("3"), None)
                .unwrap();
        assert_eq!(input.normalize(), 3723);
    }

    #[test]
    fn test_from_fields_blank_components_default_to_zero() {
        let input =
            ScoreInput::from_fields(ScoreFormat::Time, Some(""), Some("5"), None, None).unwrap();
        assert_eq!(input.normalize(), 300);
    }

    #[test]
    fn test_from_fields_time_all_missing() {
        let err = ScoreInput::from_fields(ScoreFormat::Time, None, Some(" "), None, Some("42"))
            .unwrap_err();
        assert!(matches!(err, ScoreInputError::Missing(_)));
    }

    #[test]
    fn test_from_fields_count_ignores_time_fields() {
        let input =
            ScoreInput::from_fields(ScoreFormat::Count, Some("1"), None, None, Some(" 42 "))
                .unwrap();
        assert_eq!(input, ScoreInput::Count(42));
    }

    #[test]
    fn test_from_fields_count_missing() {
        let err = ScoreInput::from_fields(ScoreFormat::Count, Some("1"), Some("2"), Some("3"), None)
            .unwrap_err();
        assert_eq!(err, ScoreInputError::Missing("number_score"));
    }

    #[test]
    fn test_from_fields_not_a_number() {
        let err = ScoreInput::from_fields(ScoreFormat::Time, Some("one"), None, None, None)
            .unwrap_err();
        assert_eq!(
            err,
            ScoreInputError::NotANumber {
                field: "hours",
                value: "one".to_string()
            }
        );
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(ScoreFormat::Time, 3723), "1:02:03");
        assert_eq!(format_score(ScoreFormat::Time, 59), "0:00:59");
        assert_eq!(format_score(ScoreFormat::Time, -61), "-0:01:01");
        assert_eq!(format_score(ScoreFormat::Count, 42), "42");
    }
}
