//! Structural validation of filter parameters.
//!
//! Checks run in a fixed order and the first failure is reported: the time
//! range is checked before the result cap.

use chrono::{DateTime, FixedOffset};

use crate::error::{Result, ValidationError};
use crate::params::FilterParameters;

/// Validates filter parameters without side effects.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTimestamp`] if both time bounds are
/// given and either is not RFC3339, then [`ValidationError::InvalidLimit`]
/// if the result cap is negative or not an integer.
pub fn validate(params: &FilterParameters) -> Result<()> {
    if let Some((start, finish)) = params.time_bounds() {
        parse_timestamp(start)?;
        parse_timestamp(finish)?;
    }

    if let Some(max) = params.max_results() {
        parse_max_results(max)?;
    }

    Ok(())
}

/// Parses an RFC3339 timestamp with optional fractional seconds.
///
/// The date and time must be joined by `T`, and surrounding whitespace is
/// not tolerated.
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>> {
    if value.as_bytes().get(10) != Some(&b'T') {
        return Err(ValidationError::InvalidTimestamp);
    }
    DateTime::parse_from_rfc3339(value).map_err(|_| ValidationError::InvalidTimestamp)
}

/// Parses a non-negative decimal result cap.
///
/// No upper bound is applied here; bounding is the controller's policy.
pub(crate) fn parse_max_results(value: &str) -> Result<usize> {
    let parsed: i64 = value
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidLimit)?;
    usize::try_from(parsed).map_err(|_| ValidationError::InvalidLimit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn empty_parameters_are_valid() {
        assert_eq!(validate(&FilterParameters::new()), Ok(()));
    }

    #[test_case("2021-03-17T14:22:20+05:30" ; "offset")]
    #[test_case("2021-03-18T06:41:51.83503Z" ; "fraction utc")]
    #[test_case("2021-03-18T06:41:51.835030123Z" ; "nanoseconds")]
    fn accepts_rfc3339(ts: &str) {
        let params = FilterParameters::new().with_time_range(ts, ts);
        assert_eq!(validate(&params), Ok(()));
    }

    #[test_case("hey", "2021-03-17T14:22:20+05:30" ; "bad start")]
    #[test_case("2021-03-17T14:22:20+05:30", "hey" ; "bad finish")]
    #[test_case("2021-03-17 14:22:20", "2021-03-17T14:22:20Z" ; "missing separator")]
    #[test_case("2021-03-17T14:22:20", "2021-03-17T14:22:20Z" ; "missing offset")]
    #[test_case("2021-03-17 14:22:20+05:30", "2021-03-17 14:23:20+05:30" ; "space separator")]
    #[test_case("2021-03-17t14:22:20+05:30", "2021-03-17T14:23:20+05:30" ; "lowercase separator")]
    #[test_case(" 2021-03-17T14:22:20+05:30", "2021-03-17T14:23:20+05:30" ; "leading whitespace")]
    #[test_case("2021-03-17T14:22:20+05:30", "2021-03-17T14:23:20+05:30 " ; "trailing whitespace")]
    fn rejects_bad_timestamps(start: &str, finish: &str) {
        let params = FilterParameters::new().with_time_range(start, finish);
        assert_eq!(validate(&params), Err(ValidationError::InvalidTimestamp));
    }

    #[test]
    fn single_sided_time_bound_is_ignored() {
        let mut params = FilterParameters::new();
        params.start_time = Some("hey".to_string());
        assert_eq!(validate(&params), Ok(()));
    }

    #[test_case("0", Ok(0) ; "zero")]
    #[test_case("25", Ok(25) ; "small")]
    #[test_case("5000", Ok(5000) ; "above api bound")]
    #[test_case("-2", Err(ValidationError::InvalidLimit) ; "negative")]
    #[test_case("ten", Err(ValidationError::InvalidLimit) ; "not a number")]
    #[test_case("1.5", Err(ValidationError::InvalidLimit) ; "fractional")]
    #[test_case("99999999999999999999", Err(ValidationError::InvalidLimit) ; "overflow")]
    fn max_results_parsing(raw: &str, expected: Result<usize>) {
        assert_eq!(parse_max_results(raw), expected);
    }

    #[test]
    fn time_is_checked_before_limit() {
        let params = FilterParameters::new()
            .with_time_range("hey", "hey")
            .with_max_results("-2");
        assert_eq!(validate(&params), Err(ValidationError::InvalidTimestamp));
    }

    #[test]
    fn negative_limit_rejected() {
        let params = FilterParameters::new().with_max_results("-2");
        assert_eq!(validate(&params), Err(ValidationError::InvalidLimit));
    }

    #[test]
    fn free_form_fields_are_never_rejected() {
        let params = FilterParameters::new()
            .with_namespace("!!")
            .with_pod_name("")
            .with_index("not-a-partition")
            .with_level("???")
            .with_label("a b, c");
        assert_eq!(validate(&params), Ok(()));
    }
}
