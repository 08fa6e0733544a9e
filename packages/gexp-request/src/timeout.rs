use std::time::Duration;

use regex::Regex;

use crate::{Error, Result};

/// Parses a time value such as `30s`, `500ms` or `2m`. `setting` names the value in errors.
pub fn parse_time_value(value: &str, setting: &str) -> Result<Duration> {
	let pattern = Regex::new(r"^\s*(\d+)\s*(nanos|micros|ms|s|m|h|d)\s*$")
		.map_err(|err| Error::invalid_argument(format!("Invalid time value pattern: {err}.")))?;
	let Some(captures) = pattern.captures(value) else {
		return Err(Error::invalid_argument(format!(
			"Failed to parse setting [{setting}] with value [{value}] as a time value: unit is missing or unrecognized."
		)));
	};
	let amount: u64 = captures[1].parse().map_err(|_| {
		Error::invalid_argument(format!(
			"Failed to parse setting [{setting}] with value [{value}]: amount is out of range."
		))
	})?;
	let duration = match &captures[2] {
		"nanos" => Some(Duration::from_nanos(amount)),
		"micros" => Some(Duration::from_micros(amount)),
		"ms" => Some(Duration::from_millis(amount)),
		"s" => Some(Duration::from_secs(amount)),
		"m" => amount.checked_mul(60).map(Duration::from_secs),
		"h" => amount.checked_mul(60 * 60).map(Duration::from_secs),
		"d" => amount.checked_mul(24 * 60 * 60).map(Duration::from_secs),
		_ => None,
	};

	duration.ok_or_else(|| {
		Error::invalid_argument(format!(
			"Failed to parse setting [{setting}] with value [{value}]: amount is out of range."
		))
	})
}
