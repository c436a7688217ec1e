use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Granularity of a calendar view.
///
/// - `Week`: seven days, Monday first.
/// - `Month`: a six-week grid covering the whole month, with days of the
///   neighbouring months shown muted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Week,
    Month,
}

impl Default for Granularity {
    fn default() -> Self {
        Granularity::Week
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            other => Err(format!(
                "invalid calendar view: {other} (expected \"week\" or \"month\")"
            )),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Week => f.write_str("week"),
            Granularity::Month => f.write_str("month"),
        }
    }
}

/// Direction of a window shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDirection {
    Back,
    Forward,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granularity_parses_case_insensitively() {
        assert_eq!("Week".parse::<Granularity>(), Ok(Granularity::Week));
        assert_eq!(" month ".parse::<Granularity>(), Ok(Granularity::Month));
        assert!("day".parse::<Granularity>().is_err());
    }
}
