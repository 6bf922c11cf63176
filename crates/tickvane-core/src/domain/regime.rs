use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Categorical market-regime label for one ticker.
///
/// A closed set: the decision cascade matches exhaustively, so adding a
/// variant is a compile-time exercise. Serialized by name, never by ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    NoData,
    Uptrend,
    Downtrend,
    Squeeze,
    Sideways,
}

impl Regime {
    pub const ALL: [Self; 5] = [
        Self::NoData,
        Self::Uptrend,
        Self::Downtrend,
        Self::Squeeze,
        Self::Sideways,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoData => "NO_DATA",
            Self::Uptrend => "UPTREND",
            Self::Downtrend => "DOWNTREND",
            Self::Squeeze => "SQUEEZE",
            Self::Sideways => "SIDEWAYS",
        }
    }
}

impl Display for Regime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Regime {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "NO_DATA" => Ok(Self::NoData),
            "UPTREND" => Ok(Self::Uptrend),
            "DOWNTREND" => Ok(Self::Downtrend),
            "SQUEEZE" => Ok(Self::Squeeze),
            "SIDEWAYS" => Ok(Self::Sideways),
            other => Err(ValidationError::InvalidRegimeLabel {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_by_name() {
        let json = serde_json::to_string(&Regime::NoData).expect("serialize");
        assert_eq!(json, "\"NO_DATA\"");
    }

    #[test]
    fn parses_label_case_insensitively() {
        assert_eq!(Regime::from_str("squeeze").expect("parse"), Regime::Squeeze);
    }

    #[test]
    fn rejects_unknown_label() {
        let err = Regime::from_str("CRAB").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidRegimeLabel { .. }));
    }
}
