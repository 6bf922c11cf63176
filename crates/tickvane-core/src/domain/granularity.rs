use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Sampling frequency of a bar series.
///
/// Daily and intraday bars live in separate tables and never mix within one
/// query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1m")]
    Intraday,
}

impl Granularity {
    pub const ALL: [Self; 2] = [Self::Daily, Self::Intraday];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "1d",
            Self::Intraday => "1m",
        }
    }

    /// Warehouse table holding this series.
    pub const fn table(self) -> &'static str {
        match self {
            Self::Daily => "bars_1d",
            Self::Intraday => "bars_1m",
        }
    }
}

impl Display for Granularity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1d" | "daily" => Ok(Self::Daily),
            "1m" | "intraday" => Ok(Self::Intraday),
            other => Err(ValidationError::InvalidGranularity {
                value: other.to_owned(),
            }),
        }
    }
}
