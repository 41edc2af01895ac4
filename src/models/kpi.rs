use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Polarity of a KPI: whether a larger actual value is better or worse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    HigherIsBetter,
    LowerIsBetter,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::HigherIsBetter => "HigherIsBetter",
            Direction::LowerIsBetter => "LowerIsBetter",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "higherisbetter" | "higher" | "higher_is_better" => Ok(Direction::HigherIsBetter),
            "lowerisbetter" | "lower" | "lower_is_better" => Ok(Direction::LowerIsBetter),
            other => Err(format!("unknown KPI direction `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KpiDefinition {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub direction: Direction,
    pub default_weight: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KpiCreateInput {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub default_weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KpiUpdateInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<Option<String>>,
    #[serde(default)]
    pub unit: Option<Option<String>>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub default_weight: Option<Option<f64>>,
}
