use serde::{Deserialize, Serialize};

const SOURCE_COMPUTED: &str = "computed";
const SOURCE_MANUAL: &str = "manual";

/// Score attached to a KPI value, tagged with where it came from.
///
/// `Manual` scores were typed by an operator and are never replaced by
/// recomputation. `Computed` scores are derived from target and actual and
/// are refreshed whenever the inputs change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "camelCase")]
pub enum ScoreEntry {
    Computed(f64),
    Manual(f64),
    #[default]
    Unscored,
}

impl ScoreEntry {
    pub fn value(&self) -> Option<f64> {
        match self {
            ScoreEntry::Computed(score) | ScoreEntry::Manual(score) => Some(*score),
            ScoreEntry::Unscored => None,
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, ScoreEntry::Manual(_))
    }

    pub fn source(&self) -> Option<&'static str> {
        match self {
            ScoreEntry::Computed(_) => Some(SOURCE_COMPUTED),
            ScoreEntry::Manual(_) => Some(SOURCE_MANUAL),
            ScoreEntry::Unscored => None,
        }
    }

    /// Rebuilds the entry from its stored `score` / `score_source` columns.
    /// A score without a recognised source is treated as manual.
    pub fn from_parts(score: Option<f64>, source: Option<&str>) -> Self {
        match (score, source) {
            (None, _) => ScoreEntry::Unscored,
            (Some(score), Some(SOURCE_COMPUTED)) => ScoreEntry::Computed(score),
            (Some(score), _) => ScoreEntry::Manual(score),
        }
    }

    pub fn computed(score: Option<f64>) -> Self {
        score.map(ScoreEntry::Computed).unwrap_or(ScoreEntry::Unscored)
    }
}

/// One measurement of one KPI for one employee in one period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KpiValueRecord {
    pub id: i64,
    pub employee_id: i64,
    pub period_id: i64,
    pub kpi_id: i64,
    pub target_value: Option<f64>,
    pub actual_value: Option<f64>,
    pub weight: Option<f64>,
    pub score: ScoreEntry,
    pub comment: Option<String>,
    pub status: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KpiValueCreateInput {
    pub employee_id: i64,
    pub period_id: i64,
    pub kpi_id: i64,
    #[serde(default)]
    pub target_value: Option<f64>,
    #[serde(default)]
    pub actual_value: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    /// Operator-entered score; stored as a manual override when present.
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Partial update. The outer `Option` means "field supplied" and `Some(None)`
/// clears the field. Deserialized JSON cannot express a clear: `null` and a
/// missing key both land on the outer `None`, so clearing goes through the
/// CLI's `--clear-*` flags. Clearing `score` drops a manual override so the
/// value is recomputed from target and actual.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KpiValueUpdateInput {
    #[serde(default)]
    pub target_value: Option<Option<f64>>,
    #[serde(default)]
    pub actual_value: Option<Option<f64>>,
    #[serde(default)]
    pub weight: Option<Option<f64>>,
    #[serde(default)]
    pub score: Option<Option<f64>>,
    #[serde(default)]
    pub comment: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<Option<String>>,
}
