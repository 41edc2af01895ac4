use serde::{Deserialize, Serialize};

/// A monthly scoring window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub id: i64,
    pub year: i32,
    pub month: u32,
    pub label: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Period {
    /// The stored label, or `YYYY-MM` when none was recorded.
    pub fn display_label(&self) -> String {
        match self.label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => default_label(self.year, self.month),
        }
    }
}

pub fn default_label(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodCreateInput {
    pub year: i32,
    pub month: u32,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodUpdateInput {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub label: Option<Option<String>>,
}
