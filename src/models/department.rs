use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub parent_department_id: Option<i64>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCreateInput {
    pub name: String,
    #[serde(default)]
    pub parent_department_id: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentUpdateInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent_department_id: Option<Option<i64>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}
