use serde::{Deserialize, Serialize};

use super::field::FieldId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    Filled,
    /// No control matched, or the control had no acceptable option.
    NotFound,
    /// The record had no value for this field.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldReport {
    pub field: FieldId,
    pub status: FieldStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

/// Result of one `fillForm` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillReport {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldReport>,
}

impl FillReport {
    pub fn not_found(&self) -> Vec<FieldId> {
        self.fields
            .iter()
            .filter(|f| f.status == FieldStatus::NotFound)
            .map(|f| f.field)
            .collect()
    }

    pub fn status_of(&self, field: FieldId) -> Option<FieldStatus> {
        self.fields.iter().find(|f| f.field == field).map(|f| f.status)
    }
}
