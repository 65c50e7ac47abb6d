use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::models::{FieldId, FieldKind};

/// Selectors for one known build of the booking page.
///
/// This is the part of the page contract most likely to change between page
/// versions, so it is data: `SELECTORS_PATH` can replace it without a rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Text and date inputs, keyed by field.
    pub fields: BTreeMap<FieldId, String>,
    /// Question text of a choice widget.
    pub choice_label: String,
    pub choice_container: String,
    pub choice_option: String,
    /// Option caption, looked up inside each option.
    pub choice_option_label: String,
    pub dropdown_label: String,
    pub dropdown_container: String,
    pub dropdown_control: String,
    /// Currently selected value shown inside the control.
    pub dropdown_value: String,
    /// Options rendered after the control opens; searched page-wide.
    pub dropdown_option: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        let fields = FieldId::ALL
            .into_iter()
            .filter_map(|field| {
                let selector = match field.kind() {
                    FieldKind::Text => format!("input[aria-label='{}']", field.label()),
                    FieldKind::DatePicker => ".ant-picker-input input".to_string(),
                    FieldKind::Dropdown | FieldKind::Choice => return None,
                };
                Some((field, selector))
            })
            .collect();

        Self {
            fields,
            choice_label: ".ql-editor p".to_string(),
            choice_container: ".fillout-field-multiple-choice".to_string(),
            choice_option: "[role='radio']".to_string(),
            choice_option_label: "div[id$='-label']".to_string(),
            dropdown_label: "[id$='-label']".to_string(),
            dropdown_container: ".fillout-field-dropdown".to_string(),
            dropdown_control: "[class$='-control']".to_string(),
            dropdown_value: "[class$='-singleValue']".to_string(),
            dropdown_option: "[id^='react-select-'][id$='-option']".to_string(),
        }
    }
}

impl SelectorConfig {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let config: SelectorConfig = serde_json::from_str(raw)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read selector config {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("invalid selector config {}", path.display()))
    }
}
