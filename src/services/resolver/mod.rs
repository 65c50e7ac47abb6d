//! Field resolution: finds each form control on the page and fills it.
//!
//! Controls are located afresh on every fill through an ordered list of
//! [`LocateStrategy`] implementations; the first one that finds a control
//! wins. Missing controls are reported per field and never abort the fill.

pub mod selectors;
pub mod strategy;
pub mod target;
pub mod widgets;

use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::dom::{Document, DomError};
use crate::models::{
    BookingRecord, FieldId, FieldKind, FieldReport, FieldStatus, FieldValue, FillDefaults,
    FillReport,
};

pub use selectors::SelectorConfig;
pub use strategy::{AttributeSubstring, DirectSelector, LabelAssociation, LocateStrategy, NearestText};
pub use target::{Control, FieldTarget};

pub const FILL_SUCCESS_MESSAGE: &str = "Form filled successfully";

/// Which strategies the resolver tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolverMode {
    /// Configured selectors only.
    Direct,
    /// Label association, attribute substring, then proximity.
    Heuristic,
    /// Direct selectors first, then the heuristics.
    #[default]
    Auto,
}

impl FromStr for ResolverMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(ResolverMode::Direct),
            "heuristic" => Ok(ResolverMode::Heuristic),
            "auto" => Ok(ResolverMode::Auto),
            other => Err(format!("unknown resolver mode: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub mode: ResolverMode,
    pub selectors: SelectorConfig,
    pub date_picker_settle: Duration,
    pub dropdown_settle: Duration,
    pub defaults: FillDefaults,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            mode: ResolverMode::Auto,
            selectors: SelectorConfig::default(),
            date_picker_settle: Duration::from_millis(200),
            dropdown_settle: Duration::from_millis(500),
            defaults: FillDefaults::default(),
        }
    }
}

pub struct FieldResolver {
    strategies: Vec<Box<dyn LocateStrategy>>,
    date_picker_settle: Duration,
    dropdown_settle: Duration,
    defaults: FillDefaults,
}

impl FieldResolver {
    pub fn new(config: ResolverConfig) -> Self {
        let mut strategies: Vec<Box<dyn LocateStrategy>> = Vec::new();
        if config.mode != ResolverMode::Heuristic {
            strategies.push(Box::new(DirectSelector::new(config.selectors)));
        }
        if config.mode != ResolverMode::Direct {
            strategies.push(Box::new(LabelAssociation));
            strategies.push(Box::new(AttributeSubstring));
            strategies.push(Box::new(NearestText));
        }

        Self {
            strategies,
            date_picker_settle: config.date_picker_settle,
            dropdown_settle: config.dropdown_settle,
            defaults: config.defaults,
        }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Locates the control for `field`, trying each strategy in order.
    pub fn resolve(&self, doc: &Document, field: FieldId) -> Result<Option<FieldTarget>, DomError> {
        for strategy in &self.strategies {
            if let Some(control) = strategy.locate(doc, field)? {
                debug!(%field, strategy = strategy.name(), "resolved field");
                return Ok(Some(FieldTarget {
                    field,
                    control,
                    strategy: strategy.name(),
                }));
            }
        }
        Ok(None)
    }

    /// Fills every field the record has a value for, in form order.
    ///
    /// Settling delays are awaited, so the report reflects date-picker and
    /// dropdown selections too. A missing control marks its field
    /// `not_found` and the fill carries on; only a DOM fault fails the
    /// whole operation, leaving already-filled fields as they are.
    pub async fn fill_form(&self, record: &BookingRecord, doc: &mut Document) -> FillReport {
        let mut fields = Vec::with_capacity(FieldId::ALL.len());

        for field in FieldId::ALL {
            let Some(value) = record.value_for(field, &self.defaults) else {
                debug!(%field, "no value, leaving unfilled");
                fields.push(FieldReport {
                    field,
                    status: FieldStatus::Skipped,
                    strategy: None,
                });
                continue;
            };

            match self.fill_field(doc, field, &value).await {
                Ok(Some(strategy)) => {
                    debug!(%field, value = %value.display(), strategy, "filled field");
                    fields.push(FieldReport {
                        field,
                        status: FieldStatus::Filled,
                        strategy: Some(strategy.to_string()),
                    });
                }
                Ok(None) => {
                    warn!(%field, "could not find field on page");
                    fields.push(FieldReport {
                        field,
                        status: FieldStatus::NotFound,
                        strategy: None,
                    });
                }
                Err(e) => {
                    error!(%field, error = %e, "form fill aborted");
                    return FillReport {
                        success: false,
                        message: e.to_string(),
                        fields,
                    };
                }
            }
        }

        let report = FillReport {
            success: true,
            message: FILL_SUCCESS_MESSAGE.to_string(),
            fields,
        };
        info!(not_found = report.not_found().len(), "form fill complete");
        report
    }

    /// Returns the name of the strategy that found the control, or `None`
    /// when no control (or no acceptable option) was found.
    async fn fill_field(
        &self,
        doc: &mut Document,
        field: FieldId,
        value: &FieldValue,
    ) -> Result<Option<&'static str>, DomError> {
        let Some(target) = self.resolve(doc, field)? else {
            return Ok(None);
        };

        let filled = match (&target.control, value) {
            (Control::Input(input), FieldValue::Text(text)) => {
                if field.kind() == FieldKind::DatePicker {
                    widgets::fill_date(doc, *input, text, self.date_picker_settle).await?;
                } else {
                    widgets::fill_text(doc, *input, text)?;
                }
                true
            }
            (Control::NativeSelect(select), FieldValue::Text(text)) => {
                widgets::fill_native_select(doc, *select, text)?
            }
            (
                Control::Combobox {
                    control,
                    current,
                    option_selector,
                },
                FieldValue::Text(text),
            ) => {
                widgets::fill_combobox(
                    doc,
                    *control,
                    current.as_deref(),
                    option_selector,
                    text,
                    self.dropdown_settle,
                )
                .await?
            }
            (Control::Choice(group), FieldValue::Choice(answer, style)) => {
                widgets::pick_choice(doc, group, *answer, *style)?
            }
            (control, value) => {
                warn!(%field, ?control, ?value, "control does not accept this value");
                false
            }
        };

        Ok(filled.then_some(target.strategy))
    }
}
