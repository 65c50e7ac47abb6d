use tracing::debug;

use super::selectors::SelectorConfig;
use super::target::{
    alphanumeric, as_control, associated_label, candidate_controls, choice_groups, group_scopes,
    mentions, nearby_label, ChoiceGroup, ChoiceOption, Control,
};
use crate::dom::{Document, DomError, NodeId};
use crate::models::{FieldId, FieldKind};

/// One way of finding the control for a field.
///
/// `Ok(None)` means "not found by this strategy"; the resolver moves on to
/// the next one. Errors are reserved for faults such as a malformed
/// configured selector.
pub trait LocateStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn locate(&self, doc: &Document, field: FieldId) -> Result<Option<Control>, DomError>;
}

/// Known selectors for a known page build.
pub struct DirectSelector {
    selectors: SelectorConfig,
}

impl DirectSelector {
    pub fn new(selectors: SelectorConfig) -> Self {
        Self { selectors }
    }

    fn locate_input(&self, doc: &Document, field: FieldId) -> Result<Option<Control>, DomError> {
        let Some(css) = self.selectors.fields.get(&field) else {
            return Ok(None);
        };
        Ok(doc
            .select(css)?
            .into_iter()
            .find_map(|id| as_control(doc, id, field.kind())))
    }

    fn locate_choice(&self, doc: &Document, field: FieldId) -> Result<Option<Control>, DomError> {
        let s = &self.selectors;
        for label in doc.select(&s.choice_label)? {
            if !mentions(&doc.text_content(label), field.search_text()) {
                continue;
            }
            let Some(container) = doc.closest(label, &s.choice_container)? else {
                continue;
            };
            let options = doc
                .select_within(container, &s.choice_option)?
                .into_iter()
                .map(|node| {
                    let caption = doc
                        .select_within(node, &s.choice_option_label)?
                        .first()
                        .map(|l| doc.text_content(*l))
                        .unwrap_or_default();
                    Ok(ChoiceOption {
                        node,
                        label: caption,
                        value: None,
                    })
                })
                .collect::<Result<Vec<_>, DomError>>()?;
            return Ok(Some(Control::Choice(ChoiceGroup { container, options })));
        }
        Ok(None)
    }

    fn locate_dropdown(&self, doc: &Document, field: FieldId) -> Result<Option<Control>, DomError> {
        let s = &self.selectors;
        for label in doc.select(&s.dropdown_label)? {
            if !mentions(&doc.text_content(label), field.search_text()) {
                continue;
            }
            let Some(container) = doc.closest(label, &s.dropdown_container)? else {
                continue;
            };
            let Some(control) = doc
                .select_within(container, &s.dropdown_control)?
                .first()
                .copied()
            else {
                continue;
            };
            let current = doc
                .select_within(control, &s.dropdown_value)?
                .first()
                .map(|v| doc.text_content(*v));
            return Ok(Some(Control::Combobox {
                control,
                current,
                option_selector: s.dropdown_option.clone(),
            }));
        }
        Ok(None)
    }
}

impl LocateStrategy for DirectSelector {
    fn name(&self) -> &'static str {
        "direct_selector"
    }

    fn locate(&self, doc: &Document, field: FieldId) -> Result<Option<Control>, DomError> {
        match field.kind() {
            FieldKind::Text | FieldKind::DatePicker => self.locate_input(doc, field),
            FieldKind::Dropdown => self.locate_dropdown(doc, field),
            FieldKind::Choice => self.locate_choice(doc, field),
        }
    }
}

fn fieldset_legend(doc: &Document, node: NodeId) -> Option<String> {
    doc.ancestors(node)
        .into_iter()
        .filter(|a| doc.is_tag(*a, "fieldset"))
        .find_map(|fieldset| {
            doc.child_elements(fieldset)
                .into_iter()
                .find(|c| doc.is_tag(*c, "legend"))
        })
        .map(|legend| doc.text_content(legend))
}

fn group_aria_label(doc: &Document, group: &ChoiceGroup) -> Option<String> {
    let named = |id: NodeId| {
        if let Some(label) = doc.attr(id, "aria-label") {
            return Some(label.to_string());
        }
        let ids = doc.attr(id, "aria-labelledby")?;
        let text: Vec<String> = ids
            .split_whitespace()
            .filter_map(|l| doc.element_by_id(l))
            .map(|l| doc.text_content(l))
            .collect();
        (!text.is_empty()).then(|| text.join(" "))
    };
    std::iter::once(group.container)
        .chain(doc.ancestors(group.container))
        .filter(|id| *id == group.container || doc.attr(*id, "role") == Some("radiogroup"))
        .find_map(named)
}

/// Markup-level association: `<label for>`, ARIA naming, wrapping labels
/// and fieldset legends.
pub struct LabelAssociation;

impl LocateStrategy for LabelAssociation {
    fn name(&self) -> &'static str {
        "label_association"
    }

    fn locate(&self, doc: &Document, field: FieldId) -> Result<Option<Control>, DomError> {
        let search = field.search_text();

        if field.kind() == FieldKind::Choice {
            return Ok(choice_groups(doc)
                .into_iter()
                .find(|group| {
                    let anchor = group.options.first().map(|o| o.node).unwrap_or(group.container);
                    group_aria_label(doc, group)
                        .or_else(|| fieldset_legend(doc, anchor))
                        .is_some_and(|label| mentions(&label, search))
                })
                .map(Control::Choice));
        }

        Ok(candidate_controls(doc, field.kind())
            .into_iter()
            .find(|(id, _)| {
                associated_label(doc, *id)
                    .or_else(|| fieldset_legend(doc, *id))
                    .is_some_and(|label| mentions(&label, search))
            })
            .map(|(_, control)| control))
    }
}

/// Matches the field name against `placeholder`, `name` and `id`, ignoring
/// punctuation and case.
pub struct AttributeSubstring;

const MATCHED_ATTRIBUTES: [&str; 3] = ["placeholder", "name", "id"];

fn attributes_mention(doc: &Document, id: NodeId, needle: &str) -> bool {
    MATCHED_ATTRIBUTES
        .iter()
        .filter_map(|attr| doc.attr(id, attr))
        .any(|value| alphanumeric(value).contains(needle))
}

impl LocateStrategy for AttributeSubstring {
    fn name(&self) -> &'static str {
        "attribute_substring"
    }

    fn locate(&self, doc: &Document, field: FieldId) -> Result<Option<Control>, DomError> {
        let needle = alphanumeric(field.search_text());

        if field.kind() == FieldKind::Choice {
            return Ok(choice_groups(doc)
                .into_iter()
                .find(|group| {
                    attributes_mention(doc, group.container, &needle)
                        || group.options.first().is_some_and(|o| {
                            doc.attr(o.node, "name")
                                .is_some_and(|name| alphanumeric(name).contains(&needle))
                        })
                })
                .map(Control::Choice));
        }

        Ok(candidate_controls(doc, field.kind())
            .into_iter()
            .find(|(id, _)| attributes_mention(doc, *id, &needle))
            .map(|(_, control)| control))
    }
}

/// Last resort: whatever text reads as the control's label, down to the
/// text printed closest to it on screen.
pub struct NearestText;

impl LocateStrategy for NearestText {
    fn name(&self) -> &'static str {
        "nearest_text"
    }

    fn locate(&self, doc: &Document, field: FieldId) -> Result<Option<Control>, DomError> {
        let search = field.search_text();

        if field.kind() == FieldKind::Choice {
            let groups = choice_groups(doc);
            return Ok(groups
                .iter()
                .find(|group| {
                    group_scopes(doc, group, &groups)
                        .into_iter()
                        .any(|scope| mentions(&doc.text_content(scope), search))
                })
                .cloned()
                .map(Control::Choice));
        }

        for (id, control) in candidate_controls(doc, field.kind()) {
            if let Some(text) = nearby_label(doc, id) {
                if mentions(&text, search) {
                    debug!(%field, text = %text, "matched by proximity");
                    return Ok(Some(control));
                }
            }
        }
        Ok(None)
    }
}
