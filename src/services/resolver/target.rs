use crate::dom::{Document, NodeId};
use crate::models::{FieldId, FieldKind};

/// Furthest a proximity label may sit from its control, after weighting.
pub const MAX_LABEL_DISTANCE: f64 = 200.0;

/// Ancestors above a choice group's own container that may still hold its
/// question text.
const GROUP_LABEL_DEPTH: usize = 3;

const NON_TEXT_INPUTS: [&str; 9] = [
    "radio", "checkbox", "hidden", "submit", "button", "reset", "image", "file", "range",
];

/// A located control, resolved fresh for every fill.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTarget {
    pub field: FieldId,
    pub control: Control,
    pub strategy: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Input(NodeId),
    NativeSelect(NodeId),
    Combobox {
        control: NodeId,
        /// Value the widget displays right now, if it shows one.
        current: Option<String>,
        /// Where the rendered options appear once the control opens.
        option_selector: String,
    },
    Choice(ChoiceGroup),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceGroup {
    pub container: NodeId,
    pub options: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceOption {
    pub node: NodeId,
    pub label: String,
    pub value: Option<String>,
}

pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn alphanumeric(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

pub fn mentions(text: &str, search: &str) -> bool {
    normalize(text).contains(search)
}

fn is_text_input(doc: &Document, id: NodeId) -> bool {
    match doc.input_type(id) {
        Some(kind) => !NON_TEXT_INPUTS.contains(&kind.as_str()),
        None => doc.is_tag(id, "textarea"),
    }
}

fn is_combobox(doc: &Document, id: NodeId) -> bool {
    doc.attr(id, "role") == Some("combobox")
}

/// Wraps `id` as the control for a field of `kind`, if it is the right sort
/// of element.
pub fn as_control(doc: &Document, id: NodeId, kind: FieldKind) -> Option<Control> {
    match kind {
        FieldKind::Text | FieldKind::DatePicker if is_text_input(doc, id) => {
            Some(Control::Input(id))
        }
        FieldKind::Dropdown if doc.is_tag(id, "select") => Some(Control::NativeSelect(id)),
        FieldKind::Dropdown if is_combobox(doc, id) => Some(Control::Combobox {
            control: id,
            current: doc
                .value(id)
                .map(str::to_string)
                .filter(|v| !v.trim().is_empty()),
            option_selector: "[role='option']".to_string(),
        }),
        _ => None,
    }
}

/// Every element on the page that could serve as a control of `kind`.
pub fn candidate_controls(doc: &Document, kind: FieldKind) -> Vec<(NodeId, Control)> {
    doc.elements()
        .into_iter()
        .filter_map(|id| as_control(doc, id, kind).map(|control| (id, control)))
        .collect()
}

fn is_label_like(doc: &Document, id: NodeId) -> bool {
    doc.is_tag(id, "label") || doc.has_class(id, "label") || doc.has_class(id, "field-label")
}

/// Label text tied to a control through markup alone: `<label for>`, ARIA
/// naming, or a wrapping `<label>`.
pub fn associated_label(doc: &Document, control: NodeId) -> Option<String> {
    if let Some(id) = doc.attr(control, "id") {
        let explicit = doc
            .elements()
            .into_iter()
            .find(|l| doc.is_tag(*l, "label") && doc.attr(*l, "for") == Some(id));
        if let Some(label) = explicit {
            return Some(doc.text_content(label));
        }
    }

    if let Some(label) = doc.attr(control, "aria-label") {
        return Some(label.to_string());
    }

    if let Some(ids) = doc.attr(control, "aria-labelledby") {
        let text: Vec<String> = ids
            .split_whitespace()
            .filter_map(|id| doc.element_by_id(id))
            .map(|l| doc.text_content(l))
            .collect();
        if !text.is_empty() {
            return Some(text.join(" "));
        }
    }

    doc.ancestors(control)
        .into_iter()
        .take_while(|a| !doc.is_tag(*a, "body"))
        .find(|a| doc.is_tag(*a, "label"))
        .map(|label| doc.text_content(label))
}

/// A label-like element (`label`, `.label`, `.field-label`) beside the
/// control or beside one of its ancestors. The walk stops at the first
/// ancestor that also holds another form control.
pub fn sibling_label(doc: &Document, control: NodeId) -> Option<String> {
    let mut branch = control;
    for ancestor in doc.ancestors(control) {
        if doc.is_tag(ancestor, "body") || holds_other_control(doc, ancestor, control) {
            break;
        }
        let sibling = doc
            .child_elements(ancestor)
            .into_iter()
            .find(|s| *s != branch && is_label_like(doc, *s));
        if let Some(sibling) = sibling {
            return Some(doc.text_content(sibling));
        }
        branch = ancestor;
    }
    None
}

/// The text an operator would read as the control's label: markup
/// association first, then label-like siblings, then on-screen proximity.
pub fn nearby_label(doc: &Document, control: NodeId) -> Option<String> {
    associated_label(doc, control)
        .or_else(|| sibling_label(doc, control))
        .or_else(|| nearest_text(doc, control))
}

fn holds_other_control(doc: &Document, scope: NodeId, control: NodeId) -> bool {
    doc.descendants(scope)
        .into_iter()
        .any(|d| d != control && doc.is_form_control(d))
}

fn holds_form_control(doc: &Document, id: NodeId) -> bool {
    doc.descendants(id)
        .into_iter()
        .any(|d| doc.is_form_control(d))
}

/// Text of the closest text-bearing element on screen, within
/// [`MAX_LABEL_DISTANCE`] of `control`.
pub fn nearest_text(doc: &Document, control: NodeId) -> Option<String> {
    let anchor = doc.bounding_box(control)?;

    doc.elements()
        .into_iter()
        .filter(|id| matches!(doc.tag(*id), Some("label" | "div" | "span" | "p" | "legend")))
        .filter(|id| !doc.contains(*id, control) && !holds_form_control(doc, *id))
        .filter_map(|id| {
            let text = doc.text_content(id);
            if text.is_empty() {
                return None;
            }
            let distance = anchor.label_distance(&doc.bounding_box(id)?);
            (distance < MAX_LABEL_DISTANCE).then_some((distance, text))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, text)| text)
}

fn option_label(doc: &Document, option: NodeId) -> String {
    if let Some(id) = doc.attr(option, "id") {
        let explicit = doc
            .elements()
            .into_iter()
            .find(|l| doc.is_tag(*l, "label") && doc.attr(*l, "for") == Some(id));
        if let Some(label) = explicit {
            return doc.text_content(label);
        }
    }
    if let Some(label) = doc.ancestors(option).into_iter().find(|a| doc.is_tag(*a, "label")) {
        return doc.text_content(label);
    }
    if let Some(label) = doc.attr(option, "aria-label") {
        return label.to_string();
    }
    if doc.input_type(option).is_some() {
        return doc.next_sibling_text(option).unwrap_or_default();
    }
    doc.text_content(option)
}

fn common_ancestor(doc: &Document, nodes: &[NodeId]) -> Option<NodeId> {
    let (first, rest) = nodes.split_first()?;
    doc.ancestors(*first)
        .into_iter()
        .find(|a| rest.iter().all(|n| doc.contains(*a, *n)))
}

/// Radio groups on the page: native radios grouped by `name`, and ARIA
/// radios grouped by their `radiogroup` (or, failing that, their parent).
pub fn choice_groups(doc: &Document) -> Vec<ChoiceGroup> {
    let mut native: Vec<(String, Vec<NodeId>)> = Vec::new();
    let mut aria: Vec<(NodeId, Vec<NodeId>)> = Vec::new();

    for id in doc.elements() {
        if doc.input_type(id).as_deref() == Some("radio") {
            let name = doc.attr(id, "name").unwrap_or_default().to_string();
            match native.iter_mut().find(|(n, _)| *n == name) {
                Some((_, members)) => members.push(id),
                None => native.push((name, vec![id])),
            }
        } else if doc.attr(id, "role") == Some("radio") {
            let container = doc
                .ancestors(id)
                .into_iter()
                .find(|a| doc.attr(*a, "role") == Some("radiogroup"))
                .or_else(|| doc.parent_element(id));
            let Some(container) = container else {
                continue;
            };
            match aria.iter_mut().find(|(c, _)| *c == container) {
                Some((_, members)) => members.push(id),
                None => aria.push((container, vec![id])),
            }
        }
    }

    let native = native.into_iter().filter_map(|(_, members)| {
        let container = if members.len() == 1 {
            doc.parent_element(members[0])
        } else {
            common_ancestor(doc, &members)
        }?;
        Some((container, members))
    });

    native
        .chain(aria)
        .map(|(container, members)| ChoiceGroup {
            container,
            options: members
                .into_iter()
                .map(|node| ChoiceOption {
                    node,
                    label: option_label(doc, node),
                    value: doc.attr(node, "value").map(str::to_string),
                })
                .collect(),
        })
        .collect()
}

/// The group's container and the few ancestors above it that hold no other
/// group, i.e. the elements whose text can label this group.
pub fn group_scopes(doc: &Document, group: &ChoiceGroup, all: &[ChoiceGroup]) -> Vec<NodeId> {
    let foreign: Vec<NodeId> = all
        .iter()
        .filter(|g| g.container != group.container)
        .flat_map(|g| g.options.iter().map(|o| o.node))
        .collect();

    std::iter::once(group.container)
        .chain(doc.ancestors(group.container))
        .take(GROUP_LABEL_DEPTH + 1)
        .take_while(|scope| !foreign.iter().any(|n| doc.contains(*scope, *n)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_associated_label_routes() {
        let doc = Document::parse(
            r#"<body>
              <label for="a">Start time</label><input id="a">
              <label>Finish time <input id="b"></label>
              <input id="c" aria-label="DJ Total hours">
              <span id="cap">Venue (room)</span><input id="d" aria-labelledby="cap">
              <div><div class="field-label">Customer contact phone</div><div><input id="e"></div></div>
            </body>"#,
        );
        let label = |id: &str| associated_label(&doc, doc.element_by_id(id).unwrap());
        assert_eq!(label("a").as_deref(), Some("Start time"));
        assert_eq!(label("b").as_deref(), Some("Finish time"));
        assert_eq!(label("c").as_deref(), Some("DJ Total hours"));
        assert_eq!(label("d").as_deref(), Some("Venue (room)"));
        assert_eq!(label("e"), None);
    }

    #[test]
    fn test_sibling_label_stops_at_shared_container() {
        let doc = Document::parse(
            r#"<body><form>
              <label>Account point of contact</label>
              <div><div class="field-label">Customer contact phone</div><div><input id="e"></div></div>
              <div><input id="f"></div>
            </form></body>"#,
        );
        let e = doc.element_by_id("e").unwrap();
        let f = doc.element_by_id("f").unwrap();
        assert_eq!(sibling_label(&doc, e).as_deref(), Some("Customer contact phone"));
        // the form-level label belongs to no single control
        assert_eq!(sibling_label(&doc, f), None);
        assert_eq!(nearby_label(&doc, e).as_deref(), Some("Customer contact phone"));
    }

    #[test]
    fn test_nearest_text_prefers_same_row() {
        let doc = Document::parse(
            r#"<body>
              <span data-bbox="0,100,90,20">Start time</span>
              <span data-bbox="100,50,90,20">Event date</span>
              <input id="t" data-bbox="100,100,150,20">
              <span data-bbox="600,100,90,20">Far away</span>
            </body>"#,
        );
        let input = doc.element_by_id("t").unwrap();
        // 130px to the left beats 50px above, which weighs in at over 150
        assert_eq!(nearest_text(&doc, input).as_deref(), Some("Start time"));
    }

    #[test]
    fn test_nearest_text_respects_radius() {
        let doc = Document::parse(
            r#"<body>
              <span data-bbox="0,0,50,20">Start time</span>
              <input id="t" data-bbox="0,100,150,20">
            </body>"#,
        );
        let input = doc.element_by_id("t").unwrap();
        assert_eq!(nearest_text(&doc, input), None);
    }

    #[test]
    fn test_choice_groups_native_and_aria() {
        let doc = Document::parse(
            r#"<body>
              <div id="q1"><p>Is it a SATURDAY booking?</p>
                <div id="opts"><input type="radio" name="sat" value="Yes" id="y"><label for="y">Yes</label>
                <input type="radio" name="sat" value="No" id="n"><label for="n">No</label></div>
              </div>
              <div role="radiogroup" id="q2">
                <div role="radio">Y</div><div role="radio">N</div>
              </div>
            </body>"#,
        );
        let groups = choice_groups(&doc);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].container, doc.element_by_id("opts").unwrap());
        let labels: Vec<&str> = groups[0].options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Yes", "No"]);
        assert_eq!(groups[1].container, doc.element_by_id("q2").unwrap());
        let labels: Vec<&str> = groups[1].options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Y", "N"]);

        let scopes = group_scopes(&doc, &groups[0], &groups);
        assert!(scopes.contains(&doc.element_by_id("q1").unwrap()));
        assert!(!scopes.contains(&doc.body().unwrap()));
    }

    #[test]
    fn test_candidate_controls_by_kind() {
        let doc = Document::parse(
            r#"<body><input id="t"><input type="radio" name="r"><textarea id="x"></textarea>
               <select id="s"></select><div role="combobox" id="c"></div></body>"#,
        );
        assert_eq!(candidate_controls(&doc, FieldKind::Text).len(), 2);
        let dropdowns = candidate_controls(&doc, FieldKind::Dropdown);
        assert_eq!(dropdowns.len(), 2);
        assert!(matches!(dropdowns[0].1, Control::NativeSelect(_)));
        assert!(matches!(dropdowns[1].1, Control::Combobox { .. }));
        assert!(candidate_controls(&doc, FieldKind::Choice).is_empty());
    }

    #[test]
    fn test_normalize_helpers() {
        assert_eq!(normalize("  Venue   (Room) "), "venue (room)");
        assert_eq!(alphanumeric("Start time"), "starttime");
        assert!(mentions("Is it a SATURDAY\n booking?", "is it a saturday booking"));
    }
}
