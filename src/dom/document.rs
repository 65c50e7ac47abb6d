use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};

use super::{BoundingBox, DomError, DomEvent, EventKind, NodeId};

const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Attribute carrying an element's on-screen box in page snapshots.
pub const BBOX_ATTR: &str = "data-bbox";

#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
    Other,
}

#[derive(Debug, Clone)]
pub struct ElementData {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// A parsed page: an arena of nodes in document order plus the log of every
/// event dispatched against it.
///
/// Selector queries run against the markup as loaded; state changed later
/// (values, checked flags, ARIA state) is visible through the accessors but
/// not to CSS attribute selectors.
#[derive(Debug, Clone)]
pub struct Document {
    /// The parse the arena was built from, kept for selector matching.
    html: Html,
    nodes: Vec<Node>,
    events: Vec<DomEvent>,
}

impl Document {
    pub fn parse(source: &str) -> Self {
        let html = Html::parse_document(source);
        let mut nodes: Vec<Node> = Vec::new();
        let mut ids = HashMap::new();

        for node in html.tree.root().descendants() {
            let id = NodeId(nodes.len());
            let parent = node.parent().and_then(|p| ids.get(&p.id()).copied());
            let data = match node.value() {
                scraper::Node::Document => NodeData::Document,
                scraper::Node::Element(el) => NodeData::Element(ElementData {
                    tag: el.name().to_ascii_lowercase(),
                    attrs: el
                        .attrs()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                }),
                scraper::Node::Text(text) => NodeData::Text(text.to_string()),
                _ => NodeData::Other,
            };
            nodes.push(Node {
                parent,
                children: Vec::new(),
                data,
            });
            if let Some(parent) = parent {
                nodes[parent.0].children.push(id);
            }
            ids.insert(node.id(), id);
        }

        Self {
            html,
            nodes,
            events: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn body(&self) -> Option<NodeId> {
        self.elements().into_iter().find(|id| self.is_tag(*id, "body"))
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(id.0)?.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id.0)?.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let el = self.element_mut(id).ok_or(DomError::NotAnElement(id))?;
        match el.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => el.attrs.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.attrs.retain(|(k, _)| k != name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Ancestor elements, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.nodes.get(id.0).and_then(|n| n.parent);
        while let Some(parent) = current {
            if self.element(parent).is_some() {
                out.push(parent);
            }
            current = self.nodes[parent.0].parent;
        }
        out
    }

    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.nodes
            .get(id.0)?
            .parent
            .filter(|p| self.element(*p).is_some())
    }

    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id.0)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|c| self.element(*c).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Descendant elements of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.nodes.get(id.0) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            if self.element(next).is_some() {
                out.push(next);
            }
            stack.extend(self.nodes[next.0].children.iter().rev().copied());
        }
        out
    }

    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root())
    }

    /// True when `node` is `ancestor` or sits somewhere beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).contains(&ancestor)
    }

    /// Concatenated text beneath `id`, whitespace collapsed.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut raw = String::new();
        self.collect_text(id, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element(_) | NodeData::Document => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
            NodeData::Other => {}
        }
    }

    /// Text of the node right after `id`, skipping whitespace-only text.
    pub fn next_sibling_text(&self, id: NodeId) -> Option<String> {
        let parent = self.nodes.get(id.0)?.parent?;
        let siblings = &self.nodes[parent.0].children;
        let position = siblings.iter().position(|s| *s == id)?;
        siblings[position + 1..]
            .iter()
            .map(|s| self.text_content(*s))
            .find(|text| !text.is_empty())
    }

    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|id| self.attr(*id, "id") == Some(value))
    }

    /// Elements matching a CSS selector, in document order.
    pub fn select(&self, css: &str) -> Result<Vec<NodeId>, DomError> {
        let selector = Selector::parse(css).map_err(|e| DomError::InvalidSelector {
            selector: css.to_string(),
            reason: e.to_string(),
        })?;

        // The arena was filled in pre-order from this tree, so a node's
        // position in the walk is its arena index.
        Ok(self
            .html
            .tree
            .root()
            .descendants()
            .enumerate()
            .filter(|(_, node)| ElementRef::wrap(*node).is_some_and(|el| selector.matches(&el)))
            .map(|(index, _)| NodeId(index))
            .collect())
    }

    pub fn select_within(&self, scope: NodeId, css: &str) -> Result<Vec<NodeId>, DomError> {
        Ok(self
            .select(css)?
            .into_iter()
            .filter(|id| *id != scope && self.contains(scope, *id))
            .collect())
    }

    /// `id` itself or its nearest ancestor matching `css`.
    pub fn closest(&self, id: NodeId, css: &str) -> Result<Option<NodeId>, DomError> {
        let matches = self.select(css)?;
        Ok(std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|candidate| matches.binary_search(candidate).is_ok()))
    }

    pub fn bounding_box(&self, id: NodeId) -> Option<BoundingBox> {
        self.attr(id, BBOX_ATTR).and_then(BoundingBox::parse)
    }

    pub fn is_form_control(&self, id: NodeId) -> bool {
        matches!(self.tag(id), Some("input" | "select" | "textarea"))
    }

    /// Lowercased `type` of an `<input>`, defaulting to `text`.
    pub fn input_type(&self, id: NodeId) -> Option<String> {
        if !self.is_tag(id, "input") {
            return None;
        }
        Some(
            self.attr(id, "type")
                .map(|t| t.trim().to_ascii_lowercase())
                .unwrap_or_else(|| "text".to_string()),
        )
    }

    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.attr(id, "value")
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        self.set_attr(id, "value", value)
    }

    pub fn is_checked(&self, id: NodeId) -> bool {
        self.attr(id, "checked").is_some()
    }

    /// Checks a radio or checkbox; other radios sharing its `name` are cleared.
    pub fn set_checked(&mut self, id: NodeId) -> Result<(), DomError> {
        if self.input_type(id).as_deref() == Some("radio") {
            if let Some(name) = self.attr(id, "name").map(str::to_string) {
                let peers: Vec<NodeId> = self
                    .elements()
                    .into_iter()
                    .filter(|other| {
                        *other != id
                            && self.input_type(*other).as_deref() == Some("radio")
                            && self.attr(*other, "name") == Some(name.as_str())
                    })
                    .collect();
                for peer in peers {
                    self.remove_attr(peer, "checked");
                }
            }
        }
        self.set_attr(id, "checked", "")
    }

    pub fn options(&self, select: NodeId) -> Vec<NodeId> {
        self.descendants(select)
            .into_iter()
            .filter(|id| self.is_tag(*id, "option"))
            .collect()
    }

    pub fn select_option(&mut self, select: NodeId, option: NodeId) -> Result<(), DomError> {
        for other in self.options(select) {
            if other != option {
                self.remove_attr(other, "selected");
            }
        }
        self.set_attr(option, "selected", "")?;
        let value = self
            .attr(option, "value")
            .map(str::to_string)
            .unwrap_or_else(|| self.text_content(option));
        self.set_value(select, &value)
    }

    pub fn dispatch(&mut self, target: NodeId, kind: EventKind) {
        self.events.push(DomEvent {
            target,
            kind,
            bubbles: kind.bubbles(),
        });
    }

    /// Simulates a primary-button click, including the default actions the
    /// page would see: radios and checkboxes toggle, ARIA options and radios
    /// take selection, and any open popup the click lands outside of closes.
    pub fn click(&mut self, target: NodeId) -> Result<(), DomError> {
        if self.element(target).is_none() {
            return Err(DomError::NotAnElement(target));
        }
        self.dispatch(target, EventKind::MouseDown);
        self.dispatch(target, EventKind::MouseUp);
        self.dispatch(target, EventKind::Click);

        let open: Vec<NodeId> = self
            .elements()
            .into_iter()
            .filter(|id| self.attr(*id, "aria-expanded") == Some("true"))
            .filter(|id| !self.contains(*id, target))
            .collect();
        for id in open {
            self.set_attr(id, "aria-expanded", "false")?;
        }

        let input_type = self.input_type(target);
        let role = self.attr(target, "role").map(str::to_string);
        match (input_type.as_deref(), role.as_deref()) {
            (Some("radio"), _) => {
                self.set_checked(target)?;
                self.dispatch(target, EventKind::Input);
                self.dispatch(target, EventKind::Change);
            }
            (Some("checkbox"), _) => {
                if self.is_checked(target) {
                    self.remove_attr(target, "checked");
                } else {
                    self.set_attr(target, "checked", "")?;
                }
                self.dispatch(target, EventKind::Input);
                self.dispatch(target, EventKind::Change);
            }
            (_, Some("radio")) => {
                let scope = self
                    .ancestors(target)
                    .into_iter()
                    .find(|a| self.attr(*a, "role") == Some("radiogroup"))
                    .or_else(|| self.parent_element(target));
                if let Some(scope) = scope {
                    let peers: Vec<NodeId> = self
                        .descendants(scope)
                        .into_iter()
                        .filter(|p| *p != target && self.attr(*p, "role") == Some("radio"))
                        .collect();
                    for peer in peers {
                        self.set_attr(peer, "aria-checked", "false")?;
                    }
                }
                self.set_attr(target, "aria-checked", "true")?;
            }
            (_, Some("option")) => {
                if let Some(parent) = self.parent_element(target) {
                    for peer in self.child_elements(parent) {
                        if peer != target && self.attr(peer, "role") == Some("option") {
                            self.set_attr(peer, "aria-selected", "false")?;
                        }
                    }
                }
                self.set_attr(target, "aria-selected", "true")?;
            }
            _ => {
                if self.attr(target, "aria-expanded").is_some() {
                    let expanded = self.attr(target, "aria-expanded") == Some("true");
                    let next = if expanded { "false" } else { "true" };
                    self.set_attr(target, "aria-expanded", next)?;
                }
            }
        }
        Ok(())
    }

    pub fn events(&self) -> &[DomEvent] {
        &self.events
    }

    pub fn events_for(&self, target: NodeId) -> Vec<EventKind> {
        self.events
            .iter()
            .filter(|e| e.target == target)
            .map(|e| e.kind)
            .collect()
    }

    /// Serialises the current state of the page, including filled values.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>");
        for child in &self.nodes[self.root().0].children {
            self.write_html(*child, &mut out);
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id.0];
        match &node.data {
            NodeData::Text(text) => out.push_str(&escape(text, false)),
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&escape(value, true));
                        out.push('"');
                    }
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                    return;
                }
                for child in &node.children {
                    self.write_html(*child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
            NodeData::Document => {
                for child in &node.children {
                    self.write_html(*child, out);
                }
            }
            NodeData::Other => {}
        }
    }
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
