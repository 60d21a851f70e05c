//! In-memory document used by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use crate::dom::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FakeNode(usize);

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    parent: Option<usize>,
    children: Vec<usize>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    computed: BTreeMap<String, String>,
    classes: Vec<String>,
    overflowing: bool,
    focusable: bool,
}

#[derive(Debug)]
pub struct FakeDocument {
    nodes: RefCell<Vec<NodeData>>,
    active: Cell<Option<usize>>,
    scrollbar: f64,
    html: FakeNode,
    body: FakeNode,
}

impl FakeDocument {
    pub fn new() -> Self {
        Self::with_scrollbar(15.0)
    }

    pub fn with_scrollbar(scrollbar: f64) -> Self {
        let doc = Self {
            nodes: RefCell::new(Vec::new()),
            active: Cell::new(None),
            scrollbar,
            html: FakeNode(0),
            body: FakeNode(1),
        };
        let html = doc.create("html");
        let body = doc.create("body");
        doc.append(&html, &body);
        doc.active.set(Some(body.0));
        doc
    }

    pub fn body_node(&self) -> FakeNode {
        self.body
    }

    pub fn html_node(&self) -> FakeNode {
        self.html
    }

    pub fn create(&self, tag: &str) -> FakeNode {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData {
            tag: tag.to_ascii_uppercase(),
            focusable: true,
            ..NodeData::default()
        });
        FakeNode(nodes.len() - 1)
    }

    pub fn append(&self, parent: &FakeNode, child: &FakeNode) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(old) = nodes[child.0].parent.take() {
            nodes[old].children.retain(|c| *c != child.0);
        }
        nodes[parent.0].children.push(child.0);
        nodes[child.0].parent = Some(parent.0);
    }

    pub fn create_in(&self, parent: &FakeNode, tag: &str) -> FakeNode {
        let node = self.create(tag);
        self.append(parent, &node);
        node
    }

    pub fn set_overflowing(&self, node: &FakeNode, overflowing: bool) {
        self.nodes.borrow_mut()[node.0].overflowing = overflowing;
    }

    pub fn set_computed(&self, node: &FakeNode, property: &str, value: &str) {
        self.nodes.borrow_mut()[node.0]
            .computed
            .insert(property.to_string(), value.to_string());
    }

    pub fn add_class(&self, node: &FakeNode, class: &str) {
        self.nodes.borrow_mut()[node.0].classes.push(class.to_string());
    }

    pub fn set_focusable(&self, node: &FakeNode, focusable: bool) {
        self.nodes.borrow_mut()[node.0].focusable = focusable;
    }

    pub fn is_hidden(&self, node: &FakeNode) -> bool {
        self.attribute(node, "aria-hidden").as_deref() == Some("true")
    }

    pub fn blur(&self) {
        self.active.set(Some(self.body.0));
    }
}

impl Document for FakeDocument {
    type Node = FakeNode;

    fn body(&self) -> Option<FakeNode> {
        Some(self.body)
    }

    fn active_element(&self) -> Option<FakeNode> {
        self.active.get().map(FakeNode)
    }

    fn children(&self, node: &FakeNode) -> Vec<FakeNode> {
        self.nodes.borrow()[node.0]
            .children
            .iter()
            .copied()
            .map(FakeNode)
            .collect()
    }

    fn parent(&self, node: &FakeNode) -> Option<FakeNode> {
        self.nodes.borrow()[node.0].parent.map(FakeNode)
    }

    fn tag_name(&self, node: &FakeNode) -> String {
        self.nodes.borrow()[node.0].tag.clone()
    }

    fn attribute(&self, node: &FakeNode, name: &str) -> Option<String> {
        self.nodes.borrow()[node.0].attributes.get(name).cloned()
    }

    fn set_attribute(&self, node: &FakeNode, name: &str, value: &str) {
        self.nodes.borrow_mut()[node.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, node: &FakeNode, name: &str) {
        self.nodes.borrow_mut()[node.0].attributes.remove(name);
    }

    fn style(&self, node: &FakeNode, property: &str) -> String {
        self.nodes.borrow()[node.0]
            .style
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    fn set_style(&self, node: &FakeNode, property: &str, value: &str) {
        self.nodes.borrow_mut()[node.0]
            .style
            .insert(property.to_string(), value.to_string());
    }

    fn remove_style(&self, node: &FakeNode, property: &str) {
        self.nodes.borrow_mut()[node.0].style.remove(property);
    }

    fn computed_style(&self, node: &FakeNode, property: &str) -> String {
        let nodes = self.nodes.borrow();
        let data = &nodes[node.0];
        data.style
            .get(property)
            .or_else(|| data.computed.get(property))
            .cloned()
            .unwrap_or_default()
    }

    fn contains(&self, ancestor: &FakeNode, node: &FakeNode) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = Some(node.0);
        while let Some(idx) = current {
            if idx == ancestor.0 {
                return true;
            }
            current = nodes[idx].parent;
        }
        false
    }

    fn focus(&self, node: &FakeNode) -> bool {
        if !self.nodes.borrow()[node.0].focusable {
            return false;
        }
        self.active.set(Some(node.0));
        true
    }

    fn is_overflowing(&self, container: &FakeNode) -> bool {
        self.nodes.borrow()[container.0].overflowing
    }

    fn scrollbar_size(&self) -> f64 {
        self.scrollbar
    }

    fn elements_with_class(&self, class: &str) -> Vec<FakeNode> {
        self.nodes
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, data)| data.classes.iter().any(|c| c == class))
            .map(|(idx, _)| FakeNode(idx))
            .collect()
    }
}
