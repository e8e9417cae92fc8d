//! Node - a minimal DOM-like host tree.
//!
//! Nodes are cheap `Rc` handles. A node is *connected* when it descends from a
//! document (through shadow roots too). Connecting a node that carries a
//! component attaches the component; disconnecting it detaches it.
//!
//! Attribute names are lower-cased on write, the way an HTML document does.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::style::StyleSheet;
use crate::component::Component;
use crate::error::Result;
use crate::subscribers::{Listeners, SubscriberFn, Subscription};
use crate::template::Part;
use crate::types::Value;

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(String),
    Text,
    ShadowRoot,
}

struct NodeInner {
    kind: NodeKind,
    attributes: RefCell<IndexMap<String, String>>,
    fields: RefCell<IndexMap<String, Value>>,
    data: RefCell<String>,
    children: RefCell<Vec<Node>>,
    parent: RefCell<Weak<NodeInner>>,
    host: RefCell<Weak<NodeInner>>,
    shadow_root: RefCell<Option<Node>>,
    connected: Cell<bool>,
    component: RefCell<Option<Component>>,
    parts: RefCell<HashMap<String, Box<dyn Part>>>,
    events: RefCell<HashMap<String, Listeners<SubscriberFn>>>,
    style_sheets: RefCell<Vec<StyleSheet>>,
}

/// Handle to a host tree node.
#[derive(Clone)]
pub struct Node(Rc<NodeInner>);

/// Non-owning node handle.
#[derive(Clone, Default)]
pub struct WeakNode(Weak<NodeInner>);

impl WeakNode {
    pub fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(Node)
    }
}

impl fmt::Debug for WeakNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(node) => write!(f, "WeakNode({:?})", node.tag_name()),
            None => f.write_str("WeakNode(dropped)"),
        }
    }
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Node(Rc::new(NodeInner {
            kind,
            attributes: RefCell::new(IndexMap::new()),
            fields: RefCell::new(IndexMap::new()),
            data: RefCell::new(String::new()),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            host: RefCell::new(Weak::new()),
            shadow_root: RefCell::new(None),
            connected: Cell::new(false),
            component: RefCell::new(None),
            parts: RefCell::new(HashMap::new()),
            events: RefCell::new(HashMap::new()),
            style_sheets: RefCell::new(Vec::new()),
        }))
    }

    /// A connected document root.
    pub fn document() -> Self {
        let node = Self::new(NodeKind::Document);
        node.0.connected.set(true);
        node
    }

    /// A detached plain element.
    pub fn element(tag: &str) -> Self {
        Self::new(NodeKind::Element(tag.to_ascii_lowercase()))
    }

    /// A detached text node.
    pub fn text(data: impl Into<String>) -> Self {
        let node = Self::new(NodeKind::Text);
        *node.0.data.borrow_mut() = data.into();
        node
    }

    // =========================================================================
    // Identity
    // =========================================================================

    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    pub fn tag_name(&self) -> &str {
        match &self.0.kind {
            NodeKind::Document => "#document",
            NodeKind::Element(tag) => tag,
            NodeKind::Text => "#text",
            NodeKind::ShadowRoot => "#shadow-root",
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.kind, NodeKind::Element(_))
    }

    pub fn is_text(&self) -> bool {
        self.0.kind == NodeKind::Text
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Rc::downgrade(&self.0))
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.attributes.borrow().get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.0.attributes.borrow().contains_key(&name.to_ascii_lowercase())
    }

    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        self.0
            .attributes
            .borrow_mut()
            .insert(name.to_ascii_lowercase(), value.into());
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_attribute(&self, name: &str) -> bool {
        self.0
            .attributes
            .borrow_mut()
            .shift_remove(&name.to_ascii_lowercase())
            .is_some()
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.0
            .attributes
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    // =========================================================================
    // Live fields
    // =========================================================================

    /// A live (non-attribute) field, `Value::Null` if never set.
    pub fn field(&self, name: &str) -> Value {
        self.0.fields.borrow().get(name).cloned().unwrap_or_default()
    }

    pub fn set_field(&self, name: &str, value: impl Into<Value>) {
        self.0.fields.borrow_mut().insert(name.to_string(), value.into());
    }

    // =========================================================================
    // Text
    // =========================================================================

    /// Character data of a text node.
    pub fn data(&self) -> String {
        self.0.data.borrow().clone()
    }

    pub fn set_data(&self, data: impl Into<String>) {
        *self.0.data.borrow_mut() = data.into();
    }

    /// Concatenated text of this node and its (light) descendants.
    pub fn text_content(&self) -> String {
        if self.is_text() {
            return self.data();
        }
        self.children().iter().map(Node::text_content).collect()
    }

    // =========================================================================
    // Tree
    // =========================================================================

    pub fn children(&self) -> Vec<Node> {
        self.0.children.borrow().clone()
    }

    pub fn child(&self, index: usize) -> Option<Node> {
        self.0.children.borrow().get(index).cloned()
    }

    pub fn child_count(&self) -> usize {
        self.0.children.borrow().len()
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.parent.borrow().upgrade().map(Node)
    }

    /// For a shadow root, the element it is attached to.
    pub fn host(&self) -> Option<Node> {
        self.0.host.borrow().upgrade().map(Node)
    }

    pub fn is_connected(&self) -> bool {
        self.0.connected.get()
    }

    /// Append `child`, moving it out of any previous parent.
    ///
    /// Attaches components in the child's subtree if this node is connected;
    /// their attach failures are returned.
    pub fn append_child(&self, child: &Node) -> Result<()> {
        let index = self.child_count();
        self.insert_child(index, child)
    }

    /// Insert `child` at `index` (clamped to the child count).
    pub fn insert_child(&self, index: usize, child: &Node) -> Result<()> {
        if let Some(previous) = child.parent() {
            previous.remove_child(child)?;
        }

        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        {
            let mut children = self.0.children.borrow_mut();
            let index = index.min(children.len());
            children.insert(index, child.clone());
        }

        if self.is_connected() {
            child.connect()?;
        }
        Ok(())
    }

    /// Swap the child at `index` for `replacement`.
    pub fn replace_child(&self, index: usize, replacement: &Node) -> Result<()> {
        if let Some(old) = self.child(index) {
            self.remove_child(&old)?;
        }
        self.insert_child(index, replacement)
    }

    /// Remove `child`. Returns `Ok(false)` if it was not a child of this node.
    pub fn remove_child(&self, child: &Node) -> Result<bool> {
        let removed = {
            let mut children = self.0.children.borrow_mut();
            match children.iter().position(|c| c.ptr_eq(child)) {
                Some(position) => {
                    children.remove(position);
                    true
                }
                None => false,
            }
        };
        if !removed {
            return Ok(false);
        }

        *child.0.parent.borrow_mut() = Weak::new();
        if child.is_connected() {
            child.disconnect()?;
        }
        Ok(true)
    }

    /// Remove every child past the first `len`.
    pub fn truncate_children(&self, len: usize) -> Result<()> {
        while self.child_count() > len {
            if let Some(last) = self.child(self.child_count() - 1) {
                self.remove_child(&last)?;
            }
        }
        Ok(())
    }

    fn connect(&self) -> Result<()> {
        if self.0.connected.replace(true) {
            return Ok(());
        }
        if let Some(component) = self.component() {
            component.attach()?;
        }
        for child in self.children() {
            child.connect()?;
        }
        if let Some(root) = self.shadow_root() {
            root.connect()?;
        }
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        if !self.0.connected.replace(false) {
            return Ok(());
        }
        if let Some(component) = self.component() {
            component.detach()?;
        }
        for child in self.children() {
            child.disconnect()?;
        }
        if let Some(root) = self.shadow_root() {
            root.disconnect()?;
        }
        Ok(())
    }

    // =========================================================================
    // Shadow Root
    // =========================================================================

    /// Attach (or return the existing) shadow root.
    pub fn attach_shadow(&self) -> Node {
        if let Some(root) = self.shadow_root() {
            return root;
        }
        let root = Node::new(NodeKind::ShadowRoot);
        *root.0.host.borrow_mut() = Rc::downgrade(&self.0);
        root.0.connected.set(self.is_connected());
        *self.0.shadow_root.borrow_mut() = Some(root.clone());
        root
    }

    pub fn shadow_root(&self) -> Option<Node> {
        self.0.shadow_root.borrow().clone()
    }

    // =========================================================================
    // Style Sheets
    // =========================================================================

    /// Append style sheets after the ones already adopted.
    pub fn adopt_style_sheets(&self, sheets: impl IntoIterator<Item = StyleSheet>) {
        self.0.style_sheets.borrow_mut().extend(sheets);
    }

    pub fn adopted_style_sheets(&self) -> Vec<StyleSheet> {
        self.0.style_sheets.borrow().clone()
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub fn add_event_listener(
        &self,
        event: &str,
        listener: impl Fn(&[Value]) -> Result<()> + 'static,
    ) -> Subscription {
        let list = self
            .0
            .events
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .clone();
        list.add(Box::new(listener), false)
    }

    /// Run every listener for `event`. The first failure stops dispatch.
    pub fn dispatch_event(&self, event: &str, args: &[Value]) -> Result<()> {
        let list = self.0.events.borrow().get(event).cloned();
        let Some(list) = list else { return Ok(()) };
        list.run(|callback| callback(args))
    }

    // =========================================================================
    // Component & Parts
    // =========================================================================

    /// The component this node hosts, if it was created from a definition.
    pub fn component(&self) -> Option<Component> {
        self.0.component.borrow().clone()
    }

    pub(crate) fn set_component(&self, component: Component) {
        *self.0.component.borrow_mut() = Some(component);
    }

    pub(crate) fn take_part(&self, name: &str) -> Option<Box<dyn Part>> {
        self.0.parts.borrow_mut().remove(name)
    }

    pub(crate) fn store_part(&self, name: &str, part: Box<dyn Part>) {
        self.0.parts.borrow_mut().insert(name.to_string(), part);
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Markup of the light children.
    pub fn inner_html(&self) -> String {
        self.children().iter().map(Node::outer_html).collect()
    }

    pub fn outer_html(&self) -> String {
        match &self.0.kind {
            NodeKind::Text => self.data(),
            NodeKind::Element(tag) => {
                let mut out = format!("<{tag}");
                for (name, value) in self.attributes() {
                    if value.is_empty() {
                        out.push_str(&format!(" {name}"));
                    } else {
                        out.push_str(&format!(" {name}=\"{value}\""));
                    }
                }
                out.push('>');
                out.push_str(&self.inner_html());
                out.push_str(&format!("</{tag}>"));
                out
            }
            NodeKind::Document | NodeKind::ShadowRoot => self.inner_html(),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.0.kind)
            .field("attributes", &*self.0.attributes.borrow())
            .field("children", &self.child_count())
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_attributes_are_lowercased() {
        let node = Node::element("DIV");
        node.set_attribute("timerInterval", "5");

        assert_eq!(node.tag_name(), "div");
        assert_eq!(node.attribute("TIMERINTERVAL").as_deref(), Some("5"));
        assert_eq!(node.attributes(), vec![("timerinterval".to_string(), "5".to_string())]);
        assert!(node.remove_attribute("timerinterval"));
        assert!(!node.has_attribute("timerinterval"));
    }

    #[test]
    fn test_connection_propagates() {
        let document = Node::document();
        let outer = Node::element("div");
        let inner = Node::element("span");
        outer.append_child(&inner).unwrap();

        assert!(!inner.is_connected());
        document.append_child(&outer).unwrap();
        assert!(outer.is_connected());
        assert!(inner.is_connected());

        let shadow = outer.attach_shadow();
        assert!(shadow.is_connected());
        assert!(shadow.host().is_some_and(|h| h.ptr_eq(&outer)));

        document.remove_child(&outer).unwrap();
        assert!(!inner.is_connected());
        assert!(!shadow.is_connected());
        assert!(outer.parent().is_none());
    }

    #[test]
    fn test_append_moves_between_parents() {
        let a = Node::element("a");
        let b = Node::element("b");
        let child = Node::text("x");

        a.append_child(&child).unwrap();
        b.append_child(&child).unwrap();

        assert_eq!(a.child_count(), 0);
        assert_eq!(b.child_count(), 1);
        assert!(child.parent().is_some_and(|p| p.ptr_eq(&b)));
    }

    #[test]
    fn test_replace_and_truncate() {
        let parent = Node::element("ul");
        for n in 0..3 {
            let li = Node::element("li");
            li.append_child(&Node::text(n.to_string())).unwrap();
            parent.append_child(&li).unwrap();
        }

        parent.replace_child(1, &Node::text("middle")).unwrap();
        assert_eq!(parent.text_content(), "0middle2");

        parent.truncate_children(1).unwrap();
        assert_eq!(parent.outer_html(), "<ul><li>0</li></ul>");
    }

    #[test]
    fn test_events() {
        let node = Node::element("button");
        let clicks = Rc::new(Cell::new(0));
        let clicks_clone = clicks.clone();

        let sub = node.add_event_listener("click", move |_| {
            clicks_clone.set(clicks_clone.get() + 1);
            Ok(())
        });

        node.dispatch_event("click", &[]).unwrap();
        node.dispatch_event("keydown", &[]).unwrap();
        sub.unsubscribe();
        node.dispatch_event("click", &[]).unwrap();

        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_boolean_attribute_serialization() {
        let node = Node::element("input");
        node.set_attribute("disabled", "");
        node.set_attribute("value", "x");
        assert_eq!(node.outer_html(), "<input disabled value=\"x\"></input>");
    }
}
