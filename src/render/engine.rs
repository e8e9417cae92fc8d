//! Positional patching engine.
//!
//! The DomEngine patches a root's children to match a description, reusing
//! nodes in place wherever the shape is unchanged.
//!
//! # Algorithm
//!
//! For each top-level item of the description, at the same child index:
//! 1. Text: reuse an existing text node (rewriting its data only if it
//!    differs), otherwise create one and put it in that slot
//! 2. Element: reuse an existing element with the same tag, otherwise create
//!    one through the [`ElementFactory`] and write its static attributes
//! 3. Commit every binding through the part stored on the node for that
//!    binding name, creating it from the [`TemplateProcessor`] on first use
//! 4. Patch the element's children recursively
//! 5. New nodes are inserted only after they are fully built, so a component
//!    host is attached with its attributes and bindings already in place
//!
//! Children past the end of the description are removed.

use std::rc::Rc;

use tracing::trace;

use super::{ElementFactory, PlainElements, RenderEngine};
use crate::error::Result;
use crate::host::Node;
use crate::template::{BindingProcessor, Element, Html, TemplateProcessor};

/// Reference rendering engine over the host tree.
#[derive(Clone)]
pub struct DomEngine {
    processor: Rc<dyn TemplateProcessor>,
    factory: Rc<dyn ElementFactory>,
}

impl DomEngine {
    /// Engine with the binding layer and plain element creation.
    pub fn new() -> Self {
        Self {
            processor: Rc::new(BindingProcessor::new()),
            factory: Rc::new(PlainElements),
        }
    }

    pub fn with_processor(mut self, processor: Rc<dyn TemplateProcessor>) -> Self {
        self.processor = processor;
        self
    }

    pub fn with_factory(mut self, factory: Rc<dyn ElementFactory>) -> Self {
        self.factory = factory;
        self
    }

    fn patch_children<'a>(&self, parent: &Node, items: impl IntoIterator<Item = &'a Html>) -> Result<()> {
        let mut index = 0;
        for item in items {
            match item {
                Html::Text(content) => self.patch_text(parent, index, content)?,
                Html::Element(element) => self.patch_element(parent, index, element)?,
                // Flattened away by the caller.
                Html::Empty | Html::Fragment(_) => continue,
            }
            index += 1;
        }
        parent.truncate_children(index)
    }

    fn patch_text(&self, parent: &Node, index: usize, content: &str) -> Result<()> {
        let existing = parent.child(index);
        if let Some(node) = existing.as_ref().filter(|n| n.is_text()) {
            if node.data() != content {
                node.set_data(content);
            }
            return Ok(());
        }
        trace!(index, "create text");
        place(parent, index, &Node::text(content), existing.is_some())
    }

    fn patch_element(&self, parent: &Node, index: usize, element: &Element) -> Result<()> {
        let existing = parent.child(index);
        if let Some(node) = existing
            .as_ref()
            .filter(|n| n.is_element() && n.tag_name() == element.tag())
        {
            self.commit_bindings(node, element)?;
            return self.patch_children(node, flat_children(element));
        }

        trace!(index, tag = element.tag(), "create element");
        let node = self.factory.create_element(element.tag())?;
        for (name, value) in element.attributes() {
            node.set_attribute(name, value.as_str());
        }
        self.commit_bindings(&node, element)?;
        self.patch_children(&node, flat_children(element))?;
        place(parent, index, &node, existing.is_some())
    }

    fn commit_bindings(&self, node: &Node, element: &Element) -> Result<()> {
        for (name, value) in element.bindings() {
            let mut part = node
                .take_part(name)
                .unwrap_or_else(|| self.processor.attribute_part(node, name));
            let committed = part.set_value(node, value.clone());
            node.store_part(name, part);
            committed?;
        }
        Ok(())
    }
}

impl Default for DomEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderEngine for DomEngine {
    fn render(&self, description: &Html, root: &Node) -> Result<()> {
        trace!(root = root.tag_name(), "patch");
        self.patch_children(root, description.flatten())
    }
}

impl std::fmt::Debug for DomEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomEngine").finish_non_exhaustive()
    }
}

fn flat_children(element: &Element) -> Vec<&Html> {
    element.children().iter().flat_map(Html::flatten).collect()
}

fn place(parent: &Node, index: usize, node: &Node, occupied: bool) -> Result<()> {
    if occupied {
        parent.replace_child(index, node)
    } else {
        parent.append_child(node)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{element, fragment, text};
    use crate::types::Value;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[test]
    fn test_render_tree() {
        let root = Node::element("main");
        let view = element("ul").attr("id", "list").children_from(
            ["a", "b"].map(|s| element("li").child(s)),
        );

        DomEngine::new().render(&view.into(), &root).unwrap();
        assert_eq!(root.inner_html(), "<ul id=\"list\"><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_nodes_are_reused() {
        let engine = DomEngine::new();
        let root = Node::element("main");

        engine.render(&element("p").child("one").into(), &root).unwrap();
        let paragraph = root.child(0).unwrap();
        let label = paragraph.child(0).unwrap();

        engine.render(&element("p").child("two").into(), &root).unwrap();
        assert!(root.child(0).unwrap().ptr_eq(&paragraph));
        assert!(paragraph.child(0).unwrap().ptr_eq(&label));
        assert_eq!(label.data(), "two");
    }

    #[test]
    fn test_tag_change_replaces() {
        let engine = DomEngine::new();
        let root = Node::element("main");

        engine.render(&fragment([element("p"), element("span")]), &root).unwrap();
        let span = root.child(1).unwrap();
        engine.render(&fragment([element("div"), element("span")]), &root).unwrap();

        assert_eq!(root.inner_html(), "<div></div><span></span>");
        assert!(root.child(1).unwrap().ptr_eq(&span));
    }

    #[test]
    fn test_extra_children_removed() {
        let engine = DomEngine::new();
        let root = Node::element("main");

        engine.render(&fragment([text("a"), text("b"), text("c")]), &root).unwrap();
        engine.render(&fragment([text("a"), Html::Empty]), &root).unwrap();
        assert_eq!(root.child_count(), 1);
    }

    #[test]
    fn test_static_attributes_written_once() {
        let engine = DomEngine::new();
        let root = Node::element("main");
        let view = || element("div").attr("title", "fixed");

        engine.render(&view().into(), &root).unwrap();
        root.child(0).unwrap().set_attribute("title", "edited");
        engine.render(&view().into(), &root).unwrap();

        assert_eq!(root.child(0).unwrap().attribute("title").as_deref(), Some("edited"));
    }

    #[test]
    fn test_parts_persist_across_renders() {
        let engine = DomEngine::new();
        let root = Node::element("main");
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let reference = Value::function(move |_| {
            calls_clone.set(calls_clone.get() + 1);
            Ok(Value::Null)
        });

        for active in [true, false] {
            let view = element("div")
                .bind("ref", reference.clone())
                .bind("class", Value::record([("active", active)]));
            engine.render(&view.into(), &root).unwrap();
        }

        assert_eq!(calls.get(), 1);
        assert_eq!(root.child(0).unwrap().attribute("class").as_deref(), Some(""));
    }
}
