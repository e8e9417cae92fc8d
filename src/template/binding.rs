//! Binding layer - the bindings the default processor doesn't understand.
//!
//! [`BindingProcessor`] intercepts four binding forms and hands everything
//! else to its fallback processor:
//!
//! - `ref` - a callable receives the live node, once per distinct callable
//! - `class` - a record projects to its truthy keys, space separated
//! - `style` - a record projects to `kebab-key: value` pairs, `; ` separated
//! - `.name` - a direct property write; components route it through their
//!   property pipeline, plain nodes get a live field

use std::rc::Rc;

use heck::ToKebabCase;

use super::part::{AttributePart, DefaultTemplateProcessor, Part, TemplateProcessor};
use crate::error::Result;
use crate::host::Node;
use crate::types::{Callable, Payload, Value};

/// Space-joined keys whose values are truthy, in key order.
pub fn class_map(classes: &Payload) -> String {
    classes
        .iter()
        .filter(|(_, on)| on.is_truthy())
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `kebab-key: value` pairs joined by `; `.
///
/// Custom properties (`--name`) keep their spelling. Entries whose value has
/// no string form are left out.
pub fn style_map(declarations: &Payload) -> String {
    declarations
        .iter()
        .filter_map(|(property, value)| {
            let value = value.to_display_string()?;
            let property = if property.starts_with("--") {
                property.clone()
            } else {
                property.to_kebab_case()
            };
            Some(format!("{property}: {value}"))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Class & Style
// =============================================================================

/// `class` binding. Records are projected, anything else passes through.
#[derive(Debug)]
pub struct ClassPart {
    attribute: AttributePart,
}

impl ClassPart {
    pub fn new() -> Self {
        Self {
            attribute: AttributePart::new("class"),
        }
    }
}

impl Default for ClassPart {
    fn default() -> Self {
        Self::new()
    }
}

impl Part for ClassPart {
    fn set_value(&mut self, node: &Node, value: Value) -> Result<()> {
        let value = match &value {
            Value::Record(classes) => Value::String(class_map(classes)),
            _ => value,
        };
        self.attribute.set_value(node, value)
    }
}

/// `style` binding. Records are projected, anything else passes through.
#[derive(Debug)]
pub struct StylePart {
    attribute: AttributePart,
}

impl StylePart {
    pub fn new() -> Self {
        Self {
            attribute: AttributePart::new("style"),
        }
    }
}

impl Default for StylePart {
    fn default() -> Self {
        Self::new()
    }
}

impl Part for StylePart {
    fn set_value(&mut self, node: &Node, value: Value) -> Result<()> {
        let value = match &value {
            Value::Record(declarations) => Value::String(style_map(declarations)),
            _ => value,
        };
        self.attribute.set_value(node, value)
    }
}

// =============================================================================
// Reference
// =============================================================================

/// `ref` binding.
///
/// A callable is invoked with the node the first time it is bound; binding the
/// same callable again is a no-op. Non-callables are written as a plain `ref`
/// attribute.
#[derive(Debug, Default)]
pub struct RefPart {
    last: Option<Callable>,
    fallback: Option<AttributePart>,
}

impl RefPart {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Part for RefPart {
    fn set_value(&mut self, node: &Node, value: Value) -> Result<()> {
        let callable = match value {
            Value::Function(callable) => callable,
            other => {
                self.last = None;
                return self
                    .fallback
                    .get_or_insert_with(|| AttributePart::new("ref"))
                    .set_value(node, other);
            }
        };

        if self.last.as_ref().is_some_and(|last| last.ptr_eq(&callable)) {
            return Ok(());
        }
        callable.call(&[Value::Node(node.clone())])?;
        self.last = Some(callable);
        Ok(())
    }
}

// =============================================================================
// Direct Property
// =============================================================================

/// `.name` binding.
///
/// On a component host the write goes through the component's property
/// pipeline, so validation, notification and reflection all apply. On a plain
/// node the value becomes a live field.
#[derive(Debug)]
pub struct DirectPropertyPart {
    name: String,
    committed: Option<Value>,
}

impl DirectPropertyPart {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            committed: None,
        }
    }
}

impl Part for DirectPropertyPart {
    fn set_value(&mut self, node: &Node, value: Value) -> Result<()> {
        if self.committed.as_ref() == Some(&value) {
            return Ok(());
        }
        match node.component() {
            Some(component) => component.set_property(&self.name, value.clone())?,
            None => node.set_field(&self.name, value.clone()),
        }
        // Only recorded once the write succeeded, so a rejected value is retried.
        self.committed = Some(value);
        Ok(())
    }
}

// =============================================================================
// Processor
// =============================================================================

/// Template processor with the `ref`/`class`/`style`/`.name` interceptions.
#[derive(Clone)]
pub struct BindingProcessor {
    fallback: Rc<dyn TemplateProcessor>,
}

impl BindingProcessor {
    /// Intercept on top of [`DefaultTemplateProcessor`].
    pub fn new() -> Self {
        Self::with_fallback(Rc::new(DefaultTemplateProcessor))
    }

    pub fn with_fallback(fallback: Rc<dyn TemplateProcessor>) -> Self {
        Self { fallback }
    }
}

impl Default for BindingProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateProcessor for BindingProcessor {
    fn attribute_part(&self, node: &Node, name: &str) -> Box<dyn Part> {
        match name {
            "ref" => Box::new(RefPart::new()),
            "class" => Box::new(ClassPart::new()),
            "style" => Box::new(StylePart::new()),
            _ => match name.strip_prefix('.') {
                Some(property) => Box::new(DirectPropertyPart::new(property)),
                None => self.fallback.attribute_part(node, name),
            },
        }
    }
}

impl std::fmt::Debug for BindingProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingProcessor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::{Cell, RefCell};

    fn commit(node: &Node, name: &str, value: impl Into<Value>) {
        BindingProcessor::new()
            .attribute_part(node, name)
            .set_value(node, value.into())
            .unwrap();
    }

    #[test]
    fn test_class_projection() {
        let node = Node::element("div");
        commit(&node, "class", Value::record([("a", true), ("b", false), ("c", true)]));
        assert_eq!(node.attribute("class").as_deref(), Some("a c"));
    }

    #[test]
    fn test_class_passthrough() {
        let node = Node::element("div");
        commit(&node, "class", "plain");
        assert_eq!(node.attribute("class").as_deref(), Some("plain"));
    }

    #[test]
    fn test_style_projection() {
        let declarations = Value::record([
            ("backgroundColor", Value::from("red")),
            ("fontSize", Value::from("12px")),
            ("--accent-hue", Value::from(200)),
            ("opacity", Value::Null),
        ]);
        let node = Node::element("div");
        commit(&node, "style", declarations);
        assert_eq!(
            node.attribute("style").as_deref(),
            Some("background-color: red; font-size: 12px; --accent-hue: 200")
        );
    }

    #[test]
    fn test_ref_invoked_once_per_callable() {
        let node = Node::element("canvas");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let callback = Value::function(move |args| {
            seen_clone.borrow_mut().push(args[0].clone());
            Ok(Value::Null)
        });

        let mut part = BindingProcessor::new().attribute_part(&node, "ref");
        part.set_value(&node, callback.clone()).unwrap();
        part.set_value(&node, callback.clone()).unwrap();

        assert_eq!(*seen.borrow(), vec![Value::Node(node.clone())]);
        assert!(!node.has_attribute("ref"));
    }

    #[test]
    fn test_ref_new_callable_is_invoked() {
        let node = Node::element("div");
        let calls = Rc::new(Cell::new(0));
        let mut part = RefPart::new();

        for _ in 0..2 {
            let calls = calls.clone();
            part.set_value(
                &node,
                Value::function(move |_| {
                    calls.set(calls.get() + 1);
                    Ok(Value::Null)
                }),
            )
            .unwrap();
        }
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_ref_non_callable_falls_back() {
        let node = Node::element("div");
        commit(&node, "ref", "anchor");
        assert_eq!(node.attribute("ref").as_deref(), Some("anchor"));
    }

    #[test]
    fn test_direct_property_on_plain_node() {
        let node = Node::element("input");
        let list = Value::List(vec![1.into(), 2.into()]);
        commit(&node, ".items", list.clone());

        assert_eq!(node.field("items"), list);
        assert!(node.attributes().is_empty());
    }

    #[test]
    fn test_other_bindings_fall_through() {
        let node = Node::element("button");
        commit(&node, "?disabled", true);
        commit(&node, "title", "go");
        assert_eq!(node.outer_html(), "<button disabled title=\"go\"></button>");
    }
}
