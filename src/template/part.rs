//! Parts - the commit points for dynamic bindings.
//!
//! The rendering engine asks a [`TemplateProcessor`] for one [`Part`] per
//! (node, binding name) the first time it meets the binding, then keeps that
//! part on the node and feeds it every later value. Parts compare against the
//! last value they committed, so an unchanged binding touches nothing.
//!
//! [`DefaultTemplateProcessor`] handles the plain forms:
//!
//! | name      | part                     | effect                                  |
//! |-----------|--------------------------|-----------------------------------------|
//! | `.field`  | [`PropertyPart`]         | live field on the node                  |
//! | `?flag`   | [`BooleanAttributePart`] | attribute present iff value is truthy   |
//! | `@event`  | [`EventPart`]            | callable installed as an event listener |
//! | otherwise | [`AttributePart`]        | string attribute                        |

use tracing::warn;

use crate::error::Result;
use crate::host::Node;
use crate::subscribers::Subscription;
use crate::types::{Callable, Value};

/// A binding's commit point on one node.
pub trait Part {
    /// Commit `value` onto `node`.
    fn set_value(&mut self, node: &Node, value: Value) -> Result<()>;
}

/// Decides which [`Part`] handles a binding.
pub trait TemplateProcessor {
    fn attribute_part(&self, node: &Node, name: &str) -> Box<dyn Part>;
}

// =============================================================================
// Attribute
// =============================================================================

/// Writes the value's string form as an attribute.
///
/// `null` removes the attribute. Values with no string form are reported and
/// also remove it.
#[derive(Debug)]
pub struct AttributePart {
    name: String,
    committed: Option<Option<String>>,
}

impl AttributePart {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            committed: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Part for AttributePart {
    fn set_value(&mut self, node: &Node, value: Value) -> Result<()> {
        let projected = match &value {
            Value::Null => None,
            other => {
                let projected = other.to_display_string();
                if projected.is_none() {
                    warn!(attribute = %self.name, value = %other.describe(), "value has no string form");
                }
                projected
            }
        };

        if self.committed.as_ref() == Some(&projected) {
            return Ok(());
        }
        match &projected {
            Some(text) => node.set_attribute(&self.name, text.as_str()),
            None => {
                node.remove_attribute(&self.name);
            }
        }
        self.committed = Some(projected);
        Ok(())
    }
}

// =============================================================================
// Property
// =============================================================================

/// Assigns the value to a live field, bypassing attributes.
#[derive(Debug)]
pub struct PropertyPart {
    name: String,
    committed: Option<Value>,
}

impl PropertyPart {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            committed: None,
        }
    }
}

impl Part for PropertyPart {
    fn set_value(&mut self, node: &Node, value: Value) -> Result<()> {
        if self.committed.as_ref() == Some(&value) {
            return Ok(());
        }
        node.set_field(&self.name, value.clone());
        self.committed = Some(value);
        Ok(())
    }
}

// =============================================================================
// Boolean Attribute
// =============================================================================

#[derive(Debug)]
pub struct BooleanAttributePart {
    name: String,
    committed: Option<bool>,
}

impl BooleanAttributePart {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            committed: None,
        }
    }
}

impl Part for BooleanAttributePart {
    fn set_value(&mut self, node: &Node, value: Value) -> Result<()> {
        let present = value.is_truthy();
        if self.committed == Some(present) {
            return Ok(());
        }
        if present {
            node.set_attribute(&self.name, "");
        } else {
            node.remove_attribute(&self.name);
        }
        self.committed = Some(present);
        Ok(())
    }
}

// =============================================================================
// Event
// =============================================================================

/// Installs a callable as the node's listener for one event.
///
/// A different callable replaces the previous listener; a non-callable value
/// removes it.
#[derive(Debug)]
pub struct EventPart {
    event: String,
    installed: Option<(Callable, Subscription)>,
}

impl EventPart {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            installed: None,
        }
    }
}

impl Part for EventPart {
    fn set_value(&mut self, node: &Node, value: Value) -> Result<()> {
        let next = value.as_callable().cloned();
        let unchanged = match (&self.installed, &next) {
            (Some((current, _)), Some(next)) => current.ptr_eq(next),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return Ok(());
        }

        if let Some((_, subscription)) = self.installed.take() {
            subscription.unsubscribe();
        }
        if let Some(callable) = next {
            let listener = callable.clone();
            let subscription = node.add_event_listener(&self.event, move |args| {
                listener.call(args).map(|_| ())
            });
            self.installed = Some((callable, subscription));
        }
        Ok(())
    }
}

// =============================================================================
// Default Processor
// =============================================================================

/// Plain attribute, `.field`, `?flag` and `@event` handling.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTemplateProcessor;

impl TemplateProcessor for DefaultTemplateProcessor {
    fn attribute_part(&self, _node: &Node, name: &str) -> Box<dyn Part> {
        if let Some(field) = name.strip_prefix('.') {
            Box::new(PropertyPart::new(field))
        } else if let Some(flag) = name.strip_prefix('?') {
            Box::new(BooleanAttributePart::new(flag))
        } else if let Some(event) = name.strip_prefix('@') {
            Box::new(EventPart::new(event))
        } else {
            Box::new(AttributePart::new(name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_attribute_part() {
        let node = Node::element("div");
        let mut part = AttributePart::new("title");

        part.set_value(&node, 5.into()).unwrap();
        assert_eq!(node.attribute("title").as_deref(), Some("5"));

        part.set_value(&node, Value::Null).unwrap();
        assert!(!node.has_attribute("title"));
    }

    #[test]
    fn test_attribute_part_skips_unchanged() {
        let node = Node::element("div");
        let mut part = AttributePart::new("title");

        part.set_value(&node, "a".into()).unwrap();
        // An out-of-band edit survives a render with the same value.
        node.set_attribute("title", "edited");
        part.set_value(&node, "a".into()).unwrap();
        assert_eq!(node.attribute("title").as_deref(), Some("edited"));
    }

    #[test]
    fn test_boolean_attribute_part() {
        let node = Node::element("input");
        let mut part = BooleanAttributePart::new("disabled");

        part.set_value(&node, true.into()).unwrap();
        assert_eq!(node.attribute("disabled").as_deref(), Some(""));
        part.set_value(&node, 0.into()).unwrap();
        assert!(!node.has_attribute("disabled"));
    }

    #[test]
    fn test_event_part_replaces_listener() {
        let node = Node::element("button");
        let mut part = EventPart::new("click");
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));

        let first_clone = first.clone();
        part.set_value(
            &node,
            Value::function(move |_| {
                first_clone.set(first_clone.get() + 1);
                Ok(Value::Null)
            }),
        )
        .unwrap();
        node.dispatch_event("click", &[]).unwrap();

        let second_clone = second.clone();
        part.set_value(
            &node,
            Value::function(move |_| {
                second_clone.set(second_clone.get() + 1);
                Ok(Value::Null)
            }),
        )
        .unwrap();
        node.dispatch_event("click", &[]).unwrap();

        part.set_value(&node, Value::Null).unwrap();
        node.dispatch_event("click", &[]).unwrap();

        assert_eq!((first.get(), second.get()), (1, 1));
    }

    #[test]
    fn test_default_processor_dispatch() {
        let node = Node::element("div");
        let processor = DefaultTemplateProcessor;

        processor.attribute_part(&node, ".value").set_value(&node, 3.into()).unwrap();
        processor.attribute_part(&node, "?hidden").set_value(&node, true.into()).unwrap();
        processor.attribute_part(&node, "lang").set_value(&node, "en".into()).unwrap();

        assert_eq!(node.field("value"), Value::from(3));
        assert!(!node.has_attribute(".value"));
        assert!(node.has_attribute("hidden"));
        assert_eq!(node.attribute("lang").as_deref(), Some("en"));
    }
}
