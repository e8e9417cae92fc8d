//! Render descriptions.
//!
//! An [`Html`] value is what a component's render function returns and what a
//! [`RenderEngine`](crate::RenderEngine) consumes. Static attributes are
//! written once when the engine creates a node; bindings are dynamic and are
//! re-committed through a [`Part`](super::Part) on every render.
//!
//! ```ignore
//! use mova::template::{element, text};
//!
//! let view = element("div")
//!     .attr("id", "timer")
//!     .bind("class", Value::record([("active", true), ("idle", false)]))
//!     .bind("ref", reference.setter())
//!     .child(text(format!("(timer: {})", timer.get().describe())));
//! ```

use crate::types::Value;

/// A render description.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Html {
    #[default]
    Empty,
    Text(String),
    Element(Element),
    Fragment(Vec<Html>),
}

impl Html {
    /// Top-level nodes with fragments expanded and empties dropped.
    pub fn flatten(&self) -> Vec<&Html> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into<'a>(&'a self, out: &mut Vec<&'a Html>) {
        match self {
            Html::Empty => {}
            Html::Fragment(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            other => out.push(other),
        }
    }
}

/// An element in a render description.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    bindings: Vec<(String, Value)>,
    children: Vec<Html>,
}

impl Element {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Static attributes, written when the node is created.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Dynamic bindings, committed on every render.
    pub fn bindings(&self) -> &[(String, Value)] {
        &self.bindings
    }

    pub fn children(&self) -> &[Html] {
        &self.children
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Bind a dynamic expression to `name`.
    ///
    /// `name` may carry a prefix: `.field`, `?flag` or `@event`.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bindings.push((name.into(), value.into()));
        self
    }

    pub fn child(mut self, child: impl Into<Html>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children_from<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Html>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

/// Start an element description.
pub fn element(tag: &str) -> Element {
    Element {
        tag: tag.to_ascii_lowercase(),
        attributes: Vec::new(),
        bindings: Vec::new(),
        children: Vec::new(),
    }
}

pub fn text(content: impl Into<String>) -> Html {
    Html::Text(content.into())
}

pub fn fragment<I>(items: I) -> Html
where
    I: IntoIterator,
    I::Item: Into<Html>,
{
    Html::Fragment(items.into_iter().map(Into::into).collect())
}

impl From<Element> for Html {
    fn from(element: Element) -> Self {
        Html::Element(element)
    }
}

impl From<&str> for Html {
    fn from(content: &str) -> Self {
        Html::Text(content.to_string())
    }
}

impl From<String> for Html {
    fn from(content: String) -> Self {
        Html::Text(content)
    }
}

impl<T: Into<Html>> From<Option<T>> for Html {
    fn from(value: Option<T>) -> Self {
        value.map_or(Html::Empty, Into::into)
    }
}
