//! Template - render descriptions and the parts that commit their bindings.
//!
//! - [`html`] - `Html`/`Element` descriptions built with [`element`], [`text`], [`fragment`]
//! - [`part`] - the [`Part`]/[`TemplateProcessor`] seam and the default parts
//! - [`binding`] - `ref`, `class`, `style` and `.name` interception

pub mod binding;
pub mod html;
pub mod part;

pub use binding::{
    BindingProcessor, ClassPart, DirectPropertyPart, RefPart, StylePart, class_map, style_map,
};
pub use html::{Element, Html, element, fragment, text};
pub use part::{
    AttributePart, BooleanAttributePart, DefaultTemplateProcessor, EventPart, Part, PropertyPart,
    TemplateProcessor,
};
