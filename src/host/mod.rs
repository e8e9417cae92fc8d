//! Host tree - the rendering surface components live in.
//!
//! - [`Node`] - document, element, text and shadow-root nodes
//! - [`StyleSheet`] - shared sheets adopted by render roots

mod node;
mod style;

pub use node::{Node, NodeKind, WeakNode};
pub use style::StyleSheet;
