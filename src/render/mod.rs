//! Render - the contract between components and the rendering engine.
//!
//! A component hands its description to a [`RenderEngine`] together with its
//! render root; the engine patches the root to match. [`DomEngine`] is the
//! engine the runtime uses unless told otherwise.

mod engine;

pub use engine::DomEngine;

use crate::error::Result;
use crate::host::Node;
use crate::template::Html;

/// Patches a root to match a description. Rendering the same description
/// twice leaves the tree unchanged.
pub trait RenderEngine {
    fn render(&self, description: &Html, root: &Node) -> Result<()>;
}

/// Creates the nodes an engine inserts.
///
/// The runtime's factory turns defined tags into component hosts.
pub trait ElementFactory {
    fn create_element(&self, tag: &str) -> Result<Node>;
}

/// Factory that only creates plain elements.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainElements;

impl ElementFactory for PlainElements {
    fn create_element(&self, tag: &str) -> Result<Node> {
        Ok(Node::element(tag))
    }
}
