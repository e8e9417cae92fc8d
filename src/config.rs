//! Runtime configuration.

use crate::types::Payload;

/// Where a component renders its description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderRoot {
    /// Into a shadow root attached to the host node.
    #[default]
    Shadow,
    /// Directly into the host node's children.
    Host,
}

/// When a store applies an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// Coalesce updates and apply them on the next scheduler turn.
    #[default]
    Deferred,
    /// Apply and notify inside `update` itself.
    Immediate,
}

/// Settings shared by every component created through a [`Runtime`](crate::Runtime).
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub render_root: RenderRoot,
    /// Flush mode of the shared store. Component-local stores are always deferred.
    pub shared_flush_mode: FlushMode,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_root(mut self, render_root: RenderRoot) -> Self {
        self.render_root = render_root;
        self
    }

    pub fn shared_flush_mode(mut self, mode: FlushMode) -> Self {
        self.shared_flush_mode = mode;
        self
    }
}

/// Construction options for a [`Store`](crate::Store).
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Initial snapshot.
    pub data: Payload,
    pub mode: FlushMode,
}

impl StoreOptions {
    pub fn data(mut self, data: Payload) -> Self {
        self.data = data;
        self
    }

    pub fn mode(mut self, mode: FlushMode) -> Self {
        self.mode = mode;
        self
    }
}
