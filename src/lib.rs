//! # mova
//!
//! Stateful UI components on top of a DOM-like host tree.
//!
//! ## Architecture
//!
//! Each component owns a local reactive store, a validated property model and
//! a subscriber registry. Writes are synchronous; re-renders are not. Every
//! store coalesces the updates of one scheduler turn into a single flush, and a
//! flush renders once:
//!
//! ```text
//! set_property / StateHandle::set → Store (pending) → Scheduler turn → flush
//!     → willUpdate → producer → RenderEngine → updated
//! ```
//!
//! Rendering goes through the binding layer, which turns `class`/`style`
//! records into strings, hands `ref` callables the live node, and routes
//! `.name` writes on component hosts through the property pipeline.
//!
//! ## Example
//!
//! ```ignore
//! use mova::{LifecycleHook, PropertyDef, PropertyType, Runtime, Value, element};
//!
//! let runtime = Runtime::new();
//! runtime.define("mova-app", |ctx| {
//!     let timer = ctx.use_state(0);
//!     let interval = ctx.use_property(
//!         "timerInterval",
//!         PropertyDef::new(PropertyType::Number).default_value(100),
//!     )?;
//!     let timer_element = ctx.use_reference(Value::Null);
//!
//!     ctx.use_lifecycle(LifecycleHook::Updated, {
//!         let timer_element = timer_element.clone();
//!         move |_| {
//!             tracing::info!(text = ?timer_element.get().as_node().map(|n| n.text_content()), "updated");
//!             Ok(())
//!         }
//!     });
//!
//!     Ok(move || {
//!         element("div")
//!             .bind("ref", timer_element.setter())
//!             .child(format!("(timer: {})", timer.get().describe()))
//!     })
//! })?;
//!
//! let app = runtime.create_element("mova-app")?;
//! runtime.mount(&app)?;
//! runtime.run_until_idle()?;
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `Value`, `Callable`, `PropertyType`
//! - [`validation`] - coercion against a declared type
//! - [`subscribers`] - (category, key) callback registry
//! - [`scheduler`] - the task queue deferred flushes run on
//! - [`store`] - coalescing reactive store
//! - [`property`] - property model and flags
//! - [`component`] - lifecycle controller, setup context, handles
//! - [`template`] - render descriptions, parts, binding layer
//! - [`render`] - rendering engine contract and the reference engine
//! - [`host`] - the host node tree
//! - [`router`] - route source contract and an in-memory router
//! - [`runtime`] - definitions, document, shared store

pub mod component;
pub mod config;
pub mod error;
pub mod host;
pub mod property;
pub mod render;
pub mod router;
pub mod runtime;
pub mod scheduler;
pub mod store;
pub mod subscribers;
pub mod template;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use types::*;

pub use component::{
    Component, LifecycleHook, Phase, PropertyHandle, ReferenceHandle, RouteHandle, SetupContext,
    StateHandle, WeakComponent,
};
pub use config::{FlushMode, RenderRoot, RuntimeConfig, StoreOptions};
pub use error::{Error, Result, TypeMismatch};
pub use host::{Node, NodeKind, StyleSheet, WeakNode};
pub use property::{PropertyDef, PropertyEntry, PropertyFlags, PropertyModel};
pub use render::{DomEngine, ElementFactory, PlainElements, RenderEngine};
pub use router::{MemoryRouter, QueryValue, Request, RouteSource};
pub use runtime::Runtime;
pub use scheduler::Scheduler;
pub use store::Store;
pub use subscribers::{Category, SubscriberRegistry, Subscription};
pub use template::{
    BindingProcessor, DefaultTemplateProcessor, Element, Html, Part, TemplateProcessor, class_map,
    element, fragment, style_map, text,
};
pub use validation::validate;
