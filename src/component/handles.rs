//! Handles returned by capability registration.
//!
//! Handles keep only a weak link to their component so they can be captured
//! in the component's own callbacks. Once the component is gone, reads return
//! `Value::Null`, writes are dropped and subscriptions are inert.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::WeakComponent;
use crate::error::Result;
use crate::host::WeakNode;
use crate::router::{Request, RouteSource};
use crate::store::Store;
use crate::subscribers::{Category, Subscription};
use crate::types::{Callable, Value};

fn subscribe_on(
    component: &WeakComponent,
    category: Category,
    key: &str,
    callback: impl Fn(&[Value]) -> Result<()> + 'static,
) -> Subscription {
    match component.upgrade() {
        Some(component) => component.registry().subscribe(category, key, callback),
        None => Subscription::inert(),
    }
}

// =============================================================================
// Property
// =============================================================================

/// A declared property: `get`, `set` through the pipeline, `on_update`.
#[derive(Debug, Clone)]
pub struct PropertyHandle {
    component: WeakComponent,
    name: String,
}

impl PropertyHandle {
    pub(super) fn new(component: WeakComponent, name: String) -> Self {
        Self { component, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self) -> Value {
        self.component
            .upgrade()
            .and_then(|component| component.property(&self.name))
            .unwrap_or_default()
    }

    /// Write through the property pipeline; validation failures are returned.
    pub fn set(&self, value: impl Into<Value>) -> Result<()> {
        match self.component.upgrade() {
            Some(component) => component.set_property(&self.name, value),
            None => Ok(()),
        }
    }

    /// Called with the stored value after every successful write.
    pub fn on_update(&self, callback: impl Fn(&[Value]) -> Result<()> + 'static) -> Subscription {
        subscribe_on(&self.component, Category::Property, &self.name, callback)
    }
}

// =============================================================================
// State
// =============================================================================

/// A local state slot. `set` goes through the coalesced flush.
#[derive(Debug, Clone)]
pub struct StateHandle {
    component: WeakComponent,
    store: Store,
    id: String,
}

impl StateHandle {
    pub(super) fn new(component: WeakComponent, store: Store, id: String) -> Self {
        Self { component, store, id }
    }

    /// The slot's unique id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The value as of the last flush.
    pub fn get(&self) -> Value {
        self.store.value(&self.id)
    }

    pub fn set(&self, value: impl Into<Value>) -> Result<()> {
        self.store.update([(self.id.clone(), value.into())])
    }

    /// Called with the new value each time a flush changes this slot.
    pub fn on_update(&self, callback: impl Fn(&[Value]) -> Result<()> + 'static) -> Subscription {
        subscribe_on(&self.component, Category::State, &self.id, callback)
    }
}

// =============================================================================
// Reference
// =============================================================================

/// What a reference slot holds. Nodes are held weakly: the node usually
/// carries bindings that capture this slot.
#[derive(Debug)]
enum Held {
    Node(WeakNode),
    Value(Value),
}

impl Held {
    fn new(value: Value) -> Self {
        match value {
            Value::Node(node) => Held::Node(node.downgrade()),
            other => Held::Value(other),
        }
    }

    fn get(&self) -> Value {
        match self {
            Held::Node(node) => node.upgrade().map(Value::Node).unwrap_or_default(),
            Held::Value(value) => value.clone(),
        }
    }
}

/// A reference slot, usually filled by a `ref` binding via [`setter`](Self::setter).
///
/// A node stored here is not kept alive by the slot; once the tree drops it,
/// `get` returns `Value::Null`.
#[derive(Debug, Clone)]
pub struct ReferenceHandle {
    component: WeakComponent,
    id: String,
    slot: Rc<RefCell<Held>>,
    setter: Callable,
}

impl ReferenceHandle {
    pub(super) fn new(component: WeakComponent, id: String, initial: Value) -> Self {
        let slot = Rc::new(RefCell::new(Held::new(initial)));
        let setter = {
            let component = component.clone();
            let id = id.clone();
            let slot = slot.clone();
            Callable::new(move |args| {
                let value = args.first().cloned().unwrap_or_default();
                store_reference(&component, &id, &slot, value)?;
                Ok(Value::Null)
            })
        };
        Self {
            component,
            id,
            slot,
            setter,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self) -> Value {
        self.slot.borrow().get()
    }

    /// Store `value` and notify `reference` subscribers synchronously.
    pub fn set(&self, value: impl Into<Value>) -> Result<()> {
        store_reference(&self.component, &self.id, &self.slot, value.into())
    }

    /// The same callable every time, so a `ref` binding fires once.
    pub fn setter(&self) -> Callable {
        self.setter.clone()
    }

    pub fn on_update(&self, callback: impl Fn(&[Value]) -> Result<()> + 'static) -> Subscription {
        subscribe_on(&self.component, Category::Reference, &self.id, callback)
    }
}

fn store_reference(component: &WeakComponent, id: &str, slot: &RefCell<Held>, value: Value) -> Result<()> {
    *slot.borrow_mut() = Held::new(value.clone());
    match component.upgrade() {
        Some(component) => component
            .registry()
            .notify(Category::Reference, id, std::slice::from_ref(&value)),
        None => Ok(()),
    }
}

// =============================================================================
// Route
// =============================================================================

/// Read access to the bound route source.
#[derive(Clone)]
pub struct RouteHandle {
    source: Rc<dyn RouteSource>,
}

impl RouteHandle {
    pub(super) fn new(source: Rc<dyn RouteSource>) -> Self {
        Self { source }
    }

    pub fn request(&self) -> Request {
        self.source.request()
    }

    pub fn navigate(&self, url: &str) -> Result<()> {
        self.source.navigate(url)
    }
}

impl fmt::Debug for RouteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteHandle")
            .field("request", &self.source.request())
            .finish()
    }
}
