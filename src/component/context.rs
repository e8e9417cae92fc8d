//! SetupContext - capability registration for setup functions.
//!
//! Setup runs once per instance, while the component is being constructed.
//! Everything it declares is owned by that instance.
//!
//! ```ignore
//! runtime.define("mova-app", |ctx| {
//!     let timer = ctx.use_state(0);
//!     let interval = ctx.use_property("timerInterval", PropertyDef::new(PropertyType::Number).default_value(100))?;
//!     let timer_element = ctx.use_reference(Value::Null);
//!
//!     ctx.use_lifecycle(LifecycleHook::Updated, move |_| Ok(()));
//!
//!     Ok(move || element("div").bind("ref", timer_element.setter()).child(timer.get().describe()))
//! })?;
//! ```

use std::rc::Rc;

use uuid::Uuid;

use super::handles::{PropertyHandle, ReferenceHandle, RouteHandle, StateHandle};
use super::{Component, LifecycleHook};
use crate::error::Result;
use crate::host::StyleSheet;
use crate::property::PropertyDef;
use crate::router::RouteSource;
use crate::store::Store;
use crate::subscribers::{Category, Subscription};
use crate::types::Value;

/// Handed to a setup function; registers properties, state, references,
/// hooks, shared stores, style sheets and a route source.
pub struct SetupContext {
    component: Component,
}

impl SetupContext {
    pub(super) fn new(component: Component) -> Self {
        Self { component }
    }

    /// The component being set up.
    pub fn component(&self) -> &Component {
        &self.component
    }

    /// The runtime's shared store, for [`use_store`](Self::use_store).
    pub fn shared_store(&self) -> Store {
        self.component.shared_store().clone()
    }

    /// Declare a property. Its default is applied now.
    ///
    /// A state-bound property also seeds the local store with that default.
    pub fn use_property(&self, name: &str, def: impl Into<PropertyDef>) -> Result<PropertyHandle> {
        let entry = self.component.properties_mut().declare(name, def)?.clone();
        if entry.binds_to_state() {
            self.component
                .state()
                .seed(entry.name.clone(), entry.default.clone().unwrap_or_default());
        }
        Ok(PropertyHandle::new(self.component.downgrade(), entry.name))
    }

    /// Allocate a local state slot holding `initial`.
    pub fn use_state(&self, initial: impl Into<Value>) -> StateHandle {
        let id = Uuid::new_v4().to_string();
        self.component.state().seed(id.clone(), initial);
        StateHandle::new(self.component.downgrade(), self.component.state().clone(), id)
    }

    /// Allocate a reference slot holding `initial`.
    pub fn use_reference(&self, initial: impl Into<Value>) -> ReferenceHandle {
        ReferenceHandle::new(self.component.downgrade(), Uuid::new_v4().to_string(), initial.into())
    }

    /// Subscribe to a lifecycle hook. Any number of callbacks per hook.
    pub fn use_lifecycle(
        &self,
        hook: LifecycleHook,
        callback: impl Fn(&[Value]) -> Result<()> + 'static,
    ) -> Subscription {
        self.component
            .registry()
            .subscribe(Category::Lifecycle, hook.as_str(), callback)
    }

    /// Re-render whenever `store` flushes. Released on detach or drop.
    pub fn use_store(&self, store: &Store) {
        let weak = self.component.downgrade();
        let subscription = store.subscribe(move |_| match weak.upgrade() {
            Some(component) => component.render(),
            None => Ok(()),
        });
        self.component.own(subscription);
    }

    /// Adopt style sheets on the render root, after any adopted before.
    pub fn use_style(&self, sheets: impl IntoIterator<Item = StyleSheet>) {
        self.component.adopt_style_sheets(sheets.into_iter().collect());
    }

    /// Re-render on every route change. The source is destroyed on detach.
    pub fn use_router(&self, source: Rc<dyn RouteSource>) -> RouteHandle {
        self.component.bind_router(source.clone());
        RouteHandle::new(source)
    }
}

impl std::fmt::Debug for SetupContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetupContext")
            .field("component", &self.component.tag())
            .finish()
    }
}
