//! Component - the lifecycle controller behind every defined tag.
//!
//! A component owns one local [`Store`], one [`PropertyModel`] and one
//! [`SubscriberRegistry`], plus whatever shared stores and route source its
//! setup opted into.
//!
//! # Lifecycle
//!
//! ```text
//! construct ──► attach ──► (render)* ──► detach
//!   setup        ingest attributes        unsubscribe everything
//!                first render             fire unmounted
//!                fire mounted
//! ```
//!
//! The host node drives attach and detach: inserting it into a connected tree
//! attaches, removing it detaches. One instance attaches at most once.
//!
//! # Render pass
//!
//! `willUpdate` → producer → rendering engine → `updated`. Triggered by local
//! store flushes, shared store flushes and route changes. Passes outside the
//! attached phase are no-ops, which also covers flushes that were scheduled
//! before detach and run after it.

mod context;
mod handles;
mod lifecycle;

pub use context::SetupContext;
pub use handles::{PropertyHandle, ReferenceHandle, RouteHandle, StateHandle};
pub use lifecycle::{LifecycleHook, Phase};

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::config::RenderRoot;
use crate::error::Result;
use crate::host::{Node, StyleSheet, WeakNode};
use crate::property::{PropertyEntry, PropertyModel};
use crate::render::RenderEngine;
use crate::router::RouteSource;
use crate::scheduler::Scheduler;
use crate::store::Store;
use crate::subscribers::{Category, SubscriberRegistry, Subscription};
use crate::template::Html;
use crate::types::{Payload, PropertyType, Value};

/// Render-description producer returned by setup.
pub type Producer = Rc<dyn Fn() -> Html>;

/// What setup functions look like once registered.
pub type SetupFn = dyn Fn(&SetupContext) -> Result<Producer>;

/// Collaborators a component is built with.
#[derive(Clone)]
pub(crate) struct ComponentEnv {
    pub scheduler: Scheduler,
    pub engine: Rc<dyn RenderEngine>,
    pub render_root: RenderRoot,
    pub shared_store: Store,
}

struct ComponentInner {
    tag: String,
    host: WeakNode,
    phase: Cell<Phase>,
    properties: RefCell<PropertyModel>,
    state: Store,
    registry: SubscriberRegistry,
    producer: RefCell<Option<Producer>>,
    engine: Rc<dyn RenderEngine>,
    root_mode: RenderRoot,
    render_root: RefCell<WeakNode>,
    style_sheets: RefCell<Vec<StyleSheet>>,
    router: RefCell<Option<Rc<dyn RouteSource>>>,
    subscriptions: RefCell<Vec<Subscription>>,
    /// Attribute text this instance reflected before attach.
    reflected: RefCell<HashMap<String, String>>,
    shared_store: Store,
    renders: Cell<u64>,
}

// Instances that never attached, or failed partway through attach, still hold
// registrations on shared stores and route sources.
impl Drop for ComponentInner {
    fn drop(&mut self) {
        for subscription in self.subscriptions.get_mut().drain(..) {
            subscription.unsubscribe();
        }
        if let Some(router) = self.router.get_mut().take() {
            router.destroy();
        }
    }
}

/// Handle to a component instance.
#[derive(Clone)]
pub struct Component {
    inner: Rc<ComponentInner>,
}

/// Non-owning component handle, held by everything the component owns.
#[derive(Clone)]
pub struct WeakComponent {
    inner: Weak<ComponentInner>,
}

impl WeakComponent {
    pub fn upgrade(&self) -> Option<Component> {
        self.inner.upgrade().map(|inner| Component { inner })
    }
}

impl fmt::Debug for WeakComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(component) => write!(f, "WeakComponent(<{}>)", component.tag()),
            None => f.write_str("WeakComponent(dropped)"),
        }
    }
}

impl Component {
    /// Build a component on `host` and run its setup.
    pub(crate) fn construct(tag: &str, host: &Node, setup: &SetupFn, env: ComponentEnv) -> Result<Self> {
        let component = Component {
            inner: Rc::new(ComponentInner {
                tag: tag.to_string(),
                host: host.downgrade(),
                phase: Cell::new(Phase::Constructed),
                properties: RefCell::new(PropertyModel::new()),
                state: Store::new(&env.scheduler),
                registry: SubscriberRegistry::new(),
                producer: RefCell::new(None),
                engine: env.engine,
                root_mode: env.render_root,
                render_root: RefCell::new(WeakNode::default()),
                style_sheets: RefCell::new(Vec::new()),
                router: RefCell::new(None),
                subscriptions: RefCell::new(Vec::new()),
                reflected: RefCell::new(HashMap::new()),
                shared_store: env.shared_store,
                renders: Cell::new(0),
            }),
        };

        // Local flushes notify the slots that changed, then render once.
        let weak = component.downgrade();
        let local = component.inner.state.subscribe(move |payload| {
            let Some(component) = weak.upgrade() else { return Ok(()) };
            for (id, value) in payload {
                component
                    .inner
                    .registry
                    .notify(Category::State, id, std::slice::from_ref(value))?;
            }
            component.render()
        });
        component.own(local);

        let producer = setup(&SetupContext::new(component.clone()))?;
        *component.inner.producer.borrow_mut() = Some(producer);

        host.set_component(component.clone());
        debug!(tag, "component constructed");
        Ok(component)
    }

    pub fn downgrade(&self) -> WeakComponent {
        WeakComponent {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    pub fn host(&self) -> Option<Node> {
        self.inner.host.upgrade()
    }

    pub fn phase(&self) -> Phase {
        self.inner.phase.get()
    }

    pub fn is_attached(&self) -> bool {
        self.phase() == Phase::Attached
    }

    /// The node the component renders into, once attached.
    pub fn render_root(&self) -> Option<Node> {
        self.inner.render_root.borrow().upgrade()
    }

    /// Current value of a declared property, resolved case-insensitively.
    pub fn property(&self, name: &str) -> Option<Value> {
        self.inner.properties.borrow().get(name).cloned()
    }

    /// Every property value, in declaration order.
    pub fn properties(&self) -> Payload {
        self.inner.properties.borrow().values().clone()
    }

    /// The component-local store.
    pub fn state(&self) -> &Store {
        &self.inner.state
    }

    pub fn registry(&self) -> &SubscriberRegistry {
        &self.inner.registry
    }

    /// Number of completed render passes.
    pub fn render_count(&self) -> u64 {
        self.inner.renders.get()
    }

    pub fn style_sheets(&self) -> Vec<StyleSheet> {
        self.inner.style_sheets.borrow().clone()
    }

    // =========================================================================
    // Property Pipeline
    // =========================================================================

    /// Write a property through the full pipeline.
    ///
    /// 1. resolve the name (case-insensitive) or fail with `UnknownProperty`
    /// 2. validate or fail with `TypeMismatch`, keeping the previous value
    /// 3. store
    /// 4. notify `property` subscribers
    /// 5. merge into the local store if state-bound
    /// 6. reflect to the host attribute if attribute-bound
    pub fn set_property(&self, name: &str, raw: impl Into<Value>) -> Result<()> {
        let (entry, value) = self
            .inner
            .properties
            .borrow_mut()
            .write(&self.inner.tag, name, raw.into())?;
        trace!(tag = %self.inner.tag, property = %entry.name, "property write");

        self.inner
            .registry
            .notify(Category::Property, &entry.name, std::slice::from_ref(&value))?;

        if entry.binds_to_state() {
            self.inner.state.update([(entry.name.clone(), value.clone())])?;
        }

        if entry.binds_to_attribute() {
            if let Some(host) = self.host() {
                let attribute = entry.attribute_name();
                let before_attach = self.phase() == Phase::Constructed;
                match reflection(&entry, &value) {
                    Some(text) => {
                        if before_attach {
                            self.inner.reflected.borrow_mut().insert(attribute.clone(), text.clone());
                        }
                        host.set_attribute(&attribute, text);
                    }
                    None => {
                        self.inner.reflected.borrow_mut().remove(&attribute);
                        host.remove_attribute(&attribute);
                    }
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Run by the host node when it becomes connected.
    pub(crate) fn attach(&self) -> Result<()> {
        if self.phase() != Phase::Constructed {
            warn!(tag = %self.inner.tag, phase = ?self.phase(), "re-attachment ignored");
            return Ok(());
        }
        let Some(host) = self.host() else { return Ok(()) };

        let root = match self.inner.root_mode {
            RenderRoot::Shadow => host.attach_shadow(),
            RenderRoot::Host => host.clone(),
        };
        root.adopt_style_sheets(self.style_sheets());
        *self.inner.render_root.borrow_mut() = root.downgrade();

        self.ingest_attributes(&host)?;

        self.inner.phase.set(Phase::Attached);
        debug!(tag = %self.inner.tag, "component attached");
        self.render()?;
        self.fire(LifecycleHook::Mounted)
    }

    /// Feed every host attribute naming a declared property through the pipeline.
    fn ingest_attributes(&self, host: &Node) -> Result<()> {
        let reflected = std::mem::take(&mut *self.inner.reflected.borrow_mut());
        for (name, text) in host.attributes() {
            let entry = self.inner.properties.borrow().resolve(&name).cloned();
            let Some(entry) = entry else { continue };

            // Our own reflection of a value written before attach.
            if reflected.get(&name) == Some(&text) {
                continue;
            }

            host.remove_attribute(&name);
            let raw = match entry.ty {
                PropertyType::Boolean => Value::Bool(true),
                _ => Value::String(text),
            };
            self.set_property(&entry.name, raw)?;
        }
        self.inner.reflected.borrow_mut().clear();
        Ok(())
    }

    /// Run one render pass. A no-op unless attached.
    pub fn render(&self) -> Result<()> {
        if !self.is_attached() {
            trace!(tag = %self.inner.tag, phase = ?self.phase(), "render skipped");
            return Ok(());
        }
        let producer = self.inner.producer.borrow().clone();
        let root = self.render_root();
        let (Some(producer), Some(root)) = (producer, root) else {
            return Ok(());
        };

        self.fire(LifecycleHook::WillUpdate)?;
        let description = producer();
        self.inner.engine.render(&description, &root)?;
        self.inner.renders.set(self.inner.renders.get() + 1);
        trace!(tag = %self.inner.tag, pass = self.inner.renders.get(), "rendered");
        self.fire(LifecycleHook::Updated)
    }

    /// Run by the host node when it leaves the connected tree.
    pub(crate) fn detach(&self) -> Result<()> {
        if self.phase() != Phase::Attached {
            return Ok(());
        }
        self.inner.phase.set(Phase::Detached);

        let subscriptions = std::mem::take(&mut *self.inner.subscriptions.borrow_mut());
        for subscription in subscriptions {
            subscription.unsubscribe();
        }
        let router = self.inner.router.borrow_mut().take();
        if let Some(router) = router {
            router.destroy();
        }

        debug!(tag = %self.inner.tag, "component detached");
        self.fire(LifecycleHook::Unmounted)
    }

    fn fire(&self, hook: LifecycleHook) -> Result<()> {
        self.inner.registry.notify(Category::Lifecycle, hook.as_str(), &[])
    }

    // =========================================================================
    // Capability plumbing (used by SetupContext)
    // =========================================================================

    /// Keep a subscription until detach, or until the instance is dropped.
    fn own(&self, subscription: Subscription) {
        self.inner.subscriptions.borrow_mut().push(subscription);
    }

    fn properties_mut(&self) -> std::cell::RefMut<'_, PropertyModel> {
        self.inner.properties.borrow_mut()
    }

    fn shared_store(&self) -> &Store {
        &self.inner.shared_store
    }

    fn adopt_style_sheets(&self, sheets: Vec<StyleSheet>) {
        if let Some(root) = self.render_root() {
            root.adopt_style_sheets(sheets.iter().cloned());
        }
        self.inner.style_sheets.borrow_mut().extend(sheets);
    }

    fn bind_router(&self, source: Rc<dyn RouteSource>) {
        let weak = self.downgrade();
        let subscription = source.on_update(Box::new(move |_| match weak.upgrade() {
            Some(component) => component.render(),
            None => Ok(()),
        }));
        self.own(subscription);

        let previous = self.inner.router.borrow_mut().replace(source);
        if let Some(previous) = previous {
            previous.destroy();
        }
    }
}

/// Attribute text mirroring `value`: presence for Booleans, the string form
/// otherwise. `None` means the attribute is absent.
fn reflection(entry: &PropertyEntry, value: &Value) -> Option<String> {
    match entry.ty {
        PropertyType::Boolean => value.is_truthy().then(String::new),
        _ => value.to_display_string(),
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("tag", &self.inner.tag)
            .field("phase", &self.phase())
            .field("properties", &*self.inner.properties.borrow())
            .field("renders", &self.inner.renders.get())
            .finish()
    }
}
