//! Runtime - definitions, the document, the scheduler and the shared store.
//!
//! The runtime is the context object every component is built from. There is
//! no global state: two runtimes are fully independent.
//!
//! # Example
//!
//! ```ignore
//! use mova::{Runtime, PropertyDef, PropertyType, element};
//!
//! let runtime = Runtime::new();
//! runtime.define("x-counter", |ctx| {
//!     let count = ctx.use_property("count", PropertyDef::new(PropertyType::Number).default_value(0))?;
//!     Ok(move || element("span").child(count.get().describe()))
//! })?;
//!
//! let counter = runtime.create_element("x-counter")?;
//! counter.set_attribute("count", "5");
//! runtime.mount(&counter)?;
//! runtime.run_until_idle()?;
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::debug;

use crate::component::{Component, ComponentEnv, Producer, SetupContext, SetupFn};
use crate::config::{RuntimeConfig, StoreOptions};
use crate::error::{Error, Result};
use crate::host::Node;
use crate::render::{DomEngine, ElementFactory, RenderEngine};
use crate::scheduler::Scheduler;
use crate::store::Store;
use crate::template::Html;

struct RuntimeInner {
    config: RuntimeConfig,
    scheduler: Scheduler,
    shared: Store,
    definitions: RefCell<IndexMap<String, Rc<SetupFn>>>,
    document: Node,
    engine: RefCell<Rc<dyn RenderEngine>>,
}

/// Cloneable handle to a runtime.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

/// Element factory that builds components for defined tags.
struct RuntimeFactory(Weak<RuntimeInner>);

impl ElementFactory for RuntimeFactory {
    fn create_element(&self, tag: &str) -> Result<Node> {
        match self.0.upgrade() {
            Some(inner) => Runtime { inner }.create_element(tag),
            None => Ok(Node::element(tag)),
        }
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let scheduler = Scheduler::new();
        let shared = Store::with_options(
            &scheduler,
            StoreOptions::default().mode(config.shared_flush_mode),
        );
        let inner = Rc::new_cyclic(|weak: &Weak<RuntimeInner>| {
            let engine = DomEngine::new().with_factory(Rc::new(RuntimeFactory(weak.clone())));
            RuntimeInner {
                config,
                scheduler,
                shared,
                definitions: RefCell::new(IndexMap::new()),
                document: Node::document(),
                engine: RefCell::new(Rc::new(engine)),
            }
        });
        Self { inner }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    /// The store shared across every component that opts in with `use_store`.
    pub fn shared_store(&self) -> &Store {
        &self.inner.shared
    }

    /// The connected root components are mounted under.
    pub fn document(&self) -> &Node {
        &self.inner.document
    }

    /// Rendering engine for components created from now on.
    pub fn set_engine(&self, engine: Rc<dyn RenderEngine>) {
        *self.inner.engine.borrow_mut() = engine;
    }

    // =========================================================================
    // Definitions
    // =========================================================================

    /// Register `setup` for `tag`.
    ///
    /// Setup runs once per instance and returns the render producer.
    pub fn define<F, R, H>(&self, tag: &str, setup: F) -> Result<()>
    where
        F: Fn(&SetupContext) -> Result<R> + 'static,
        R: Fn() -> H + 'static,
        H: Into<Html>,
    {
        let tag = tag.to_ascii_lowercase();
        let mut definitions = self.inner.definitions.borrow_mut();
        if definitions.contains_key(&tag) {
            return Err(Error::DuplicateDefinition(tag));
        }

        let setup: Rc<SetupFn> = Rc::new(move |ctx: &SetupContext| {
            let render = setup(ctx)?;
            Ok(Rc::new(move || render().into()) as Producer)
        });
        debug!(tag = %tag, "component defined");
        definitions.insert(tag, setup);
        Ok(())
    }

    pub fn is_defined(&self, tag: &str) -> bool {
        self.inner
            .definitions
            .borrow()
            .contains_key(&tag.to_ascii_lowercase())
    }

    /// A component host for defined tags, a plain element otherwise.
    pub fn create_element(&self, tag: &str) -> Result<Node> {
        if self.is_defined(tag) {
            self.create_component(tag)
        } else {
            Ok(Node::element(tag))
        }
    }

    /// Construct the component for a defined tag and return its host node.
    ///
    /// Setup runs now. The node owns the component; reach it through
    /// [`Node::component`].
    pub fn create_component(&self, tag: &str) -> Result<Node> {
        let tag = tag.to_ascii_lowercase();
        let setup = self
            .inner
            .definitions
            .borrow()
            .get(&tag)
            .cloned()
            .ok_or_else(|| Error::UndefinedComponent(tag.clone()))?;

        let host = Node::element(&tag);
        let env = ComponentEnv {
            scheduler: self.inner.scheduler.clone(),
            engine: self.inner.engine.borrow().clone(),
            render_root: self.inner.config.render_root,
            shared_store: self.inner.shared.clone(),
        };
        Component::construct(&tag, &host, &*setup, env)?;
        Ok(host)
    }

    // =========================================================================
    // Document
    // =========================================================================

    /// Append `node` to the document, attaching any components in it.
    pub fn mount(&self, node: &Node) -> Result<()> {
        self.inner.document.append_child(node)
    }

    /// Remove `node` from the document, detaching any components in it.
    pub fn unmount(&self, node: &Node) -> Result<bool> {
        self.inner.document.remove_child(node)
    }

    // =========================================================================
    // Event Loop
    // =========================================================================

    /// Run one scheduler turn.
    pub fn run_turn(&self) -> Result<usize> {
        self.inner.scheduler.run_turn()
    }

    /// Run scheduler turns until nothing is queued.
    pub fn run_until_idle(&self) -> Result<usize> {
        self.inner.scheduler.run_until_idle()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.inner.config)
            .field("definitions", &self.inner.definitions.borrow().keys().collect::<Vec<_>>())
            .field("scheduler", &self.inner.scheduler)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{LifecycleHook, Phase, StateHandle};
    use crate::config::RenderRoot;
    use crate::host::StyleSheet;
    use crate::property::PropertyDef;
    use crate::router::{MemoryRouter, RouteSource};
    use crate::subscribers::Category;
    use crate::template::{element, text};
    use crate::types::{PropertyType, Value};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn component(node: &Node) -> Component {
        node.component().unwrap()
    }

    fn shadow_html(node: &Node) -> String {
        node.shadow_root().unwrap().inner_html()
    }

    /// Counts of willUpdate / updated / mounted / unmounted.
    #[derive(Default)]
    struct HookLog {
        will_update: Cell<u32>,
        updated: Cell<u32>,
        mounted: Cell<u32>,
        unmounted: Cell<u32>,
    }

    fn record_hooks(ctx: &SetupContext, log: &Rc<HookLog>) {
        for hook in LifecycleHook::ALL {
            let log = log.clone();
            ctx.use_lifecycle(hook, move |_| {
                let counter = match hook {
                    LifecycleHook::WillUpdate => &log.will_update,
                    LifecycleHook::Updated => &log.updated,
                    LifecycleHook::Mounted => &log.mounted,
                    LifecycleHook::Unmounted => &log.unmounted,
                };
                counter.set(counter.get() + 1);
                Ok(())
            });
        }
    }

    fn counter_runtime() -> Runtime {
        let runtime = Runtime::new();
        runtime
            .define("x-counter", |ctx| {
                let count = ctx.use_property(
                    "count",
                    PropertyDef::new(PropertyType::Number)
                        .default_value(0)
                        .bind_to_attribute(),
                )?;
                ctx.use_property(
                    "open",
                    PropertyDef::new(PropertyType::Boolean).bind_to_attribute(),
                )?;
                Ok(move || element("span").child(count.get().describe()))
            })
            .unwrap();
        runtime
    }

    #[test]
    fn test_attribute_round_trip_to_number() {
        let runtime = counter_runtime();
        let node = runtime.create_element("x-counter").unwrap();
        node.set_attribute("count", "5");

        runtime.mount(&node).unwrap();

        let counter = component(&node);
        assert_eq!(counter.property("count"), Some(Value::Number(5.0)));
        assert_eq!(node.attribute("count").as_deref(), Some("5"));
        assert_eq!(shadow_html(&node), "<span>5</span>");
    }

    #[test]
    fn test_attribute_equal_to_default_is_ingested() {
        let runtime = counter_runtime();
        let node = runtime.create_element("x-counter").unwrap();
        let counter = component(&node);
        let writes = Rc::new(RefCell::new(Vec::new()));
        let writes_clone = writes.clone();
        counter.registry().subscribe(Category::Property, "count", move |args| {
            writes_clone.borrow_mut().push(args[0].clone());
            Ok(())
        });

        node.set_attribute("count", "0");
        runtime.mount(&node).unwrap();

        assert_eq!(*writes.borrow(), vec![Value::Number(0.0)]);
        assert_eq!(node.attribute("count").as_deref(), Some("0"));
    }

    #[test]
    fn test_own_reflection_not_reingested() {
        let runtime = counter_runtime();
        let node = runtime.create_element("x-counter").unwrap();
        let counter = component(&node);
        let writes = Rc::new(Cell::new(0));
        let writes_clone = writes.clone();
        counter.registry().subscribe(Category::Property, "count", move |_| {
            writes_clone.set(writes_clone.get() + 1);
            Ok(())
        });

        counter.set_property("count", 7).unwrap();
        assert_eq!(node.attribute("count").as_deref(), Some("7"));
        runtime.mount(&node).unwrap();
        assert_eq!(writes.get(), 1);
        assert_eq!(counter.property("count"), Some(Value::Number(7.0)));

        // Markup written over the reflection still wins.
        let other = runtime.create_element("x-counter").unwrap();
        component(&other).set_property("count", 7).unwrap();
        other.set_attribute("count", "9");
        runtime.mount(&other).unwrap();
        assert_eq!(component(&other).property("count"), Some(Value::Number(9.0)));
    }

    #[test]
    fn test_boolean_attribute_presence() {
        let runtime = counter_runtime();
        let node = runtime.create_element("x-counter").unwrap();
        node.set_attribute("open", "false");
        runtime.mount(&node).unwrap();

        let counter = component(&node);
        assert_eq!(counter.property("open"), Some(Value::Bool(true)));
        assert_eq!(node.attribute("open").as_deref(), Some(""));

        counter.set_property("open", false).unwrap();
        assert!(!node.has_attribute("open"));
        counter.set_property("OPEN", "yes").unwrap();
        assert_eq!(node.attribute("open").as_deref(), Some(""));
    }

    #[test]
    fn test_unknown_property_rejected() {
        let runtime = counter_runtime();
        let node = runtime.create_element("x-counter").unwrap();
        let counter = component(&node);
        let before = counter.properties();

        for name in ["counts", "COUNTS", "Opened", "label"] {
            let err = counter.set_property(name, 1).unwrap_err();
            assert!(err.is_unknown_property(), "{name}: {err}");
        }
        assert_eq!(counter.properties(), before);

        counter.set_property("COUNT", "7").unwrap();
        assert_eq!(counter.property("count"), Some(Value::Number(7.0)));
    }

    #[test]
    fn test_type_mismatch_keeps_previous_value() {
        let runtime = counter_runtime();
        let node = runtime.create_element("x-counter").unwrap();
        runtime.mount(&node).unwrap();
        let counter = component(&node);

        let err = counter.set_property("count", "many").unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(counter.property("count"), Some(Value::Number(0.0)));
        // Defaults are not reflected; only successful writes are.
        assert!(!node.has_attribute("count"));
    }

    #[test]
    fn test_one_render_per_coalesced_flush() {
        let runtime = Runtime::new();
        let log = Rc::new(HookLog::default());
        let log_clone = log.clone();
        runtime
            .define("x-form", move |ctx| {
                record_hooks(ctx, &log_clone);
                let label = ctx.use_property(
                    "label",
                    PropertyDef::new(PropertyType::String)
                        .default_value("idle")
                        .bind_to_state(),
                )?;
                let clicks = ctx.use_state(0);

                let on_click = Value::function({
                    let label = label.clone();
                    let clicks = clicks.clone();
                    move |_| {
                        label.set("clicked")?;
                        clicks.set(clicks.get().to_number() + 1.0)?;
                        Ok(Value::Null)
                    }
                });

                Ok(move || {
                    element("button")
                        .bind("@click", on_click.clone())
                        .child(format!("{} {}", label.get().describe(), clicks.get().describe()))
                })
            })
            .unwrap();

        let node = runtime.create_element("x-form").unwrap();
        runtime.mount(&node).unwrap();
        assert_eq!((log.will_update.get(), log.updated.get()), (1, 1));
        assert_eq!(runtime.run_until_idle().unwrap(), 0);

        let button = node.shadow_root().unwrap().child(0).unwrap();
        button.dispatch_event("click", &[]).unwrap();
        assert_eq!(log.updated.get(), 1);

        assert_eq!(runtime.run_until_idle().unwrap(), 1);
        assert_eq!((log.will_update.get(), log.updated.get()), (2, 2));
        assert_eq!(button.text_content(), "\"clicked\" 1");
    }

    #[test]
    fn test_no_render_after_detach() {
        let runtime = Runtime::new();
        let log = Rc::new(HookLog::default());
        let slot: Rc<RefCell<Option<StateHandle>>> = Rc::default();
        let (log_clone, slot_clone) = (log.clone(), slot.clone());
        runtime
            .define("x-timer", move |ctx| {
                record_hooks(ctx, &log_clone);
                let timer = ctx.use_state(0);
                *slot_clone.borrow_mut() = Some(timer.clone());
                Ok(move || text(timer.get().describe()))
            })
            .unwrap();

        let node = runtime.create_element("x-timer").unwrap();
        runtime.mount(&node).unwrap();
        let timer = slot.borrow().clone().unwrap();

        timer.set(5).unwrap();
        assert!(runtime.unmount(&node).unwrap());
        runtime.run_until_idle().unwrap();

        let timer_component = component(&node);
        assert_eq!(timer_component.phase(), Phase::Detached);
        assert_eq!(log.updated.get(), 1);
        assert_eq!(log.unmounted.get(), 1);
        assert_eq!(timer.get(), Value::from(5));
        assert_eq!(shadow_html(&node), "0");
    }

    #[test]
    fn test_reattachment_ignored() {
        let runtime = counter_runtime();
        let node = runtime.create_element("x-counter").unwrap();

        runtime.mount(&node).unwrap();
        runtime.unmount(&node).unwrap();
        runtime.mount(&node).unwrap();

        let counter = component(&node);
        assert_eq!(counter.phase(), Phase::Detached);
        assert_eq!(counter.render_count(), 1);
    }

    #[test]
    fn test_hook_order() {
        let runtime = Runtime::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let order_clone = order.clone();
        runtime
            .define("x-hooks", move |ctx| {
                for hook in [LifecycleHook::Mounted, LifecycleHook::Updated, LifecycleHook::WillUpdate] {
                    let order = order_clone.clone();
                    ctx.use_lifecycle(hook, move |_| {
                        order.borrow_mut().push(hook.as_str());
                        Ok(())
                    });
                }
                Ok(|| text("x"))
            })
            .unwrap();

        runtime.mount(&runtime.create_element("x-hooks").unwrap()).unwrap();
        assert_eq!(*order.borrow(), vec!["willUpdate", "updated", "mounted"]);
    }

    #[test]
    fn test_hook_failure_propagates() {
        let runtime = Runtime::new();
        runtime
            .define("x-broken", |ctx| {
                ctx.use_lifecycle(LifecycleHook::Mounted, |_| Err(Error::callback("boom")));
                Ok(|| text("x"))
            })
            .unwrap();

        let err = runtime
            .mount(&runtime.create_element("x-broken").unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::SubscriberCallback(_)));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_reference_set_once() {
        let runtime = Runtime::new();
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        runtime
            .define("x-ref", move |ctx| {
                let target = ctx.use_reference(Value::Null);
                let hits = hits_clone.clone();
                target.on_update(move |args| {
                    assert!(args[0].as_node().is_some());
                    hits.set(hits.get() + 1);
                    Ok(())
                });
                Ok(move || {
                    element("div")
                        .bind("ref", target.setter())
                        .bind("class", Value::record([("a", true), ("b", false), ("c", true)]))
                })
            })
            .unwrap();

        let node = runtime.create_element("x-ref").unwrap();
        runtime.mount(&node).unwrap();
        let ref_component = component(&node);
        ref_component.render().unwrap();
        ref_component.render().unwrap();

        assert_eq!(hits.get(), 1);
        assert_eq!(shadow_html(&node), "<div class=\"a c\"></div>");
    }

    fn define_ref_target(runtime: &Runtime) {
        runtime
            .define("x-ref", |ctx| {
                let target = ctx.use_reference(Value::Null);
                let on_click = Value::function({
                    let target = target.clone();
                    move |_| Ok(target.get())
                });
                Ok(move || {
                    element("div")
                        .bind("ref", target.setter())
                        .bind("@click", on_click.clone())
                })
            })
            .unwrap();
    }

    #[test]
    fn test_ref_target_dropped_with_tree() {
        for mode in [RenderRoot::Shadow, RenderRoot::Host] {
            let runtime = Runtime::with_config(RuntimeConfig::new().render_root(mode));
            define_ref_target(&runtime);

            let node = runtime.create_element("x-ref").unwrap();
            runtime.mount(&node).unwrap();
            let root = component(&node).render_root().unwrap();
            let target = root.child(0).unwrap().downgrade();
            let host = node.downgrade();
            drop(root);
            assert!(target.upgrade().is_some());

            assert!(runtime.unmount(&node).unwrap());
            drop(runtime);
            drop(node);

            assert!(target.upgrade().is_none(), "{mode:?}");
            assert!(host.upgrade().is_none(), "{mode:?}");
        }
    }

    #[test]
    fn test_direct_property_reaches_child_component() {
        let runtime = Runtime::new();
        runtime
            .define("x-list", |ctx| {
                let items = ctx.use_property("items", PropertyType::List)?;
                Ok(move || {
                    let count = items.get().as_list().map_or(0, <[Value]>::len);
                    text(count.to_string())
                })
            })
            .unwrap();
        let items = Rc::new(RefCell::new(Value::List(vec![1.into(), 2.into()])));
        let items_clone = items.clone();
        runtime
            .define("x-page", move |_| {
                let items = items_clone.clone();
                Ok(move || element("x-list").bind(".items", items.borrow().clone()))
            })
            .unwrap();

        let page = runtime.create_element("x-page").unwrap();
        runtime.mount(&page).unwrap();

        let list = page.shadow_root().unwrap().child(0).unwrap();
        let list_component = component(&list);
        assert_eq!(list_component.property("items"), Some(items.borrow().clone()));
        assert!(list.field("items").is_null());
        assert_eq!(shadow_html(&list), "2");

        *items.borrow_mut() = Value::from("oops");
        let err = component(&page).render().unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(list_component.property("items").and_then(|v| v.as_list().map(<[Value]>::len)), Some(2));
    }

    #[test]
    fn test_shared_store_rerenders_subscribers() {
        let runtime = Runtime::new();
        runtime
            .define("x-theme", |ctx| {
                let shared = ctx.shared_store();
                ctx.use_store(&shared);
                Ok(move || text(shared.value("theme").describe()))
            })
            .unwrap();

        let first = runtime.create_element("x-theme").unwrap();
        let second = runtime.create_element("x-theme").unwrap();
        runtime.mount(&first).unwrap();
        runtime.mount(&second).unwrap();
        assert_eq!(runtime.shared_store().subscriber_count(), 2);

        runtime.shared_store().update([("theme", "dark")]).unwrap();
        runtime.run_until_idle().unwrap();
        assert_eq!(shadow_html(&first), "\"dark\"");
        assert_eq!(shadow_html(&second), "\"dark\"");

        runtime.unmount(&first).unwrap();
        assert_eq!(runtime.shared_store().subscriber_count(), 1);
    }

    #[test]
    fn test_unattached_components_release_shared_store() {
        let runtime = Runtime::new();
        runtime
            .define("x-theme", |ctx| {
                let shared = ctx.shared_store();
                ctx.use_store(&shared);
                Ok(move || text(shared.value("theme").describe()))
            })
            .unwrap();

        let nodes: Vec<Node> = (0..10).map(|_| runtime.create_element("x-theme").unwrap()).collect();
        assert_eq!(runtime.shared_store().subscriber_count(), 10);

        drop(nodes);
        assert_eq!(runtime.shared_store().subscriber_count(), 0);

        runtime.shared_store().update([("theme", "dark")]).unwrap();
        runtime.run_until_idle().unwrap();
    }

    #[test]
    fn test_unattached_component_destroys_router() {
        let runtime = Runtime::new();
        let router = MemoryRouter::new("");
        let source: Rc<dyn RouteSource> = Rc::new(router.clone());
        runtime
            .define("x-page", move |ctx| {
                let route = ctx.use_router(source.clone());
                Ok(move || text(route.request().path))
            })
            .unwrap();

        let node = runtime.create_element("x-page").unwrap();
        assert_eq!(router.listener_count(), 1);

        drop(node);
        assert!(router.is_destroyed());
        assert_eq!(router.listener_count(), 0);
    }

    #[test]
    fn test_router_rerenders_and_is_destroyed() {
        let runtime = Runtime::new();
        let router = MemoryRouter::new("");
        router.route("/users/:id", |_| Html::Empty);
        let source: Rc<dyn RouteSource> = Rc::new(router.clone());
        runtime
            .define("x-page", move |ctx| {
                let route = ctx.use_router(source.clone());
                Ok(move || text(route.request().path))
            })
            .unwrap();

        let node = runtime.create_element("x-page").unwrap();
        runtime.mount(&node).unwrap();
        assert_eq!(shadow_html(&node), "/");

        router.navigate("/users/9").unwrap();
        assert_eq!(shadow_html(&node), "/users/9");

        runtime.unmount(&node).unwrap();
        assert!(router.is_destroyed());
        assert_eq!(router.listener_count(), 0);
    }

    #[test]
    fn test_style_sheets_adopted_in_order() {
        let runtime = Runtime::new();
        let base = StyleSheet::new(":host { display: block }");
        let theme = StyleSheet::new("span { color: red }");
        let sheets = (base.clone(), theme.clone());
        runtime
            .define("x-styled", move |ctx| {
                ctx.use_style([sheets.0.clone()]);
                ctx.use_style([sheets.1.clone()]);
                Ok(|| Html::Empty)
            })
            .unwrap();

        let node = runtime.create_element("x-styled").unwrap();
        runtime.mount(&node).unwrap();

        let adopted = node.shadow_root().unwrap().adopted_style_sheets();
        assert_eq!(adopted.len(), 2);
        assert!(adopted[0].ptr_eq(&base));
        assert!(adopted[1].ptr_eq(&theme));
    }

    #[test]
    fn test_host_render_root() {
        let runtime = Runtime::with_config(RuntimeConfig::new().render_root(RenderRoot::Host));
        runtime.define("x-plain", |_| Ok(|| element("b").child("hi"))).unwrap();

        let node = runtime.create_element("x-plain").unwrap();
        runtime.mount(&node).unwrap();
        assert!(node.shadow_root().is_none());
        assert_eq!(node.inner_html(), "<b>hi</b>");
    }

    #[test]
    fn test_definitions() {
        let runtime = Runtime::new();
        runtime.define("X-One", |_| Ok(|| Html::Empty)).unwrap();

        let err = runtime.define("x-one", |_| Ok(|| Html::Empty)).unwrap_err();
        assert!(matches!(err, Error::DuplicateDefinition(tag) if tag == "x-one"));

        assert!(matches!(
            runtime.create_component("x-two"),
            Err(Error::UndefinedComponent(tag)) if tag == "x-two"
        ));
        let plain = runtime.create_element("x-two").unwrap();
        assert!(plain.component().is_none());
        assert!(runtime.create_element("X-ONE").unwrap().component().is_some());
    }
}
