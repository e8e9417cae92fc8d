//! Subscriber Registry - per-component callback lists keyed by (category, key).
//!
//! # API
//!
//! - `subscribe(category, key, fn)` - register a callback, returns a [`Subscription`]
//! - `notify(category, key, args)` - run every callback registered under the pair
//!
//! Callbacks run synchronously in registration order. A failing callback
//! aborts the pass and its error is returned to the notifier; callers that
//! need isolation guard their own callbacks.
//!
//! # Example
//!
//! ```ignore
//! use mova::{Category, SubscriberRegistry};
//!
//! let registry = SubscriberRegistry::new();
//! let sub = registry.subscribe(Category::Lifecycle, "mounted", |_| {
//!     println!("mounted");
//!     Ok(())
//! });
//!
//! registry.notify(Category::Lifecycle, "mounted", &[])?;
//! sub.unsubscribe();
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::Result;
use crate::types::Value;

// =============================================================================
// Subscription
// =============================================================================

/// Handle returned by every subscribe call.
///
/// Dropping it does NOT unsubscribe; call [`Subscription::unsubscribe`].
pub struct Subscription {
    cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: RefCell::new(Some(Box::new(cancel))),
        }
    }

    /// A subscription that was never registered anywhere.
    pub fn inert() -> Self {
        Self {
            cancel: RefCell::new(None),
        }
    }

    /// Stop future invocations. Idempotent.
    pub fn unsubscribe(&self) {
        let cancel = self.cancel.borrow_mut().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.borrow().is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

// =============================================================================
// Listener List
// =============================================================================

/// One registered callback.
pub(crate) struct Listener<F: ?Sized> {
    id: usize,
    once: bool,
    live: Cell<bool>,
    pub(crate) callback: Box<F>,
}

impl<F: ?Sized> Listener<F> {
    pub(crate) fn is_live(&self) -> bool {
        self.live.get()
    }
}

struct ListenersInner<F: ?Sized> {
    entries: Vec<Rc<Listener<F>>>,
    next_id: usize,
}

/// Ordered callback list with snapshot iteration.
///
/// Shared by the registry, stores and route sources.
pub(crate) struct Listeners<F: ?Sized> {
    inner: Rc<RefCell<ListenersInner<F>>>,
}

impl<F: ?Sized> Clone for Listeners<F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListenersInner {
                entries: Vec::new(),
                next_id: 0,
            })),
        }
    }
}

impl<F: ?Sized + 'static> Listeners<F> {
    pub(crate) fn add(&self, callback: Box<F>, once: bool) -> Subscription {
        let listener = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            let listener = Rc::new(Listener {
                id,
                once,
                live: Cell::new(true),
                callback,
            });
            inner.entries.push(listener.clone());
            listener
        };

        let id = listener.id;
        let list: Weak<RefCell<ListenersInner<F>>> = Rc::downgrade(&self.inner);
        let entry = Rc::downgrade(&listener);
        Subscription::new(move || {
            if let Some(entry) = entry.upgrade() {
                entry.live.set(false);
            }
            if let Some(list) = list.upgrade() {
                list.borrow_mut().entries.retain(|l| l.id != id);
            }
        })
    }

    /// Entries live right now, in registration order.
    fn snapshot(&self) -> Vec<Rc<Listener<F>>> {
        self.inner.borrow().entries.iter().filter(|l| l.is_live()).cloned().collect()
    }

    /// Invoke every entry in the current snapshot. The first failure stops the
    /// pass.
    ///
    /// A one-shot entry is retired once its own callback has run, so entries a
    /// failed pass never reached stay registered.
    pub(crate) fn run(&self, mut call: impl FnMut(&F) -> Result<()>) -> Result<()> {
        for listener in self.snapshot() {
            if listener.once && !listener.is_live() {
                continue;
            }
            let result = call(&*listener.callback);
            if listener.once {
                self.retire(&listener);
            }
            result?;
        }
        Ok(())
    }

    fn retire(&self, listener: &Listener<F>) {
        listener.live.set(false);
        self.inner.borrow_mut().entries.retain(|l| l.id != listener.id);
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub(crate) fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        for entry in &inner.entries {
            entry.live.set(false);
        }
        inner.entries.clear();
    }
}

// =============================================================================
// Subscriber Registry
// =============================================================================

/// What a subscription listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// A local state slot changed, keyed by slot id.
    State,
    /// A property was written, keyed by property name.
    Property,
    /// A reference slot was set, keyed by reference id.
    Reference,
    /// A lifecycle hook fired, keyed by hook name.
    Lifecycle,
}

/// Callback type stored in the registry.
pub type SubscriberFn = dyn Fn(&[Value]) -> Result<()>;

/// Per-component mapping from (category, key) to ordered callbacks.
#[derive(Clone, Default)]
pub struct SubscriberRegistry {
    lists: Rc<RefCell<HashMap<(Category, String), Listeners<SubscriberFn>>>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `(category, key)`.
    pub fn subscribe<F>(&self, category: Category, key: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&[Value]) -> Result<()> + 'static,
    {
        let list = self
            .lists
            .borrow_mut()
            .entry((category, key.into()))
            .or_default()
            .clone();
        list.add(Box::new(callback), false)
    }

    /// Invoke every callback live under `(category, key)` when the pass starts.
    ///
    /// Callbacks added during the pass wait for the next one. A callback
    /// unsubscribed during the pass still runs if it was already in it.
    pub fn notify(&self, category: Category, key: &str, args: &[Value]) -> Result<()> {
        let list = self.lists.borrow().get(&(category, key.to_string())).cloned();
        let Some(list) = list else { return Ok(()) };

        list.run(|callback| callback(args))
    }

    /// Number of callbacks currently registered under the pair.
    pub fn count(&self, category: Category, key: &str) -> usize {
        self.lists
            .borrow()
            .get(&(category, key.to_string()))
            .map_or(0, Listeners::len)
    }

    /// Drop every registration.
    pub fn clear(&self) {
        let lists: Vec<_> = self.lists.borrow_mut().drain().map(|(_, list)| list).collect();
        for list in lists {
            list.clear();
        }
    }
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("keys", &self.lists.borrow().len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_notify_in_registration_order() {
        let registry = SubscriberRegistry::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for n in 0..3 {
            let log = log.clone();
            registry.subscribe(Category::Property, "count", move |args| {
                log.borrow_mut().push((n, args[0].clone()));
                Ok(())
            });
        }

        registry.notify(Category::Property, "count", &[Value::from(7)]).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![(0, Value::from(7)), (1, Value::from(7)), (2, Value::from(7))]
        );
    }

    #[test]
    fn test_exact_pair_only() {
        let registry = SubscriberRegistry::new();
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        registry.subscribe(Category::State, "a", move |_| {
            count_clone.set(count_clone.get() + 1);
            Ok(())
        });

        registry.notify(Category::Property, "a", &[]).unwrap();
        registry.notify(Category::State, "b", &[]).unwrap();
        assert_eq!(count.get(), 0);

        registry.notify(Category::State, "a", &[]).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_missing_pair_is_noop() {
        let registry = SubscriberRegistry::new();
        assert!(registry.notify(Category::Lifecycle, "mounted", &[]).is_ok());
    }

    #[test]
    fn test_unsubscribe() {
        let registry = SubscriberRegistry::new();
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        let sub = registry.subscribe(Category::Lifecycle, "updated", move |_| {
            count_clone.set(count_clone.get() + 1);
            Ok(())
        });

        registry.notify(Category::Lifecycle, "updated", &[]).unwrap();
        sub.unsubscribe();
        sub.unsubscribe();
        registry.notify(Category::Lifecycle, "updated", &[]).unwrap();

        assert_eq!(count.get(), 1);
        assert!(!sub.is_active());
        assert_eq!(registry.count(Category::Lifecycle, "updated"), 0);
    }

    #[test]
    fn test_unsubscribe_during_pass() {
        let registry = SubscriberRegistry::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let second: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let log_a = log.clone();
        let second_a = second.clone();
        registry.subscribe(Category::State, "x", move |_| {
            log_a.borrow_mut().push("a");
            if let Some(sub) = second_a.borrow().as_ref() {
                sub.unsubscribe();
            }
            Ok(())
        });

        let log_b = log.clone();
        let sub_b = registry.subscribe(Category::State, "x", move |_| {
            log_b.borrow_mut().push("b");
            Ok(())
        });
        *second.borrow_mut() = Some(sub_b);

        // "b" was already part of this pass.
        registry.notify(Category::State, "x", &[]).unwrap();
        assert_eq!(*log.borrow(), vec!["a", "b"]);

        // ...but never again.
        registry.notify(Category::State, "x", &[]).unwrap();
        assert_eq!(*log.borrow(), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_subscribe_during_pass_waits() {
        let registry = SubscriberRegistry::new();
        let count = Rc::new(Cell::new(0));

        let registry_clone = registry.clone();
        let count_clone = count.clone();
        registry.subscribe(Category::State, "x", move |_| {
            let count = count_clone.clone();
            registry_clone.subscribe(Category::State, "x", move |_| {
                count.set(count.get() + 1);
                Ok(())
            });
            Ok(())
        });

        registry.notify(Category::State, "x", &[]).unwrap();
        assert_eq!(count.get(), 0);

        registry.notify(Category::State, "x", &[]).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_failure_aborts_pass() {
        let registry = SubscriberRegistry::new();
        let reached = Rc::new(Cell::new(false));
        let reached_clone = reached.clone();

        registry.subscribe(Category::Lifecycle, "mounted", |_| Err(Error::callback("boom")));
        registry.subscribe(Category::Lifecycle, "mounted", move |_| {
            reached_clone.set(true);
            Ok(())
        });

        let err = registry.notify(Category::Lifecycle, "mounted", &[]).unwrap_err();
        assert!(matches!(err, Error::SubscriberCallback(_)));
        assert_eq!(err.to_string(), "boom");
        assert!(!reached.get());
    }

    #[test]
    fn test_once_listener() {
        let listeners: Listeners<dyn Fn() -> usize> = Listeners::default();
        listeners.add(Box::new(|| 1), true);
        listeners.add(Box::new(|| 2), false);

        let collect = || {
            let seen = RefCell::new(Vec::new());
            listeners
                .run(|callback| {
                    seen.borrow_mut().push(callback());
                    Ok(())
                })
                .unwrap();
            seen.into_inner()
        };
        assert_eq!(collect(), vec![1, 2]);
        assert_eq!(collect(), vec![2]);
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn test_once_listener_survives_failed_pass() {
        let listeners: Listeners<dyn Fn() -> Result<()>> = Listeners::default();
        let fail = Rc::new(Cell::new(true));
        let calls = Rc::new(Cell::new(0));

        let fail_clone = fail.clone();
        listeners.add(
            Box::new(move || {
                if fail_clone.get() {
                    Err(Error::callback("boom"))
                } else {
                    Ok(())
                }
            }),
            false,
        );
        let calls_clone = calls.clone();
        listeners.add(
            Box::new(move || {
                calls_clone.set(calls_clone.get() + 1);
                Ok(())
            }),
            true,
        );

        assert!(listeners.run(|callback| callback()).is_err());
        assert_eq!(calls.get(), 0);
        assert_eq!(listeners.len(), 2);

        fail.set(false);
        listeners.run(|callback| callback()).unwrap();
        listeners.run(|callback| callback()).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(listeners.len(), 1);
    }
}
