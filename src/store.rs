//! Reactive Store - a key/value snapshot with coalesced, deferred flushes.
//!
//! # Coalescing
//!
//! `update` merges into a pending payload. The first update of a turn posts a
//! flush to the [`Scheduler`]; later updates in the same turn only merge (last
//! write per key wins). When the flush runs it applies the merged payload to the
//! snapshot, clears the pending state, then notifies every subscriber once with
//! the payload it applied.
//!
//! ```text
//! update({a: 1})  ──┐
//! update({b: 2})  ──┼─► pending {a: 3, b: 2} ──(next turn)──► snapshot ∪ pending ──► notify once
//! update({a: 3})  ──┘
//! ```
//!
//! The same type backs component-local state and the shared store handed out by
//! the [`Runtime`](crate::Runtime).

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::config::{FlushMode, StoreOptions};
use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::subscribers::{Listeners, Subscription};
use crate::types::{Payload, Value};

/// Store subscriber. Receives the payload that was just applied.
pub type StoreFn = dyn Fn(&Payload) -> Result<()>;

struct StoreInner {
    snapshot: RefCell<Payload>,
    pending: RefCell<Payload>,
    scheduled: Cell<bool>,
    mode: FlushMode,
    scheduler: Scheduler,
    listeners: Listeners<StoreFn>,
    flushes: Cell<u64>,
}

impl StoreInner {
    fn flush(&self) -> Result<()> {
        let payload = std::mem::take(&mut *self.pending.borrow_mut());
        self.scheduled.set(false);
        self.apply(payload)
    }

    fn apply(&self, payload: Payload) -> Result<()> {
        {
            let mut snapshot = self.snapshot.borrow_mut();
            for (key, value) in &payload {
                snapshot.insert(key.clone(), value.clone());
            }
        }
        self.flushes.set(self.flushes.get() + 1);
        debug!(keys = payload.len(), flush = self.flushes.get(), "store flush");

        self.listeners.run(|callback| callback(&payload))
    }
}

/// Cloneable handle to a reactive store.
#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

impl Store {
    /// Empty store with deferred flushes on `scheduler`.
    pub fn new(scheduler: &Scheduler) -> Self {
        Self::with_options(scheduler, StoreOptions::default())
    }

    pub fn with_options(scheduler: &Scheduler, options: StoreOptions) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                snapshot: RefCell::new(options.data),
                pending: RefCell::new(Payload::new()),
                scheduled: Cell::new(false),
                mode: options.mode,
                scheduler: scheduler.clone(),
                listeners: Listeners::default(),
                flushes: Cell::new(0),
            }),
        }
    }

    /// Copy of the current snapshot.
    pub fn get(&self) -> Payload {
        self.inner.snapshot.borrow().clone()
    }

    /// Read the snapshot without copying it.
    pub fn with<R>(&self, f: impl FnOnce(&Payload) -> R) -> R {
        f(&self.inner.snapshot.borrow())
    }

    /// Current value for `key`, `Value::Null` when absent.
    pub fn value(&self, key: &str) -> Value {
        self.inner.snapshot.borrow().get(key).cloned().unwrap_or_default()
    }

    /// Write an initial value straight into the snapshot. No flush, no notification.
    pub fn seed(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.inner.snapshot.borrow_mut().insert(key.into(), value.into());
    }

    /// Merge `partial` into the pending payload and make sure a flush is scheduled.
    ///
    /// In [`FlushMode::Immediate`] the payload is applied and subscribers are
    /// notified before this returns, so their failures surface here.
    pub fn update<K, V>(&self, partial: impl IntoIterator<Item = (K, V)>) -> Result<()>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let partial: Payload = partial
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        if self.inner.mode == FlushMode::Immediate {
            return self.inner.apply(partial);
        }

        self.inner.pending.borrow_mut().extend(partial);

        if !self.inner.scheduled.replace(true) {
            let weak = Rc::downgrade(&self.inner);
            self.inner.scheduler.post(move || match weak.upgrade() {
                Some(inner) => inner.flush(),
                None => Ok(()),
            });
        }
        Ok(())
    }

    /// Subscribe to every flush.
    pub fn subscribe(&self, callback: impl Fn(&Payload) -> Result<()> + 'static) -> Subscription {
        self.inner.listeners.add(Box::new(callback), false)
    }

    /// Subscribe to the next flush only.
    pub fn subscribe_once(&self, callback: impl Fn(&Payload) -> Result<()> + 'static) -> Subscription {
        self.inner.listeners.add(Box::new(callback), true)
    }

    /// True while a flush is posted but has not run.
    pub fn is_flush_scheduled(&self) -> bool {
        self.inner.scheduled.get()
    }

    /// Number of flushes applied so far.
    pub fn flush_count(&self) -> u64 {
        self.inner.flushes.get()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.len()
    }

    pub fn ptr_eq(&self, other: &Store) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("snapshot", &*self.inner.snapshot.borrow())
            .field("scheduled", &self.inner.scheduled.get())
            .field("mode", &self.inner.mode)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
