//! Router - the route source contract components bind to, plus an in-memory
//! implementation.
//!
//! A component that calls `use_router` re-renders on every route update and
//! releases the source when it detaches.
//!
//! # Matching
//!
//! [`MemoryRouter`] strips its base path, then tries patterns longest first.
//! A pattern matches when its segments are a prefix of the path's segments;
//! `:name` segments capture. The empty pattern matches only the root. With no
//! match the fallback view renders and `params` is empty.
//!
//! ```ignore
//! let router = MemoryRouter::new("/app");
//! router.route("/users/:id", |req| text(format!("user {}", req.params["id"])));
//! router.navigate("/app/users/7?tab=a&tab=b")?;
//!
//! assert_eq!(router.request().query["tab"], QueryValue::Many(vec!["a".into(), "b".into()]));
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use spark_signals::{Signal, signal};
use tracing::{debug, warn};

use crate::error::Result;
use crate::subscribers::{Listeners, Subscription};
use crate::template::Html;

/// A query parameter. Repeated keys collect into `Many`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    Many(Vec<String>),
}

impl QueryValue {
    /// The first value.
    pub fn first(&self) -> &str {
        match self {
            QueryValue::Single(value) => value,
            QueryValue::Many(values) => values.first().map_or("", String::as_str),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            QueryValue::Single(first) => {
                *self = QueryValue::Many(vec![std::mem::take(first), value]);
            }
            QueryValue::Many(values) => values.push(value),
        }
    }
}

/// The current route, read-only to components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub path: String,
    pub params: IndexMap<String, String>,
    pub query: IndexMap<String, QueryValue>,
}

pub type RouteFn = dyn Fn(&Request) -> Result<()>;

/// Where route updates come from.
pub trait RouteSource {
    /// The current request.
    fn request(&self) -> Request;

    /// Call `callback` after every route change.
    fn on_update(&self, callback: Box<RouteFn>) -> Subscription;

    /// Request a route change.
    fn navigate(&self, url: &str) -> Result<()>;

    /// Release every listener. Later navigations are ignored.
    fn destroy(&self);
}

// =============================================================================
// Memory Router
// =============================================================================

type ViewFn = dyn Fn(&Request) -> Html;

struct Route {
    pattern: String,
    segments: Vec<String>,
    view: Rc<ViewFn>,
}

struct RouterInner {
    base: String,
    routes: RefCell<Vec<Route>>,
    fallback: RefCell<Option<Rc<ViewFn>>>,
    url: RefCell<String>,
    matched: RefCell<Option<String>>,
    current: Signal<Request>,
    listeners: Listeners<RouteFn>,
    destroyed: Cell<bool>,
}

/// Route source driven by [`navigate`](RouteSource::navigate) calls.
#[derive(Clone)]
pub struct MemoryRouter {
    inner: Rc<RouterInner>,
}

impl MemoryRouter {
    /// Router at the root URL under `base`.
    pub fn new(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        let router = Self {
            inner: Rc::new(RouterInner {
                url: RefCell::new(format!("{base}/")),
                base,
                routes: RefCell::new(Vec::new()),
                fallback: RefCell::new(None),
                matched: RefCell::new(None),
                current: signal(Request::default()),
                listeners: Listeners::default(),
                destroyed: Cell::new(false),
            }),
        };
        router.resolve();
        router
    }

    /// Add a route. Patterns are tried longest first.
    pub fn route(&self, pattern: &str, view: impl Fn(&Request) -> Html + 'static) -> &Self {
        {
            let mut routes = self.inner.routes.borrow_mut();
            routes.push(Route {
                pattern: pattern.to_string(),
                segments: split_path(pattern),
                view: Rc::new(view),
            });
            routes.sort_by(|a, b| b.pattern.len().cmp(&a.pattern.len()));
        }
        self.resolve();
        self
    }

    /// View rendered when no route matches.
    pub fn fallback(&self, view: impl Fn(&Request) -> Html + 'static) -> &Self {
        *self.inner.fallback.borrow_mut() = Some(Rc::new(view));
        self
    }

    /// Pattern of the matched route, if any.
    pub fn matched(&self) -> Option<String> {
        self.inner.matched.borrow().clone()
    }

    /// The request as a signal, for reactive consumers.
    pub fn request_signal(&self) -> Signal<Request> {
        self.inner.current.clone()
    }

    /// Render the matched route's view (or the fallback) for the current request.
    pub fn render_view(&self) -> Html {
        let request = self.inner.current.get();
        let matched = self.matched();
        let view = matched.and_then(|pattern| {
            self.inner
                .routes
                .borrow()
                .iter()
                .find(|route| route.pattern == pattern)
                .map(|route| route.view.clone())
        });
        match view.or_else(|| self.inner.fallback.borrow().clone()) {
            Some(view) => view(&request),
            None => Html::Empty,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Recompute the request from the current URL.
    fn resolve(&self) -> Request {
        let url = self.inner.url.borrow().clone();
        let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
        let query = query.split('#').next().unwrap_or_default();
        let path = path.split('#').next().unwrap_or_default();

        let local = path.strip_prefix(self.inner.base.as_str()).unwrap_or(path);
        let segments = split_path(local);

        let mut params = IndexMap::new();
        let mut matched = None;
        for route in self.inner.routes.borrow().iter() {
            if let Some(captured) = match_segments(&route.segments, &segments) {
                params = captured;
                matched = Some(route.pattern.clone());
                break;
            }
        }

        let request = Request {
            path: path.to_string(),
            params,
            query: parse_query(query),
        };
        *self.inner.matched.borrow_mut() = matched;
        self.inner.current.set(request.clone());
        request
    }
}

impl RouteSource for MemoryRouter {
    fn request(&self) -> Request {
        self.inner.current.get()
    }

    fn on_update(&self, callback: Box<RouteFn>) -> Subscription {
        self.inner.listeners.add(callback, false)
    }

    fn navigate(&self, url: &str) -> Result<()> {
        if self.inner.destroyed.get() {
            warn!(url, "navigate on a destroyed router");
            return Ok(());
        }
        *self.inner.url.borrow_mut() = url.to_string();
        let request = self.resolve();
        debug!(path = %request.path, route = ?self.matched(), "navigate");

        self.inner.listeners.run(|callback| callback(&request))
    }

    fn destroy(&self) {
        self.inner.destroyed.set(true);
        self.inner.listeners.clear();
    }
}

impl fmt::Debug for MemoryRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRouter")
            .field("base", &self.inner.base)
            .field("url", &*self.inner.url.borrow())
            .field("matched", &*self.inner.matched.borrow())
            .finish()
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

fn match_segments(pattern: &[String], path: &[String]) -> Option<IndexMap<String, String>> {
    if pattern.is_empty() {
        return path.is_empty().then(IndexMap::new);
    }
    if pattern.len() > path.len() {
        return None;
    }

    let mut params = IndexMap::new();
    for (expected, actual) in pattern.iter().zip(path) {
        match expected.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), actual.clone());
            }
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}

fn parse_query(query: &str) -> IndexMap<String, QueryValue> {
    let mut parsed: IndexMap<String, QueryValue> = IndexMap::new();
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key.is_empty() {
            continue;
        }
        match parsed.get_mut(key) {
            Some(existing) => existing.push(value.to_string()),
            None => {
                parsed.insert(key.to_string(), QueryValue::Single(value.to_string()));
            }
        }
    }
    parsed
}
