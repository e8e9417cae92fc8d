//! Core types for mova.
//!
//! These types flow through every layer: property values, store payloads,
//! subscriber arguments and template bindings are all [`Value`]s.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::Result;
use crate::host::Node;

/// Key-ordered mapping used for records, store snapshots and payloads.
///
/// Insertion order is significant: class projections and attribute ingestion
/// follow it.
pub type Payload = IndexMap<String, Value>;

// =============================================================================
// Callable
// =============================================================================

/// A shared function value.
///
/// Identity is pointer identity: two clones of the same `Callable` are equal,
/// two separately constructed closures never are.
#[derive(Clone)]
pub struct Callable(Rc<dyn Fn(&[Value]) -> Result<Value>>);

impl Callable {
    pub fn new(f: impl Fn(&[Value]) -> Result<Value> + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke with the given arguments.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.0)(args)
    }

    /// True if both handles point at the same function.
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

// =============================================================================
// Value
// =============================================================================

/// Dynamically typed value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Record(Payload),
    Function(Callable),
    Node(Node),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Node(a), Value::Node(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Value {
    /// Wrap a closure as a function value.
    pub fn function(f: impl Fn(&[Value]) -> Result<Value> + 'static) -> Self {
        Value::Function(Callable::new(f))
    }

    /// Build a record from `(key, value)` pairs, keeping their order.
    pub fn record<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Record(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Payload> {
        match self {
            Value::Record(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Truthiness: null, `false`, zero, NaN and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::List(_) | Value::Record(_) | Value::Function(_) | Value::Node(_) => true,
        }
    }

    /// Numeric coercion. Returns NaN when the value has no numeric reading.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Bool(true) => 1.0,
            Value::Bool(false) => 0.0,
            Value::Number(n) => *n,
            Value::String(s) => parse_number(s),
            Value::List(items) => match items.as_slice() {
                [] => 0.0,
                [single] => single
                    .to_display_string()
                    .map_or(f64::NAN, |s| parse_number(&s)),
                _ => f64::NAN,
            },
            Value::Null | Value::Record(_) | Value::Function(_) | Value::Node(_) => f64::NAN,
        }
    }

    /// String conversion, if the value has one.
    ///
    /// Scalars and lists convert; null, records, functions and nodes don't.
    pub fn to_display_string(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(format_number(*n)),
            Value::String(s) => Some(s.clone()),
            Value::List(items) => Some(
                items
                    .iter()
                    .map(|item| item.to_display_string().unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            Value::Null | Value::Record(_) | Value::Function(_) | Value::Node(_) => None,
        }
    }

    /// Short rendering for error messages.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::String(s) => format!("{s:?}"),
            Value::Record(map) => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                format!("{{{}}}", keys.join(", "))
            }
            Value::Function(_) => "function".to_string(),
            Value::Node(node) => format!("<{}>", node.tag_name()),
            other => other.to_display_string().unwrap_or_default(),
        }
    }
}

fn parse_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    let (sign, body) = match s.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, s.strip_prefix('+').unwrap_or(s)),
    };
    if body == "Infinity" {
        return sign * f64::INFINITY;
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            if digits.starts_with(['+', '-']) {
                return f64::NAN;
            }
            return u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
        }
    }
    // Rust also accepts "inf" and "nan" spellings; those are not numbers here.
    if body.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn format_number(n: f64) -> String {
    if n.is_infinite() {
        if n > 0.0 { "Infinity".into() } else { "-Infinity".into() }
    } else {
        n.to_string()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Number(value as f64)
                }
            }
        )*
    };
}

impl_from_number!(f64, f32, i32, i64, u32, u64, usize);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Payload> for Value {
    fn from(value: Payload) -> Self {
        Value::Record(value)
    }
}

impl From<Callable> for Value {
    fn from(value: Callable) -> Self {
        Value::Function(value)
    }
}

impl From<Node> for Value {
    fn from(value: Node) -> Self {
        Value::Node(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

// =============================================================================
// Property Type
// =============================================================================

/// Primitive type descriptor a property is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertyType {
    String,
    Number,
    Boolean,
    List,
    Record,
    Function,
    /// No declared type; any value passes.
    #[default]
    Unconstrained,
}

impl PropertyType {
    pub fn name(self) -> &'static str {
        match self {
            PropertyType::String => "String",
            PropertyType::Number => "Number",
            PropertyType::Boolean => "Boolean",
            PropertyType::List => "List",
            PropertyType::Record => "Record",
            PropertyType::Function => "Function",
            PropertyType::Unconstrained => "Unconstrained",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_coercion() {
        assert_eq!(Value::from("5").to_number(), 5.0);
        assert_eq!(Value::from(" 2.5 ").to_number(), 2.5);
        assert_eq!(Value::from("").to_number(), 0.0);
        assert_eq!(Value::from("0x1F").to_number(), 31.0);
        assert_eq!(Value::from("-Infinity").to_number(), f64::NEG_INFINITY);
        assert_eq!(Value::from(true).to_number(), 1.0);
        assert_eq!(Value::List(vec![Value::from("7")]).to_number(), 7.0);
        assert!(Value::from("abc").to_number().is_nan());
        assert!(Value::from("inf").to_number().is_nan());
        assert!(Value::from("0x+1F").to_number().is_nan());
        assert!(Value::from("0b-1").to_number().is_nan());
        assert!(Value::from("-0x1F").to_number().is_nan());
        assert!(Value::Null.to_number().is_nan());
        assert!(Value::record([("a", 1)]).to_number().is_nan());
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("false").is_truthy());
        assert!(Value::List(vec![]).is_truthy());
    }

    #[test]
    fn test_display_string() {
        assert_eq!(Value::from(5).to_display_string().as_deref(), Some("5"));
        assert_eq!(Value::from(0.5).to_display_string().as_deref(), Some("0.5"));
        assert_eq!(
            Value::List(vec![1.into(), "a".into(), Value::Null]).to_display_string().as_deref(),
            Some("1,a,")
        );
        assert_eq!(Value::record([("a", 1)]).to_display_string(), None);
        assert_eq!(Value::Null.to_display_string(), None);
    }

    #[test]
    fn test_callable_identity() {
        let f = Callable::new(|_| Ok(Value::Null));
        let g = Callable::new(|_| Ok(Value::Null));
        assert_eq!(Value::from(f.clone()), Value::from(f.clone()));
        assert_ne!(Value::from(f), Value::from(g));
    }

    #[test]
    fn test_record_keeps_order() {
        let record = Value::record([("b", 1), ("a", 2), ("c", 3)]);
        let keys: Vec<&String> = record.as_record().map(|m| m.keys().collect()).unwrap_or_default();
        assert_eq!(keys, ["b", "a", "c"]);
    }
}
