//! Error types.
//!
//! Lookup and validation failures are how callers learn that a write did not
//! take effect, so they are always returned, never logged and dropped.

use thiserror::Error;

use crate::types::PropertyType;

/// A value that could not be validated against a declared type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{found} is not assignable to type {expected}")]
pub struct TypeMismatch {
    /// The type the value was checked against.
    pub expected: PropertyType,
    /// Diagnostic rendering of the rejected value.
    pub found: String,
}

#[derive(Debug, Error)]
pub enum Error {
    /// Write to a name that is not in the component's property model.
    #[error("property '{name}' is not declared on <{component}>")]
    UnknownProperty { component: String, name: String },

    /// Value failed validation. The previous value is retained.
    #[error("property '{property}' rejected a value")]
    TypeMismatch {
        property: String,
        #[source]
        source: TypeMismatch,
    },

    /// A notified callback failed. Remaining callbacks of that pass did not run.
    #[error(transparent)]
    SubscriberCallback(#[from] anyhow::Error),

    /// A component was requested for a tag that was never defined.
    #[error("no component is defined for <{0}>")]
    UndefinedComponent(String),

    /// A tag was defined twice.
    #[error("component <{0}> is already defined")]
    DuplicateDefinition(String),

    /// A lifecycle hook name outside the closed set.
    #[error("unknown lifecycle hook '{0}'")]
    UnknownHook(String),
}

impl Error {
    /// Wrap any failure raised from inside a callback.
    pub fn callback(message: impl std::fmt::Display + std::fmt::Debug + Send + Sync + 'static) -> Self {
        Self::SubscriberCallback(anyhow::Error::msg(message))
    }

    pub fn is_unknown_property(&self) -> bool {
        matches!(self, Self::UnknownProperty { .. })
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
