//! Property Model - a component's declared, externally settable values.
//!
//! Every write is resolved against the declared names and validated against
//! the declared type before it is stored. Undeclared names are rejected, never
//! passed through.
//!
//! # Example
//!
//! ```ignore
//! use mova::{PropertyDef, PropertyFlags, PropertyModel, PropertyType};
//!
//! let mut model = PropertyModel::new();
//! model.declare(
//!     "count",
//!     PropertyDef::new(PropertyType::Number)
//!         .default_value(0)
//!         .flags(PropertyFlags::BIND_TO_ATTRIBUTE),
//! )?;
//!
//! let (entry, value) = model.write("x-counter", "COUNT", "5".into())?;
//! assert_eq!(value, Value::Number(5.0));
//! ```

use bitflags::bitflags;
use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::types::{Payload, PropertyType, Value};
use crate::validation::validate;

bitflags! {
    /// Side effects a property write carries beyond storing the value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PropertyFlags: u8 {
        const NONE = 0;
        /// Reflect the value to the host attribute of the same (lower-cased) name.
        const BIND_TO_ATTRIBUTE = 1 << 0;
        /// Merge the value into the component's local store.
        const BIND_TO_STATE = 1 << 1;
    }
}

/// Declaration of one property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDef {
    pub ty: PropertyType,
    pub default: Option<Value>,
    pub flags: PropertyFlags,
}

impl PropertyDef {
    pub fn new(ty: PropertyType) -> Self {
        Self {
            ty,
            ..Self::default()
        }
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn flags(mut self, flags: PropertyFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn bind_to_attribute(mut self) -> Self {
        self.flags |= PropertyFlags::BIND_TO_ATTRIBUTE;
        self
    }

    pub fn bind_to_state(mut self) -> Self {
        self.flags |= PropertyFlags::BIND_TO_STATE;
        self
    }
}

impl From<PropertyType> for PropertyDef {
    fn from(ty: PropertyType) -> Self {
        Self::new(ty)
    }
}

/// A declared property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry {
    pub name: String,
    pub ty: PropertyType,
    /// The validated default, if one was declared.
    pub default: Option<Value>,
    pub flags: PropertyFlags,
}

impl PropertyEntry {
    /// Host attribute the property is mirrored to.
    pub fn attribute_name(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    pub fn binds_to_attribute(&self) -> bool {
        self.flags.contains(PropertyFlags::BIND_TO_ATTRIBUTE)
    }

    pub fn binds_to_state(&self) -> bool {
        self.flags.contains(PropertyFlags::BIND_TO_STATE)
    }
}

/// Declared properties and their current values.
#[derive(Debug, Clone, Default)]
pub struct PropertyModel {
    entries: IndexMap<String, PropertyEntry>,
    values: Payload,
}

impl PropertyModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name`, applying its default immediately.
    ///
    /// Redeclaring a name replaces the earlier declaration. A default that
    /// fails validation is rejected and nothing is declared.
    pub fn declare(&mut self, name: &str, def: impl Into<PropertyDef>) -> Result<&PropertyEntry> {
        let def = def.into();
        let default = match def.default {
            Some(raw) => Some(validate(def.ty, raw).map_err(|source| Error::TypeMismatch {
                property: name.to_string(),
                source,
            })?),
            None => None,
        };

        self.values
            .insert(name.to_string(), default.clone().unwrap_or_default());
        let entry = PropertyEntry {
            name: name.to_string(),
            ty: def.ty,
            default,
            flags: def.flags,
        };
        self.entries.insert(name.to_string(), entry);
        Ok(&self.entries[name])
    }

    /// Find a declared property, exact name first, then ignoring ASCII case.
    pub fn resolve(&self, name: &str) -> Option<&PropertyEntry> {
        self.entries.get(name).or_else(|| {
            self.entries
                .values()
                .find(|entry| entry.name.eq_ignore_ascii_case(name))
        })
    }

    /// Current value of a declared property.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let entry = self.resolve(name)?;
        self.values.get(&entry.name)
    }

    /// Every property value, in declaration order.
    pub fn values(&self) -> &Payload {
        &self.values
    }

    pub fn entries(&self) -> impl Iterator<Item = &PropertyEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve, validate and store a write.
    ///
    /// Returns the entry and the stored value so the caller can run the
    /// write's side effects. On failure nothing is changed.
    pub fn write(&mut self, component: &str, name: &str, raw: Value) -> Result<(PropertyEntry, Value)> {
        let entry = self
            .resolve(name)
            .cloned()
            .ok_or_else(|| Error::UnknownProperty {
                component: component.to_string(),
                name: name.to_string(),
            })?;

        let value = validate(entry.ty, raw).map_err(|source| Error::TypeMismatch {
            property: entry.name.clone(),
            source,
        })?;

        self.values.insert(entry.name.clone(), value.clone());
        Ok((entry, value))
    }
}
