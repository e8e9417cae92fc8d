//! Style sheets adopted by render roots.

use std::fmt;
use std::rc::Rc;

/// An externally constructed style sheet.
///
/// Sheets are shared, not copied: adopting the same sheet in many roots
/// keeps one instance.
#[derive(Clone, PartialEq, Eq)]
pub struct StyleSheet {
    css: Rc<str>,
}

impl StyleSheet {
    pub fn new(css: impl AsRef<str>) -> Self {
        Self {
            css: Rc::from(css.as_ref()),
        }
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn ptr_eq(&self, other: &StyleSheet) -> bool {
        Rc::ptr_eq(&self.css, &other.css)
    }
}

impl fmt::Debug for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StyleSheet").field(&self.css()).finish()
    }
}
