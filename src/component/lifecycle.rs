//! Lifecycle hooks and phases.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The closed set of hooks setup code can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleHook {
    /// After the first render pass.
    Mounted,
    /// After detach.
    Unmounted,
    /// After every render pass.
    Updated,
    /// Before every render pass.
    WillUpdate,
}

impl LifecycleHook {
    pub const ALL: [LifecycleHook; 4] = [
        LifecycleHook::Mounted,
        LifecycleHook::Unmounted,
        LifecycleHook::Updated,
        LifecycleHook::WillUpdate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleHook::Mounted => "mounted",
            LifecycleHook::Unmounted => "unmounted",
            LifecycleHook::Updated => "updated",
            LifecycleHook::WillUpdate => "willUpdate",
        }
    }
}

impl fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleHook {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|hook| hook.as_str() == s)
            .ok_or_else(|| Error::UnknownHook(s.to_string()))
    }
}

/// Where a component is in its single attach/detach cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Setup has run; not in a connected tree yet.
    #[default]
    Constructed,
    /// Rendering.
    Attached,
    /// Torn down for good.
    Detached,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_names() {
        for hook in LifecycleHook::ALL {
            assert_eq!(hook.as_str().parse::<LifecycleHook>().unwrap(), hook);
        }
        assert_eq!(LifecycleHook::WillUpdate.to_string(), "willUpdate");
        assert!(matches!(
            "wilUpdate".parse::<LifecycleHook>(),
            Err(Error::UnknownHook(name)) if name == "wilUpdate"
        ));
    }
}
