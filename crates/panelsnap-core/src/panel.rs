#![forbid(unsafe_code)]

//! Panel flags and the fixed-size panel registry.

use bitflags::bitflags;

use crate::error::InitializationError;
use crate::gesture::Intent;

bitflags! {
    /// Visual state flags carried by a panel surface.
    ///
    /// In the browser these map to the `active` and `animate` classes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PanelFlags: u8 {
        /// The panel is the current one.
        const ACTIVE = 0b0000_0001;
        /// The panel is armed for its entrance animation.
        const ANIMATE = 0b0000_0010;
    }
}

impl PanelFlags {
    /// Flags applied to the panel being navigated to.
    pub const TARGET: Self = Self::ACTIVE.union(Self::ANIMATE);
}

/// Ordered panel bookkeeping: panel count (fixed at discovery) and the
/// current index.
///
/// Invariant: `current < len`, and `len >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelRegistry {
    len: usize,
    current: usize,
}

impl PanelRegistry {
    /// Create a registry for `len` discovered panels, starting at index 0.
    ///
    /// Fails when no panels were discovered.
    pub fn new(len: usize) -> Result<Self, InitializationError> {
        if len == 0 {
            return Err(InitializationError::NoPanels);
        }
        Ok(Self { len, current: 0 })
    }

    /// Number of panels.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; a registry cannot be built without panels.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Current panel index.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    /// Index of the last panel.
    #[inline]
    #[must_use]
    pub const fn last(&self) -> usize {
        self.len - 1
    }

    /// Whether `index` names a panel.
    #[inline]
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        index < self.len
    }

    /// Clamped target for an intent from the current index.
    #[must_use]
    pub fn target_for(&self, intent: Intent) -> usize {
        intent.target(self.current, self.len)
    }

    /// Move to `index`. Returns the previous index, or `None` if `index` is
    /// out of range (the registry is left untouched).
    pub fn set_current(&mut self, index: usize) -> Option<usize> {
        if !self.contains(index) {
            return None;
        }
        let prev = self.current;
        self.current = index;
        Some(prev)
    }

    /// Flags a settled panel at `index` should carry.
    #[must_use]
    pub fn flags_for(&self, index: usize) -> PanelFlags {
        if index == self.current {
            PanelFlags::TARGET
        } else {
            PanelFlags::empty()
        }
    }
}
