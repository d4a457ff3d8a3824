#![forbid(unsafe_code)]

//! Host environment classification.

/// Where the controller is running.
///
/// Outside an interactive browser (server-side prerendering, workers, native
/// test hosts that opt out) every lifecycle operation is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HostEnvironment {
    /// A live document with a window, input events, and a scrollable viewport.
    #[default]
    Browser,
    /// A rendering context without user interaction.
    NonInteractive,
}

impl HostEnvironment {
    /// Whether DOM wiring and input handling should happen at all.
    #[inline]
    #[must_use]
    pub const fn is_interactive(self) -> bool {
        matches!(self, Self::Browser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_browser_is_interactive() {
        assert!(HostEnvironment::Browser.is_interactive());
        assert!(!HostEnvironment::NonInteractive.is_interactive());
        assert_eq!(HostEnvironment::default(), HostEnvironment::Browser);
    }
}
