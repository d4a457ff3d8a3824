#![forbid(unsafe_code)]

//! Error types.

/// Controller setup failed.
///
/// This is the only error the controller surfaces. Everything else
/// (out-of-range indices, requests while locked) is a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitializationError {
    /// No panel surfaces were found in the container scope.
    NoPanels,
}

impl core::fmt::Display for InitializationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoPanels => write!(f, "no panel elements found"),
        }
    }
}

impl std::error::Error for InitializationError {}

/// Errors that can occur when building or loading a [`SnapConfig`](crate::SnapConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// JSON parse error.
    #[cfg(feature = "config-serde")]
    Json(serde_json::Error),
    /// TOML parse error.
    #[cfg(feature = "config-serde")]
    Toml(toml::de::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            #[cfg(feature = "config-serde")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            #[cfg(feature = "config-serde")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "config-serde")]
            Self::Json(e) => Some(e),
            #[cfg(feature = "config-serde")]
            Self::Toml(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
