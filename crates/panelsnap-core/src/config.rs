#![forbid(unsafe_code)]

//! Controller configuration.
//!
//! Captures every tunable of the scroll controller in one [`SnapConfig`].
//! Defaults reproduce the shipped landing-page behavior; the optional
//! `config-serde` feature loads overrides from JSON or TOML.
//!
//! # Loading
//!
//! ```toml
//! cooldown_ms = 200
//! transition_ms = 800
//! unlock_policy = "timed"
//!
//! [gesture]
//! touch_threshold = 40.0
//!
//! [markup]
//! panel_selector = "section.slide"
//! ```
//!
//! ```rust,ignore
//! let config = SnapConfig::from_toml_str(text)?;
//! let config = SnapConfig::from_json_str(r#"{"cooldown_ms": 200}"#)?;
//! ```
//!
//! Missing keys keep their defaults. Loaded configs are validated before
//! they are returned.

use core::time::Duration;

#[cfg(feature = "config-serde")]
use serde::{Deserialize, Serialize};

use crate::animation::AnimationVocabulary;
use crate::error::ConfigError;
use crate::gate::DEFAULT_COOLDOWN;
use crate::gesture::GestureConfig;

/// Default time a transition holds the lock.
pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_millis(1000);

/// Default delay between "view ready" and panel discovery.
pub const DEFAULT_INIT_DELAY: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// UnlockPolicy
// ---------------------------------------------------------------------------

/// How an in-flight transition releases the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-serde", serde(rename_all = "snake_case"))]
pub enum UnlockPolicy {
    /// Release exactly when the transition duration has elapsed, however
    /// long the visual motion actually takes.
    #[default]
    Timed,
    /// Release on the motion-complete signal for the in-flight transition,
    /// or when the transition duration elapses, whichever comes first.
    MotionCompleteOrTimeout,
}

// ---------------------------------------------------------------------------
// MarkupConfig
// ---------------------------------------------------------------------------

/// Selectors and class names binding the controller to page markup.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-serde", serde(default))]
pub struct MarkupConfig {
    /// Selector for panel surfaces inside the container scope.
    pub panel_selector: String,
    /// Selector for indicator markers (document-wide).
    pub indicator_selector: String,
    /// Selector for animated elements inside a panel.
    pub animated_selector: String,
    /// Attribute on an animated element naming its entrance effect class.
    pub animation_attribute: String,
    /// Class marking the active panel and indicator.
    pub active_class: String,
    /// Class arming a panel's entrance animation.
    pub animate_class: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            panel_selector: ".panel".into(),
            indicator_selector: ".indicator".into(),
            animated_selector: "[data-animate]".into(),
            animation_attribute: "data-animate".into(),
            active_class: "active".into(),
            animate_class: "animate".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// SnapConfig
// ---------------------------------------------------------------------------

/// Top-level scroll controller configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-serde", serde(default))]
pub struct SnapConfig {
    /// Minimum spacing between two accepted transitions.
    #[cfg_attr(
        feature = "config-serde",
        serde(rename = "cooldown_ms", with = "duration_ms")
    )]
    pub cooldown: Duration,

    /// Time a transition holds the lock (and the fallback unlock timeout).
    #[cfg_attr(
        feature = "config-serde",
        serde(rename = "transition_ms", with = "duration_ms")
    )]
    pub transition_duration: Duration,

    /// Delay before panel discovery, letting layout settle.
    #[cfg_attr(
        feature = "config-serde",
        serde(rename = "init_delay_ms", with = "duration_ms")
    )]
    pub init_delay: Duration,

    /// Lock release strategy.
    pub unlock_policy: UnlockPolicy,

    /// Input normalization thresholds.
    pub gesture: GestureConfig,

    /// Strip one-shot animation classes from panels being deactivated.
    pub clear_stale_animations: bool,

    /// Animation classes the controller may touch.
    pub vocabulary: AnimationVocabulary,

    /// Page markup bindings.
    pub markup: MarkupConfig,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            transition_duration: DEFAULT_TRANSITION_DURATION,
            init_delay: DEFAULT_INIT_DELAY,
            unlock_policy: UnlockPolicy::default(),
            gesture: GestureConfig::default(),
            clear_stale_animations: true,
            vocabulary: AnimationVocabulary::default(),
            markup: MarkupConfig::default(),
        }
    }
}

impl SnapConfig {
    /// Set the cooldown.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Set the transition duration.
    #[must_use]
    pub fn with_transition_duration(mut self, duration: Duration) -> Self {
        self.transition_duration = duration;
        self
    }

    /// Set the initialization delay.
    #[must_use]
    pub fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = delay;
        self
    }

    /// Set the unlock policy.
    #[must_use]
    pub fn with_unlock_policy(mut self, policy: UnlockPolicy) -> Self {
        self.unlock_policy = policy;
        self
    }

    /// Set the input thresholds.
    #[must_use]
    pub fn with_gesture(mut self, gesture: GestureConfig) -> Self {
        self.gesture = gesture;
        self
    }

    /// Toggle explicit clearing of stale animation classes.
    #[must_use]
    pub fn with_clear_stale_animations(mut self, clear: bool) -> Self {
        self.clear_stale_animations = clear;
        self
    }

    /// Replace the animation vocabulary.
    #[must_use]
    pub fn with_vocabulary(mut self, vocabulary: AnimationVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Replace the markup bindings.
    #[must_use]
    pub fn with_markup(mut self, markup: MarkupConfig) -> Self {
        self.markup = markup;
        self
    }

    /// Load from a JSON string and validate.
    #[cfg(feature = "config-serde")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validated()
    }

    /// Load from a TOML string and validate.
    #[cfg(feature = "config-serde")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validated()
    }

    /// Return `self` if valid, otherwise every validation message.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.transition_duration.is_zero() {
            errors.push("transition_ms must be > 0".into());
        }

        let wheel = self.gesture.wheel_threshold;
        if !wheel.is_finite() || wheel < 0.0 {
            errors.push(format!(
                "gesture.wheel_threshold must be finite and >= 0, got {wheel}"
            ));
        }
        let touch = self.gesture.touch_threshold;
        if !touch.is_finite() || touch < 0.0 {
            errors.push(format!(
                "gesture.touch_threshold must be finite and >= 0, got {touch}"
            ));
        }

        if !is_class_name(&self.vocabulary.base_class) {
            errors.push(format!(
                "vocabulary.base_class is not a class name: {:?}",
                self.vocabulary.base_class
            ));
        }
        for effect in &self.vocabulary.effects {
            if !is_class_name(effect) {
                errors.push(format!("vocabulary effect is not a class name: {effect:?}"));
            }
        }

        let m = &self.markup;
        for (name, value) in [
            ("markup.panel_selector", &m.panel_selector),
            ("markup.indicator_selector", &m.indicator_selector),
            ("markup.animated_selector", &m.animated_selector),
            ("markup.animation_attribute", &m.animation_attribute),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("{name} must not be empty"));
            }
        }
        for (name, value) in [
            ("markup.active_class", &m.active_class),
            ("markup.animate_class", &m.animate_class),
        ] {
            if !is_class_name(value) {
                errors.push(format!("{name} is not a class name: {value:?}"));
            }
        }

        errors
    }
}

fn is_class_name(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}

// ---------------------------------------------------------------------------
// Serde helpers for Duration
// ---------------------------------------------------------------------------

#[cfg(feature = "config-serde")]
mod duration_ms {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(ms)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
