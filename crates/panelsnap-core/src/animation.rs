#![forbid(unsafe_code)]

//! Entrance-animation class vocabulary.
//!
//! Entrance effects come from a presentation library (animate.css by
//! default) that restarts an animation only when its class is added to an
//! element anew. The vocabulary names the library's base class and the
//! finite set of one-shot effect classes, so the controller can strip stale
//! effects from panels it leaves and re-apply them on re-entry without ever
//! hard-coding the library's names.

/// animate.css base class.
pub const ANIMATE_CSS_BASE: &str = "animate__animated";

/// animate.css entrance effects used by default.
pub const ANIMATE_CSS_EFFECTS: &[&str] = &[
    "animate__fadeIn",
    "animate__fadeInUp",
    "animate__fadeInDown",
    "animate__fadeInLeft",
    "animate__fadeInRight",
    "animate__bounceIn",
    "animate__zoomIn",
    "animate__slideInUp",
    "animate__slideInLeft",
    "animate__slideInRight",
];

/// The set of animation classes the controller may add or remove.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config-serde", serde(default))]
pub struct AnimationVocabulary {
    /// Class that enables animation on an element.
    pub base_class: String,
    /// One-shot effect classes.
    pub effects: Vec<String>,
}

impl Default for AnimationVocabulary {
    fn default() -> Self {
        Self::new(ANIMATE_CSS_BASE, ANIMATE_CSS_EFFECTS.iter().copied())
    }
}

impl AnimationVocabulary {
    /// Build a vocabulary from a base class and effect names.
    #[must_use]
    pub fn new<I, S>(base_class: impl Into<String>, effects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base_class: base_class.into(),
            effects: effects.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `class` is one of the one-shot effects.
    #[must_use]
    pub fn is_effect(&self, class: &str) -> bool {
        self.effects.iter().any(|e| e == class)
    }

    /// Every class the vocabulary owns: the base class followed by effects.
    pub fn classes(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::once(self.base_class.as_str()).chain(self.effects.iter().map(String::as_str))
    }

    /// Classes to add to an element that declares `effect`, or `None` when the
    /// effect is not part of the vocabulary.
    #[must_use]
    pub fn entrance_classes<'a>(&'a self, effect: &'a str) -> Option<[&'a str; 2]> {
        self.is_effect(effect)
            .then_some([self.base_class.as_str(), effect])
    }
}
