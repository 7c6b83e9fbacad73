//! Categorical emotion classifier.
//!
//! Picks the strongest label in a score map and files it under one of six
//! emotion groups by substring match against a fixed rule table.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::snapshot::EmotionScores;

/// Emotion group, i.e. the preset family a label falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionGroup {
    Happy,
    Calm,
    Sad,
    Angry,
    Fear,
    Neutral,
}

impl EmotionGroup {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Calm => "calm",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Fear => "fear",
            Self::Neutral => "neutral",
        }
    }

    /// Vocabulary matched against the lower-cased winning label.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Happy => &["joy", "happiness", "amusement", "contentment", "excited"],
            Self::Calm => &["calm", "relaxed", "content", "serenity"],
            Self::Sad => &["sad", "sadness", "disappointment", "despair"],
            Self::Angry => &["anger", "angry", "annoyance", "frustration"],
            Self::Fear => &["fear", "anxiety", "nervousness", "panic"],
            Self::Neutral => &["neutral", "boredom"],
        }
    }

    /// Inverse of [`EmotionGroup::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        EMOTION_GROUPS.iter().copied().find(|g| g.label() == label)
    }

    /// First group, in priority order, whose vocabulary occurs in `label`.
    pub fn match_label(label: &str) -> Option<Self> {
        let normalized = label.to_lowercase();
        EMOTION_GROUPS
            .iter()
            .copied()
            .find(|group| group.keywords().iter().any(|kw| normalized.contains(kw)))
    }
}

impl fmt::Display for EmotionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rule table in priority order. "contentment" hits `Happy` before the
/// `Calm` keyword "content" is ever tried.
pub const EMOTION_GROUPS: [EmotionGroup; 6] = [
    EmotionGroup::Happy,
    EmotionGroup::Calm,
    EmotionGroup::Sad,
    EmotionGroup::Angry,
    EmotionGroup::Fear,
    EmotionGroup::Neutral,
];

/// Classifier verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub group: EmotionGroup,
    /// Raw score of the winning label, 0 when there was no signal
    pub confidence: f64,
}

impl Classification {
    pub const NO_SIGNAL: Self = Self {
        group: EmotionGroup::Neutral,
        confidence: 0.0,
    };

    pub fn label(&self) -> &'static str {
        self.group.label()
    }
}

/// Classify a score map.
///
/// Ties on the top score go to the lexicographically first label (the map
/// is ordered). Non-finite scores are ignored. A label that matches no group
/// yields `Neutral` but keeps its score as confidence.
pub fn classify(scores: &EmotionScores) -> Classification {
    let mut best: Option<(&str, f64)> = None;
    for (label, &score) in scores {
        if !score.is_finite() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((label.as_str(), score)),
        }
    }

    let Some((label, confidence)) = best else {
        return Classification::NO_SIGNAL;
    };

    Classification {
        group: EmotionGroup::match_label(label).unwrap_or(EmotionGroup::Neutral),
        confidence,
    }
}
