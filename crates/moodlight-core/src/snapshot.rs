//! Emotion observations and their windowed aggregate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Emotion label -> intensity score.
///
/// Ordered so that iteration (and therefore tie-breaking in
/// [`crate::classify`]) is reproducible.
pub type EmotionScores = BTreeMap<String, f64>;

/// One observation from the emotion service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionSnapshot {
    /// Per-label scores, non-negative, no upper bound
    #[serde(default)]
    pub emotions: EmotionScores,
    /// Pleasantness (-1 to +1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valence: Option<f64>,
    /// Activation (0 to 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arousal: Option<f64>,
    /// Capture time in milliseconds, stamped by the window when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<i64>,
}

impl EmotionSnapshot {
    pub fn new(emotions: EmotionScores) -> Self {
        Self {
            emotions,
            ..Default::default()
        }
    }

    /// Build a snapshot from `(label, score)` pairs.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn with_valence_arousal(mut self, valence: f64, arousal: f64) -> Self {
        self.valence = Some(valence);
        self.arousal = Some(arousal);
        self
    }

    pub fn at(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }
}

/// Mean of all snapshots currently inside the window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    pub emotions: EmotionScores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arousal: Option<f64>,
}

impl AggregateSnapshot {
    /// The "no signal" aggregate.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.emotions.is_empty() && self.valence.is_none() && self.arousal.is_none()
    }
}

impl From<EmotionSnapshot> for AggregateSnapshot {
    fn from(snapshot: EmotionSnapshot) -> Self {
        Self {
            emotions: snapshot.emotions,
            valence: snapshot.valence,
            arousal: snapshot.arousal,
        }
    }
}
