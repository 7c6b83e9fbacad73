//! Emotion -> light mapping.
//!
//! Two branches:
//! - categorical: the classifier's group selects a fixed preset
//! - continuous: when the aggregate carries both valence and arousal, a
//!   valence/arousal color model overrides the preset

use serde::{Deserialize, Serialize};

use crate::classifier::{classify, Classification, EmotionGroup};
use crate::color::{hsl_to_xy, CieXy};
use crate::snapshot::{AggregateSnapshot, EmotionScores};

/// Fade time carried by every command.
pub const DEFAULT_TRANSITION_MS: u32 = 800;

const HUE_WARM_DEG: f64 = 30.0;
const HUE_DEG_PER_VALENCE: f64 = 120.0;

const MIN_BRIGHTNESS: f64 = 1.0;
const MAX_BRIGHTNESS: f64 = 100.0;

/// Command handed to the lighting collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightCommand {
    pub xy: CieXy,
    /// Percent, 1-100
    pub brightness: u8,
    pub transition_ms: u32,
    /// Human-readable classification tag
    pub label: String,
    /// Raw score of the winning label, 0 when there was no signal
    pub confidence: f64,
}

/// Preset color and brightness for an emotion group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightPreset {
    pub xy: CieXy,
    pub brightness: u8,
}

impl LightPreset {
    pub fn for_group(group: EmotionGroup) -> Self {
        let (x, y, brightness) = match group {
            EmotionGroup::Happy => (0.52, 0.42, 90),
            EmotionGroup::Calm => (0.44, 0.40, 55),
            EmotionGroup::Sad => (0.16, 0.08, 35),
            EmotionGroup::Angry => (0.70, 0.30, 75),
            EmotionGroup::Fear => (0.27, 0.12, 60),
            EmotionGroup::Neutral => (0.33, 0.33, 50),
        };
        Self {
            xy: CieXy::new(x, y),
            brightness,
        }
    }

    /// Preset by group label; unknown labels get the neutral preset.
    pub fn for_label(label: &str) -> Self {
        Self::for_group(EmotionGroup::from_label(label).unwrap_or(EmotionGroup::Neutral))
    }
}

/// Stateless emotion -> light transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmotionColorMapper;

impl EmotionColorMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, scores: &EmotionScores) -> Classification {
        classify(scores)
    }

    pub fn map(&self, aggregate: &AggregateSnapshot) -> LightCommand {
        let class = classify(&aggregate.emotions);

        if let (Some(valence), Some(arousal)) = (aggregate.valence, aggregate.arousal) {
            let (xy, brightness) = valence_arousal_to_light(valence, arousal);
            return LightCommand {
                xy,
                brightness,
                transition_ms: DEFAULT_TRANSITION_MS,
                label: continuous_label(class.group),
                confidence: class.confidence,
            };
        }

        let preset = LightPreset::for_group(class.group);
        LightCommand {
            xy: preset.xy,
            brightness: clamp_brightness(preset.brightness as f64),
            transition_ms: DEFAULT_TRANSITION_MS,
            label: class.label().to_string(),
            confidence: class.confidence,
        }
    }
}

// NOTE: neutral collapses to the bare "valence/arousal" tag while every other
// group keeps a "<group> (valence/arousal)" suffix. Inconsistent on purpose;
// worth revisiting together with whatever consumes the label.
fn continuous_label(group: EmotionGroup) -> String {
    match group {
        EmotionGroup::Neutral => "valence/arousal".to_string(),
        other => format!("{} (valence/arousal)", other.label()),
    }
}

/// Continuous color model.
///
/// Valence sweeps hue upward from 30 deg (warm, unpleasant); arousal raises
/// saturation, lightness and brightness. Inputs are clamped to valence
/// [-1, 1] and arousal [0, 1] first; NaN reads as 0.
///
/// NOTE: the sweep is described as ending at a cool 150 deg, but the
/// formula reaches 150 deg at neutral valence and 270 deg (violet) at +1.
/// The formula is kept as is.
pub fn valence_arousal_to_light(valence: f64, arousal: f64) -> (CieXy, u8) {
    let v = if valence.is_nan() { 0.0 } else { valence.clamp(-1.0, 1.0) };
    let a = if arousal.is_nan() { 0.0 } else { arousal.clamp(0.0, 1.0) };

    // 30 deg at v = -1, 150 deg at v = 0, 270 deg at v = +1
    let hue = HUE_WARM_DEG + (v + 1.0) * HUE_DEG_PER_VALENCE;
    let saturation = 50.0 + a * 50.0;
    let lightness = 45.0 + a * 30.0;

    let xy = hsl_to_xy(hue, saturation, lightness);
    let brightness = clamp_brightness((30.0 + a * 70.0).round());
    (xy, brightness)
}

fn clamp_brightness(b: f64) -> u8 {
    b.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS) as u8
}
