use proptest::prelude::*;

/// Property-based checks for the window and the light mapping

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{classify, Classification};
    use crate::clock::ManualClock;
    use crate::color::{hsl_to_xy, CieXy};
    use crate::mapping::{valence_arousal_to_light, EmotionColorMapper};
    use crate::snapshot::{AggregateSnapshot, EmotionScores, EmotionSnapshot};
    use crate::window::SlidingWindowAggregator;
    use std::sync::Arc;

    fn label() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("Joy".to_string()),
            Just("Calmness".to_string()),
            Just("Sadness".to_string()),
            Just("Anger".to_string()),
            Just("Anxiety".to_string()),
            Just("Boredom".to_string()),
            "[a-z]{3,10}",
        ]
    }

    fn scores() -> impl Strategy<Value = EmotionScores> {
        prop::collection::btree_map(label(), 0.0f64..10.0, 0..6)
    }

    // =========================================================================
    // Continuous branch stays in range
    // =========================================================================
    proptest! {
        #[test]
        fn test_valence_arousal_output_in_range(v in -1.0f64..=1.0, a in 0.0f64..=1.0) {
            let agg = AggregateSnapshot {
                emotions: EmotionScores::new(),
                valence: Some(v),
                arousal: Some(a),
            };
            let cmd = EmotionColorMapper::new().map(&agg);
            prop_assert!((0.0..=1.0).contains(&cmd.xy.x));
            prop_assert!((0.0..=1.0).contains(&cmd.xy.y));
            prop_assert!((30..=100).contains(&cmd.brightness));
            prop_assert_eq!(cmd.transition_ms, 800);
        }
    }

    // =========================================================================
    // Clamping makes out-of-range inputs equivalent to the range edge
    // =========================================================================
    proptest! {
        #[test]
        fn test_valence_clamped(v in 1.0f64..1e6, a in 0.0f64..=1.0) {
            prop_assert_eq!(valence_arousal_to_light(v, a), valence_arousal_to_light(1.0, a));
            prop_assert_eq!(valence_arousal_to_light(-v, a), valence_arousal_to_light(-1.0, a));
        }

        #[test]
        fn test_arousal_clamped(v in -1.0f64..=1.0, a in 1.0f64..1e6) {
            prop_assert_eq!(valence_arousal_to_light(v, -a), valence_arousal_to_light(v, 0.0));
            prop_assert_eq!(valence_arousal_to_light(v, a), valence_arousal_to_light(v, 1.0));
        }
    }

    // =========================================================================
    // Gray input is pinned to the neutral point
    // =========================================================================
    proptest! {
        #[test]
        fn test_zero_saturation_neutral(h in 0.0f64..360.0, l in 0.0f64..=100.0) {
            prop_assert_eq!(hsl_to_xy(h, 0.0, l), CieXy::NEUTRAL);
        }
    }

    // =========================================================================
    // Classifier
    // =========================================================================
    proptest! {
        #[test]
        fn test_classify_confidence_is_max_score(s in scores()) {
            let c = classify(&s);
            if s.is_empty() {
                prop_assert_eq!(c, Classification::NO_SIGNAL);
            } else {
                let max = s.values().cloned().fold(f64::MIN, f64::max);
                prop_assert_eq!(c.confidence, max);
            }
        }

        #[test]
        fn test_categorical_brightness_from_table(s in scores()) {
            let cmd = EmotionColorMapper::new().map(&AggregateSnapshot {
                emotions: s,
                valence: None,
                arousal: None,
            });
            prop_assert!([90u8, 55, 35, 75, 60, 50].contains(&cmd.brightness));
        }
    }

    // =========================================================================
    // Window mean treats missing labels as zero
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_window_mean_zero_fill(batch in prop::collection::vec(scores(), 1..20)) {
            let window = SlidingWindowAggregator::with_clock(4_000, Arc::new(ManualClock::new(0)));
            for s in &batch {
                window.add(EmotionSnapshot::new(s.clone()));
            }
            let agg = window.aggregate();
            let n = batch.len() as f64;
            for (label, mean) in &agg.emotions {
                let total: f64 = batch.iter().filter_map(|s| s.get(label)).sum();
                prop_assert!((mean - total / n).abs() < 1e-9);
            }
            let any_label = batch.iter().any(|s| !s.is_empty());
            prop_assert_eq!(agg.emotions.is_empty(), !any_label);
        }
    }
}
