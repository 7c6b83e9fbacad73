//! Sliding Window Aggregator
//!
//! Keeps the emotion snapshots of the last `window_ms` milliseconds and
//! averages them on demand.
//!
//! Emotion scores are averaged over the whole window with absent labels
//! counting as zero: the service reports dense score vectors, so a missing
//! label means the model did not see it. Valence and arousal are averaged
//! over only the snapshots that carried them.

use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::snapshot::{AggregateSnapshot, EmotionScores, EmotionSnapshot};

/// Default retention horizon.
pub const DEFAULT_WINDOW_MS: u64 = 4_000;

/// Time-bounded buffer of emotion snapshots.
///
/// `add` and `aggregate` take `&self`; the buffer sits behind a single lock
/// so a producer and a periodic consumer can share the aggregator via `Arc`.
pub struct SlidingWindowAggregator<C: Clock = SystemClock> {
    samples: Mutex<VecDeque<EmotionSnapshot>>,
    window_ms: u64,
    clock: C,
}

impl SlidingWindowAggregator<SystemClock> {
    pub fn new(window_ms: u64) -> Self {
        Self::with_clock(window_ms, SystemClock)
    }
}

impl Default for SlidingWindowAggregator<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MS)
    }
}

impl<C: Clock> SlidingWindowAggregator<C> {
    /// A zero window is bumped to 1 ms so the buffer always has a horizon.
    pub fn with_clock(window_ms: u64, clock: C) -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(64)),
            window_ms: window_ms.max(1),
            clock,
        }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Append a snapshot, stamping it with the current time if it has none,
    /// then drop everything older than the window.
    pub fn add(&self, mut snapshot: EmotionSnapshot) {
        let now = self.clock.now_ms();
        if snapshot.timestamp_ms.is_none() {
            snapshot.timestamp_ms = Some(now);
        }

        let mut samples = self.samples.lock();
        samples.push_back(snapshot);
        self.trim(&mut samples, now);
    }

    /// Average of every snapshot still inside the window.
    ///
    /// Returns [`AggregateSnapshot::empty`] when the window holds nothing.
    pub fn aggregate(&self) -> AggregateSnapshot {
        let now = self.clock.now_ms();
        let mut samples = self.samples.lock();
        self.trim(&mut samples, now);

        if samples.is_empty() {
            return AggregateSnapshot::empty();
        }

        let mut totals = EmotionScores::new();
        let (mut valence_sum, mut valence_count) = (0.0, 0usize);
        let (mut arousal_sum, mut arousal_count) = (0.0, 0usize);

        for sample in samples.iter() {
            for (label, score) in &sample.emotions {
                *totals.entry(label.clone()).or_insert(0.0) += *score;
            }
            if let Some(v) = sample.valence {
                valence_sum += v;
                valence_count += 1;
            }
            if let Some(a) = sample.arousal {
                arousal_sum += a;
                arousal_count += 1;
            }
        }

        let count = samples.len() as f64;
        for total in totals.values_mut() {
            *total /= count;
        }

        AggregateSnapshot {
            emotions: totals,
            valence: (valence_count > 0).then(|| valence_sum / valence_count as f64),
            arousal: (arousal_count > 0).then(|| arousal_sum / arousal_count as f64),
        }
    }

    /// Number of snapshots currently buffered (stale entries included until
    /// the next `add` or `aggregate`).
    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    pub fn clear(&self) {
        self.samples.lock().clear();
    }

    fn trim(&self, samples: &mut VecDeque<EmotionSnapshot>, now_ms: i64) {
        let horizon = i64::try_from(self.window_ms).unwrap_or(i64::MAX);
        let cutoff = now_ms.saturating_sub(horizon);
        let before = samples.len();
        // Caller-supplied timestamps may arrive out of order, so scan the
        // whole buffer instead of popping from the front.
        samples.retain(|s| s.timestamp_ms.unwrap_or(0) >= cutoff);
        let dropped = before - samples.len();
        if dropped > 0 {
            debug!(dropped, remaining = samples.len(), "trimmed emotion window");
        }
    }
}
