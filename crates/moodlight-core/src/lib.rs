//! Moodlight core: emotion windowing and emotion-to-light mapping.
//!
//! The core is a pure sensor-to-actuator transform. Emotion snapshots are
//! pushed into a [`SlidingWindowAggregator`]; a periodic caller pulls the
//! aggregate and runs it through the [`EmotionColorMapper`] to obtain a
//! [`LightCommand`]. Device capture, sockets and bridge transport live
//! outside the core; the `hume` and `hue` modules only hold the codecs and
//! the sink seam those collaborators need.
//!
//! ```text
//!  emotion stream ──add──▶ SlidingWindowAggregator ──aggregate──▶ EmotionColorMapper
//!                                                                     │
//!                       UpdateThrottler ◀── MoodPipeline ──▶ LightSink ◀┘
//! ```

#![allow(clippy::new_without_default)]

pub mod classifier;
pub mod clock;
pub mod color;
pub mod config;
pub mod hue;
pub mod hume;
pub mod mapping;
pub mod pipeline;
pub mod snapshot;
pub mod throttle;
pub mod window;

#[cfg(test)]
mod tests_config;
#[cfg(test)]
mod tests_proptest;

pub use classifier::{classify, Classification, EmotionGroup, EMOTION_GROUPS};
pub use clock::{Clock, ManualClock, SystemClock};
pub use color::{hsl_to_rgb, hsl_to_xy, rgb_to_xy, srgb_to_linear, CieXy};
pub use config::{ConfigError, MoodlightConfig};
pub use hue::{HueError, HuePayload, LightSink, MemorySink};
pub use hume::{decode_message, HumeError, StreamEvent};
pub use mapping::{EmotionColorMapper, LightCommand, DEFAULT_TRANSITION_MS};
pub use pipeline::MoodPipeline;
pub use snapshot::{AggregateSnapshot, EmotionScores, EmotionSnapshot};
pub use throttle::UpdateThrottler;
pub use window::{SlidingWindowAggregator, DEFAULT_WINDOW_MS};

#[cfg(feature = "bridge")]
pub use hue::HueBridgeClient;
