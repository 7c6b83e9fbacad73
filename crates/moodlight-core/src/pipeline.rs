//! Ingest -> window -> throttle -> map -> sink.
//!
//! `MoodPipeline` is the caller-side wiring around the core: it owns the
//! throttler that used to be process-wide scheduling state, and forwards
//! each computed command to a [`LightSink`]. Timers stay with the caller:
//! `ingest` says how long to wait, the caller sleeps, then calls `flush`.

use std::sync::Arc;

use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::MoodlightConfig;
use crate::hue::LightSink;
use crate::mapping::{EmotionColorMapper, LightCommand};
use crate::snapshot::EmotionSnapshot;
use crate::throttle::UpdateThrottler;
use crate::window::SlidingWindowAggregator;

pub struct MoodPipeline<S: LightSink, C: Clock = SystemClock> {
    window: Arc<SlidingWindowAggregator<C>>,
    mapper: EmotionColorMapper,
    throttler: UpdateThrottler,
    sink: S,
}

impl<S: LightSink> MoodPipeline<S, SystemClock> {
    pub fn from_config(config: &MoodlightConfig, sink: S) -> Self {
        Self::with_clock(config, SystemClock, sink)
    }
}

impl<S: LightSink, C: Clock> MoodPipeline<S, C> {
    pub fn with_clock(config: &MoodlightConfig, clock: C, sink: S) -> Self {
        Self {
            window: Arc::new(SlidingWindowAggregator::with_clock(
                config.window.window_ms,
                clock,
            )),
            mapper: EmotionColorMapper::new(),
            throttler: UpdateThrottler::new(config.throttle.min_interval_ms),
            sink,
        }
    }

    /// Shared handle to the window, for producers on other threads.
    pub fn window(&self) -> Arc<SlidingWindowAggregator<C>> {
        Arc::clone(&self.window)
    }

    pub fn throttler(&self) -> &UpdateThrottler {
        &self.throttler
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Buffer a snapshot and request a light update.
    ///
    /// Returns the delay in milliseconds before `flush` should run, or `None`
    /// if a flush is already scheduled.
    pub fn ingest(&mut self, snapshot: EmotionSnapshot) -> Option<u64> {
        self.window.add(snapshot);
        self.throttler.request(self.window.clock().now_ms())
    }

    /// Map the current window to a command and push it to the sink.
    ///
    /// A failing sink is logged and otherwise ignored; the command is
    /// returned either way.
    pub fn flush(&mut self) -> LightCommand {
        let aggregate = self.window.aggregate();
        let command = self.mapper.map(&aggregate);
        self.throttler.complete(self.window.clock().now_ms());

        let confidence = format!("{:.2}", command.confidence);
        info!(
            label = %command.label,
            confidence = %confidence,
            brightness = command.brightness,
            x = command.xy.x,
            y = command.xy.y,
            "emotion -> light"
        );

        if let Err(e) = self.sink.apply(&command) {
            warn!(error = %e, "light update failed");
        }
        command
    }
}
