//! Lighting bridge adapter.
//!
//! Provides the sink seam the pipeline pushes light commands into:
//! - `MemorySink`: in-process recorder, for tests and dry runs
//! - `HueBridgeClient`: Hue CLIP v2 over HTTP (feature `bridge`)

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mapping::LightCommand;

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HueError {
    #[error("bridge unreachable: {0}")]
    Transport(String),
    #[error("bridge rejected request ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("update failed for lights: {}", .failed.join(", "))]
    Partial { failed: Vec<String> },
    #[error("sink rejected command: {0}")]
    Rejected(String),
}

// ============================================================================
// Wire Payload
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HuePayload {
    pub on: OnState,
    pub dimming: Dimming,
    pub color: Color,
    pub dynamics: Dynamics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnState {
    pub on: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimming {
    pub brightness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub xy: XyPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XyPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dynamics {
    /// Transition time in milliseconds
    pub duration: u32,
}

impl HuePayload {
    pub fn from_command(command: &LightCommand) -> Self {
        Self {
            on: OnState { on: true },
            dimming: Dimming {
                brightness: f64::from(command.brightness).clamp(1.0, 100.0),
            },
            color: Color {
                xy: XyPoint {
                    x: command.xy.x,
                    y: command.xy.y,
                },
            },
            dynamics: Dynamics {
                duration: command.transition_ms,
            },
        }
    }
}

// ============================================================================
// Sink Trait
// ============================================================================

/// Destination for light commands.
pub trait LightSink: Send + Sync {
    fn apply(&self, command: &LightCommand) -> Result<(), HueError>;
}

impl<S: LightSink + ?Sized> LightSink for std::sync::Arc<S> {
    fn apply(&self, command: &LightCommand) -> Result<(), HueError> {
        (**self).apply(command)
    }
}

// ============================================================================
// Memory Sink
// ============================================================================

/// Records every command it is given.
#[derive(Debug, Default)]
pub struct MemorySink {
    commands: Mutex<Vec<LightCommand>>,
    fail_with: Mutex<Option<HueError>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `apply` fail with `error` (the command is still
    /// recorded).
    pub fn fail_with(&self, error: HueError) {
        *self.fail_with.lock() = Some(error);
    }

    pub fn recover(&self) {
        *self.fail_with.lock() = None;
    }

    pub fn commands(&self) -> Vec<LightCommand> {
        self.commands.lock().clone()
    }

    pub fn last(&self) -> Option<LightCommand> {
        self.commands.lock().last().cloned()
    }
}

impl LightSink for MemorySink {
    fn apply(&self, command: &LightCommand) -> Result<(), HueError> {
        self.commands.lock().push(command.clone());
        match self.fail_with.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Hue Bridge Client
// ============================================================================

#[cfg(feature = "bridge")]
pub use bridge::HueBridgeClient;

#[cfg(feature = "bridge")]
mod bridge {
    use std::time::Duration;

    use tracing::{debug, warn};

    use super::{HueError, HuePayload, LightSink};
    use crate::config::HueConfig;
    use crate::mapping::LightCommand;

    /// Blocking CLIP v2 client.
    ///
    /// Every configured light is attempted even if an earlier one failed.
    #[derive(Debug)]
    pub struct HueBridgeClient {
        base_url: String,
        app_key: String,
        light_ids: Vec<String>,
        agent: ureq::Agent,
    }

    impl HueBridgeClient {
        pub fn new(
            base_url: impl Into<String>,
            app_key: impl Into<String>,
            light_ids: Vec<String>,
        ) -> Self {
            let agent = ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(5))
                .build();
            Self {
                base_url: base_url.into().trim_end_matches('/').to_string(),
                app_key: app_key.into(),
                light_ids,
                agent,
            }
        }

        pub fn from_config(config: &HueConfig) -> Self {
            Self::new(config.base_url(), config.app_key.clone(), config.light_ids.clone())
        }

        pub fn light_url(&self, light_id: &str) -> String {
            format!("{}/clip/v2/resource/light/{}", self.base_url, light_id)
        }

        fn put_light(&self, light_id: &str, payload: &HuePayload) -> Result<(), HueError> {
            let url = self.light_url(light_id);
            self.agent
                .put(&url)
                .set("Content-Type", "application/json")
                .set("hue-application-key", &self.app_key)
                .send_json(payload)
                .map_err(|e| match e {
                    ureq::Error::Status(status, resp) => {
                        let body = resp.into_string().unwrap_or_default();
                        HueError::Status { status, body }
                    }
                    ureq::Error::Transport(t) => HueError::Transport(t.to_string()),
                })?;
            Ok(())
        }
    }

    impl LightSink for HueBridgeClient {
        fn apply(&self, command: &LightCommand) -> Result<(), HueError> {
            let payload = HuePayload::from_command(command);
            let mut failed = Vec::new();

            for id in &self.light_ids {
                match self.put_light(id, &payload) {
                    Ok(()) => debug!(light = %id, "light updated"),
                    Err(e) => {
                        warn!(light = %id, error = %e, "light update failed");
                        failed.push(id.clone());
                    }
                }
            }

            if failed.is_empty() {
                Ok(())
            } else {
                Err(HueError::Partial { failed })
            }
        }
    }

}
