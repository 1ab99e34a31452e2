#![forbid(unsafe_code)]

//! Overlay configuration.
//!
//! Every field has a default, so hosts can pass partial JSON such as
//! `{"max_panels": 3}`. [`OverlayConfig::from_json`] parses and validates in
//! one step.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, Result};
use crate::inertia::InertiaParams;
use crate::sequence::KONAMI_CODE;

pub const DEFAULT_IMAGE_SRC: &str = "https://github.com/Fluffythebunny/-/blob/fbc52f70bfca8021f5e00dacea1bd1120ff872fe/v0Izhmyv.gif?raw=true";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Key identifiers (`KeyboardEvent.key`) that trigger a panel.
    pub secret_code: Vec<String>,
    /// Simultaneously visible panels; the oldest is evicted beyond this.
    pub max_panels: usize,
    /// Inclusive lower bound of the sampled panel size, in pixels.
    pub min_size: u32,
    /// Exclusive upper bound of the sampled panel size, in pixels.
    pub max_size: u32,
    pub image_src: String,
    pub exit_duration_ms: u64,
    pub physics: InertiaParams,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            secret_code: KONAMI_CODE.iter().map(|k| (*k).to_owned()).collect(),
            max_panels: 5,
            min_size: 150,
            max_size: 300,
            image_src: DEFAULT_IMAGE_SRC.to_owned(),
            exit_duration_ms: 300,
            physics: InertiaParams::default(),
        }
    }
}

impl OverlayConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn exit_duration(&self) -> Duration {
        Duration::from_millis(self.exit_duration_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.secret_code.is_empty() {
            return Err(OverlayError::invalid("secret_code", "must not be empty"));
        }
        if self.max_panels == 0 {
            return Err(OverlayError::invalid("max_panels", "must be at least 1"));
        }
        if self.min_size >= self.max_size {
            return Err(OverlayError::invalid(
                "min_size",
                format!(
                    "must be below max_size ({} >= {})",
                    self.min_size, self.max_size
                ),
            ));
        }
        let physics = &self.physics;
        if !(physics.damping > 0.0 && physics.damping < 1.0) {
            return Err(OverlayError::invalid(
                "physics.damping",
                format!("must be in (0, 1), got {}", physics.damping),
            ));
        }
        if physics.bounce.is_nan() || physics.bounce.abs() > 1.0 {
            return Err(OverlayError::invalid(
                "physics.bounce",
                format!("magnitude must not exceed 1, got {}", physics.bounce),
            ));
        }
        if !physics.spin_coupling.is_finite() {
            return Err(OverlayError::invalid(
                "physics.spin_coupling",
                "must be finite",
            ));
        }
        if physics.rest_threshold.is_nan() || physics.rest_threshold < 0.0 {
            return Err(OverlayError::invalid(
                "physics.rest_threshold",
                format!("must be non-negative, got {}", physics.rest_threshold),
            ));
        }
        Ok(())
    }
}
