//! Tunables for the relaxation world and the settling engine.

use crate::error::{Error, Result};
use serde::Deserialize;
use trellis_hierarchy::PlacementConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Stiffness of the penetration recovery, in 1/s. Capped at half a substep per step.
    pub contact_hertz: f64,
    /// Upper bound for the separating speed a single contact may request.
    pub max_contact_push_speed: f64,
    pub sleep_speed: f64,
    /// Seconds a body must stay below `sleep_speed` before it is put to sleep.
    pub time_until_sleep: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            contact_hertz: 120.0,
            max_contact_push_speed: 200.0,
            sleep_speed: 0.05,
            time_until_sleep: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub linear_damping: f64,
    /// Recorded on every body; rotation is locked so it never acts.
    pub angular_damping: f64,
    pub warmup_steps: usize,
    pub warmup_dt: f64,
    pub warmup_substeps: usize,
    /// Frames the engine keeps stepping after the last settle request.
    pub settle_step_ceiling: u32,
    pub min_dt: f64,
    pub max_dt: f64,
    pub substeps: usize,
    /// Resize animation progress per second.
    pub animation_speed: f64,
    /// Bodies slower than this count as resting.
    pub settle_speed: f64,
    pub world: WorldConfig,
    pub placement: PlacementConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            linear_damping: 5.0,
            angular_damping: 8.0,
            warmup_steps: 60,
            warmup_dt: 1.0 / 90.0,
            warmup_substeps: 8,
            settle_step_ceiling: 600,
            min_dt: 1.0 / 240.0,
            max_dt: 1.0 / 30.0,
            substeps: 4,
            animation_speed: 4.0,
            settle_speed: 0.1,
            world: WorldConfig::default(),
            placement: PlacementConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Collider inflation on each side of a block: its margin plus half the inter-block gap.
    pub fn inflation(&self, margin: f64) -> f64 {
        margin + self.placement.constants.gap * 0.5
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(Error::InvalidConfig {
                message: message.to_string(),
            })
        };
        if !(self.min_dt > 0.0 && self.min_dt <= self.max_dt) {
            return invalid("min_dt must be positive and not above max_dt");
        }
        if self.substeps == 0 || self.warmup_substeps == 0 {
            return invalid("substep counts must be at least 1");
        }
        if self.warmup_steps > 0 && self.warmup_dt <= 0.0 {
            return invalid("warmup_dt must be positive");
        }
        if self.animation_speed <= 0.0 {
            return invalid("animation_speed must be positive");
        }
        if self.linear_damping < 0.0 || self.settle_speed < 0.0 {
            return invalid("damping and settle speed must not be negative");
        }
        if self.world.contact_hertz <= 0.0 || self.world.max_contact_push_speed <= 0.0 {
            return invalid("contact_hertz and max_contact_push_speed must be positive");
        }
        Ok(())
    }
}
