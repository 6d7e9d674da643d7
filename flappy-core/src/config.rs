use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Physics constants for every bird in an episode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BirdConfig {
    /// Downward acceleration in playfield heights per second squared
    pub gravity: f32,
    /// Velocity a jump sets, replacing whatever the bird had
    pub jump_velocity: f32,
    /// Lower bound on velocity (negative: falling)
    pub max_falling_speed: f32,
    /// Physics steps that must pass before another jump is accepted
    pub jump_cooldown_ticks: u32,
    pub radius: f32,
    pub start_y: f32,
    /// Subtracted from score once, on death
    pub death_penalty: f32,
}

impl Default for BirdConfig {
    fn default() -> Self {
        Self {
            gravity: 0.1,
            jump_velocity: 0.03,
            max_falling_speed: -0.03,
            // 0.2 s worth of 17 ms steps
            jump_cooldown_ticks: 12,
            // 40 px sprite on a 500 px tall canvas
            radius: 0.04,
            start_y: 0.7,
            death_penalty: 1.0,
        }
    }
}

/// Geometry and pacing of the pillar field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PillarConfig {
    pub width: f32,
    /// Center-to-center horizontal distance between neighbouring pillars
    pub spacing: f32,
    /// Vertical size of the opening between top and bottom pillar
    pub gap_size: f32,
    pub gap_center_min: f32,
    pub gap_center_max: f32,
    /// Distance scrolled per tick
    pub scroll_speed: f32,
    /// Where the first pillar starts, measured right of the birds
    pub first_offset: f32,
}

impl Default for PillarConfig {
    fn default() -> Self {
        Self {
            // 90 px pillars separated by 270 px, on a 500 px tall canvas
            width: 0.18,
            spacing: 0.72,
            gap_size: 0.2,
            gap_center_min: 0.2,
            gap_center_max: 0.8,
            scroll_speed: 0.006,
            first_offset: 0.72,
        }
    }
}

impl PillarConfig {
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }
}

/// Configuration for one episode of the simulation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for gap heights, so an episode can be replayed exactly
    pub seed: u64,
    /// Width of the playfield in units of its height
    pub playfield_width: f32,
    pub tick_interval_ms: u64,
    pub render_interval_ms: u64,
    /// Reward given to every living bird each tick
    pub survival_reward: f32,
    /// Reward given to every living bird when a pillar is recycled
    pub pass_reward: f32,
    pub bird: BirdConfig,
    pub pillar: PillarConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            // 600 x 500 canvas
            playfield_width: 1.2,
            // ~60 updates per second
            tick_interval_ms: 17,
            render_interval_ms: 17,
            survival_reward: 0.01,
            pass_reward: 1.0,
            bird: BirdConfig::default(),
            pillar: PillarConfig::default(),
        }
    }
}

impl SimConfig {
    /// Seconds of simulated time per tick
    pub fn dt(&self) -> f32 {
        self.tick_interval_ms as f32 / 1000.0
    }

    /// Birds are pinned to the horizontal center of the playfield
    pub fn bird_x(&self) -> f32 {
        self.playfield_width / 2.0
    }

    /// Enough pillars to cover the playfield plus one waiting off screen
    pub fn pillar_count(&self) -> usize {
        1 + (self.playfield_width / self.pillar.spacing).ceil() as usize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_timing()?;
        self.validate_bird()?;
        self.validate_pillars()
    }

    fn validate_timing(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("tick_interval_ms"));
        }
        if self.render_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("render_interval_ms"));
        }
        if !self.playfield_width.is_finite() || self.playfield_width <= 0.0 {
            return Err(ConfigError::InvalidPlayfieldWidth(self.playfield_width));
        }
        Ok(())
    }

    fn validate_bird(&self) -> Result<(), ConfigError> {
        let bird = &self.bird;
        if !bird.radius.is_finite() || bird.radius <= 0.0 || bird.radius >= 0.5 {
            return Err(ConfigError::InvalidBirdRadius(bird.radius));
        }
        if !(0.0..=1.0).contains(&bird.start_y) {
            return Err(ConfigError::InvalidStartY(bird.start_y));
        }
        if !bird.gravity.is_finite() || !bird.jump_velocity.is_finite() {
            return Err(ConfigError::NonFinite("bird"));
        }
        if !bird.max_falling_speed.is_finite() || bird.max_falling_speed > 0.0 {
            return Err(ConfigError::InvalidMaxFallingSpeed(bird.max_falling_speed));
        }
        Ok(())
    }

    fn validate_pillars(&self) -> Result<(), ConfigError> {
        let pillar = &self.pillar;
        if !pillar.width.is_finite() || pillar.width <= 0.0 {
            return Err(ConfigError::InvalidPillarWidth(pillar.width));
        }
        if !pillar.spacing.is_finite() || pillar.spacing <= 0.0 {
            return Err(ConfigError::InvalidSpacing(pillar.spacing));
        }
        if !pillar.scroll_speed.is_finite() || pillar.scroll_speed < 0.0 {
            return Err(ConfigError::InvalidScrollSpeed(pillar.scroll_speed));
        }
        if !(0.0..1.0).contains(&pillar.gap_size) || pillar.gap_size == 0.0 {
            return Err(ConfigError::InvalidGapSize(pillar.gap_size));
        }
        let (lo, hi) = (pillar.gap_center_min, pillar.gap_center_max);
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
            return Err(ConfigError::InvalidGapRange { min: lo, max: hi });
        }
        // the first pillar must already be a valid target on tick one
        let half_width = pillar.half_width();
        if pillar.first_offset <= -half_width || pillar.first_offset > pillar.spacing + half_width
        {
            return Err(ConfigError::FirstPillarOutOfReach {
                offset: pillar.first_offset,
                spacing: pillar.spacing,
            });
        }
        Ok(())
    }
}
