use flappy_shared::DeathCause;

use crate::config::BirdConfig;

/// A single bird. Horizontal position is owned by the world, birds only move vertically.
#[derive(Debug, Clone)]
pub struct Bird {
    pub y: f32,
    pub velocity: f32,
    pub score: f32,
    pub alive: bool,
    pub ticks_since_jump: u32,
    pub can_jump: bool,
    pub cause: Option<DeathCause>,
    /// Physics steps taken while alive
    pub ticks_alive: u64,
    config: BirdConfig,
}

impl Bird {
    pub fn new(config: BirdConfig) -> Self {
        Self {
            y: config.start_y,
            velocity: 0.0,
            score: 0.0,
            alive: true,
            ticks_since_jump: 0,
            can_jump: true,
            cause: None,
            ticks_alive: 0,
            config,
        }
    }

    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    pub fn radius(&self) -> f32 {
        self.config.radius
    }

    pub fn config(&self) -> &BirdConfig {
        &self.config
    }

    /// Advance one fixed step of `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.velocity -= self.config.gravity * dt;
        self.velocity = self.velocity.max(self.config.max_falling_speed);

        self.y = (self.y + self.velocity).clamp(0.0, 1.0);
        self.ticks_since_jump = self.ticks_since_jump.saturating_add(1);
        if self.alive {
            self.ticks_alive += 1;
        }

        if !self.can_jump && self.ticks_since_jump >= self.config.jump_cooldown_ticks {
            self.can_jump = true;
        }
    }

    /// Jumping replaces the current velocity. Returns false while on cooldown.
    pub fn jump(&mut self) -> bool {
        if !self.can_jump {
            log::trace!("jump ignored, {} ticks since last", self.ticks_since_jump);
            return false;
        }
        self.can_jump = false;
        self.ticks_since_jump = 0;
        self.velocity = self.config.jump_velocity;
        true
    }

    /// Marks the bird dead. Repeated calls keep the first cause and penalty.
    pub fn die(&mut self, cause: DeathCause) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.cause = Some(cause);
        self.score -= self.config.death_penalty;
    }

    pub fn accrue(&mut self, amount: f32) {
        if self.alive {
            self.score += amount;
        }
    }

    /// Ground and ceiling are both inclusive.
    pub fn boundary_collision(&self) -> Option<DeathCause> {
        if self.y - self.config.radius <= 0.0 {
            Some(DeathCause::Ground)
        } else if self.y + self.config.radius >= 1.0 {
            Some(DeathCause::Ceiling)
        } else {
            None
        }
    }
}
