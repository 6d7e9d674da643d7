//! Pillar pairs and the scrolling queue that recycles them.

use std::collections::VecDeque;

use flappy_shared::PillarView;
use rand::Rng;

use crate::config::{PillarConfig, SimConfig};
use crate::error::SimError;
use crate::geometry::{spans_overlap, Rect, Vector2D};

/// A top and bottom pillar with a vertical gap between them
#[derive(Debug, Clone, PartialEq)]
pub struct Pillar {
    /// Horizontal center
    pub x: f32,
    /// Vertical center of the gap
    pub gap_center: f32,
    pub gap_size: f32,
    pub width: f32,
    pub active: bool,
}

impl Pillar {
    pub fn new(x: f32, gap_size: f32, width: f32) -> Self {
        Self {
            x,
            gap_center: 0.5,
            gap_size,
            width,
            active: false,
        }
    }

    pub fn with_gap_center(mut self, gap_center: f32) -> Self {
        self.gap_center = gap_center;
        self
    }

    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    pub fn left(&self) -> f32 {
        self.x - self.half_width()
    }

    pub fn right(&self) -> f32 {
        self.x + self.half_width()
    }

    pub fn gap_bottom(&self) -> f32 {
        self.gap_center - self.gap_size / 2.0
    }

    pub fn gap_top(&self) -> f32 {
        self.gap_center + self.gap_size / 2.0
    }

    pub fn bottom_body(&self) -> Rect {
        Rect::from_spans(self.x, self.width, 0.0, self.gap_bottom())
    }

    pub fn top_body(&self) -> Rect {
        Rect::from_spans(self.x, self.width, self.gap_top(), 1.0)
    }

    /// Draw a new gap center uniformly from `[min, max]`.
    pub fn randomize_height<R: Rng + ?Sized>(&mut self, rng: &mut R, min: f32, max: f32) {
        self.gap_center = if min < max {
            rng.gen_range(min..=max)
        } else {
            min
        };
    }

    pub fn advance(&mut self, dx: f32) {
        self.x -= dx;
    }

    /// Fully past the left edge of the playfield
    pub fn is_offscreen(&self) -> bool {
        self.x + self.half_width() < 0.0
    }

    /// Hit test for a bird of `radius` at `(bird_x, y)`.
    pub fn collides_with(&self, bird_x: f32, y: f32, radius: f32) -> bool {
        if !spans_overlap(bird_x - radius, bird_x + radius, self.left(), self.right()) {
            return false;
        }

        let wholly_below = y + radius <= self.gap_bottom();
        let wholly_above = y - radius >= self.gap_top();
        if wholly_below || wholly_above {
            return true;
        }

        let center = Vector2D::new(bird_x, y);
        self.bottom_body().intersects_circle(center, radius)
            || self.top_body().intersects_circle(center, radius)
    }

    pub fn view(&self) -> PillarView {
        PillarView {
            x: self.x,
            gap_center: self.gap_center,
            gap_size: self.gap_size,
            width: self.width,
            active: self.active,
        }
    }
}

/// Emitted when the head pillar wraps around to the tail
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recycled {
    pub old_x: f32,
    pub new_x: f32,
    pub gap_center: f32,
}

/// Pillars ordered by ascending x
#[derive(Debug, Clone)]
pub struct PillarQueue {
    pillars: VecDeque<Pillar>,
    config: PillarConfig,
}

impl PillarQueue {
    pub fn new(pillars: impl IntoIterator<Item = Pillar>, config: PillarConfig) -> Self {
        Self {
            pillars: pillars.into_iter().collect(),
            config,
        }
    }

    /// Lay out the opening pillar field, starting one offset right of the birds.
    pub fn spawn<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> Self {
        let pillar_config = config.pillar;
        let first_x = config.bird_x() + pillar_config.first_offset;
        let pillars = (0..config.pillar_count())
            .map(|i| {
                let mut pillar = Pillar::new(
                    first_x + i as f32 * pillar_config.spacing,
                    pillar_config.gap_size,
                    pillar_config.width,
                );
                pillar.randomize_height(
                    rng,
                    pillar_config.gap_center_min,
                    pillar_config.gap_center_max,
                );
                pillar
            })
            .collect::<Vec<_>>();
        Self::new(pillars, pillar_config)
    }

    pub fn len(&self) -> usize {
        self.pillars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pillars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pillar> {
        self.pillars.iter()
    }

    pub fn advance_all(&mut self, dx: f32) {
        for pillar in self.pillars.iter_mut() {
            pillar.advance(dx);
        }
    }

    /// Move the head to the tail if it has left the playfield.
    ///
    /// Only the head is inspected, so at most one pillar wraps per call.
    pub fn recycle_head<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Recycled> {
        if !self.pillars.front()?.is_offscreen() {
            return None;
        }
        let mut pillar = self.pillars.pop_front()?;
        let tail_x = self.pillars.back().map_or(pillar.x, |tail| tail.x);

        let old_x = pillar.x;
        pillar.x = tail_x + self.config.spacing;
        pillar.active = false;
        pillar.randomize_height(rng, self.config.gap_center_min, self.config.gap_center_max);

        let recycled = Recycled {
            old_x,
            new_x: pillar.x,
            gap_center: pillar.gap_center,
        };
        self.pillars.push_back(pillar);
        Some(recycled)
    }

    /// Flag the first pillar inside `(reference_x - w/2, reference_x + spacing + w/2]`.
    ///
    /// Returns the index of the active pillar. Every other flag is cleared, so at
    /// most one pillar is active even when two fall inside the window.
    pub fn update_active_flag(&mut self, reference_x: f32, tick: u64) -> Result<usize, SimError> {
        let half_width = self.config.half_width();
        let low = reference_x - half_width;
        let high = reference_x + self.config.spacing + half_width;

        let mut active = None;
        for (i, pillar) in self.pillars.iter_mut().enumerate() {
            let qualifies = active.is_none() && pillar.x > low && pillar.x <= high;
            pillar.active = qualifies;
            if qualifies {
                active = Some(i);
            }
        }

        active.ok_or(SimError::NoActivePillar { reference_x, tick })
    }

    pub fn active(&self) -> Option<&Pillar> {
        self.pillars.iter().find(|p| p.active)
    }

    pub fn views(&self) -> Vec<PillarView> {
        self.pillars.iter().map(Pillar::view).collect()
    }
}
