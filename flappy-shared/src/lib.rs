use serde::{Deserialize, Serialize};

/// Key the evaluation harness uses to find a genome's fitness accumulator
pub type GenomeId = u64;

/// Represents a 2D position in playfield units (height = 1.0, y grows upwards)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Why a bird left the episode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Ground,
    Ceiling,
    Obstacle,
    /// The controlling policy failed or produced an unusable output
    Policy,
}

impl DeathCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeathCause::Ground => "ground",
            DeathCause::Ceiling => "ceiling",
            DeathCause::Obstacle => "obstacle",
            DeathCause::Policy => "policy",
        }
    }
}

impl core::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the presentation layer needs to draw one bird
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BirdView {
    pub id: GenomeId,
    pub position: Position,
    pub radius: f32,
    pub alive: bool,
}

/// What the presentation layer needs to draw one pillar pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PillarView {
    /// Horizontal center of the pillar pair
    pub x: f32,
    pub gap_center: f32,
    pub gap_size: f32,
    pub width: f32,
    pub active: bool,
}

impl PillarView {
    pub fn gap_bottom(&self) -> f32 {
        self.gap_center - self.gap_size / 2.0
    }

    pub fn gap_top(&self) -> f32 {
        self.gap_center + self.gap_size / 2.0
    }
}

/// Read-only copy of the world, polled by a renderer at its own cadence
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub playfield_width: f32,
    pub birds: Vec<BirdView>,
    pub pillars: Vec<PillarView>,
}

impl FrameSnapshot {
    pub fn alive_count(&self) -> usize {
        self.birds.iter().filter(|b| b.alive).count()
    }

    pub fn active_pillar(&self) -> Option<&PillarView> {
        self.pillars.iter().find(|p| p.active)
    }
}

/// Final score of one genome for one episode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FitnessRecord {
    pub id: GenomeId,
    pub score: f32,
    /// `None` when the bird was still alive at the end of the episode
    pub cause: Option<DeathCause>,
    pub ticks_survived: u64,
}

/// Everything the harness reads back once an episode ends
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EpisodeReport {
    pub ticks: u64,
    pub pillars_passed: u64,
    /// One record per genome, in the order the harness supplied them
    pub records: Vec<FitnessRecord>,
}

impl EpisodeReport {
    pub fn best(&self) -> Option<&FitnessRecord> {
        self.records
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }

    pub fn mean_score(&self) -> f32 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.records.iter().map(|r| r.score).sum::<f32>() / self.records.len() as f32
    }

    pub fn score_of(&self, id: GenomeId) -> Option<f32> {
        self.records.iter().find(|r| r.id == id).map(|r| r.score)
    }
}
