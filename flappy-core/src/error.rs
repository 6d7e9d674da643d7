use thiserror::Error;

/// Rejected configuration values, reported before an episode starts
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
    #[error("playfield width {0} must be positive and finite")]
    InvalidPlayfieldWidth(f32),
    #[error("bird radius {0} must be in (0, 0.5)")]
    InvalidBirdRadius(f32),
    #[error("bird start height {0} must be in [0, 1]")]
    InvalidStartY(f32),
    #[error("{0} physics constants must be finite")]
    NonFinite(&'static str),
    #[error("max falling speed {0} must be finite and not positive")]
    InvalidMaxFallingSpeed(f32),
    #[error("pillar width {0} must be positive and finite")]
    InvalidPillarWidth(f32),
    #[error("pillar spacing {0} must be positive and finite")]
    InvalidSpacing(f32),
    #[error("scroll speed {0} must be finite and not negative")]
    InvalidScrollSpeed(f32),
    #[error("gap size {0} must be in (0, 1)")]
    InvalidGapSize(f32),
    #[error("gap center range [{min}, {max}] must lie within [0, 1]")]
    InvalidGapRange { min: f32, max: f32 },
    #[error("first pillar offset {offset} is outside the targeting window for spacing {spacing}")]
    FirstPillarOutOfReach { offset: f32, spacing: f32 },
}

/// Why a policy could not produce a usable action
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolicyError {
    #[error("policy returned a non-finite output ({0})")]
    NonFinite(f32),
    #[error("policy output {0} is outside [0, 1]")]
    OutOfRange(f32),
    #[error("policy failed: {0}")]
    Failed(String),
}

/// Errors that end an episode
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("an episode needs at least one bird")]
    EmptyPopulation,

    #[error("identifier {0} was supplied more than once")]
    DuplicateId(flappy_shared::GenomeId),

    /// The pillar queue no longer covers the targeting window.
    #[error("no pillar within reach of x = {reference_x} at tick {tick}")]
    NoActivePillar { reference_x: f32, tick: u64 },

    #[error("episode was aborted by an earlier error")]
    Aborted,
}
