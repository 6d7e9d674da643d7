//! Side-scrolling flight simulation used to score a population of controllers.
//!
//! A [`World`] owns the birds, the recycled pillar queue and a seeded RNG.
//! Each call to [`World::tick`] runs one full update; [`run_episode`] drives
//! ticks and renders on a virtual clock until the population is gone.

pub mod bird;
pub mod config;
pub mod error;
pub mod geometry;
pub mod network;
pub mod pillar;
pub mod policy;
pub mod population;
pub mod schedule;
pub mod world;

pub use bird::Bird;
pub use config::{BirdConfig, PillarConfig, SimConfig};
pub use error::{ConfigError, PolicyError, SimError};
pub use geometry::{circle_rectangle_collides, spans_overlap, Rect, Vector2D};
pub use network::FeedForward;
pub use pillar::{Pillar, PillarQueue, Recycled};
pub use policy::{
    decide_jump, from_fn, FnPolicy, ManualPolicy, ManualTrigger, Observation, Policy, INPUT_SIZE,
    JUMP_THRESHOLD,
};
pub use population::Population;
pub use schedule::{run_episode, EpisodeLimits, NullRenderer, Periodic, Renderer, Scheduler, Task};
pub use world::{Death, PolicyFailure, TickReport, World};

pub use flappy_shared::{
    BirdView, DeathCause, EpisodeReport, FitnessRecord, FrameSnapshot, GenomeId, PillarView,
    Position,
};
