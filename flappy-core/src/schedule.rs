//! Two periodic tasks sharing one world on one thread.
//!
//! The simulation tick and the render task each keep their own period. They
//! are not synchronized with each other: a render sees whatever state the last
//! completed tick left behind. Ties go to the tick.

use std::time::Duration;

use flappy_shared::{EpisodeReport, FrameSnapshot};

use crate::config::SimConfig;
use crate::error::SimError;
use crate::policy::Policy;
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Tick,
    Render,
}

/// A fixed-period timer on a virtual clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Periodic {
    period: Duration,
    next_due: Duration,
}

impl Periodic {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: Duration::ZERO,
        }
    }

    pub fn next_due(&self) -> Duration {
        self.next_due
    }

    fn fire(&mut self) -> Duration {
        let due = self.next_due;
        self.next_due += self.period;
        due
    }
}

/// Event loop over virtual time. Nothing sleeps; tasks come out in due order.
#[derive(Debug, Clone)]
pub struct Scheduler {
    tick: Option<Periodic>,
    render: Periodic,
    now: Duration,
}

impl Scheduler {
    pub fn new(tick_period: Duration, render_period: Duration) -> Self {
        Self {
            tick: Some(Periodic::new(tick_period)),
            render: Periodic::new(render_period),
            now: Duration::ZERO,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            Duration::from_millis(config.tick_interval_ms),
            Duration::from_millis(config.render_interval_ms),
        )
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Withhold every future tick. Renders keep their schedule.
    pub fn stop_ticks(&mut self) {
        self.tick = None;
    }

    pub fn ticks_running(&self) -> bool {
        self.tick.is_some()
    }

    /// Advance the clock to the earliest due task and return it.
    pub fn next(&mut self) -> (Duration, Task) {
        let (due, task) = match self.tick.as_mut() {
            Some(tick) if tick.next_due() <= self.render.next_due() => (tick.fire(), Task::Tick),
            _ => (self.render.fire(), Task::Render),
        };
        self.now = due;
        (due, task)
    }
}

/// Presentation layer hook, called on the render task's own cadence
pub trait Renderer {
    fn render(&mut self, snapshot: &FrameSnapshot);
}

impl<F> Renderer for F
where
    F: FnMut(&FrameSnapshot),
{
    fn render(&mut self, snapshot: &FrameSnapshot) {
        self(snapshot)
    }
}

/// Renderer for headless runs
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _snapshot: &FrameSnapshot) {}
}

/// Budget the harness puts on one episode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpisodeLimits {
    /// `None` runs until every bird is dead
    pub max_ticks: Option<u64>,
}

impl EpisodeLimits {
    pub fn ticks(max_ticks: u64) -> Self {
        Self {
            max_ticks: Some(max_ticks),
        }
    }

    pub fn exhausted(&self, ticks: u64) -> bool {
        self.max_ticks.is_some_and(|max| ticks >= max)
    }
}

/// Drive `world` on virtual time until extinction or the tick budget runs out.
pub fn run_episode<P, R>(
    mut world: World<P>,
    renderer: &mut R,
    limits: EpisodeLimits,
) -> Result<EpisodeReport, SimError>
where
    P: Policy,
    R: Renderer + ?Sized,
{
    let mut scheduler = Scheduler::from_config(world.config());
    if limits.exhausted(world.tick_count()) {
        scheduler.stop_ticks();
    }
    while scheduler.ticks_running() {
        match scheduler.next() {
            (_, Task::Tick) => {
                let report = world.tick()?;
                if report.is_extinct() || limits.exhausted(world.tick_count()) {
                    scheduler.stop_ticks();
                }
            }
            (_, Task::Render) => renderer.render(&world.snapshot()),
        }
    }
    renderer.render(&world.snapshot());
    log::debug!(
        "Episode stopped at {:?} of simulated time",
        scheduler.now()
    );
    world.finish()
}
