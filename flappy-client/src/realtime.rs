//! Wall-clock driver: the tick and render tasks on two tokio intervals.
//!
//! Both tasks run on the caller's task, so the world is never shared across
//! threads. `biased` selection keeps ticks ahead of renders when both are due,
//! matching [`flappy_core::Scheduler`].

use std::time::Duration;

use flappy_core::{EpisodeLimits, EpisodeReport, Policy, Renderer, SimError, World};
use tokio::time::{self, MissedTickBehavior};

pub async fn run_realtime<P, R>(
    mut world: World<P>,
    renderer: &mut R,
    limits: EpisodeLimits,
) -> Result<EpisodeReport, SimError>
where
    P: Policy,
    R: Renderer + ?Sized,
{
    let mut tick_timer = time::interval(Duration::from_millis(world.config().tick_interval_ms));
    let mut render_timer =
        time::interval(Duration::from_millis(world.config().render_interval_ms));
    // a late render is skipped, never replayed in a burst
    render_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while !limits.exhausted(world.tick_count()) {
        tokio::select! {
            biased;
            _ = tick_timer.tick() => {
                let report = world.tick()?;
                if report.is_extinct() {
                    break;
                }
            }
            _ = render_timer.tick() => renderer.render(&world.snapshot()),
        }
    }

    renderer.render(&world.snapshot());
    world.finish()
}
