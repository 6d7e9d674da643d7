//! The episode orchestrator.
//!
//! Every tick runs the same phases in the same order:
//!
//! 1. **Collide** -- ground, ceiling, then every pillar, for each living bird.
//!    Deaths are recorded, nobody is removed yet.
//! 2. **Physics** -- every bird still in the population steps once, including
//!    birds that died during this tick. Living birds earn the survival reward.
//! 3. **Scroll** -- pillars move left; only the head may wrap to the tail, and
//!    a wrap pays `pass_reward` to every living bird.
//! 4. **Retarget** -- exactly one pillar becomes the active one. Failing to find
//!    one aborts the episode.
//! 5. **Decide** -- each living bird's policy sees the active pillar and may
//!    jump. A failing policy kills its bird.
//! 6. **Remove** -- dead birds leave all parallel collections in one batch.

use flappy_shared::{BirdView, DeathCause, EpisodeReport, FrameSnapshot, GenomeId, Position};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

use crate::config::SimConfig;
use crate::error::{PolicyError, SimError};
use crate::pillar::{PillarQueue, Recycled};
use crate::policy::{decide_jump, Observation, Policy};
use crate::population::Population;

/// A bird that left the episode during a tick
#[derive(Debug, Clone, PartialEq)]
pub struct Death {
    pub id: GenomeId,
    pub cause: DeathCause,
    pub score: f32,
}

/// A policy that could not produce an action; its bird was killed
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyFailure {
    pub id: GenomeId,
    pub error: PolicyError,
}

/// What happened during one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub deaths: Vec<Death>,
    pub policy_failures: Vec<PolicyFailure>,
    pub recycled: Option<Recycled>,
    pub alive: usize,
}

impl TickReport {
    /// Nobody is left; the harness should stop scheduling ticks.
    pub fn is_extinct(&self) -> bool {
        self.alive == 0
    }
}

pub struct World<P> {
    config: SimConfig,
    population: Population<P>,
    pillars: PillarQueue,
    rng: ChaCha12Rng,
    tick: u64,
    pillars_passed: u64,
    aborted: bool,
}

impl<P: Policy> World<P> {
    /// Start an episode with the harness's `(id, policy)` pairs, in order.
    pub fn new(
        config: SimConfig,
        members: impl IntoIterator<Item = (GenomeId, P)>,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let mut rng = ChaCha12Rng::seed_from_u64(config.seed);
        let pillars = PillarQueue::spawn(&config, &mut rng);
        Self::with_pillars(config, members, pillars, rng)
    }

    /// Start an episode over a hand-built pillar field.
    pub fn with_pillars(
        config: SimConfig,
        members: impl IntoIterator<Item = (GenomeId, P)>,
        mut pillars: PillarQueue,
        rng: ChaCha12Rng,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let population = Population::new(members, config.bird)?;
        pillars.update_active_flag(config.bird_x(), 0)?;

        log::info!(
            "Episode starting: {} birds, {} pillars, seed {}",
            population.len(),
            pillars.len(),
            config.seed
        );

        Ok(Self {
            config,
            population,
            pillars,
            rng,
            tick: 0,
            pillars_passed: 0,
            aborted: false,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn population(&self) -> &Population<P> {
        &self.population
    }

    pub fn pillars(&self) -> &PillarQueue {
        &self.pillars
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn pillars_passed(&self) -> u64 {
        self.pillars_passed
    }

    pub fn is_extinct(&self) -> bool {
        self.population.alive_count() == 0
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Run one full tick. After an error the episode is over for good.
    ///
    /// A failed retarget leaves that tick's collide, physics and scroll results
    /// in place, so an aborted world no longer describes a valid episode state.
    /// [`World::finish`] refuses to report it.
    pub fn tick(&mut self) -> Result<TickReport, SimError> {
        if self.aborted {
            return Err(SimError::Aborted);
        }
        self.tick += 1;

        self.collide();
        self.step_physics();
        let recycled = self.scroll();
        if let Err(err) = self.pillars.update_active_flag(self.config.bird_x(), self.tick) {
            log::error!("Aborting episode: {}", err);
            self.aborted = true;
            return Err(err);
        }
        let policy_failures = self.decide();

        let deaths: Vec<Death> = self
            .population
            .remove_dead()
            .into_iter()
            .filter_map(|record| {
                record.cause.map(|cause| Death {
                    id: record.id,
                    cause,
                    score: record.score,
                })
            })
            .collect();

        let alive = self.population.alive_count();
        log::trace!(
            "tick {}: {} alive, {} died",
            self.tick,
            alive,
            deaths.len()
        );

        Ok(TickReport {
            tick: self.tick,
            deaths,
            policy_failures,
            recycled,
            alive,
        })
    }

    fn collide(&mut self) {
        let bird_x = self.config.bird_x();
        let (ids, birds, _) = self.population.members_mut();
        for (id, bird) in ids.iter().zip(birds.iter_mut()) {
            if !bird.alive {
                continue;
            }
            let cause = bird.boundary_collision().or_else(|| {
                self.pillars
                    .iter()
                    .any(|p| p.collides_with(bird_x, bird.y, bird.radius()))
                    .then_some(DeathCause::Obstacle)
            });
            if let Some(cause) = cause {
                bird.die(cause);
                log::debug!(
                    "Bird {} hit the {} at tick {} (score {:.2})",
                    id,
                    cause,
                    self.tick,
                    bird.score
                );
            }
        }
    }

    fn step_physics(&mut self) {
        let dt = self.config.dt();
        let reward = self.config.survival_reward;
        for bird in self.population.birds_mut() {
            bird.step(dt);
            bird.accrue(reward);
        }
    }

    fn scroll(&mut self) -> Option<Recycled> {
        self.pillars.advance_all(self.config.pillar.scroll_speed);
        let recycled = self.pillars.recycle_head(&mut self.rng)?;

        self.pillars_passed += 1;
        let reward = self.config.pass_reward;
        for bird in self.population.birds_mut() {
            bird.accrue(reward);
        }
        log::debug!(
            "Pillar recycled from x={:.3} to x={:.3}, {} birds rewarded",
            recycled.old_x,
            recycled.new_x,
            self.population.alive_count()
        );
        Some(recycled)
    }

    fn decide(&mut self) -> Vec<PolicyFailure> {
        let mut failures = Vec::new();
        let Some(active) = self.pillars.active() else {
            return failures;
        };

        let (ids, birds, policies) = self.population.members_mut();
        for ((id, bird), policy) in ids.iter().zip(birds.iter_mut()).zip(policies.iter()) {
            if !bird.alive {
                continue;
            }
            match decide_jump(policy, &Observation::new(bird, active)) {
                Ok(true) => {
                    bird.jump();
                }
                Ok(false) => {}
                Err(error) => {
                    log::warn!("Policy for bird {} failed: {}", id, error);
                    bird.die(DeathCause::Policy);
                    failures.push(PolicyFailure { id: *id, error });
                }
            }
        }
        failures
    }

    /// Copy of the current state for a renderer.
    pub fn snapshot(&self) -> FrameSnapshot {
        let bird_x = self.config.bird_x();
        FrameSnapshot {
            tick: self.tick,
            playfield_width: self.config.playfield_width,
            birds: self
                .population
                .ids()
                .iter()
                .zip(self.population.birds())
                .map(|(&id, bird)| BirdView {
                    id,
                    position: Position::new(bird_x, bird.y),
                    radius: bird.radius(),
                    alive: bird.alive,
                })
                .collect(),
            pillars: self.pillars.views(),
        }
    }

    /// End the episode and hand every score back to the harness.
    pub fn finish(self) -> Result<EpisodeReport, SimError> {
        if self.aborted {
            return Err(SimError::Aborted);
        }
        let report = EpisodeReport {
            ticks: self.tick,
            pillars_passed: self.pillars_passed,
            records: self.population.into_records(),
        };
        if let Some(best) = report.best() {
            log::info!(
                "Episode finished after {} ticks, {} pillars passed, best bird {} scored {:.2}",
                report.ticks,
                report.pillars_passed,
                best.id,
                best.score
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pillar::Pillar;
    use crate::policy::{from_fn, INPUT_SIZE};

    fn constant(output: f32) -> Box<dyn Policy> {
        Box::new(from_fn(move |_: &[f32; INPUT_SIZE]| output))
    }

    struct Failing;

    impl Policy for Failing {
        fn decide(&self, _inputs: &[f32; INPUT_SIZE]) -> Result<f32, PolicyError> {
            Err(PolicyError::Failed("boom".into()))
        }
    }

    /// Birds hover at the gap center and only pillars move.
    fn calm_config() -> SimConfig {
        let mut config = SimConfig {
            survival_reward: 0.0,
            ..SimConfig::default()
        };
        config.bird.gravity = 0.0;
        config.bird.start_y = 0.5;
        config
    }

    fn field(xs: &[f32], config: &SimConfig) -> PillarQueue {
        let pillars = xs.iter().map(|&x| {
            Pillar::new(x, config.pillar.gap_size, config.pillar.width).with_gap_center(0.5)
        });
        PillarQueue::new(pillars, config.pillar)
    }

    fn members(n: u64, output: f32) -> Vec<(GenomeId, Box<dyn Policy>)> {
        (0..n).map(|id| (id, constant(output))).collect()
    }

    #[test]
    fn test_world_creation() {
        let world = World::new(SimConfig::default(), members(10, 0.0)).unwrap();
        assert_eq!(world.population().len(), 10);
        assert_eq!(world.pillars().len(), 3);
        assert_eq!(world.pillars().iter().filter(|p| p.active).count(), 1);
        assert_eq!(world.tick_count(), 0);
    }

    #[test]
    fn test_world_rejects_invalid_config() {
        let mut config = SimConfig::default();
        config.pillar.spacing = -1.0;
        assert!(matches!(
            World::new(config, members(1, 0.0)),
            Err(SimError::Config(_))
        ));
    }

    #[test]
    fn test_ground_death_is_removed_at_end_of_tick() {
        let mut config = SimConfig::default();
        config.bird.start_y = 0.0;
        let mut world = World::new(config, members(1, 0.0)).unwrap();

        let report = world.tick().unwrap();

        assert_eq!(report.deaths.len(), 1);
        assert_eq!(report.deaths[0].cause, DeathCause::Ground);
        assert_eq!(report.deaths[0].score, -1.0);
        assert!(report.is_extinct());
        assert_eq!(world.population().len(), 0);
    }

    #[test]
    fn test_ceiling_death() {
        let mut config = SimConfig::default();
        config.bird.start_y = 1.0;
        let mut world = World::new(config, members(2, 0.0)).unwrap();
        let report = world.tick().unwrap();
        assert!(report.deaths.iter().all(|d| d.cause == DeathCause::Ceiling));
        assert_eq!(report.deaths.len(), 2);
    }

    #[test]
    fn test_obstacle_death() {
        let mut config = calm_config();
        config.bird.start_y = 0.2;
        let pillars = field(&[0.6, 1.32, 2.04], &config);
        let rng = ChaCha12Rng::seed_from_u64(1);
        let mut world = World::with_pillars(config, members(1, 0.0), pillars, rng).unwrap();

        let report = world.tick().unwrap();
        assert_eq!(report.deaths[0].cause, DeathCause::Obstacle);
    }

    #[test]
    fn test_recycle_rewards_every_living_bird_once() {
        let config = calm_config();
        let pillars = field(&[-0.085, 0.635, 1.355], &config);
        let rng = ChaCha12Rng::seed_from_u64(1);
        let mut world = World::with_pillars(config, members(3, 0.0), pillars, rng).unwrap();

        let report = world.tick().unwrap();

        let recycled = report.recycled.expect("head left the playfield");
        assert!((recycled.new_x - (1.349 + 0.72)).abs() < 1e-4);
        assert_eq!(world.pillars_passed(), 1);
        assert!(world
            .population()
            .birds()
            .iter()
            .all(|b| (b.score - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_queue_unchanged_without_recycle() {
        let mut config = calm_config();
        config.pillar.scroll_speed = 0.0;
        let mut world = World::new(config, members(2, 0.0)).unwrap();
        let before: Vec<f32> = world.pillars().iter().map(|p| p.x).collect();

        for _ in 0..200 {
            let report = world.tick().unwrap();
            assert!(report.recycled.is_none());
        }

        let after: Vec<f32> = world.pillars().iter().map(|p| p.x).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_jump_decision_sets_velocity() {
        let config = calm_config();
        let jump_velocity = config.bird.jump_velocity;
        let mut world = World::new(config, members(1, 1.0)).unwrap();

        world.tick().unwrap();

        assert_eq!(world.population().birds()[0].velocity, jump_velocity);
    }

    #[test]
    fn test_policy_failures_remove_their_birds() {
        let config = calm_config();
        let members: Vec<(GenomeId, Box<dyn Policy>)> = (0..5u64)
            .map(|id| {
                let policy: Box<dyn Policy> = if id == 1 || id == 3 {
                    Box::new(Failing)
                } else {
                    constant(0.0)
                };
                (id, policy)
            })
            .collect();
        let mut world = World::new(config, members).unwrap();

        let report = world.tick().unwrap();

        assert_eq!(report.policy_failures.len(), 2);
        assert_eq!(world.population().ids(), &[0, 2, 4]);
        assert!(report.deaths.iter().all(|d| d.cause == DeathCause::Policy));
    }

    #[test]
    fn test_policies_stay_with_their_birds_after_removal() {
        let config = calm_config();
        let jump_velocity = config.bird.jump_velocity;
        let members: Vec<(GenomeId, Box<dyn Policy>)> = (0..5u64)
            .map(|id| {
                let policy = match id {
                    1 | 3 => constant(f32::NAN),
                    2 => constant(1.0),
                    _ => constant(0.0),
                };
                (id, policy)
            })
            .collect();
        let mut world = World::new(config, members).unwrap();

        world.tick().unwrap();
        world.tick().unwrap();

        let velocities: Vec<(GenomeId, f32)> = world
            .population()
            .ids()
            .iter()
            .copied()
            .zip(world.population().birds().iter().map(|b| b.velocity))
            .collect();
        assert_eq!(velocities, vec![(0, 0.0), (2, jump_velocity), (4, 0.0)]);
    }

    #[test]
    fn test_out_of_range_output_is_a_policy_failure() {
        let mut world = World::new(calm_config(), members(1, 7.0)).unwrap();
        let report = world.tick().unwrap();
        assert_eq!(
            report.policy_failures[0].error,
            PolicyError::OutOfRange(7.0)
        );
    }

    #[test]
    fn test_lost_target_aborts_episode() {
        let mut config = calm_config();
        config.pillar.scroll_speed = 0.02;
        // a single pillar that scrolls out of the targeting window
        let pillars = field(&[0.52], &config);
        let rng = ChaCha12Rng::seed_from_u64(1);
        let mut world = World::with_pillars(config, members(1, 0.0), pillars, rng).unwrap();

        assert!(matches!(
            world.tick(),
            Err(SimError::NoActivePillar { tick: 1, .. })
        ));
        assert!(world.is_aborted());
        assert_eq!(world.tick(), Err(SimError::Aborted));
        assert_eq!(world.finish(), Err(SimError::Aborted));
    }

    #[test]
    fn test_same_seed_same_episode() {
        let run = || {
            let mut world = World::new(SimConfig::default(), members(4, 0.0)).unwrap();
            for _ in 0..50 {
                world.tick().unwrap();
            }
            world.snapshot()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_snapshot_describes_world() {
        let world = World::new(calm_config(), members(2, 0.0)).unwrap();
        let snapshot = world.snapshot();
        assert_eq!(snapshot.birds.len(), 2);
        assert_eq!(snapshot.pillars.len(), 3);
        assert!(snapshot.active_pillar().is_some());
        assert!((snapshot.birds[0].position.x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_finish_reports_every_member() {
        let mut config = SimConfig::default();
        config.bird.start_y = 0.0;
        let mut world = World::new(config, members(3, 0.0)).unwrap();
        world.tick().unwrap();

        let report = world.finish().unwrap();
        assert_eq!(report.records.len(), 3);
        assert_eq!(
            report.records.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }
}
