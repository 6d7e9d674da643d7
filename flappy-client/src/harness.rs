//! Generational driver around the evaluation harness.
//!
//! Every generation plays one episode with the whole population, reads back
//! the score of each genome, keeps the best fraction and refills the rest with
//! mutated copies of the survivors.

use anyhow::{bail, Context, Result};
use flappy_core::{
    run_episode, EpisodeLimits, EpisodeReport, FeedForward, GenomeId, NullRenderer, SimConfig,
    World,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub population: usize,
    pub generations: usize,
    /// Fraction of each generation kept unchanged for the next
    pub survival_fraction: f32,
    /// Per-weight probability of a Gaussian perturbation
    pub mutation_rate: f64,
    pub mutation_sigma: f32,
    /// Stop early once the best genome reaches this score
    pub fitness_threshold: Option<f32>,
    pub max_ticks: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            population: 50,
            generations: 50,
            survival_fraction: 0.2,
            mutation_rate: 0.2,
            mutation_sigma: 0.5,
            fitness_threshold: None,
            max_ticks: Some(10_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    pub id: GenomeId,
    pub network: FeedForward,
    /// Score from the last episode, `None` until evaluated
    pub fitness: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub generation: usize,
    pub best_id: GenomeId,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    pub ticks: u64,
    pub pillars_passed: u64,
}

pub struct Trainer {
    sim: SimConfig,
    config: TrainerConfig,
    rng: ChaCha12Rng,
    genomes: Vec<Genome>,
    next_id: GenomeId,
    generation: usize,
}

impl Trainer {
    pub fn new(sim: SimConfig, config: TrainerConfig) -> Result<Self> {
        sim.validate().context("Invalid simulation config")?;
        if config.population == 0 {
            bail!("Population size must be at least 1");
        }
        if !(0.0..=1.0).contains(&config.survival_fraction) {
            bail!(
                "Survival fraction must be within [0, 1], got {}",
                config.survival_fraction
            );
        }

        let mut rng = ChaCha12Rng::seed_from_u64(sim.seed);
        let genomes: Vec<Genome> = (0..config.population as GenomeId)
            .map(|id| Genome {
                id,
                network: FeedForward::random(&mut rng),
                fitness: None,
            })
            .collect();

        Ok(Self {
            next_id: genomes.len() as GenomeId,
            sim,
            config,
            rng,
            genomes,
            generation: 0,
        })
    }

    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Best evaluated genome so far in the current population
    pub fn best(&self) -> Option<&Genome> {
        self.genomes
            .iter()
            .filter(|g| g.fitness.is_some())
            .max_by(|a, b| {
                a.fitness
                    .unwrap_or(f32::NEG_INFINITY)
                    .total_cmp(&b.fitness.unwrap_or(f32::NEG_INFINITY))
            })
    }

    /// Config for the current generation's episode; each generation sees a new field.
    pub fn episode_config(&self) -> SimConfig {
        SimConfig {
            seed: self.sim.seed.wrapping_add(self.generation as u64),
            ..self.sim.clone()
        }
    }

    /// Play one episode with every genome and record their scores.
    pub fn evaluate(&mut self) -> Result<GenerationSummary> {
        let members: Vec<(GenomeId, FeedForward)> = self
            .genomes
            .iter()
            .map(|g| (g.id, g.network.clone()))
            .collect();
        let world = World::new(self.episode_config(), members)
            .context("Failed to build episode world")?;
        let limits = EpisodeLimits {
            max_ticks: self.config.max_ticks,
        };
        let report = run_episode(world, &mut NullRenderer, limits)
            .with_context(|| format!("Episode for generation {} failed", self.generation))?;

        for genome in &mut self.genomes {
            genome.fitness = report.score_of(genome.id);
        }
        self.summarize(&report)
    }

    fn summarize(&self, report: &EpisodeReport) -> Result<GenerationSummary> {
        let Some(best) = report.best() else {
            bail!("Episode for generation {} produced no scores", self.generation);
        };
        Ok(GenerationSummary {
            generation: self.generation,
            best_id: best.id,
            best_fitness: best.score,
            mean_fitness: report.mean_score(),
            ticks: report.ticks,
            pillars_passed: report.pillars_passed,
        })
    }

    /// Replace the population with survivors plus mutated offspring.
    pub fn next_generation(&mut self) {
        let mut ranked = std::mem::take(&mut self.genomes);
        ranked.sort_by(|a, b| {
            b.fitness
                .unwrap_or(f32::NEG_INFINITY)
                .total_cmp(&a.fitness.unwrap_or(f32::NEG_INFINITY))
        });

        let keep = ((ranked.len() as f32 * self.config.survival_fraction).ceil() as usize)
            .clamp(1, ranked.len());
        ranked.truncate(keep);

        let mut offspring = Vec::with_capacity(self.config.population - keep);
        while keep + offspring.len() < self.config.population {
            let parent = &ranked[self.rng.gen_range(0..keep)];
            let network = parent.network.mutate(
                &mut self.rng,
                self.config.mutation_rate,
                self.config.mutation_sigma,
            );
            offspring.push(Genome {
                id: self.next_id,
                network,
                fitness: None,
            });
            self.next_id += 1;
        }

        for survivor in &mut ranked {
            survivor.fitness = None;
        }
        ranked.extend(offspring);
        self.genomes = ranked;
        self.generation += 1;
    }

    /// Run until the generation budget is spent or the fitness threshold is met.
    ///
    /// The population is left evaluated, so [`Trainer::best`] names the winner.
    pub fn run(&mut self) -> Result<Vec<GenerationSummary>> {
        let mut history = Vec::new();
        for remaining in (0..self.config.generations).rev() {
            let summary = self.evaluate()?;
            log::info!(
                "Generation {}: best {} ({:.2}), mean {:.2}, {} ticks, {} pillars",
                summary.generation,
                summary.best_id,
                summary.best_fitness,
                summary.mean_fitness,
                summary.ticks,
                summary.pillars_passed
            );

            let solved = self
                .config
                .fitness_threshold
                .is_some_and(|threshold| summary.best_fitness >= threshold);
            history.push(summary);
            if solved {
                log::info!("Fitness threshold reached, stopping");
                break;
            }
            if remaining > 0 {
                self.next_generation();
            }
        }
        Ok(history)
    }
}
