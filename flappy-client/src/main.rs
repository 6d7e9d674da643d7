use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flappy_client::harness::{Trainer, TrainerConfig};
use flappy_client::realtime::run_realtime;
use flappy_client::render::LogRenderer;
use flappy_client::settings::load_config;
use flappy_core::{EpisodeLimits, World};

#[derive(Parser, Debug)]
#[command(author, version, about = "Evolve flappy bird controllers in a headless simulation", long_about = None)]
struct Args {
    /// JSON simulation config; missing fields use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Birds per generation
    #[arg(short, long, default_value_t = 50)]
    population: usize,

    /// Number of generations to evaluate
    #[arg(short, long, default_value_t = 50)]
    generations: usize,

    /// Tick budget per episode (0 runs until every bird is dead)
    #[arg(short = 't', long, default_value_t = 10_000)]
    max_ticks: u64,

    /// Stop once the best bird reaches this score
    #[arg(short = 'f', long)]
    fitness_threshold: Option<f32>,

    /// Override the seed from the config file
    #[arg(short, long)]
    seed: Option<u64>,

    /// Replay the best genome at wall-clock speed after training
    #[arg(short, long)]
    realtime: bool,

    /// Log every n-th rendered frame during the replay
    #[arg(long, default_value_t = 60)]
    render_every: u64,

    /// Print generation summaries as JSON on stdout
    #[arg(short, long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("Flappy client starting...");

    let mut sim = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        sim.seed = seed;
    }
    log::info!("Seed: {}", sim.seed);

    let max_ticks = (args.max_ticks > 0).then_some(args.max_ticks);
    let trainer_config = TrainerConfig {
        population: args.population,
        generations: args.generations,
        fitness_threshold: args.fitness_threshold,
        max_ticks,
        ..TrainerConfig::default()
    };

    let mut trainer =
        Trainer::new(sim, trainer_config).context("Failed to initialize trainer")?;
    let history = trainer.run().context("Training failed")?;

    if args.json {
        let out = serde_json::to_string_pretty(&history).context("Failed to encode summaries")?;
        println!("{}", out);
    }

    let Some(best) = trainer.best().cloned() else {
        log::warn!("No genome was evaluated");
        return Ok(());
    };
    log::info!(
        "Best genome {} scored {:.2}",
        best.id,
        best.fitness.unwrap_or_default()
    );

    if args.realtime {
        log::info!("Replaying genome {} in real time...", best.id);
        let world = World::new(trainer.episode_config(), [(best.id, best.network)])
            .context("Failed to build replay world")?;
        let mut renderer = LogRenderer::new(args.render_every);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start runtime")?;
        let report = runtime
            .block_on(run_realtime(world, &mut renderer, EpisodeLimits { max_ticks }))
            .context("Replay failed")?;
        log::info!(
            "Replay finished after {} ticks with score {:.2}",
            report.ticks,
            report.score_of(best.id).unwrap_or_default()
        );
    }

    Ok(())
}
