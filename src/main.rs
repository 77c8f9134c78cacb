//! spelunk CLI: run, measure, and inspect hazard-grid exploration episodes.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use spelunk::agent::{Agent, ExplorerAgent};
use spelunk::sim::{self, AgentKind, TrialConfig};
use spelunk::world::World;

#[derive(Parser)]
#[command(name = "spelunk", version, about = "SAT-backed hazard-grid exploration agent")]
struct Cli {
    /// Seed for world generation and agent randomness.
    #[arg(long, global = true, default_value = "0")]
    seed: u64,

    /// Grid side length.
    #[arg(long, global = true, default_value = "8")]
    size: usize,

    /// Number of pits to place.
    #[arg(long, global = true, default_value = "3")]
    pits: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single episode.
    Run {
        /// Maximum number of turns before giving up.
        #[arg(long, default_value = "200")]
        max_steps: usize,

        /// Which agent to run.
        #[arg(long, value_enum, default_value = "cnf")]
        agent: AgentArg,

        /// Load the world from a JSON file instead of generating one.
        #[arg(long)]
        load: Option<PathBuf>,

        /// Save the generated world to a JSON file before running.
        #[arg(long)]
        save: Option<PathBuf>,

        /// Print the agent's world view after every turn.
        #[arg(long)]
        view: bool,
    },

    /// Run a batch of independent episodes and report aggregate statistics.
    Trials {
        /// Number of episodes.
        #[arg(long, default_value = "100")]
        count: usize,

        /// Maximum number of turns per episode.
        #[arg(long, default_value = "200")]
        max_steps: usize,

        /// Which agent to run.
        #[arg(long, value_enum, default_value = "cnf")]
        agent: AgentArg,
    },

    /// Generate a winnable world and write it to a JSON file.
    Generate {
        /// Output path.
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AgentArg {
    /// Knowledge-based explorer (CNF + SAT).
    Cnf,
    /// Random-walk baseline.
    Random,
}

impl From<AgentArg> for AgentKind {
    fn from(arg: AgentArg) -> Self {
        match arg {
            AgentArg::Cnf => AgentKind::Explorer,
            AgentArg::Random => AgentKind::Random,
        }
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            max_steps,
            agent,
            load,
            save,
            view,
        } => {
            let mut world = match load {
                Some(path) => {
                    let world = World::load(&path).into_diagnostic()?;
                    println!("Loaded {}x{} world from {}", world.size(), world.size(), path.display());
                    world
                }
                None => {
                    let mut rng = StdRng::seed_from_u64(cli.seed);
                    World::generate(cli.size, cli.pits, &mut rng).into_diagnostic()?
                }
            };
            if let Some(path) = save {
                world.save(&path).into_diagnostic()?;
                println!("Saved world to {}", path.display());
            }

            let report = if view {
                run_with_view(&mut world, agent.into(), cli.seed, max_steps)?
            } else {
                sim::run_in_world(&mut world, agent.into(), cli.seed, max_steps)
                    .into_diagnostic()?
            };

            for record in &report.log {
                println!(
                    "step {:>3}: {:<5} [{}] -> {} | breeze={} stench={} glitter={}",
                    record.step,
                    record.direction.to_string(),
                    record.kind,
                    record.position,
                    record.percept.breeze,
                    record.percept.stench,
                    record.percept.glitter,
                );
            }
            println!("outcome: {} after {} steps", report.outcome, report.steps);
        }

        Commands::Trials {
            count,
            max_steps,
            agent,
        } => {
            let stats = sim::run_trials(&TrialConfig {
                count,
                size: cli.size,
                num_pits: cli.pits,
                max_steps,
                seed: cli.seed,
                agent: agent.into(),
            })
            .into_diagnostic()?;
            println!("{stats}");
        }

        Commands::Generate { out } => {
            let mut rng = StdRng::seed_from_u64(cli.seed);
            let world = World::generate(cli.size, cli.pits, &mut rng).into_diagnostic()?;
            world.save(&out).into_diagnostic()?;
            println!(
                "Generated winnable {}x{} world with {} pits at {}",
                cli.size,
                cli.size,
                cli.pits,
                out.display()
            );
        }
    }

    Ok(())
}

/// Episode loop that prints the explorer's world view after every turn.
///
/// Only the explorer has a view; the random baseline falls back to the
/// plain runner.
fn run_with_view(
    world: &mut World,
    kind: AgentKind,
    seed: u64,
    max_steps: usize,
) -> Result<sim::EpisodeReport> {
    let AgentKind::Explorer = kind else {
        return sim::run_in_world(world, kind, seed, max_steps).into_diagnostic();
    };

    let mut agent = ExplorerAgent::new(world.grid(), seed).into_diagnostic()?;
    let mut log = Vec::new();
    let mut step = 0;

    while step < max_steps && world.is_alive() && !world.gold_found() {
        let position = world.agent_position();
        let percept = world.percepts(position);
        let decision = agent.choose_action(position, percept).into_diagnostic()?;
        world.apply(decision.direction);

        let position = world.agent_position();
        println!("-- step {step} ({}) --", decision.kind);
        for row in agent.world_view(position).into_diagnostic()? {
            println!("{row}");
        }
        log.push(sim::StepRecord {
            step,
            direction: decision.direction,
            kind: decision.kind,
            position,
            percept: world.percepts(position),
        });
        step += 1;
    }

    let outcome = if !world.is_alive() {
        sim::EpisodeOutcome::Died
    } else if world.gold_found() {
        sim::EpisodeOutcome::Won
    } else {
        sim::EpisodeOutcome::StepLimit
    };
    Ok(sim::EpisodeReport {
        outcome,
        steps: step,
        log,
    })
}
