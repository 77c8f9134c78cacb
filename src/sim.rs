//! Episode runner and batch trials.
//!
//! One episode is a strict turn loop: the world reports position and
//! percept, the agent decides, the world applies the move, until the agent
//! dies, finds the gold, or hits the step cap. Batch trials run many
//! independent episodes in parallel; every trial owns its own world, agent,
//! knowledge base, and oracle, so nothing is shared across threads.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::agent::{Agent, ExplorerAgent, MoveKind, RandomWalkAgent};
use crate::error::SpelunkResult;
use crate::grid::{Cell, Direction};
use crate::world::{Percept, World};

/// Which agent drives an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    /// The knowledge-based explorer.
    Explorer,
    /// The random-walk baseline.
    Random,
}

/// Terminal state of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeOutcome {
    /// The agent reached the gold alive.
    Won,
    /// The agent stepped onto a pit or the Wumpus.
    Died,
    /// The step cap elapsed first.
    StepLimit,
}

impl std::fmt::Display for EpisodeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EpisodeOutcome::Won => "won",
            EpisodeOutcome::Died => "died",
            EpisodeOutcome::StepLimit => "step limit reached",
        };
        write!(f, "{name}")
    }
}

/// One entry of the move log: the state after applying a decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    pub step: usize,
    pub direction: Direction,
    pub kind: MoveKind,
    /// Position after the move was applied (unchanged if rejected).
    pub position: Cell,
    /// Percept at the resulting position.
    pub percept: Percept,
}

/// Full account of one episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeReport {
    pub outcome: EpisodeOutcome,
    pub steps: usize,
    pub log: Vec<StepRecord>,
}

/// Drive `agent` through `world` until a terminal state or the step cap.
pub fn run_episode(
    world: &mut World,
    agent: &mut dyn Agent,
    max_steps: usize,
) -> SpelunkResult<EpisodeReport> {
    let mut log = Vec::new();
    let mut step = 0;

    while step < max_steps && world.is_alive() && !world.gold_found() {
        let position = world.agent_position();
        let percept = world.percepts(position);
        let decision = agent.choose_action(position, percept)?;
        world.apply(decision.direction);

        let position = world.agent_position();
        let percept = world.percepts(position);
        tracing::debug!(
            step,
            direction = %decision.direction,
            kind = %decision.kind,
            %position,
            "applied move"
        );
        log.push(StepRecord {
            step,
            direction: decision.direction,
            kind: decision.kind,
            position,
            percept,
        });
        step += 1;
    }

    let outcome = if !world.is_alive() {
        EpisodeOutcome::Died
    } else if world.gold_found() {
        EpisodeOutcome::Won
    } else {
        EpisodeOutcome::StepLimit
    };
    tracing::info!(%outcome, steps = step, "episode finished");
    Ok(EpisodeReport {
        outcome,
        steps: step,
        log,
    })
}

/// Run `kind` in an existing world, seeding the agent's randomness.
pub fn run_in_world(
    world: &mut World,
    kind: AgentKind,
    seed: u64,
    max_steps: usize,
) -> SpelunkResult<EpisodeReport> {
    match kind {
        AgentKind::Explorer => {
            let mut agent = ExplorerAgent::new(world.grid(), seed)?;
            run_episode(world, &mut agent, max_steps)
        }
        AgentKind::Random => {
            let mut agent = RandomWalkAgent::new(seed);
            run_episode(world, &mut agent, max_steps)
        }
    }
}

/// Generate a world from `seed` and run one episode in it.
///
/// The same seed reproduces the same world, the same agent decisions, and
/// the same move log.
pub fn run_seeded_episode(
    seed: u64,
    size: usize,
    num_pits: usize,
    kind: AgentKind,
    max_steps: usize,
) -> SpelunkResult<EpisodeReport> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = World::generate(size, num_pits, &mut rng)?;
    run_in_world(&mut world, kind, seed, max_steps)
}

/// Parameters for a batch of independent trials.
#[derive(Debug, Clone, Copy)]
pub struct TrialConfig {
    pub count: usize,
    pub size: usize,
    pub num_pits: usize,
    pub max_steps: usize,
    pub seed: u64,
    pub agent: AgentKind,
}

/// Aggregate outcome counts over a batch of trials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrialStats {
    pub episodes: usize,
    pub wins: usize,
    pub deaths: usize,
    pub step_limited: usize,
}

impl TrialStats {
    pub fn win_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.wins as f64 / self.episodes as f64
        }
    }
}

impl std::fmt::Display for TrialStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "episodes:     {}", self.episodes)?;
        writeln!(f, "wins:         {}", self.wins)?;
        writeln!(f, "deaths:       {}", self.deaths)?;
        writeln!(f, "step-limited: {}", self.step_limited)?;
        write!(f, "win rate:     {:.1}%", self.win_rate() * 100.0)
    }
}

/// Run `config.count` independent episodes in parallel and tally outcomes.
///
/// Trial `i` derives its seed as `config.seed + i`, so a batch is fully
/// reproducible and each episode is independently re-runnable.
pub fn run_trials(config: &TrialConfig) -> SpelunkResult<TrialStats> {
    use rayon::prelude::*;

    let outcomes: Vec<EpisodeOutcome> = (0..config.count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed.wrapping_add(i as u64);
            let report = run_seeded_episode(
                seed,
                config.size,
                config.num_pits,
                config.agent,
                config.max_steps,
            )?;
            Ok(report.outcome)
        })
        .collect::<SpelunkResult<_>>()?;

    let mut stats = TrialStats::default();
    for outcome in outcomes {
        stats.episodes += 1;
        match outcome {
            EpisodeOutcome::Won => stats.wins += 1,
            EpisodeOutcome::Died => stats.deaths += 1,
            EpisodeOutcome::StepLimit => stats.step_limited += 1,
        }
    }
    Ok(stats)
}
