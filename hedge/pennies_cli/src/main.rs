use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use hedge_forecast::{
    EngineSnapshot, ForecastEngine, ForecastTelemetry, GameConfig, SeededRandom, Side,
};
use serde::Serialize;
use shared_logging::LogLevel;

mod opponent;

use opponent::{Opponent, OpponentKind};

#[derive(Parser, Debug)]
#[command(
    name = "pennies",
    version,
    about = "Matching pennies against an exponential-weights forecaster"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Plays interactively; moves are read from stdin.
    Play(PlayArgs),
    /// Plays a full episode against a scripted opponent.
    Simulate(SimulateArgs),
    /// Prints the configured roster.
    Roster {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct GameArgs {
    /// TOML game configuration; the built-in roster is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured round budget.
    #[arg(long)]
    rounds: Option<usize>,
    /// Overrides the configured seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Appends JSON-lines engine logs to this file.
    #[arg(long)]
    log: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = LevelArg::Info)]
    log_level: LevelArg,
}

#[derive(Args, Debug)]
struct PlayArgs {
    #[command(flatten)]
    game: GameArgs,
    /// Rows of the standings table.
    #[arg(long, default_value_t = 5)]
    top: usize,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[command(flatten)]
    game: GameArgs,
    #[arg(long, value_enum, default_value_t = OpponentKind::Biased)]
    opponent: OpponentKind,
    /// Probability of left for the biased opponent.
    #[arg(long, default_value_t = 0.7)]
    bias: f64,
    /// Move cycle for the repeat opponent, e.g. `LLR`.
    #[arg(long, default_value = "LLR")]
    moves: String,
    /// Prints the summary as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LevelArg {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LevelArg> for LogLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Debug => Self::Debug,
            LevelArg::Info => Self::Info,
            LevelArg::Warn => Self::Warn,
            LevelArg::Error => Self::Error,
        }
    }
}

#[derive(Debug, Serialize)]
struct EpisodeSummary {
    rounds: usize,
    engine_wins: usize,
    player_wins: usize,
    cumulative_loss: f64,
    regret: f64,
    snapshot: EngineSnapshot<Side>,
}

impl EpisodeSummary {
    fn new(engine: &ForecastEngine<Side, Side>) -> Self {
        let engine_wins = engine
            .predictions()
            .iter()
            .zip(engine.outcomes())
            .filter(|(prediction, outcome)| prediction == outcome)
            .count();
        let snapshot = engine.snapshot();
        Self {
            rounds: engine.round(),
            engine_wins,
            player_wins: engine.round() - engine_wins,
            cumulative_loss: engine.cumulative_loss(),
            regret: snapshot.regret(),
            snapshot,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Play(args) => handle_play(&args),
        Commands::Simulate(args) => handle_simulate(&args),
        Commands::Roster { config } => {
            let config = load_config(config.as_ref())?;
            println!("{} experts, {} rounds", config.experts.len(), config.rounds);
            for (idx, entry) in config.experts.iter().enumerate() {
                println!(
                    "{idx:>3}  {:<36} {}",
                    entry.display_label(),
                    serde_json::to_string(&entry.strategy)?
                );
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading game config {}", path.display())),
        None => Ok(GameConfig::default()),
    }
}

fn build_engine(args: &GameArgs) -> Result<(GameConfig, ForecastEngine<Side, Side>)> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(rounds) = args.rounds {
        config.rounds = rounds;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let mut engine = config
        .build_engine(config.random_source())
        .context("building forecaster")?;
    if let Some(path) = &args.log {
        let telemetry = ForecastTelemetry::builder("pennies")
            .log_path(path)
            .min_level(args.log_level.into())
            .build()
            .with_context(|| format!("opening log {}", path.display()))?;
        engine.set_telemetry(telemetry);
    }
    Ok((config, engine))
}

fn handle_play(args: &PlayArgs) -> Result<()> {
    let (_, mut engine) = build_engine(&args.game)?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = io::stdout();

    println!(
        "{} experts, {} rounds. Type l or r each round; `reset` restarts, `quit` leaves.",
        engine.expert_count(),
        engine.round_budget()
    );
    let mut forecast = engine.predict();
    while !engine.gameover() {
        write!(
            stdout,
            "round {}/{} > ",
            engine.round() + 1,
            engine.round_budget()
        )?;
        stdout.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        match line.trim() {
            "" => continue,
            "quit" | "q" => break,
            "reset" => {
                engine.reset();
                forecast = engine.predict();
                println!("episode restarted");
                continue;
            }
            raw => {
                let played: Side = match raw.parse() {
                    Ok(side) => side,
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                };
                let verdict = if forecast == played {
                    "engine wins"
                } else {
                    "you win"
                };
                println!("engine predicted {forecast}, you played {played}: {verdict}");
                engine.update(forecast, played);
                print_standings(&engine.snapshot(), args.top);
                forecast = engine.predict();
            }
        }
    }
    print_summary(&EpisodeSummary::new(&engine), args.top);
    Ok(())
}

fn handle_simulate(args: &SimulateArgs) -> Result<()> {
    let (config, mut engine) = build_engine(&args.game)?;
    let opponent_random = config.seed.map_or_else(SeededRandom::from_entropy, |seed| {
        SeededRandom::from_seed(seed.wrapping_add(1))
    });
    let mut opponent = Opponent::build(args.opponent, args.bias, &args.moves, opponent_random)?;
    while !engine.gameover() {
        let forecast = engine.predict();
        engine.update(forecast, opponent.next_move());
    }
    let summary = EpisodeSummary::new(&engine);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, 10);
    }
    Ok(())
}

fn print_standings(snapshot: &EngineSnapshot<Side>, top: usize) {
    for standing in snapshot.standings.iter().take(top) {
        println!(
            "  {:>6.2}%  {:>7.1}  {}  {}",
            standing.weight_pct,
            standing.score,
            standing.advice.letter(),
            standing.label
        );
    }
    let actions: Vec<String> = snapshot
        .actions
        .iter()
        .map(|action| format!("{} {:.1}%", action.action, action.weight_pct))
        .collect();
    println!("  next-round weight: {}", actions.join(" | "));
}

fn print_summary(summary: &EpisodeSummary, top: usize) {
    println!(
        "rounds {} | engine {} - you {} | loss {:.0} | regret {:.1}",
        summary.rounds,
        summary.engine_wins,
        summary.player_wins,
        summary.cumulative_loss,
        summary.regret
    );
    print_standings(&summary.snapshot, top);
}
