use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use robot_control::{LevelAuthor, Pacing, RunOutcome, SessionController};
use robot_core::{parse_moves, Difficulty, Event, EventEnvelope, Level, LevelId, RobotState};
use robot_world::{load_content, ExternalAuthor, FileSource, ProceduralAuthor, WorldContent};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "robot_cli", about = "Grid robot puzzle in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the predefined levels.
    Levels {
        #[arg(long, default_value = "./content")]
        content_dir: String,
    },
    /// Queue a move string and play it back step by step.
    Play {
        /// Moves such as "RRDD" (U, D, L, R; commas and spaces ignored).
        moves: String,
        /// Catalog level id. Defaults to the first level.
        #[arg(long)]
        level: Option<String>,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        /// Skip all playback delays.
        #[arg(long, conflicts_with_all = ["settle_ms", "step_ms"])]
        instant: bool,
        #[arg(long)]
        settle_ms: Option<u64>,
        #[arg(long)]
        step_ms: Option<u64>,
        /// On success, load and show the next level.
        #[arg(long)]
        advance: bool,
        /// Difficulty requested once the catalog is exhausted.
        #[arg(long, value_enum, default_value = "medium")]
        difficulty: DifficultyArg,
        /// Seed for generated levels. Random if omitted.
        #[arg(long)]
        seed: Option<u64>,
        /// Take endless-mode levels from this JSON document instead of
        /// generating them.
        #[arg(long)]
        authored_file: Option<PathBuf>,
    },
    /// Generate a level and print it as JSON.
    Generate {
        #[arg(long, value_enum, default_value = "medium")]
        difficulty: DifficultyArg,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "./content")]
        content_dir: String,
    },
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_grid(level: &Level, robot: RobotState) -> String {
    let mut out = String::new();
    for y in 0..level.grid_size as i32 {
        for x in 0..level.grid_size as i32 {
            let cell = robot_core::Position::new(x, y);
            let symbol = if cell == robot.position {
                robot.facing.glyph()
            } else if level.is_obstacle(cell) {
                '#'
            } else if cell == level.goal {
                'G'
            } else if cell == level.start {
                'S'
            } else {
                '.'
            };
            out.push(symbol);
            out.push(' ');
        }
        out.push('\n');
    }
    out
}

fn print_events(batch: &[EventEnvelope]) {
    for envelope in batch {
        match &envelope.event {
            Event::RunStarted { commands } => println!("running {commands} command(s)"),
            Event::StepStarted { index, facing } => {
                println!("  step {:>3}  {} {facing}", index + 1, facing.glyph());
            }
            Event::RobotMoved { from, to, .. } => println!("            {from} -> {to}"),
            Event::Collided {
                attempted,
                collision,
                ..
            } => println!("            blocked at {attempted} ({collision:?})"),
            Event::RunCancelled { .. } => println!("stopped, robot back at start"),
            Event::LevelLoaded { level_id, .. } => println!("level {level_id} loaded"),
            Event::RunFinished { .. } | Event::QueueChanged { .. } | Event::SessionReset { .. } => {}
        }
    }
}

fn print_level(level: &Level) {
    let par = level
        .par
        .map_or_else(|| "-".to_string(), |p| p.to_string());
    println!(
        "{:<12} {:<24} {}x{}  par {par}",
        level.id.0, level.name, level.grid_size, level.grid_size
    );
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn list_levels(content_dir: &str) -> Result<()> {
    let content = load_content(content_dir)?;
    println!("content_version={}", content.content_version);
    for level in content.catalog.iter() {
        print_level(level);
    }
    Ok(())
}

fn build_author(
    content: &WorldContent,
    seed: u64,
    authored_file: Option<PathBuf>,
) -> Arc<dyn LevelAuthor> {
    match authored_file {
        Some(path) => Arc::new(ExternalAuthor::new(
            FileSource::new(path),
            content.fallback.clone(),
            seed,
        )),
        None => Arc::new(ProceduralAuthor::new(seed, content.fallback.clone())),
    }
}

struct PlayArgs {
    moves: String,
    level: Option<String>,
    content_dir: String,
    pacing: Option<Pacing>,
    settle_ms: Option<u64>,
    step_ms: Option<u64>,
    advance: bool,
    difficulty: Difficulty,
    seed: Option<u64>,
    authored_file: Option<PathBuf>,
}

async fn play(args: PlayArgs) -> Result<()> {
    let commands = parse_moves(&args.moves).context("parsing moves")?;
    let content = load_content(&args.content_dir)?;
    info!(
        content_version = %content.content_version,
        levels = content.catalog.len(),
        "content loaded"
    );

    let mut pacing = args.pacing.unwrap_or(content.pacing);
    if let Some(settle_ms) = args.settle_ms {
        pacing.settle_ms = settle_ms;
    }
    if let Some(step_ms) = args.step_ms {
        pacing.step_ms = step_ms;
    }

    let level = match &args.level {
        Some(id) => content
            .catalog
            .get(&LevelId::new(id.as_str()))
            .with_context(|| format!("unknown level id: {id}"))?
            .clone(),
        None => content
            .catalog
            .first()
            .context("level catalog is empty")?
            .clone(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    let author = build_author(&content, seed, args.authored_file);
    let controller = SessionController::new(level, content.catalog.clone(), author)
        .with_pacing(pacing)
        .with_endless_difficulty(args.difficulty);

    let snapshot = controller.snapshot();
    print_level(&snapshot.level);
    print!("{}", render_grid(&snapshot.level, snapshot.robot));

    for command in commands {
        controller.append(command);
    }

    let mut rx = controller.subscribe();
    let run = controller.run();
    tokio::pin!(run);
    let outcome = loop {
        tokio::select! {
            outcome = &mut run => break outcome,
            Ok(batch) = rx.recv() => print_events(&batch),
            _ = signal::ctrl_c() => {
                controller.stop();
            }
        }
    };
    while let Ok(batch) = rx.try_recv() {
        print_events(&batch);
    }

    let Some(outcome) = outcome else {
        bail!("nothing to run: the move list is empty");
    };
    let snapshot = controller.snapshot();
    print!("{}", render_grid(&snapshot.level, snapshot.robot));
    match outcome {
        RunOutcome::Finished { status, failure } => {
            println!("result: {status:?}");
            if let Some(reason) = failure {
                println!("reason: {}", serde_json::to_string(&reason)?);
            }
        }
        RunOutcome::Cancelled => println!("result: stopped"),
    }

    if args.advance && controller.advance_level().await {
        let next = controller.snapshot();
        println!("next level:");
        print_level(&next.level);
        print!("{}", render_grid(&next.level, next.robot));
    }
    Ok(())
}

async fn generate(difficulty: Difficulty, seed: Option<u64>, content_dir: &str) -> Result<()> {
    let content = load_content(content_dir)?;
    let seed = seed.unwrap_or_else(rand::random);
    let author = ProceduralAuthor::new(seed, content.fallback);
    let level = author.request_level(difficulty).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&level).context("serializing level")?
    );
    print!("{}", render_grid(&level, RobotState::at_start(&level)));
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Levels { content_dir } => list_levels(&content_dir),
        Commands::Play {
            moves,
            level,
            content_dir,
            instant,
            settle_ms,
            step_ms,
            advance,
            difficulty,
            seed,
            authored_file,
        } => {
            play(PlayArgs {
                moves,
                level,
                content_dir,
                pacing: instant.then(Pacing::instant),
                settle_ms,
                step_ms,
                advance,
                difficulty: difficulty.into(),
                seed,
                authored_file,
            })
            .await
        }
        Commands::Generate {
            difficulty,
            seed,
            content_dir,
        } => generate(difficulty.into(), seed, &content_dir).await,
    }
}
