// crates/pgsolve-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pgsolve_core::{io as core_io, GameSolver, GameView, Player, Solution};
use pgsolve_games::format::Reindexed;
use pgsolve_games::generator::random_raw_game;
use pgsolve_games::io::{read_game, write_game};
use pgsolve_games::verify::verify_solution;
use pgsolve_spm::SmallProgressMeasures;
use pgsolve_utree::render::{write_mapping_csv, write_tree_html};
use pgsolve_zlk::{UniversalZielonka, ZlkSolver};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "pgsolve",
    about = "pgsolve reference CLI",
    long_about = "pgsolve reference CLI.\n\nUse this tool to generate parity games, solve them with the progress-measures or universal-tree Zielonka engine, and verify solutions.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Generate a seeded random game in pgsolver format.
    Generate {
        /// Number of vertices (>0)
        #[arg(long, default_value_t = 32, value_parser = clap::value_parser!(u32).range(1..))]
        n: u32,

        /// Highest priority in the game
        #[arg(long, default_value_t = 6)]
        max_priority: u32,

        /// Minimum out-degree (>0)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        min_out: u32,

        /// Maximum out-degree
        #[arg(long, default_value_t = 4)]
        max_out: u32,

        /// RNG seed; identical parameters reproduce the game
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output path for the game
        #[arg(long, default_value = "game.pg")]
        out: PathBuf,
    },

    /// Solve a game with the chosen engine
    Solve {
        /// Solving engine
        #[arg(value_enum, long)]
        engine: EngineOpt,

        /// Input game (pgsolver format)
        #[arg(long)]
        game: PathBuf,

        /// Output path for the solution artifact (JSON/CBOR)
        #[arg(long, default_value = "solution.json")]
        out: PathBuf,

        /// Also dump a `vertex;winner;strategy` CSV here
        #[arg(long)]
        csv: Option<PathBuf>,

        /* ---------- zlk-specific diagnostics ---------- */
        /// Dump the vertex-to-tree mapping CSV (zlk only)
        #[arg(long)]
        mapping_csv: Option<PathBuf>,

        /// Directory for even.html / odd.html tree renders (zlk only)
        #[arg(long)]
        trees: Option<PathBuf>,

        /// Re-check the result with the independent verifier before
        /// writing it
        #[arg(long, default_value_t = false)]
        check: bool,
    },

    /// Verify a solution against a game
    Verify {
        /// Input game (pgsolver format)
        #[arg(long)]
        game: PathBuf,

        /// Input solution artifact (JSON/CBOR)
        #[arg(long)]
        solution: PathBuf,
    },
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum EngineOpt {
    /// Small-progress-measures lifting engine
    Spm,
    /// Universal-tree Zielonka engine
    Zlk,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Generate {
            n,
            max_priority,
            min_out,
            max_out,
            seed,
            out,
        } => generate(n, max_priority, min_out, max_out, seed, out),

        Cmd::Solve {
            engine,
            game,
            out,
            csv,
            mapping_csv,
            trees,
            check,
        } => solve(engine, game, out, csv, mapping_csv, trees, check),

        Cmd::Verify { game, solution } => verify(game, solution),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Ensure the parent directory for a file exists.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

fn generate(
    n: u32,
    max_priority: u32,
    min_out: u32,
    max_out: u32,
    seed: u64,
    out: PathBuf,
) -> Result<()> {
    info!(n, max_priority, min_out, max_out, seed, "generating game");
    let game = random_raw_game(
        n as usize,
        max_priority,
        min_out as usize,
        max_out as usize,
        seed,
    )?;

    ensure_parent_dir(&out)?;
    write_game(&out, &game).with_context(|| format!("writing game to {}", out.display()))?;

    println!(
        "Generated game: n={}, max priority {} → {}",
        n,
        max_priority,
        out.display()
    );
    Ok(())
}

fn solve(
    engine: EngineOpt,
    game_path: PathBuf,
    out: PathBuf,
    csv: Option<PathBuf>,
    mapping_csv: Option<PathBuf>,
    trees: Option<PathBuf>,
    check: bool,
) -> Result<()> {
    info!(?engine, game=%game_path.display(), out=%out.display(), "solving");
    let raw = read_game(&game_path)?;
    let reindexed = raw
        .reindex()
        .with_context(|| format!("preparing {}", game_path.display()))?;
    let Reindexed { game, .. } = &reindexed;

    let solution: Solution = match engine {
        EngineOpt::Spm => {
            if mapping_csv.is_some() || trees.is_some() {
                info!("tree diagnostics are only produced by the zlk engine; ignoring");
            }
            GameSolver::<SmallProgressMeasures>::solve(game)
                .context("progress-measures engine failed")?
        }
        EngineOpt::Zlk => {
            // Run the engine directly so the tree agent stays reachable
            // for the mapping/render dumps.
            let mut solver = ZlkSolver::new(game).context("building zlk engine")?;
            let mut solution = Solution::new(
                <UniversalZielonka as pgsolve_core::Engine>::KIND,
                game.vertex_count(),
            );
            solver.run(&mut solution).context("zlk engine failed")?;

            if let Some(path) = mapping_csv {
                ensure_parent_dir(&path)?;
                write_mapping_csv(&path, solver.agent(), game.vertex_count())
                    .with_context(|| format!("writing mapping CSV to {}", path.display()))?;
                println!("Wrote tree mappings → {}", path.display());
            }
            if let Some(dir) = trees {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
                for pl in [Player::Even, Player::Odd] {
                    let path = dir.join(format!("{pl}.html"));
                    write_tree_html(&path, solver.agent(), pl)
                        .with_context(|| format!("rendering {} tree", pl))?;
                }
                println!("Rendered trees → {}", dir.display());
            }
            solution
        }
    };

    if check {
        verify_solution(game, &solution).context("solution failed verification")?;
        info!("verifier accepted the solution");
    }

    // Report against the file's vertex numbering.
    let mut original = reindexed.to_original(&solution);
    original.meta = serde_json::json!({
        "game": game_path.display().to_string(),
        "engine": format!("{engine:?}").to_lowercase(),
    });

    ensure_parent_dir(&out)?;
    core_io::write_solution_auto(&out, &original)
        .with_context(|| format!("writing solution to {}", out.display()))?;
    if let Some(path) = csv {
        ensure_parent_dir(&path)?;
        core_io::write_solution_csv(&path, &original)
            .with_context(|| format!("writing CSV to {}", path.display()))?;
        println!("Wrote winners CSV → {}", path.display());
    }

    let even = original.region(Player::Even).len();
    let odd = original.region(Player::Odd).len();
    println!(
        "Solved with {engine:?}: {even} vertices to even, {odd} to odd → {}",
        out.display()
    );
    Ok(())
}

fn verify(game_path: PathBuf, solution_path: PathBuf) -> Result<()> {
    info!(game=%game_path.display(), solution=%solution_path.display(), "verifying");
    let raw = read_game(&game_path)?;
    let reindexed = raw.reindex()?;
    let original = core_io::read_solution_auto(&solution_path)
        .with_context(|| format!("reading solution from {}", solution_path.display()))?;

    // The artifact is numbered by file ids; translate onto the sorted
    // game before checking.
    let n = reindexed.original.len();
    anyhow::ensure!(
        original.len() == n,
        "solution covers {} vertices, game has {n}",
        original.len()
    );
    let mut sorted = Solution::new(original.engine, n);
    let mut new_id = vec![0u32; n];
    for (new, &old) in reindexed.original.iter().enumerate() {
        new_id[old as usize] = new as u32;
    }
    for old in 0..n {
        if let Some(t) = original.strategies[old] {
            anyhow::ensure!(
                (t as usize) < n,
                "solution strategy {old} -> {t} is out of range"
            );
        }
        let new = new_id[old];
        sorted.winners[new as usize] = original.winners[old];
        sorted.strategies[new as usize] =
            original.strategies[old].map(|t| new_id[t as usize]);
    }

    verify_solution(&reindexed.game, &sorted).context("verification failed")?;
    println!(
        "OK: {} solves {}",
        solution_path.display(),
        game_path.display()
    );
    Ok(())
}
