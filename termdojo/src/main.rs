//! Terminal-skills trainer.
//!
//! Missions live in `.termdojo/missions.json` (or the built-in catalog when
//! the workspace has none). `termdojo play <id>` runs a mission against a
//! sandboxed in-memory filesystem, reading commands from stdin.

use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use termdojo::card::CardRenderer;
use termdojo::exit_codes;
use termdojo::io::config::load_config;
use termdojo::io::init::{DojoPaths, InitOptions, init_dojo};
use termdojo::io::mission_store::load_catalog;
use termdojo::logging;
use termdojo::play::{PlayOptions, PlayOutcome, play};
use termdojo::runner::MissionRunner;

#[derive(Parser)]
#[command(name = "termdojo", version, about = "Practice shell commands in a sandbox")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create `.termdojo/` with config, mission pack and schema.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
    /// Check config and mission pack (schema, invariants, goals, setup).
    Validate,
    /// List missions, optionally filtered.
    List {
        #[arg(long)]
        level: Option<u8>,
        #[arg(long)]
        skill: Option<String>,
    },
    /// Print the briefing card of a mission.
    Show { id: String },
    /// Play a mission, one command per stdin line.
    Play { id: String },
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let root = Path::new(".");
    match cli.command {
        Command::Init { force } => cmd_init(root, force),
        Command::Validate => cmd_validate(root),
        Command::List { level, skill } => cmd_list(root, level, skill.as_deref()),
        Command::Show { id } => cmd_show(root, &id),
        Command::Play { id } => cmd_play(root, &id),
    }
}

fn cmd_init(root: &Path, force: bool) -> Result<i32> {
    let paths = init_dojo(root, &InitOptions { force })?;
    println!("initialized {}", paths.dojo_dir.display());
    Ok(exit_codes::OK)
}

/// Every mission must also survive its own setup against the configured home.
fn cmd_validate(root: &Path) -> Result<i32> {
    let paths = DojoPaths::new(root);
    let config = load_config(&paths.config_path).context("load config.toml")?;
    let catalog = load_catalog(&paths).context("load missions.json")?;
    for mission in catalog.missions() {
        MissionRunner::new(mission.clone(), &config.home, &config.user)
            .with_context(|| format!("mission {}: setup", mission.id))?;
    }
    println!("ok: {} missions", catalog.missions().len());
    Ok(exit_codes::OK)
}

fn cmd_list(root: &Path, level: Option<u8>, skill: Option<&str>) -> Result<i32> {
    let catalog = load_catalog(&DojoPaths::new(root))?;
    for mission in catalog.filter(level, skill) {
        println!(
            "{}\tL{}\t{}\t{}",
            mission.id, mission.level, mission.skill_id, mission.title
        );
    }
    Ok(exit_codes::OK)
}

fn cmd_show(root: &Path, id: &str) -> Result<i32> {
    let catalog = load_catalog(&DojoPaths::new(root))?;
    let mission = catalog
        .get(id)
        .ok_or_else(|| anyhow!("unknown mission: {id}"))?;
    println!("{}", CardRenderer::new().render(mission, None, false)?);
    Ok(exit_codes::OK)
}

fn cmd_play(root: &Path, id: &str) -> Result<i32> {
    let paths = DojoPaths::new(root);
    let config = load_config(&paths.config_path).context("load config.toml")?;
    let catalog = load_catalog(&paths)?;
    let mission = catalog
        .get(id)
        .ok_or_else(|| anyhow!("unknown mission: {id}"))?
        .clone();
    let mut runner = MissionRunner::new(mission, &config.home, &config.user)
        .with_context(|| format!("mission {id}: setup"))?;

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let location = runner.location();
    let card = CardRenderer::new().render(runner.mission(), Some(location.as_str()), false)?;
    println!("{card}");

    let options = PlayOptions {
        hint_after_attempts: config.hint_after_attempts,
        prompt: interactive,
    };
    let mut stdout = io::stdout().lock();
    let outcome = play(&mut runner, stdin.lock(), &mut stdout, &options)?;
    Ok(match outcome {
        PlayOutcome::Completed => exit_codes::OK,
        PlayOutcome::Quit | PlayOutcome::InputEnded => exit_codes::INCOMPLETE,
    })
}
