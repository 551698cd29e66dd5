//! A terminal driver for the memory matching game.
//!
//! Reads commands line by line, forwards them to the game engine and prints
//! the board and engine events.

use anyhow::{Context, Result};
use memory_match::{
    EngineConfig, FileStore, GameActor, GameEvent, GameHandle, JsonFileSource, StaticSource,
    catalog::CatalogSource,
    game::{Difficulty, RevealOutcome},
};
use mm_cli::{
    commands::{Command, parse_command},
    display::{describe_outcome, render_best, render_board},
};
use pico_args::Arguments;
use std::{path::PathBuf, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Play a memory matching game in the terminal

USAGE:
  mm_cli [OPTIONS]

OPTIONS:
  --catalog PATH        JSON card catalog  [default: built-in cards]
  --data-dir DIR        Where progress is saved  [default: .memory_match]
  --deck-size N         Cards in the first game  [default: 8]
  --difficulty LEVEL    easy, medium or hard  [default: easy]
  --seed N              Fixed shuffle seed

FLAGS:
  --resume              Continue the saved game if there is one
  -h, --help            Print help information

Engine settings can also be set through MM_* environment variables.
";

const COMMANDS: &str = "\
Commands:
  flip N | N            Reveal the card at position N
  new SIZE [LEVEL]      Start a new game (e.g., 'new 12 hard')
  restart               Start over with the same size and difficulty
  pause                 Pause or resume
  reset                 Abandon the current game
  best                  Show best results
  show                  Show the board
  help                  Show this list
  quit                  Exit
";

struct Args {
    catalog: Option<PathBuf>,
    data_dir: PathBuf,
    deck_size: usize,
    difficulty: Difficulty,
    seed: Option<u64>,
    resume: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::builder().format_target(false).init();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        catalog: pargs.opt_value_from_str("--catalog")?,
        data_dir: pargs
            .opt_value_from_str("--data-dir")?
            .unwrap_or_else(|| PathBuf::from(".memory_match")),
        deck_size: pargs.opt_value_from_str("--deck-size")?.unwrap_or(8),
        difficulty: pargs
            .opt_value_from_str("--difficulty")?
            .unwrap_or_default(),
        seed: pargs.opt_value_from_str("--seed")?,
        resume: pargs.contains("--resume"),
    };

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let mut config = EngineConfig::from_env().context("Invalid engine configuration")?;
    if args.seed.is_some() {
        config.rng_seed = args.seed;
    }

    let source: Arc<dyn CatalogSource> = match &args.catalog {
        Some(path) => Arc::new(JsonFileSource::new(path)),
        None => Arc::new(StaticSource::builtin().context("Built-in catalog is broken")?),
    };
    let store = Arc::new(FileStore::new(&args.data_dir));
    let engine = GameActor::spawn(config, source, store);

    let (_, mut events) = engine.subscribe().await?;
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            print_event(&event);
        }
    });

    let resumed = args.resume && engine.load_saved_game().await?;
    if resumed {
        println!("Resumed saved game.");
    } else if let Err(e) = engine.new_game(args.deck_size, args.difficulty).await {
        println!("{}", e.client_message());
    }
    print!("{}", render_board(&engine.snapshot().await?));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => handle_command(&engine, command).await?,
            Err(e) => println!("{e}"),
        }
    }

    engine.shutdown().await?;
    Ok(())
}

async fn handle_command(engine: &GameHandle, command: Command) -> Result<()> {
    match command {
        Command::Flip(position) => {
            let snapshot = engine.snapshot().await?;
            let Some(card) = snapshot.cards.get(position - 1) else {
                println!(
                    "No card at position {}. Pick 1 to {}.",
                    position,
                    snapshot.cards.len()
                );
                return Ok(());
            };
            let outcome = engine.reveal_card(card.id).await?;
            if let Some(message) = describe_outcome(&outcome) {
                println!("{message}");
            }
            if !matches!(outcome, RevealOutcome::Ignored(_)) {
                print!("{}", render_board(&engine.snapshot().await?));
            }
        }
        Command::New {
            deck_size,
            difficulty,
        } => match engine.new_game(deck_size, difficulty).await {
            Ok(snapshot) => print!("{}", render_board(&snapshot)),
            Err(e) => println!("{}", e.client_message()),
        },
        Command::Restart => match engine.restart_game().await {
            Ok(snapshot) => print!("{}", render_board(&snapshot)),
            Err(e) => println!("{}", e.client_message()),
        },
        Command::Pause => match engine.toggle_pause().await {
            Ok(true) => println!("Paused. Type 'pause' again to resume."),
            Ok(false) => println!("Resumed."),
            Err(e) => println!("{}", e.client_message()),
        },
        Command::Reset => engine.reset_game().await?,
        Command::Best => print!("{}", render_best(&engine.load_best_results().await?)),
        Command::Show => print!("{}", render_board(&engine.snapshot().await?)),
        Command::Help => print!("{COMMANDS}"),
        Command::Quit => {}
    }
    Ok(())
}

fn print_event(event: &GameEvent) {
    match event {
        // The board is reprinted after each reveal
        GameEvent::CardFlipped { .. } => log::debug!("{event}"),
        GameEvent::StorageWarning { message } => log::warn!("{message}"),
        _ => println!("* {event}"),
    }
}
