use memory_match::game::Difficulty;
use std::fmt;

/// A command typed at the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reveal the card at a 1-based board position.
    Flip(usize),
    /// Start a new game.
    New {
        deck_size: usize,
        difficulty: Difficulty,
    },
    Restart,
    Pause,
    Reset,
    Best,
    Show,
    Help,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Flip command missing a position.
    FlipMissingPosition,
    /// Position is not a number of at least 1.
    InvalidPosition(String),
    /// New game command missing a deck size.
    NewMissingDeckSize,
    /// Deck size is not a number.
    InvalidDeckSize(String),
    /// Unknown difficulty name.
    InvalidDifficulty(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlipMissingPosition => {
                write!(f, "Flip requires a card position (e.g., 'flip 3')")
            }
            Self::InvalidPosition(value) => write!(
                f,
                "Invalid card position '{}'. Must be a number starting at 1",
                value
            ),
            Self::NewMissingDeckSize => {
                write!(f, "New game requires a deck size (e.g., 'new 12 hard')")
            }
            Self::InvalidDeckSize(value) => write!(
                f,
                "Invalid deck size '{}'. Must be an even number (e.g., 'new 8')",
                value
            ),
            Self::InvalidDifficulty(value) => write!(
                f,
                "Invalid difficulty '{}'. Use 'easy', 'medium' or 'hard'",
                value
            ),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a command string into a [`Command`].
///
/// # Arguments
///
/// * `input` - The raw command string from user input
///
/// # Returns
///
/// * `Ok(Command)` - Successfully parsed command
/// * `Err(ParseError)` - Parse error with descriptive message
///
/// # Examples
///
/// ```
/// use mm_cli::commands::{Command, parse_command};
/// use memory_match::game::Difficulty;
///
/// assert_eq!(parse_command("pause"), Ok(Command::Pause));
/// assert_eq!(parse_command("flip 3"), Ok(Command::Flip(3)));
/// assert_eq!(parse_command("3"), Ok(Command::Flip(3)));
/// assert_eq!(
///     parse_command("new 8 hard"),
///     Ok(Command::New { deck_size: 8, difficulty: Difficulty::Hard })
/// );
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();

    // Try single-word commands first
    match trimmed {
        "restart" => return Ok(Command::Restart),
        "pause" | "resume" => return Ok(Command::Pause),
        "reset" => return Ok(Command::Reset),
        "best" => return Ok(Command::Best),
        "show" | "" => return Ok(Command::Show),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    // Parse multi-word commands
    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.first() {
        Some(&"flip") => parse_flip_command(&parts),
        Some(&"new") => parse_new_command(&parts),
        // A bare number flips that position
        Some(first) if parts.len() == 1 && first.chars().all(|c| c.is_ascii_digit()) => {
            parse_position(first)
        }
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

/// Parse a flip command: "flip POSITION"
fn parse_flip_command(parts: &[&str]) -> Result<Command, ParseError> {
    match parts.get(1) {
        Some(value) => parse_position(value),
        None => Err(ParseError::FlipMissingPosition),
    }
}

fn parse_position(value: &str) -> Result<Command, ParseError> {
    match value.parse::<usize>() {
        Ok(position) if position >= 1 => Ok(Command::Flip(position)),
        _ => Err(ParseError::InvalidPosition(value.to_string())),
    }
}

/// Parse a new game command: "new DECK_SIZE [DIFFICULTY]"
fn parse_new_command(parts: &[&str]) -> Result<Command, ParseError> {
    let deck_size = match parts.get(1) {
        Some(value) => value
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidDeckSize(value.to_string()))?,
        None => return Err(ParseError::NewMissingDeckSize),
    };
    let difficulty = match parts.get(2) {
        Some(value) => value
            .parse::<Difficulty>()
            .map_err(|_| ParseError::InvalidDifficulty(value.to_string()))?,
        None => Difficulty::default(),
    };
    Ok(Command::New {
        deck_size,
        difficulty,
    })
}
