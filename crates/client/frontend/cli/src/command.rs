//! Parsing of typed commands and step gating.
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use runtime::{Ability, Step, UnitLoadout, UnitType};
use thiserror::Error;

/// One input line; the first word selects the command.
#[derive(Debug, Parser)]
#[command(multicall = true, disable_help_subcommand = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Connect the wallet
    Connect,

    /// Forget the wallet session
    Disconnect,

    /// Switch the wallet to the game network
    #[command(alias = "switch")]
    Network,

    /// Start a new game, leaving the current one
    Create,

    /// Join a game by code (0x...)
    Join { code: String },

    /// Deploy a unit
    Deploy(DeployArgs),

    /// Attack your opponent
    Attack,

    /// Reveal the combat outcome
    Reveal,

    /// Let the local opponent account join (local chain only)
    Opponent,

    /// Re-read the game from the chain
    Refresh,

    /// Show the current game
    Status,

    /// Show the combat log
    Log,

    /// Show this help
    #[command(alias = "?")]
    Help,

    /// Exit
    #[command(aliases = ["exit", "q"])]
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct DeployArgs {
    /// Base attack points
    pub attack: u8,

    /// Base defense points
    pub defense: u8,

    /// warrior, mage, tank or assassin
    pub unit_type: UnitType,

    /// critical, shield or magic
    pub abilities: Vec<Ability>,
}

impl DeployArgs {
    pub fn loadout(&self) -> UnitLoadout {
        let base = UnitLoadout::new(self.attack, self.defense, self.unit_type);
        self.abilities
            .iter()
            .fold(base, |loadout, ability| loadout.with_ability(*ability))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Help text requested with `-h`/`--help`.
    #[error("{0}")]
    Help(String),

    #[error("{0}")]
    Invalid(String),

    #[error("'{command}' is not available during step {step}")]
    NotNow { command: &'static str, step: Step },
}

impl From<clap::Error> for CommandError {
    fn from(err: clap::Error) -> Self {
        let text = err.render().to_string().trim_end().to_string();
        match err.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            | ErrorKind::DisplayVersion => Self::Help(text),
            _ => Self::Invalid(text),
        }
    }
}

impl Command {
    /// Parse one input line; blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        let Some(head) = words.first_mut() else {
            return Ok(None);
        };
        head.make_ascii_lowercase();

        let line = Line::try_parse_from(words)?;
        Ok(Some(line.command))
    }

    /// Command overview.
    pub fn help() -> String {
        Line::command().render_help().to_string()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::Network => "network",
            Self::Create => "create",
            Self::Join { .. } => "join",
            Self::Deploy(_) => "deploy",
            Self::Attack => "attack",
            Self::Reveal => "reveal",
            Self::Opponent => "opponent",
            Self::Refresh => "refresh",
            Self::Status => "status",
            Self::Log => "log",
            Self::Help => "help",
            Self::Quit => "quit",
        }
    }

    /// Whether the command writes to the game.
    pub fn is_game_action(&self) -> bool {
        matches!(
            self,
            Self::Create
                | Self::Join { .. }
                | Self::Deploy(_)
                | Self::Attack
                | Self::Reveal
                | Self::Opponent
        )
    }

    /// Step a game action is limited to; `None` when usable anytime.
    ///
    /// `create` abandons the current game, so it is available at every step.
    pub fn required_step(&self) -> Option<Step> {
        match self {
            Self::Join { .. } | Self::Opponent => Some(Step::JoinGame),
            Self::Deploy(_) => Some(Step::DeployUnit),
            Self::Attack => Some(Step::Attack),
            Self::Reveal => Some(Step::RevealOutcome),
            _ => None,
        }
    }

    /// Reject game actions outside their step.
    pub fn check(&self, step: Step) -> Result<(), CommandError> {
        match self.required_step() {
            Some(required) if required != step => Err(CommandError::NotNow {
                command: self.name(),
                step,
            }),
            _ => Ok(()),
        }
    }
}
