//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SkyQuery CLI
#[derive(Debug, Parser)]
#[command(name = "skyquery")]
#[command(author, version, about = "Ask about the weather in plain language", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: ./skyquery.toml when present)
    #[arg(short, long, env = "SKYQUERY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Start an interactive session (default)
    Chat,

    /// Answer a single question and exit
    ///
    /// Example: skyquery ask "Will it rain in Paris tomorrow?"
    Ask {
        /// The question
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },
}

impl Cli {
    /// The subcommand to run; interactive chat when none was given
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Chat)
    }
}

impl Commands {
    /// The one-shot question as a single line
    pub fn question(&self) -> Option<String> {
        match self {
            Self::Ask { question } => Some(question.join(" ")),
            Self::Chat => None,
        }
    }
}
