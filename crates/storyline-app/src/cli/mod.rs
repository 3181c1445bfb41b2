use std::path::PathBuf;

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand, ValueEnum};

/// Top-level CLI entry point.
#[derive(Debug, Parser)]
#[command(
    name = "storyline",
    version,
    about = "Text robot: turns a search term into keyword-annotated narration sentences"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(global = true, short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn print_help() {
        let mut cmd = Cli::command();
        let _ = cmd.print_help();
        println!();
    }
}

/// Supported subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch, sanitize, segment and annotate an article, then save the content record.
    Run(RunArgs),
    /// Sanitize and segment local text files (or stdin) without calling any service.
    Sanitize(SanitizeArgs),
}

/// Options shared by commands that run the text stages.
#[derive(Debug, Clone, Args)]
pub struct TextArgs {
    /// Number of sentences to keep (defaults to `text.max_sentences`).
    #[arg(long, value_name = "N")]
    pub max_sentences: Option<usize>,
    /// Fail instead of returning fewer sentences than requested.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Term to look up in the encyclopedia (defaults to the stored one).
    #[arg(value_name = "SEARCH_TERM")]
    pub search_term: Option<String>,
    /// Narration prefix stored alongside the search term, e.g. "Who is".
    #[arg(long)]
    pub prefix: Option<String>,
    #[command(flatten)]
    pub text: TextArgs,
    /// Content record location (defaults to `state.path`).
    #[arg(long, value_name = "FILE")]
    pub state_file: Option<PathBuf>,
    /// Leave keyword slots empty instead of calling the keyword service.
    #[arg(long)]
    pub skip_keywords: bool,
}

#[derive(Debug, Args)]
pub struct SanitizeArgs {
    /// Text files to process; reads stdin when omitted.
    #[arg(value_name = "FILE")]
    pub inputs: Vec<PathBuf>,
    #[command(flatten)]
    pub text: TextArgs,
    /// Output rendering (numbered text or JSON lines).
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// How to render sentence output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
