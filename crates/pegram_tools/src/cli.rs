//! CLI interface for pegram-tools.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "peggrep")]
#[command(about = "Match text against PEG grammars")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print input lines matching the grammar, optionally colorized by
    /// parse-tree depth
    Grep {
        /// Auxiliary rule definitions, as NAME=DEFINITION (repeatable)
        #[arg(short = 'r', long = "rule", value_name = "NAME=DEF")]
        rules: Vec<String>,

        /// The root pattern, registered as the rule `main`
        pattern: String,

        /// Input files (stdin when empty)
        files: Vec<PathBuf>,

        /// Use NUL as the record delimiter instead of newline
        #[arg(short = 'z', long)]
        null_data: bool,

        /// When to colorize matched structure
        #[arg(short, long, value_enum, default_value_t = ColorMode::Auto)]
        color: ColorMode,
    },

    /// Parse one input against the grammar and dump the tree
    Dump {
        /// Auxiliary rule definitions, as NAME=DEFINITION (repeatable)
        #[arg(short = 'r', long = "rule", value_name = "NAME=DEF")]
        rules: Vec<String>,

        /// The root pattern, registered as the rule `main`
        pattern: String,

        /// Input text (stdin when omitted)
        input: Option<String>,

        /// Keep the engine's anonymous grouping nodes instead of purging
        #[arg(long)]
        raw: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = DumpFormat::Text)]
        format: DumpFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Colorize when stdout is a terminal
    Auto,
    Always,
    Never,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DumpFormat {
    Text,
    Json,
}
