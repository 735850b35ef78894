//! Command-line surface.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use lurk_buffer::{JsonCompact, Passthrough, Project};
use lurk_text::WrapMode;

#[derive(Debug, Parser)]
#[command(
    name = "lurk",
    about = "Interactive terminal viewer for append-only log files",
    version
)]
pub struct Cli {
    /// File to view. "-" or no argument reads stdin (spilled to a
    /// temporary file so the view stays seekable).
    pub file: Option<PathBuf>,

    /// Keep reading as the file grows and pin the view to the tail.
    #[arg(short = 'f', long)]
    pub follow: bool,

    /// How record lines wrap to the terminal width.
    #[arg(long, value_enum, default_value_t = WrapChoice::Word)]
    pub wrap: WrapChoice,

    /// Transform records before display.
    #[arg(long, value_enum, default_value_t = ProjectChoice::None)]
    pub project: ProjectChoice,

    /// Append diagnostics to this file; the terminal is never written to.
    /// Filtered by RUST_LOG.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WrapChoice {
    /// Word boundaries, breaking overlong words.
    Word,
    /// Any grapheme boundary.
    Char,
    /// No wrapping; long lines are truncated on screen.
    None,
}

impl WrapChoice {
    pub fn wrap_mode(self) -> WrapMode {
        match self {
            WrapChoice::Word => WrapMode::WordChar,
            WrapChoice::Char => WrapMode::Char,
            WrapChoice::None => WrapMode::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProjectChoice {
    /// Show lines as they are.
    None,
    /// Compact JSON records; drop lines that are not valid JSON.
    Json,
}

impl ProjectChoice {
    pub fn projection(self) -> Arc<dyn Project> {
        match self {
            ProjectChoice::None => Arc::new(Passthrough),
            ProjectChoice::Json => Arc::new(JsonCompact),
        }
    }
}
