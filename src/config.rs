/*!
 * Configuration handling for ClipCat
 */

use std::env;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_complete::Shell;

use crate::error::Result;
use crate::report::ReportFormat;
use crate::{bail, ensure};

/// File name of the scratch document in the temp directory
pub const SCRATCH_FILE_NAME: &str = "clipcat_output.txt";

/// How the status report is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportStyle {
    /// Short status lines
    Status,
    /// Tables of processed files and totals
    Table,
    /// Counters as JSON
    Json,
    /// No report
    None,
}

impl ReportStyle {
    /// Reporter format, if any
    pub fn format(self) -> Option<ReportFormat> {
        match self {
            Self::Status => Some(ReportFormat::Status),
            Self::Table => Some(ReportFormat::ConsoleTable),
            Self::Json => Some(ReportFormat::Json),
            Self::None => None,
        }
    }
}

/// Command-line arguments for ClipCat
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "clipcat",
    version = env!("CARGO_PKG_VERSION"),
    about = "Concatenate files and folders into one annotated text blob for LLM prompts",
    long_about = "Collects the text of the given files and folders, honoring .gitignore rules inside folders, and joins it with optional instructions into one document. Paths come from arguments, from a raw drag-and-drop payload (--payload), or from stdin."
)]
pub struct Args {
    /// Files or folders to collect
    pub paths: Vec<String>,

    /// Raw drag-and-drop payload (brace-wrapped, space- or NUL-separated paths)
    #[clap(long, conflicts_with = "paths")]
    pub payload: Option<String>,

    /// Instructions appended after the collected content
    #[clap(short, long)]
    pub instructions: Option<String>,

    /// Read instructions from a file
    #[clap(long, conflicts_with = "instructions")]
    pub instructions_file: Option<String>,

    /// Save the document to this file
    #[clap(short, long)]
    pub output: Option<String>,

    /// Copy the document to the system clipboard
    #[clap(long)]
    pub clip: bool,

    /// Write the document to the scratch file
    #[clap(long)]
    pub scratch: bool,

    /// Open the file manager at the scratch file (implies --scratch)
    #[clap(long)]
    pub reveal: bool,

    /// Location of the scratch file
    #[clap(long)]
    pub scratch_path: Option<String>,

    /// Delete the scratch file and exit
    #[clap(long)]
    pub clean_scratch: bool,

    /// Print the document to stdout (default when no other action is given)
    #[clap(long)]
    pub print: bool,

    /// Do not apply .gitignore rules inside folders
    #[clap(long)]
    pub no_gitignore: bool,

    /// Status report style, written to stderr
    #[clap(long, value_enum, default_value = "status")]
    pub report: ReportStyle,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Where the paths of a run come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Structured list of paths
    Paths(Vec<PathBuf>),
    /// Raw drop payload given inline
    Payload(String),
    /// Raw drop payload read from stdin
    Stdin,
}

/// Where the instructions of a run come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionSource {
    None,
    Inline(String),
    File(PathBuf),
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Paths or payload to process
    pub input: InputSource,

    /// Instructions to append
    pub instructions: InstructionSource,

    /// File to save the document to
    pub output_file: Option<PathBuf>,

    /// Copy the document to the clipboard
    pub clip: bool,

    /// Write the scratch file
    pub scratch: bool,

    /// Reveal the scratch file in the file manager
    pub reveal: bool,

    /// Scratch file location
    pub scratch_path: PathBuf,

    /// Delete the scratch file and exit
    pub clean_scratch: bool,

    /// Print the document to stdout
    pub print: bool,

    /// Whether to respect .gitignore files in dropped folders
    pub respect_gitignore: bool,

    /// Report style
    pub report: ReportStyle,

    /// Log verbosity
    pub verbosity: u8,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        let input = match (args.payload, args.paths.is_empty()) {
            (Some(payload), _) => InputSource::Payload(payload),
            (None, false) => InputSource::Paths(args.paths.into_iter().map(PathBuf::from).collect()),
            (None, true) => InputSource::Stdin,
        };
        let instructions = match (args.instructions, args.instructions_file) {
            (Some(text), _) => InstructionSource::Inline(text),
            (None, Some(path)) => InstructionSource::File(PathBuf::from(path)),
            (None, None) => InstructionSource::None,
        };
        let scratch = args.scratch || args.reveal;
        let print = args.print || !(args.clip || scratch || args.output.is_some());

        Self {
            input,
            instructions,
            output_file: args.output.map(PathBuf::from),
            clip: args.clip,
            scratch,
            reveal: args.reveal,
            scratch_path: args
                .scratch_path
                .map(PathBuf::from)
                .unwrap_or_else(default_scratch_path),
            clean_scratch: args.clean_scratch,
            print,
            respect_gitignore: !args.no_gitignore,
            report: args.report,
            verbosity: args.verbose,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let InstructionSource::File(path) = &self.instructions {
            ensure!(
                path.is_file(),
                Config,
                "Instructions file not found: {}",
                path.display()
            );
        }

        // Missing parent directories are created when the document is written
        if let Some(output) = &self.output_file {
            if output.is_dir() {
                bail!(Config, "Output path is a directory: {}", output.display());
            }
        }

        Ok(())
    }

    /// Load the instructions text
    pub fn load_instructions(&self) -> Result<String> {
        Ok(match &self.instructions {
            InstructionSource::None => String::new(),
            InstructionSource::Inline(text) => text.clone(),
            InstructionSource::File(path) => fs::read_to_string(path)?,
        })
    }
}

/// Scratch file in the system temp directory
pub fn default_scratch_path() -> PathBuf {
    env::temp_dir().join(SCRATCH_FILE_NAME)
}
