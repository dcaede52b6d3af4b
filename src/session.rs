/*!
 * One application run: processes drops and acts on the last document
 *
 * A drop fully replaces the previous document; there is no merging.
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Instant;

use indicatif::ProgressBar;
use log::{debug, info};

use crate::aggregator::ContentAggregator;
use crate::clipboard::{self, Platform};
use crate::config::Config;
use crate::document::assemble;
use crate::error::{ClipCatError, Result};
use crate::parser::PathSource;
use crate::report::DropReport;
use crate::types::{AggregationResult, FinalDocument};
use crate::writer::DocumentWriter;

/// The document of one drop and how it was produced
#[derive(Debug, Clone)]
pub struct DropOutcome {
    /// Assembled document
    pub document: FinalDocument,
    /// Counters and timing
    pub report: DropReport,
}

/// Owns the last document and the scratch file location
pub struct Session {
    aggregator: ContentAggregator,
    scratch_path: PathBuf,
    last: Option<DropOutcome>,
}

impl Session {
    /// Create a new session
    pub fn new(respect_gitignore: bool, scratch_path: PathBuf, progress: Arc<ProgressBar>) -> Self {
        Self {
            aggregator: ContentAggregator::new(respect_gitignore, progress),
            scratch_path,
            last: None,
        }
    }

    /// Create a session from the application configuration
    pub fn from_config(config: &Config, progress: Arc<ProgressBar>) -> Self {
        Self::new(
            config.respect_gitignore,
            config.scratch_path.clone(),
            progress,
        )
    }

    /// Run parse, aggregate and assemble for one drop
    ///
    /// When no path resolves, the document is empty even if instructions
    /// were given.
    pub fn on_drop(&mut self, source: &dyn PathSource, instructions: &str) -> &DropOutcome {
        let start = Instant::now();
        let paths = source.resolve();

        let (result, document) = if paths.is_empty() {
            info!("No paths resolved from the drop");
            (AggregationResult::default(), FinalDocument::default())
        } else {
            debug!("Resolved {} path(s)", paths.len());
            let result = self.aggregator.aggregate(&paths);
            let document = assemble(&result, instructions);
            (result, document)
        };

        let report = DropReport::new(paths.len(), &result, &document, start.elapsed());
        self.last.insert(DropOutcome { document, report })
    }

    /// Outcome of the last drop, if any
    pub fn last(&self) -> Option<&DropOutcome> {
        self.last.as_ref()
    }

    /// Whether the last document has something to act on
    pub fn has_content(&self) -> bool {
        self.last.as_ref().is_some_and(|o| !o.document.is_empty())
    }

    /// Scratch file location
    pub fn scratch_path(&self) -> &Path {
        &self.scratch_path
    }

    fn content(&self, action: &str) -> Result<&FinalDocument> {
        match &self.last {
            Some(outcome) if !outcome.document.is_empty() => Ok(&outcome.document),
            _ => Err(ClipCatError::NothingToAct(format!("no content to {}", action))),
        }
    }

    /// Copy the last document to the system clipboard
    pub fn copy_to_clipboard(&self) -> Result<()> {
        let document = self.content("copy")?;
        clipboard::copy_to_clipboard(&document.text)?;
        info!("Copied {} characters to the clipboard", document.char_count);
        Ok(())
    }

    /// Save the last document to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let document = self.content("save")?;
        DocumentWriter::write(document, path)
    }

    /// Write the last document to the scratch file and return its path
    pub fn prepare_scratch_file(&self) -> Result<&Path> {
        let document = self.content("prepare")?;
        DocumentWriter::write(document, &self.scratch_path)?;
        Ok(&self.scratch_path)
    }

    /// Open the platform file manager at the scratch file
    pub fn reveal_scratch_file(&self) -> Result<()> {
        if !self.scratch_path.is_file() {
            return Err(ClipCatError::NothingToAct(format!(
                "scratch file {} has not been prepared",
                self.scratch_path.display()
            )));
        }
        reveal_in_file_manager(&self.scratch_path)?;
        Ok(())
    }

    /// Remove the scratch file; returns whether one existed
    pub fn discard_scratch_file(&self) -> Result<bool> {
        match fs::remove_file(&self.scratch_path) {
            Ok(()) => {
                debug!("Removed scratch file {}", self.scratch_path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Show `path` selected in the platform file manager
///
/// The file manager is left running detached; only a failure to start it
/// is reported.
fn reveal_in_file_manager(path: &Path) -> io::Result<()> {
    let child = reveal_command(clipboard::platform(), path).spawn()?;
    debug!("Started file manager (pid {})", child.id());
    Ok(())
}

fn reveal_command(platform: Platform, path: &Path) -> Command {
    match platform {
        Platform::Windows => {
            let mut c = Command::new("explorer");
            c.arg(format!("/select,{}", path.display()));
            c
        }
        Platform::MacOS => {
            let mut c = Command::new("open");
            c.arg("-R").arg(path);
            c
        }
        _ => {
            let mut c = Command::new("xdg-open");
            c.arg(path.parent().unwrap_or(path));
            c
        }
    }
}
