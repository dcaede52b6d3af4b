/*!
 * Core types and data structures for ClipCat
 */

use std::path::{Path, PathBuf};

use serde::Serialize;

/// An absolute, normalized path that existed when it was parsed
///
/// Existence is re-checked at aggregation time since the filesystem
/// may change in between.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    /// Wrap an already normalized absolute path
    pub(crate) fn new(path: PathBuf) -> Self {
        Self(path)
    }

    /// Borrow the underlying path
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Consume and return the underlying path
    pub fn into_inner(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Where a chunk came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOrigin {
    /// A file that was dropped directly
    TopLevel {
        /// File name shown in the banner
        name: String,
    },
    /// A file found while walking a dropped directory
    Folder {
        /// Name of the dropped directory
        root_name: String,
        /// Path relative to the dropped directory
        relative: PathBuf,
    },
}

/// One file's rendered contribution to the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChunk {
    /// Absolute path the body was read from
    pub source: PathBuf,
    /// Banner origin
    pub origin: ChunkOrigin,
    /// Decoded file text
    pub body: String,
}

impl ContentChunk {
    /// Banner line written above the body
    pub fn header(&self) -> String {
        match &self.origin {
            ChunkOrigin::TopLevel { name } => format!("--- Content from: {} ---", name),
            ChunkOrigin::Folder { root_name, relative } => format!(
                "--- Content from (folder {}): {} ---",
                root_name,
                relative.display()
            ),
        }
    }

    /// Short display path: the file name, or `<root-name>/<relative-path>`
    pub fn label(&self) -> String {
        match &self.origin {
            ChunkOrigin::TopLevel { name } => name.clone(),
            ChunkOrigin::Folder { root_name, relative } => {
                Path::new(root_name).join(relative).display().to_string()
            }
        }
    }
}

/// Counters reported for a single drop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    /// Files decoded and included
    pub files_processed: usize,
    /// Files that could not be read or were not valid UTF-8
    pub files_skipped_unreadable: usize,
    /// Files excluded by ignore rules
    pub files_skipped_by_ignore: usize,
}

/// Ordered chunks plus counters
#[derive(Debug, Clone, Default)]
pub struct AggregationResult {
    /// Chunks in drop order, then walk order
    pub chunks: Vec<ContentChunk>,
    /// Counters
    pub stats: AggregationStats,
}

/// The assembled text with its size statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalDocument {
    /// Full text
    pub text: String,
    /// Number of lines in `text`
    pub line_count: usize,
    /// Number of characters in `text`
    pub char_count: usize,
}

impl FinalDocument {
    /// Whether there is nothing to act on
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
