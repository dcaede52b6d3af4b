/*!
 * ClipCat - Concatenate dropped files and folders into one annotated text blob
 *
 * The pipeline resolves a drag-and-drop payload (or a structured path list)
 * into existing paths, aggregates the text of every file they name while
 * honoring nested `.gitignore` rules, and assembles the result with optional
 * instructions into a single document ready to paste into an LLM prompt.
 */

pub mod aggregator;
pub mod clipboard;
pub mod config;
pub mod document;
pub mod error;
pub mod gitignore;
pub mod logger;
pub mod parser;
pub mod report;
pub mod session;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use aggregator::ContentAggregator;
pub use config::Config;
pub use document::assemble;
pub use error::{ClipCatError, Result, SkipReason};
pub use gitignore::{IgnorePattern, IgnoreSpec};
pub use parser::{parse_payload, DropPayload, PathList, PathSource};
pub use report::{DropReport, ReportFormat, Reporter};
pub use session::{DropOutcome, Session};
pub use types::{
    AggregationResult, AggregationStats, ChunkOrigin, ContentChunk, FinalDocument, ResolvedPath,
};
pub use writer::DocumentWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
