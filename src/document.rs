/*!
 * Assembly of aggregated chunks and instructions into the final document
 */

use log::debug;

use crate::types::{AggregationResult, FinalDocument};

/// Placed between consecutive sections
pub const SEPARATOR: &str = "\n\n";
/// Banner introducing instructions that follow file content
pub const APPENDED_INSTRUCTIONS_BANNER: &str = "--- Appended Instructions ---";
/// Banner used when the document holds instructions only
pub const INSTRUCTIONS_BANNER: &str = "--- Instructions ---";

/// Merge chunks and optional instructions into one document
///
/// An empty result with blank instructions yields the empty document,
/// which callers treat as nothing to act on.
pub fn assemble(result: &AggregationResult, instructions: &str) -> FinalDocument {
    let mut text = String::new();

    for (i, chunk) in result.chunks.iter().enumerate() {
        if i > 0 {
            text.push_str(SEPARATOR);
        }
        text.push_str(&chunk.header());
        text.push('\n');
        text.push_str(&chunk.body);
    }

    let instructions = instructions.trim();
    if !instructions.is_empty() {
        if result.chunks.is_empty() {
            text.push_str(INSTRUCTIONS_BANNER);
        } else {
            text.push_str(SEPARATOR);
            text.push_str(APPENDED_INSTRUCTIONS_BANNER);
        }
        text.push('\n');
        text.push_str(instructions);
    }

    let (line_count, char_count) = if text.is_empty() {
        (0, 0)
    } else {
        (text.lines().count(), text.chars().count())
    };
    debug!(
        "Assembled document: {} chunk(s), {} line(s), {} char(s)",
        result.chunks.len(),
        line_count,
        char_count
    );

    FinalDocument {
        text,
        line_count,
        char_count,
    }
}
