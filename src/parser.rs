/*!
 * Drop payload parsing
 *
 * Turns the loosely delimited string handed over by a drag-and-drop event
 * into a list of existing absolute paths. Hosts that can supply a
 * structured list of paths should use [`PathList`] instead, which skips the
 * tokenizing heuristics altogether.
 */

use std::path::{Path, PathBuf};

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SkipReason;
use crate::types::ResolvedPath;
use crate::utils::absolutize;

/// A brace-delimited group or a run of non-whitespace
static BRACE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]*)\}|(\S+)").expect("brace token pattern is valid"));

/// Anything that can produce the paths of one drop
pub trait PathSource {
    /// Resolve to existing absolute paths, in the order given
    fn resolve(&self) -> Vec<ResolvedPath>;
}

/// A raw drag-and-drop payload string
#[derive(Debug, Clone, Copy)]
pub struct DropPayload<'a>(pub &'a str);

impl PathSource for DropPayload<'_> {
    fn resolve(&self) -> Vec<ResolvedPath> {
        parse_payload(self.0)
    }
}

/// A structured list of paths, e.g. from command-line arguments
#[derive(Debug, Clone, Default)]
pub struct PathList(pub Vec<PathBuf>);

impl PathSource for PathList {
    fn resolve(&self) -> Vec<ResolvedPath> {
        self.0.iter().filter_map(|p| resolve_candidate(p)).collect()
    }
}

/// Parse a raw drop payload into existing absolute paths
///
/// Never fails: malformed input yields an empty list.
pub fn parse_payload(raw: &str) -> Vec<ResolvedPath> {
    split_payload(raw)
        .iter()
        .filter_map(|candidate| resolve_candidate(Path::new(candidate.trim())))
        .collect()
}

fn split_payload(raw: &str) -> Vec<String> {
    let payload = strip_outer_braces(raw.trim());
    if payload.is_empty() {
        return Vec::new();
    }

    if payload.contains('{') && payload.contains('}') {
        return split_braced(payload);
    }

    if payload.contains(' ') && !exists(payload) {
        return reconstruct_spaced(payload);
    }

    if exists(payload) {
        return vec![payload.to_string()];
    }

    payload
        .split('\0')
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && exists(segment))
        .map(String::from)
        .collect()
}

/// Strip one pair of braces wrapping the whole payload
fn strip_outer_braces(payload: &str) -> &str {
    match payload
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
    {
        Some(inner) if !inner.contains(['{', '}']) => inner,
        _ => payload,
    }
}

/// Alternate between `{...}` groups (kept verbatim) and whitespace runs
fn split_braced(payload: &str) -> Vec<String> {
    BRACE_TOKEN
        .captures_iter(payload)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Rebuild space-containing paths by accreting tokens until one exists
///
/// The first accretion that exists wins, so when both `a` and `a b` exist
/// the shorter one is taken. Trailing tokens that never resolve are
/// dropped.
fn reconstruct_spaced(payload: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut candidate = String::new();

    for part in payload.split(' ') {
        if !candidate.is_empty() {
            candidate.push(' ');
        }
        candidate.push_str(part);

        if exists(&candidate) {
            found.push(std::mem::take(&mut candidate));
        }
    }

    if !candidate.is_empty() {
        debug!("Discarding unresolved tail of payload: {:?}", candidate);
    }

    found
}

fn resolve_candidate(candidate: &Path) -> Option<ResolvedPath> {
    if candidate.as_os_str().is_empty() {
        return None;
    }
    match absolutize(candidate) {
        Some(path) if path.exists() => Some(ResolvedPath::new(path)),
        _ => {
            debug!(
                "{}: dropping {}",
                SkipReason::PathUnresolved,
                candidate.display()
            );
            None
        }
    }
}

fn exists(candidate: &str) -> bool {
    Path::new(candidate).exists()
}
