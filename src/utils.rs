/*!
 * Utility functions for ClipCat
 */

use std::env;
use std::path::{Component, Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// Name of the directory that is never traversed
pub const GIT_DIR: &str = ".git";

/// Walk `root` top-down in a deterministic order without entering `.git`
///
/// The root itself is yielded first and is never filtered, even when it is
/// named `.git`. Walk errors are dropped.
pub fn walk_dir(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_git_dir(e))
        .filter_map(Result::ok)
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == GIT_DIR
}

/// Lexically normalize a path: drop `.` and fold `..` into its parent
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Normalize and anchor a path on the current directory if it is relative
pub fn absolutize(path: &Path) -> Option<PathBuf> {
    if path.is_absolute() {
        return Some(normalize_path(path));
    }
    let cwd = env::current_dir().ok()?;
    Some(normalize_path(&cwd.join(path)))
}

/// Render a relative path with `/` separators regardless of host
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
