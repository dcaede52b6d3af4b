/*!
 * Content aggregation for dropped files and directories
 */

use std::fs;
use std::path::Path;
use std::sync::Arc;

use indicatif::ProgressBar;
use log::{debug, info};
use walkdir::DirEntry;

use crate::error::SkipReason;
use crate::gitignore::IgnoreSpec;
use crate::types::{AggregationResult, ChunkOrigin, ContentChunk, ResolvedPath};
use crate::utils::{to_slash, walk_dir};

/// Read a file as text, accepting only valid UTF-8
///
/// Line endings are normalized to `\n`. Read failures and invalid bytes
/// are reported the same way to callers that only care about skipping.
pub fn read_text_strict(path: &Path) -> Result<String, SkipReason> {
    let bytes = fs::read(path).map_err(|e| {
        debug!("Failed to read {}: {}", path.display(), e);
        SkipReason::FileIo
    })?;
    let text = String::from_utf8(bytes).map_err(|_| SkipReason::FileUndecodable)?;
    Ok(normalize_newlines(text))
}

fn normalize_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Collects the text of dropped files and directory trees
pub struct ContentAggregator {
    /// Whether to compile `.gitignore` rules for dropped directories
    respect_gitignore: bool,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
}

impl ContentAggregator {
    /// Create a new aggregator
    pub fn new(respect_gitignore: bool, progress: Arc<ProgressBar>) -> Self {
        Self {
            respect_gitignore,
            progress,
        }
    }

    /// Aggregate every path, in order, into chunks and counters
    ///
    /// Paths that vanished since parsing are skipped without being counted.
    pub fn aggregate(&self, paths: &[ResolvedPath]) -> AggregationResult {
        let mut result = AggregationResult::default();

        for resolved in paths {
            let path = resolved.path();
            let metadata = match fs::metadata(path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    debug!("Skipping vanished path {}: {}", path.display(), e);
                    continue;
                }
            };

            if metadata.is_file() {
                let name = path
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string();
                self.read_into(path, ChunkOrigin::TopLevel { name }, &mut result);
            } else if metadata.is_dir() {
                self.aggregate_directory(path, &mut result);
            } else {
                debug!("Skipping special file {}", path.display());
            }
        }

        info!(
            "Aggregated {} file(s), {} unreadable, {} ignored",
            result.stats.files_processed,
            result.stats.files_skipped_unreadable,
            result.stats.files_skipped_by_ignore
        );
        result
    }

    /// Walk one dropped directory
    fn aggregate_directory(&self, root: &Path, result: &mut AggregationResult) {
        let spec = if self.respect_gitignore {
            IgnoreSpec::compile(root)
        } else {
            IgnoreSpec::empty()
        };
        let root_name = root
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        self.progress
            .set_message(format!("Scanning folder: {}", root_name));

        for entry in walk_dir(root).filter(is_file_like) {
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();

            if spec.matches(&to_slash(&relative)) {
                debug!("Ignored by rules: {}", relative.display());
                result.stats.files_skipped_by_ignore += 1;
                continue;
            }

            let origin = ChunkOrigin::Folder {
                root_name: root_name.clone(),
                relative,
            };
            self.read_into(entry.path(), origin, result);
        }
    }

    /// Read one file and record it as a chunk or an unreadable skip
    fn read_into(&self, path: &Path, origin: ChunkOrigin, result: &mut AggregationResult) {
        self.progress.inc(1);

        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        // Truncate if too long to avoid display issues
        let display_name = if file_name.len() > 40 {
            let tail: String = file_name.chars().rev().take(37).collect();
            format!("...{}", tail.chars().rev().collect::<String>())
        } else {
            file_name
        };
        self.progress
            .set_message(format!("Current file: {}", display_name));

        match read_text_strict(path) {
            Ok(body) => {
                result.chunks.push(ContentChunk {
                    source: path.to_path_buf(),
                    origin,
                    body,
                });
                result.stats.files_processed += 1;
            }
            Err(reason) => {
                debug!("{}: skipping {}", reason, path.display());
                result.stats.files_skipped_unreadable += 1;
            }
        }
    }
}

/// Regular files and symlinks that do not point at a directory
///
/// Dangling symlinks pass so they count as unreadable.
fn is_file_like(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    if file_type.is_symlink() {
        return !entry.path().is_dir();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn aggregator(respect_gitignore: bool) -> ContentAggregator {
        ContentAggregator::new(respect_gitignore, Arc::new(ProgressBar::hidden()))
    }

    fn resolved(path: &Path) -> ResolvedPath {
        ResolvedPath::new(path.to_path_buf())
    }

    fn write(root: &Path, rel: &str, contents: &[u8]) -> PathBuf {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_text_strict() {
        let dir = tempdir().unwrap();
        let text = write(dir.path(), "t.txt", "héllo\r\nworld\r".as_bytes());
        let binary = write(dir.path(), "b.bin", &[0x89, b'P', b'N', b'G', 0x00, 0xff]);

        assert_eq!(read_text_strict(&text).unwrap(), "héllo\nworld\n");
        assert_eq!(read_text_strict(&binary), Err(SkipReason::FileUndecodable));
        assert_eq!(
            read_text_strict(&dir.path().join("missing")),
            Err(SkipReason::FileIo)
        );
    }

    #[test]
    fn test_top_level_files() {
        let dir = tempdir().unwrap();
        let text = write(dir.path(), "a.txt", b"hello");
        let binary = write(dir.path(), "blob.bin", &[0xff, 0x00, 0xfe]);

        let result = aggregator(true).aggregate(&[resolved(&text), resolved(&binary)]);

        assert_eq!(result.stats.files_processed, 1);
        assert_eq!(result.stats.files_skipped_unreadable, 1);
        assert_eq!(result.stats.files_skipped_by_ignore, 0);
        assert_eq!(result.chunks.len(), 1);
        assert_eq!(result.chunks[0].body, "hello");
        assert_eq!(result.chunks[0].header(), "--- Content from: a.txt ---");
    }

    #[test]
    fn test_directory_walk_with_ignore_rules() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("proj");
        write(&root, ".gitignore", b"*.log\n!keep.log\n");
        write(&root, "x.log", b"noise");
        write(&root, "keep.log", b"kept");
        write(&root, "src/main.rs", b"fn main() {}");
        write(&root, "src/x.log", b"noise");
        write(&root, ".git/HEAD", b"ref: refs/heads/main");

        let result = aggregator(true).aggregate(&[resolved(&root)]);

        assert_eq!(result.stats.files_skipped_by_ignore, 2);
        assert_eq!(result.stats.files_skipped_unreadable, 0);
        // .gitignore, keep.log, src/main.rs
        assert_eq!(result.stats.files_processed, 3);

        let headers: Vec<String> = result.chunks.iter().map(ContentChunk::header).collect();
        let main_rel: PathBuf = ["src", "main.rs"].iter().collect();
        assert!(headers.contains(&"--- Content from (folder proj): keep.log ---".to_string()));
        assert!(headers.contains(&format!(
            "--- Content from (folder proj): {} ---",
            main_rel.display()
        )));
        assert!(!headers.iter().any(|h| h.contains("HEAD")));
    }

    #[test]
    fn test_gitignore_can_be_disabled() {
        let dir = tempdir().unwrap();
        write(dir.path(), ".gitignore", b"*.log\n");
        write(dir.path(), "x.log", b"log line");

        let result = aggregator(false).aggregate(&[resolved(dir.path())]);
        assert_eq!(result.stats.files_skipped_by_ignore, 0);
        assert_eq!(result.stats.files_processed, 2);
    }

    #[test]
    fn test_ignored_files_are_not_read() {
        let dir = tempdir().unwrap();
        write(dir.path(), ".gitignore", b"*.bin\n");
        write(dir.path(), "data.bin", &[0xff, 0xff]);

        let result = aggregator(true).aggregate(&[resolved(dir.path())]);
        assert_eq!(result.stats.files_skipped_by_ignore, 1);
        assert_eq!(result.stats.files_skipped_unreadable, 0);
    }

    #[test]
    fn test_walk_order_is_deterministic() {
        let dir = tempdir().unwrap();
        for name in ["c.txt", "a.txt", "b/inner.txt", "b.txt"] {
            write(dir.path(), name, name.as_bytes());
        }

        let first = aggregator(true).aggregate(&[resolved(dir.path())]);
        let second = aggregator(true).aggregate(&[resolved(dir.path())]);
        let bodies = |r: &AggregationResult| {
            r.chunks.iter().map(|c| c.body.clone()).collect::<Vec<_>>()
        };

        assert_eq!(bodies(&first), bodies(&second));
        let mut sorted = bodies(&first);
        sorted.sort();
        assert_eq!(sorted, vec!["a.txt", "b.txt", "b/inner.txt", "c.txt"]);
    }

    #[test]
    fn test_vanished_path_is_skipped_silently() {
        let dir = tempdir().unwrap();
        let gone = write(dir.path(), "gone.txt", b"bye");
        let kept = write(dir.path(), "kept.txt", b"hi");
        let paths = vec![resolved(&gone), resolved(&kept)];
        fs::remove_file(&gone).unwrap();

        let result = aggregator(true).aggregate(&paths);
        assert_eq!(result.stats.files_processed, 1);
        assert_eq!(result.stats.files_skipped_unreadable, 0);
    }

    #[test]
    fn test_drop_order_is_preserved() {
        let dir = tempdir().unwrap();
        let second = write(dir.path(), "z.txt", b"z");
        let first = write(dir.path(), "a.txt", b"a");

        let result = aggregator(true).aggregate(&[resolved(&second), resolved(&first)]);
        let bodies: Vec<&str> = result.chunks.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, vec!["z", "a"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_in_walk() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        let target = write(outside.path(), "real.txt", b"linked");
        write(outside.path(), "nested/deep.txt", b"deep");

        let root = dir.path().join("root");
        fs::create_dir(&root).unwrap();
        symlink(&target, root.join("link.txt")).unwrap();
        symlink(outside.path().join("nested"), root.join("dirlink")).unwrap();
        symlink(root.join("nowhere"), root.join("dangling")).unwrap();

        let result = aggregator(true).aggregate(&[resolved(&root)]);
        assert_eq!(result.stats.files_processed, 1);
        assert_eq!(result.stats.files_skipped_unreadable, 1);
        assert_eq!(result.chunks[0].body, "linked");
    }
}
