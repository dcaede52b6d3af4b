/*!
 * Compilation of nested `.gitignore` files into one root-scoped matcher
 *
 * Every rule is rewritten relative to the dropped directory so a single
 * matcher can answer for the whole tree. Later rules override earlier ones,
 * and rules are appended in discovery order (a directory's file before
 * those of its descendants), so deeper files win over their ancestors.
 */

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log::{debug, warn};

use crate::aggregator::read_text_strict;
use crate::error::SkipReason;
use crate::utils::{to_slash, walk_dir};

/// File name that carries ignore rules
pub const IGNORE_FILE: &str = ".gitignore";

/// A single rule, scoped to the directory of the file that defined it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnorePattern {
    /// Glob with the `!` and leading `/` markers removed
    pub glob: String,
    /// Re-includes paths matched by earlier rules
    pub negated: bool,
    /// Only matches directly below `scope`
    pub anchored: bool,
    /// Directory of the defining file, relative to the root, `/`-separated
    pub scope: String,
}

impl IgnorePattern {
    /// Parse one line of an ignore file located at `scope`
    ///
    /// Returns `None` for blank lines, comments, and bare markers.
    pub fn parse(line: &str, scope: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (negated, rest) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let (anchored, rest) = match rest.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        if rest.is_empty() {
            return None;
        }

        Some(Self {
            glob: rest.to_string(),
            negated,
            anchored,
            scope: scope.to_string(),
        })
    }

    /// The rule rewritten relative to the scan root
    ///
    /// A scoped rule becomes `scope/glob`, so `*.tmp` in `sub/` matches
    /// `sub/x.tmp` but not `sub/deep/x.tmp`.
    pub fn rendered(&self) -> String {
        let mut out = String::with_capacity(self.scope.len() + self.glob.len() + 3);
        if self.negated {
            out.push('!');
        }
        if self.anchored {
            out.push('/');
        }
        if !self.scope.is_empty() {
            out.push_str(&self.scope);
            out.push('/');
        }
        out.push_str(&self.glob);
        out
    }
}

/// Ordered, last-match-wins rule set for one dropped directory
#[derive(Debug, Clone, Default)]
pub struct IgnoreSpec {
    patterns: Vec<IgnorePattern>,
    matcher: Option<Gitignore>,
}

impl IgnoreSpec {
    /// A rule set that filters nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Discover every ignore file below `root` and compile them
    pub fn compile(root: &Path) -> Self {
        Self::from_patterns(root, collect_patterns(root))
    }

    /// Build a matcher from already scoped rules
    ///
    /// A rule that fails to compile disables filtering for the whole root.
    pub fn from_patterns(root: &Path, patterns: Vec<IgnorePattern>) -> Self {
        if patterns.is_empty() {
            return Self::empty();
        }

        match build_matcher(root, &patterns) {
            Ok(matcher) => {
                debug!(
                    "Compiled {} ignore rule(s) for {}",
                    patterns.len(),
                    root.display()
                );
                Self {
                    patterns,
                    matcher: Some(matcher),
                }
            }
            Err(e) => {
                warn!(
                    "Could not compile ignore rules for {}, filtering disabled: {}",
                    root.display(),
                    e
                );
                Self::empty()
            }
        }
    }

    /// Whether any rule is in effect
    pub fn is_active(&self) -> bool {
        self.matcher.is_some()
    }

    /// Compiled rules in evaluation order
    pub fn patterns(&self) -> &[IgnorePattern] {
        &self.patterns
    }

    /// Whether a file, given relative to the root with `/` separators, is ignored
    ///
    /// Parent directories are checked too, so `build/` excludes
    /// `build/out.txt`.
    pub fn matches(&self, relative_path: &str) -> bool {
        let Some(matcher) = &self.matcher else {
            return false;
        };
        let relative = relative_path.trim_start_matches('/');
        if relative.is_empty() {
            return false;
        }
        matcher
            .matched_path_or_any_parents(Path::new(relative), false)
            .is_ignore()
    }
}

fn build_matcher(root: &Path, patterns: &[IgnorePattern]) -> Result<Gitignore, ignore::Error> {
    let mut builder = GitignoreBuilder::new(root);
    for pattern in patterns {
        builder.add_line(None, &pattern.rendered())?;
    }
    builder.build()
}

/// Collect rules from every ignore file below `root`, outside `.git`
pub fn collect_patterns(root: &Path) -> Vec<IgnorePattern> {
    let mut patterns = Vec::new();

    for dir in walk_dir(root).filter(|e| e.file_type().is_dir()) {
        let ignore_file = dir.path().join(IGNORE_FILE);
        if !ignore_file.is_file() {
            continue;
        }

        let scope = dir
            .path()
            .strip_prefix(root)
            .map(to_slash)
            .unwrap_or_default();

        match read_text_strict(&ignore_file) {
            Ok(contents) => {
                let before = patterns.len();
                patterns.extend(parse_ignore_file(&contents, &scope));
                debug!(
                    "Loaded {} rule(s) from {}",
                    patterns.len() - before,
                    ignore_file.display()
                );
            }
            Err(reason) => warn!(
                "{}: skipping rules in {} ({})",
                SkipReason::IgnoreFileUnreadable,
                ignore_file.display(),
                reason
            ),
        }
    }

    patterns
}

/// Parse the contents of one ignore file located at `scope`
pub fn parse_ignore_file(contents: &str, scope: &str) -> Vec<IgnorePattern> {
    contents
        .lines()
        .filter_map(|line| IgnorePattern::parse(line, scope))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, contents: &[u8]) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_parse_line_markers() {
        let p = IgnorePattern::parse("!/keep.txt", "sub").unwrap();
        assert!(p.negated);
        assert!(p.anchored);
        assert_eq!(p.glob, "keep.txt");
        assert_eq!(p.rendered(), "!/sub/keep.txt");

        let p = IgnorePattern::parse("  *.log  ", "").unwrap();
        assert_eq!(p.rendered(), "*.log");

        assert_eq!(IgnorePattern::parse("/local.txt", "").unwrap().rendered(), "/local.txt");
        assert_eq!(IgnorePattern::parse("tmp/", "a/b").unwrap().rendered(), "a/b/tmp/");
    }

    #[test]
    fn test_parse_skips_blank_comments_and_bare_markers() {
        let rules = parse_ignore_file("# comment\n\n   \n!\n/\n*.o\n", "");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].glob, "*.o");
    }

    #[test]
    fn test_no_ignore_files_is_noop() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.txt", b"a");
        let spec = IgnoreSpec::compile(dir.path());
        assert!(!spec.is_active());
        assert!(spec.patterns().is_empty());
        assert!(!spec.matches("a.txt"));
        assert!(!spec.matches("any/thing.log"));
    }

    #[test]
    fn test_unanchored_root_pattern_with_negation() {
        let dir = tempdir().unwrap();
        write(dir.path(), ".gitignore", b"*.log\n!keep.log\n");
        let spec = IgnoreSpec::compile(dir.path());

        assert!(spec.matches("x.log"));
        assert!(spec.matches("sub/x.log"));
        assert!(!spec.matches("keep.log"));
        assert!(!spec.matches("notes.txt"));
    }

    #[test]
    fn test_nested_anchored_pattern_is_scoped() {
        let dir = tempdir().unwrap();
        write(dir.path(), "sub/.gitignore", b"/local.txt\n");
        let spec = IgnoreSpec::compile(dir.path());

        assert_eq!(spec.patterns()[0].rendered(), "/sub/local.txt");
        assert!(spec.matches("sub/local.txt"));
        assert!(!spec.matches("local.txt"));
        assert!(!spec.matches("sub/deeper/local.txt"));
    }

    #[test]
    fn test_root_anchored_pattern() {
        let dir = tempdir().unwrap();
        write(dir.path(), ".gitignore", b"/build.txt\n");
        let spec = IgnoreSpec::compile(dir.path());

        assert!(spec.matches("build.txt"));
        assert!(!spec.matches("sub/build.txt"));
    }

    #[test]
    fn test_directory_pattern_excludes_contents() {
        let dir = tempdir().unwrap();
        write(dir.path(), ".gitignore", b"target/\n");
        let spec = IgnoreSpec::compile(dir.path());

        assert!(spec.matches("target/debug/app"));
        assert!(!spec.matches("target"));
        assert!(!spec.matches("src/main.rs"));
    }

    #[test]
    fn test_deeper_file_overrides_parent() {
        let dir = tempdir().unwrap();
        write(dir.path(), ".gitignore", b"*.log\n");
        write(dir.path(), "sub/.gitignore", b"!important.log\n");
        let spec = IgnoreSpec::compile(dir.path());

        let rendered: Vec<String> = spec.patterns().iter().map(IgnorePattern::rendered).collect();
        assert_eq!(rendered, vec!["*.log", "!sub/important.log"]);
        assert!(spec.matches("important.log"));
        assert!(!spec.matches("sub/important.log"));
        assert!(spec.matches("sub/other.log"));
    }

    #[test]
    fn test_git_directory_is_not_scanned() {
        let dir = tempdir().unwrap();
        write(dir.path(), ".git/.gitignore", b"*\n");
        let spec = IgnoreSpec::compile(dir.path());
        assert!(!spec.is_active());
        assert!(!spec.matches("src/lib.rs"));
    }

    #[test]
    fn test_undecodable_ignore_file_is_skipped() {
        let dir = tempdir().unwrap();
        write(dir.path(), ".gitignore", b"*.tmp\n");
        write(dir.path(), "bad/.gitignore", &[0xff, 0xfe, b'*', b'\n']);
        let spec = IgnoreSpec::compile(dir.path());

        assert_eq!(spec.patterns().len(), 1);
        assert!(spec.matches("a.tmp"));
        assert!(!spec.matches("bad/a.rs"));
    }

    #[test]
    fn test_malformed_glob_disables_filtering() {
        let dir = tempdir().unwrap();
        write(dir.path(), ".gitignore", b"*.log\na{b\n");
        let spec = IgnoreSpec::compile(dir.path());
        assert!(!spec.is_active());
        assert!(!spec.matches("x.log"));

        let spec = IgnoreSpec::from_patterns(
            dir.path(),
            vec![
                IgnorePattern::parse("*.log", "").unwrap(),
                IgnorePattern::parse("[z-a]", "sub").unwrap(),
            ],
        );
        assert!(!spec.is_active());
        assert!(!spec.matches("x.log"));
    }

    #[test]
    fn test_nested_unanchored_rule_covers_its_own_level_only() {
        let dir = tempdir().unwrap();
        write(dir.path(), "sub/.gitignore", b"*.tmp\n");
        let spec = IgnoreSpec::compile(dir.path());

        assert_eq!(spec.patterns()[0].rendered(), "sub/*.tmp");
        assert!(spec.matches("sub/x.tmp"));
        assert!(!spec.matches("sub/deep/x.tmp"));
        assert!(!spec.matches("x.tmp"));
    }
}
