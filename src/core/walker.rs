// src/core/walker.rs
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::config::ScanConfig;
use super::ignore_rules::{cli_pattern_ignored, RuleSet};

/// Walks a project tree twice: once for the flat file list consumed by
/// context extraction, once for the rendered directory tree shown in the
/// generated documentation. Both walks share one merged rule set per root.
pub struct TreeWalker {
    ignore_patterns: Vec<String>,
}

impl TreeWalker {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            ignore_patterns: config.ignore_patterns.clone(),
        }
    }

    /// Recursively enumerate all non-ignored files under `root`, in the order
    /// the filesystem yields them (directories descended as encountered, not
    /// sorted). Unreadable directories are skipped with a warning.
    pub fn collect_files(&self, root: &Path) -> Vec<PathBuf> {
        let rules = RuleSet::for_root(root, &self.ignore_patterns);
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let rel = relative_normalized(root, entry.path());
                !rules.is_ignored(&rel, entry.file_type().is_dir())
            });

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    let rel = relative_normalized(root, entry.path());
                    if cli_pattern_ignored(&rel, &self.ignore_patterns) {
                        continue;
                    }
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("Cannot read directory entry: {}", err);
                }
            }
        }

        files
    }

    /// Render the directory tree as an indented string with box-drawing
    /// connectors, entries sorted alphabetically at each level, directories
    /// marked with a trailing slash.
    pub fn render_tree(&self, root: &Path) -> String {
        let rules = RuleSet::for_root(root, &self.ignore_patterns);

        let root_name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string());
        let mut tree = format!("{}/\n", root_name);

        let body = self.render_level(root, root, "", &rules);
        if body.is_empty() {
            tree.push_str("└── (empty directory or all files ignored)\n");
        } else {
            tree.push_str(&body);
        }
        tree
    }

    fn render_level(&self, dir: &Path, root: &Path, prefix: &str, rules: &RuleSet) -> String {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Cannot read directory {}: {}", dir.display(), err);
                return String::new();
            }
        };

        let mut visible: Vec<(String, bool)> = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let is_dir = match entry.file_type() {
                Ok(file_type) => file_type.is_dir(),
                Err(err) => {
                    warn!("Cannot stat {}: {}", path.display(), err);
                    continue;
                }
            };
            let rel = relative_normalized(root, &path);
            if rules.is_ignored(&rel, is_dir) {
                continue;
            }
            visible.push((entry.file_name().to_string_lossy().to_string(), is_dir));
        }
        visible.sort();

        let mut rendered = String::new();
        let count = visible.len();
        for (i, (name, is_dir)) in visible.into_iter().enumerate() {
            let is_last = i == count - 1;
            let connector = if is_last { "└── " } else { "├── " };
            let marker = if is_dir { "/" } else { "" };
            rendered.push_str(&format!("{}{}{}{}\n", prefix, connector, name, marker));

            if is_dir {
                let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
                rendered.push_str(&self.render_level(&dir.join(&name), root, &child_prefix, rules));
            }
        }
        rendered
    }
}

/// Path relative to `root`, normalized to forward-slash separators.
pub fn relative_normalized(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use crate::config::Config;

    fn walker_with_patterns(patterns: &[&str]) -> TreeWalker {
        let mut scan = Config::default().scan;
        scan.ignore_patterns = patterns.iter().map(|p| p.to_string()).collect();
        TreeWalker::new(&scan)
    }

    #[test]
    fn test_collect_files_excludes_ignored_entries() {
        let dir = TempDir::new().unwrap();
        dir.child("a.js").write_str("console.log('a');\n").unwrap();
        dir.child("dist/bundle.js").write_str("x\n").unwrap();
        dir.child("src/lib.py").write_str("x = 1\n").unwrap();

        let walker = walker_with_patterns(&["dist/"]);
        let files = walker.collect_files(dir.path());
        let rels: Vec<String> = files
            .iter()
            .map(|f| relative_normalized(dir.path(), f))
            .collect();

        assert!(rels.contains(&"a.js".to_string()));
        assert!(rels.contains(&"src/lib.py".to_string()));
        assert!(!rels.iter().any(|r| r.starts_with("dist")));
    }

    #[test]
    fn test_collect_files_honours_ignore_file_negation() {
        let dir = TempDir::new().unwrap();
        dir.child("app.log").write_str("log\n").unwrap();
        dir.child("important.log").write_str("log\n").unwrap();
        dir.child("main.py").write_str("print()\n").unwrap();
        dir.child(".gitignore").write_str("*.log\n!important.log\n").unwrap();

        let walker = walker_with_patterns(&[]);
        let files = walker.collect_files(dir.path());
        let rels: Vec<String> = files
            .iter()
            .map(|f| relative_normalized(dir.path(), f))
            .collect();

        assert!(!rels.contains(&"app.log".to_string()));
        assert!(rels.contains(&"important.log".to_string()));
        assert!(rels.contains(&"main.py".to_string()));
    }

    #[test]
    fn test_file_list_complement_is_exactly_the_ignored_set() {
        let dir = TempDir::new().unwrap();
        dir.child("keep.rs").write_str("fn main() {}\n").unwrap();
        dir.child("notes.tmp").write_str("x\n").unwrap();
        dir.child("sub/also.tmp").write_str("x\n").unwrap();
        dir.child("sub/keep.py").write_str("x\n").unwrap();

        let patterns: Vec<String> = vec!["*.tmp".to_string()];
        let walker = walker_with_patterns(&["*.tmp"]);
        let collected: Vec<String> = walker
            .collect_files(dir.path())
            .iter()
            .map(|f| relative_normalized(dir.path(), f))
            .collect();

        let rules = RuleSet::for_root(dir.path(), &patterns);
        for rel in ["keep.rs", "notes.tmp", "sub/also.tmp", "sub/keep.py"] {
            let ignored = rules.is_ignored(rel, false);
            assert_eq!(
                !ignored,
                collected.contains(&rel.to_string()),
                "mismatch for {}",
                rel
            );
        }
    }

    #[test]
    fn test_render_tree_sorts_and_marks_directories() {
        let dir = TempDir::new().unwrap();
        dir.child("zeta.js").write_str("z\n").unwrap();
        dir.child("alpha/inner.py").write_str("i\n").unwrap();

        let walker = walker_with_patterns(&[]);
        let tree = walker.render_tree(dir.path());

        let alpha_pos = tree.find("├── alpha/").expect("alpha dir listed first");
        let inner_pos = tree.find("│   └── inner.py").expect("nested entry indented");
        let zeta_pos = tree.find("└── zeta.js").expect("last entry uses terminal connector");
        assert!(alpha_pos < inner_pos && inner_pos < zeta_pos);
    }

    #[test]
    fn test_render_tree_empty_root_placeholder() {
        let dir = TempDir::new().unwrap();
        dir.child("only.log").write_str("x\n").unwrap();

        let walker = walker_with_patterns(&["*.log"]);
        let tree = walker.render_tree(dir.path());
        assert!(tree.contains("└── (empty directory or all files ignored)"));
    }

    #[test]
    fn test_tree_and_file_list_share_rule_semantics() {
        let dir = TempDir::new().unwrap();
        dir.child("src/main.rs").write_str("fn main() {}\n").unwrap();
        dir.child("target/debug/out").write_str("bin\n").unwrap();
        dir.child(".gitignore").write_str("target/\n").unwrap();

        let walker = walker_with_patterns(&[]);
        let tree = walker.render_tree(dir.path());
        let files = walker.collect_files(dir.path());

        assert!(!tree.contains("target"));
        assert!(!files
            .iter()
            .any(|f| relative_normalized(dir.path(), f).starts_with("target")));
    }
}
