// src/core/ignore_rules.rs
use std::collections::HashSet;
use std::path::Path;

use regex::Regex;

/// A single parsed ignore rule plus its derived matcher.
///
/// Supported syntax is a practical subset of ignore-file semantics:
/// `!` negation, a trailing `/` directory marker, and `*` wildcards.
/// No `**`, no character classes.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    /// Pattern body with any `!` prefix stripped
    pub pattern: String,

    pub is_negation: bool,

    pub is_directory_only: bool,

    pub has_wildcard: bool,

    /// Compiled wildcard matcher; `*` matches any run of characters,
    /// literal dots are escaped, matching is case-insensitive.
    matcher: Option<Regex>,
}

impl IgnoreRule {
    /// Parse a single rule line. Returns `None` for blanks and `#` comments.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        let (is_negation, body) = match trimmed.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, trimmed),
        };
        if body.is_empty() {
            return None;
        }

        let has_wildcard = body.contains('*');
        let matcher = if has_wildcard {
            // Invalid patterns simply never match; ignore rules must not abort a scan
            Regex::new(&format!("(?i)^{}$", wildcard_to_regex(body))).ok()
        } else {
            None
        };

        Some(Self {
            pattern: body.to_string(),
            is_negation,
            is_directory_only: body.ends_with('/'),
            has_wildcard,
            matcher,
        })
    }

    /// Test this rule against a path normalized to forward slashes,
    /// relative to the scan root.
    fn matches(&self, path: &str, is_directory: bool) -> bool {
        if self.is_directory_only {
            let dir = &self.pattern[..self.pattern.len() - 1];
            if is_directory && final_segment(path) == dir {
                return true;
            }
            // Nested under a directory of that name
            return path.starts_with(&format!("{}/", dir))
                || path.contains(&format!("/{}/", dir));
        }

        if self.has_wildcard {
            return self.matcher.as_ref().is_some_and(|re| re.is_match(path));
        }

        if !self.pattern.contains('/') {
            return final_segment(path) == self.pattern;
        }

        path == self.pattern || path.starts_with(&format!("{}/", self.pattern))
    }
}

/// The effective rule sequence for one scan root: configured patterns first,
/// then ignore-file patterns, duplicates removed, source order preserved.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<IgnoreRule>,
}

impl RuleSet {
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Self {
        Self {
            rules: patterns.iter().filter_map(|p| IgnoreRule::parse(p.as_ref())).collect(),
        }
    }

    /// Assemble the rule set for a scan root by merging the configured
    /// patterns with the root's ignore file.
    pub fn for_root(root: &Path, configured: &[String]) -> Self {
        let mut merged: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for pattern in configured.iter().cloned().chain(parse_ignore_file(root)) {
            if seen.insert(pattern.clone()) {
                merged.push(pattern);
            }
        }
        Self::from_patterns(&merged)
    }

    /// Last-match-wins evaluation: every rule is consulted in order and the
    /// final state is authoritative. A later matching negation re-includes a
    /// path that an earlier rule excluded.
    pub fn is_ignored(&self, path: &str, is_directory: bool) -> bool {
        let mut ignored = false;
        for rule in &self.rules {
            if rule.matches(path, is_directory) {
                ignored = !rule.is_negation;
            }
        }
        ignored
    }
}

/// Read the project-root ignore file. An unreadable or missing file
/// contributes no rules; it never fails the scan.
pub fn parse_ignore_file(root: &Path) -> Vec<String> {
    let path = root.join(".gitignore");
    match std::fs::read_to_string(&path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// The independent check applied to the configured pattern list only, with
/// its own wildcard handling: `dir/*` excludes everything under `dir`, a
/// `*` pattern without a slash is matched against the base name alone.
///
/// This runs alongside [`RuleSet::is_ignored`] when the flat file list is
/// built; both agree for plain directory and file name rules. The
/// duplication is deliberate — see DESIGN.md.
pub fn cli_pattern_ignored(rel_path: &str, patterns: &[String]) -> bool {
    let normalized = rel_path.replace('\\', "/");
    patterns.iter().any(|pattern| {
        let pattern = pattern.replace('\\', "/");

        if let Some(pos) = pattern.find("/*") {
            let dir = &pattern[..pos];
            return normalized.starts_with(&format!("{}/", dir)) && normalized != dir;
        }

        if pattern.contains('*') {
            let base = final_segment(&normalized);
            return Regex::new(&format!("^{}$", wildcard_to_regex(&pattern)))
                .map(|re| re.is_match(base))
                .unwrap_or(false);
        }

        normalized == pattern || normalized.starts_with(&format!("{}/", pattern))
    })
}

fn wildcard_to_regex(pattern: &str) -> String {
    pattern.replace('.', r"\.").replace('*', ".*")
}

fn final_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
