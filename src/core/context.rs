// src/core/context.rs
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::warn;

use crate::config::{ContextConfig, ScanConfig};
use crate::error::Result;
use super::metadata;
use super::walker::relative_normalized;

/// Filename keywords used for ranking, highest priority first.
const PRIORITY_KEYWORDS: [&str; 10] = [
    "main", "index", "app", "run", "start", "config", "setting", "tool", "util", "helper",
];

/// Import names treated as standard-library-like and excluded from the
/// external dependency summary.
const STDLIB_IMPORTS: [&str; 9] = ["os", "sys", "path", "json", "io", "time", "re", "math", "fs"];

/// Size-bounded digest of one selected source file. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct CodeFileDigest {
    pub relative_path: String,
    pub line_count: usize,
    pub is_main_entry: bool,
    pub imports: Vec<String>,
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub snippet: Vec<String>,
}

/// Aggregate artifact handed to the generation pipeline. The `text` field is
/// the rendered digest; the pipeline treats it as an opaque string.
#[derive(Debug, Clone)]
pub struct ContextBundle {
    pub text: String,
    pub main_entry: Option<String>,
    pub external_deps: BTreeSet<String>,
    pub internal_modules: BTreeSet<String>,
    pub file_count: usize,
}

impl ContextBundle {
    fn empty() -> Self {
        Self {
            text: "(no code files found)".to_string(),
            main_entry: None,
            external_deps: BTreeSet::new(),
            internal_modules: BTreeSet::new(),
            file_count: 0,
        }
    }
}

/// Selects a bounded subset of discovered source files, orders them by
/// heuristic importance, and extracts a size-bounded textual digest per file.
pub struct ContextBuilder {
    code_extensions: Vec<String>,
    limits: ContextConfig,
    import_regex: Regex,
    internal_module_regex: Regex,
}

impl ContextBuilder {
    pub fn new(scan: &ScanConfig, limits: &ContextConfig) -> Result<Self> {
        Ok(Self {
            code_extensions: scan.code_extensions.clone(),
            limits: limits.clone(),
            import_regex: Regex::new(r"(?:import|from)\s+(\w+)")?,
            internal_module_regex: Regex::new(r"(\w+\.py|\w+\.js|\w+\.ts)")?,
        })
    }

    /// Build the context bundle from the flat file list.
    ///
    /// `main_hint` is an optional basename; `include_config` an optional
    /// config-file path whose contents are prepended as a labeled block.
    pub async fn build_context(
        &self,
        root: &Path,
        files: &[PathBuf],
        main_hint: Option<&str>,
        include_config: Option<&Path>,
    ) -> ContextBundle {
        let mut candidates: Vec<PathBuf> = files
            .iter()
            .filter(|f| self.is_code_file(f))
            .cloned()
            .collect();

        if candidates.is_empty() {
            return ContextBundle::empty();
        }

        let main_file = self.resolve_main_entry(root, &candidates, main_hint);

        // The main entry is pinned to the front; ranking orders the remainder
        if let Some(ref main) = main_file {
            candidates.retain(|f| f != main);
        }
        rank_candidates(&mut candidates);
        if let Some(ref main) = main_file {
            candidates.insert(0, main.clone());
        }

        let file_count = candidates.len();
        let selected: Vec<PathBuf> = candidates
            .into_iter()
            .take(self.limits.max_code_files)
            .collect();

        let mut main_entry = main_file
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().to_string());
        if main_entry.is_none() {
            main_entry = selected
                .first()
                .and_then(|f| f.file_name())
                .map(|n| n.to_string_lossy().to_string());
        }

        let mut text = format!("Code analysis ({} files total)\n", file_count);
        let mut external_deps = BTreeSet::new();
        let mut internal_modules = BTreeSet::new();

        if let Some(config_path) = include_config {
            text.push_str(&self.include_config_block(root, config_path).await);
        }

        for file in &selected {
            let is_main = main_file.as_deref() == Some(file.as_path());
            let digest = match self.digest_file(root, file, is_main).await {
                Some(digest) => digest,
                None => continue,
            };

            self.mine_imports(&digest.imports, &mut external_deps, &mut internal_modules);
            text.push_str(&self.render_digest(&digest));
        }

        text.push_str("\nProject summary:\n");
        text.push_str(&format!(
            "   Main entry: {}\n",
            main_entry.as_deref().unwrap_or("unknown")
        ));
        if !external_deps.is_empty() {
            let names: Vec<&str> = external_deps.iter().map(String::as_str).collect();
            text.push_str(&format!("   External dependencies: {}\n", names.join(", ")));
        }
        if !internal_modules.is_empty() {
            let names: Vec<&str> = internal_modules.iter().map(String::as_str).collect();
            text.push_str(&format!("   Internal modules: {}\n", names.join(", ")));
        }

        ContextBundle {
            text,
            main_entry,
            external_deps,
            internal_modules,
            file_count,
        }
    }

    fn is_code_file(&self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if name.ends_with(".d.ts") {
            return false;
        }
        self.code_extensions
            .iter()
            .any(|ext| name.ends_with(ext.as_str()))
    }

    /// Resolve the main entry: an explicit basename hint wins, otherwise the
    /// manifest-declared entry matched by exact path.
    fn resolve_main_entry(
        &self,
        root: &Path,
        candidates: &[PathBuf],
        main_hint: Option<&str>,
    ) -> Option<PathBuf> {
        if let Some(hint) = main_hint {
            let hint_base = Path::new(hint)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| hint.to_string());
            return candidates
                .iter()
                .find(|f| {
                    f.file_name()
                        .map(|n| n.to_string_lossy() == hint_base)
                        .unwrap_or(false)
                })
                .cloned();
        }

        let declared = metadata::manifest_main_path(root)?;
        candidates.iter().find(|f| **f == declared).cloned()
    }

    async fn include_config_block(&self, root: &Path, config_path: &Path) -> String {
        // Resolve first against the invocation directory, then the project root
        let invocation_dir = std::env::current_dir().unwrap_or_else(|_| root.to_path_buf());
        let mut resolved = invocation_dir.join(config_path);
        if !resolved.exists() {
            resolved = root.join(config_path);
        }

        if !resolved.exists() {
            warn!("Specified config file does not exist: {}", config_path.display());
            return "\n[Specified config file]: not found\n".to_string();
        }

        match tokio::fs::read_to_string(&resolved).await {
            Ok(content) => {
                let rel = relative_normalized(root, &resolved);
                let lines: Vec<&str> = content.split('\n').collect();
                format!(
                    "\n[Specified config file]: {}\n   Snippet:\n   {}\n",
                    rel,
                    lines.join("\n   ")
                )
            }
            Err(err) => {
                warn!("Cannot read specified config file {}: {}", resolved.display(), err);
                "\n[Specified config file]: read failed\n".to_string()
            }
        }
    }

    /// Scan one file for import/declaration lines and a snippet. This is a
    /// line-pattern classifier, not a parser: the main entry is scanned in
    /// full, every other file only up to the configured line cap.
    async fn digest_file(&self, root: &Path, file: &Path, is_main: bool) -> Option<CodeFileDigest> {
        let content = match tokio::fs::read_to_string(file).await {
            Ok(content) => content,
            Err(err) => {
                warn!("Cannot read file {}: {}", file.display(), err);
                return None;
            }
        };

        let lines: Vec<&str> = content.split('\n').collect();
        let parse_limit = if is_main {
            lines.len()
        } else {
            self.limits.max_parse_lines.min(lines.len())
        };

        let mut imports = Vec::new();
        let mut functions = Vec::new();
        let mut classes = Vec::new();
        for line in &lines[..parse_limit] {
            let trimmed = line.trim();
            if trimmed.starts_with("import ") || trimmed.starts_with("from ") {
                imports.push(trimmed.to_string());
            }
            if trimmed.starts_with("def ") || trimmed.starts_with("function ") {
                functions.push(trimmed.to_string());
            }
            if trimmed.starts_with("class ") {
                classes.push(trimmed.to_string());
            }
        }

        let snippet_source = if is_main {
            &lines[..]
        } else {
            &lines[..self.limits.snippet_lines.min(lines.len())]
        };
        let snippet: Vec<String> = snippet_source
            .iter()
            .filter(|l| {
                let trimmed = l.trim();
                !trimmed.is_empty() && !trimmed.starts_with('#')
            })
            .map(|l| l.to_string())
            .collect();

        Some(CodeFileDigest {
            relative_path: relative_normalized(root, file),
            line_count: lines.len(),
            is_main_entry: is_main,
            imports,
            functions,
            classes,
            snippet,
        })
    }

    fn mine_imports(
        &self,
        imports: &[String],
        external_deps: &mut BTreeSet<String>,
        internal_modules: &mut BTreeSet<String>,
    ) {
        for import in imports {
            if let Some(captures) = self.import_regex.captures(import) {
                let name = &captures[1];
                if !STDLIB_IMPORTS.contains(&name) {
                    external_deps.insert(name.to_string());
                }
            }
            if import.contains('.') {
                if let Some(captures) = self.internal_module_regex.captures(import) {
                    internal_modules.insert(captures[1].to_string());
                }
            }
        }
    }

    fn render_digest(&self, digest: &CodeFileDigest) -> String {
        let mut out = format!(
            "\nFile: {} ({} lines){}\n",
            digest.relative_path,
            digest.line_count,
            if digest.is_main_entry { " [main entry]" } else { "" }
        );

        let import_limit = if digest.is_main_entry { 20 } else { 5 };
        let func_limit = if digest.is_main_entry { 20 } else { 3 };

        if !digest.imports.is_empty() {
            let shown: Vec<&str> = digest
                .imports
                .iter()
                .take(import_limit)
                .map(String::as_str)
                .collect();
            let ellipsis = if digest.imports.len() > import_limit { "..." } else { "" };
            out.push_str(&format!("   Imports: {}{}\n", shown.join(", "), ellipsis));
        }
        if !digest.functions.is_empty() {
            let shown: Vec<&str> = digest
                .functions
                .iter()
                .take(func_limit)
                .map(String::as_str)
                .collect();
            let ellipsis = if digest.functions.len() > func_limit { "..." } else { "" };
            out.push_str(&format!("   Functions: {}{}\n", shown.join(", "), ellipsis));
        }
        if !digest.classes.is_empty() {
            let shown: Vec<&str> = digest.classes.iter().map(String::as_str).collect();
            out.push_str(&format!("   Classes: {}\n", shown.join(", ")));
        }
        if !digest.snippet.is_empty() {
            out.push_str(&format!("   Snippet:\n   {}\n", digest.snippet.join("\n   ")));
        }
        out
    }
}

/// Sort candidates by keyword priority, lexicographic path order breaking
/// ties. Stable and deterministic for a given input list.
fn rank_candidates(candidates: &mut [PathBuf]) {
    candidates.sort_by(|a, b| {
        let score_a = priority_score(a);
        let score_b = priority_score(b);
        score_b
            .cmp(&score_a)
            .then_with(|| a.to_string_lossy().cmp(&b.to_string_lossy()))
    });
}

/// A filename's score is the highest-priority keyword it contains; earlier
/// keywords rank higher, 0 when none match.
fn priority_score(path: &Path) -> usize {
    let base = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let mut score = 0;
    for (idx, keyword) in PRIORITY_KEYWORDS.iter().enumerate() {
        if base.contains(keyword) {
            score = score.max(PRIORITY_KEYWORDS.len() - idx);
        }
    }
    score
}
