// src/core/logger.rs
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// Append-only log file, one file per day under `log/` in the invocation
/// directory. Records project analysis, every AI interaction, generated
/// README content, and errors. Writes are best-effort: a logging failure is
/// reported on stderr and never interrupts generation.
pub struct FileLogger {
    log_dir: PathBuf,
}

impl FileLogger {
    pub fn new() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { log_dir: cwd.join("log") }
    }

    pub fn with_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self { log_dir: dir.into() }
    }

    pub async fn project_analysis(
        &self,
        root: &Path,
        structure: &str,
        code_context: &str,
        dependencies: Option<&str>,
    ) {
        let divider = "─".repeat(80);
        let mut content = format!(
            "Project analysis\n\n{}\nProject root: {}\n\n{}\n[Project structure]\n{}",
            divider,
            root.display(),
            divider,
            structure
        );
        content.push_str(&format!("\n\n{}\n[Code context]\n{}", divider, code_context));
        if let Some(deps) = dependencies {
            content.push_str(&format!("\n\n{}\n[Project dependencies]\n{}", divider, deps));
        }
        self.write(&content, "PROJECT_ANALYSIS").await;
    }

    pub async fn ai_interaction(&self, prompt: &str, response: &str, section: &str) {
        let divider = "─".repeat(80);
        let content = format!(
            "[Section] {}\n\n{}\n[Prompt sent to model]\n{}\n\n{}\n[Model response]\n{}",
            section, divider, prompt, divider, response
        );
        self.write(&content, section).await;
    }

    pub async fn readme_generated(&self, content: &str, language: &str) {
        let divider = "─".repeat(80);
        let entry = format!(
            "[Generated {} README]\nContent length: {} chars\n\n{}\n{}",
            language,
            content.chars().count(),
            divider,
            content
        );
        self.write(&entry, &format!("README_{}", language.to_uppercase())).await;
    }

    pub async fn error(&self, error: &str, context: &str) {
        let content = format!("Error context: {}\nError message: {}", context, error);
        self.write(&content, "ERROR").await;
    }

    pub async fn info(&self, message: &str) {
        self.write(message, "INFO").await;
    }

    async fn write(&self, content: &str, kind: &str) {
        if let Err(err) = self.try_write(content, kind).await {
            eprintln!("Failed to write log: {}", err);
        }
    }

    async fn try_write(&self, content: &str, kind: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.log_dir).await?;

        let date = chrono::Local::now().format("%Y-%m-%d");
        let path = self.log_dir.join(format!("{}.log", date));

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let separator = "═".repeat(80);
        let entry = format!(
            "\n{}\n[{}] [{}]\n{}\n{}\n",
            separator, timestamp, kind, separator, content
        );

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(entry.as_bytes()).await?;
        Ok(())
    }
}

impl Default for FileLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_entries_are_appended_to_daily_file() {
        let dir = tempdir().unwrap();
        let logger = FileLogger::with_dir(dir.path());

        logger.info("first entry").await;
        logger.error("boom", "unit test").await;

        let date = chrono::Local::now().format("%Y-%m-%d");
        let path = dir.path().join(format!("{}.log", date));
        let content = std::fs::read_to_string(path).unwrap();

        assert!(content.contains("first entry"));
        assert!(content.contains("[INFO]"));
        assert!(content.contains("Error context: unit test"));
        let first = content.find("first entry").unwrap();
        let second = content.find("Error message: boom").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_ai_interaction_records_prompt_and_response() {
        let dir = tempdir().unwrap();
        let logger = FileLogger::with_dir(dir.path());

        logger.ai_interaction("the prompt", "the response", "INTRO").await;

        let date = chrono::Local::now().format("%Y-%m-%d");
        let content =
            std::fs::read_to_string(dir.path().join(format!("{}.log", date))).unwrap();
        assert!(content.contains("[Prompt sent to model]"));
        assert!(content.contains("the prompt"));
        assert!(content.contains("the response"));
    }
}
