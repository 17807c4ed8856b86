// src/core/engine.rs
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::ReadsmithError;
use super::context::ContextBuilder;
use super::llm::create_client;
use super::logger::FileLogger;
use super::walker::TreeWalker;
use super::writer::ReadmeWriter;

/// Main orchestration engine: walk the tree, assemble the context bundle,
/// hand both to the writer.
pub struct Engine {
    config: Config,
    walker: TreeWalker,
    context_builder: ContextBuilder,
    writer: ReadmeWriter,
}

impl Engine {
    pub async fn new(config: Config) -> Result<Self> {
        let llm = create_client(&config.ai)?;
        info!("🤖 AI backend: {}", llm.provider_name());
        info!("📦 Model: {}", llm.model_name());

        let invocation_dir = std::env::current_dir()
            .context("Cannot determine current working directory")?;

        let walker = TreeWalker::new(&config.scan);
        let context_builder = ContextBuilder::new(&config.scan, &config.context)?;
        let writer = ReadmeWriter::new(&config, llm, FileLogger::new(), invocation_dir)?;

        Ok(Self {
            config,
            walker,
            context_builder,
            writer,
        })
    }

    /// Analyze a project and generate its README documents.
    pub async fn generate(
        &self,
        path: Option<PathBuf>,
        main_file: Option<String>,
        include_config: Option<PathBuf>,
    ) -> Result<()> {
        let root = resolve_root(path)?;
        info!("🔍 Analyzing project: {}", root.display());
        info!("📁 Ignore patterns: {}", self.config.scan.ignore_patterns.join(", "));
        if let Some(ref config_file) = include_config {
            info!("⚙️ Specified config file: {}", config_file.display());
        }

        let structure = self.walker.render_tree(&root);
        let files = self.walker.collect_files(&root);
        if files.is_empty() {
            warn!("⚠️ No usable files found; check the path or the ignore patterns.");
            return Ok(());
        }

        info!(
            "📚 Collecting key code snippets (up to {} files)...",
            self.config.context.max_code_files
        );
        let bundle = self
            .context_builder
            .build_context(&root, &files, main_file.as_deref(), include_config.as_deref())
            .await;

        self.writer.generate_readme(&root, &structure, &bundle).await?;
        Ok(())
    }

    /// Translate a previously generated README to English. A missing
    /// primary README is diagnosed with its expected path and aborts the
    /// operation without failing the process.
    pub async fn translate(&self, path: Option<PathBuf>) -> Result<()> {
        let root = resolve_root(path)?;
        match self.writer.translate_readme(&root).await {
            Err(ReadsmithError::MissingPrerequisite { expected }) => {
                error!("❌ No generated README.md found; run the generate command first.");
                error!("   Expected path: {}", expected.display());
                Ok(())
            }
            other => Ok(other?),
        }
    }
}

fn resolve_root(path: Option<PathBuf>) -> Result<PathBuf> {
    let raw = match path {
        Some(path) => path,
        None => std::env::current_dir().context("Cannot determine current working directory")?,
    };
    std::fs::canonicalize(&raw)
        .with_context(|| format!("Invalid project directory: {}", raw.display()))
}
