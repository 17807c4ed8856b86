// src/core/writer.rs
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{Config, OutputConfig};
use crate::error::{ReadsmithError, Result};
use super::context::ContextBundle;
use super::llm::{complete_with_retry, LlmClient};
use super::logger::FileLogger;
use super::markdown::{self, MarkdownCleaner};
use super::metadata::{self, ProjectMetadata};
use super::prompts::{
    PromptLibrary, SECTION_SYSTEM_PROMPT, TRANSLATE_README_SYSTEM, TRANSLATE_TAGLINE_SYSTEM,
};

/// Assembles the bilingual README from the tree string and context bundle:
/// section-by-section generation, a refine pass, then translation.
pub struct ReadmeWriter {
    output: OutputConfig,
    prompts: PromptLibrary,
    cleaner: MarkdownCleaner,
    llm: Box<dyn LlmClient>,
    logger: FileLogger,
    invocation_dir: PathBuf,
}

impl ReadmeWriter {
    pub fn new(
        config: &Config,
        llm: Box<dyn LlmClient>,
        logger: FileLogger,
        invocation_dir: PathBuf,
    ) -> Result<Self> {
        Ok(Self {
            output: config.output.clone(),
            prompts: PromptLibrary::new()?,
            cleaner: MarkdownCleaner::new()?,
            llm,
            logger,
            invocation_dir,
        })
    }

    /// Generate the primary README (and its English translation when
    /// enabled) under `<invocation dir>/<folder>/<project name>/`.
    pub async fn generate_readme(
        &self,
        root: &Path,
        structure: &str,
        context: &ContextBundle,
    ) -> Result<PathBuf> {
        let meta = ProjectMetadata::read(root);
        let project_name = meta.name.clone();

        let raw_deps = metadata::dependencies_content(root);
        if raw_deps.is_some() {
            info!("✅ Project dependency information loaded");
        }
        let git_info = metadata::git_remote_info(root);
        if let Some(ref remote) = git_info {
            info!("✅ Detected GitHub repository: {}", remote.url);
        }

        let structure = markdown::clean_structure(structure);

        let output_dir = self.output_dir(&project_name);
        tokio::fs::create_dir_all(&output_dir).await?;
        info!("📂 Output directory: {}", output_dir.display());
        info!("📝 Generating Chinese README.md...");
        info!("📦 Project name: {}", project_name);
        if let Some(description) = &meta.description {
            info!("📝 Project description: {}", description);
        }
        info!("📄 Code context length: {} chars", context.text.chars().count());
        info!("🌳 Project structure length: {} chars", structure.chars().count());
        if let Some(main) = &context.main_entry {
            info!("📌 Main entry file: {}", main);
        }

        let header = format!(
            "{}{}",
            metadata::github_badges(git_info.as_ref()),
            metadata::language_links("README_EN.md")
        );

        self.logger
            .project_analysis(root, &structure, &context.text, raw_deps.as_deref())
            .await;

        let mut zh_content = String::new();
        for section in &self.output.sections {
            info!("  → Generating section: {}", section.title);
            match section.key.as_str() {
                "name" => {
                    let prompt = self.prompts.render_section(
                        "name",
                        &structure,
                        &context.text,
                        None,
                        Some(&meta),
                    )?;
                    let tagline = self.call_model(SECTION_SYSTEM_PROMPT, &prompt).await?;
                    zh_content
                        .push_str(&format!("<h1 align=\"center\">{}</h1>\n\n", project_name));
                    zh_content
                        .push_str(&format!("<p align=\"center\">{}</p>\n\n", tagline.trim()));
                    zh_content.push_str(&header);
                    zh_content.push_str("\n\n");
                }
                "intro" if meta.description.is_some() => {
                    // The manifest description short-circuits the model call
                    zh_content.push_str(&format!(
                        "## {}\n\n{}\n\n",
                        section.title,
                        meta.description.as_deref().unwrap_or_default()
                    ));
                }
                "structure" => {
                    zh_content.push_str(&format!(
                        "## {}\n\n```text\n{}\n```\n\n",
                        section.title, structure
                    ));
                }
                key => {
                    let raw = if key == "dependencies" { raw_deps.as_deref() } else { None };
                    let prompt = match self.prompts.render_section(
                        key,
                        &structure,
                        &context.text,
                        raw,
                        Some(&meta),
                    ) {
                        Ok(prompt) => prompt,
                        Err(err) => {
                            warn!("  ⚠️ No prompt for section \"{}\": {}", section.title, err);
                            continue;
                        }
                    };
                    let raw_content = self.call_model(SECTION_SYSTEM_PROMPT, &prompt).await?;
                    let content = self.cleaner.clean_ai_content(&raw_content);
                    if content.is_empty() {
                        warn!("  ⚠️ Section \"{}\" came back empty, skipping", section.title);
                        continue;
                    }
                    zh_content.push_str(&format!("## {}\n\n{}\n\n", section.title, content));
                }
            }
        }

        let zh_content = zh_content.trim().to_string();
        let zh_path = output_dir.join("README.md");
        tokio::fs::write(&zh_path, &zh_content).await?;
        info!("✅ Generated: {}", zh_path.display());
        info!("📊 Content length: {} chars", zh_content.chars().count());
        self.logger.readme_generated(&zh_content, "zh").await;

        if let Err(err) = self.refine_readme(&zh_path).await {
            warn!("💥 README refinement failed: {}", err);
            self.logger.error(&err.to_string(), "README refinement").await;
        }

        if self.output.generate_english {
            let final_zh = tokio::fs::read_to_string(&zh_path).await?;
            match self.translate_to_english(&final_zh, root).await {
                Ok(en_content) => {
                    let en_path = output_dir.join("README_EN.md");
                    tokio::fs::write(&en_path, &en_content).await?;
                    info!("✅ Generated English translation: {}", en_path.display());
                    self.logger.readme_generated(&en_content, "en").await;
                }
                Err(err) => {
                    warn!("💥 Translation failed: {}", err);
                    self.logger
                        .error(&err.to_string(), "Translating README to English")
                        .await;
                }
            }
        }

        Ok(zh_path)
    }

    /// Re-feed the generated README for a dedup and polish pass, preserving
    /// the section structure, and repair any unbalanced code fences.
    pub async fn refine_readme(&self, path: &Path) -> Result<()> {
        info!("🔧 Refining README content (dedup and polish)...");

        let content = tokio::fs::read_to_string(path).await?;
        let prompt = self.prompts.refine_prompt(&content)?;
        let refined = self.call_model(SECTION_SYSTEM_PROMPT, &prompt).await?;

        let refined = markdown::strip_wrapping_fences(&refined);
        let refined = markdown::ensure_code_blocks_closed(&refined);

        tokio::fs::write(path, refined).await?;
        info!("✅ README refinement written back");
        Ok(())
    }

    /// Standalone translation of a previously generated README. Fails with
    /// a `MissingPrerequisite` carrying the expected path when generation
    /// has not run yet.
    pub async fn translate_readme(&self, root: &Path) -> Result<()> {
        let project_name = ProjectMetadata::read(root).name;
        let output_dir = self.output_dir(&project_name);
        let zh_path = output_dir.join("README.md");
        if !zh_path.exists() {
            return Err(ReadsmithError::MissingPrerequisite { expected: zh_path });
        }

        let zh_content = tokio::fs::read_to_string(&zh_path).await?;
        let en_content = self.translate_to_english(&zh_content, root).await?;
        let en_path = output_dir.join("README_EN.md");
        tokio::fs::write(&en_path, en_content).await?;
        info!("✅ Generated English translation: {}", en_path.display());
        Ok(())
    }

    async fn translate_to_english(&self, zh_content: &str, root: &Path) -> Result<String> {
        info!("🌍 Translating Chinese README to English...");

        let git_info = metadata::git_remote_info(root);
        let en_header = format!(
            "{}{}",
            metadata::github_badges(git_info.as_ref()),
            metadata::language_links_en("README.md")
        );

        let zh_tagline = self.cleaner.tagline_after_h1(zh_content);
        if let Some(ref tagline) = zh_tagline {
            info!("  📌 Extracted tagline: {}", tagline);
        }

        // Badges, language links and the tagline are re-spliced after
        // translation; the model never sees them
        let stripped = self.cleaner.remove_badges_and_language_links(zh_content);
        let for_translation = self.cleaner.remove_tagline_after_h1(&stripped);

        let prompt = self.prompts.translate_readme_prompt(&for_translation)?;
        let en_content = self.call_model(TRANSLATE_README_SYSTEM, &prompt).await?;
        let cleaned = self.cleaner.clean_translated_content(&en_content);

        let en_tagline = match zh_tagline {
            Some(tagline) => {
                let tagline_prompt = self.prompts.translate_tagline_prompt(&tagline)?;
                let translated = self.call_model(TRANSLATE_TAGLINE_SYSTEM, &tagline_prompt).await?;
                info!("  📌 Translated tagline: {}", translated);
                translated
            }
            None => String::new(),
        };

        Ok(self
            .cleaner
            .splice_header_after_h1(&cleaned, en_tagline.trim(), &en_header))
    }

    fn output_dir(&self, project_name: &str) -> PathBuf {
        self.invocation_dir
            .join(&self.output.folder_name)
            .join(project_name)
    }

    async fn call_model(&self, system: &str, prompt: &str) -> Result<String> {
        complete_with_retry(self.llm.as_ref(), system, prompt, &self.logger).await
    }
}
