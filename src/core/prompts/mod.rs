//! Prompt library for README synthesis
//!
//! All prompt text lives in embedded tera templates, rendered behind one
//! `render_section` seam so the generation pipeline never builds prompt
//! strings itself.

use tera::{Context, Tera};

use crate::error::Result;
use super::metadata::ProjectMetadata;

/// System prompt for Chinese README section generation.
pub const SECTION_SYSTEM_PROMPT: &str = "你是一位资深的开源项目文档工程师，擅长根据项目结构与代码上下文撰写高质量的中文 README。内容准确、简洁、符合开源项目风格。输出必须是纯 Markdown 文本，不要添加任何解释、前缀或代码块标记（如 ```markdown 或 ```）。";

/// System prompt for whole-README translation.
pub const TRANSLATE_README_SYSTEM: &str = "You are a professional technical translator specializing in open-source documentation. Translate the given Chinese README into fluent, accurate English while preserving all formatting, technical meaning, and HTML tags. Do not add any explanations or placeholders. Do not include any code block markers (like ```markdown or ```) in your output.";

/// System prompt for tagline translation.
pub const TRANSLATE_TAGLINE_SYSTEM: &str = "You are a professional technical writer. Translate the given Chinese tagline into concise, professional English that fits open-source project style. Keep the emoji. Do not add any explanations or prefixes. Output only the translated tagline.";

pub struct PromptLibrary {
    tera: Tera,
}

impl PromptLibrary {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        // Rendered prompts are plain text; HTML escaping would corrupt markdown
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(vec![
            ("section_name", include_str!("templates/section_name.tera")),
            ("section_intro", include_str!("templates/section_intro.tera")),
            ("section_install", include_str!("templates/section_install.tera")),
            ("section_usage", include_str!("templates/section_usage.tera")),
            ("section_features", include_str!("templates/section_features.tera")),
            ("section_dependencies", include_str!("templates/section_dependencies.tera")),
            ("section_notes", include_str!("templates/section_notes.tera")),
            ("refine", include_str!("templates/refine.tera")),
            ("translate_readme", include_str!("templates/translate_readme.tera")),
            ("translate_tagline", include_str!("templates/translate_tagline.tera")),
        ])?;
        Ok(Self { tera })
    }

    /// Render the prompt for one README section key.
    pub fn render_section(
        &self,
        key: &str,
        structure: &str,
        code_context: &str,
        raw_deps: Option<&str>,
        meta: Option<&ProjectMetadata>,
    ) -> Result<String> {
        let mut context = Context::new();
        context.insert("structure", structure);
        context.insert("code_context", code_context);
        context.insert("raw_deps", raw_deps.unwrap_or(""));
        context.insert(
            "project_name",
            meta.map(|m| m.name.as_str()).unwrap_or(""),
        );
        context.insert(
            "description",
            meta.and_then(|m| m.description.as_deref()).unwrap_or(""),
        );
        Ok(self.tera.render(&format!("section_{}", key), &context)?)
    }

    /// Prompt for the post-assembly dedup/polish pass.
    pub fn refine_prompt(&self, readme: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("readme", readme);
        Ok(self.tera.render("refine", &context)?)
    }

    /// Prompt for translating the full Chinese README.
    pub fn translate_readme_prompt(&self, zh_content: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("zh_content", zh_content);
        Ok(self.tera.render("translate_readme", &context)?)
    }

    /// Prompt for translating the tagline alone.
    pub fn translate_tagline_prompt(&self, tagline: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("tagline", tagline);
        Ok(self.tera.render("translate_tagline", &context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> PromptLibrary {
        PromptLibrary::new().unwrap()
    }

    #[test]
    fn test_every_section_template_renders() {
        let library = library();
        let meta = ProjectMetadata {
            name: "demo".to_string(),
            description: Some("a demo".to_string()),
        };
        for key in ["name", "intro", "install", "usage", "features", "dependencies", "notes"] {
            let prompt = library
                .render_section(key, "tree/", "context text", Some("deps"), Some(&meta))
                .unwrap();
            assert!(prompt.contains("tree/"), "section {} missing structure", key);
            assert!(prompt.contains("context text"), "section {} missing context", key);
        }
    }

    #[test]
    fn test_unknown_section_key_is_an_error() {
        assert!(library()
            .render_section("nonexistent", "s", "c", None, None)
            .is_err());
    }

    #[test]
    fn test_dependencies_prompt_embeds_raw_deps() {
        let prompt = library()
            .render_section("dependencies", "tree/", "ctx", Some("- express:^4.18.0"), None)
            .unwrap();
        assert!(prompt.contains("- express:^4.18.0"));
    }

    #[test]
    fn test_translate_prompt_wraps_content() {
        let prompt = library().translate_readme_prompt("# 标题\n正文").unwrap();
        assert!(prompt.contains("# 标题"));
        assert!(prompt.contains("```markdown"));
    }

    #[test]
    fn test_name_prompt_uses_project_metadata() {
        let meta = ProjectMetadata {
            name: "rocket-kit".to_string(),
            description: None,
        };
        let prompt = library()
            .render_section("name", "tree/", "ctx", None, Some(&meta))
            .unwrap();
        assert!(prompt.contains("rocket-kit"));
    }
}
