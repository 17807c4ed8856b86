// src/core/markdown.rs
use regex::Regex;
use tracing::debug;

use crate::error::Result;

/// Post-processing for model-produced markdown: fence repair, badge and
/// language-link handling, tagline splicing.
pub struct MarkdownCleaner {
    fence_line_regex: Regex,
    badge_regex: Regex,
    zh_en_links_regex: Regex,
    en_zh_links_regex: Regex,
    h1_regex: Regex,
    tagline_regex: Regex,
    blank_run_regex: Regex,
    ellipsis_regex: Regex,
    bracket_regex: Regex,
}

impl MarkdownCleaner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fence_line_regex: Regex::new(r"(?m)^```[a-z]*$")?,
            badge_regex: Regex::new(
                r#"<p align="center">\s*[\s\S]*?src="https://img\.shields\.io[\s\S]*?</p>"#,
            )?,
            zh_en_links_regex: Regex::new(
                r#"(?i)<p align="center">\s*[\s\S]*?中文[\s\S]*?English[\s\S]*?</p>\s*"#,
            )?,
            en_zh_links_regex: Regex::new(
                r#"(?i)<p align="center">\s*[\s\S]*?English[\s\S]*?中文[\s\S]*?</p>\s*"#,
            )?,
            h1_regex: Regex::new(r#"<h1 align="center">.+?</h1>"#)?,
            tagline_regex: Regex::new(r#"\A\s*<p align="center">(.+?)</p>"#)?,
            blank_run_regex: Regex::new(r"\n{3,}")?,
            ellipsis_regex: Regex::new(r"\.\.\.+")?,
            bracket_regex: Regex::new(r"\[.*?\]")?,
        })
    }

    /// Clean a generated section: remove a wrapping fence, then balance any
    /// fence the model left open.
    pub fn clean_ai_content(&self, content: &str) -> String {
        if content.is_empty() {
            return String::new();
        }
        let mut cleaned = strip_wrapping_fences(content);

        let fence_count = self.fence_line_regex.find_iter(&cleaned).count();
        if fence_count % 2 != 0 {
            debug!("Unclosed code fence detected, appending closing fence");
            cleaned.push_str("\n```");
        }

        cleaned.trim().to_string()
    }

    /// Remove shields.io badge paragraphs and language-switch link
    /// paragraphs before feeding a README to translation.
    pub fn remove_badges_and_language_links(&self, content: &str) -> String {
        let cleaned = self.badge_regex.replace_all(content, "");
        let cleaned = self.zh_en_links_regex.replace_all(&cleaned, "");
        let cleaned = self.en_zh_links_regex.replace_all(&cleaned, "");
        self.collapse_blank_runs(&cleaned).trim().to_string()
    }

    /// Strip translation artifacts: ellipsis runs and leftover bracket
    /// placeholders, then collapse blank runs.
    pub fn clean_translated_content(&self, content: &str) -> String {
        let cleaned = strip_wrapping_fences(content);
        let cleaned = self.ellipsis_regex.replace_all(&cleaned, "");
        let cleaned = self.bracket_regex.replace_all(&cleaned, "");
        self.collapse_blank_runs(&cleaned).trim().to_string()
    }

    /// Byte span of the centered `<h1>` title tag, if present.
    pub fn h1_span(&self, content: &str) -> Option<(usize, usize)> {
        self.h1_regex.find(content).map(|m| (m.start(), m.end()))
    }

    /// The tagline paragraph immediately following the `<h1>` title.
    pub fn tagline_after_h1(&self, content: &str) -> Option<String> {
        let (_, h1_end) = self.h1_span(content)?;
        self.tagline_regex
            .captures(&content[h1_end..])
            .map(|c| c[1].to_string())
    }

    /// Remove the tagline paragraph following the `<h1>` title, if any.
    pub fn remove_tagline_after_h1(&self, content: &str) -> String {
        match self.tagline_span_after_h1(content) {
            Some((start, end)) => format!("{}{}", &content[..start], &content[end..]),
            None => content.to_string(),
        }
    }

    /// Insert a tagline plus header block right after the `<h1>`, replacing
    /// an existing tagline paragraph when one is present. Content without an
    /// `<h1>` title is returned unchanged.
    pub fn splice_header_after_h1(&self, content: &str, tagline: &str, header: &str) -> String {
        let Some((_, h1_end)) = self.h1_span(content) else {
            return content.to_string();
        };
        let insert = format!("\n\n<p align=\"center\">{}</p>\n\n{}", tagline, header);
        match self.tagline_span_after_h1(content) {
            Some((start, end)) => {
                format!("{}{}{}", &content[..start], insert, &content[end..])
            }
            None => format!("{}{}{}", &content[..h1_end], insert, &content[h1_end..]),
        }
    }

    fn tagline_span_after_h1(&self, content: &str) -> Option<(usize, usize)> {
        let (_, h1_end) = self.h1_span(content)?;
        self.tagline_regex
            .find(&content[h1_end..])
            .map(|m| (h1_end + m.start(), h1_end + m.end()))
    }

    fn collapse_blank_runs(&self, content: &str) -> String {
        self.blank_run_regex.replace_all(content, "\n\n").to_string()
    }
}

/// Drop tree lines that leak VCS or dependency directories into the
/// structure section.
pub fn clean_structure(structure: &str) -> String {
    structure
        .lines()
        .filter(|line| !line.contains(".git/") && !line.contains("node_modules"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip a wrapping markdown code fence the model may have added around the
/// whole response.
pub fn strip_wrapping_fences(content: &str) -> String {
    let mut cleaned = content.trim().to_string();
    if cleaned.starts_with("```") {
        if let Some(first_newline) = cleaned.find('\n') {
            cleaned = cleaned[first_newline + 1..].to_string();
        }
    }
    if cleaned.ends_with("```") {
        cleaned.truncate(cleaned.len() - 3);
    }
    cleaned
}

/// Line-scanning fence balance check; appends a single closing fence when
/// the document ends inside a code block.
pub fn ensure_code_blocks_closed(text: &str) -> String {
    let mut in_code_block = false;
    for line in text.lines() {
        if line.trim().starts_with("```") {
            in_code_block = !in_code_block;
        }
    }
    if in_code_block {
        debug!("Unclosed code fence detected, appending closing fence");
        return format!("{}\n```", text.trim_end());
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaner() -> MarkdownCleaner {
        MarkdownCleaner::new().unwrap()
    }

    #[test]
    fn test_clean_structure_drops_vcs_lines() {
        let structure = "proj/\n├── .git/\n├── node_modules/\n└── src/\n";
        let cleaned = clean_structure(structure);
        assert!(cleaned.contains("src/"));
        assert!(!cleaned.contains(".git/"));
        assert!(!cleaned.contains("node_modules"));
    }

    #[test]
    fn test_clean_ai_content_strips_wrapping_fence() {
        let content = "```markdown\n## Usage\n\nRun it.\n```";
        assert_eq!(cleaner().clean_ai_content(content), "## Usage\n\nRun it.");
    }

    #[test]
    fn test_clean_ai_content_balances_odd_fences() {
        let content = "Some text\n```bash\nnpm install";
        let cleaned = cleaner().clean_ai_content(content);
        assert!(cleaned.ends_with("```"));
        assert_eq!(cleaned.matches("```").count(), 2);
    }

    #[test]
    fn test_ensure_code_blocks_closed_appends_exactly_one_fence() {
        let open = "intro\n```js\nconsole.log(1);\n";
        let repaired = ensure_code_blocks_closed(open);
        assert!(repaired.ends_with("\n```"));

        let balanced = "intro\n```js\nconsole.log(1);\n```\n";
        assert_eq!(ensure_code_blocks_closed(balanced), balanced);
    }

    #[test]
    fn test_remove_badges_and_language_links() {
        let content = concat!(
            "<h1 align=\"center\">proj</h1>\n\n",
            "<p align=\"center\">\n  <img alt=\"x\" src=\"https://img.shields.io/github/stars/a/b\">\n</p>\n\n",
            "<p align=\"center\">\n  <span>中文</span> | <a href=\"README_EN.md\">English</a>\n</p>\n\n",
            "## 项目简介\n\nBody text\n",
        );
        let cleaned = cleaner().remove_badges_and_language_links(content);
        assert!(!cleaned.contains("img.shields.io"));
        assert!(!cleaned.contains("README_EN.md"));
        assert!(cleaned.contains("Body text"));
    }

    #[test]
    fn test_tagline_extraction_and_removal() {
        let cleaner = cleaner();
        let content =
            "<h1 align=\"center\">proj</h1>\n\n<p align=\"center\">🚀 A tool</p>\n\n## Next\n";
        assert_eq!(cleaner.tagline_after_h1(content).as_deref(), Some("🚀 A tool"));

        let removed = cleaner.remove_tagline_after_h1(content);
        assert!(!removed.contains("🚀 A tool"));
        assert!(removed.contains("## Next"));
    }

    #[test]
    fn test_splice_header_replaces_existing_tagline() {
        let content = "<h1 align=\"center\">proj</h1>\n\n<p align=\"center\">old</p>\n\n## Body\n";
        let spliced = cleaner().splice_header_after_h1(content, "new tagline", "<p>HEADER</p>");
        assert!(spliced.contains("new tagline"));
        assert!(spliced.contains("<p>HEADER</p>"));
        assert!(!spliced.contains(">old<"));
        assert!(spliced.contains("## Body"));
    }

    #[test]
    fn test_splice_header_inserts_when_no_tagline() {
        let content = "<h1 align=\"center\">proj</h1>\n\n## Body\n";
        let spliced = cleaner().splice_header_after_h1(content, "fresh", "<p>HEADER</p>");
        let h1_pos = spliced.find("</h1>").unwrap();
        let tagline_pos = spliced.find("fresh").unwrap();
        let body_pos = spliced.find("## Body").unwrap();
        assert!(h1_pos < tagline_pos && tagline_pos < body_pos);
    }

    #[test]
    fn test_clean_translated_content_strips_artifacts() {
        let content = "```markdown\nIntro text...\n\n\n\nSee [placeholder] for details.\n```";
        let cleaned = cleaner().clean_translated_content(content);
        assert!(!cleaned.contains("..."));
        assert!(!cleaned.contains("[placeholder]"));
        assert!(!cleaned.contains("```"));
        assert!(!cleaned.contains("\n\n\n"));
    }
}
