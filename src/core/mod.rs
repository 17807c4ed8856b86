mod engine;
mod ignore_rules;
mod walker;
mod context;
mod metadata;
mod markdown;
mod writer;
mod logger;
mod llm;
mod prompts;

pub use ignore_rules::{cli_pattern_ignored, IgnoreRule, RuleSet};
pub use walker::{relative_normalized, TreeWalker};
pub use context::{CodeFileDigest, ContextBuilder, ContextBundle};
pub use metadata::{dependencies_content, manifest_main_path, GitRemoteInfo, ProjectMetadata};
pub use markdown::MarkdownCleaner;
pub use writer::ReadmeWriter;
pub use logger::FileLogger;
pub use llm::{complete_with_retry, create_client, LlmClient};
pub use prompts::PromptLibrary;

// Export the main engine
pub use engine::Engine;
