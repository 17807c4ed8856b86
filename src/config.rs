use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ReadsmithError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Tree scanning configuration
    pub scan: ScanConfig,

    /// Code context extraction settings
    pub context: ContextConfig,

    /// README assembly settings
    pub output: OutputConfig,

    /// AI backend settings
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Patterns excluded from every walk, merged with the project's ignore file
    pub ignore_patterns: Vec<String>,

    /// File extensions considered source code
    pub code_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Maximum number of files included in the code context
    pub max_code_files: usize,

    /// Line cap when scanning a non-main file for imports and declarations
    pub max_parse_lines: usize,

    /// Snippet length for non-main files
    pub snippet_lines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Folder created under the invocation directory for generated documents
    pub folder_name: String,

    /// Whether an English translation is produced after generation
    pub generate_english: bool,

    /// README sections, rendered in order
    pub sections: Vec<SectionSpec>,
}

/// One README section: a stable key selecting the prompt, and the heading text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSpec {
    pub key: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// AI provider ("zhipu" or "ollama")
    pub provider: String,

    pub zhipu: ZhipuConfig,

    pub ollama: OllamaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZhipuConfig {
    /// API key, normally supplied via ZHIPU_API_KEY
    pub api_key: Option<String>,

    /// OpenAI-compatible endpoint base URL
    pub base_url: String,

    /// Model name
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Local Ollama base URL
    pub base_url: String,

    /// Model name
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan: ScanConfig {
                ignore_patterns: vec![
                    "node_modules/*".to_string(),
                    ".git/".to_string(),
                    "dist/".to_string(),
                    "build/".to_string(),
                    ".idea/".to_string(),
                    ".vscode/".to_string(),
                    "__pycache__".to_string(),
                    ".env".to_string(),
                    "*.log".to_string(),
                    "coverage".to_string(),
                    "log/".to_string(),
                ],
                code_extensions: vec![
                    ".js".to_string(),
                    ".ts".to_string(),
                    ".jsx".to_string(),
                    ".tsx".to_string(),
                    ".vue".to_string(),
                    ".py".to_string(),
                    ".go".to_string(),
                    ".rs".to_string(),
                    ".java".to_string(),
                ],
            },
            context: ContextConfig {
                max_code_files: 5,
                max_parse_lines: 50,
                snippet_lines: 20,
            },
            output: OutputConfig {
                folder_name: ".readsmith".to_string(),
                generate_english: true,
                sections: vec![
                    SectionSpec { key: "name".to_string(), title: "项目名称".to_string() },
                    SectionSpec { key: "intro".to_string(), title: "项目简介".to_string() },
                    SectionSpec { key: "install".to_string(), title: "安装方法".to_string() },
                    SectionSpec { key: "usage".to_string(), title: "如何使用".to_string() },
                    SectionSpec { key: "features".to_string(), title: "特性".to_string() },
                    SectionSpec { key: "dependencies".to_string(), title: "技术栈".to_string() },
                    SectionSpec { key: "structure".to_string(), title: "项目结构".to_string() },
                    SectionSpec { key: "notes".to_string(), title: "注意事项".to_string() },
                ],
            },
            ai: AiConfig {
                provider: "zhipu".to_string(),
                zhipu: ZhipuConfig {
                    api_key: None,
                    base_url: "https://open.bigmodel.cn/api/paas/v4/".to_string(),
                    model: "glm-4.6v-flash".to_string(),
                },
                ollama: OllamaConfig {
                    base_url: "http://localhost:11434".to_string(),
                    model: "qwen2:7b".to_string(),
                },
            },
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ReadsmithError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)?
                } else {
                    Self::default()
                }
            }
            None => {
                // Try common config file locations
                let candidates = [
                    "Readsmith.toml",
                    "readsmith.toml",
                    ".readsmith.toml",
                ];

                let mut loaded = None;
                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        loaded = Some(Self::load(candidate)?);
                        break;
                    }
                }
                loaded.unwrap_or_default()
            }
        };

        config.apply_env();
        Ok(config)
    }

    /// Environment variables override the file-provided AI settings
    fn apply_env(&mut self) {
        if let Ok(provider) = std::env::var("AI_PROVIDER") {
            self.ai.provider = provider;
        }
        if let Ok(key) = std::env::var("ZHIPU_API_KEY") {
            self.ai.zhipu.api_key = Some(key);
        }
        if let Ok(base) = std::env::var("ZHIPU_API_BASE") {
            self.ai.zhipu.base_url = base;
        }
        if let Ok(model) = std::env::var("ZHIPU_MODEL") {
            self.ai.zhipu.model = model;
        }
        if let Ok(base) = std::env::var("OLLAMA_BASE_URL") {
            self.ai.ollama.base_url = base;
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            self.ai.ollama.model = model;
        }
    }

    /// Startup validation. Runs before any filesystem work; a failure here is fatal.
    pub fn validate(&self) -> Result<()> {
        match self.ai.provider.as_str() {
            "zhipu" => {
                if self.ai.zhipu.api_key.as_deref().map_or(true, |k| k.is_empty()) {
                    return Err(ReadsmithError::Config(
                        "ZHIPU_API_KEY must be set when using the zhipu provider".to_string(),
                    ));
                }
                Ok(())
            }
            "ollama" => Ok(()),
            other => Err(ReadsmithError::Config(format!(
                "AI_PROVIDER must be \"zhipu\" or \"ollama\", got \"{}\"",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_original_limits() {
        let config = Config::default();
        assert_eq!(config.context.max_code_files, 5);
        assert_eq!(config.context.max_parse_lines, 50);
        assert_eq!(config.context.snippet_lines, 20);
        assert_eq!(config.output.sections.len(), 8);
        assert!(config.scan.ignore_patterns.contains(&"node_modules/*".to_string()));
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = Config::default();
        config.ai.provider = "mystery".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_zhipu_key() {
        let mut config = Config::default();
        config.ai.provider = "zhipu".to_string();
        config.ai.zhipu.api_key = None;
        assert!(config.validate().is_err());

        config.ai.zhipu.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_ollama_without_key() {
        let mut config = Config::default();
        config.ai.provider = "ollama".to_string();
        config.ai.zhipu.api_key = None;
        assert!(config.validate().is_ok());
    }
}
