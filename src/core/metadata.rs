// src/core/metadata.rs
use std::path::{Path, PathBuf};
use std::process::Command;

use regex::Regex;
use tracing::warn;

/// Project name and description, read once at generation time from the first
/// manifest format found.
#[derive(Debug, Clone)]
pub struct ProjectMetadata {
    pub name: String,
    pub description: Option<String>,
}

impl ProjectMetadata {
    /// Read name/description from `package.json`, falling back to a
    /// `pyproject.toml` key match, then to the directory basename.
    pub fn read(root: &Path) -> Self {
        let mut name: Option<String> = None;
        let mut description: Option<String> = None;

        let pkg_path = root.join("package.json");
        if pkg_path.exists() {
            match std::fs::read_to_string(&pkg_path)
                .map_err(|e| e.to_string())
                .and_then(|content| {
                    serde_json::from_str::<serde_json::Value>(&content).map_err(|e| e.to_string())
                }) {
                Ok(pkg) => {
                    name = pkg["name"].as_str().map(str::to_string);
                    description = pkg["description"].as_str().map(str::to_string);
                }
                Err(err) => warn!("Cannot read package.json: {}", err),
            }
        }

        let toml_path = root.join("pyproject.toml");
        if name.is_none() && toml_path.exists() {
            // Simple key = "value" text matching, not a full TOML parse
            match std::fs::read_to_string(&toml_path) {
                Ok(content) => {
                    name = capture_toml_value(&content, "name");
                    if description.is_none() {
                        description = capture_toml_value(&content, "description");
                    }
                }
                Err(err) => warn!("Cannot read pyproject.toml: {}", err),
            }
        }

        let name = name.unwrap_or_else(|| {
            root.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "project".to_string())
        });

        Self { name, description }
    }
}

fn capture_toml_value(content: &str, key: &str) -> Option<String> {
    let pattern = format!(r#"{}\s*=\s*["']([^"']+)["']"#, key);
    Regex::new(&pattern)
        .ok()?
        .captures(content)
        .map(|c| c[1].to_string())
}

/// Path of the manifest-declared main entry, when it exists on disk.
/// Reads the `main` field of `package.json`, defaulting to `index.js`.
pub fn manifest_main_path(root: &Path) -> Option<PathBuf> {
    let pkg_path = root.join("package.json");
    if !pkg_path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(&pkg_path) {
        Ok(content) => content,
        Err(err) => {
            warn!("Cannot read package.json: {}", err);
            return None;
        }
    };
    let pkg: serde_json::Value = match serde_json::from_str(&content) {
        Ok(pkg) => pkg,
        Err(err) => {
            warn!("Cannot parse package.json: {}", err);
            return None;
        }
    };

    let main = pkg["main"].as_str().unwrap_or("index.js");
    let main_path = root.join(main);
    main_path.exists().then_some(main_path)
}

/// Render the project's declared dependencies as a markdown list block.
/// Formats are consulted in a fixed priority order; the first manifest
/// found wins, no merging across formats.
pub fn dependencies_content(root: &Path) -> Option<String> {
    let pkg_path = root.join("package.json");
    if pkg_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&pkg_path) {
            match serde_json::from_str::<serde_json::Value>(&content) {
                Ok(pkg) => {
                    let mut result = String::from("### Node.js dependencies (package.json)\n\n");
                    let mut entries = Vec::new();
                    for field in ["dependencies", "devDependencies"] {
                        if let Some(deps) = pkg[field].as_object() {
                            for (name, version) in deps {
                                entries.push(format!(
                                    "- {}:{}\n",
                                    name,
                                    version.as_str().unwrap_or_default()
                                ));
                            }
                        }
                    }
                    if entries.is_empty() {
                        result.push_str("(no dependencies)\n");
                    } else {
                        for entry in entries {
                            result.push_str(&entry);
                        }
                    }
                    return Some(result);
                }
                Err(err) => warn!("Cannot parse package.json: {}", err),
            }
        }
    }

    let req_path = root.join("requirements.txt");
    if req_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&req_path) {
            let mut result = String::from("### Python dependencies\n\n");
            let lines: Vec<&str> = content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .collect();
            if lines.is_empty() {
                result.push_str("(no dependencies)\n");
            } else {
                for line in lines {
                    result.push_str(&format!("- {}\n", line));
                }
            }
            return Some(result);
        }
    }

    let gomod_path = root.join("go.mod");
    if gomod_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&gomod_path) {
            let mut result = String::from("### Go dependencies\n\n");
            let requires: Vec<&str> = content
                .lines()
                .filter(|l| l.trim().starts_with("require"))
                .collect();
            if requires.is_empty() {
                result.push_str("(no concrete dependencies found)\n");
            } else {
                for line in requires {
                    result.push_str(&format!("- {}\n", line.replace("require", "").trim()));
                }
            }
            return Some(result);
        }
    }

    let pom_path = root.join("pom.xml");
    if pom_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&pom_path) {
            let mut result = String::from("### Java dependencies\n\n");
            let block_regex = Regex::new(r"(?s)<dependency>.*?</dependency>").ok()?;
            let group_regex = Regex::new(r"<groupId>(.+?)</groupId>").ok()?;
            let artifact_regex = Regex::new(r"<artifactId>(.+?)</artifactId>").ok()?;
            let mut found = false;
            for block in block_regex.find_iter(&content) {
                let group = group_regex.captures(block.as_str());
                let artifact = artifact_regex.captures(block.as_str());
                if let (Some(group), Some(artifact)) = (group, artifact) {
                    result.push_str(&format!("- {}:{}\n", &group[1], &artifact[1]));
                    found = true;
                }
            }
            if !found {
                result.push_str("(no dependencies found)\n");
            }
            return Some(result);
        }
    }

    None
}

/// A detected GitHub remote.
#[derive(Debug, Clone)]
pub struct GitRemoteInfo {
    pub owner: String,
    pub repo: String,
    pub url: String,
}

/// Detect a GitHub remote by invoking `git remote -v` in the project root.
/// Any failure is silent; badge generation is a best-effort nicety.
pub fn git_remote_info(root: &Path) -> Option<GitRemoteInfo> {
    let output = Command::new("git")
        .args(["remote", "-v"])
        .current_dir(root)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let remotes = String::from_utf8_lossy(&output.stdout);
    let regex =
        Regex::new(r"(\S+)\s+(?:https?://github\.com/|git@github\.com:)([^/\s]+)/(\S+?)(?:\.git)?\s")
            .ok()?;
    let captures = regex.captures(&remotes)?;
    let owner = captures[2].to_string();
    let repo = captures[3].to_string();
    let url = format!("https://github.com/{}/{}", owner, repo);
    Some(GitRemoteInfo { owner, repo, url })
}

/// Shields.io badge block for a detected GitHub repository.
pub fn github_badges(git_info: Option<&GitRemoteInfo>) -> String {
    let Some(info) = git_info else {
        return String::new();
    };
    let color = "56BEB8";
    format!(
        r#"
<p align="center">
  <img alt="Github top language" src="https://img.shields.io/github/languages/top/{owner}/{repo}?color={color}">
  <img alt="Github language count" src="https://img.shields.io/github/languages/count/{owner}/{repo}?color={color}">
  <img alt="Repository size" src="https://img.shields.io/github/repo-size/{owner}/{repo}?color={color}">
  <img alt="License" src="https://img.shields.io/github/license/{owner}/{repo}?color={color}">
  <img alt="Github issues" src="https://img.shields.io/github/issues/{owner}/{repo}?color={color}" />
  <img alt="Github forks" src="https://img.shields.io/github/forks/{owner}/{repo}?color={color}" />
  <img alt="Github stars" src="https://img.shields.io/github/stars/{owner}/{repo}?color={color}" />
</p>"#,
        owner = info.owner,
        repo = info.repo,
        color = color
    )
}

/// Language-switch links placed under the title of the primary README.
pub fn language_links(en_filename: &str) -> String {
    format!(
        "\n<p align=\"center\">\n  <span>中文</span> &#xa0; | &#xa0; \n  <a href=\"{}\">English</a>\n</p>",
        en_filename
    )
}

/// Language-switch links for the translated README.
pub fn language_links_en(zh_filename: &str) -> String {
    format!(
        "\n<p align=\"center\">\n  <a href=\"{}\">中文</a> &#xa0; | &#xa0; \n  <span>English</span>\n</p>",
        zh_filename
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    #[test]
    fn test_metadata_prefers_package_json() {
        let dir = TempDir::new().unwrap();
        dir.child("package.json")
            .write_str(r#"{"name": "neat-tool", "description": "A neat tool"}"#)
            .unwrap();
        dir.child("pyproject.toml")
            .write_str("[project]\nname = \"other-name\"\n")
            .unwrap();

        let meta = ProjectMetadata::read(dir.path());
        assert_eq!(meta.name, "neat-tool");
        assert_eq!(meta.description.as_deref(), Some("A neat tool"));
    }

    #[test]
    fn test_metadata_pyproject_fallback() {
        let dir = TempDir::new().unwrap();
        dir.child("pyproject.toml")
            .write_str("[project]\nname = \"py-proj\"\ndescription = \"A python project\"\n")
            .unwrap();

        let meta = ProjectMetadata::read(dir.path());
        assert_eq!(meta.name, "py-proj");
        assert_eq!(meta.description.as_deref(), Some("A python project"));
    }

    #[test]
    fn test_metadata_basename_fallback() {
        let dir = TempDir::new().unwrap();
        let meta = ProjectMetadata::read(dir.path());
        let basename = dir.path().file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(meta.name, basename);
        assert!(meta.description.is_none());
    }

    #[test]
    fn test_manifest_main_path_defaults_to_index_js() {
        let dir = TempDir::new().unwrap();
        dir.child("package.json").write_str(r#"{"name": "x"}"#).unwrap();
        dir.child("index.js").write_str("module.exports = {};\n").unwrap();

        let main = manifest_main_path(dir.path()).unwrap();
        assert_eq!(main, dir.path().join("index.js"));
    }

    #[test]
    fn test_manifest_main_path_requires_existing_file() {
        let dir = TempDir::new().unwrap();
        dir.child("package.json")
            .write_str(r#"{"main": "lib/app.js"}"#)
            .unwrap();

        assert!(manifest_main_path(dir.path()).is_none());
    }

    #[test]
    fn test_dependencies_first_format_wins() {
        let dir = TempDir::new().unwrap();
        dir.child("package.json")
            .write_str(r#"{"dependencies": {"express": "^4.18.0"}, "devDependencies": {"jest": "^29.0.0"}}"#)
            .unwrap();
        dir.child("requirements.txt").write_str("flask==2.0\n").unwrap();

        let deps = dependencies_content(dir.path()).unwrap();
        assert!(deps.contains("- express:^4.18.0"));
        assert!(deps.contains("- jest:^29.0.0"));
        assert!(!deps.contains("flask"));
    }

    #[test]
    fn test_dependencies_requirements_txt() {
        let dir = TempDir::new().unwrap();
        dir.child("requirements.txt")
            .write_str("# pinned\nflask==2.0\n\nrequests>=2.28\n")
            .unwrap();

        let deps = dependencies_content(dir.path()).unwrap();
        assert!(deps.contains("- flask==2.0"));
        assert!(deps.contains("- requests>=2.28"));
        assert!(!deps.contains("# pinned"));
    }

    #[test]
    fn test_dependencies_pom_xml() {
        let dir = TempDir::new().unwrap();
        dir.child("pom.xml")
            .write_str(
                "<project><dependencies><dependency>\n<groupId>org.apache</groupId>\n<artifactId>commons</artifactId>\n</dependency></dependencies></project>",
            )
            .unwrap();

        let deps = dependencies_content(dir.path()).unwrap();
        assert!(deps.contains("- org.apache:commons"));
    }

    #[test]
    fn test_dependencies_absent_manifests() {
        let dir = TempDir::new().unwrap();
        assert!(dependencies_content(dir.path()).is_none());
    }

    #[test]
    fn test_badges_empty_without_remote() {
        assert_eq!(github_badges(None), "");
    }

    #[test]
    fn test_badges_reference_owner_and_repo() {
        let info = GitRemoteInfo {
            owner: "acme".to_string(),
            repo: "widget".to_string(),
            url: "https://github.com/acme/widget".to_string(),
        };
        let badges = github_badges(Some(&info));
        assert!(badges.contains("img.shields.io/github/languages/top/acme/widget"));
        assert!(badges.contains("img.shields.io/github/stars/acme/widget"));
    }
}
