use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::error::{InvokerError, Result};

/// 生成器站点配置的候选文件，按优先级排列
pub const SITE_CONFIG_FILES: &[&str] = &[
    "hugo.toml",
    "hugo.yaml",
    "hugo.yml",
    "config.toml",
    "config.yaml",
    "config.yml",
];

/// 生成器自身的站点配置（只读）
///
/// 只关心调用器需要的几个字段，其余内容交给生成器解释。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "publishDir", alias = "publishdir")]
    pub publish_dir: Option<String>,
    #[serde(default, rename = "contentDir", alias = "contentdir")]
    pub content_dir: Option<String>,
    #[serde(default)]
    pub theme: Option<Theme>,
}

/// 主题可以是单个名称，也可以是按顺序叠加的多个主题
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Theme {
    One(String),
    Many(Vec<String>),
}

impl Theme {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Theme::One(name) => vec![name.as_str()],
            Theme::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl SiteConfig {
    /// 在站点根目录查找并加载生成器配置，找不到时返回 None
    pub fn discover(site_dir: &Path) -> Result<Option<(PathBuf, Self)>> {
        for name in SITE_CONFIG_FILES {
            let path = site_dir.join(name);
            if path.is_file() {
                debug!("发现生成器配置: {}", path.display());
                let config = Self::from_file(&path)?;
                return Ok(Some((path, config)));
            }
        }
        Ok(None)
    }

    /// 从文件加载配置，按扩展名选择 TOML 或 YAML
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| InvokerError::filesystem(path, e))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let is_toml = path.extension().and_then(|e| e.to_str()) == Some("toml");
        let parsed = if is_toml {
            toml::from_str::<SiteConfig>(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<Option<SiteConfig>>(&content)
                .map(Option::unwrap_or_default)
                .map_err(|e| e.to_string())
        };
        parsed.map_err(|message| InvokerError::Config {
            path: path.to_path_buf(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_toml_site_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("hugo.toml"),
            r#"
baseURL = "https://blog.example.com/"
languageCode = "en-us"
title = "Notes"
theme = "PaperMod"
publishDir = "docs"

[params]
env = "production"
"#,
        )
        .unwrap();

        let (path, config) = SiteConfig::discover(dir.path()).unwrap().unwrap();
        assert!(path.ends_with("hugo.toml"));
        assert_eq!(config.title.as_deref(), Some("Notes"));
        assert_eq!(config.publish_dir.as_deref(), Some("docs"));
        assert_eq!(config.theme, Some(Theme::One("PaperMod".to_string())));
        assert_eq!(config.content_dir, None);
    }

    #[test]
    fn reads_yaml_site_config_and_prefers_hugo_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.yaml"), "title: Old\n").unwrap();
        fs::write(
            dir.path().join("hugo.yaml"),
            "title: New\ncontentDir: src/content\n",
        )
        .unwrap();

        let (path, config) = SiteConfig::discover(dir.path()).unwrap().unwrap();
        assert!(path.ends_with("hugo.yaml"));
        assert_eq!(config.title.as_deref(), Some("New"));
        assert_eq!(config.content_dir.as_deref(), Some("src/content"));
    }

    #[test]
    fn theme_may_be_a_list() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hugo.toml"), "theme = [\"base\", \"overlay\"]\n").unwrap();
        let (_, config) = SiteConfig::discover(dir.path()).unwrap().unwrap();
        assert_eq!(config.theme.unwrap().names(), vec!["base", "overlay"]);
    }

    #[test]
    fn empty_yaml_is_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.yml"), "").unwrap();
        let (_, config) = SiteConfig::discover(dir.path()).unwrap().unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn missing_site_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SiteConfig::discover(dir.path()).unwrap().is_none());
    }

    #[test]
    fn broken_site_config_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hugo.toml"), "title = \n").unwrap();
        assert!(matches!(
            SiteConfig::discover(dir.path()),
            Err(InvokerError::Config { .. })
        ));
    }
}
