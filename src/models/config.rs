use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::error::{InvokerError, Result};
use crate::models::site::SiteConfig;

/// 调用器配置文件名
pub const CONFIG_FILE: &str = "blogctl.yml";

pub const DEFAULT_GENERATOR: &str = "hugo";
pub const DEFAULT_GIT: &str = "git";
pub const DEFAULT_DESTINATION: &str = "public";
pub const DEFAULT_CONTENT_DIR: &str = "content";
pub const DEFAULT_POSTS_SECTION: &str = "posts";
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// `blogctl.yml` 的内容，所有字段均可省略
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub generator: Option<String>,
    /// 放在每个生成器子命令之前的参数，例如 `npx hugo-bin` 中的 `hugo-bin`
    pub generator_args: Vec<String>,
    pub git: Option<String>,
    pub destination: Option<PathBuf>,
    pub content_dir: Option<PathBuf>,
    pub posts_section: Option<String>,
    pub minify: Option<bool>,
    pub base_url: Option<String>,
    pub environment: Option<String>,
    pub extra_args: Vec<String>,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| InvokerError::filesystem(path, e))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| InvokerError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// 一次调用所使用的已解析设置
///
/// 优先级：命令行 > `blogctl.yml` > 生成器站点配置 > 内置默认值。
/// 命令行覆盖在 [`crate::models::BuildOptions`] 中处理，这里不包含。
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// 站点根目录
    pub site_dir: PathBuf,
    pub generator: String,
    pub generator_args: Vec<String>,
    pub git: String,
    /// 输出目录（相对路径相对于站点根目录）
    pub destination: PathBuf,
    pub content_dir: PathBuf,
    pub posts_section: String,
    pub minify: bool,
    pub base_url: Option<String>,
    pub environment: String,
    pub extra_args: Vec<String>,
    /// 生成器站点配置（如果存在）
    pub site: SiteConfig,
}

impl Settings {
    /// 从站点目录解析设置
    ///
    /// `config_path` 为 None 时使用站点根目录下的 `blogctl.yml`，文件不存在则使用默认值；
    /// 显式指定的配置文件必须存在。
    pub fn load(site_dir: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                info!("使用配置文件: {}", path.display());
                Config::from_file(path)?
            }
            None => {
                let path = site_dir.join(CONFIG_FILE);
                if path.exists() {
                    info!("使用配置文件: {}", path.display());
                    Config::from_file(&path)?
                } else {
                    debug!("未找到 {}，使用默认配置", CONFIG_FILE);
                    Config::default()
                }
            }
        };

        let site = match SiteConfig::discover(site_dir)? {
            Some((_, site)) => site,
            None => SiteConfig::default(),
        };

        Ok(Self::resolve(site_dir, config, site))
    }

    /// 按优先级合并配置
    pub fn resolve(site_dir: &Path, config: Config, site: SiteConfig) -> Self {
        let destination = config
            .destination
            .or_else(|| site.publish_dir.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DESTINATION));
        let content_dir = config
            .content_dir
            .or_else(|| site.content_dir.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR));

        Self {
            site_dir: site_dir.to_path_buf(),
            generator: non_empty(config.generator).unwrap_or_else(|| DEFAULT_GENERATOR.to_string()),
            generator_args: config.generator_args,
            git: non_empty(config.git).unwrap_or_else(|| DEFAULT_GIT.to_string()),
            destination,
            content_dir,
            posts_section: non_empty(config.posts_section)
                .map(|s| s.trim_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_POSTS_SECTION.to_string()),
            minify: config.minify.unwrap_or(true),
            base_url: non_empty(config.base_url),
            environment: non_empty(config.environment)
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            extra_args: config.extra_args,
            site,
        }
    }

    /// 以默认值构建设置，主要用于测试
    pub fn with_defaults(site_dir: &Path) -> Self {
        Self::resolve(site_dir, Config::default(), SiteConfig::default())
    }

    /// 解析相对于站点根目录的路径
    pub fn site_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.site_dir.join(path)
        }
    }

    /// 文章集合所在目录
    pub fn posts_dir(&self) -> PathBuf {
        self.site_path(&self.content_dir).join(&self.posts_section)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
