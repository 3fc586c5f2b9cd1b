use std::fs;
use std::path::{Path, PathBuf};

use gray_matter::engine::{TOML, YAML};
use gray_matter::{Matter, ParsedEntity};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::core::error::{InvokerError, Result};
use crate::models::types::{parse_date, FrontMatter, Post};

/// 文章集合（只读）
///
/// 渲染由外部生成器负责，这里只为 `list` 读取前置元数据。
pub struct ContentStore {
    posts_dir: PathBuf,
}

impl ContentStore {
    pub fn new(posts_dir: PathBuf) -> Self {
        Self { posts_dir }
    }

    /// 加载所有文章，按日期倒序排列（无日期的排在最后）
    ///
    /// 前置元数据无法解析的文件会被跳过并记录警告。
    pub fn load(&self, include_drafts: bool) -> Result<Vec<Post>> {
        info!("从 {} 加载文章", self.posts_dir.display());

        let mut posts = Vec::new();
        if !self.posts_dir.exists() {
            warn!("文章目录不存在: {}", self.posts_dir.display());
            return Ok(posts);
        }

        for entry in WalkDir::new(&self.posts_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(self.posts_dir.as_path()).to_path_buf();
                InvokerError::filesystem(path, e.into())
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown_file(path) {
                continue;
            }

            match read_post(path) {
                Ok(post) => {
                    if post.draft && !include_drafts {
                        debug!("跳过草稿: {}", path.display());
                        continue;
                    }
                    posts.push(post);
                }
                Err(e) => warn!("无法解析文章 {}: {}", path.display(), e),
            }
        }

        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.path.cmp(&b.path)));
        info!("加载了 {} 篇文章", posts.len());
        Ok(posts)
    }
}

/// 读取并解析单篇文章
pub fn read_post(path: &Path) -> Result<Post> {
    let raw = fs::read_to_string(path).map_err(|e| InvokerError::filesystem(path, e))?;
    parse_post(path, &raw)
}

/// 解析文章的前置元数据与正文
pub fn parse_post(path: &Path, raw: &str) -> Result<Post> {
    let parsed = split_front_matter(raw);
    let front_matter: FrontMatter = match parsed.data {
        Some(data) => data.deserialize::<FrontMatter>().map_err(|e| InvokerError::InvalidArgument {
            message: format!("{}: 前置元数据无效: {}", path.display(), e),
        })?,
        None => FrontMatter::default(),
    };

    let title = front_matter
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Untitled")
                .to_string()
        });

    let date = match front_matter.date.as_deref() {
        Some(value) => {
            let date = parse_date(value);
            if date.is_none() {
                warn!("{}: 无法解析日期 {:?}", path.display(), value);
            }
            date
        }
        None => None,
    };

    Ok(Post {
        path: path.to_path_buf(),
        title,
        date,
        author: front_matter.author.map(|a| a.joined()),
        tags: front_matter.tags.map(|t| t.into_set()).unwrap_or_default(),
        draft: front_matter.draft.unwrap_or(false),
        body: parsed.content,
    })
}

/// YAML 使用 `---`，TOML 使用 `+++`
fn split_front_matter(raw: &str) -> ParsedEntity {
    if raw.trim_start().starts_with("+++") {
        let mut matter = Matter::<TOML>::new();
        matter.delimiter = "+++".to_string();
        matter.parse(raw)
    } else {
        Matter::<YAML>::new().parse(raw)
    }
}

/// 检查文件是否为 Markdown 文件
pub fn is_markdown_file<P: AsRef<Path>>(path: P) -> bool {
    match path.as_ref().extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"),
        None => false,
    }
}
