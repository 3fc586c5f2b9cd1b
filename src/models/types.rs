use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// 博客文章的基本结构
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    /// 源文件路径（文章的唯一标识）
    pub path: PathBuf,
    /// 文章标题
    pub title: String,
    /// 发布时间
    pub date: Option<DateTime<Utc>>,
    /// 作者
    pub author: Option<String>,
    /// 文章标签
    pub tags: BTreeSet<String>,
    /// 是否为草稿
    pub draft: bool,
    /// 文章内容（原始Markdown）
    #[serde(skip_serializing)]
    pub body: String,
}

/// 文章前置元数据
///
/// Hugo 的前置元数据键名大小写不敏感，这里接受常见写法。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(alias = "Title")]
    pub title: Option<String>,
    #[serde(alias = "Date")]
    pub date: Option<String>,
    #[serde(alias = "Author")]
    pub author: Option<Authors>,
    #[serde(alias = "Tags")]
    pub tags: Option<Tags>,
    #[serde(alias = "Draft")]
    pub draft: Option<bool>,
}

/// 作者可以写成字符串或列表
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Authors {
    One(String),
    Many(Vec<String>),
}

impl Authors {
    pub fn joined(&self) -> String {
        match self {
            Authors::One(name) => name.clone(),
            Authors::Many(names) => names.join(", "),
        }
    }
}

/// 标签可以写成单个字符串或列表
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Tags {
    One(String),
    Many(Vec<String>),
}

impl Tags {
    pub fn into_set(self) -> BTreeSet<String> {
        let tags = match self {
            Tags::One(tag) => vec![tag],
            Tags::Many(tags) => tags,
        };
        tags.into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// 解析前置元数据中的日期
///
/// 接受 RFC 3339、`YYYY-MM-DD HH:MM:SS`（按 UTC 处理）和 `YYYY-MM-DD`。
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

/// 生成器运行模式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// 普通构建，清除生产环境信号
    Build,
    /// 部署构建，设置生产环境信号
    Deploy { environment: String },
}

/// 单次构建的参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// 输出目录
    pub destination: PathBuf,
    /// 覆盖站点的 baseURL
    pub base_url: Option<String>,
    /// 是否压缩输出
    pub minify: bool,
    pub mode: Mode,
}

/// 开发服务器参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServeOptions {
    /// 是否包含草稿
    pub drafts: bool,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self { drafts: true }
    }
}
