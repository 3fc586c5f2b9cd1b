use std::path::{Component, Path, PathBuf};

/// 由标题生成文章文件名：转为小写，空格替换为连字符
///
/// 与 `tr '[:upper:]' '[:lower:]' | tr ' ' '-'` 的效果一致，其他字符原样保留。
pub fn post_filename(title: &str) -> String {
    let stem: String = title
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .collect();
    format!("{}.md", stem)
}

/// 确保路径以斜杠结尾
pub fn ensure_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// 词法上规范化路径（不访问文件系统）
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_filename_lowercases_and_hyphenates() {
        assert_eq!(post_filename("My Post"), "my-post.md");
        assert_eq!(post_filename("  Go Testing Primitives  "), "go-testing-primitives.md");
        assert_eq!(post_filename("SaaS  Stack"), "saas--stack.md");
        assert_eq!(post_filename("Colly: Scraping"), "colly:-scraping.md");
    }

    #[test]
    fn trailing_slash() {
        assert_eq!(ensure_trailing_slash("https://a.b"), "https://a.b/");
        assert_eq!(ensure_trailing_slash("https://a.b/"), "https://a.b/");
    }

    #[test]
    fn normalize_resolves_dots() {
        assert_eq!(normalize(Path::new("/site/./public/../docs")), PathBuf::from("/site/docs"));
        assert_eq!(normalize(Path::new("a/../..")), PathBuf::from(".."));
    }
}
