use std::io;
use std::path::{Path, PathBuf};

use colored::Colorize;
use tracing::{debug, info, warn};
use url::Url;

use crate::core::content::ContentStore;
use crate::core::error::{InvokerError, Result};
use crate::core::runner::{Invocation, Runner};
use crate::models::config::Settings;
use crate::models::types::{BuildOptions, Mode, Post, ServeOptions};
use crate::utils::{ensure_trailing_slash, normalize, post_filename};

/// 部署环境标志
pub const ENV_FLAG_VAR: &str = "HUGO_ENV";
/// 环境名称
pub const ENVIRONMENT_NAME_VAR: &str = "HUGO_ENVIRONMENT";

/// 构建调用器
///
/// 把命名操作翻译为外部生成器的一次调用。除设置外不保留任何状态，
/// 每个操作最多启动一个进程并等待其退出，失败即终止，不重试。
pub struct Invoker<R: Runner> {
    settings: Settings,
    runner: R,
}

impl<R: Runner> Invoker<R> {
    pub fn new(settings: Settings, runner: R) -> Self {
        debug!("生成器: {}，站点目录: {}", settings.generator, settings.site_dir.display());
        Self { settings, runner }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// 以生成器为程序的调用，工作目录为站点根目录
    fn generator(&self) -> Invocation {
        Invocation::new(&self.settings.generator, &self.settings.site_dir)
            .args(self.settings.generator_args.iter().cloned())
    }

    /// 合并命令行覆盖项与设置，得到一次构建的参数
    pub fn build_options(
        &self,
        destination: Option<PathBuf>,
        base_url: Option<String>,
        minify: bool,
        mode: Mode,
    ) -> Result<BuildOptions> {
        let base_url = base_url
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.settings.base_url.clone())
            .map(|u| validate_base_url(&u))
            .transpose()?;

        Ok(BuildOptions {
            destination: destination.unwrap_or_else(|| self.settings.destination.clone()),
            base_url,
            minify: minify && self.settings.minify,
            mode,
        })
    }

    /// 构建调用：从不请求草稿
    pub fn build_invocation(&self, options: &BuildOptions) -> Invocation {
        let mut invocation = self.generator();
        if options.minify {
            invocation = invocation.arg("--minify");
        }
        invocation = invocation
            .arg("--destination")
            .arg(options.destination.to_string_lossy());
        if let Some(base_url) = &options.base_url {
            invocation = invocation.arg("--baseURL").arg(base_url.as_str());
        }
        invocation = invocation.args(self.settings.extra_args.iter().cloned());

        match &options.mode {
            Mode::Build => invocation
                .env_remove(ENV_FLAG_VAR)
                .env_remove(ENVIRONMENT_NAME_VAR),
            Mode::Deploy { environment } => invocation
                .env(ENV_FLAG_VAR, environment.as_str())
                .env(ENVIRONMENT_NAME_VAR, environment.as_str()),
        }
    }

    /// 渲染所有非草稿文章到输出目录
    pub async fn build(&self, options: &BuildOptions) -> Result<()> {
        info!("开始生成静态网站 -> {}", options.destination.display());
        let invocation = self.build_invocation(options);
        self.runner.run(&invocation).await?.into_result(&invocation.program)?;
        info!("{}", "Build complete.".green());
        Ok(())
    }

    /// 与构建相同，但设置生产环境信号
    pub async fn deploy(&self, options: &BuildOptions) -> Result<()> {
        let options = BuildOptions {
            mode: Mode::Deploy {
                environment: self.settings.environment.clone(),
            },
            ..options.clone()
        };
        info!("部署构建，环境: {}", self.settings.environment);
        self.build(&options).await
    }

    pub fn serve_invocation(&self, options: ServeOptions) -> Invocation {
        let invocation = self
            .generator()
            .arg("server")
            .until_interrupted();
        if options.drafts {
            invocation.arg("-D")
        } else {
            invocation
        }
    }

    /// 启动生成器的开发服务器，阻塞直到退出或被中断
    pub async fn serve(&self, options: ServeOptions) -> Result<()> {
        info!("启动开发服务器（草稿: {}），按 Ctrl+C 停止", options.drafts);
        let invocation = self.serve_invocation(options);
        self.runner.run(&invocation).await?.into_result(&invocation.program)
    }

    /// 删除输出目录
    ///
    /// 目录不存在不是错误。返回是否确实删除了目录。
    pub async fn clean(&self, destination: &Path) -> Result<bool> {
        let target = self.settings.site_path(destination);
        self.check_clean_target(&target)?;

        if self.runner.is_dry_run() {
            println!("{} rm -rf {}", "[dry-run]".bright_yellow(), target.display());
            return Ok(target.exists());
        }

        match tokio::fs::remove_dir_all(&target).await {
            Ok(()) => {
                info!("已删除: {}", target.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("输出目录不存在，无需清理: {}", target.display());
                Ok(false)
            }
            Err(e) => Err(InvokerError::filesystem(target, e)),
        }
    }

    /// 拒绝删除站点根目录、其祖先目录、内容目录或内容目录下的任何路径
    fn check_clean_target(&self, target: &Path) -> Result<()> {
        let cwd = std::env::current_dir().map_err(|e| InvokerError::filesystem(".", e))?;
        let absolute = |p: &Path| normalize(&cwd.join(p));

        let target = absolute(target);
        let site = absolute(self.settings.site_dir.as_path());
        let content = absolute(self.settings.site_path(&self.settings.content_dir).as_path());

        if site.starts_with(&target) {
            return Err(InvokerError::invalid(format!(
                "拒绝删除站点根目录或其上级目录: {}",
                target.display()
            )));
        }
        if content.starts_with(&target) || target.starts_with(&content) {
            return Err(InvokerError::invalid(format!(
                "拒绝删除内容目录或其中的文章: {}",
                target.display()
            )));
        }
        Ok(())
    }

    /// 新文章的调用，以及生成器将要创建的文件路径
    pub fn new_post_invocation(&self, title: Option<&str>) -> Result<(Invocation, PathBuf)> {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(InvokerError::MissingArgument { name: "TITLE" })?;
        if title.contains('/') || title.contains('\\') {
            return Err(InvokerError::invalid(format!(
                "标题不能包含路径分隔符: {}",
                title
            )));
        }

        let filename = post_filename(title);
        let target = self.settings.posts_dir().join(&filename);
        if target.exists() {
            return Err(InvokerError::invalid(format!(
                "文件已存在: {}",
                target.display()
            )));
        }

        let invocation = self
            .generator()
            .arg("new")
            .arg(format!("{}/{}", self.settings.posts_section, filename));
        Ok((invocation, target))
    }

    /// 让生成器在文章集合下创建新文章
    pub async fn new_post(&self, title: Option<&str>) -> Result<PathBuf> {
        let (invocation, target) = self.new_post_invocation(title)?;
        info!("创建新文章: {}", target.display());
        self.runner.run(&invocation).await?.into_result(&invocation.program)?;

        if !self.runner.is_dry_run() && !target.exists() {
            warn!("生成器已成功退出，但未找到 {}", target.display());
        }
        Ok(target)
    }

    pub fn init_invocation(&self) -> Invocation {
        Invocation::new(&self.settings.git, &self.settings.site_dir)
            .args(["submodule", "update", "--init", "--recursive"])
    }

    /// 拉取主题子模块
    pub async fn init(&self) -> Result<()> {
        info!("初始化主题子模块...");
        let invocation = self.init_invocation();
        self.runner.run(&invocation).await?.into_result(&invocation.program)?;

        if !self.runner.is_dry_run() {
            if let Some(theme) = &self.settings.site.theme {
                for name in theme.names() {
                    let dir = self.settings.site_dir.join("themes").join(name);
                    if !dir.is_dir() {
                        warn!("主题目录不存在: {}", dir.display());
                    }
                }
            }
        }
        info!("{}", "Initialization complete.".green());
        Ok(())
    }

    /// 读取文章集合
    pub fn list(&self, include_drafts: bool) -> Result<Vec<Post>> {
        ContentStore::new(self.settings.posts_dir()).load(include_drafts)
    }
}

fn validate_base_url(value: &str) -> Result<String> {
    let url = Url::parse(value.trim()).map_err(|e| {
        InvokerError::invalid(format!("baseURL 无效: {:?} ({})", value, e))
    })?;
    if url.cannot_be_a_base() {
        return Err(InvokerError::invalid(format!("baseURL 无效: {:?}", value)));
    }
    Ok(ensure_trailing_slash(url.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::runner::{DryRunner, ProcessRunner};

    fn invoker(dir: &Path) -> Invoker<DryRunner> {
        Invoker::new(Settings::with_defaults(dir), DryRunner)
    }

    #[test]
    fn base_url_is_validated_and_slashed() {
        assert_eq!(
            validate_base_url("https://example.com/blog").unwrap(),
            "https://example.com/blog/"
        );
        assert!(validate_base_url("not a url").is_err());
        assert!(validate_base_url("mailto:me@example.com").is_err());
    }

    #[test]
    fn build_invocation_minifies_and_strips_production_signal() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = invoker(dir.path());
        let options = invoker.build_options(None, None, true, Mode::Build).unwrap();
        let invocation = invoker.build_invocation(&options);

        assert_eq!(invocation.program, "hugo");
        assert_eq!(invocation.args, vec!["--minify", "--destination", "public"]);
        assert!(invocation.envs.is_empty());
        assert_eq!(invocation.env_remove, vec![ENV_FLAG_VAR, ENVIRONMENT_NAME_VAR]);
        assert!(!invocation.until_interrupted);
    }

    #[test]
    fn build_options_prefer_cli_base_url_over_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::with_defaults(dir.path());
        settings.base_url = Some("https://config.example.com/".to_string());
        let invoker = Invoker::new(settings, DryRunner);

        let from_config = invoker.build_options(None, None, true, Mode::Build).unwrap();
        assert_eq!(from_config.base_url.as_deref(), Some("https://config.example.com/"));

        let from_cli = invoker
            .build_options(Some(PathBuf::from("docs")), Some("https://cli.example.com".into()), false, Mode::Build)
            .unwrap();
        assert_eq!(from_cli.base_url.as_deref(), Some("https://cli.example.com/"));
        assert_eq!(from_cli.destination, PathBuf::from("docs"));
        assert!(!from_cli.minify);
    }

    #[test]
    fn serve_includes_drafts_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = invoker(dir.path());

        let with_drafts = invoker.serve_invocation(ServeOptions::default());
        assert_eq!(with_drafts.args, vec!["server", "-D"]);
        assert!(with_drafts.until_interrupted);

        let without = invoker.serve_invocation(ServeOptions { drafts: false });
        assert_eq!(without.args, vec!["server"]);
    }

    #[test]
    fn new_post_requires_a_title() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = invoker(dir.path());
        for title in [None, Some(""), Some("   ")] {
            assert!(matches!(
                invoker.new_post_invocation(title),
                Err(InvokerError::MissingArgument { name: "TITLE" })
            ));
        }
    }

    #[test]
    fn new_post_rejects_path_separators() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = invoker(dir.path());
        assert!(matches!(
            invoker.new_post_invocation(Some("../escape")),
            Err(InvokerError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn clean_refuses_site_root_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = invoker(dir.path());
        for target in [
            ".",
            "..",
            "content",
            "content/../content/..",
            "content/posts",
            "content/posts/../posts/images",
        ] {
            let result = invoker.check_clean_target(&dir.path().join(target));
            assert!(result.is_err(), "{} should be refused", target);
        }
        assert!(invoker.check_clean_target(&dir.path().join("public")).is_ok());
        assert!(invoker.check_clean_target(&dir.path().join("content-out")).is_ok());
    }

    #[tokio::test]
    async fn clean_never_removes_the_posts_collection() {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("content").join("posts");
        std::fs::create_dir_all(&posts).unwrap();
        std::fs::write(posts.join("colly.md"), "---\ntitle: Colly\n---\n").unwrap();
        let invoker = Invoker::new(Settings::with_defaults(dir.path()), ProcessRunner);

        assert!(matches!(
            invoker.clean(Path::new("content/posts")).await,
            Err(InvokerError::InvalidArgument { .. })
        ));
        assert!(posts.join("colly.md").exists());
    }

    #[tokio::test]
    async fn clean_reports_filesystem_errors() {
        let dir = tempfile::tempdir().unwrap();
        // 目标是普通文件，remove_dir_all 失败但不是 NotFound
        std::fs::write(dir.path().join("public"), "not a directory").unwrap();
        let invoker = Invoker::new(Settings::with_defaults(dir.path()), ProcessRunner);

        match invoker.clean(Path::new("public")).await {
            Err(InvokerError::Filesystem { path, .. }) => {
                assert_eq!(path, dir.path().join("public"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(dir.path().join("public").exists());
    }

    #[tokio::test]
    async fn dry_run_clean_keeps_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("public")).unwrap();
        let invoker = invoker(dir.path());

        assert!(invoker.clean(Path::new("public")).await.unwrap());
        assert!(dir.path().join("public").exists());
    }
}
