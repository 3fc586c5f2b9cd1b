use crate::core::{DryRunner, Invoker, ProcessRunner, Runner};
use crate::models::{Mode, Post, ServeOptions, Settings};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "blogctl", author, version, about, long_about = None)]
pub struct Cli {
    /// 指定站点目录
    #[arg(short, long, default_value = ".", global = true)]
    pub path: PathBuf,

    /// 配置文件路径，默认：<站点目录>/blogctl.yml
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 只打印将要执行的命令，不实际执行
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 生成静态文件（压缩，不含草稿）
    Build(BuildArgs),

    /// 启动生成器的本地开发服务器（含草稿）
    Serve(ServeArgs),

    /// 删除输出目录
    Clean(CleanArgs),

    /// 创建新的文章
    NewPost(NewPostArgs),

    /// 以生产环境构建站点
    Deploy(BuildArgs),

    /// 拉取主题子模块
    Init,

    /// 列出文章集合中的文章
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// 覆盖站点的 baseURL
    #[arg(long, env = "BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// 输出目录，默认：public
    #[arg(short, long, value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// 不压缩输出
    #[arg(long)]
    pub no_minify: bool,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// 不包含草稿
    #[arg(long)]
    pub no_drafts: bool,
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// 要删除的输出目录，默认：public
    #[arg(short, long, value_name = "DIR")]
    pub destination: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct NewPostArgs {
    /// 文章标题
    #[arg(value_name = "TITLE", env = "TITLE")]
    pub title: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// 同时列出草稿
    #[arg(long)]
    pub drafts: bool,

    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

/// 执行命令
pub async fn execute(cli: Cli) -> Result<()> {
    let settings = Settings::load(&cli.path, cli.config.as_deref())?;

    if cli.dry_run {
        run(Invoker::new(settings, DryRunner), cli.command).await
    } else {
        run(Invoker::new(settings, ProcessRunner), cli.command).await
    }
}

async fn run<R: Runner>(invoker: Invoker<R>, command: Commands) -> Result<()> {
    match command {
        Commands::Build(args) => {
            let options =
                invoker.build_options(args.destination, args.base_url, !args.no_minify, Mode::Build)?;
            invoker.build(&options).await?;
        }
        Commands::Serve(args) => {
            invoker
                .serve(ServeOptions {
                    drafts: !args.no_drafts,
                })
                .await?;
        }
        Commands::Clean(args) => {
            let destination = args
                .destination
                .unwrap_or_else(|| invoker.settings().destination.clone());
            if !invoker.clean(&destination).await? {
                info!("{} 不存在，无需清理", destination.display());
            }
        }
        Commands::NewPost(args) => {
            let path = invoker.new_post(args.title.as_deref()).await?;
            println!("{}", created_line(&path, invoker.runner().is_dry_run()));
        }
        Commands::Deploy(args) => {
            let options =
                invoker.build_options(args.destination, args.base_url, !args.no_minify, Mode::Build)?;
            invoker.deploy(&options).await?;
        }
        Commands::Init => {
            invoker.init().await?;
        }
        Commands::List(args) => {
            let posts = invoker.list(args.drafts)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else {
                print_posts(invoker.settings(), &posts);
            }
        }
    }

    Ok(())
}

/// 干运行时没有真正创建文件
fn created_line(path: &Path, dry_run: bool) -> String {
    if dry_run {
        format!("{} would create {}", "[dry-run]".bright_yellow(), path.display())
    } else {
        format!("{} {}", "Created".green(), path.display())
    }
}

fn print_posts(settings: &Settings, posts: &[Post]) {
    if let Some(title) = &settings.site.title {
        println!("{}", title.bright_cyan());
    }
    if posts.is_empty() {
        println!("没有文章: {}", settings.posts_dir().display());
        return;
    }

    for post in posts {
        let date = post
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        let draft = if post.draft {
            format!(" {}", "[draft]".yellow())
        } else {
            String::new()
        };
        let tags = if post.tags.is_empty() {
            String::new()
        } else {
            let tags: Vec<&str> = post.tags.iter().map(String::as_str).collect();
            format!("  {}", tags.join(", ").dimmed())
        };
        println!("{}  {}{}{}", date.bright_green(), post.title.bold(), draft, tags);
    }
    println!("{} 篇文章", posts.len());
}
