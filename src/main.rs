use clap::Parser;
use colored::Colorize;
use tracing::{debug, error};
use tracing_subscriber::{fmt, EnvFilter};

use blogctl::cli;
use blogctl::InvokerError;

#[tokio::main]
async fn main() {
    // 解析命令行参数
    let cli = cli::Cli::parse();

    // 初始化日志系统，RUST_LOG 优先于 --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!(
        "{} {}",
        "blogctl".bright_cyan(),
        env!("CARGO_PKG_VERSION").bright_green()
    );

    // 执行命令
    if let Err(e) = cli::execute(cli).await {
        error!("Error: {}", e);

        // 打印错误链
        for cause in e.chain().skip(1) {
            error!("Caused by: {}", cause);
        }

        let code = e
            .downcast_ref::<InvokerError>()
            .map_or(1, InvokerError::exit_code);
        std::process::exit(code);
    }
}
