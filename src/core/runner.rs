use std::fmt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use colored::Colorize;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::core::error::{InvokerError, Result};

/// 一次外部进程调用的完整描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// 可执行文件
    pub program: String,
    /// 命令行参数
    pub args: Vec<String>,
    /// 需要设置的环境变量
    pub envs: Vec<(String, String)>,
    /// 需要从子进程环境中移除的变量
    pub env_remove: Vec<String>,
    /// 工作目录（站点根目录）
    pub cwd: PathBuf,
    /// 前台运行直到被操作者中断
    pub until_interrupted: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            env_remove: Vec::new(),
            cwd: cwd.into(),
            until_interrupted: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn env_remove(mut self, key: impl Into<String>) -> Self {
        self.env_remove.push(key.into());
        self
    }

    pub fn until_interrupted(mut self) -> Self {
        self.until_interrupted = true;
        self
    }

    /// 读取设置到子进程的环境变量
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.envs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.env_remove.is_empty() {
            write!(f, "env ")?;
        }
        for key in &self.env_remove {
            write!(f, "-u {} ", key)?;
        }
        for (key, value) in &self.envs {
            write!(f, "{}={} ", key, shell_quote(value))?;
        }
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

fn shell_quote(s: &str) -> String {
    let plain = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if plain {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// 外部进程的结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 正常退出并带有退出码
    Exited(i32),
    /// 被信号终止，没有退出码
    Terminated,
    /// 前台进程被操作者中断（Ctrl-C）
    Interrupted,
}

impl Outcome {
    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => Outcome::Exited(code),
            None => Outcome::Terminated,
        }
    }

    /// 将非成功的结束方式转换为构建错误
    pub fn into_result(self, program: &str) -> Result<()> {
        match self {
            Outcome::Exited(0) | Outcome::Interrupted => Ok(()),
            Outcome::Exited(code) => Err(InvokerError::Build {
                program: program.to_string(),
                code: Some(code),
            }),
            Outcome::Terminated => Err(InvokerError::Build {
                program: program.to_string(),
                code: None,
            }),
        }
    }
}

/// 外部进程边界
///
/// 调用器只通过该特征与外部生成器交互，测试中可以替换为记录调用的实现。
#[allow(async_fn_in_trait)]
pub trait Runner {
    async fn run(&self, invocation: &Invocation) -> Result<Outcome>;

    /// 是否只打印而不真正执行
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// 使用 tokio 子进程执行调用，标准输入输出直接继承
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl Runner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<Outcome> {
        info!("执行: {}", invocation);

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        for key in &invocation.env_remove {
            command.env_remove(key);
        }
        for (key, value) in &invocation.envs {
            command.env(key, value);
        }

        let spawn_error = |source| InvokerError::Spawn {
            program: invocation.program.clone(),
            source,
        };

        // 必须在启动子进程之前注册，否则中断可能在监听建立前结束本进程
        let mut interrupt = if invocation.until_interrupted {
            match interrupt_listener() {
                Ok(listener) => Some(listener),
                Err(e) => {
                    warn!("无法监听中断信号: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let mut child = command.spawn().map_err(spawn_error)?;
        debug!("子进程已启动: pid={:?}", child.id());

        let Some(listener) = interrupt.as_mut() else {
            let status = child.wait().await.map_err(spawn_error)?;
            return Ok(Outcome::from_status(status));
        };

        // 子进程与我们同属一个进程组，Ctrl-C 会同时送达，这里只需等待它退出
        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(spawn_error)?;
                Ok(Outcome::from_status(status))
            }
            _ = listener.recv() => {
                let status = child.wait().await.map_err(spawn_error)?;
                debug!("生成器已退出: {}", status);
                info!("{}", "Interrupted, generator stopped.".yellow());
                Ok(Outcome::Interrupted)
            }
        }
    }
}

#[cfg(unix)]
fn interrupt_listener() -> std::io::Result<tokio::signal::unix::Signal> {
    use tokio::signal::unix::{signal, SignalKind};
    signal(SignalKind::interrupt())
}

#[cfg(windows)]
fn interrupt_listener() -> std::io::Result<tokio::signal::windows::CtrlC> {
    tokio::signal::windows::ctrl_c()
}

/// 只打印命令行，不启动任何进程
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunner;

impl Runner for DryRunner {
    async fn run(&self, invocation: &Invocation) -> Result<Outcome> {
        println!("{} {}", "[dry-run]".bright_yellow(), invocation);
        Ok(Outcome::Exited(0))
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
