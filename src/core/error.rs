use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 调用器错误类型
///
/// 所有错误对当前命令都是终止性的：没有重试，也没有部分恢复。
#[derive(Error, Debug)]
pub enum InvokerError {
    #[error("缺少必需参数: {name}")]
    MissingArgument {
        name: &'static str,
    },

    #[error("参数无效: {message}")]
    InvalidArgument {
        message: String,
    },

    #[error("`{program}` 执行失败: {}", describe_exit(.code))]
    Build {
        program: String,
        code: Option<i32>,
    },

    #[error("无法启动 `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("文件系统错误: {}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("配置错误: {}: {message}", .path.display())]
    Config {
        path: PathBuf,
        message: String,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("退出码 {}", code),
        None => "被信号终止".to_string(),
    }
}

impl InvokerError {
    pub fn invalid(message: impl Into<String>) -> Self {
        InvokerError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        InvokerError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// 进程退出码
    ///
    /// 外部工具失败时原样透传其退出码，其余错误一律为 1。
    pub fn exit_code(&self) -> i32 {
        match self {
            InvokerError::Build { code: Some(code), .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, InvokerError>;
