//! 错误类型（启动期致命错误与文件读取错误）
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidateError {
    #[error("'{}' is not a valid directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read rule file {}", .path.display())]
    RuleFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rule file {}: {message}", .path.display())]
    RuleFileParse { path: PathBuf, message: String },

    #[error("unsupported rule file format: {} (expected .json or .toml)", .0.display())]
    UnsupportedRuleFormat(PathBuf),

    #[error("invalid glob pattern: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("glob pattern must be relative to the validated directory: {0}")]
    NonRelativePattern(String),

    #[error("failed to read file {}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ValidateError>;
