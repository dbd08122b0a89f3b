//! 公共类型（对外暴露）
use std::fmt;
use std::path::PathBuf;

use crate::options::ValidateStats;

/// 单个不匹配记录：按检测顺序累积，不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub path: PathBuf,
    /// 规则中声明的期望编码（原样保留，用于输出）
    pub expected: String,
    /// 检测得到的编码（已应用 unknown → UTF-8 回退并归一化）
    pub detected: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Error] '{}' should be encoded in '{}'", self.path.display(), self.expected)
    }
}

/// 一次校验运行的结果
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub stats: ValidateStats,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
