//! 校验选项与统计信息（模块）
use std::path::PathBuf;

/// 默认规则文件位置（相对于工作目录，即 CI 中工具仓库的检出位置）
pub const DEFAULT_RULES_PATH: &str = "workflow-repo/.github/scripts/encoding.json";

/// 校验选项
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// 规则文件路径（JSON 或 TOML）；为空则使用 DEFAULT_RULES_PATH
    pub rules_path: Option<PathBuf>,
}

impl ValidateOptions {
    pub fn rules_path(&self) -> PathBuf {
        self.rules_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RULES_PATH))
    }
}

/// 校验统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidateStats {
    /// 已处理的规则数
    pub rules_applied: usize,
    /// 规则命中的文件数（含被多条规则重复命中的次数）
    pub files_matched: usize,
    /// 实际执行检测的文件数（去重后）
    pub files_checked: usize,
    pub mismatches: usize,
}
