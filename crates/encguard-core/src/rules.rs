//! 规则文件加载（JSON / TOML）
//!
//! 规则是有序的 `glob 模式 → 期望编码` 映射，声明顺序即处理顺序，
//! 因此 JSON 对象反序列化为 `IndexMap` 而不是 `HashMap`。
use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Result, ValidateError};

/// TOML 中的单条规则
#[derive(Debug, Clone, Deserialize)]
struct RuleEntry {
    pattern: String,
    encoding: String,
}

/// TOML 顶层结构
#[derive(Debug, Clone, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<RuleEntry>,
}

/// 单条编码规则（加载后不可变）
#[derive(Debug, Clone)]
pub struct EncodingRule {
    pattern: String,
    encoding: String,
    matcher: GlobMatcher,
}

impl EncodingRule {
    /// 编译 glob 模式：`*` 不跨越 `/`，`**` 匹配任意层目录
    pub fn new(pattern: impl Into<String>, encoding: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let normalized = pattern.strip_prefix("./").unwrap_or(&pattern);
        if normalized.starts_with('/') || Path::new(normalized).has_root() {
            return Err(ValidateError::NonRelativePattern(pattern));
        }
        let glob = GlobBuilder::new(normalized)
            .literal_separator(true)
            .build()
            .map_err(|e| ValidateError::InvalidPattern { pattern: pattern.clone(), source: e })?;
        let matcher = glob.compile_matcher();
        Ok(Self { pattern, encoding: encoding.into(), matcher })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// `relative` 为相对于校验根目录的路径
    pub fn matches(&self, relative: &Path) -> bool {
        self.matcher.is_match(relative)
    }
}

/// 有序规则表
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<EncodingRule>,
}

impl RuleTable {
    /// 按给定顺序构建规则表
    pub fn from_pairs<I, P, E>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, E)>,
        P: Into<String>,
        E: Into<String>,
    {
        let rules = pairs
            .into_iter()
            .map(|(p, e)| EncodingRule::new(p, e))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[EncodingRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// 从规则文件加载规则表；格式由扩展名决定
pub fn load_rules(path: &Path) -> Result<RuleTable> {
    let txt = std::fs::read_to_string(path)
        .map_err(|e| ValidateError::RuleFileRead { path: path.to_path_buf(), source: e })?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("json") => parse_json_rules(path, &txt),
        Some("toml") => parse_toml_rules(path, &txt),
        _ => Err(ValidateError::UnsupportedRuleFormat(path.to_path_buf())),
    }
}

fn parse_json_rules(path: &Path, txt: &str) -> Result<RuleTable> {
    let parsed: IndexMap<String, String> = serde_json::from_str(txt)
        .map_err(|e| ValidateError::RuleFileParse { path: path.to_path_buf(), message: e.to_string() })?;
    RuleTable::from_pairs(parsed)
}

fn parse_toml_rules(path: &Path, txt: &str) -> Result<RuleTable> {
    let parsed: RuleFile = toml::from_str(txt)
        .map_err(|e| ValidateError::RuleFileParse { path: path.to_path_buf(), message: e.to_string() })?;
    RuleTable::from_pairs(parsed.rules.into_iter().map(|e| (e.pattern, e.encoding)))
}
