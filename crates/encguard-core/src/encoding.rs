//! 编码名称与检测结果（对外暴露）

/// 检测器能够识别的编码
/// 名称统一为大写规范形式，便于与规则表中的期望编码直接比较。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    Utf16,
    Utf32,
    ShiftJis,
    EucJp,
    EucKr,
    Gb2312,
    Big5,
    Windows1252,
}

impl Encoding {
    /// 规范名称（大写）
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16 => "UTF-16",
            Encoding::Utf32 => "UTF-32",
            Encoding::ShiftJis => "SHIFT_JIS",
            Encoding::EucJp => "EUC-JP",
            Encoding::EucKr => "EUC-KR",
            Encoding::Gb2312 => "GB2312",
            Encoding::Big5 => "BIG5",
            Encoding::Windows1252 => "WINDOWS-1252",
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 单次检测的结果
/// - `encoding` 为 None 表示无法判定（unknown），由调用方决定回退策略
/// - `confidence` 取值 [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionResult {
    pub encoding: Option<Encoding>,
    pub confidence: f32,
}

impl DetectionResult {
    pub fn unknown() -> Self {
        Self { encoding: None, confidence: 0.0 }
    }

    pub fn certain(encoding: Encoding) -> Self {
        Self { encoding: Some(encoding), confidence: 1.0 }
    }

    pub fn is_unknown(&self) -> bool {
        self.encoding.is_none()
    }
}

/// 未能判定时的默认编码
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// 回退策略：unknown → "UTF-8"
/// 该策略位于检测器与校验器的边界，检测器本身只报告 unknown。
pub fn resolve_encoding_name(result: &DetectionResult) -> String {
    result
        .encoding
        .map_or(DEFAULT_ENCODING, Encoding::name)
        .to_string()
}

/// 编码名归一化：去除首尾空白并转为大写
pub fn normalize_encoding_name(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}
