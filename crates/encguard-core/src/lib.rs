//! 文件编码校验核心库
//!
//! 设计要点：
//! - 规则表为有序的 `glob 模式 → 期望编码` 映射，声明顺序决定处理顺序与去重归属。
//! - 检测器是可重置的增量状态机：整个运行共用一个实例，每个文件前 `reset`。
//! - 检测结果为 unknown 时按策略回退为 "UTF-8"，该回退在校验器一侧完成。
//! - 不匹配记录按检测顺序累积，运行结束后统一输出。

mod bom;
mod detector;
mod encoding;
mod error;
mod options;
mod prober;
mod prober_latin;
mod prober_mbcs;
mod prober_utf1632;
mod prober_utf8;
mod rules;
mod types;
mod universal;
mod validate;

pub use detector::{detect_bytes, detect_file, EncodingDetector};
pub use encoding::{normalize_encoding_name, resolve_encoding_name, DetectionResult, Encoding, DEFAULT_ENCODING};
pub use error::{Result, ValidateError};
pub use options::{ValidateOptions, ValidateStats, DEFAULT_RULES_PATH};
pub use prober::{CONFIDENCE_THRESHOLD, MINIMUM_THRESHOLD};
pub use rules::{load_rules, EncodingRule, RuleTable};
pub use types::{ValidationError, ValidationReport};
pub use universal::UniversalDetector;
pub use validate::{ensure_directory, validate, validate_dir};

/// 进程退出码：无不匹配
pub const EXIT_SUCCESS: i32 = 0;
/// 进程退出码：至少一个文件编码不匹配
pub const EXIT_MISMATCH: i32 = 1;
/// 进程退出码：启动期致命错误（目录无效、规则文件缺失或无法解析）
pub const EXIT_FATAL: i32 = 2;
