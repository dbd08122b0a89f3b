//! 校验主流程
//!
//! - 整个运行只使用一个检测器实例与一个“已检测文件集合”（而非每条规则一份）
//! - 规则按声明顺序处理；规则内按目录遍历顺序（按文件名排序，结果可复现）
//! - 同一文件被多条规则命中时只检测一次，不匹配记录归属第一条命中的规则
//!
//! 去重集合仅在顺序执行下成立；若改为并行，需要对集合加锁或改为单写者分派。
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::detector::{detect_file, EncodingDetector};
use crate::encoding::{normalize_encoding_name, resolve_encoding_name};
use crate::error::{Result, ValidateError};
use crate::options::ValidateOptions;
use crate::rules::{load_rules, RuleTable};
use crate::types::{ValidationError, ValidationReport};
use crate::universal::UniversalDetector;

/// 根目录必须存在且为目录，否则整个运行中止
pub fn ensure_directory(root: &Path) -> Result<()> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(ValidateError::NotADirectory(root.to_path_buf()))
    }
}

/// 完整流程：检查目录 → 加载规则 → 使用默认检测器校验
pub fn validate_dir(root: &Path, opts: &ValidateOptions) -> Result<ValidationReport> {
    ensure_directory(root)?;
    let rules = load_rules(&opts.rules_path())?;
    let mut detector = UniversalDetector::new();
    validate(root, &rules, &mut detector)
}

/// 按规则表校验 `root` 下的文件
/// 检测器在所有规则处理完毕后关闭一次（出错时同样关闭）。
pub fn validate<D: EncodingDetector + ?Sized>(
    root: &Path,
    rules: &RuleTable,
    detector: &mut D,
) -> Result<ValidationReport> {
    ensure_directory(root)?;
    info!(root = %root.display(), rules = rules.len(), "starting validation");
    if rules.is_empty() {
        warn!("rule table is empty, nothing to validate");
    }

    let outcome = run_rules(root, rules, detector);
    detector.close();

    if let Ok(report) = &outcome {
        info!(
            rules_applied = report.stats.rules_applied,
            files_checked = report.stats.files_checked,
            mismatches = report.stats.mismatches,
            "validation finished"
        );
    }
    outcome
}

fn run_rules<D: EncodingDetector + ?Sized>(
    root: &Path,
    rules: &RuleTable,
    detector: &mut D,
) -> Result<ValidationReport> {
    let files = collect_files(root);
    let mut report = ValidationReport::default();
    let mut checked: HashSet<PathBuf> = HashSet::new();

    for rule in rules.rules() {
        report.stats.rules_applied += 1;
        let expected = normalize_encoding_name(rule.encoding());
        let mut matched = 0usize;

        for rel in files.iter().filter(|rel| rule.matches(rel)) {
            matched += 1;
            let path = display_path(root, rel);
            // 先登记再检测
            if !checked.insert(path.clone()) {
                continue;
            }
            let result = detect_file(&path, detector)?;
            let detected = normalize_encoding_name(&resolve_encoding_name(&result));
            report.stats.files_checked += 1;
            debug!(
                path = %path.display(),
                pattern = rule.pattern(),
                detected = %detected,
                confidence = result.confidence,
                "file checked"
            );
            if detected != expected {
                report.errors.push(ValidationError {
                    path,
                    expected: rule.encoding().to_string(),
                    detected,
                });
            }
        }

        if matched == 0 {
            debug!(pattern = rule.pattern(), "pattern matched no files");
        }
        report.stats.files_matched += matched;
    }

    report.stats.mismatches = report.errors.len();
    Ok(report)
}

/// 遍历一次目录快照，返回相对路径
/// 普通文件与指向文件的符号链接都会被收集；不进入符号链接指向的目录。
fn collect_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = vec![];
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!(%err, "skipping unreadable directory entry");
                continue;
            }
        };
        if !is_file_like(&entry) {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            files.push(rel.to_path_buf());
        }
    }
    files
}

/// 悬空链接同样保留，检测时以 `FileRead` 报出
fn is_file_like(entry: &walkdir::DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    if !file_type.is_symlink() {
        return false;
    }
    match std::fs::metadata(entry.path()) {
        Ok(meta) => meta.is_file(),
        Err(err) => {
            debug!(path = %entry.path().display(), %err, "dangling symlink");
            true
        }
    }
}

/// 报告中的文件路径：根目录为 `.` 时直接使用相对路径
fn display_path(root: &Path, rel: &Path) -> PathBuf {
    if root == Path::new(".") {
        rel.to_path_buf()
    } else {
        root.join(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::DetectionResult;
    use std::fs;
    use tempfile::TempDir;

    /// 统计调用次数的检测器包装
    #[derive(Default)]
    struct CountingDetector {
        inner: UniversalDetector,
        resets: usize,
        finalizes: usize,
        closes: usize,
    }

    impl EncodingDetector for CountingDetector {
        fn reset(&mut self) {
            self.resets += 1;
            self.inner.reset();
        }

        fn feed(&mut self, chunk: &[u8]) {
            self.inner.feed(chunk);
        }

        fn is_done(&self) -> bool {
            self.inner.is_done()
        }

        fn finalize(&mut self) -> DetectionResult {
            self.finalizes += 1;
            self.inner.finalize()
        }

        fn close(&mut self) {
            self.closes += 1;
            self.inner.close();
        }
    }

    fn utf16_with_bom(s: &str) -> Vec<u8> {
        let mut out = vec![0xFF, 0xFE];
        out.extend(s.encode_utf16().flat_map(u16::to_le_bytes));
        out
    }

    fn rules(pairs: &[(&str, &str)]) -> RuleTable {
        RuleTable::from_pairs(pairs.iter().copied()).unwrap()
    }

    fn names(report: &ValidationReport) -> Vec<String> {
        report
            .errors
            .iter()
            .map(|e| e.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_utf8_file_passes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "héllo wörld\n").unwrap();
        let mut d = CountingDetector::default();
        let report = validate(dir.path(), &rules(&[("*.txt", "UTF-8")]), &mut d).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.stats.files_checked, 1);
    }

    #[test]
    fn test_utf16_file_is_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), utf16_with_bom("hello\r\n")).unwrap();
        let mut d = CountingDetector::default();
        let report = validate(dir.path(), &rules(&[("*.txt", "UTF-8")]), &mut d).unwrap();
        assert_eq!(report.errors.len(), 1);
        let err = &report.errors[0];
        assert_eq!(err.path, dir.path().join("b.txt"));
        assert_eq!(err.expected, "UTF-8");
        assert_eq!(err.detected, "UTF-16");
        assert_eq!(
            err.to_string(),
            format!("[Error] '{}' should be encoded in 'UTF-8'", dir.path().join("b.txt").display())
        );
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let mut d = CountingDetector::default();
        let err = validate(&missing, &rules(&[("*.txt", "UTF-8")]), &mut d).unwrap_err();
        assert!(matches!(err, ValidateError::NotADirectory(_)));
        assert_eq!(d.finalizes, 0);
    }

    #[test]
    fn test_file_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(ensure_directory(&file), Err(ValidateError::NotADirectory(_))));
    }

    #[test]
    fn test_overlapping_rules_detect_once() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "plain\n").unwrap();
        let mut d = CountingDetector::default();
        let report = validate(dir.path(), &rules(&[("*.txt", "UTF-8"), ("a.txt", "UTF-8")]), &mut d).unwrap();
        assert!(report.is_clean());
        assert_eq!(d.finalizes, 1);
        assert_eq!(d.resets, 1);
        assert_eq!(d.closes, 1);
        assert_eq!(report.stats.files_matched, 2);
        assert_eq!(report.stats.files_checked, 1);
    }

    #[test]
    fn test_first_matching_rule_claims_the_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "plain\n").unwrap();
        let mut d = CountingDetector::default();
        let report = validate(dir.path(), &rules(&[("*.txt", "UTF-16"), ("a.txt", "UTF-8")]), &mut d).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].expected, "UTF-16");
        assert_eq!(report.errors[0].detected, "UTF-8");
        assert_eq!(d.finalizes, 1);
    }

    #[test]
    fn test_emission_follows_rule_order_then_walk_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), utf16_with_bom("b")).unwrap();
        fs::write(dir.path().join("a.txt"), utf16_with_bom("a")).unwrap();
        fs::write(dir.path().join("z.csv"), utf16_with_bom("z")).unwrap();
        let mut d = CountingDetector::default();
        let report = validate(dir.path(), &rules(&[("*.csv", "UTF-8"), ("*.txt", "UTF-8")]), &mut d).unwrap();
        assert_eq!(names(&report), vec!["z.csv", "a.txt", "b.txt"]);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::write(dir.path().join("sub/x.yml"), utf16_with_bom("x")).unwrap();
        fs::write(dir.path().join("sub/deeper/y.yml"), utf16_with_bom("y")).unwrap();
        fs::write(dir.path().join("top.yml"), "ok\n").unwrap();
        let table = rules(&[("**/*.yml", "UTF-8")]);
        let mut d = UniversalDetector::new();
        let first = validate(dir.path(), &table, &mut d).unwrap();
        let second = validate(dir.path(), &table, &mut d).unwrap();
        assert_eq!(first.errors, second.errors);
        assert_eq!(first.errors.len(), 2);
    }

    #[test]
    fn test_single_star_does_not_descend() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/a.txt"), utf16_with_bom("a")).unwrap();
        let mut d = CountingDetector::default();
        let report = validate(dir.path(), &rules(&[("*.txt", "UTF-8")]), &mut d).unwrap();
        assert!(report.is_clean());
        assert_eq!(d.finalizes, 0);
    }

    #[test]
    fn test_expected_name_is_case_normalized() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), utf16_with_bom("a")).unwrap();
        let mut d = UniversalDetector::new();
        let report = validate(dir.path(), &rules(&[("*.txt", " utf-16 ")]), &mut d).unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn test_undecidable_content_falls_back_to_utf8() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.bin"), [b'a', 0x80, 0x81, b'b']).unwrap();
        let mut d = UniversalDetector::new();
        let report = validate(dir.path(), &rules(&[("*.bin", "UTF-8")]), &mut d).unwrap();
        assert!(report.is_clean());

        let report = validate(dir.path(), &rules(&[("*.bin", "WINDOWS-1252")]), &mut d).unwrap();
        assert_eq!(report.errors[0].detected, "UTF-8");
    }

    #[test]
    fn test_empty_file_is_utf8() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("empty.txt"), "").unwrap();
        let mut d = UniversalDetector::new();
        let report = validate(dir.path(), &rules(&[("*.txt", "UTF-8")]), &mut d).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.stats.files_checked, 1);
    }

    #[test]
    fn test_validate_dir_checks_root_before_loading_rules() {
        let dir = TempDir::new().unwrap();
        let opts = ValidateOptions { rules_path: Some(dir.path().join("absent.json")) };
        let err = validate_dir(&dir.path().join("missing"), &opts).unwrap_err();
        assert!(matches!(err, ValidateError::NotADirectory(_)));

        let err = validate_dir(dir.path(), &opts).unwrap_err();
        assert!(matches!(err, ValidateError::RuleFileRead { .. }));
    }

    #[test]
    fn test_validate_dir_with_rule_file() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("mod");
        fs::create_dir_all(root.join("localization")).unwrap();
        fs::write(root.join("localization/l_english.yml"), "\u{feff}l_english:\n").unwrap();
        fs::write(root.join("localization/l_french.yml"), utf16_with_bom("l_french:\n")).unwrap();
        let rules_path = dir.path().join("encoding.json");
        fs::write(&rules_path, r#"{"localization/*.yml": "UTF-8"}"#).unwrap();

        let opts = ValidateOptions { rules_path: Some(rules_path) };
        let report = validate_dir(&root, &opts).unwrap();
        assert_eq!(names(&report), vec!["l_french.yml"]);
        assert_eq!(report.stats.mismatches, 1);
        assert_eq!(report.stats.rules_applied, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_checked() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("mod");
        fs::create_dir_all(&root).unwrap();
        let target = dir.path().join("outside.txt");
        fs::write(&target, utf16_with_bom("linked")).unwrap();
        std::os::unix::fs::symlink(&target, root.join("link.txt")).unwrap();

        let mut d = CountingDetector::default();
        let report = validate(&root, &rules(&[("*.txt", "UTF-8")]), &mut d).unwrap();
        assert_eq!(names(&report), vec!["link.txt"]);
        assert_eq!(report.errors[0].detected, "UTF-16");
        assert_eq!(report.stats.files_checked, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_not_descended() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("mod");
        let elsewhere = dir.path().join("elsewhere");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&elsewhere).unwrap();
        fs::write(elsewhere.join("a.txt"), utf16_with_bom("a")).unwrap();
        std::os::unix::fs::symlink(&elsewhere, root.join("sub")).unwrap();

        let mut d = CountingDetector::default();
        let report = validate(&root, &rules(&[("**/*.txt", "UTF-8")]), &mut d).unwrap();
        assert!(report.is_clean());
        assert_eq!(d.finalizes, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_read_error() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("mod");
        fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), root.join("dangling.txt")).unwrap();

        let mut d = CountingDetector::default();
        let err = validate(&root, &rules(&[("*.txt", "UTF-8")]), &mut d).unwrap_err();
        assert!(matches!(err, ValidateError::FileRead { .. }));
        assert_eq!(d.closes, 1);
    }

    #[test]
    fn test_display_path_for_current_dir() {
        assert_eq!(display_path(Path::new("."), Path::new("a.txt")), PathBuf::from("a.txt"));
        assert_eq!(display_path(Path::new("mod"), Path::new("a.txt")), PathBuf::from("mod/a.txt"));
    }
}
