//! 检测器契约与流式喂数据
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::encoding::DetectionResult;
use crate::error::{Result, ValidateError};

/// 可重置、增量式的编码检测器
///
/// 生命周期：创建一次 → 每个文件前 `reset` → 多次 `feed` → `finalize` 取结果 →
/// 下一个文件再 `reset` …… → 整个运行结束时 `close` 一次。
///
/// 任何满足该契约的实现（例如第三方检测库的适配层）都可以替换 [`UniversalDetector`]。
///
/// [`UniversalDetector`]: crate::UniversalDetector
pub trait EncodingDetector {
    /// 清空所有累积状态，丢弃上一个文件的证据
    fn reset(&mut self);

    /// 增量喂入一块原始字节；不会重新扫描之前的块。
    /// `is_done()` 为真之后再调用不得破坏最终结果。
    fn feed(&mut self, chunk: &[u8]);

    /// 是否已得出结论（置信度越过阈值，或遇到 BOM）
    fn is_done(&self) -> bool;

    /// 根据已累积的证据计算结果；未喂过任何字节时返回 unknown
    fn finalize(&mut self) -> DetectionResult;

    /// 释放整个生命周期内持有的资源（每次运行结束调用一次，而非每个文件）
    fn close(&mut self) {}
}

/// 逐行读取文件并喂给检测器，检测器提前得出结论时停止读取
/// 文件句柄在所有返回路径上都会被释放（作用域结束即 drop）。
pub fn detect_file<D: EncodingDetector + ?Sized>(path: &Path, detector: &mut D) -> Result<DetectionResult> {
    let read_err = |source: std::io::Error| ValidateError::FileRead { path: path.to_path_buf(), source };
    let file = File::open(path).map_err(read_err)?;
    let mut reader = BufReader::new(file);
    let mut line: Vec<u8> = Vec::new();

    detector.reset();
    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line).map_err(read_err)?;
        if n == 0 {
            break;
        }
        detector.feed(&line);
        if detector.is_done() {
            break;
        }
    }
    Ok(detector.finalize())
}

/// 内存缓冲区版本（按行切分，与文件路径保持相同的喂入粒度）
pub fn detect_bytes<D: EncodingDetector + ?Sized>(data: &[u8], detector: &mut D) -> DetectionResult {
    detector.reset();
    for line in data.split_inclusive(|&b| b == b'\n') {
        detector.feed(line);
        if detector.is_done() {
            break;
        }
    }
    detector.finalize()
}
