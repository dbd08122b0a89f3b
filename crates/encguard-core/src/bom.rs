//! BOM（字节序标记）嗅探
//!
//! BOM 具有绝对优先级：一旦识别即直接确定编码，不再进行统计分析。
//! 由于调用方按行/按块喂数据，BOM 可能被拆分到多个块中，
//! 因此这里区分“已匹配 / 仍需更多字节 / 确定无 BOM”三种结论。

use crate::encoding::Encoding;

/// BOM 最长长度（UTF-32）
pub(crate) const MAX_BOM_LEN: usize = 4;

/// 已知 BOM 列表（按长度降序，保证 UTF-32LE 优先于 UTF-16LE）
const BOMS: &[(&[u8], Encoding)] = &[
    (&[0xFF, 0xFE, 0x00, 0x00], Encoding::Utf32),
    (&[0x00, 0x00, 0xFE, 0xFF], Encoding::Utf32),
    (&[0xEF, 0xBB, 0xBF], Encoding::Utf8),
    (&[0xFF, 0xFE], Encoding::Utf16),
    (&[0xFE, 0xFF], Encoding::Utf16),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BomSniff {
    Found(Encoding),
    NeedMore,
    Absent,
}

/// 对文件头部字节做 BOM 判定
/// 若仍可能匹配到更长的 BOM，则返回 NeedMore（例如 `FF FE` 之后可能是 UTF-32LE）。
pub(crate) fn sniff(head: &[u8]) -> BomSniff {
    let could_grow = BOMS
        .iter()
        .any(|(bom, _)| head.len() < bom.len() && bom.starts_with(head));
    if could_grow {
        return BomSniff::NeedMore;
    }
    match longest_match(head) {
        Some(enc) => BomSniff::Found(enc),
        None => BomSniff::Absent,
    }
}

/// 输入已结束时的最终判定：不再等待，取已出现的最长完整 BOM
pub(crate) fn sniff_final(head: &[u8]) -> Option<Encoding> {
    longest_match(head)
}

fn longest_match(head: &[u8]) -> Option<Encoding> {
    BOMS.iter()
        .find(|(bom, _)| head.starts_with(bom))
        .map(|(_, enc)| *enc)
}
