//! 无 BOM 的 UTF-16 / UTF-32 判定
//!
//! 以 ASCII 为主的 UTF-16/32 文本在固定位置上出现大量 0x00，
//! 这里按“全局偏移 mod 4”统计零字节分布，仅在输入结束时给出结论。
use crate::encoding::Encoding;

/// 判定为 UTF-16 时，零高位字节至少占码元的 70%
const UTF16_ZERO_HIGH_RATIO: f32 = 0.7;
/// 且零低位字节不超过 10%
const UTF16_ZERO_LOW_RATIO: f32 = 0.1;
/// 命中时报告的置信度
pub(crate) const UTF1632_CONFIDENCE: f32 = 0.85;

#[derive(Debug, Default)]
pub(crate) struct Utf1632Prober {
    position: u64,
    zeros: [u64; 4],
}

impl Utf1632Prober {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        self.position = 0;
        self.zeros = [0; 4];
    }

    pub(crate) fn feed(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if b == 0 {
                self.zeros[(self.position % 4) as usize] += 1;
            }
            self.position += 1;
        }
    }

    /// 是否出现过零字节（没有零字节时不可能是 UTF-16/32）
    pub(crate) fn saw_zero(&self) -> bool {
        self.zeros.iter().any(|&z| z > 0)
    }

    pub(crate) fn guess(&self) -> Option<Encoding> {
        let n = self.position;
        if n < 4 || !self.saw_zero() {
            return None;
        }
        let z = &self.zeros;
        if n % 4 == 0 {
            let quads = n / 4;
            // BMP 字符的 UTF-32 高两字节恒为 0
            let le = z[2] == quads && z[3] == quads && z[0] < quads;
            let be = z[0] == quads && z[1] == quads && z[3] < quads;
            if le || be {
                return Some(Encoding::Utf32);
            }
        }
        if n % 2 == 0 {
            let units = (n / 2) as f32;
            let even = (z[0] + z[2]) as f32;
            let odd = (z[1] + z[3]) as f32;
            let le = odd >= units * UTF16_ZERO_HIGH_RATIO && even <= units * UTF16_ZERO_LOW_RATIO;
            let be = even >= units * UTF16_ZERO_HIGH_RATIO && odd <= units * UTF16_ZERO_LOW_RATIO;
            if le || be {
                return Some(Encoding::Utf16);
            }
        }
        None
    }
}
