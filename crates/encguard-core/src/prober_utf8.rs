//! UTF-8 探测器：字节序列合法性状态机
//!
//! 拒绝超长编码、代理区（U+D800..U+DFFF）与超出 U+10FFFF 的序列；
//! 多字节序列允许跨块。
use crate::encoding::Encoding;
use crate::prober::{Prober, ProbingState, CONFIDENCE_THRESHOLD, SURE_YES};

/// 达到该多字节字符数后置信度封顶
const MB_CHARS_FOR_SURE: u32 = 6;
const ONE_CHAR_PROB: f32 = 0.5;

pub(crate) struct Utf8Prober {
    state: ProbingState,
    /// 当前序列还需要的后续字节数
    remaining: u8,
    /// 下一个后续字节的合法范围（首个后续字节范围受首字节约束）
    lower: u8,
    upper: u8,
    mb_chars: u32,
}

impl Utf8Prober {
    pub(crate) fn new() -> Self {
        Self { state: ProbingState::Detecting, remaining: 0, lower: 0x80, upper: 0xBF, mb_chars: 0 }
    }

    /// 序列是否在块末尾被截断
    pub(crate) fn has_pending(&self) -> bool {
        self.remaining > 0
    }

    fn start_sequence(&mut self, b: u8) -> bool {
        let (remaining, lower, upper) = match b {
            0x00..=0x7F => return true,
            0xC2..=0xDF => (1, 0x80, 0xBF),
            0xE0 => (2, 0xA0, 0xBF),
            0xE1..=0xEC | 0xEE..=0xEF => (2, 0x80, 0xBF),
            0xED => (2, 0x80, 0x9F),
            0xF0 => (3, 0x90, 0xBF),
            0xF1..=0xF3 => (3, 0x80, 0xBF),
            0xF4 => (3, 0x80, 0x8F),
            _ => return false,
        };
        self.remaining = remaining;
        self.lower = lower;
        self.upper = upper;
        true
    }
}

impl Prober for Utf8Prober {
    fn encoding(&self) -> Encoding {
        Encoding::Utf8
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn feed(&mut self, bytes: &[u8]) -> ProbingState {
        if self.state != ProbingState::Detecting {
            return self.state;
        }
        for &b in bytes {
            if self.remaining == 0 {
                if !self.start_sequence(b) {
                    self.state = ProbingState::NotMe;
                    return self.state;
                }
                continue;
            }
            if b < self.lower || b > self.upper {
                self.state = ProbingState::NotMe;
                return self.state;
            }
            self.remaining -= 1;
            self.lower = 0x80;
            self.upper = 0xBF;
            if self.remaining == 0 {
                self.mb_chars += 1;
            }
        }
        if self.confidence() >= CONFIDENCE_THRESHOLD {
            self.state = ProbingState::FoundIt;
        }
        self.state
    }

    fn state(&self) -> ProbingState {
        self.state
    }

    fn finish(&mut self) {
        if self.has_pending() {
            self.state = ProbingState::NotMe;
        }
    }

    fn confidence(&self) -> f32 {
        if self.state == ProbingState::NotMe {
            return 0.0;
        }
        if self.mb_chars < MB_CHARS_FOR_SURE {
            let unlike = SURE_YES * ONE_CHAR_PROB.powi(self.mb_chars as i32);
            1.0 - unlike
        } else {
            SURE_YES
        }
    }
}
