//! Windows-1252 探测器
//!
//! 西欧文本中的高位字节（重音字母、标点）几乎总是与 ASCII 字母相邻，
//! 连续出现的高位字节越多，越不像单字节拉丁文本。
use crate::encoding::Encoding;
use crate::prober::{Prober, ProbingState};

/// 单字节编码置信度上限，保证合法的多字节候选优先
const LATIN_CONFIDENCE_CAP: f32 = 0.73;

/// Windows-1252 中未定义的字节
fn is_undefined(b: u8) -> bool {
    matches!(b, 0x81 | 0x8D | 0x8F | 0x90 | 0x9D)
}

pub(crate) struct LatinProber {
    state: ProbingState,
    high: u32,
    high_after_high: u32,
    prev_high: bool,
}

impl LatinProber {
    pub(crate) fn new() -> Self {
        Self { state: ProbingState::Detecting, high: 0, high_after_high: 0, prev_high: false }
    }
}

impl Prober for LatinProber {
    fn encoding(&self) -> Encoding {
        Encoding::Windows1252
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn feed(&mut self, bytes: &[u8]) -> ProbingState {
        if self.state == ProbingState::NotMe {
            return self.state;
        }
        for &b in bytes {
            if is_undefined(b) {
                self.state = ProbingState::NotMe;
                return self.state;
            }
            let is_high = b >= 0x80;
            if is_high {
                self.high += 1;
                if self.prev_high {
                    self.high_after_high += 1;
                }
            }
            self.prev_high = is_high;
        }
        self.state
    }

    fn state(&self) -> ProbingState {
        self.state
    }

    fn confidence(&self) -> f32 {
        if self.state == ProbingState::NotMe || self.high == 0 {
            return 0.0;
        }
        let adjacency = self.high_after_high as f32 / self.high as f32;
        LATIN_CONFIDENCE_CAP * (1.0 - adjacency)
    }
}
