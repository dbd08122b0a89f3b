//! 多字节编码探测器（Shift_JIS / EUC-KR / EUC-JP / GB2312 / Big5）
//!
//! 每个编码由一个 `Scheme` 描述：
//! - 首字节分类：单字节字符 / 需要 N 个后续字节 / 非法
//! - 后续字节合法范围（非法即淘汰该候选）
//! - 字符分布分类：按首字节（及第一个后续字节）把字符归为常用 / 其他 / 中性（符号区）
//!
//! 置信度 = 常用字符占比（中性字符不计入分母），近似“与该语言语料的频率分布相似度”。
use crate::encoding::Encoding;
use crate::prober::{Prober, ProbingState, CONFIDENCE_THRESHOLD, SURE_NO, SURE_YES};

/// 常用字符数不超过该值时证据不足，置信度取 SURE_NO
const MINIMUM_DATA_THRESHOLD: u32 = 3;
/// 提前判定（FoundIt）所需的最少计数字符数
const MIN_CHARS_FOR_FOUND: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lead {
    /// 单字节字符（ASCII 或半角片假名等）
    Single,
    /// 多字节字符首字节，值为后续字节数
    Multi(u8),
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    Frequent,
    Other,
    /// 符号、全角字母等与语言无关的区段
    Neutral,
}

/// 后续字节为 ASCII 字母的双字节字符，与西欧文本里“高位标点/字母 + 单词”无法区分，不计入分布
fn is_letter_trail(trail: u8) -> bool {
    trail.is_ascii_alphabetic()
}

/// 编码方案描述
pub(crate) struct Scheme {
    pub(crate) encoding: Encoding,
    pub(crate) lead: fn(u8) -> Lead,
    /// (首字节, 后续字节) → 是否合法
    pub(crate) trail: fn(u8, u8) -> bool,
    /// (首字节, 第一个后续字节) → 分布分类
    pub(crate) classify: fn(u8, u8) -> CharClass,
}

pub(crate) static SHIFT_JIS: Scheme = Scheme {
    encoding: Encoding::ShiftJis,
    lead: |b| match b {
        0x00..=0x7F | 0xA1..=0xDF => Lead::Single,
        0x81..=0x9F | 0xE0..=0xFC => Lead::Multi(1),
        _ => Lead::Invalid,
    },
    trail: |_, b| matches!(b, 0x40..=0x7E | 0x80..=0xFC),
    classify: |lead, trail| match lead {
        _ if is_letter_trail(trail) => CharClass::Neutral,
        // 平假名 829F..82F1；同一行前半为全角数字/字母
        0x82 if trail >= 0x9F => CharClass::Frequent,
        // 片假名 8340..8396；之后为希腊字母
        0x83 if trail <= 0x96 => CharClass::Frequent,
        0x81..=0x84 | 0x87 => CharClass::Neutral,
        // 第一水准汉字
        0x88..=0x98 => CharClass::Frequent,
        _ => CharClass::Other,
    },
};

pub(crate) static EUC_KR: Scheme = Scheme {
    encoding: Encoding::EucKr,
    lead: |b| match b {
        0x00..=0x7F => Lead::Single,
        0xA1..=0xFE => Lead::Multi(1),
        _ => Lead::Invalid,
    },
    trail: |_, b| matches!(b, 0xA1..=0xFE),
    classify: |lead, _| match lead {
        // 韩文音节区
        0xB0..=0xC8 => CharClass::Frequent,
        0xA1..=0xA3 | 0xA6..=0xAF => CharClass::Neutral,
        _ => CharClass::Other,
    },
};

pub(crate) static EUC_JP: Scheme = Scheme {
    encoding: Encoding::EucJp,
    lead: |b| match b {
        0x00..=0x7F => Lead::Single,
        0x8E | 0xA1..=0xFE => Lead::Multi(1),
        // JIS X 0212 三字节
        0x8F => Lead::Multi(2),
        _ => Lead::Invalid,
    },
    trail: |lead, b| match lead {
        0x8E => matches!(b, 0xA1..=0xDF),
        _ => matches!(b, 0xA1..=0xFE),
    },
    classify: |lead, _| match lead {
        // 平假名 / 片假名 / 第一水准汉字
        0xA4 | 0xA5 | 0xB0..=0xCF => CharClass::Frequent,
        0x8E | 0xA1..=0xA3 | 0xA6..=0xA8 => CharClass::Neutral,
        _ => CharClass::Other,
    },
};

pub(crate) static GB2312: Scheme = Scheme {
    encoding: Encoding::Gb2312,
    lead: |b| match b {
        0x00..=0x7F => Lead::Single,
        0xA1..=0xF7 => Lead::Multi(1),
        _ => Lead::Invalid,
    },
    trail: |_, b| matches!(b, 0xA1..=0xFE),
    classify: |lead, _| match lead {
        // 一级汉字
        0xB0..=0xD7 => CharClass::Frequent,
        0xA1..=0xA3 | 0xA6..=0xA9 => CharClass::Neutral,
        _ => CharClass::Other,
    },
};

pub(crate) static BIG5: Scheme = Scheme {
    encoding: Encoding::Big5,
    lead: |b| match b {
        0x00..=0x7F => Lead::Single,
        0xA1..=0xF9 => Lead::Multi(1),
        _ => Lead::Invalid,
    },
    trail: |_, b| matches!(b, 0x40..=0x7E | 0xA1..=0xFE),
    classify: |lead, trail| match lead {
        _ if is_letter_trail(trail) => CharClass::Neutral,
        // 常用字 A440..C67E
        0xA4..=0xC6 => CharClass::Frequent,
        0xA1..=0xA3 => CharClass::Neutral,
        _ => CharClass::Other,
    },
};

pub(crate) struct MultiByteProber {
    scheme: &'static Scheme,
    state: ProbingState,
    lead: u8,
    first_trail: u8,
    /// 当前字符已读取的后续字节数
    seen: u8,
    remaining: u8,
    counted: u32,
    frequent: u32,
}

impl MultiByteProber {
    pub(crate) fn new(scheme: &'static Scheme) -> Self {
        Self {
            scheme,
            state: ProbingState::Detecting,
            lead: 0,
            first_trail: 0,
            seen: 0,
            remaining: 0,
            counted: 0,
            frequent: 0,
        }
    }

    fn record_char(&mut self) {
        match (self.scheme.classify)(self.lead, self.first_trail) {
            CharClass::Frequent => {
                self.counted += 1;
                self.frequent += 1;
            }
            CharClass::Other => self.counted += 1,
            CharClass::Neutral => {}
        }
    }
}

impl Prober for MultiByteProber {
    fn encoding(&self) -> Encoding {
        self.scheme.encoding
    }

    fn reset(&mut self) {
        *self = Self::new(self.scheme);
    }

    fn feed(&mut self, bytes: &[u8]) -> ProbingState {
        if self.state != ProbingState::Detecting {
            return self.state;
        }
        for &b in bytes {
            if self.remaining == 0 {
                match (self.scheme.lead)(b) {
                    Lead::Single => {}
                    Lead::Multi(n) => {
                        self.lead = b;
                        self.seen = 0;
                        self.remaining = n;
                    }
                    Lead::Invalid => {
                        self.state = ProbingState::NotMe;
                        return self.state;
                    }
                }
                continue;
            }
            if !(self.scheme.trail)(self.lead, b) {
                self.state = ProbingState::NotMe;
                return self.state;
            }
            if self.seen == 0 {
                self.first_trail = b;
            }
            self.seen += 1;
            self.remaining -= 1;
            if self.remaining == 0 {
                self.record_char();
            }
        }
        if self.counted >= MIN_CHARS_FOR_FOUND && self.confidence() >= CONFIDENCE_THRESHOLD {
            self.state = ProbingState::FoundIt;
        }
        self.state
    }

    fn state(&self) -> ProbingState {
        self.state
    }

    fn finish(&mut self) {
        if self.remaining > 0 {
            self.state = ProbingState::NotMe;
        }
    }

    fn confidence(&self) -> f32 {
        if self.state == ProbingState::NotMe {
            return 0.0;
        }
        if self.frequent <= MINIMUM_DATA_THRESHOLD {
            return SURE_NO;
        }
        SURE_YES * self.frequent as f32 / self.counted as f32
    }
}
