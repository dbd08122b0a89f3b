//! 通用编码检测器
//!
//! 处理顺序：
//! 1. BOM 嗅探（绝对优先，命中即结束）
//! 2. 纯 ASCII 输入不做统计，只记录零字节分布（用于无 BOM 的 UTF-16/32）
//! 3. 出现高位字节后，按固定顺序把数据喂给各候选探测器；
//!    第一个越过置信度阈值的候选即为结论
//! 4. `finalize` 时在存活候选中取置信度最高者（并列时取靠前者）
use tracing::debug;

use crate::bom::{self, BomSniff, MAX_BOM_LEN};
use crate::detector::EncodingDetector;
use crate::encoding::{DetectionResult, Encoding};
use crate::prober::{Prober, ProbingState, MINIMUM_THRESHOLD};
use crate::prober_latin::LatinProber;
use crate::prober_mbcs::{MultiByteProber, BIG5, EUC_JP, EUC_KR, GB2312, SHIFT_JIS};
use crate::prober_utf1632::{Utf1632Prober, UTF1632_CONFIDENCE};
use crate::prober_utf8::Utf8Prober;

pub struct UniversalDetector {
    /// 尚未完成 BOM 判定时缓存的文件头字节
    head: Vec<u8>,
    bom_resolved: bool,
    got_data: bool,
    /// 是否已出现 >= 0x80 的字节
    high_byte: bool,
    done: bool,
    /// 提前得出的结论（BOM 或越过阈值）
    early: Option<DetectionResult>,
    /// `finalize` 的缓存结果
    finalized: Option<DetectionResult>,
    utf1632: Utf1632Prober,
    /// 候选顺序即并列时的优先级
    probers: Vec<Box<dyn Prober>>,
}

impl UniversalDetector {
    pub fn new() -> Self {
        let probers: Vec<Box<dyn Prober>> = vec![
            Box::new(Utf8Prober::new()),
            Box::new(MultiByteProber::new(&SHIFT_JIS)),
            Box::new(MultiByteProber::new(&EUC_KR)),
            Box::new(MultiByteProber::new(&EUC_JP)),
            Box::new(MultiByteProber::new(&GB2312)),
            Box::new(MultiByteProber::new(&BIG5)),
            Box::new(LatinProber::new()),
        ];
        Self {
            head: Vec::with_capacity(MAX_BOM_LEN),
            bom_resolved: false,
            got_data: false,
            high_byte: false,
            done: false,
            early: None,
            finalized: None,
            utf1632: Utf1632Prober::new(),
            probers,
        }
    }

    fn conclude(&mut self, result: DetectionResult) {
        debug!(encoding = ?result.encoding, confidence = result.confidence, "detection concluded early");
        self.early = Some(result);
        self.done = true;
    }

    /// 把已缓存的文件头交给统计阶段，保留缓冲区的分配
    fn release_head(&mut self) {
        self.bom_resolved = true;
        let mut head = std::mem::take(&mut self.head);
        self.consume(&head);
        head.clear();
        self.head = head;
    }

    fn consume(&mut self, bytes: &[u8]) {
        self.utf1632.feed(bytes);
        if !self.high_byte {
            if !bytes.iter().any(|&b| b >= 0x80) {
                return;
            }
            self.high_byte = true;
        }
        let found = self.probers.iter_mut().find_map(|p| {
            (p.feed(bytes) == ProbingState::FoundIt)
                .then(|| DetectionResult { encoding: Some(p.encoding()), confidence: p.confidence() })
        });
        if let Some(result) = found {
            self.conclude(result);
        }
    }

    fn compute_final(&mut self) -> DetectionResult {
        if !self.got_data {
            return DetectionResult::unknown();
        }
        if let Some(result) = self.early {
            return result;
        }
        if !self.bom_resolved {
            // 输入在 BOM 判定前就结束了（文件极短）
            if let Some(enc) = bom::sniff_final(&self.head) {
                return DetectionResult::certain(enc);
            }
            self.release_head();
            if let Some(result) = self.early {
                return result;
            }
        }
        if let Some(enc) = self.utf1632.guess() {
            return DetectionResult { encoding: Some(enc), confidence: UTF1632_CONFIDENCE };
        }
        if !self.high_byte {
            // 7 位 ASCII 是 UTF-8 的子集
            return DetectionResult::certain(Encoding::Utf8);
        }

        let mut best: Option<DetectionResult> = None;
        for p in self.probers.iter_mut() {
            p.finish();
            if p.state() == ProbingState::NotMe {
                continue;
            }
            let confidence = p.confidence();
            if best.map_or(true, |b| confidence > b.confidence) {
                best = Some(DetectionResult { encoding: Some(p.encoding()), confidence });
            }
        }
        match best {
            Some(result) if result.confidence > MINIMUM_THRESHOLD => result,
            _ => DetectionResult::unknown(),
        }
    }
}

impl Default for UniversalDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodingDetector for UniversalDetector {
    fn reset(&mut self) {
        self.head.clear();
        self.bom_resolved = false;
        self.got_data = false;
        self.high_byte = false;
        self.done = false;
        self.early = None;
        self.finalized = None;
        self.utf1632.reset();
        for p in self.probers.iter_mut() {
            p.reset();
        }
    }

    fn feed(&mut self, chunk: &[u8]) {
        if self.done || self.finalized.is_some() || chunk.is_empty() {
            return;
        }
        self.got_data = true;

        if self.bom_resolved {
            self.consume(chunk);
            return;
        }
        self.head.extend_from_slice(chunk);
        match bom::sniff(&self.head) {
            BomSniff::NeedMore => {}
            BomSniff::Found(enc) => self.conclude(DetectionResult::certain(enc)),
            BomSniff::Absent => self.release_head(),
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn finalize(&mut self) -> DetectionResult {
        if let Some(result) = self.finalized {
            return result;
        }
        let result = self.compute_final();
        debug!(encoding = ?result.encoding, confidence = result.confidence, "detection finalized");
        self.finalized = Some(result);
        result
    }

    fn close(&mut self) {
        self.reset();
        self.head = Vec::new();
        debug!("detector closed");
    }
}
