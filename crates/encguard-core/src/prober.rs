//! 候选编码探测器（内部使用）
use crate::encoding::Encoding;

/// 判定阈值：置信度达到该值即认为已确定编码（固定常量，不随文件变化）
pub const CONFIDENCE_THRESHOLD: f32 = 0.95;
/// 最终判定时的最低置信度，低于该值视为 unknown
pub const MINIMUM_THRESHOLD: f32 = 0.20;

pub(crate) const SURE_YES: f32 = 0.99;
pub(crate) const SURE_NO: f32 = 0.01;

/// 探测器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProbingState {
    /// 仍在收集证据
    Detecting,
    /// 置信度已越过阈值
    FoundIt,
    /// 出现非法字节序列，候选被淘汰
    NotMe,
}

/// 单个候选编码的增量探测器
/// `feed` 只处理新到达的字节，内部保存跨块的解析状态。
pub(crate) trait Prober {
    fn encoding(&self) -> Encoding;
    fn reset(&mut self);
    fn feed(&mut self, bytes: &[u8]) -> ProbingState;
    fn state(&self) -> ProbingState;
    fn confidence(&self) -> f32;
    /// 输入结束时调用：截断的多字节序列在此淘汰候选
    fn finish(&mut self) {}
}
