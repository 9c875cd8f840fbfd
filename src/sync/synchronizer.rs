//! # 逐行打轴
//!
//! 一个游标（当前行）加上"点击标记"的状态机：
//! 每行第一次标记写入开始时间，第二次写入结束时间并把游标移到下一个非空行。
//! 微调在相邻行之间保持最小间隔，并在调整后试听对应片段。

use tracing::{debug, info, trace};

use crate::error::Result;
use crate::store::{EditFocus, LineStore};
use crate::sync::media::{MediaEvent, MediaPort};
use crate::sync::segment::SegmentPlayer;
use lyric_sync_core::{
    SyncOptions, SyncPhase, SyncedLine,
    time::{parse_time_to_seconds, round_millis},
};

/// 比较毫秒精度的时间时使用的容差。
const MILLIS_EPSILON: f64 = 1e-6;

/// 一次标记的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// 写入了开始时间
    BeginMarked,
    /// 写入了结束时间；`advanced_to` 为游标移动到的行
    EndMarked { advanced_to: Option<usize> },
    /// 没有任何改动（空行、越界，或结束时间不晚于开始时间）
    Ignored,
}

/// 微调的对象。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeBound {
    Begin,
    End,
}

/// 逐行打轴的状态。
#[derive(Debug, Clone, Default)]
pub struct Synchronizer {
    active_index: usize,
    options: SyncOptions,
    segment: SegmentPlayer,
}

impl Synchronizer {
    #[must_use]
    pub fn new(options: SyncOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    #[must_use]
    pub const fn active_index(&self) -> usize {
        self.active_index
    }

    #[must_use]
    pub const fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: SyncOptions) {
        self.options = options;
    }

    #[must_use]
    pub const fn segment(&self) -> &SegmentPlayer {
        &self.segment
    }

    /// 当前行的打轴阶段，存储为空时为 `None`。
    #[must_use]
    pub fn phase(&self, store: &LineStore) -> Option<SyncPhase> {
        store.get(self.active_index).map(SyncedLine::phase)
    }

    /// 在时间 `at` 标记当前行。
    pub fn mark(&mut self, store: &mut LineStore, at: f64) -> MarkOutcome {
        let index = self.active_index;
        let gap = self.options.min_gap_secs;
        let enforce_gaps = self.options.enforce_gaps_on_mark;
        let previous_end = store.previous_end(index);
        let next_begin = store.next_begin(index);
        let next_non_empty = store.next_non_empty(index);

        let Some(line) = store.get_mut(index) else {
            return MarkOutcome::Ignored;
        };
        if line.is_blank() {
            trace!("第 {index} 行为空，忽略标记");
            return MarkOutcome::Ignored;
        }

        match line.phase() {
            SyncPhase::AwaitingBegin => {
                let mut begin = at.max(0.0);
                if enforce_gaps && let Some(previous_end) = previous_end {
                    begin = begin.max(previous_end + gap);
                }
                line.mark_begin(begin);
                debug!("第 {index} 行开始于 {begin:.3}");
                MarkOutcome::BeginMarked
            }
            SyncPhase::AwaitingEnd => {
                let mut end = at;
                if enforce_gaps {
                    if let Some(next_begin) = next_begin {
                        end = end.min(next_begin - gap);
                    }
                    if line.begin().is_some_and(|begin| end < begin + gap) {
                        trace!("第 {index} 行的结束时间与开始时间间隔不足，忽略标记");
                        return MarkOutcome::Ignored;
                    }
                }
                if !line.mark_end(end) {
                    trace!("第 {index} 行的结束时间 {end:.3} 不晚于开始时间，忽略标记");
                    return MarkOutcome::Ignored;
                }
                debug!("第 {index} 行结束于 {end:.3}");
                if let Some(next) = next_non_empty {
                    self.active_index = next;
                }
                MarkOutcome::EndMarked {
                    advanced_to: next_non_empty,
                }
            }
        }
    }

    /// 在当前播放位置标记当前行。
    pub fn mark_at_playhead(&mut self, store: &mut LineStore, media: &impl MediaPort) -> MarkOutcome {
        self.mark(store, media.current_time())
    }

    /// 把时间限制在合法范围内：不小于 0，与本行另一端及相邻行保持最小间隔。
    ///
    /// 上下限互相矛盾（相邻行之间已经放不下）时返回 `None`。
    fn clamp_bound(&self, store: &LineStore, index: usize, bound: NudgeBound, value: f64) -> Option<f64> {
        let gap = self.options.min_gap_secs;
        let line = store.get(index)?;

        let (lower, upper) = match bound {
            NudgeBound::Begin => (
                store.previous_end(index).map_or(0.0, |previous_end| previous_end + gap),
                line.end().map(|end| end - gap),
            ),
            NudgeBound::End => (
                line.begin().map_or(0.0, |begin| begin + gap),
                store.next_begin(index).map(|next_begin| next_begin - gap),
            ),
        };
        let lower = lower.max(0.0);
        if let Some(upper) = upper
            && upper < lower - MILLIS_EPSILON
        {
            trace!("第 {index} 行 {bound:?} 没有可用的范围（{lower:.3} > {upper:.3}）");
            return None;
        }

        let mut value = value.max(lower);
        if let Some(upper) = upper {
            value = value.min(upper);
        }
        Some(round_millis(value))
    }

    /// 写入限制后的时间，返回是否有改动。
    fn commit_bound(store: &mut LineStore, index: usize, bound: NudgeBound, value: f64) -> bool {
        let Some(line) = store.get_mut(index) else {
            return false;
        };
        let original = match bound {
            NudgeBound::Begin => line.begin(),
            NudgeBound::End => line.end(),
        };
        if original.is_some_and(|original| (round_millis(original) - value).abs() < MILLIS_EPSILON) {
            return false;
        }
        match bound {
            NudgeBound::Begin => line.set_begin(Some(value)),
            NudgeBound::End => line.set_end(Some(value)),
        }
        true
    }

    /// 试听微调后的片段。
    ///
    /// 开始时间：从新的开始时间播放到本行结束；结束时间：从新的结束时间播放到下一行开始或音频结尾。
    fn audition_bound(
        &mut self,
        store: &LineStore,
        index: usize,
        bound: NudgeBound,
        at: f64,
        original_end: Option<f64>,
        media: &mut impl MediaPort,
    ) -> Result<()> {
        let stop = match bound {
            NudgeBound::Begin => original_end.filter(|&end| at < end),
            NudgeBound::End => store.next_begin(index).or_else(|| media.duration()),
        };
        self.segment.play_segment(media, at, stop)
    }

    /// 把第 `index` 行的开始或结束时间调整 `delta` 秒，然后试听。
    ///
    /// 游标移到该行。空行或对应的时间尚未设置时不做任何事，返回 `Ok(None)`；
    /// 否则返回调整后的时间（可能因限制而与原值相同）。相邻行之间已经放不下最小间隔时不修改。
    pub fn nudge(
        &mut self,
        store: &mut LineStore,
        index: usize,
        bound: NudgeBound,
        delta: f64,
        media: &mut impl MediaPort,
    ) -> Result<Option<f64>> {
        let Some(line) = store.get(index) else {
            return Ok(None);
        };
        if line.is_blank() {
            trace!("第 {index} 行为空，忽略微调");
            return Ok(None);
        }
        self.active_index = index;

        let original_end = line.end();
        let original = match bound {
            NudgeBound::Begin => line.begin(),
            NudgeBound::End => original_end,
        };
        let Some(original) = original else {
            return Ok(None);
        };

        let candidate = original + delta;
        if candidate.is_nan() {
            return Ok(None);
        }
        let adjusted = match self.clamp_bound(store, index, bound, candidate) {
            Some(adjusted) => {
                if Self::commit_bound(store, index, bound, adjusted) {
                    debug!("第 {index} 行 {bound:?} 调整为 {adjusted:.3}");
                }
                adjusted
            }
            None => original,
        };

        self.audition_bound(store, index, bound, adjusted, original_end, media)?;
        Ok(Some(adjusted))
    }

    /// 按配置的步长微调。`forward` 为 `true` 时向后。
    pub fn nudge_step(
        &mut self,
        store: &mut LineStore,
        index: usize,
        bound: NudgeBound,
        forward: bool,
        media: &mut impl MediaPort,
    ) -> Result<Option<f64>> {
        let step = self.options.nudge_step_secs;
        let delta = if forward { step } else { -step };
        self.nudge(store, index, bound, delta, media)
    }

    /// 手动输入时间。无法解析的输入、空行或无法满足间隔限制时不做任何事。
    ///
    /// 输入的时间与微调一样受间隔限制。
    pub fn set_time_text(
        &mut self,
        store: &mut LineStore,
        index: usize,
        bound: NudgeBound,
        text: &str,
    ) -> Option<f64> {
        let Some(value) = parse_time_to_seconds(text) else {
            trace!("无法解析时间输入 '{text}'");
            return None;
        };
        if store.get(index)?.is_blank() {
            trace!("第 {index} 行为空，忽略时间输入");
            return None;
        }
        self.active_index = index;

        let adjusted = self.clamp_bound(store, index, bound, value)?;
        Self::commit_bound(store, index, bound, adjusted);
        Some(adjusted)
    }

    /// 游标上移一行。
    pub const fn move_up(&mut self) {
        self.active_index = self.active_index.saturating_sub(1);
    }

    /// 游标下移一行，不越过最后一行。
    pub const fn move_down(&mut self, store: &LineStore) {
        if self.active_index + 1 < store.len() {
            self.active_index += 1;
        }
    }

    /// 游标跳到指定行（例如跳转到格式问题），越界时不动。
    pub const fn go_to_line(&mut self, store: &LineStore, index: usize) {
        if index < store.len() {
            self.active_index = index;
        }
    }

    /// 选中一行并试听 `[begin, end]`。没有开始时间时只移动游标。
    pub fn select_line(
        &mut self,
        store: &LineStore,
        index: usize,
        media: &mut impl MediaPort,
    ) -> Result<()> {
        let Some(line) = store.get(index) else {
            return Ok(());
        };
        self.active_index = index;
        match line.begin() {
            Some(begin) => self.segment.play_segment(media, begin, line.end()),
            None => Ok(()),
        }
    }

    /// 从某行的结束时间播放到下一行开始（或音频结尾）。
    pub fn play_from_end(
        &mut self,
        store: &LineStore,
        index: usize,
        media: &mut impl MediaPort,
    ) -> Result<()> {
        let Some(line) = store.get(index) else {
            return Ok(());
        };
        self.active_index = index;
        let Some(end) = line.end() else {
            return Ok(());
        };
        let stop = store.next_begin(index).or_else(|| media.duration());
        self.segment.play_segment(media, end, stop)
    }

    /// 外部修改存储后，确保游标仍在范围内。
    pub const fn clamp_to_len(&mut self, store: &LineStore) {
        let len = store.len();
        if self.active_index >= len {
            self.active_index = len.saturating_sub(1);
        }
    }

    /// 拆分一行，游标移到新行。
    pub fn split_line(
        &mut self,
        store: &mut LineStore,
        index: usize,
        cursor: usize,
    ) -> Option<EditFocus> {
        let focus = store.split_line(index, cursor)?;
        self.active_index = focus.line_index;
        Some(focus)
    }

    /// 把一行合并到上一行，游标移到上一行。
    pub fn merge_into_previous(&mut self, store: &mut LineStore, index: usize) -> Option<EditFocus> {
        let focus = store.merge_into_previous(index)?;
        self.active_index = focus.line_index;
        Some(focus)
    }

    /// 重置游标与片段状态。
    pub fn reset(&mut self) {
        self.active_index = 0;
        self.segment = SegmentPlayer::new();
        info!("打轴状态已重置");
    }

    /// 把媒体事件交给片段播放器。
    pub fn handle_media_event(&mut self, event: MediaEvent, media: &mut impl MediaPort) {
        self.segment.handle_event(event, media);
    }
}
