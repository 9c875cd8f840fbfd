//! 回放时的当前行跟踪。

use tracing::{debug, trace};

use crate::error::Result;
use crate::sync::media::{MediaEvent, MediaPort};
use crate::sync::ticker::PollingGate;
use lyric_sync_core::{LineId, SyncedLine};

/// 找到包含时间 `at` 的第一行（按数组顺序）。
#[must_use]
pub fn find_active_line(lines: &[SyncedLine], at: f64) -> Option<usize> {
    lines.iter().position(|line| line.contains_time(at))
}

/// 根据播放位置确定当前高亮的行。
#[derive(Debug, Clone, Default)]
pub struct ActiveLineTracker {
    active: Option<(LineId, usize)>,
    gate: PollingGate,
}

impl ActiveLineTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn active_id(&self) -> Option<&LineId> {
        self.active.as_ref().map(|(id, _)| id)
    }

    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.active.as_ref().map(|(_, index)| *index)
    }

    #[must_use]
    pub const fn is_polling(&self) -> bool {
        self.gate.is_running()
    }

    /// 用时间 `at` 重新计算当前行。只有行 ID 变化时才返回 `true`。
    pub fn update(&mut self, lines: &[SyncedLine], at: f64) -> bool {
        let resolved = find_active_line(lines, at).map(|index| (lines[index].id.clone(), index));
        let changed = self.active.as_ref().map(|(id, _)| id) != resolved.as_ref().map(|(id, _)| id);

        if changed {
            trace!("当前行变为 {:?}", resolved.as_ref().map(|(_, index)| index));
            self.active = resolved;
        } else if let (Some(active), Some((_, index))) = (self.active.as_mut(), resolved) {
            active.1 = index;
        }
        changed
    }

    /// 处理媒体事件，返回当前行是否变化。
    pub fn handle_event(
        &mut self,
        event: MediaEvent,
        lines: &[SyncedLine],
        media: &impl MediaPort,
    ) -> bool {
        self.gate.apply(event, media);
        match event {
            MediaEvent::Seeked | MediaEvent::TimeUpdate => self.update(lines, media.current_time()),
            _ => false,
        }
    }

    /// 宿主的一帧：轮询中时重新计算当前行。
    pub fn on_frame(&mut self, lines: &[SyncedLine], media: &impl MediaPort) -> bool {
        self.gate.is_running() && self.update(lines, media.current_time())
    }

    /// 跳转到某行的开始时间；暂停中时开始播放。
    pub fn seek_to_line(&mut self, line: &SyncedLine, media: &mut impl MediaPort) -> Result<()> {
        let Some(begin) = line.begin() else {
            return Ok(());
        };
        debug!("跳转到行 {} ({begin:.3})", line.id);
        media.seek(begin);
        if media.is_paused() {
            media.play()?;
        }
        Ok(())
    }

    /// 清除当前行并停止轮询。
    pub fn reset(&mut self) {
        self.active = None;
        self.gate.stop();
    }
}
