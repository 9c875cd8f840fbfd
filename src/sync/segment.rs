//! 片段试听：从某个位置开始播放，并在到达停止点时自动暂停。

use tracing::{debug, warn};

use crate::error::Result;
use crate::sync::media::{MediaEvent, MediaPort};

/// 记录当前片段的停止点。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SegmentPlayer {
    stop_at: Option<f64>,
}

impl SegmentPlayer {
    #[must_use]
    pub const fn new() -> Self {
        Self { stop_at: None }
    }

    /// 待执行的停止点。
    #[must_use]
    pub const fn stop_at(&self) -> Option<f64> {
        self.stop_at
    }

    /// 跳转到 `start` 并开始播放；`stop` 为 `None` 时一直播放下去。
    ///
    /// 播放失败时停止点被清除，错误返回给调用方。
    pub fn play_segment(
        &mut self,
        media: &mut impl MediaPort,
        start: f64,
        stop: Option<f64>,
    ) -> Result<()> {
        debug!("试听片段 {start:.3} -> {stop:?}");
        media.seek(start);
        self.stop_at = stop;
        if let Err(e) = media.play() {
            warn!("片段播放失败: {e}");
            self.stop_at = None;
            return Err(e);
        }
        Ok(())
    }

    /// 播放位置更新时调用：到达停止点则暂停并清除停止点。
    ///
    /// 返回是否因此暂停。
    pub fn on_time_update(&mut self, media: &mut impl MediaPort) -> bool {
        match self.stop_at {
            Some(stop) if media.current_time() >= stop => {
                self.stop_at = None;
                media.pause();
                true
            }
            _ => false,
        }
    }

    /// 任何暂停都会取消待执行的停止点。
    pub const fn on_pause(&mut self) {
        self.stop_at = None;
    }

    /// 处理一个媒体事件。
    pub fn handle_event(&mut self, event: MediaEvent, media: &mut impl MediaPort) {
        match event {
            MediaEvent::TimeUpdate => {
                self.on_time_update(media);
            }
            MediaEvent::Pause | MediaEvent::Ended => self.on_pause(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::media::SimulatedMedia;

    fn pump(player: &mut SegmentPlayer, media: &mut SimulatedMedia) {
        for event in media.drain_events() {
            player.handle_event(event, media);
        }
    }

    #[test]
    fn test_pauses_at_stop_target() {
        let mut media = SimulatedMedia::new(Some(60.0));
        let mut player = SegmentPlayer::new();
        player.play_segment(&mut media, 2.0, Some(3.0)).unwrap();
        pump(&mut player, &mut media);
        assert_eq!(player.stop_at(), Some(3.0));

        media.advance(0.5);
        pump(&mut player, &mut media);
        assert!(!media.is_paused());

        media.advance(0.6);
        pump(&mut player, &mut media);
        assert!(media.is_paused());
        assert_eq!(player.stop_at(), None);
    }

    #[test]
    fn test_manual_pause_clears_target() {
        let mut media = SimulatedMedia::new(None);
        let mut player = SegmentPlayer::new();
        player.play_segment(&mut media, 0.0, Some(5.0)).unwrap();

        media.pause();
        pump(&mut player, &mut media);
        assert_eq!(player.stop_at(), None);

        media.play().unwrap();
        media.advance(10.0);
        pump(&mut player, &mut media);
        assert!(!media.is_paused());
    }

    #[test]
    fn test_failed_play_clears_target() {
        let mut media = SimulatedMedia::new(None);
        media.set_reject_play(true);
        let mut player = SegmentPlayer::new();

        assert!(player.play_segment(&mut media, 1.0, Some(2.0)).is_err());
        assert_eq!(player.stop_at(), None);
        assert!((media.current_time() - 1.0).abs() < f64::EPSILON);
    }
}
