//! 媒体端接口。
//!
//! 打轴引擎不直接播放音频，而是通过 [`MediaPort`] 读取播放位置并控制播放；
//! 宿主把媒体元素的事件转换为 [`MediaEvent`] 交给引擎。

use std::collections::VecDeque;

use tracing::trace;

use crate::error::{LyricSyncError, Result};

/// 宿主提供的媒体控制接口。时间单位为秒。
pub trait MediaPort {
    /// 当前播放位置。
    fn current_time(&self) -> f64;

    /// 跳转到指定位置。
    fn seek(&mut self, position: f64);

    /// 开始播放。宿主可能拒绝播放（例如浏览器的自动播放限制）。
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    /// 媒体总时长，元数据加载前为 `None`。
    fn duration(&self) -> Option<f64>;
}

/// 媒体元素产生的事件。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    /// 请求播放
    Play,
    /// 已开始播放
    Playing,
    Pause,
    /// 播放到结尾
    Ended,
    /// 跳转完成
    Seeked,
    /// 播放位置更新
    TimeUpdate,
    /// 元数据加载完成，得到总时长
    DurationKnown(f64),
}

/// 一个不输出声音的媒体实现，由调用方推动时钟。
///
/// 用于测试以及没有真实播放器的场景。每个操作都会像真实媒体元素一样
/// 产生相应的事件，调用方通过 [`SimulatedMedia::drain_events`] 取出。
#[derive(Debug, Clone, Default)]
pub struct SimulatedMedia {
    position: f64,
    duration: Option<f64>,
    paused: bool,
    ended: bool,
    reject_play: bool,
    events: VecDeque<MediaEvent>,
}

impl SimulatedMedia {
    #[must_use]
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            duration,
            paused: true,
            ..Default::default()
        }
    }

    /// 让后续的 [`MediaPort::play`] 调用失败。
    pub const fn set_reject_play(&mut self, reject: bool) {
        self.reject_play = reject;
    }

    /// 时钟前进 `dt` 秒。播放中才会移动；到达结尾时暂停并产生 `Ended`。
    pub fn advance(&mut self, dt: f64) {
        if self.paused {
            return;
        }
        self.position += dt.max(0.0);
        if let Some(duration) = self.duration
            && self.position >= duration
        {
            self.position = duration;
            self.paused = true;
            self.ended = true;
            self.events.push_back(MediaEvent::Ended);
            return;
        }
        self.events.push_back(MediaEvent::TimeUpdate);
    }

    /// 取出并清空事件队列。
    pub fn drain_events(&mut self) -> Vec<MediaEvent> {
        self.events.drain(..).collect()
    }

    #[must_use]
    pub const fn has_ended(&self) -> bool {
        self.ended
    }
}

impl MediaPort for SimulatedMedia {
    fn current_time(&self) -> f64 {
        self.position
    }

    fn seek(&mut self, position: f64) {
        let upper = self.duration.unwrap_or(f64::INFINITY);
        self.position = position.clamp(0.0, upper);
        self.ended = false;
        trace!("跳转到 {:.3}", self.position);
        self.events.push_back(MediaEvent::Seeked);
    }

    fn play(&mut self) -> Result<()> {
        if self.reject_play {
            return Err(LyricSyncError::Playback("播放被拒绝".to_string()));
        }
        if self.paused {
            self.paused = false;
            self.ended = false;
            self.events.push_back(MediaEvent::Play);
            self.events.push_back(MediaEvent::Playing);
        }
        Ok(())
    }

    fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.events.push_back(MediaEvent::Pause);
        }
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_only_moves_while_playing() {
        let mut media = SimulatedMedia::new(Some(10.0));
        media.advance(1.0);
        assert!(media.current_time().abs() < f64::EPSILON);

        media.play().unwrap();
        media.advance(1.5);
        assert!((media.current_time() - 1.5).abs() < f64::EPSILON);
        assert_eq!(
            media.drain_events(),
            vec![MediaEvent::Play, MediaEvent::Playing, MediaEvent::TimeUpdate]
        );
    }

    #[test]
    fn test_reaching_the_end_pauses() {
        let mut media = SimulatedMedia::new(Some(2.0));
        media.play().unwrap();
        media.drain_events();
        media.advance(5.0);

        assert!(media.is_paused());
        assert!(media.has_ended());
        assert!((media.current_time() - 2.0).abs() < f64::EPSILON);
        assert_eq!(media.drain_events(), vec![MediaEvent::Ended]);
    }

    #[test]
    fn test_rejected_play() {
        let mut media = SimulatedMedia::new(None);
        media.set_reject_play(true);
        assert!(matches!(media.play(), Err(LyricSyncError::Playback(_))));
        assert!(media.is_paused());
    }

    #[test]
    fn test_seek_is_clamped() {
        let mut media = SimulatedMedia::new(Some(3.0));
        media.seek(-1.0);
        assert!(media.current_time().abs() < f64::EPSILON);
        media.seek(7.0);
        assert!((media.current_time() - 3.0).abs() < f64::EPSILON);
        assert_eq!(media.drain_events(), vec![MediaEvent::Seeked, MediaEvent::Seeked]);
    }
}
