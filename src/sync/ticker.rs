//! 与媒体时钟绑定的逐帧回调。
//!
//! 宿主在自己的帧循环里调用 [`PlaybackTicker::on_frame`]；
//! 只有在媒体播放期间（`Play`/`Playing` 之后、`Pause`/`Ended` 之前）才会真正回调。

use tracing::trace;

use crate::sync::media::{MediaEvent, MediaPort};

/// 记录是否应当轮询播放位置。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollingGate {
    running: bool,
}

impl PollingGate {
    #[must_use]
    pub const fn is_running(self) -> bool {
        self.running
    }

    /// 根据媒体事件开启或关闭轮询，返回事件处理后的状态。
    pub fn apply(&mut self, event: MediaEvent, media: &impl MediaPort) -> bool {
        let was_running = self.running;
        match event {
            MediaEvent::Play | MediaEvent::Playing => self.running = true,
            MediaEvent::Pause | MediaEvent::Ended => self.running = false,
            MediaEvent::Seeked if media.is_paused() => self.running = false,
            MediaEvent::Seeked | MediaEvent::TimeUpdate | MediaEvent::DurationKnown(_) => {}
        }
        if was_running != self.running {
            trace!("轮询{}", if self.running { "开始" } else { "停止" });
        }
        self.running
    }

    pub const fn stop(&mut self) {
        self.running = false;
    }
}

/// 播放期间每帧以当前播放位置调用 `on_tick`。
pub struct PlaybackTicker<F: FnMut(f64)> {
    gate: PollingGate,
    on_tick: F,
}

impl<F: FnMut(f64)> PlaybackTicker<F> {
    /// 绑定回调。初始状态为停止。
    pub fn attach(on_tick: F) -> Self {
        Self {
            gate: PollingGate::default(),
            on_tick,
        }
    }

    pub fn handle_event(&mut self, event: MediaEvent, media: &impl MediaPort) {
        self.gate.apply(event, media);
    }

    /// 宿主的一帧。运行中时回调一次并返回 `true`。
    pub fn on_frame(&mut self, media: &impl MediaPort) -> bool {
        if !self.gate.is_running() {
            return false;
        }
        (self.on_tick)(media.current_time());
        true
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.gate.is_running()
    }

    /// 立即停止，不等待媒体事件。
    pub const fn cancel(&mut self) {
        self.gate.stop();
    }
}
