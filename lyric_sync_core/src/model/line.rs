//! 时间轴行模型。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 行的唯一标识符，在同一个行存储中唯一。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(String);

impl LineId {
    /// 生成一个新的随机 ID。
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LineId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for LineId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LineId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 一行的计时状态（单位：秒）。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LineTiming {
    /// 尚未打轴。
    #[default]
    Unsynced,
    /// 已标记开始时间，等待标记结束时间。
    BeginOnly(f64),
    /// 只有结束时间。只会出现在导入缺少 `begin` 的文件时。
    EndOnly(f64),
    /// 开始与结束时间都已确定。
    Synced {
        /// 开始时间
        begin: f64,
        /// 结束时间
        end: f64,
    },
}

impl LineTiming {
    /// 由可空的开始/结束时间构造计时状态。
    #[must_use]
    pub const fn from_bounds(begin: Option<f64>, end: Option<f64>) -> Self {
        match (begin, end) {
            (None, None) => Self::Unsynced,
            (Some(begin), None) => Self::BeginOnly(begin),
            (None, Some(end)) => Self::EndOnly(end),
            (Some(begin), Some(end)) => Self::Synced { begin, end },
        }
    }

    #[must_use]
    pub const fn begin(self) -> Option<f64> {
        match self {
            Self::BeginOnly(begin) | Self::Synced { begin, .. } => Some(begin),
            Self::Unsynced | Self::EndOnly(_) => None,
        }
    }

    #[must_use]
    pub const fn end(self) -> Option<f64> {
        match self {
            Self::EndOnly(end) | Self::Synced { end, .. } => Some(end),
            Self::Unsynced | Self::BeginOnly(_) => None,
        }
    }

    #[must_use]
    pub const fn is_synced(self) -> bool {
        matches!(self, Self::Synced { .. })
    }
}

/// 打轴操作在某一行上的阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// 下一次标记将写入开始时间。
    AwaitingBegin,
    /// 下一次标记将写入结束时间。
    AwaitingEnd,
}

/// 行的序列化形式：`{id, text, begin, end}`，时间可为 `null`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncedLineRecord {
    pub id: LineId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub begin: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
}

/// 一行歌词及其时间轴，是打轴的基本单位。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SyncedLineRecord", into = "SyncedLineRecord")]
pub struct SyncedLine {
    /// 行 ID
    pub id: LineId,
    /// 行文本，可以为空（空行表示间奏等有意留白）
    pub text: String,
    /// 计时状态
    pub timing: LineTiming,
}

impl From<SyncedLineRecord> for SyncedLine {
    fn from(record: SyncedLineRecord) -> Self {
        Self {
            id: record.id,
            text: record.text,
            timing: LineTiming::from_bounds(record.begin, record.end),
        }
    }
}

impl From<SyncedLine> for SyncedLineRecord {
    fn from(line: SyncedLine) -> Self {
        Self {
            begin: line.begin(),
            end: line.end(),
            id: line.id,
            text: line.text,
        }
    }
}

impl SyncedLine {
    /// 创建一个未打轴的新行。
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: LineId::new(),
            text: text.into(),
            timing: LineTiming::Unsynced,
        }
    }

    /// 使用给定 ID 创建一个未打轴的行。
    pub fn with_id(id: impl Into<LineId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            timing: LineTiming::Unsynced,
        }
    }

    /// 设置计时状态。
    #[must_use]
    pub const fn with_timing(mut self, timing: LineTiming) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub const fn begin(&self) -> Option<f64> {
        self.timing.begin()
    }

    #[must_use]
    pub const fn end(&self) -> Option<f64> {
        self.timing.end()
    }

    /// 文本去除首尾空白后是否为空。
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    #[must_use]
    pub const fn is_synced(&self) -> bool {
        self.timing.is_synced()
    }

    /// 当前行的打轴阶段。
    ///
    /// 仅当文本非空、已有开始时间且没有结束时间时处于 `AwaitingEnd`。
    #[must_use]
    pub fn phase(&self) -> SyncPhase {
        if !self.is_blank() && matches!(self.timing, LineTiming::BeginOnly(_)) {
            SyncPhase::AwaitingEnd
        } else {
            SyncPhase::AwaitingBegin
        }
    }

    /// 标记开始时间。旧的结束时间属于旧的开始时间，因此一并清除。
    pub const fn mark_begin(&mut self, at: f64) {
        self.timing = LineTiming::BeginOnly(at);
    }

    /// 标记结束时间。只有在已有开始时间且 `at` 晚于开始时间时才生效。
    pub fn mark_end(&mut self, at: f64) -> bool {
        match self.timing {
            LineTiming::BeginOnly(begin) if at > begin => {
                self.timing = LineTiming::Synced { begin, end: at };
                true
            }
            _ => false,
        }
    }

    /// 直接替换开始时间，保留结束时间。
    pub const fn set_begin(&mut self, begin: Option<f64>) {
        self.timing = LineTiming::from_bounds(begin, self.timing.end());
    }

    /// 直接替换结束时间，保留开始时间。
    pub const fn set_end(&mut self, end: Option<f64>) {
        self.timing = LineTiming::from_bounds(self.timing.begin(), end);
    }

    /// 时间 `at` 是否落在本行的半开区间 `[begin, end)` 内。
    #[must_use]
    pub fn contains_time(&self, at: f64) -> bool {
        match self.timing {
            LineTiming::Synced { begin, end } => at >= begin && at < end,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trip_keeps_nulls() {
        let line = SyncedLine::with_id("a", "Hello").with_timing(LineTiming::BeginOnly(1.5));
        let json = serde_json::to_string(&line).unwrap();
        assert_eq!(json, r#"{"id":"a","text":"Hello","begin":1.5,"end":null}"#);

        let back: SyncedLine = serde_json::from_str(&json).unwrap();
        assert_eq!(back, line);
    }

    #[test]
    fn test_record_missing_fields_default_to_unsynced() {
        let line: SyncedLine = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert_eq!(line.text, "");
        assert_eq!(line.timing, LineTiming::Unsynced);
    }

    #[test]
    fn test_phase_follows_timing() {
        let mut line = SyncedLine::new("Hello");
        assert_eq!(line.phase(), SyncPhase::AwaitingBegin);

        line.mark_begin(5.0);
        assert_eq!(line.phase(), SyncPhase::AwaitingEnd);

        assert!(!line.mark_end(5.0));
        assert!(line.mark_end(7.0));
        assert_eq!(line.timing, LineTiming::Synced { begin: 5.0, end: 7.0 });
        assert_eq!(line.phase(), SyncPhase::AwaitingBegin);

        line.mark_begin(6.0);
        assert_eq!(line.timing, LineTiming::BeginOnly(6.0));
    }

    #[test]
    fn test_blank_line_never_awaits_end() {
        let line = SyncedLine::new("   ").with_timing(LineTiming::BeginOnly(1.0));
        assert_eq!(line.phase(), SyncPhase::AwaitingBegin);
    }

    #[test]
    fn test_contains_time_is_half_open() {
        let line = SyncedLine::new("x").with_timing(LineTiming::Synced { begin: 1.0, end: 2.0 });
        assert!(line.contains_time(1.0));
        assert!(line.contains_time(1.999));
        assert!(!line.contains_time(2.0));
        assert!(!SyncedLine::new("y").contains_time(0.0));
    }
}
