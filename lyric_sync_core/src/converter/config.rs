use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// 打轴行为选项。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct SyncOptions {
    /// 行内以及相邻行之间必须保持的最小间隔（秒）。
    pub min_gap_secs: f64,
    /// 微调按钮每次调整的步长（秒）。
    pub nudge_step_secs: f64,
    /// 标记时是否也对相邻行做间隔限制。
    ///
    /// 默认关闭：标记结束时只检查本行的开始时间，微调时才检查相邻行。
    pub enforce_gaps_on_mark: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            min_gap_secs: 0.1,
            nudge_step_secs: 0.1,
            enforce_gaps_on_mark: false,
        }
    }
}

/// 输出文本使用的换行符。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`，兼容 Windows 播放器。
    CrLf,
}

impl LineEnding {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// LRC 生成选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct LrcGenerationOptions {
    /// 上一行结束与下一行开始之间的间隔超过该值（秒）时，插入一个静音标记。
    pub silence_threshold_secs: f64,
    /// 行之间使用的换行符。
    pub line_ending: LineEnding,
}

impl Default for LrcGenerationOptions {
    fn default() -> Self {
        Self {
            silence_threshold_secs: 13.0,
            line_ending: LineEnding::Lf,
        }
    }
}

/// LRC 转换为时间轴行时使用的选项。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct LrcParsingOptions {
    /// 最后一行之后没有任何时间码时，为其补上的时长（秒）。
    pub last_line_duration_secs: f64,
}

impl Default for LrcParsingOptions {
    fn default() -> Self {
        Self {
            last_line_duration_secs: 3.0,
        }
    }
}

/// TTML 生成选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct TtmlGenerationOptions {
    /// 是否输出带缩进的 TTML 文件。
    pub format: bool,
    /// 缩进使用的空格数。
    pub indent_size: usize,
}

impl Default for TtmlGenerationOptions {
    fn default() -> Self {
        Self {
            format: true,
            indent_size: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_falls_back_to_defaults() {
        let options = LrcGenerationOptionsBuilder::default()
            .line_ending(LineEnding::CrLf)
            .build()
            .unwrap();
        assert_eq!(options.line_ending, LineEnding::CrLf);
        assert!((options.silence_threshold_secs - 13.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_sync_options_deserialize() {
        let options: SyncOptions = serde_json::from_str(r#"{"min_gap_secs":0.2}"#).unwrap();
        assert!((options.min_gap_secs - 0.2).abs() < f64::EPSILON);
        assert!((options.nudge_step_secs - 0.1).abs() < f64::EPSILON);
        assert!(!options.enforce_gaps_on_mark);
    }
}
