//! 逐字打轴使用的模型。

use serde::{Deserialize, Serialize};

/// 一个带时间的单词。时间为 0 表示尚未设置。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimedWord {
    pub text: String,
    pub begin: f64,
    pub end: f64,
}

impl TimedWord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// 开始时间是否已设置。
    #[must_use]
    pub fn has_begin(&self) -> bool {
        self.begin > 0.0
    }
}

/// 一个 `<p>` 段落：原始属性与组成它的单词。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WordLine {
    /// 原始 `<p>` 元素上的属性，生成时按原顺序写回。
    pub attributes: Vec<(String, String)>,
    pub words: Vec<TimedWord>,
}

impl WordLine {
    /// 以空格拼接的整行文本。
    #[must_use]
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
