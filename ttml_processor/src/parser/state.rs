//! # TTML 解析器 - 状态定义
//!
//! 流式读取 XML 时使用的状态结构。

/// 一个 `<span>` 的内容与时间属性。
#[derive(Debug, Default, Clone)]
pub(super) struct SpanData {
    pub(super) begin: Option<String>,
    pub(super) end: Option<String>,
    pub(super) text: String,
}

/// 一个 `<p>` 元素解析出的原始数据，时间保持为字符串，由调用方决定如何解析。
#[derive(Debug, Default, Clone)]
pub(super) struct ParagraphData {
    /// `<p>` 上的所有属性（按出现顺序）。
    pub(super) attributes: Vec<(String, String)>,
    /// `<p>` 内全部文本，包括嵌套 span 中的文本。
    pub(super) text: String,
    /// `<p>` 直接包含的 span。
    pub(super) spans: Vec<SpanData>,
}

impl ParagraphData {
    pub(super) fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// 读取器的状态机。
#[derive(Debug, Default)]
pub(super) struct ReaderState {
    /// 当前元素嵌套深度。
    pub(super) depth: usize,
    /// 是否遇到过任何元素。
    pub(super) saw_element: bool,
    /// 正在读取的 `<p>`，以及它所在的深度。
    pub(super) current_p: Option<(ParagraphData, usize)>,
    /// 位于 `<p>` 内的 span 嵌套深度。
    pub(super) span_depth: usize,
    pub(super) paragraphs: Vec<ParagraphData>,
}

impl ReaderState {
    /// 追加文本到当前 `<p>`（以及当前最外层 span）。
    pub(super) fn push_text(&mut self, text: &str) {
        let span_depth = self.span_depth;
        if let Some((p_data, _)) = self.current_p.as_mut() {
            p_data.text.push_str(text);
            if span_depth > 0
                && let Some(span) = p_data.spans.last_mut()
            {
                span.text.push_str(text);
            }
        }
    }
}
