//! # TTML 生成器 - 工具函数模块

use quick_xml::{escape::partial_escape, events::BytesText};

/// 只转义 `<`、`>` 与 `&` 的文本节点，引号保持原样。
pub(super) fn text_node(text: &str) -> BytesText<'_> {
    BytesText::from_escaped(partial_escape(text))
}

/// 合并连续空白为单个空格，并去除首尾空白。
pub(super) fn normalize_text_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
