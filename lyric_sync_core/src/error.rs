use std::{fmt, io};

use quick_xml::{encoding::EncodingError, events::attributes::AttrError};
use thiserror::Error;

/// 时间轴行在各歌词格式之间导入、导出时的错误。
#[derive(Error, Debug)]
pub enum ConvertError {
    /// 读取或写出 TTML 时 `quick-xml` 报告的错误。
    #[error("XML 错误: {0}")]
    Xml(#[from] quick_xml::Error),
    /// `<p>` 或 `<span>` 上的属性无法读取。
    #[error("XML 属性错误: {0}")]
    Attribute(#[from] AttrError),
    /// TTML 文档不完整，例如 `<p>` 没有闭合。
    #[error("XML 结构无效: {0}")]
    MalformedXml(String),
    /// 写出 LRC/TXT 文本时的格式化错误。
    #[error("格式错误: {0}")]
    Format(#[from] fmt::Error),
    #[error("错误: {0}")]
    Internal(String),
    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),
    /// 草稿字幕 JSON 无法解析或写出。
    #[error("解析 JSON 内容 {context} 失败: {source}")]
    JsonParse {
        #[source]
        source: serde_json::Error,
        /// 出错的是哪一份内容
        context: String,
    },
    /// 草稿字幕 JSON 缺少 `subtitles` 数组等必需的结构。
    #[error("JSON 结构无效: {0}")]
    InvalidJsonStructure(String),
    /// 生成的 TTML 字节不是合法的 UTF-8。
    #[error("UTF-8 转换错误: {0}")]
    FromUtf8(#[from] std::string::FromUtf8Error),
    /// 导入的内容中找不到任何可用的歌词行。
    #[error("无效的歌词格式: {0}")]
    InvalidLyricFormat(String),
    /// TTML 文本解码失败。
    #[error("文本编码或解码错误: {0}")]
    Encoding(#[from] EncodingError),
}

impl ConvertError {
    /// 创建一个 `JsonParse` 错误，`context` 说明正在处理的内容。
    #[must_use]
    pub fn json_parse(source: serde_json::Error, context: impl Into<String>) -> Self {
        Self::JsonParse {
            source,
            context: context.into(),
        }
    }
}
