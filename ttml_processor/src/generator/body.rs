//! # TTML 生成器 - Body 处理模块
//!
//! 写入 `<div>` 中的 `<p>` 元素，逐行或逐字。

use lyric_sync_core::{
    ConvertError, SyncedLine, WordLine,
    time::{format_precise_time, format_ttml_time},
};
use quick_xml::{
    Writer,
    events::{BytesText, Event},
};
use tracing::trace;

use super::utils::{normalize_text_whitespace, text_node};

/// 写入逐行歌词。只有开始与结束时间都已设置的行才会输出。
pub(super) fn write_line_paragraphs<W: std::io::Write>(
    writer: &mut Writer<W>,
    lines: &[SyncedLine],
) -> Result<(), ConvertError> {
    for line in lines {
        let (Some(begin), Some(end)) = (line.begin(), line.end()) else {
            trace!("跳过未完成打轴的行 {}", line.id);
            continue;
        };

        writer
            .create_element("p")
            .with_attribute(("begin", format_ttml_time(begin).as_str()))
            .with_attribute(("end", format_ttml_time(end).as_str()))
            .write_text_content(text_node(&line.text))?;
    }
    Ok(())
}

/// 写入逐字歌词：`<p>` 保留原属性，每个单词一个 `<span>`，单词之间以空格分隔。
pub(super) fn write_word_paragraphs<W: std::io::Write>(
    writer: &mut Writer<W>,
    lines: &[WordLine],
) -> Result<(), ConvertError> {
    for line in lines {
        let mut p_builder = writer.create_element("p");
        for (key, value) in &line.attributes {
            p_builder = p_builder.with_attribute((key.as_str(), value.as_str()));
        }

        p_builder.write_inner_content(|writer| {
            for (index, word) in line.words.iter().enumerate() {
                if index > 0 {
                    writer.write_event(Event::Text(BytesText::new(" ")))?;
                }
                writer
                    .create_element("span")
                    .with_attribute(("begin", format_precise_time(word.begin).as_str()))
                    .with_attribute(("end", format_precise_time(word.end).as_str()))
                    .write_text_content(text_node(&normalize_text_whitespace(&word.text)))?;
            }
            Ok(())
        })?;
    }
    Ok(())
}
