//! # Timed Text Markup Language 歌词格式生成器
//!
//! 生成的文档结构固定为 `<tt><body><div><p>…</p></div></body></tt>`。

mod body;
mod utils;

use std::io::Cursor;

use lyric_sync_core::{ConvertError, SyncedLine, TtmlGenerationOptions, WordLine};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesText, Event},
};
use tracing::debug;

const TTML_NAMESPACE: &str = "http://www.w3.org/ns/ttml";

/// 逐行 TTML 生成的主入口函数。
///
/// 每个开始与结束时间都已设置的行生成一个 `<p begin end>`，时间格式为 `hh:mm:ss.cc`。
/// 其余行不会出现在输出中。
///
/// # Errors
///
/// 如果在生成 XML 或将结果转换为字符串时发生错误，则会返回 `ConvertError`。
pub fn generate_ttml(
    lines: &[SyncedLine],
    options: &TtmlGenerationOptions,
) -> Result<String, ConvertError> {
    let timed = lines.iter().filter(|line| line.is_synced()).count();
    debug!("生成 TTML：{} 行中有 {timed} 行完成打轴", lines.len());

    write_document(options.format, options.indent_size, |writer| {
        body::write_line_paragraphs(writer, lines)
    })
}

/// 逐字 TTML 生成的主入口函数。
///
/// 输出总是紧凑的，避免缩进空白混入单词之间。
///
/// # Errors
///
/// 同 [`generate_ttml`]。
pub fn generate_word_ttml(lines: &[WordLine]) -> Result<String, ConvertError> {
    write_document(false, 0, |writer| body::write_word_paragraphs(writer, lines))
}

fn write_document<F>(format: bool, indent_size: usize, write_body: F) -> Result<String, ConvertError>
where
    F: Fn(&mut Writer<Cursor<&mut Vec<u8>>>) -> Result<(), ConvertError>,
{
    let mut buffer = Vec::new();

    let result = if format {
        let mut writer = Writer::new_with_indent(Cursor::new(&mut buffer), b' ', indent_size);
        write_document_inner(&mut writer, format, &write_body)
    } else {
        let mut writer = Writer::new(Cursor::new(&mut buffer));
        write_document_inner(&mut writer, format, &write_body)
    };

    result?;

    String::from_utf8(buffer).map_err(ConvertError::FromUtf8)
}

fn write_document_inner<F>(
    writer: &mut Writer<Cursor<&mut Vec<u8>>>,
    format: bool,
    write_body: &F,
) -> Result<(), ConvertError>
where
    F: Fn(&mut Writer<Cursor<&mut Vec<u8>>>) -> Result<(), ConvertError>,
{
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    if !format {
        writer.write_event(Event::Text(BytesText::new("\n")))?;
    }

    writer
        .create_element("tt")
        .with_attribute(("xmlns", TTML_NAMESPACE))
        .write_inner_content(|writer| {
            writer
                .create_element("body")
                .write_inner_content(|writer| {
                    writer
                        .create_element("div")
                        .write_inner_content(|writer| {
                            write_body(writer).map_err(std::io::Error::other)
                        })?;
                    Ok(())
                })?;
            Ok(())
        })?;
    Ok(())
}
