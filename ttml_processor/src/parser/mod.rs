//! # TTML (Timed Text Markup Language) 解析器
//!
//! 读取逐行 TTML（`<p begin end>文本</p>`）与逐字 TTML（`<p>` 内的 `<span>`）。
//! 只关心 `<p>` 与 `<span>`，其余元素只参与结构校验。

mod constants;
mod state;
mod utils;

use quick_xml::{Reader, events::Event};
use tracing::{debug, error, warn};

use self::{
    constants::{ATTR_BEGIN, ATTR_END, TAG_P, TAG_SPAN},
    state::{ParagraphData, ReaderState, SpanData},
    utils::{collect_attributes, decode_entity, get_string_attribute},
};
use lyric_sync_core::{
    ConvertError, LineTiming, LyricFormat, ParsedLyrics, SyncedLine, TimedWord, WordLine,
    time::{parse_time_to_seconds, parse_ttml_clock_time},
};

/// 解析逐行 TTML 文件。
///
/// 每个 `<p>` 元素生成一行：`begin`/`end` 属性按 `hh:mm:ss.ms` 解析，
/// 文本为元素内全部文本（包括嵌套的 span 与实体）去除首尾空白后的结果。
/// 缺失或无法解析的时间视为未设置。
///
/// # Errors
///
/// * `ConvertError::Xml` - 输入不是有效的 XML
/// * `ConvertError::MalformedXml` - 文档中没有任何元素，或存在未闭合的元素
pub fn parse_ttml(content: &str) -> Result<ParsedLyrics, ConvertError> {
    let mut warnings = Vec::new();
    let paragraphs = read_paragraphs(content, &mut warnings)?;

    let lines: Vec<SyncedLine> = paragraphs
        .into_iter()
        .enumerate()
        .map(|(index, p)| {
            let begin = read_clock_attribute(&p, ATTR_BEGIN, index, &mut warnings);
            let end = read_clock_attribute(&p, ATTR_END, index, &mut warnings);
            SyncedLine::new(p.text.trim()).with_timing(LineTiming::from_bounds(begin, end))
        })
        .collect();

    debug!("TTML 解析完成，共 {} 行", lines.len());

    Ok(ParsedLyrics {
        lines,
        source_format: LyricFormat::Ttml,
        warnings,
    })
}

/// 解析逐字 TTML 文件，保留每个 `<p>` 的属性。
///
/// `<p>` 中直接包含的每个非空 `<span>` 成为一个单词。
/// 没有 span 的 `<p>` 按空白拆分为单词，时间均为未设置（0）。
///
/// # Errors
///
/// 与 [`parse_ttml`] 相同。
pub fn parse_ttml_word_lines(content: &str) -> Result<Vec<WordLine>, ConvertError> {
    let mut warnings = Vec::new();
    let paragraphs = read_paragraphs(content, &mut warnings)?;

    let lines = paragraphs
        .into_iter()
        .map(|p| {
            let words = if p.spans.is_empty() {
                p.text.split_whitespace().map(TimedWord::new).collect()
            } else {
                p.spans.iter().filter_map(span_to_word).collect()
            };
            WordLine {
                attributes: p.attributes,
                words,
            }
        })
        .collect();

    Ok(lines)
}

fn span_to_word(span: &SpanData) -> Option<TimedWord> {
    let text = span.text.trim();
    if text.is_empty() {
        return None;
    }
    let parse = |value: Option<&str>| value.and_then(parse_time_to_seconds).unwrap_or(0.0);
    Some(TimedWord {
        text: text.to_string(),
        begin: parse(span.begin.as_deref()),
        end: parse(span.end.as_deref()),
    })
}

fn read_clock_attribute(
    p: &ParagraphData,
    name: &str,
    index: usize,
    warnings: &mut Vec<String>,
) -> Option<f64> {
    let raw = p.attribute(name)?;
    let parsed = parse_ttml_clock_time(raw);
    if parsed.is_none() {
        warn!("第 {} 行的 {name} 时间 '{raw}' 无法解析，已忽略", index + 1);
        warnings.push(format!(
            "第 {} 行的 {name} 时间 '{raw}' 无法解析，已忽略",
            index + 1
        ));
    }
    parsed
}

/// 流式读取文档，收集所有 `<p>` 元素。
///
/// 嵌套在 `<p>` 内的 `<p>` 视为普通内容，只有最外层的 `<p>` 会生成段落。
fn read_paragraphs(
    content: &str,
    warnings: &mut Vec<String>,
) -> Result<Vec<ParagraphData>, ConvertError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);
    reader.config_mut().expand_empty_elements = true;

    let mut state = ReaderState::default();
    let mut buf = Vec::new();

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(e) => {
                error!(
                    "TTML 解析错误，位置 {}: {}。无法继续解析",
                    reader.error_position(),
                    e
                );
                return Err(ConvertError::Xml(e));
            }
        };

        match &event {
            Event::Start(e) => {
                state.depth += 1;
                state.saw_element = true;
                match e.local_name().as_ref() {
                    TAG_P if state.current_p.is_none() => {
                        let p_data = ParagraphData {
                            attributes: collect_attributes(e, &reader)?,
                            ..Default::default()
                        };
                        state.current_p = Some((p_data, state.depth));
                        state.span_depth = 0;
                    }
                    TAG_SPAN if state.current_p.is_some() => {
                        state.span_depth += 1;
                        if state.span_depth == 1 {
                            let span = SpanData {
                                begin: get_string_attribute(e, &reader, ATTR_BEGIN)?,
                                end: get_string_attribute(e, &reader, ATTR_END)?,
                                text: String::new(),
                            };
                            if let Some((p_data, _)) = state.current_p.as_mut() {
                                p_data.spans.push(span);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == TAG_SPAN && state.span_depth > 0 {
                    state.span_depth -= 1;
                }
                let closes_p = state
                    .current_p
                    .as_ref()
                    .is_some_and(|(_, depth)| *depth == state.depth);
                if closes_p && let Some((p_data, _)) = state.current_p.take() {
                    state.paragraphs.push(p_data);
                    state.span_depth = 0;
                }
                state.depth = state.depth.saturating_sub(1);
            }
            Event::Text(e) => {
                let text = e.xml_content()?;
                state.push_text(&text);
            }
            Event::CData(e) => {
                let text = reader.decoder().decode(e.as_ref())?;
                state.push_text(&text);
            }
            Event::GeneralRef(e) => {
                if let Some(ch) = decode_entity(e, warnings)? {
                    state.push_text(ch.encode_utf8(&mut [0; 4]));
                }
            }
            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    if !state.saw_element {
        return Err(ConvertError::MalformedXml("文档中没有任何元素".to_string()));
    }
    if state.depth != 0 || state.current_p.is_some() {
        return Err(ConvertError::MalformedXml(format!(
            "文档结束时仍有 {} 个元素未闭合",
            state.depth
        )));
    }

    Ok(state.paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("时间应已设置");
        assert!((actual - expected).abs() < 1e-9, "期望 {expected}，实际 {actual}");
    }

    #[test]
    fn test_parse_line_ttml() {
        let content = r#"<?xml version="1.0" encoding="UTF-8"?>
<tt xmlns="http://www.w3.org/ns/ttml">
  <body>
    <div>
      <p begin="00:00:01.00" end="00:00:02.50">Hello</p>
      <p begin="00:00:03.00" end="00:00:04.20">  World  </p>
    </div>
  </body>
</tt>"#;
        let parsed = parse_ttml(content).unwrap();
        assert_eq!(parsed.source_format, LyricFormat::Ttml);
        assert_eq!(parsed.lines.len(), 2);
        assert_eq!(parsed.lines[0].text, "Hello");
        assert_close(parsed.lines[0].begin(), 1.0);
        assert_close(parsed.lines[0].end(), 2.5);
        assert_eq!(parsed.lines[1].text, "World");
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_entities_and_nested_spans_become_plain_text() {
        let content = r#"<tt><body><div><p begin="00:00:01.00" end="00:00:02.00"><span>Rock</span> &amp; <span>roll <span>&lt;3</span></span></p></div></body></tt>"#;
        let parsed = parse_ttml(content).unwrap();
        assert_eq!(parsed.lines[0].text, "Rock & roll <3");
    }

    #[test]
    fn test_missing_or_invalid_times_are_unset() {
        let content = r#"<tt><body><div>
            <p>No time</p>
            <p end="00:00:05.00">Only end</p>
            <p begin="1.5s" end="00:00:02.00">Offset</p>
        </div></body></tt>"#;
        let parsed = parse_ttml(content).unwrap();
        assert_eq!(parsed.lines[0].timing, LineTiming::Unsynced);
        assert_eq!(parsed.lines[1].timing, LineTiming::EndOnly(5.0));
        assert_eq!(parsed.lines[2].timing, LineTiming::EndOnly(2.0));
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_malformed_xml_is_error() {
        assert!(matches!(
            parse_ttml("<tt><body><p>Hello</span></body></tt>"),
            Err(ConvertError::Xml(_))
        ));
        assert!(parse_ttml("<tt><body><p>Hello</p>").is_err());
        assert!(matches!(
            parse_ttml("just text"),
            Err(ConvertError::MalformedXml(_))
        ));
    }

    #[test]
    fn test_unknown_entity_is_warned() {
        let parsed = parse_ttml("<tt><p>a&nbsp;b &#x4E2D;</p></tt>").unwrap();
        assert_eq!(parsed.lines[0].text, "ab 中");
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_parse_word_lines() {
        let content = r#"<tt><body><div>
<p begin="0:01.000" end="0:03.000" itunes:key="L1"><span begin="0:01.000" end="0:01.500">Hello</span> <span begin="0:01.500" end="0:03.000">world</span><span> </span></p>
<p>plain words here</p>
</div></body></tt>"#;
        let lines = parse_ttml_word_lines(content).unwrap();
        assert_eq!(lines.len(), 2);

        let first = &lines[0];
        assert_eq!(
            first.attributes,
            vec![
                ("begin".to_string(), "0:01.000".to_string()),
                ("end".to_string(), "0:03.000".to_string()),
                ("itunes:key".to_string(), "L1".to_string()),
            ]
        );
        assert_eq!(first.words.len(), 2);
        assert_eq!(first.words[1].text, "world");
        assert!((first.words[1].begin - 1.5).abs() < 1e-9);
        assert!((first.words[1].end - 3.0).abs() < 1e-9);

        let second = &lines[1];
        assert_eq!(second.text(), "plain words here");
        assert!(second.words.iter().all(|w| !w.has_begin()));
    }
}
