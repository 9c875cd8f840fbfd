//! # 草稿字幕 JSON 转换
//!
//! 草稿字幕是形如 `{"subtitles": [{"text": "...", "time": 12.3}, ...]}` 的 JSON，
//! 其中 `"..."` 为占位行，`#INSTRUMENTAL` 表示间奏，`END` 表示结尾。
//! 除 `time` 外，其余字段在转换时原样保留。

use serde::Serialize;
use serde_json::{Value, json, ser::PrettyFormatter};
use tracing::{debug, info};

use crate::converter::parsers::lrc_parser::{LrcEntry, parse_lrc_entries};
use lyric_sync_core::{ConvertError, LrcGenerationOptions, time::format_lrc_time};

const PLACEHOLDER: &str = "...";
const INSTRUMENTAL: &str = "#INSTRUMENTAL";
const END_MARKER: &str = "END";

/// 草稿中一行字幕的类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubtitleKind {
    Lyric,
    Instrumental,
    End,
    Placeholder,
}

impl SubtitleKind {
    fn classify(subtitle: &Value) -> Self {
        let text = subtitle_text(subtitle).trim().to_uppercase();
        match text.as_str() {
            "" | PLACEHOLDER => Self::Placeholder,
            INSTRUMENTAL => Self::Instrumental,
            END_MARKER => Self::End,
            _ => Self::Lyric,
        }
    }
}

fn subtitle_text(subtitle: &Value) -> &str {
    subtitle.get("text").and_then(Value::as_str).unwrap_or("")
}

fn parse_draft(draft_json: &str) -> Result<Value, ConvertError> {
    let draft: Value =
        serde_json::from_str(draft_json).map_err(|e| ConvertError::json_parse(e, "草稿字幕"))?;
    if !draft.get("subtitles").is_some_and(Value::is_array) {
        return Err(ConvertError::InvalidJsonStructure(
            "草稿中找不到 'subtitles' 数组".to_string(),
        ));
    }
    Ok(draft)
}

/// 把草稿字幕转换为 LRC。
///
/// 只保留带数字 `time` 且文本不是 `...` 的字幕，按时间排序；
/// `#INSTRUMENTAL` 与 `END` 输出为只有时间的行。
pub fn draft_to_lrc(
    draft_json: &str,
    options: &LrcGenerationOptions,
) -> Result<String, ConvertError> {
    let draft = parse_draft(draft_json)?;
    let subtitles = draft
        .get("subtitles")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut timed: Vec<(f64, &str)> = subtitles
        .iter()
        .filter(|sub| subtitle_text(sub) != PLACEHOLDER)
        .filter_map(|sub| Some((sub.get("time")?.as_f64()?, sub)))
        .map(|(time, sub)| {
            let text = match SubtitleKind::classify(sub) {
                SubtitleKind::Instrumental | SubtitleKind::End => "",
                _ => subtitle_text(sub).trim(),
            };
            (time, text)
        })
        .collect();
    timed.sort_by(|a, b| a.0.total_cmp(&b.0));

    if timed.is_empty() {
        return Err(ConvertError::InvalidLyricFormat(
            "草稿中找不到可以转换的字幕".to_string(),
        ));
    }

    debug!("草稿转换为 LRC：{} 行", timed.len());
    Ok(timed
        .iter()
        .map(|(time, text)| format!("[{}]{text}", format_lrc_time(*time)))
        .collect::<Vec<_>>()
        .join(options.line_ending.as_str()))
}

/// 把 LRC 的时间按顺序写入草稿字幕，返回以 4 个空格缩进的 JSON。
///
/// 带文本的时间码依次分配给歌词字幕；空白时间码分配给 `#INSTRUMENTAL`，
/// 没有对应间奏的空白时间码在遇到下一句歌词时被跳过。
/// 若 LRC 以空白时间码结尾，且它晚于前一个时间码，则写入 `END` 字幕。
pub fn transfer_lrc_timing(lrc: &str, draft_json: &str) -> Result<String, ConvertError> {
    let entries = parse_lrc_entries(lrc).entries;
    if entries.is_empty() {
        return Err(ConvertError::InvalidLyricFormat(
            "LRC 无效或为空".to_string(),
        ));
    }
    let mut draft = parse_draft(draft_json)?;

    let Some(subtitles) = draft.get_mut("subtitles").and_then(Value::as_array_mut) else {
        return Err(ConvertError::InvalidJsonStructure(
            "草稿中找不到 'subtitles' 数组".to_string(),
        ));
    };

    let mut lrc_index = 0;
    let mut assigned = 0;
    for subtitle in subtitles.iter_mut() {
        if lrc_index >= entries.len() {
            break;
        }
        match SubtitleKind::classify(subtitle) {
            SubtitleKind::Instrumental => {
                if entries[lrc_index].is_boundary() {
                    set_time(subtitle, entries[lrc_index].time);
                    lrc_index += 1;
                    assigned += 1;
                }
            }
            SubtitleKind::Lyric => {
                while entries.get(lrc_index).is_some_and(LrcEntry::is_boundary) {
                    lrc_index += 1;
                }
                if let Some(entry) = entries.get(lrc_index) {
                    set_time(subtitle, entry.time);
                    lrc_index += 1;
                    assigned += 1;
                }
            }
            SubtitleKind::End | SubtitleKind::Placeholder => {}
        }
    }

    if let Some(last) = entries.last().filter(|last| last.is_boundary()) {
        let second_to_last = entries
            .len()
            .checked_sub(2)
            .map_or(0.0, |i| entries[i].time);
        if last.time > second_to_last
            && let Some(end_subtitle) = subtitles
                .iter_mut()
                .find(|sub| SubtitleKind::classify(sub) == SubtitleKind::End)
        {
            set_time(end_subtitle, last.time);
        }
    }

    info!("已为草稿中的 {assigned} 行字幕写入时间");
    to_pretty_json(&draft)
}

fn set_time(subtitle: &mut Value, time: f64) {
    if let Some(object) = subtitle.as_object_mut() {
        object.insert("time".to_string(), json!(time));
    }
}

fn to_pretty_json(value: &Value) -> Result<String, ConvertError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| ConvertError::json_parse(e, "草稿字幕输出"))?;
    Ok(String::from_utf8(buffer)?)
}
