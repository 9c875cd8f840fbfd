//! # 格式转换
//!
//! 按 [`LyricFormat`] 分派到各个解析器与生成器。

pub mod generators;
pub mod parsers;
pub mod processors;

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::config::AppConfig;
use lyric_sync_core::{
    ConvertError, LrcParsingOptions, LyricFormat, ParsedLyrics, SyncedLine, TtmlGenerationOptions,
};

/// 匹配文件名末尾的扩展名
static EXTENSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[^/.]+$").expect("未能编译 EXTENSION_REGEX"));

const FALLBACK_FILE_STEM: &str = "lyrics";

/// 导入歌词文件内容。
///
/// TXT 按行生成未打轴的行；LRC 与 TTML 带时间导入。
pub fn import_lyrics(
    content: &str,
    format: LyricFormat,
    config: &AppConfig,
) -> Result<ParsedLyrics, ConvertError> {
    let parsed = match format {
        LyricFormat::Ttml => ttml_processor::parse_ttml(content)?,
        LyricFormat::Lrc => parsers::lrc_parser::parse_lrc(content, &config.lrc_parsing)?,
        LyricFormat::Txt => ParsedLyrics {
            lines: content
                .split('\n')
                .map(|line| SyncedLine::new(line.strip_suffix('\r').unwrap_or(line)))
                .collect(),
            source_format: LyricFormat::Txt,
            warnings: Vec::new(),
        },
    };

    for warning in &parsed.warnings {
        warn!("导入 {format} 时出现警告: {warning}");
    }
    info!("已导入 {format}，共 {} 行", parsed.lines.len());
    Ok(parsed)
}

/// 把时间轴行导出为指定格式。
pub fn export_lyrics(
    lines: &[SyncedLine],
    format: LyricFormat,
    config: &AppConfig,
) -> Result<String, ConvertError> {
    match format {
        LyricFormat::Ttml => ttml_processor::generate_ttml(lines, &config.ttml),
        LyricFormat::Lrc => generators::lrc_generator::generate_lrc(lines, &config.lrc),
        LyricFormat::Txt => Ok(generators::txt_generator::generate_txt(lines)),
    }
}

/// 把 LRC 直接转换为 TTML。
pub fn convert_lrc_to_ttml(
    lrc: &str,
    parsing: &LrcParsingOptions,
    generation: &TtmlGenerationOptions,
) -> Result<String, ConvertError> {
    let parsed = parsers::lrc_parser::parse_lrc(lrc, parsing)?;
    ttml_processor::generate_ttml(&parsed.lines, generation)
}

/// 导出文件名：音频文件名去掉扩展名后加上目标格式的扩展名。
///
/// 没有音频文件名时使用 `lyrics`。
#[must_use]
pub fn export_file_name(audio_file_name: Option<&str>, format: LyricFormat) -> String {
    let stem = audio_file_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or_else(
            || FALLBACK_FILE_STEM.to_string(),
            |name| EXTENSION_REGEX.replace(name, "").into_owned(),
        );
    let stem = if stem.is_empty() {
        FALLBACK_FILE_STEM.to_string()
    } else {
        stem
    };
    format!("{stem}.{}", format.to_extension_str())
}
