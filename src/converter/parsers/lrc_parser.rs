//! # LRC 格式解析器
//!
//! 只识别单时间戳行 `[mm:ss.xx]文本`。文本为空的时间码作为"边界"保留，
//! 用于确定上一行的结束时间。

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use lyric_sync_core::{
    ConvertError, LineTiming, LrcParsingOptions, LyricFormat, ParsedLyrics, SyncedLine,
    time::round_millis,
};

/// 用于匹配一个完整的 LRC 歌词行，捕获分、秒、小数部分和文本部分
static LRC_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(\d{2}):(\d{2})\.(\d{2,3})\](.*)$").expect("未能编译 LRC_LINE_REGEX")
});

/// 一个 LRC 时间码及其文本。
#[derive(Debug, Clone, PartialEq)]
pub struct LrcEntry {
    /// 时间（秒，已四舍五入到毫秒）
    pub time: f64,
    /// 去除首尾空白后的文本
    pub text: String,
}

impl LrcEntry {
    /// 只有时间、没有文本的边界标记。
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        self.text.is_empty()
    }
}

/// LRC 逐行解析的结果。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LrcEntries {
    /// 按文件顺序排列的时间码
    pub entries: Vec<LrcEntry>,
    /// 被跳过的行
    pub warnings: Vec<String>,
}

/// 逐行解析 LRC 内容，保持文件中的顺序。
///
/// 空行被忽略；不符合格式的行被跳过并记录警告。
#[must_use]
pub fn parse_lrc_entries(content: &str) -> LrcEntries {
    let mut result = LrcEntries::default();

    for (line_num, line_str) in content.lines().enumerate() {
        let line_str_trimmed = line_str.trim();
        if line_str_trimmed.is_empty() {
            continue;
        }

        let Some(caps) = LRC_LINE_REGEX.captures(line_str_trimmed) else {
            result
                .warnings
                .push(format!("跳过无法识别的 LRC 行 (行 {}): '{line_str_trimmed}'", line_num + 1));
            continue;
        };

        let minutes: u32 = caps[1].parse().unwrap_or_default();
        let seconds: u32 = caps[2].parse().unwrap_or_default();
        if seconds >= 60 {
            result.warnings.push(format!(
                "LRC秒数无效 (行 {}): '{seconds}'",
                line_num + 1
            ));
            continue;
        }

        let fraction_str = &caps[3];
        let fraction: u32 = fraction_str.parse().unwrap_or_default();
        let divisor = if fraction_str.len() == 2 { 100.0 } else { 1000.0 };

        result.entries.push(LrcEntry {
            time: round_millis(
                f64::from(minutes) * 60.0 + f64::from(seconds) + f64::from(fraction) / divisor,
            ),
            text: caps[4].trim().to_string(),
        });
    }

    if !result.warnings.is_empty() {
        warn!("LRC 解析时跳过了 {} 行", result.warnings.len());
    }
    result
}

/// 将时间码转换为时间轴行。
///
/// 时间码先按时间排序；边界标记不生成行，只作为上一行的结束时间。
/// 每行的结束时间为下一个更晚的时间码（相同的时间码会被跳过），没有时为开始时间加上
/// [`LrcParsingOptions::last_line_duration_secs`]。
#[must_use]
pub fn lrc_to_lines(entries: &[LrcEntry], options: &LrcParsingOptions) -> Vec<SyncedLine> {
    let mut sorted: Vec<&LrcEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.time.total_cmp(&b.time));

    sorted
        .iter()
        .enumerate()
        .filter(|(_, entry)| !entry.is_boundary())
        .map(|(i, entry)| {
            let end = sorted[i + 1..]
                .iter()
                .map(|next| next.time)
                .find(|&next| next > entry.time)
                .unwrap_or(entry.time + options.last_line_duration_secs);
            SyncedLine::new(entry.text.clone()).with_timing(LineTiming::Synced {
                begin: entry.time,
                end,
            })
        })
        .collect()
}

/// 解析 LRC 内容为时间轴行。
pub fn parse_lrc(content: &str, options: &LrcParsingOptions) -> Result<ParsedLyrics, ConvertError> {
    let LrcEntries { entries, warnings } = parse_lrc_entries(content);
    let lines = lrc_to_lines(&entries, options);
    if lines.is_empty() {
        return Err(ConvertError::InvalidLyricFormat(
            "LRC 中找不到任何带时间码的歌词行".to_string(),
        ));
    }

    debug!("LRC 解析完成，共 {} 行", lines.len());
    Ok(ParsedLyrics {
        lines,
        source_format: LyricFormat::Lrc,
        warnings,
    })
}
