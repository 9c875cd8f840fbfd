//! # LRC 格式生成器

use std::fmt::Write;

use tracing::debug;

use lyric_sync_core::{ConvertError, LrcGenerationOptions, SyncedLine, time::format_lrc_time};

/// LRC 生成的主入口函数。
///
/// 只输出开始与结束时间都已设置的行，按开始时间排序。
/// 相邻两行之间的静音超过 [`LrcGenerationOptions::silence_threshold_secs`] 时，
/// 在上一行结束处插入一个只有时间的标记；最后一行结束处总有一个这样的标记。
/// 没有任何完成打轴的行时返回空字符串。
pub fn generate_lrc(
    lines: &[SyncedLine],
    options: &LrcGenerationOptions,
) -> Result<String, ConvertError> {
    let mut timed: Vec<(f64, f64, &str)> = lines
        .iter()
        .filter_map(|line| Some((line.begin()?, line.end()?, line.text.as_str())))
        .collect();
    timed.sort_by(|a, b| a.0.total_cmp(&b.0));

    let Some(&(_, last_end, _)) = timed.last() else {
        return Ok(String::new());
    };

    let newline = options.line_ending.as_str();
    let mut writer = String::new();
    let mut previous_end: Option<f64> = None;

    for (begin, end, text) in &timed {
        if let Some(prev_end) = previous_end
            && begin - prev_end > options.silence_threshold_secs
        {
            write!(writer, "[{}]{newline}", format_lrc_time(prev_end))?;
        }
        write!(writer, "[{}]{text}{newline}", format_lrc_time(*begin))?;
        previous_end = Some(*end);
    }
    write!(writer, "[{}]", format_lrc_time(last_end))?;

    debug!("生成 LRC：{} 行", timed.len());
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use lyric_sync_core::{LineEnding, LineTiming, LrcGenerationOptionsBuilder};

    use super::*;

    fn synced(text: &str, begin: f64, end: f64) -> SyncedLine {
        SyncedLine::new(text).with_timing(LineTiming::Synced { begin, end })
    }

    #[test]
    fn test_sorted_output_with_trailing_marker() {
        let lines = vec![
            synced("Second", 3.0, 4.5),
            SyncedLine::new("Unsynced"),
            synced("First", 1.0, 2.0),
        ];
        let lrc = generate_lrc(&lines, &LrcGenerationOptions::default()).unwrap();
        assert_eq!(lrc, "[00:01.00]First\n[00:03.00]Second\n[00:04.50]");
    }

    #[test]
    fn test_silence_marker_only_for_long_gaps() {
        let long_gap = vec![synced("A", 1.0, 2.0), synced("B", 17.0, 18.0)];
        let lrc = generate_lrc(&long_gap, &LrcGenerationOptions::default()).unwrap();
        assert_eq!(lrc, "[00:01.00]A\n[00:02.00]\n[00:17.00]B\n[00:18.00]");

        let short_gap = vec![synced("A", 1.0, 2.0), synced("B", 12.0, 13.0)];
        let lrc = generate_lrc(&short_gap, &LrcGenerationOptions::default()).unwrap();
        assert_eq!(lrc, "[00:01.00]A\n[00:12.00]B\n[00:13.00]");
    }

    #[test]
    fn test_empty_when_nothing_is_timed() {
        let lines = vec![
            SyncedLine::new("A"),
            SyncedLine::new("B").with_timing(LineTiming::BeginOnly(1.0)),
        ];
        assert_eq!(
            generate_lrc(&lines, &LrcGenerationOptions::default()).unwrap(),
            ""
        );
    }

    #[test]
    fn test_crlf_line_ending() {
        let options = LrcGenerationOptionsBuilder::default()
            .line_ending(LineEnding::CrLf)
            .build()
            .unwrap();
        let lrc = generate_lrc(&[synced("A", 1.0, 2.0)], &options).unwrap();
        assert_eq!(lrc, "[00:01.00]A\r\n[00:02.00]");
    }
}
