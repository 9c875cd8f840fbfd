//! # 时间编解码
//!
//! 在以秒为单位的浮点时间与各歌词格式使用的文本时间之间互相转换。
//!
//! 所有格式化函数都会先把秒数四舍五入到毫秒，再四舍五入到厘秒，
//! 保证 `秒 -> 文本 -> 秒` 的往返误差不超过 0.01 秒。

/// 将秒数转换为毫秒总数。负数、NaN 与无穷大都视为 0。
fn total_millis(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0).round() as u64
}

/// 将秒数转换为厘秒总数（对毫秒总数做四舍五入）。
fn total_centis(seconds: f64) -> u64 {
    (total_millis(seconds) + 5) / 10
}

/// 将秒数四舍五入到毫秒精度。
#[must_use]
pub fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// 将秒数格式化为 LRC 使用的 `mm:ss.cc`（不含方括号）。
///
/// 分钟不会在 60 处回绕，长音轨可以得到 `75:03.20` 这样的结果。
#[must_use]
pub fn format_lrc_time(seconds: f64) -> String {
    let centis = total_centis(seconds);
    let minutes = centis / 6000;
    let secs = (centis / 100) % 60;
    let cs = centis % 100;
    format!("{minutes:02}:{secs:02}.{cs:02}")
}

/// 将秒数格式化为 TTML 使用的 `hh:mm:ss.cc`。
#[must_use]
pub fn format_ttml_time(seconds: f64) -> String {
    let centis = total_centis(seconds);
    let hours = centis / 360_000;
    let minutes = (centis / 6000) % 60;
    let secs = (centis / 100) % 60;
    let cs = centis % 100;
    format!("{hours:02}:{minutes:02}:{secs:02}.{cs:02}")
}

/// 将秒数格式化为逐字 TTML 使用的毫秒精度时间。
/// 例如：123.456 -> "2:03.456"，3723.456 -> "1:02:03.456"
#[must_use]
pub fn format_precise_time(seconds: f64) -> String {
    let ms = total_millis(seconds);
    let hours = ms / 3_600_000;
    let minutes = (ms / 60_000) % 60;
    let secs = (ms / 1000) % 60;
    let millis = ms % 1000;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}.{millis:03}")
    } else {
        format!("{minutes}:{secs:02}.{millis:03}")
    }
}

/// 用于界面显示的时间，未设置时显示占位符。
#[must_use]
pub fn format_clock(seconds: Option<f64>) -> String {
    match seconds {
        Some(value) if !value.is_nan() => format_lrc_time(value.max(0.0)),
        _ => "--:--.--".to_string(),
    }
}

fn parse_whole(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// 解析 "SS" 或 "SS.f" 部分，小数位数决定除数（2 位为厘秒，3 位为毫秒）。
fn parse_seconds_part(part: &str) -> Option<f64> {
    let (whole, fraction) = match part.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (part, None),
    };
    let whole = parse_whole(whole)?;

    let fraction = match fraction {
        None => 0.0,
        Some(digits)
            if (1..=3).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            let value: u32 = digits.parse().ok()?;
            f64::from(value) / 10f64.powi(digits.len() as i32)
        }
        Some(_) => return None,
    };

    Some(whole as f64 + fraction)
}

/// 解析 `ss.ms`、`mm:ss.ms` 或 `hh:mm:ss.ms` 形式的时间文本。
///
/// 小数部分可以是 1 到 3 位；逗号也被接受为小数点，
/// 末尾的 `s`（TTML 偏移时间写法）会被忽略。
/// 格式错误时返回 `None`，调用方应将其视为"无法解析"而不是零时间戳。
#[must_use]
pub fn parse_time_to_seconds(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix('s').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return None;
    }
    let normalized = trimmed.replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();

    let (hours, minutes, seconds_str) = match parts.as_slice() {
        [seconds] => (0, 0, *seconds),
        [minutes, seconds] => (0, parse_whole(minutes)?, *seconds),
        [hours, minutes, seconds] => (parse_whole(hours)?, parse_whole(minutes)?, *seconds),
        _ => return None,
    };

    let seconds = parse_seconds_part(seconds_str)?;
    // 带冒号的写法中，秒数必须小于 60
    if parts.len() > 1 && seconds >= 60.0 {
        return None;
    }

    Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

/// 严格解析 TTML 导入使用的 `hh:mm:ss.ms` 时间。
#[must_use]
pub fn parse_ttml_clock_time(text: &str) -> Option<f64> {
    if text.trim().split(':').count() != 3 {
        return None;
    }
    parse_time_to_seconds(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "期望 {expected}，实际 {actual}"
        );
    }

    #[test]
    fn test_format_lrc_time() {
        assert_eq!(format_lrc_time(0.0), "00:00.00");
        assert_eq!(format_lrc_time(65.43), "01:05.43");
        assert_eq!(format_lrc_time(4503.2), "75:03.20");
        assert_eq!(format_lrc_time(-3.0), "00:00.00");
        assert_eq!(format_lrc_time(f64::NAN), "00:00.00");
    }

    #[test]
    fn test_format_ttml_time() {
        assert_eq!(format_ttml_time(0.0), "00:00:00.00");
        assert_eq!(format_ttml_time(3723.45), "01:02:03.45");
        assert_eq!(format_ttml_time(59.999), "00:01:00.00");
        assert_eq!(format_ttml_time(-1.0), "00:00:00.00");
    }

    #[test]
    fn test_half_up_rounding_uses_millis() {
        assert_eq!(format_lrc_time(1.005), "00:01.01");
        assert_eq!(format_lrc_time(1.004), "00:01.00");
        assert_eq!(format_ttml_time(1.005), "00:00:01.01");
    }

    #[test]
    fn test_format_precise_time() {
        assert_eq!(format_precise_time(123.456), "2:03.456");
        assert_eq!(format_precise_time(3723.456), "1:02:03.456");
        assert_eq!(format_precise_time(7.1), "0:07.100");
    }

    #[test]
    fn test_format_clock_placeholder() {
        assert_eq!(format_clock(None), "--:--.--");
        assert_eq!(format_clock(Some(f64::NAN)), "--:--.--");
        assert_eq!(format_clock(Some(12.5)), "00:12.50");
    }

    #[test]
    fn test_parse_variants() {
        assert_close(parse_time_to_seconds("12.34").unwrap(), 12.34, 1e-9);
        assert_close(parse_time_to_seconds("01:05.43").unwrap(), 65.43, 1e-9);
        assert_close(parse_time_to_seconds("1:02:03.456").unwrap(), 3723.456, 1e-9);
        assert_close(parse_time_to_seconds("00:00:01,50").unwrap(), 1.5, 1e-9);
        assert_close(parse_time_to_seconds("5.0s").unwrap(), 5.0, 1e-9);
        assert_close(parse_time_to_seconds("75:03.20").unwrap(), 4503.2, 1e-9);
    }

    #[test]
    fn test_parse_fraction_divisor_follows_digit_count() {
        assert_close(parse_time_to_seconds("00:01.05").unwrap(), 1.05, 1e-9);
        assert_close(parse_time_to_seconds("00:01.050").unwrap(), 1.05, 1e-9);
        assert_close(parse_time_to_seconds("00:01.5").unwrap(), 1.5, 1e-9);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_time_to_seconds(""), None);
        assert_eq!(parse_time_to_seconds("abc"), None);
        assert_eq!(parse_time_to_seconds("1:2:3:4"), None);
        assert_eq!(parse_time_to_seconds("00:61.00"), None);
        assert_eq!(parse_time_to_seconds("00:01.1234"), None);
        assert_eq!(parse_time_to_seconds("-1.00"), None);
        assert_eq!(parse_time_to_seconds("00:.50"), None);
    }

    #[test]
    fn test_parse_ttml_clock_time_is_strict() {
        assert_close(parse_ttml_clock_time("00:01:02.50").unwrap(), 62.5, 1e-9);
        assert_eq!(parse_ttml_clock_time("01:02.50"), None);
        assert_eq!(parse_ttml_clock_time("62.5"), None);
    }

    #[test]
    fn test_round_trip_is_stable() {
        for centis in (0..400_000).step_by(997) {
            let seconds = f64::from(centis) / 100.0;
            let lrc = parse_time_to_seconds(&format_lrc_time(seconds)).unwrap();
            let ttml = parse_time_to_seconds(&format_ttml_time(seconds)).unwrap();
            assert_close(lrc, seconds, 0.005);
            assert_close(ttml, seconds, 0.005);
        }
    }

    #[test]
    fn test_round_millis() {
        assert_close(round_millis(1.23456), 1.235, 1e-12);
        assert_close(round_millis(0.1 + 0.2), 0.3, 1e-12);
    }
}
