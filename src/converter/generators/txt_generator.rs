//! # 纯文本生成器

use lyric_sync_core::SyncedLine;

/// 以换行符拼接所有行的文本，忽略时间。
#[must_use]
pub fn generate_txt(lines: &[SyncedLine]) -> String {
    lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use lyric_sync_core::LineTiming;

    use super::*;

    #[test]
    fn test_generate_txt_keeps_blank_lines() {
        let lines = vec![
            SyncedLine::new("A").with_timing(LineTiming::Synced { begin: 1.0, end: 2.0 }),
            SyncedLine::new(""),
            SyncedLine::new("B"),
        ];
        assert_eq!(generate_txt(&lines), "A\n\nB");
        assert_eq!(generate_txt(&[]), "");
    }
}
