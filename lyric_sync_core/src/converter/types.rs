use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString};

use crate::SyncedLine;

/// 枚举：表示支持导入导出的歌词格式。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize, EnumIter, Default,
)]
#[strum(ascii_case_insensitive)]
pub enum LyricFormat {
    /// `Timed Text Markup Language` 格式。
    #[default]
    Ttml,
    /// 标准 LRC (`LyRiCs`) 格式。
    Lrc,
    /// 不含时间的纯文本。
    Txt,
}

impl LyricFormat {
    /// 将歌词格式枚举转换为对应的文件扩展名字符串。
    #[must_use]
    pub const fn to_extension_str(self) -> &'static str {
        match self {
            Self::Ttml => "ttml",
            Self::Lrc => "lrc",
            Self::Txt => "txt",
        }
    }

    /// 从字符串（通常是文件扩展名或用户输入）解析歌词格式枚举。
    /// 此方法不区分大小写，并会移除输入字符串中的空格和点。
    pub fn from_string(s: &str) -> Option<Self> {
        let normalized_s = s.to_uppercase().replace([' ', '.'], "");
        match normalized_s.as_str() {
            "TTML" | "XML" => Some(Self::Ttml),
            "LRC" => Some(Self::Lrc),
            "TXT" | "TEXT" => Some(Self::Txt),
            _ => None,
        }
    }

    /// 由文件名推断格式。
    pub fn from_file_name(name: &str) -> Option<Self> {
        name.rsplit_once('.')
            .and_then(|(_, extension)| Self::from_string(extension))
    }
}

impl fmt::Display for LyricFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ttml => write!(f, "TTML"),
            Self::Lrc => write!(f, "LRC"),
            Self::Txt => write!(f, "TXT"),
        }
    }
}

/// 导入器的统一输出。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLyrics {
    /// 解析出的行，按文件中的顺序排列。
    pub lines: Vec<SyncedLine>,
    /// 来源格式
    pub source_format: LyricFormat,
    /// 解析过程中产生的非致命警告。
    pub warnings: Vec<String>,
}
