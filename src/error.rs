use std::io;

use lyric_sync_core::ConvertError;
use thiserror::Error;

/// `lyric_sync` 的顶层错误类型。
#[derive(Error, Debug)]
pub enum LyricSyncError {
    /// 歌词导入或导出失败。
    #[error("歌词转换失败: {0}")]
    Convert(#[from] ConvertError),
    /// 文件读写错误。
    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),
    /// 草稿或草稿字幕 JSON 读写失败。
    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),
    /// 配置文件内容无效。
    #[error("解析配置文件失败: {0}")]
    ConfigParse(#[from] toml::de::Error),
    /// 配置无法写回文件。
    #[error("序列化配置失败: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
    /// 当前平台没有可用的用户配置目录。
    #[error("无法找到用户配置目录")]
    ConfigDirNotFound,
    /// 媒体端拒绝播放。
    #[error("播放失败: {0}")]
    Playback(String),
}

/// `lyric_sync` 中使用的 `Result` 别名。
pub type Result<T, E = LyricSyncError> = std::result::Result<T, E>;
