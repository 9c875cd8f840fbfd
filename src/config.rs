//! 负责处理应用的持久化配置。
//!
//! 配置文件为 `<用户配置目录>/lyric-sync/config.toml`，缺失的字段使用默认值。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{LyricSyncError, Result};
use lyric_sync_core::{LrcGenerationOptions, LrcParsingOptions, SyncOptions, TtmlGenerationOptions};

const APP_DIR_NAME: &str = "lyric-sync";
const CONFIG_FILE_NAME: &str = "config.toml";

/// 草稿自动保存相关的选项。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct DraftOptions {
    /// 每次修改后是否自动保存草稿。
    pub autosave: bool,
    /// 草稿文件名，位于应用配置目录下。
    pub file_name: String,
}

impl Default for DraftOptions {
    fn default() -> Self {
        Self {
            autosave: true,
            file_name: "draft.json".to_string(),
        }
    }
}

/// 应用配置。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sync: SyncOptions,
    pub lrc: LrcGenerationOptions,
    pub lrc_parsing: LrcParsingOptions,
    pub ttml: TtmlGenerationOptions,
    pub draft: DraftOptions,
}

/// 获取应用配置目录下指定文件的完整路径，必要时创建目录。
///
/// # 参数
/// * `filename` - 目标文件的名称，例如 "`config.toml`"。
pub fn get_config_file_path(filename: &str) -> Result<PathBuf> {
    let mut config_dir = dirs::config_dir().ok_or(LyricSyncError::ConfigDirNotFound)?;
    config_dir.push(APP_DIR_NAME);
    fs::create_dir_all(&config_dir)?;
    config_dir.push(filename);
    Ok(config_dir)
}

impl AppConfig {
    /// 从默认位置加载配置。
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_file_path(CONFIG_FILE_NAME)?)
    }

    /// 从指定文件加载配置，文件不存在时返回默认配置。
    pub fn load_from(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let config: Self = toml::from_str(&content)?;
                info!("已加载配置文件 {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("未找到配置文件 {}，使用默认配置。", path.display());
                Ok(Self::default())
            }
            Err(e) => {
                warn!("读取配置文件 {} 失败: {e}", path.display());
                Err(e.into())
            }
        }
    }

    /// 保存到默认位置。
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_file_path(CONFIG_FILE_NAME)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lyric_sync_core::LineEnding;

    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[sync]\nmin_gap_secs = 0.2\n\n[lrc]\nline_ending = \"CrLf\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert!((config.sync.min_gap_secs - 0.2).abs() < f64::EPSILON);
        assert!((config.sync.nudge_step_secs - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.lrc.line_ending, LineEnding::CrLf);
        assert!(config.ttml.format);
        assert!(config.draft.autosave);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = AppConfig {
            draft: DraftOptionsBuilder::default()
                .autosave(false)
                .build()
                .unwrap(),
            ..Default::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sync\nmin_gap_secs = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(LyricSyncError::ConfigParse(_))
        ));
    }
}
