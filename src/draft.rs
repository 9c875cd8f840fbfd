//! # 草稿持久化
//!
//! 会话在每次修改后保存草稿，启动时读取一次。
//! 存储方式通过 [`DraftStore`] 抽象，默认实现把草稿写到配置目录下的 JSON 文件。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{DraftOptions, get_config_file_path};
use crate::error::Result;
use lyric_sync_core::SyncedLine;

/// 未完成的打轴工作。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub lines: Vec<SyncedLine>,
    #[serde(default)]
    pub audio_file_name: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl Draft {
    /// 以当前时间创建草稿。
    #[must_use]
    pub fn new(lines: Vec<SyncedLine>, audio_file_name: Option<String>) -> Self {
        Self {
            lines,
            audio_file_name,
            saved_at: Utc::now(),
        }
    }
}

/// 草稿的存储位置。
pub trait DraftStore {
    /// 读取草稿，没有草稿时返回 `None`。
    fn load(&self) -> Result<Option<Draft>>;

    fn save(&mut self, draft: &Draft) -> Result<()>;

    fn clear(&mut self) -> Result<()>;
}

/// 保存为 JSON 文件的草稿。
#[derive(Debug, Clone)]
pub struct JsonFileDraftStore {
    path: PathBuf,
}

impl JsonFileDraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 使用配置目录下的草稿文件。
    pub fn from_config(options: &DraftOptions) -> Result<Self> {
        Ok(Self::new(get_config_file_path(&options.file_name)?))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DraftStore for JsonFileDraftStore {
    fn load(&self) -> Result<Option<Draft>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("没有草稿文件 {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Draft>(&content) {
            Ok(draft) => {
                info!(
                    "已读取草稿（{} 行，保存于 {}）",
                    draft.lines.len(),
                    draft.saved_at
                );
                Ok(Some(draft))
            }
            Err(e) => {
                warn!("草稿文件 {} 已损坏: {e}", self.path.display());
                Err(e.into())
            }
        }
    }

    fn save(&mut self, draft: &Draft) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(draft)?)?;
        debug!("草稿已保存到 {}", self.path.display());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// 保存在内存中的草稿，用于测试或不需要持久化的场景。
#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    draft: Option<Draft>,
    saves: usize,
}

impl MemoryDraftStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_draft(draft: Draft) -> Self {
        Self {
            draft: Some(draft),
            saves: 0,
        }
    }

    #[must_use]
    pub const fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// 调用 `save` 的次数。
    #[must_use]
    pub const fn save_count(&self) -> usize {
        self.saves
    }
}

impl DraftStore for MemoryDraftStore {
    fn load(&self) -> Result<Option<Draft>> {
        Ok(self.draft.clone())
    }

    fn save(&mut self, draft: &Draft) -> Result<()> {
        self.draft = Some(draft.clone());
        self.saves += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.draft = None;
        Ok(())
    }
}
