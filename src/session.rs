//! # 编辑会话
//!
//! 把行存储、逐行打轴、当前行跟踪、格式检查和草稿保存组合在一起。
//! 每次修改提交后重新检查格式、修正游标并自动保存草稿。

use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::converter::{
    self, export_lyrics, import_lyrics,
    processors::formatting_analyzer::{self, AnalysisResult, IssueKind},
};
use crate::draft::{Draft, DraftStore};
use crate::error::Result;
use crate::store::{EditFocus, LineStore};
use crate::sync::media::{MediaEvent, MediaPort};
use crate::sync::synchronizer::{MarkOutcome, NudgeBound, Synchronizer};
use crate::sync::tracker::ActiveLineTracker;
use lyric_sync_core::{LineId, LyricFormat};

/// 一次编辑会话。
pub struct EditorSession<D: DraftStore> {
    store: LineStore,
    synchronizer: Synchronizer,
    tracker: ActiveLineTracker,
    analysis: AnalysisResult,
    audio_file_name: Option<String>,
    config: AppConfig,
    drafts: D,
}

impl<D: DraftStore> EditorSession<D> {
    pub fn new(config: AppConfig, drafts: D) -> Self {
        Self {
            store: LineStore::new(),
            synchronizer: Synchronizer::new(config.sync.clone()),
            tracker: ActiveLineTracker::new(),
            analysis: AnalysisResult::default(),
            audio_file_name: None,
            config,
            drafts,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &LineStore {
        &self.store
    }

    #[must_use]
    pub const fn synchronizer(&self) -> &Synchronizer {
        &self.synchronizer
    }

    #[must_use]
    pub const fn tracker(&self) -> &ActiveLineTracker {
        &self.tracker
    }

    #[must_use]
    pub const fn analysis(&self) -> &AnalysisResult {
        &self.analysis
    }

    #[must_use]
    pub fn audio_file_name(&self) -> Option<&str> {
        self.audio_file_name.as_deref()
    }

    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub const fn drafts(&self) -> &D {
        &self.drafts
    }

    /// 恢复保存的草稿。草稿不存在或没有任何行时返回 `false`。
    pub fn restore_draft(&mut self) -> Result<bool> {
        let Some(draft) = self.drafts.load()? else {
            return Ok(false);
        };
        if draft.lines.is_empty() {
            return Ok(false);
        }

        info!("恢复草稿：{} 行", draft.lines.len());
        self.store = LineStore::from_lines(draft.lines);
        self.audio_file_name = draft.audio_file_name;
        self.synchronizer.go_to_line(&self.store, 0);
        self.refresh();
        Ok(true)
    }

    /// 记录加载的音频文件名。
    pub fn set_audio_file_name(&mut self, name: Option<String>) {
        self.audio_file_name = name;
        self.after_mutation();
    }

    /// 用纯文本创建新的行存储。
    pub fn load_text(&mut self, text: &str) {
        self.store = LineStore::from_text(text);
        self.synchronizer.go_to_line(&self.store, 0);
        self.after_mutation();
    }

    /// 在文本编辑器中修改整段文本后重排行，尽量保留已有时间。
    pub fn edit_text(&mut self, text: &str) {
        self.store.reflow(text);
        self.after_mutation();
    }

    pub fn set_line_text(&mut self, id: &LineId, text: &str) -> bool {
        let changed = self.store.set_text(id, text);
        if changed {
            self.after_mutation();
        }
        changed
    }

    /// 导入歌词文件，替换当前所有行。
    pub fn import(&mut self, content: &str, format: LyricFormat) -> Result<()> {
        let parsed = import_lyrics(content, format, &self.config)?;
        self.store = LineStore::from_lines(parsed.lines);
        self.synchronizer.go_to_line(&self.store, 0);
        self.after_mutation();
        Ok(())
    }

    pub fn export(&self, format: LyricFormat) -> Result<String> {
        Ok(export_lyrics(self.store.lines(), format, &self.config)?)
    }

    /// 导出文件名，参见 [`converter::export_file_name`]。
    #[must_use]
    pub fn export_file_name(&self, format: LyricFormat) -> String {
        converter::export_file_name(self.audio_file_name.as_deref(), format)
    }

    /// 在当前播放位置标记当前行。
    pub fn mark(&mut self, media: &impl MediaPort) -> MarkOutcome {
        let outcome = self.synchronizer.mark_at_playhead(&mut self.store, media);
        if outcome != MarkOutcome::Ignored {
            self.after_mutation();
        }
        outcome
    }

    pub fn nudge(
        &mut self,
        index: usize,
        bound: NudgeBound,
        delta: f64,
        media: &mut impl MediaPort,
    ) -> Result<Option<f64>> {
        let result = self
            .synchronizer
            .nudge(&mut self.store, index, bound, delta, media);
        self.after_mutation();
        result
    }

    pub fn set_time_text(&mut self, index: usize, bound: NudgeBound, text: &str) -> Option<f64> {
        let value = self
            .synchronizer
            .set_time_text(&mut self.store, index, bound, text);
        if value.is_some() {
            self.after_mutation();
        }
        value
    }

    pub fn split_line(&mut self, index: usize, cursor: usize) -> Option<EditFocus> {
        let focus = self
            .synchronizer
            .split_line(&mut self.store, index, cursor)?;
        self.after_mutation();
        Some(focus)
    }

    pub fn merge_into_previous(&mut self, index: usize) -> Option<EditFocus> {
        let focus = self
            .synchronizer
            .merge_into_previous(&mut self.store, index)?;
        self.after_mutation();
        Some(focus)
    }

    pub const fn move_up(&mut self) {
        self.synchronizer.move_up();
    }

    pub const fn move_down(&mut self) {
        self.synchronizer.move_down(&self.store);
    }

    pub fn select_line(&mut self, index: usize, media: &mut impl MediaPort) -> Result<()> {
        self.synchronizer.select_line(&self.store, index, media)
    }

    pub fn play_from_end(&mut self, index: usize, media: &mut impl MediaPort) -> Result<()> {
        self.synchronizer.play_from_end(&self.store, index, media)
    }

    /// 修复单行的某种问题。
    pub fn fix_one(&mut self, id: &LineId, kind: IssueKind) {
        let fixed = formatting_analyzer::fix_one(self.store.lines(), id, kind);
        self.store.replace_lines(fixed);
        self.after_mutation();
    }

    /// 修复全部行中的某种问题。
    pub fn fix_all(&mut self, kind: IssueKind) {
        let fixed = formatting_analyzer::fix_all(self.store.lines(), kind);
        self.store.replace_lines(fixed);
        self.after_mutation();
    }

    /// 把游标移到第一个问题所在的行，返回该行。
    pub fn go_to_issue(&mut self) -> Option<usize> {
        let index = self.analysis.first_issue()?.line_index;
        self.synchronizer.go_to_line(&self.store, index);
        Some(index)
    }

    /// 回放模式下点击一行：跳转并播放。
    pub fn seek_to_line(&mut self, index: usize, media: &mut impl MediaPort) -> Result<()> {
        match self.store.get(index) {
            Some(line) => self.tracker.seek_to_line(line, media),
            None => Ok(()),
        }
    }

    /// 处理媒体事件，返回当前高亮行是否变化。
    pub fn handle_media_event(&mut self, event: MediaEvent, media: &mut impl MediaPort) -> bool {
        self.synchronizer.handle_media_event(event, media);
        self.tracker.handle_event(event, self.store.lines(), media)
    }

    /// 宿主的一帧。
    pub fn on_frame(&mut self, media: &impl MediaPort) -> bool {
        self.tracker.on_frame(self.store.lines(), media)
    }

    #[must_use]
    pub fn all_lines_synced(&self) -> bool {
        self.store.all_synced()
    }

    /// 丢弃所有内容：暂停播放，清空行、音频文件名与草稿。
    pub fn reset(&mut self, media: &mut impl MediaPort) {
        media.pause();
        self.store.clear();
        self.audio_file_name = None;
        self.synchronizer.reset();
        self.tracker.reset();
        self.analysis = AnalysisResult::default();
        if let Err(e) = self.drafts.clear() {
            warn!("清除草稿失败: {e}");
        }
        info!("会话已重置");
    }

    fn refresh(&mut self) {
        self.analysis = formatting_analyzer::analyze(self.store.lines());
        self.synchronizer.clamp_to_len(&self.store);
    }

    fn after_mutation(&mut self) {
        self.refresh();
        if !self.config.draft.autosave {
            return;
        }

        let result = if self.store.is_empty() && self.audio_file_name.is_none() {
            self.drafts.clear()
        } else {
            let draft = Draft::new(self.store.lines().to_vec(), self.audio_file_name.clone());
            self.drafts.save(&draft)
        };
        if let Err(e) = result {
            error!("自动保存草稿失败: {e}");
        }
    }
}
