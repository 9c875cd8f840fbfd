//! # 行存储
//!
//! 按顺序保存所有时间轴行，提供文本重排、拆分与合并，以及相邻行查找。

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use lyric_sync_core::{LineId, SyncedLine};

/// 拆分或合并后，输入焦点应落在的位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditFocus {
    /// 获得焦点的行
    pub line_index: usize,
    /// 光标位置（字符索引）
    pub cursor: usize,
}

/// 有序的时间轴行集合。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineStore {
    lines: Vec<SyncedLine>,
}

/// 将输入文本拆分为行。`\r\n` 与 `\n` 都被视为换行。
fn split_text_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// 根据新文本重新生成行，尽量保留旧行的 ID 与时间。
///
/// 匹配顺序：
/// 1. 同一位置且文本完全相同的旧行，原样保留；
/// 2. 否则取尚未被使用的、文本相同的第一个旧行（保留 ID 与时间，位置改变）；
/// 3. 都没有时创建一个未打轴的新行。
///
/// 每个旧行最多被使用一次。
#[must_use]
pub fn reconcile_lines(old: &[SyncedLine], new_text: &str) -> Vec<SyncedLine> {
    let new_texts: Vec<&str> = split_text_lines(new_text).collect();
    let mut result: Vec<Option<SyncedLine>> = vec![None; new_texts.len()];
    let mut consumed = vec![false; old.len()];

    for (index, text) in new_texts.iter().enumerate() {
        if let Some(old_line) = old.get(index)
            && old_line.text == *text
        {
            result[index] = Some(old_line.clone());
            consumed[index] = true;
        }
    }

    let mut remaining: HashMap<&str, VecDeque<usize>> = HashMap::new();
    for (index, line) in old.iter().enumerate() {
        if !consumed[index] {
            remaining
                .entry(line.text.as_str())
                .or_default()
                .push_back(index);
        }
    }

    let mut moved = 0;
    let mut created = 0;
    let lines: Vec<SyncedLine> = result
        .into_iter()
        .zip(new_texts)
        .map(|(kept, text)| {
            if let Some(line) = kept {
                return line;
            }
            if let Some(old_index) = remaining.get_mut(text).and_then(VecDeque::pop_front) {
                moved += 1;
                return old[old_index].clone();
            }
            created += 1;
            SyncedLine::new(text)
        })
        .collect();

    debug!(
        "文本重排完成：共 {} 行，{moved} 行按内容匹配，{created} 行为新行",
        lines.len()
    );
    lines
}

impl LineStore {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    #[must_use]
    pub const fn from_lines(lines: Vec<SyncedLine>) -> Self {
        Self { lines }
    }

    /// 由纯文本创建存储，每行一个未打轴的行。
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: split_text_lines(text).map(SyncedLine::new).collect(),
        }
    }

    #[must_use]
    pub fn lines(&self) -> &[SyncedLine] {
        &self.lines
    }

    #[must_use]
    pub fn into_lines(self) -> Vec<SyncedLine> {
        self.lines
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SyncedLine> {
        self.lines.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SyncedLine> {
        self.lines.get_mut(index)
    }

    /// 查找给定 ID 所在的位置。
    #[must_use]
    pub fn position(&self, id: &LineId) -> Option<usize> {
        self.lines.iter().position(|line| &line.id == id)
    }

    /// 整体替换所有行（例如导入或批量修复后）。
    pub fn replace_lines(&mut self, lines: Vec<SyncedLine>) {
        self.lines = lines;
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// 修改单行的文本，时间保持不变。
    pub fn set_text(&mut self, id: &LineId, text: impl Into<String>) -> bool {
        match self.lines.iter_mut().find(|line| &line.id == id) {
            Some(line) => {
                line.text = text.into();
                true
            }
            None => false,
        }
    }

    /// 以 `\n` 拼接的全部文本。
    #[must_use]
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 用编辑后的整段文本重新生成行，参见 [`reconcile_lines`]。
    pub fn reflow(&mut self, new_text: &str) {
        self.lines = reconcile_lines(&self.lines, new_text);
    }

    /// 在字符位置 `cursor` 处把一行拆成两行。
    ///
    /// 左半部分保留原 ID 与时间，右半部分成为未打轴的新行。
    /// 焦点移到新行的开头。
    pub fn split_line(&mut self, index: usize, cursor: usize) -> Option<EditFocus> {
        let line = self.lines.get_mut(index)?;
        let byte_index = line
            .text
            .char_indices()
            .nth(cursor)
            .map_or(line.text.len(), |(i, _)| i);
        let right = line.text.split_off(byte_index);

        self.lines.insert(index + 1, SyncedLine::new(right));
        Some(EditFocus {
            line_index: index + 1,
            cursor: 0,
        })
    }

    /// 把第 `index` 行的文本接到上一行末尾并删除该行。
    ///
    /// 上一行的 ID 与时间保留，焦点移到上一行原文本的末尾。第一行无法合并。
    pub fn merge_into_previous(&mut self, index: usize) -> Option<EditFocus> {
        if index == 0 || index >= self.lines.len() {
            return None;
        }
        let removed = self.lines.remove(index);
        let previous = &mut self.lines[index - 1];
        let boundary = previous.text.chars().count();
        previous.text.push_str(&removed.text);

        Some(EditFocus {
            line_index: index - 1,
            cursor: boundary,
        })
    }

    /// 向前查找最近一个有结束时间的行的结束时间。
    #[must_use]
    pub fn previous_end(&self, index: usize) -> Option<f64> {
        self.lines[..index.min(self.lines.len())]
            .iter()
            .rev()
            .find_map(SyncedLine::end)
    }

    /// 向后查找最近一个有开始时间的行的开始时间。
    #[must_use]
    pub fn next_begin(&self, index: usize) -> Option<f64> {
        self.lines
            .get(index + 1..)?
            .iter()
            .find_map(SyncedLine::begin)
    }

    /// `index` 之后第一个文本非空的行。
    #[must_use]
    pub fn next_non_empty(&self, index: usize) -> Option<usize> {
        (index + 1..self.lines.len()).find(|&i| !self.lines[i].is_blank())
    }

    /// 存储非空，且所有非空行都已完成打轴。
    #[must_use]
    pub fn all_synced(&self) -> bool {
        !self.lines.is_empty()
            && self
                .lines
                .iter()
                .all(|line| line.is_blank() || line.is_synced())
    }
}

impl From<Vec<SyncedLine>> for LineStore {
    fn from(lines: Vec<SyncedLine>) -> Self {
        Self::from_lines(lines)
    }
}

#[cfg(test)]
mod tests {
    use lyric_sync_core::LineTiming;

    use super::*;

    fn synced(id: &str, text: &str, begin: f64, end: f64) -> SyncedLine {
        SyncedLine::with_id(id, text).with_timing(LineTiming::Synced { begin, end })
    }

    fn texts(store: &LineStore) -> Vec<&str> {
        store.lines().iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_from_text_keeps_blank_lines() {
        let store = LineStore::from_text("A\r\n\nB\n");
        assert_eq!(texts(&store), vec!["A", "", "B", ""]);
        assert!(store.lines().iter().all(|l| l.timing == LineTiming::Unsynced));
        assert_eq!(store.to_text(), "A\n\nB\n");
    }

    #[test]
    fn test_reflow_inserted_line_keeps_sync() {
        let old = vec![synced("1", "A", 1.0, 2.0), synced("2", "B", 3.0, 4.0)];
        let lines = reconcile_lines(&old, "X\nA\nB");

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "X");
        assert_eq!(lines[0].timing, LineTiming::Unsynced);
        assert_eq!(lines[1], old[0]);
        assert_eq!(lines[2], old[1]);
    }

    #[test]
    fn test_reflow_consumes_each_old_line_once() {
        let old = vec![synced("1", "La", 1.0, 2.0), synced("2", "Hey", 3.0, 4.0)];
        let lines = reconcile_lines(&old, "Hey\nLa\nLa");

        assert_eq!(lines[0].id.as_str(), "2");
        assert_eq!(lines[1].id.as_str(), "1");
        assert_ne!(lines[2].id.as_str(), "1");
        assert_eq!(lines[2].timing, LineTiming::Unsynced);
    }

    #[test]
    fn test_reflow_prefers_same_position() {
        let old = vec![
            synced("1", "La", 1.0, 2.0),
            synced("2", "Mid", 2.5, 3.0),
            synced("3", "La", 3.5, 4.0),
        ];
        let lines = reconcile_lines(&old, "Edited\nMid\nLa");

        assert_eq!(lines[0].timing, LineTiming::Unsynced);
        assert_eq!(lines[1].id.as_str(), "2");
        assert_eq!(lines[2].id.as_str(), "3");
    }

    #[test]
    fn test_split_line_at_char_cursor() {
        let mut store = LineStore::from_lines(vec![
            synced("1", "Привет мир", 1.0, 2.0),
            synced("2", "Other", 3.0, 4.0),
        ]);
        let focus = store.split_line(0, 6).unwrap();

        assert_eq!(focus, EditFocus { line_index: 1, cursor: 0 });
        assert_eq!(texts(&store), vec!["Привет", " мир", "Other"]);
        assert_eq!(store.lines()[0].id.as_str(), "1");
        assert_eq!(store.lines()[0].timing, LineTiming::Synced { begin: 1.0, end: 2.0 });
        assert_eq!(store.lines()[1].timing, LineTiming::Unsynced);
        assert_eq!(store.lines()[2].id.as_str(), "2");

        assert!(store.split_line(9, 0).is_none());
    }

    #[test]
    fn test_split_past_end_creates_empty_line() {
        let mut store = LineStore::from_lines(vec![synced("1", "Hi", 1.0, 2.0)]);
        store.split_line(0, 10).unwrap();
        assert_eq!(texts(&store), vec!["Hi", ""]);
    }

    #[test]
    fn test_merge_into_previous() {
        let mut store = LineStore::from_lines(vec![
            synced("1", "Héllo", 1.0, 2.0),
            synced("2", " world", 3.0, 4.0),
            synced("3", "Rest", 5.0, 6.0),
        ]);
        let focus = store.merge_into_previous(1).unwrap();

        assert_eq!(focus, EditFocus { line_index: 0, cursor: 5 });
        assert_eq!(texts(&store), vec!["Héllo world", "Rest"]);
        assert_eq!(store.lines()[0].timing, LineTiming::Synced { begin: 1.0, end: 2.0 });
        assert_eq!(store.lines()[1].id.as_str(), "3");

        assert!(store.merge_into_previous(0).is_none());
        assert!(store.merge_into_previous(5).is_none());
    }

    #[test]
    fn test_neighbor_lookups() {
        let store = LineStore::from_lines(vec![
            synced("1", "A", 1.0, 2.0),
            SyncedLine::with_id("2", ""),
            SyncedLine::with_id("3", "B").with_timing(LineTiming::BeginOnly(4.0)),
            SyncedLine::with_id("4", "C"),
            synced("5", "D", 8.0, 9.0),
        ]);

        assert_eq!(store.previous_end(2), Some(2.0));
        assert_eq!(store.previous_end(0), None);
        assert_eq!(store.next_begin(0), Some(4.0));
        assert_eq!(store.next_begin(2), Some(8.0));
        assert_eq!(store.next_begin(4), None);
        assert_eq!(store.next_non_empty(0), Some(2));
        assert_eq!(store.next_non_empty(4), None);
    }

    #[test]
    fn test_all_synced_ignores_blank_lines() {
        let mut store = LineStore::from_lines(vec![
            synced("1", "A", 1.0, 2.0),
            SyncedLine::with_id("2", "  "),
        ]);
        assert!(store.all_synced());

        store.replace_lines(vec![SyncedLine::with_id("3", "B")]);
        assert!(!store.all_synced());

        store.clear();
        assert!(!store.all_synced());
    }

    #[test]
    fn test_serializes_as_plain_records() {
        let store = LineStore::from_lines(vec![synced("1", "A", 1.0, 2.0)]);
        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(json, r#"[{"id":"1","text":"A","begin":1.0,"end":2.0}]"#);
    }
}
