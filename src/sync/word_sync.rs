//! # 逐字打轴
//!
//! 对 TTML 中的每个单词依次点击：第一次点击开始播放，之后每次点击把当前播放位置
//! 写为当前单词的开始时间，同时作为上一个单词的结束时间。

use tracing::{debug, info};

use crate::error::Result;
use crate::sync::media::MediaPort;
use lyric_sync_core::{ConvertError, WordLine};

/// 单词位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordPosition {
    pub line: usize,
    pub word: usize,
}

/// 一次点击的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordTap {
    /// 开始播放，等待标记第一个单词
    Started,
    /// 标记了一个单词，下一个待标记的是 `next`
    Marked { next: WordPosition },
    /// 标记了最后一个单词并暂停
    Finished,
    /// 没有可标记的单词，或已经完成
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TapCursor {
    #[default]
    Idle,
    Active(WordPosition),
    Finished,
}

/// 逐字打轴的状态。
#[derive(Debug, Clone, Default)]
pub struct WordSynchronizer {
    lines: Vec<WordLine>,
    cursor: TapCursor,
    last_marked: Option<WordPosition>,
}

impl WordSynchronizer {
    #[must_use]
    pub fn new(lines: Vec<WordLine>) -> Self {
        Self {
            lines,
            ..Default::default()
        }
    }

    /// 从 TTML 文档读取单词。
    pub fn from_ttml(content: &str) -> std::result::Result<Self, ConvertError> {
        let lines = ttml_processor::parse_ttml_word_lines(content)?;
        info!(
            "已读取 {} 行，共 {} 个单词",
            lines.len(),
            lines.iter().map(|line| line.words.len()).sum::<usize>()
        );
        Ok(Self::new(lines))
    }

    #[must_use]
    pub fn lines(&self) -> &[WordLine] {
        &self.lines
    }

    /// 下一次点击将标记的单词。
    #[must_use]
    pub const fn active(&self) -> Option<WordPosition> {
        match self.cursor {
            TapCursor::Active(position) => Some(position),
            TapCursor::Idle | TapCursor::Finished => None,
        }
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.cursor, TapCursor::Finished)
    }

    /// 从 `line` 行起第一个含有单词的位置。
    fn first_word_from(&self, line: usize) -> Option<WordPosition> {
        (line..self.lines.len())
            .find(|&i| !self.lines[i].words.is_empty())
            .map(|line| WordPosition { line, word: 0 })
    }

    fn next_position(&self, position: WordPosition) -> Option<WordPosition> {
        let words = self.lines.get(position.line)?.words.len();
        if position.word + 1 < words {
            return Some(WordPosition {
                word: position.word + 1,
                ..position
            });
        }
        self.first_word_from(position.line + 1)
    }

    /// 点击一次。
    pub fn tap(&mut self, media: &mut impl MediaPort) -> Result<WordTap> {
        let position = match self.cursor {
            TapCursor::Finished => return Ok(WordTap::Ignored),
            TapCursor::Idle => {
                let Some(first) = self.first_word_from(0) else {
                    return Ok(WordTap::Ignored);
                };
                media.play()?;
                self.cursor = TapCursor::Active(first);
                return Ok(WordTap::Started);
            }
            TapCursor::Active(position) => position,
        };

        let at = media.current_time();
        if let Some(previous) = self.last_marked
            && let Some(word) = self.word_mut(previous)
        {
            word.end = at;
        }
        if let Some(word) = self.word_mut(position) {
            word.begin = at;
        }
        self.last_marked = Some(position);

        if let Some(next) = self.next_position(position) {
            self.cursor = TapCursor::Active(next);
            Ok(WordTap::Marked { next })
        } else {
            media.pause();
            self.cursor = TapCursor::Finished;
            debug!("逐字打轴完成");
            Ok(WordTap::Finished)
        }
    }

    fn word_mut(&mut self, position: WordPosition) -> Option<&mut lyric_sync_core::TimedWord> {
        self.lines
            .get_mut(position.line)?
            .words
            .get_mut(position.word)
    }

    /// 手动设置单词时间，返回位置是否存在。
    pub fn set_word_times(&mut self, position: WordPosition, begin: f64, end: f64) -> bool {
        match self.word_mut(position) {
            Some(word) => {
                word.begin = begin.max(0.0);
                word.end = end.max(0.0);
                true
            }
            None => false,
        }
    }

    /// 跳到单词的开始时间并播放。开始时间未设置时不跳转。
    pub fn seek_to_word(&self, position: WordPosition, media: &mut impl MediaPort) -> Result<()> {
        let Some(word) = self
            .lines
            .get(position.line)
            .and_then(|line| line.words.get(position.word))
        else {
            return Ok(());
        };
        if word.has_begin() {
            media.seek(word.begin);
            media.play()?;
        }
        Ok(())
    }

    /// 回到未开始的状态，保留已写入的时间。
    pub const fn restart(&mut self) {
        self.cursor = TapCursor::Idle;
        self.last_marked = None;
    }

    /// 生成逐字 TTML。
    pub fn to_ttml(&self) -> std::result::Result<String, ConvertError> {
        ttml_processor::generate_word_ttml(&self.lines)
    }
}
