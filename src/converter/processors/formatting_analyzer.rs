//! 歌词格式检查与修复。
//!
//! [`analyze`] 逐行检查常见的格式问题，[`fix_one`] 与 [`fix_all`] 修复其中可自动修复的部分。
//! 所有函数都是纯函数；修复只改动文本或删除整行，行 ID 与时间保持不变。

use std::{borrow::Cow, collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter, EnumString};
use tracing::{debug, trace};

use lyric_sync_core::{LineId, SyncedLine};

/// 匹配两个及以上连续空白字符
static MULTI_WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("未能编译 MULTI_WHITESPACE_REGEX"));

/// 行尾的这些标点会被视为多余。
const TRAILING_PUNCTUATION: [char; 4] = ['.', ',', ';', ':'];
/// 行尾是这些字符时不报告标点问题。
const PUNCTUATION_EXEMPT_ENDINGS: [char; 5] = ['\'', '"', ')', '!', '?'];
/// 需要人工处理的特殊符号。
const TAG_CHARS: [char; 9] = ['*', '+', '/', '%', '&', '№', '@', '–', '—'];
/// 非标准引号与符号，以及它们的标准写法。
const SYMBOL_REPLACEMENTS: [(char, &str); 10] = [
    ('‘', "'"),
    ('’', "'"),
    ('′', "'"),
    ('“', "\""),
    ('”', "\""),
    ('„', "\""),
    ('«', "\""),
    ('»', "\""),
    ('″', "\""),
    ('…', "..."),
];

/// 格式问题的种类。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum IssueKind {
    /// 第一行为空
    StartEmpty,
    /// 最后一行为空
    EndEmpty,
    /// 连续多个空行
    EmptyLines,
    /// 首尾有多余空白
    Trim,
    /// 连续空白
    DoubleSpaces,
    /// 首字母小写
    Capitalization,
    /// 行尾多余标点
    Punctuation,
    /// 特殊符号
    Tags,
    /// 非标准引号或省略号
    Symbols,
}

impl IssueKind {
    /// 能否逐行自动修复。
    #[must_use]
    pub const fn is_line_fixable(self) -> bool {
        matches!(
            self,
            Self::Trim | Self::DoubleSpaces | Self::Capitalization | Self::Punctuation | Self::Symbols
        )
    }

    /// 能否一键修复全部。
    #[must_use]
    pub const fn is_bulk_fixable(self) -> bool {
        !matches!(self, Self::Tags)
    }

    /// 面向用户的问题描述。
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::StartEmpty => "第一行不应为空",
            Self::EndEmpty => "最后一行不应为空",
            Self::EmptyLines => "连续出现多个空行",
            Self::Trim => "行首或行尾有多余的空白",
            Self::DoubleSpaces => "存在连续的空白字符",
            Self::Capitalization => "行应以大写字母开头",
            Self::Punctuation => "行尾有多余的标点",
            Self::Tags => "存在特殊符号（*、+、/、– 等）",
            Self::Symbols => "存在非标准的引号或符号",
        }
    }
}

/// 检查出的一个问题。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisIssue {
    pub kind: IssueKind,
    pub line_index: usize,
    pub line_id: LineId,
    /// 问题所在行的文本（空行问题为说明文字）
    pub text: String,
    pub message: String,
}

impl AnalysisIssue {
    fn new(kind: IssueKind, line_index: usize, line: &SyncedLine) -> Self {
        Self {
            kind,
            line_index,
            line_id: line.id.clone(),
            text: line.text.clone(),
            message: kind.message().to_string(),
        }
    }

    fn structural(kind: IssueKind, line_index: usize, line: &SyncedLine, text: String) -> Self {
        Self {
            text,
            ..Self::new(kind, line_index, line)
        }
    }
}

/// 一次检查的全部结果，每种问题都有一项（可能为空）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    issues: BTreeMap<IssueKind, Vec<AnalysisIssue>>,
}

impl Default for AnalysisResult {
    fn default() -> Self {
        use strum::IntoEnumIterator;
        Self {
            issues: IssueKind::iter().map(|kind| (kind, Vec::new())).collect(),
        }
    }
}

impl AnalysisResult {
    /// 某一种问题的列表。
    #[must_use]
    pub fn get(&self, kind: IssueKind) -> &[AnalysisIssue] {
        self.issues.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// 按种类顺序遍历。
    pub fn iter(&self) -> impl Iterator<Item = (IssueKind, &[AnalysisIssue])> {
        self.issues.iter().map(|(kind, list)| (*kind, list.as_slice()))
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.issues.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    /// 行号最小的问题，用于"跳转到问题"。
    #[must_use]
    pub fn first_issue(&self) -> Option<&AnalysisIssue> {
        self.issues
            .values()
            .flatten()
            .min_by_key(|issue| issue.line_index)
    }

    fn push(&mut self, issue: AnalysisIssue) {
        self.issues.entry(issue.kind).or_default().push(issue);
    }
}

fn first_non_whitespace(text: &str) -> Option<(usize, char)> {
    text.char_indices().find(|(_, c)| !c.is_whitespace())
}

fn is_latin_or_cyrillic(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
}

fn needs_capitalization(text: &str) -> bool {
    first_non_whitespace(text).is_some_and(|(_, c)| is_latin_or_cyrillic(c) && c.is_lowercase())
}

fn has_trailing_punctuation(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.ends_with(TRAILING_PUNCTUATION) && !trimmed.ends_with(PUNCTUATION_EXEMPT_ENDINGS)
}

fn has_symbols(text: &str) -> bool {
    text.chars()
        .any(|c| SYMBOL_REPLACEMENTS.iter().any(|(symbol, _)| *symbol == c))
}

/// 检查所有行。
#[must_use]
pub fn analyze(lines: &[SyncedLine]) -> AnalysisResult {
    let mut result = AnalysisResult::default();

    if let Some(first) = lines.first()
        && first.is_blank()
    {
        result.push(AnalysisIssue::new(IssueKind::StartEmpty, 0, first));
    }
    if lines.len() > 1
        && let Some(last) = lines.last()
        && last.is_blank()
    {
        result.push(AnalysisIssue::new(IssueKind::EndEmpty, lines.len() - 1, last));
    }

    let mut empty_run = 0;
    for (index, line) in lines.iter().enumerate() {
        let text = line.text.as_str();

        if text.trim() != text {
            result.push(AnalysisIssue::new(IssueKind::Trim, index, line));
        }
        if has_trailing_punctuation(text) {
            result.push(AnalysisIssue::new(IssueKind::Punctuation, index, line));
        }
        if text.contains(TAG_CHARS) {
            result.push(AnalysisIssue::new(IssueKind::Tags, index, line));
        }
        if has_symbols(text) {
            result.push(AnalysisIssue::new(IssueKind::Symbols, index, line));
        }
        if MULTI_WHITESPACE_REGEX.is_match(text) {
            result.push(AnalysisIssue::new(IssueKind::DoubleSpaces, index, line));
        }
        if needs_capitalization(text) {
            result.push(AnalysisIssue::new(IssueKind::Capitalization, index, line));
        }

        if line.is_blank() {
            empty_run += 1;
        } else {
            push_empty_run(&mut result, lines, index, empty_run);
            empty_run = 0;
        }
    }
    push_empty_run(&mut result, lines, lines.len(), empty_run);

    debug!("格式检查完成，共发现 {} 个问题", result.total());
    result
}

/// 记录结束于 `end`（不含）的连续空行。
fn push_empty_run(result: &mut AnalysisResult, lines: &[SyncedLine], end: usize, run: usize) {
    if run > 1 {
        let start = end - run;
        result.push(AnalysisIssue::structural(
            IssueKind::EmptyLines,
            start,
            &lines[start],
            format!("多余的空行（{run}）"),
        ));
    }
}

fn strip_trailing_punctuation(text: &str) -> Cow<'_, str> {
    let body = text.trim_end();
    let trailing_whitespace = &text[body.len()..];
    let stripped =
        body.trim_end_matches(|c: char| TRAILING_PUNCTUATION.contains(&c) || c.is_whitespace());
    if stripped.len() == body.len() || body.ends_with(PUNCTUATION_EXEMPT_ENDINGS) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(format!("{stripped}{trailing_whitespace}"))
}

fn capitalize_first(text: &str) -> Cow<'_, str> {
    match first_non_whitespace(text) {
        Some((index, c)) if is_latin_or_cyrillic(c) && c.is_lowercase() => {
            let rest = &text[index + c.len_utf8()..];
            Cow::Owned(format!("{}{}{rest}", &text[..index], c.to_uppercase()))
        }
        _ => Cow::Borrowed(text),
    }
}

fn replace_symbols(text: &str) -> Cow<'_, str> {
    if !has_symbols(text) {
        return Cow::Borrowed(text);
    }
    let mut output = String::with_capacity(text.len());
    for c in text.chars() {
        match SYMBOL_REPLACEMENTS.iter().find(|(symbol, _)| *symbol == c) {
            Some((_, replacement)) => output.push_str(replacement),
            None => output.push(c),
        }
    }
    Cow::Owned(output)
}

/// 对单行文本应用修复。无法逐行修复的种类原样返回。
#[must_use]
pub fn fix_text(text: &str, kind: IssueKind) -> Cow<'_, str> {
    match kind {
        IssueKind::Trim => Cow::Borrowed(text.trim()),
        IssueKind::DoubleSpaces => MULTI_WHITESPACE_REGEX.replace_all(text, " "),
        IssueKind::Capitalization => capitalize_first(text),
        IssueKind::Punctuation => strip_trailing_punctuation(text),
        IssueKind::Symbols => replace_symbols(text),
        IssueKind::StartEmpty | IssueKind::EndEmpty | IssueKind::EmptyLines | IssueKind::Tags => {
            Cow::Borrowed(text)
        }
    }
}

fn fix_line(line: &SyncedLine, kind: IssueKind) -> SyncedLine {
    let mut fixed = line.clone();
    let text = fix_text(&line.text, kind);
    if text != line.text {
        fixed.text = text.into_owned();
    }
    fixed
}

/// 修复指定行的某种问题。
#[must_use]
pub fn fix_one(lines: &[SyncedLine], line_id: &LineId, kind: IssueKind) -> Vec<SyncedLine> {
    if !kind.is_line_fixable() {
        trace!("问题 {} 无法逐行修复", kind.as_ref());
        return lines.to_vec();
    }
    lines
        .iter()
        .map(|line| {
            if &line.id == line_id {
                fix_line(line, kind)
            } else {
                line.clone()
            }
        })
        .collect()
}

/// 修复全部行中的某种问题。
///
/// 空行类问题会删除整行：`StartEmpty` 删除开头的所有空行，
/// `EndEmpty` 删除末尾的所有空行（至少保留一行），`EmptyLines` 把每段连续空行合并为一行。
#[must_use]
pub fn fix_all(lines: &[SyncedLine], kind: IssueKind) -> Vec<SyncedLine> {
    let fixed: Vec<SyncedLine> = match kind {
        IssueKind::StartEmpty => lines
            .iter()
            .skip_while(|line| line.is_blank())
            .cloned()
            .collect(),
        IssueKind::EndEmpty => {
            let mut kept = lines.to_vec();
            while kept.len() > 1 && kept.last().is_some_and(SyncedLine::is_blank) {
                kept.pop();
            }
            kept
        }
        IssueKind::EmptyLines => {
            let mut kept: Vec<SyncedLine> = Vec::with_capacity(lines.len());
            for line in lines {
                let previous_blank = kept.last().is_some_and(SyncedLine::is_blank);
                if !(line.is_blank() && previous_blank) {
                    kept.push(line.clone());
                }
            }
            kept
        }
        IssueKind::Tags => lines.to_vec(),
        _ => lines.iter().map(|line| fix_line(line, kind)).collect(),
    };

    debug!(
        "已修复全部 {} 问题，行数 {} -> {}",
        kind.as_ref(),
        lines.len(),
        fixed.len()
    );
    fixed
}
