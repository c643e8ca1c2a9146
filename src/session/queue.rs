//! 会话单词队列
//!
//! 当前会话待学/待复习单词的内存缓冲，由会话实例独占持有，
//! 只能通过下面定义的操作变更。队列不收缩：前进只移动游标，
//! `cursor == len` 表示耗尽，需要重新 `load` 才能继续。

use crate::api::types::Word;

#[derive(Debug, Default)]
pub struct SessionQueue {
    words: Vec<Word>,
    cursor: usize,
}

impl SessionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用一批新单词替换缓冲并把游标重置到 0。
    ///
    /// 空批次是合法输入：队列直接处于耗尽态，"没有单词可学"
    /// 是正常的终态而不是错误。
    pub fn load(&mut self, words: Vec<Word>) {
        self.words = words;
        self.cursor = 0;
    }

    /// 游标处的单词；耗尽时为 None。
    pub fn current(&self) -> Option<&Word> {
        self.words.get(self.cursor)
    }

    /// 游标前进一位。耗尽后再调用是无操作。
    pub fn advance(&mut self) {
        if self.cursor < self.words.len() {
            self.cursor += 1;
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.words.len()
    }

    /// 0 基游标位置，用于 "第 i / n 个" 进度展示。
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
