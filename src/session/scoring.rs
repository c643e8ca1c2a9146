//! 复习评分策略
//!
//! 固定不可配置：拼写正确 5 分，拼写错误 2 分，跳过 1 分，
//! 学习流"认识"按钮无条件 5 分。外部的间隔重复算法消费这些
//! 分值，本引擎不关心它如何换算排期。

use crate::api::types::{ReviewOutcome, Word};
use crate::normalize::answers_match;

/// 完全回忆（拼写正确 / 自报认识）。
pub const QUALITY_PERFECT: u8 = 5;
/// 回答错误但完成了作答。
pub const QUALITY_INCORRECT: u8 = 2;
/// 明确跳过。
pub const QUALITY_SKIPPED: u8 = 1;

/// 学习流"认识"路径没有作答过程，按原行为提交固定名义耗时。
pub const NOMINAL_KNOWN_RESPONSE_MS: u64 = 1_000;

/// 依据键入的答案给当前单词评分。
pub fn evaluate_typed(word: &Word, typed: &str, response_time_ms: u64) -> ReviewOutcome {
    let was_correct = answers_match(typed, &word.english);
    ReviewOutcome {
        word_id: word.id,
        quality: if was_correct {
            QUALITY_PERFECT
        } else {
            QUALITY_INCORRECT
        },
        was_correct,
        response_time_ms,
    }
}

/// 跳过（复习流）：记一次最低质量的失败回忆。
pub fn evaluate_skip(word: &Word, response_time_ms: u64) -> ReviewOutcome {
    ReviewOutcome {
        word_id: word.id,
        quality: QUALITY_SKIPPED,
        was_correct: false,
        response_time_ms,
    }
}

/// "认识"（学习流）：无需拼写验证，无条件满分。
pub fn evaluate_known(word: &Word) -> ReviewOutcome {
    ReviewOutcome {
        word_id: word.id,
        quality: QUALITY_PERFECT,
        was_correct: true,
        response_time_ms: NOMINAL_KNOWN_RESPONSE_MS,
    }
}
