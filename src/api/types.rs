//! 内容服务线上类型
//!
//! 与服务端约定的请求/响应结构。响应中多余的字段（如复习进度
//! 附带的 retention_level）会被 serde 忽略，引擎只消费这里声明
//! 的部分。

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 一条词汇。由内容服务下发的不可变值，本地从不修改，
/// 变更操作只引用它的 id。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub english: String,
    pub translation: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub example_sentence: Option<String>,
    #[serde(default)]
    pub example_sentence_translation: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// 一次复习结果。针对当前单词计算一次，提交后即丢弃。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewOutcome {
    pub word_id: i64,
    /// 记忆质量，1-5，由固定评分策略产生。
    pub quality: u8,
    pub was_correct: bool,
    #[serde(rename = "response_time")]
    pub response_time_ms: u64,
}

/// 批量拉取的来源：学习流拉新词，复习流拉到期词。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    NewWords,
    DueWords,
}

impl BatchKind {
    /// 对应的服务端路径（相对 base_url）。
    pub fn path(self) -> &'static str {
        match self {
            BatchKind::NewWords => "words/next-learning-words",
            BatchKind::DueWords => "words/next-words",
        }
    }
}

/// `POST words/add-to-learning` 的确认响应。
#[derive(Debug, Clone, Deserialize)]
pub struct AddToLearningAck {
    pub message: String,
    #[serde(default)]
    pub next_review: Option<DateTime<Utc>>,
}

/// `POST words/review` 的确认响应。
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewAck {
    pub word_id: i64,
    #[serde(default)]
    pub retention_level: Option<i64>,
    #[serde(default)]
    pub next_review: Option<DateTime<Utc>>,
}

/// `GET users/me/statistics`：仪表盘汇总，外部计算，只读展示。
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressStats {
    pub total_words_learned: i64,
    pub words_in_progress: i64,
    pub completion_rate: f64,
    pub current_streak: i64,
    pub average_retention: f64,
}

/// `GET learning/weekly-stats` 中单日的统计。
#[derive(Debug, Clone, Deserialize)]
pub struct DayStats {
    pub words_reviewed: i64,
    pub correct_answers: i64,
    pub accuracy: f64,
}

/// `GET learning/weekly-stats`：最近一周的复习统计。
#[derive(Debug, Clone, Deserialize)]
pub struct WeeklyStats {
    pub daily_stats: BTreeMap<NaiveDate, DayStats>,
    pub total_words_reviewed: i64,
    pub average_accuracy: f64,
}

/// `GET learning/streak-info`：连续学习信息。
#[derive(Debug, Clone, Deserialize)]
pub struct StreakInfo {
    pub current_streak: i64,
    pub today_activity: bool,
    pub daily_goal_met: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_deserializes_with_missing_optionals() {
        let word: Word = serde_json::from_str(
            r#"{"id": 7, "english": "cat", "translation": "kedi"}"#,
        )
        .unwrap();
        assert_eq!(word.id, 7);
        assert_eq!(word.english, "cat");
        assert!(word.phonetic.is_none());
        assert!(word.image_url.is_none());
    }

    #[test]
    fn word_ignores_progress_fields_from_review_batches() {
        // next-words 会附带复习进度字段，引擎不消费它们
        let word: Word = serde_json::from_str(
            r#"{
                "id": 3,
                "english": "dog",
                "translation": "köpek",
                "phonetic": "/dɒɡ/",
                "retention_level": 2,
                "next_review": "2026-08-01T00:00:00Z",
                "mistakes_count": 1
            }"#,
        )
        .unwrap();
        assert_eq!(word.phonetic.as_deref(), Some("/dɒɡ/"));
    }

    #[test]
    fn review_outcome_serializes_wire_field_names() {
        let outcome = ReviewOutcome {
            word_id: 42,
            quality: 5,
            was_correct: true,
            response_time_ms: 1200,
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["word_id"], 42);
        assert_eq!(value["quality"], 5);
        assert_eq!(value["was_correct"], true);
        assert_eq!(value["response_time"], 1200);
        assert!(value.get("response_time_ms").is_none());
    }

    #[test]
    fn weekly_stats_parses_dated_map() {
        let stats: WeeklyStats = serde_json::from_str(
            r#"{
                "daily_stats": {
                    "2026-08-01": {"words_reviewed": 12, "correct_answers": 9, "accuracy": 75.0},
                    "2026-08-02": {"words_reviewed": 0, "correct_answers": 0, "accuracy": 0}
                },
                "total_words_reviewed": 12,
                "average_accuracy": 75.0
            }"#,
        )
        .unwrap();
        assert_eq!(stats.daily_stats.len(), 2);
        let first = stats.daily_stats.values().next().unwrap();
        assert_eq!(first.words_reviewed, 12);
    }
}
