//! 变更协调器
//!
//! 后端要求单词先注册为"学习中"，才能为它记录复习结果。学习流
//! 的提交因此是两步串行变更：`add_to_learning` 完全成功之后才
//! 允许发出 `submit_review`。这一约束在这里是显式契约而不是
//! 调用点之间的默契，部分提交失败也有自己命名的错误形态。

use tracing::warn;

use crate::api::types::{ReviewOutcome, Word};
use crate::api::{ApiError, ContentService};

#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// 注册失败；复习结果从未被发送。
    #[error("failed to register word {word_id}: {source}")]
    Register {
        word_id: i64,
        #[source]
        source: ApiError,
    },
    /// 单词已注册成功，但复习结果提交失败。后端状态已部分前进，
    /// 引擎不做补偿（不存在回滚调用），如实上报给调用方。
    #[error("word {word_id} registered but review was not recorded: {source}")]
    ReviewAfterRegister {
        word_id: i64,
        #[source]
        source: ApiError,
    },
    /// 复习流的直接提交失败。
    #[error("failed to record review for word {word_id}: {source}")]
    Review {
        word_id: i64,
        #[source]
        source: ApiError,
    },
}

/// 对一次提交涉及的变更做串行编排。本身无状态，按提交借用
/// 内容服务。
pub struct MutationCoordinator<'a, S> {
    service: &'a S,
}

impl<'a, S: ContentService> MutationCoordinator<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }

    /// 学习流提交：先注册，注册成功后才提交复习结果。
    pub async fn commit_learn(
        &self,
        word: &Word,
        outcome: &ReviewOutcome,
    ) -> Result<(), CommitError> {
        if let Err(source) = self.service.add_to_learning(word.id).await {
            warn!(word_id = word.id, error = %source, "add-to-learning failed");
            return Err(CommitError::Register {
                word_id: word.id,
                source,
            });
        }

        if let Err(source) = self.service.submit_review(outcome).await {
            warn!(
                word_id = word.id,
                error = %source,
                "review lost after successful registration"
            );
            return Err(CommitError::ReviewAfterRegister {
                word_id: word.id,
                source,
            });
        }

        Ok(())
    }

    /// 复习流提交：单词已在学习列表中，直接记录结果。
    pub async fn commit_review_only(&self, outcome: &ReviewOutcome) -> Result<(), CommitError> {
        self.service
            .submit_review(outcome)
            .await
            .map_err(|source| {
                warn!(word_id = outcome.word_id, error = %source, "submit-review failed");
                CommitError::Review {
                    word_id: outcome.word_id,
                    source,
                }
            })
    }

    /// 学习流跳过：只注册，不记录任何质量分。
    pub async fn commit_skip(&self, word: &Word) -> Result<(), CommitError> {
        self.service
            .add_to_learning(word.id)
            .await
            .map_err(|source| {
                warn!(word_id = word.id, error = %source, "add-to-learning failed");
                CommitError::Register {
                    word_id: word.id,
                    source,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::api::types::BatchKind;

    #[derive(Default)]
    struct CountingService {
        fail_add: bool,
        fail_review: bool,
        add_calls: AtomicUsize,
        review_calls: AtomicUsize,
    }

    fn service_error() -> ApiError {
        ApiError::HttpStatus {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        }
    }

    impl ContentService for CountingService {
        async fn fetch_batch(&self, _kind: BatchKind, _limit: u32) -> Result<Vec<Word>, ApiError> {
            Ok(Vec::new())
        }

        async fn add_to_learning(&self, _word_id: i64) -> Result<(), ApiError> {
            self.add_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_add {
                return Err(service_error());
            }
            Ok(())
        }

        async fn submit_review(&self, _outcome: &ReviewOutcome) -> Result<(), ApiError> {
            self.review_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_review {
                return Err(service_error());
            }
            Ok(())
        }
    }

    fn word(id: i64) -> Word {
        Word {
            id,
            english: "cat".to_string(),
            translation: String::new(),
            phonetic: None,
            example_sentence: None,
            example_sentence_translation: None,
            image_url: None,
        }
    }

    fn outcome(word_id: i64) -> ReviewOutcome {
        ReviewOutcome {
            word_id,
            quality: 5,
            was_correct: true,
            response_time_ms: 1000,
        }
    }

    #[tokio::test]
    async fn commit_learn_registers_then_reviews() {
        let service = CountingService::default();
        let coordinator = MutationCoordinator::new(&service);

        coordinator
            .commit_learn(&word(1), &outcome(1))
            .await
            .unwrap();

        assert_eq!(service.add_calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.review_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_registration_never_submits_review() {
        let service = CountingService {
            fail_add: true,
            ..CountingService::default()
        };
        let coordinator = MutationCoordinator::new(&service);

        let err = coordinator
            .commit_learn(&word(1), &outcome(1))
            .await
            .unwrap_err();

        assert!(matches!(err, CommitError::Register { word_id: 1, .. }));
        assert_eq!(service.review_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn partial_commit_is_surfaced_as_its_own_failure() {
        let service = CountingService {
            fail_review: true,
            ..CountingService::default()
        };
        let coordinator = MutationCoordinator::new(&service);

        let err = coordinator
            .commit_learn(&word(1), &outcome(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CommitError::ReviewAfterRegister { word_id: 1, .. }
        ));
        assert_eq!(service.add_calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.review_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn review_only_skips_registration() {
        let service = CountingService::default();
        let coordinator = MutationCoordinator::new(&service);

        coordinator.commit_review_only(&outcome(2)).await.unwrap();

        assert_eq!(service.add_calls.load(Ordering::SeqCst), 0);
        assert_eq!(service.review_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn skip_registers_without_review() {
        let service = CountingService::default();
        let coordinator = MutationCoordinator::new(&service);

        coordinator.commit_skip(&word(3)).await.unwrap();

        assert_eq!(service.add_calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.review_calls.load(Ordering::SeqCst), 0);
    }
}
