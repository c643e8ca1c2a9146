//! 复习状态机
//!
//! 会话引擎的编排核心：从队列取词展示，把用户动作（听、跟读、
//! 作答、判分、跳过、提交）转成状态迁移，提交经由变更协调器，
//! 成功后推进游标或补拉下一批。
//!
//! 迁移逻辑与副作用分离：动作先计算出新状态，语音播放、跟读
//! 反馈等副作用以 [`Notice`] 事件累积，由外层排空渲染，引擎核心
//! 不依赖任何 UI 或音频栈即可测试。
//!
//! 会话是一次页面访问级别的临时对象，不做持久化；引擎被丢弃时
//! 未完成的提交随之取消，结果不再被任何人观察。

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::types::{BatchKind, ReviewOutcome, Word};
use crate::api::ContentService;
use crate::session::coordinator::MutationCoordinator;
use crate::session::queue::SessionQueue;
use crate::session::scoring;
use crate::speech::{ListenOutcome, RecognizerBackend, SpeechIo, SynthesizerBackend};

/// 会话的两种流向。学习流消费新词（先注册再记录结果），
/// 复习流消费到期词（直接记录结果）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlow {
    Learn,
    Review,
}

impl SessionFlow {
    fn batch_kind(self) -> BatchKind {
        match self {
            SessionFlow::Learn => BatchKind::NewWords,
            SessionFlow::Review => BatchKind::DueWords,
        }
    }
}

/// 对外可观察的会话状态。同一时刻恰好处于其中一种，
/// 只能通过引擎动作发生迁移。
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Loading,
    Presenting {
        word: Word,
        /// 0 基游标位置，展示层通常渲染为 "第 position+1 / total 个"。
        position: usize,
        total: usize,
    },
    AwaitingInput,
    Evaluating,
    Submitting,
    /// 队列耗尽且补拉为空。正常终态，与错误展示区分。
    Exhausted,
    /// 可恢复错误：拉取失败用 [`SessionEngine::refetch`] 重试，
    /// 提交失败用 [`SessionEngine::dismiss_error`] 回到原单词重做。
    Error { message: String },
}

/// 引擎发出的瞬态副作用事件，由外层排空后渲染成提示。
/// 它们从不改变 [`SessionState`]。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// 一次跟读的结果反馈。
    Pronunciation(ListenOutcome),
    /// 平台没有语音合成能力。
    SpeechUnavailable,
    /// 单词已加入学习列表（跳过路径，无质量分）。
    WordAdded,
    /// 复习结果已记录。
    ReviewRecorded,
}

/// 提交的三种形态，对应协调器的三条路径。
enum Commit {
    Learn { word: Word, outcome: ReviewOutcome },
    ReviewOnly(ReviewOutcome),
    SkipRegister(Word),
}

pub struct SessionEngine<C, S, R> {
    session_id: Uuid,
    flow: SessionFlow,
    service: C,
    speech: SpeechIo<S, R>,
    queue: SessionQueue,
    state: SessionState,
    typed_answer: String,
    /// 当前单词进入展示的时刻；换词时重置，用于计算响应耗时。
    presented_at: Option<Instant>,
    batch_limit: u32,
    notices: VecDeque<Notice>,
}

impl<C, S, R> SessionEngine<C, S, R>
where
    C: ContentService,
    S: SynthesizerBackend,
    R: RecognizerBackend,
{
    pub fn new(flow: SessionFlow, service: C, speech: SpeechIo<S, R>, batch_limit: u32) -> Self {
        let session_id = Uuid::new_v4();
        debug!(%session_id, ?flow, "session created");
        Self {
            session_id,
            flow,
            service,
            speech,
            queue: SessionQueue::new(),
            state: SessionState::Idle,
            typed_answer: String::new(),
            presented_at: None,
            batch_limit,
            notices: VecDeque::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn flow(&self) -> SessionFlow {
        self.flow
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn queue(&self) -> &SessionQueue {
        &self.queue
    }

    pub fn speech(&self) -> &SpeechIo<S, R> {
        &self.speech
    }

    /// 取走累积的副作用事件。
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// 启动会话：拉取第一批单词。仅在 `Idle` 下有效。
    pub async fn start(&mut self) {
        if !matches!(self.state, SessionState::Idle) {
            debug!(session = %self.session_id, "start ignored, session already running");
            return;
        }
        self.state = SessionState::Loading;
        self.fetch_and_load().await;
    }

    /// 手动重新拉取。用于拉取失败后的重试，以及耗尽态的续学。
    pub async fn refetch(&mut self) {
        match self.state {
            SessionState::Error { .. } | SessionState::Exhausted => {
                self.state = SessionState::Loading;
                self.fetch_and_load().await;
            }
            _ => debug!(session = %self.session_id, "refetch ignored in current state"),
        }
    }

    /// 播放当前单词的发音。不改变会话状态。
    pub fn listen(&mut self) {
        if !matches!(
            self.state,
            SessionState::Presenting { .. }
                | SessionState::AwaitingInput
                | SessionState::Evaluating
        ) {
            return;
        }
        let Some(word) = self.queue.current() else {
            return;
        };
        let text = word.english.clone();
        if let Err(err) = self.speech.speak(&text) {
            debug!(error = %err, "speech synthesis unavailable");
            self.notices.push_back(Notice::SpeechUnavailable);
        }
    }

    /// 学习流的跟读：识别一次发音并与当前单词比对。
    /// 结果只以 [`Notice::Pronunciation`] 反馈，不影响队列与状态。
    pub async fn speak_answer(&mut self) {
        if self.flow != SessionFlow::Learn {
            return;
        }
        if !matches!(self.state, SessionState::Presenting { .. }) {
            return;
        }
        let Some(word) = self.queue.current() else {
            return;
        };
        let target = word.english.clone();
        let outcome = self.speech.listen_once(&target).await;
        debug!(session = %self.session_id, ?outcome, "pronunciation attempt");
        self.notices.push_back(Notice::Pronunciation(outcome));
    }

    /// 复习流：记录键入中的答案。
    pub fn type_answer(&mut self, typed: &str) {
        if self.flow != SessionFlow::Review {
            return;
        }
        if matches!(
            self.state,
            SessionState::Presenting { .. } | SessionState::AwaitingInput
        ) {
            self.typed_answer = typed.to_string();
            self.state = SessionState::AwaitingInput;
        }
    }

    /// 复习流：亮出答案，进入判分阶段。
    pub fn reveal(&mut self) {
        if self.flow != SessionFlow::Review {
            return;
        }
        if matches!(
            self.state,
            SessionState::Presenting { .. } | SessionState::AwaitingInput
        ) {
            self.state = SessionState::Evaluating;
        }
    }

    /// 复习流：按固定策略判分并提交（正确 5 分，错误 2 分）。
    pub async fn check(&mut self) {
        if self.flow != SessionFlow::Review {
            return;
        }
        if !matches!(self.state, SessionState::Evaluating) {
            return;
        }
        let Some(word) = self.queue.current() else {
            return;
        };
        let outcome = scoring::evaluate_typed(word, &self.typed_answer, self.elapsed_ms());
        self.run_commit(Commit::ReviewOnly(outcome)).await;
    }

    /// 学习流的"认识"：无需拼写验证，无条件满分提交。
    pub async fn known(&mut self) {
        if self.flow != SessionFlow::Learn {
            return;
        }
        if !matches!(
            self.state,
            SessionState::Presenting { .. } | SessionState::Evaluating
        ) {
            return;
        }
        let Some(word) = self.queue.current() else {
            return;
        };
        let outcome = scoring::evaluate_known(word);
        let word = word.clone();
        self.run_commit(Commit::Learn { word, outcome }).await;
    }

    /// 跳过当前单词。复习流记一次 1 分失败；学习流只注册，
    /// 不记任何质量分。
    pub async fn skip(&mut self) {
        match self.flow {
            SessionFlow::Learn => {
                if !matches!(
                    self.state,
                    SessionState::Presenting { .. } | SessionState::Evaluating
                ) {
                    return;
                }
                let Some(word) = self.queue.current() else {
                    return;
                };
                let word = word.clone();
                self.run_commit(Commit::SkipRegister(word)).await;
            }
            SessionFlow::Review => {
                if !matches!(
                    self.state,
                    SessionState::Presenting { .. }
                        | SessionState::AwaitingInput
                        | SessionState::Evaluating
                ) {
                    return;
                }
                let Some(word) = self.queue.current() else {
                    return;
                };
                let outcome = scoring::evaluate_skip(word, self.elapsed_ms());
                self.run_commit(Commit::ReviewOnly(outcome)).await;
            }
        }
    }

    /// 提交失败后回到同一个单词。游标、已键入的答案和响应计时
    /// 起点全部保留，同一动作可以原样重试。
    pub fn dismiss_error(&mut self) {
        if !matches!(self.state, SessionState::Error { .. }) {
            return;
        }
        match self.queue.current() {
            Some(word) => {
                self.state = SessionState::Presenting {
                    word: word.clone(),
                    position: self.queue.position(),
                    total: self.queue.len(),
                };
                if self.presented_at.is_none() {
                    self.presented_at = Some(Instant::now());
                }
            }
            None => self.state = SessionState::Exhausted,
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.presented_at
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }

    async fn run_commit(&mut self, commit: Commit) {
        // 上一次提交未落定前，新的提交触发是无操作
        if matches!(self.state, SessionState::Submitting) {
            debug!(session = %self.session_id, "commit already in flight, ignored");
            return;
        }
        self.state = SessionState::Submitting;

        let result = {
            let coordinator = MutationCoordinator::new(&self.service);
            match &commit {
                Commit::Learn { word, outcome } => coordinator.commit_learn(word, outcome).await,
                Commit::ReviewOnly(outcome) => coordinator.commit_review_only(outcome).await,
                Commit::SkipRegister(word) => coordinator.commit_skip(word).await,
            }
        };

        match result {
            Ok(()) => {
                self.notices.push_back(match commit {
                    Commit::SkipRegister(_) => Notice::WordAdded,
                    _ => Notice::ReviewRecorded,
                });
                self.advance_and_refill().await;
            }
            Err(err) => {
                warn!(session = %self.session_id, error = %err, "commit failed, word stays presented");
                self.state = SessionState::Error {
                    message: err.to_string(),
                };
            }
        }
    }

    /// 提交落定之后才推进游标；耗尽时立即补拉一批。
    async fn advance_and_refill(&mut self) {
        self.queue.advance();
        if !self.queue.is_exhausted() {
            self.present_or_exhaust();
            return;
        }
        self.fetch_and_load().await;
    }

    async fn fetch_and_load(&mut self) {
        match self
            .service
            .fetch_batch(self.flow.batch_kind(), self.batch_limit)
            .await
        {
            Ok(words) => {
                debug!(session = %self.session_id, count = words.len(), "batch loaded");
                self.queue.load(words);
                self.present_or_exhaust();
            }
            Err(err) => {
                // 拉取失败不触碰队列，之前的内容原样保留
                warn!(session = %self.session_id, error = %err, "batch fetch failed");
                self.state = SessionState::Error {
                    message: err.to_string(),
                };
            }
        }
    }

    fn present_or_exhaust(&mut self) {
        match self.queue.current() {
            Some(word) => {
                self.state = SessionState::Presenting {
                    word: word.clone(),
                    position: self.queue.position(),
                    total: self.queue.len(),
                };
                // 新单词成为当前词，响应计时从现在起算
                self.presented_at = Some(Instant::now());
                self.typed_answer.clear();
            }
            None => {
                self.state = SessionState::Exhausted;
                self.presented_at = None;
            }
        }
    }
}
