//! 语音输入输出适配器
//!
//! 把平台的语音合成/识别能力包在能力检查之后，状态机不直接
//! 接触硬件。麦克风是会话中唯一的独占硬件资源：同一时刻最多
//! 打开一个 [`MicrophoneSession`]，并在任何退出路径上释放。
//!
//! 识别底层的 start/result/error/end 回调编排收拢为单个挂起点
//! [`SpeechIo::listen_once`]，返回固定的四种结果之一。

pub mod platform;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::normalize::normalize_answer;

/// TTS 播放配置。
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// 语言代码 (如 "en-US")
    pub language: String,
    /// 语速 (0.5 - 2.0, 1.0 为正常)
    pub rate: f32,
    /// 音调 (0.5 - 2.0, 1.0 为正常)
    pub pitch: f32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            rate: 0.9, // 稍慢一点，便于学习
            pitch: 1.0,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum SpeechError {
    #[error("speech capability not supported on this platform")]
    NotSupported,
    #[error("microphone permission denied")]
    PermissionDenied,
    #[error("audio device error: {0}")]
    Device(String),
    #[error("recognition failed: {0}")]
    Recognition(String),
    #[error("synthesis failed: {0}")]
    Synthesis(String),
}

/// `listen_once` 的全部可能结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenOutcome {
    /// 归一化后的转写与目标发音一致。
    Matched,
    /// 识别成功但不一致；携带转写供外层提示。
    Mismatched { transcript: String },
    /// 设备/权限/识别过程出错。
    DeviceError,
    /// 平台没有识别能力。
    Unsupported,
}

/// 语音合成后端。播放是发射后不管的：调用方不等待播放完成。
pub trait SynthesizerBackend {
    fn is_available(&self) -> bool;
    fn speak(&self, text: &str, config: &TtsConfig) -> Result<(), SpeechError>;
}

/// 语音识别后端。`open_stream` 申请麦克风，`recognize` 消费一段
/// 语音并返回转写；流的释放由上层的 [`MicrophoneSession`] 负责。
#[allow(async_fn_in_trait)]
pub trait RecognizerBackend {
    type Stream;

    fn is_available(&self) -> bool;
    async fn open_stream(&self) -> Result<Self::Stream, SpeechError>;
    async fn recognize(&self, stream: &mut Self::Stream) -> Result<String, SpeechError>;
}

/// 打开的麦克风会话。构造时计数加一，Drop 时减一并释放底层流，
/// 因此任何返回路径都不会泄漏会话。
pub struct MicrophoneSession<T> {
    stream: T,
    counter: Arc<AtomicUsize>,
}

impl<T> MicrophoneSession<T> {
    fn open(stream: T, counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { stream, counter }
    }

    fn stream_mut(&mut self) -> &mut T {
        &mut self.stream
    }
}

impl<T> Drop for MicrophoneSession<T> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// 语音 I/O 门面。
///
/// `listen_once` 以 `&mut self` 独占适配器：上一次调用返回前必然
/// 已经释放了它的 MicrophoneSession，"同一时刻至多一次识别" 由
/// 借用检查保证而不是运行时标志。
pub struct SpeechIo<S, R> {
    synthesizer: S,
    recognizer: R,
    tts: TtsConfig,
    open_sessions: Arc<AtomicUsize>,
}

impl<S, R> SpeechIo<S, R>
where
    S: SynthesizerBackend,
    R: RecognizerBackend,
{
    pub fn new(synthesizer: S, recognizer: R, tts: TtsConfig) -> Self {
        Self {
            synthesizer,
            recognizer,
            tts,
            open_sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 请求播放一段文本。只表示播放已提交，不等待完成；
    /// 平台没有合成能力时返回错误，由调用方降级为提示。
    pub fn speak(&self, text: &str) -> Result<(), SpeechError> {
        if !self.synthesizer.is_available() {
            return Err(SpeechError::NotSupported);
        }
        debug!(%text, "tts speak");
        self.synthesizer.speak(text, &self.tts)
    }

    /// 进行一次"跟读"识别并与目标发音比对。
    ///
    /// 能力缺失或麦克风申请失败时直接返回，不会打开会话；
    /// 申请成功后恰好打开一个会话，识别结束（含出错）即释放。
    pub async fn listen_once(&mut self, target: &str) -> ListenOutcome {
        if !self.recognizer.is_available() {
            return ListenOutcome::Unsupported;
        }

        let stream = match self.recognizer.open_stream().await {
            Ok(stream) => stream,
            Err(SpeechError::NotSupported) => return ListenOutcome::Unsupported,
            Err(err) => {
                warn!(error = %err, "microphone unavailable");
                return ListenOutcome::DeviceError;
            }
        };

        let mut session = MicrophoneSession::open(stream, Arc::clone(&self.open_sessions));
        let transcript = match self.recognizer.recognize(session.stream_mut()).await {
            Ok(transcript) => transcript,
            Err(err) => {
                warn!(error = %err, "recognition failed");
                drop(session);
                return ListenOutcome::DeviceError;
            }
        };
        drop(session);

        let spoken = normalize_answer(&transcript);
        if spoken == normalize_answer(target) {
            ListenOutcome::Matched
        } else {
            ListenOutcome::Mismatched { transcript: spoken }
        }
    }

    /// 当前打开的麦克风会话数。正常情况下只会是 0 或 1。
    pub fn open_session_count(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    pub fn tts_config(&self) -> &TtsConfig {
        &self.tts
    }
}
