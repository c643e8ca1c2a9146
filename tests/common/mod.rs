//! 集成测试共用的内存桩：内容服务与语音后端。

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use danci_session::api::types::{BatchKind, ReviewOutcome, Word};
use danci_session::api::{ApiError, ContentService};
use danci_session::speech::{
    RecognizerBackend, SpeechError, SpeechIo, SynthesizerBackend, TtsConfig,
};

pub fn word(id: i64, english: &str) -> Word {
    Word {
        id,
        english: english.to_string(),
        translation: format!("{english}-tr"),
        phonetic: None,
        example_sentence: None,
        example_sentence_translation: None,
        image_url: None,
    }
}

fn service_error() -> ApiError {
    ApiError::HttpStatus {
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        body: "mock failure".to_string(),
    }
}

/// 按脚本回放批量拉取结果的内容服务桩。脚本耗尽后返回空批次。
#[derive(Default)]
pub struct MockService {
    batches: Mutex<VecDeque<Result<Vec<Word>, ()>>>,
    pub fetch_calls: AtomicUsize,
    pub add_calls: AtomicUsize,
    pub review_calls: AtomicUsize,
    pub fail_add: AtomicBool,
    pub fail_review: AtomicBool,
    pub submitted: Mutex<Vec<ReviewOutcome>>,
}

impl MockService {
    pub fn with_batches(batches: Vec<Result<Vec<Word>, ()>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            ..Self::default()
        }
    }

    pub fn single_batch(words: Vec<Word>) -> Self {
        Self::with_batches(vec![Ok(words)])
    }

    pub fn set_fail_add(&self, fail: bool) {
        self.fail_add.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_review(&self, fail: bool) {
        self.fail_review.store(fail, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> Vec<ReviewOutcome> {
        self.submitted.lock().clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn adds(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    pub fn reviews(&self) -> usize {
        self.review_calls.load(Ordering::SeqCst)
    }
}

impl ContentService for &MockService {
    async fn fetch_batch(&self, _kind: BatchKind, _limit: u32) -> Result<Vec<Word>, ApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match self.batches.lock().pop_front() {
            Some(Ok(words)) => Ok(words),
            Some(Err(())) => Err(service_error()),
            None => Ok(Vec::new()),
        }
    }

    async fn add_to_learning(&self, _word_id: i64) -> Result<(), ApiError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(service_error());
        }
        Ok(())
    }

    async fn submit_review(&self, outcome: &ReviewOutcome) -> Result<(), ApiError> {
        self.review_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_review.load(Ordering::SeqCst) {
            return Err(service_error());
        }
        self.submitted.lock().push(outcome.clone());
        Ok(())
    }
}

pub struct MockSynth {
    pub available: bool,
}

impl SynthesizerBackend for MockSynth {
    fn is_available(&self) -> bool {
        self.available
    }

    fn speak(&self, _text: &str, _config: &TtsConfig) -> Result<(), SpeechError> {
        Ok(())
    }
}

pub struct MockRecognizer {
    pub available: bool,
    pub deny_microphone: bool,
    pub transcript: Option<String>,
}

impl MockRecognizer {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            deny_microphone: false,
            transcript: None,
        }
    }

    pub fn denied() -> Self {
        Self {
            available: true,
            deny_microphone: true,
            transcript: None,
        }
    }

    pub fn hearing(transcript: &str) -> Self {
        Self {
            available: true,
            deny_microphone: false,
            transcript: Some(transcript.to_string()),
        }
    }
}

impl RecognizerBackend for MockRecognizer {
    type Stream = ();

    fn is_available(&self) -> bool {
        self.available
    }

    async fn open_stream(&self) -> Result<(), SpeechError> {
        if self.deny_microphone {
            return Err(SpeechError::PermissionDenied);
        }
        Ok(())
    }

    async fn recognize(&self, _stream: &mut ()) -> Result<String, SpeechError> {
        self.transcript
            .clone()
            .ok_or_else(|| SpeechError::Recognition("no speech detected".to_string()))
    }
}

pub fn speech_with(recognizer: MockRecognizer) -> SpeechIo<MockSynth, MockRecognizer> {
    SpeechIo::new(
        MockSynth { available: true },
        recognizer,
        TtsConfig::default(),
    )
}

/// 合成可用、识别不可用的默认组合。
pub fn silent_speech() -> SpeechIo<MockSynth, MockRecognizer> {
    speech_with(MockRecognizer::unavailable())
}

/// 合成与识别都不可用的组合。
pub fn mute_speech() -> SpeechIo<MockSynth, MockRecognizer> {
    SpeechIo::new(
        MockSynth { available: false },
        MockRecognizer::unavailable(),
        TtsConfig::default(),
    )
}
