//! 平台语音后端
//!
//! 桌面平台不提供原生语音合成/识别，由外层的 Web Speech API
//! 承担实际播放与采音；这里的后端如实上报"不支持"，引擎据此
//! 发出提示而不改变会话状态。

use super::{RecognizerBackend, SpeechError, SpeechIo, SynthesizerBackend, TtsConfig};

/// 宿主平台的合成后端。
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformSynthesizer;

impl SynthesizerBackend for PlatformSynthesizer {
    fn is_available(&self) -> bool {
        false
    }

    fn speak(&self, _text: &str, _config: &TtsConfig) -> Result<(), SpeechError> {
        Err(SpeechError::NotSupported)
    }
}

/// 宿主平台的识别后端。
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformRecognizer;

impl RecognizerBackend for PlatformRecognizer {
    type Stream = ();

    fn is_available(&self) -> bool {
        false
    }

    async fn open_stream(&self) -> Result<(), SpeechError> {
        Err(SpeechError::NotSupported)
    }

    async fn recognize(&self, _stream: &mut ()) -> Result<String, SpeechError> {
        Err(SpeechError::NotSupported)
    }
}

/// 平台默认的语音 I/O 组合。
pub type PlatformSpeech = SpeechIo<PlatformSynthesizer, PlatformRecognizer>;

impl PlatformSpeech {
    pub fn platform(tts: TtsConfig) -> Self {
        SpeechIo::new(PlatformSynthesizer, PlatformRecognizer, tts)
    }
}
