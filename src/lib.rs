//! # danci-session - 学习会话引擎
//!
//! 词汇应用的客户端会话引擎：驱动用户走完一批单词的学习/复习，
//! 编排异步网络变更、语音输入输出与多阶段复习状态机，并保证
//! 后端的不变量：单词必须先注册为"学习中"，才能为它记录复习
//! 结果。
//!
//! ## 模块结构
//!
//! - [`api`] - 内容服务客户端（批量拉取、注册、提交复习、统计）
//! - [`session`] - 会话核心（队列、评分、变更协调、状态机）
//! - [`speech`] - 语音 I/O 适配器（TTS 播放、识别与麦克风生命周期）
//! - [`normalize`] - 作答/转写文本归一化
//! - [`config`] - 环境变量驱动的引擎配置
//! - [`logging`] - tracing 初始化
//!
//! ## 使用示例
//!
//! ```no_run
//! use danci_session::speech::platform::PlatformSpeech;
//! use danci_session::{Config, ContentClient, SessionEngine, SessionFlow};
//!
//! # async fn run() {
//! let config = Config::from_env();
//! let client = ContentClient::new(config.api.clone());
//! let speech = PlatformSpeech::platform(config.tts.clone());
//!
//! let mut session = SessionEngine::new(SessionFlow::Review, client, speech, config.batch_limit);
//! session.start().await;
//! # }
//! ```

pub mod api;
pub mod config;
pub mod logging;
pub mod normalize;
pub mod session;
pub mod speech;

pub use api::types::{BatchKind, ReviewOutcome, Word};
pub use api::{ApiError, ContentClient, ContentService};
pub use config::{ApiConfig, Config};
pub use session::coordinator::{CommitError, MutationCoordinator};
pub use session::engine::{Notice, SessionEngine, SessionFlow, SessionState};
pub use session::queue::SessionQueue;
pub use speech::{ListenOutcome, SpeechError, SpeechIo, TtsConfig};
