use std::time::Duration;

use crate::speech::TtsConfig;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000/api/v1";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_BATCH_LIMIT: u32 = 5;
/// 服务端对批量拉取数量的上限 (FastAPI `le=50` 校验)。
const MAX_BATCH_LIMIT: u32 = 50;

/// 内容服务客户端配置。
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// 服务端基础地址，末尾不带斜杠。
    pub base_url: String,
    /// 由外层认证模块提供的 bearer token；引擎从不解析它。
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// 学习会话引擎配置。
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    /// 每次批量拉取的单词数量。
    pub batch_limit: u32,
    pub tts: TtsConfig,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        let base_url = normalize_base_url(
            env_string("API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        );
        let token = env_string("API_TOKEN");
        let timeout =
            Duration::from_millis(env_u64("API_TIMEOUT_MS").unwrap_or(DEFAULT_TIMEOUT_MS));

        let batch_limit = env_u64("BATCH_LIMIT")
            .map(|v| v as u32)
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_BATCH_LIMIT)
            .min(MAX_BATCH_LIMIT);

        let mut tts = TtsConfig::default();
        if let Some(language) = env_string("TTS_LANGUAGE") {
            tts.language = language;
        }
        if let Some(rate) = env_string("TTS_RATE").and_then(|v| v.parse::<f32>().ok()) {
            if rate > 0.0 {
                tts.rate = rate;
            }
        }

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            api: ApiConfig {
                base_url,
                token,
                timeout,
            },
            batch_limit,
            tts,
            log_level,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            batch_limit: DEFAULT_BATCH_LIMIT,
            tts: TtsConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse::<u64>().ok())
}
