//! 内容服务客户端
//!
//! 引擎与后端之间唯一的网络边界。批量拉取允许一次透明重试，
//! 变更请求从不自动重试，重试与排序由状态机和变更协调器决定。

pub mod types;

use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

use crate::config::ApiConfig;
use types::{
    AddToLearningAck, BatchKind, ProgressStats, ReviewAck, ReviewOutcome, StreakInfo, WeeklyStats,
    Word,
};

/// GET 请求的最大透明重试次数。
const MAX_FETCH_RETRIES: usize = 1;
const BASE_BACKOFF_MS: u64 = 200;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// 引擎核心依赖的内容服务操作。
///
/// `ContentClient` 是生产实现；测试用内存桩实现同一 trait。
#[allow(async_fn_in_trait)]
pub trait ContentService {
    async fn fetch_batch(&self, kind: BatchKind, limit: u32) -> Result<Vec<Word>, ApiError>;
    async fn add_to_learning(&self, word_id: i64) -> Result<(), ApiError>;
    async fn submit_review(&self, outcome: &ReviewOutcome) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct ContentClient {
    config: ApiConfig,
    client: reqwest::Client,
}

impl ContentClient {
    pub fn new(config: ApiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { config, client }
    }

    pub fn from_env() -> Self {
        Self::new(crate::config::Config::from_env().api)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let mut last_error: Option<ApiError> = None;

        for retry in 0..=MAX_FETCH_RETRIES {
            match self.authorize(self.client.get(&url)).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let bytes = resp.bytes().await?;
                        return serde_json::from_slice(&bytes).map_err(ApiError::Json);
                    }
                    let body = resp.text().await.unwrap_or_default();
                    let err = ApiError::HttpStatus { status, body };
                    if retry < MAX_FETCH_RETRIES && is_retryable(status) {
                        warn!(%url, %status, "fetch failed, retrying");
                        sleep(Duration::from_millis(BASE_BACKOFF_MS << retry)).await;
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
                Err(err) => {
                    if retry < MAX_FETCH_RETRIES {
                        warn!(%url, error = %err, "fetch transport error, retrying");
                        sleep(Duration::from_millis(BASE_BACKOFF_MS << retry)).await;
                        last_error = Some(ApiError::Request(err));
                        continue;
                    }
                    return Err(ApiError::Request(err));
                }
            }
        }

        Err(last_error.unwrap_or(ApiError::HttpStatus {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        }))
    }

    /// 发送一次变更请求并解析确认响应。不重试。
    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let mut request = self.authorize(self.client.post(&url));
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::HttpStatus { status, body });
        }
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ApiError::Json)
    }

    pub async fn user_statistics(&self) -> Result<ProgressStats, ApiError> {
        self.get_json("users/me/statistics").await
    }

    pub async fn weekly_stats(&self) -> Result<WeeklyStats, ApiError> {
        self.get_json("learning/weekly-stats").await
    }

    pub async fn streak_info(&self) -> Result<StreakInfo, ApiError> {
        self.get_json("learning/streak-info").await
    }
}

impl ContentService for ContentClient {
    async fn fetch_batch(&self, kind: BatchKind, limit: u32) -> Result<Vec<Word>, ApiError> {
        self.get_json(&format!("{}?limit={}", kind.path(), limit))
            .await
    }

    async fn add_to_learning(&self, word_id: i64) -> Result<(), ApiError> {
        let _: AddToLearningAck = self
            .post_json(&format!("words/add-to-learning?word_id={word_id}"), None)
            .await?;
        Ok(())
    }

    async fn submit_review(&self, outcome: &ReviewOutcome) -> Result<(), ApiError> {
        let body = serde_json::to_value(outcome)?;
        let _: ReviewAck = self.post_json("words/review", Some(&body)).await?;
        Ok(())
    }
}

fn is_retryable(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}
