//! 学习会话核心
//!
//! 一次会话 = 一次页面访问：内存中的单词队列、复习状态机与
//! 变更协调器，不跨会话共享，不持久化。
//!
//! - [`queue`] - 会话单词队列（游标式缓冲）
//! - [`scoring`] - 固定的复习评分策略
//! - [`coordinator`] - 先注册后复习的变更编排
//! - [`engine`] - 复习状态机（编排核心）

pub mod coordinator;
pub mod engine;
pub mod queue;
pub mod scoring;
