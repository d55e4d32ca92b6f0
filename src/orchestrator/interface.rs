//! 会话接口 - 编排层
//!
//! 管理多个相互独立的评估会话，每个会话由唯一 key 标识

use anyhow::Result;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Message, Role, SessionRecord};
use crate::services::{LlmApi, SessionStore};
use crate::workflow::{format_report, EvaluationFlow};

/// 会话接口
///
/// 职责：
/// - 创建新会话并注册到存储
/// - 提交文章：追加用户消息 → 运行评估流程 → 格式化报告 → 追加助手消息
/// - 列出所有会话（最新的在前）
/// - 回看历史会话的消息列表
pub struct SessionInterface<C, S> {
    flow: EvaluationFlow<C>,
    store: S,
}

impl<C: LlmApi, S: SessionStore> SessionInterface<C, S> {
    /// 创建新的会话接口
    pub fn new(flow: EvaluationFlow<C>, store: S) -> Self {
        Self { flow, store }
    }

    /// 创建新会话，返回会话 key
    pub fn new_session(&self) -> Result<String> {
        let key = Uuid::new_v4().to_string();
        self.store.put(&key, &SessionRecord::new())?;

        info!("🆕 新会话已创建: {}", key);

        Ok(key)
    }

    /// 提交文章进行评估，返回格式化的报告
    ///
    /// 落盘策略：
    /// - 用户发言在评估前落盘，评估失败不回滚
    /// - 评估结果（维度评语、平均分、总评、助手消息）在整个流程成功后一次性落盘，
    ///   中途失败不会留下半成品的评估结果
    pub async fn submit(&self, key: &str, essay: &str) -> Result<String> {
        let mut record = self
            .store
            .get(key)?
            .ok_or_else(|| AppError::session_not_found(key))?;

        // 用户发言先落盘
        record.push_message(Message::user(essay));
        self.store.put(key, &record)?;

        // 运行评估流程（失败时错误原样上抛，已落盘的用户发言保留）
        let mut evaluated = self.flow.run(essay, record).await?;

        // 格式化报告并作为助手消息追加
        let report = format_report(&evaluated);
        evaluated.push_message(Message::assistant(&report));
        self.store.put(key, &evaluated)?;

        debug!("会话 {} 评估结果已落盘", key);

        Ok(report)
    }

    /// 列出所有会话 key，最新创建的在前
    pub fn list_sessions(&self) -> Result<Vec<String>> {
        self.store.list_keys()
    }

    /// 回看指定会话的消息列表
    ///
    /// 只保留用户和助手消息，其他类型的消息静默丢弃
    pub fn open_session(&self, key: &str) -> Result<Vec<Message>> {
        let record = self
            .store
            .get(key)?
            .ok_or_else(|| AppError::session_not_found(key))?;

        Ok(record
            .messages
            .into_iter()
            .filter(|m| matches!(m.role, Role::User | Role::Assistant))
            .collect())
    }
}
