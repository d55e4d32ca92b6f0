//! 会话记录
//!
//! 每个评估会话对应一条 `SessionRecord`，包含文章原文、完整的消息列表、
//! 按维度存储的评估结果以及派生出来的平均分和总评

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Message, Rubric};

/// 单个维度的评估结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricResult {
    /// 评估维度
    pub rubric: Rubric,
    /// 评语
    pub feedback: String,
    /// 分数（满分 10）
    pub score: u8,
}

/// 会话记录
///
/// 生命周期：
/// - 会话创建时为空记录
/// - 每次评估运行替换上一轮的维度结果，并重新计算平均分和总评
/// - 消息列表只追加，不回滚
/// - 记录以会话 key 持久化，供后续回看
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// 文章原文（最近一次提交）
    pub essay: String,
    /// 会话消息列表（只追加）
    pub messages: Vec<Message>,
    /// 各维度评估结果，按固定评估顺序追加，最多 3 条
    pub rubric_results: Vec<RubricResult>,
    /// 平均分（派生字段）
    pub avg_score: f64,
    /// 总评（派生字段）
    pub overall_feedback: String,
    /// 会话创建时间，用于会话列表排序
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// 创建空的会话记录
    pub fn new() -> Self {
        Self {
            essay: String::new(),
            messages: Vec::new(),
            rubric_results: Vec::new(),
            avg_score: 0.0,
            overall_feedback: String::new(),
            created_at: Utc::now(),
        }
    }

    /// 追加一条消息
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// 查找指定维度的评估结果
    pub fn rubric_result(&self, rubric: Rubric) -> Option<&RubricResult> {
        self.rubric_results.iter().find(|r| r.rubric == rubric)
    }

    /// 查找指定维度的评语
    pub fn feedback_for(&self, rubric: Rubric) -> Option<&str> {
        self.rubric_result(rubric).map(|r| r.feedback.as_str())
    }

    /// 查找指定维度的分数
    pub fn score_for(&self, rubric: Rubric) -> Option<u8> {
        self.rubric_result(rubric).map(|r| r.score)
    }

    /// 按评估顺序返回所有分数
    pub fn individual_scores(&self) -> Vec<u8> {
        self.rubric_results.iter().map(|r| r.score).collect()
    }

    /// 清空上一轮的评估结果（消息列表保留）
    ///
    /// 每次评估运行都是独立的一轮，开始前调用
    pub fn clear_evaluation(&mut self) {
        self.rubric_results.clear();
        self.avg_score = 0.0;
        self.overall_feedback.clear();
    }
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_scores() -> SessionRecord {
        let mut record = SessionRecord::new();
        for (rubric, score) in Rubric::ALL.iter().zip([8u8, 6, 7]) {
            record.rubric_results.push(RubricResult {
                rubric: *rubric,
                feedback: format!("feedback for {}", rubric),
                score,
            });
        }
        record
    }

    #[test]
    fn test_individual_scores_follow_stage_order() {
        let record = record_with_scores();
        assert_eq!(record.individual_scores(), vec![8, 6, 7]);
        assert_eq!(record.score_for(Rubric::Language), Some(8));
        assert_eq!(record.score_for(Rubric::Analysis), Some(6));
        assert_eq!(record.score_for(Rubric::Clarity), Some(7));
    }

    #[test]
    fn test_clear_evaluation_keeps_messages() {
        let mut record = record_with_scores();
        record.push_message(Message::user("my essay"));
        record.avg_score = 7.0;
        record.overall_feedback = "ok".to_string();

        record.clear_evaluation();

        assert!(record.rubric_results.is_empty());
        assert_eq!(record.avg_score, 0.0);
        assert!(record.overall_feedback.is_empty());
        assert_eq!(record.messages.len(), 1);
    }

    #[test]
    fn test_missing_rubric_lookup() {
        let record = SessionRecord::new();
        assert!(record.rubric_result(Rubric::Language).is_none());
        assert!(record.individual_scores().is_empty());
    }
}
