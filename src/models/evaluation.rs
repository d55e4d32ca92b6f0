//! 评估维度与结构化评估结果
//!
//! 三个评估维度按固定顺序执行：语言质量 → 分析深度 → 思路清晰度

use serde::{Deserialize, Serialize};
use std::fmt;

/// 评估维度
///
/// 评估结果按维度标识存储，而不是按列表位置解释
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rubric {
    /// 语言质量
    Language,
    /// 分析深度
    Analysis,
    /// 思路清晰度
    Clarity,
}

impl Rubric {
    /// 固定的评估顺序
    pub const ALL: [Rubric; 3] = [Rubric::Language, Rubric::Analysis, Rubric::Clarity];

    /// 评估提示词中使用的维度描述
    pub fn focus(&self) -> &'static str {
        match self {
            Rubric::Language => "language quality",
            Rubric::Analysis => "depth of analysis",
            Rubric::Clarity => "clarity of thought",
        }
    }

    /// 报告中使用的维度名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Rubric::Language => "Language",
            Rubric::Analysis => "Depth of Analysis",
            Rubric::Clarity => "Clarity of Thought",
        }
    }
}

impl fmt::Display for Rubric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// 结构化 LLM 调用的返回结果
///
/// 分数范围 [0, 10]，超出范围视为解析失败
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutput {
    /// 评语
    pub feedback: String,
    /// 分数（满分 10）
    pub score: u8,
}
