//! 评估报告格式化
//!
//! 把一次评估的结果渲染成固定模板的多段式报告，
//! 作为助手消息追加到会话记录中

use crate::models::{Rubric, SessionRecord};

/// 格式化评估报告
///
/// 模板固定：三个维度各一段（评语 + 分数），分隔线，总评 + 平均分（两位小数）。
/// 缺失的维度渲染为 N/A。
pub fn format_report(record: &SessionRecord) -> String {
    let feedback = |rubric: Rubric| record.feedback_for(rubric).unwrap_or("N/A");
    let score = |rubric: Rubric| {
        record
            .score_for(rubric)
            .map(|s| s.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    };

    format!(
        "**1. Language Evaluation**\n\
         > {}\n\
         **Score:** {}/10\n\
         \n\
         **2. Depth of Analysis Evaluation**\n\
         > {}\n\
         **Score:** {}/10\n\
         \n\
         **3. Clarity of Thought Evaluation**\n\
         > {}\n\
         **Score:** {}/10\n\
         \n\
         ---\n\
         \n\
         **Overall Evaluation & Final Score**\n\
         {}\n\
         **Average Score:** {:.2}/10",
        feedback(Rubric::Language),
        score(Rubric::Language),
        feedback(Rubric::Analysis),
        score(Rubric::Analysis),
        feedback(Rubric::Clarity),
        score(Rubric::Clarity),
        if record.overall_feedback.is_empty() {
            "N/A"
        } else {
            &record.overall_feedback
        },
        record.avg_score
    )
}
