//! 评估流程 - 流程层
//!
//! 核心职责：定义"一篇文章"的完整评估流程
//!
//! 流程顺序（固定）：
//! 1. 语言质量评估（结构化调用）
//! 2. 分析深度评估（结构化调用）
//! 3. 思路清晰度评估（结构化调用）
//! 4. 汇总：计算平均分 + 生成总评（自由文本调用）
//!
//! 每个阶段接收累积的记录、返回一个增量，由 `run` 统一合并；
//! 任一阶段失败则整个评估中止，错误原样上抛

use anyhow::Result;
use tracing::{debug, info};

use crate::models::{Rubric, RubricResult, SessionRecord};
use crate::services::LlmApi;
use crate::utils::logging::truncate_text;

/// 评估流程
///
/// - 编排四个阶段的执行顺序
/// - 不持有会话存储，只依赖 LLM 能力
/// - 对记录按值输入、按值输出，不产生隐藏的跨阶段耦合
pub struct EvaluationFlow<C> {
    llm: C,
    verbose_logging: bool,
}

impl<C: LlmApi> EvaluationFlow<C> {
    /// 创建新的评估流程
    pub fn new(llm: C) -> Self {
        Self {
            llm,
            verbose_logging: false,
        }
    }

    /// 创建并开启详细日志
    pub fn with_verbose_logging(llm: C, verbose_logging: bool) -> Self {
        Self {
            llm,
            verbose_logging,
        }
    }

    /// 运行完整的评估流程
    ///
    /// 每次运行都是独立的一轮：上一轮的维度结果被清空后重新评估。
    /// 失败时整条记录被丢弃，由调用方决定落盘策略。
    pub async fn run(&self, essay: &str, mut record: SessionRecord) -> Result<SessionRecord> {
        if self.verbose_logging {
            info!("📄 文章预览: {}", truncate_text(essay, 80));
        }

        record.essay = essay.to_string();
        record.clear_evaluation();

        // 阶段 1-3：按固定顺序逐个维度评估
        for rubric in Rubric::ALL {
            let result = self.evaluate_rubric(rubric, essay).await?;
            record.rubric_results.push(result);
        }

        // 阶段 4：汇总
        let (overall_feedback, avg_score) = self.final_evaluation(&record).await?;
        record.overall_feedback = overall_feedback;
        record.avg_score = avg_score;

        info!("✓ 评估完成，平均分: {:.2}/10", record.avg_score);

        Ok(record)
    }

    /// 评估单个维度（结构化调用）
    async fn evaluate_rubric(&self, rubric: Rubric, essay: &str) -> Result<RubricResult> {
        info!("🤖 正在评估: {}", rubric.display_name());

        let prompt = format!(
            "Evaluate the {} of the following essay:\n{}",
            rubric.focus(),
            essay
        );

        let output = self.llm.complete_structured(&prompt).await?;

        debug!("{} 评估得分: {}/10", rubric.display_name(), output.score);

        Ok(RubricResult {
            rubric,
            feedback: output.feedback,
            score: output.score,
        })
    }

    /// 汇总阶段（自由文本调用）
    ///
    /// 要求前三个阶段的结果已在记录中
    async fn final_evaluation(&self, record: &SessionRecord) -> Result<(String, f64)> {
        info!("🤖 正在生成总评...");

        let avg_score = average(&record.individual_scores());
        let prompt = build_final_prompt(record, avg_score);

        let overall_feedback = self.llm.complete(&prompt, None).await?;

        Ok((overall_feedback, avg_score))
    }
}

/// 计算平均分
///
/// 空列表返回 0.0（固定四阶段流程下不会出现，保留防御分支）
fn average(scores: &[u8]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().map(|s| *s as f64).sum::<f64>() / scores.len() as f64
}

/// 构建汇总阶段的提示词
///
/// 缺失的阶段分数渲染为 N/A
fn build_final_prompt(record: &SessionRecord, avg_score: f64) -> String {
    let rubric_line = |rubric: Rubric| {
        let feedback = record.feedback_for(rubric).unwrap_or("N/A");
        let score = record
            .score_for(rubric)
            .map(|s| s.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        format!("- {}: {} (Score: {})", rubric.display_name(), feedback, score)
    };

    format!(
        "Provide an overall evaluation considering the following feedback and scores:\n\
         {}\n{}\n{}\n\n\
         Based on this, provide a concise final summary and the final average score of {:.2}.",
        rubric_line(Rubric::Language),
        rubric_line(Rubric::Analysis),
        rubric_line(Rubric::Clarity),
        avg_score
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EvaluationOutput;
    use anyhow::anyhow;
    use std::sync::Mutex;

    /// 桩 LLM：记录所有调用，结构化调用返回固定结果
    struct StubLlm {
        /// 第 n 次结构化调用失败（从 1 开始计数）
        fail_at_structured_call: Option<usize>,
        structured_prompts: Mutex<Vec<String>>,
        free_text_prompts: Mutex<Vec<String>>,
    }

    impl StubLlm {
        fn new() -> Self {
            Self {
                fail_at_structured_call: None,
                structured_prompts: Mutex::new(Vec::new()),
                free_text_prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing_at(call: usize) -> Self {
            Self {
                fail_at_structured_call: Some(call),
                ..Self::new()
            }
        }
    }

    impl LlmApi for &StubLlm {
        async fn complete(&self, user_message: &str, _system: Option<&str>) -> Result<String> {
            self.free_text_prompts
                .lock()
                .unwrap()
                .push(user_message.to_string());
            Ok("Overall: satisfactory.".to_string())
        }

        async fn complete_structured(&self, user_message: &str) -> Result<EvaluationOutput> {
            let mut prompts = self.structured_prompts.lock().unwrap();
            prompts.push(user_message.to_string());
            if Some(prompts.len()) == self.fail_at_structured_call {
                return Err(anyhow!("LLM unavailable"));
            }
            Ok(EvaluationOutput {
                feedback: "ok".to_string(),
                score: 7,
            })
        }
    }

    #[tokio::test]
    async fn test_run_produces_three_scores_and_average() {
        let stub = StubLlm::new();
        let flow = EvaluationFlow::new(&stub);

        let record = flow
            .run("Short essay text.", SessionRecord::new())
            .await
            .unwrap();

        assert_eq!(record.individual_scores(), vec![7, 7, 7]);
        assert_eq!(record.avg_score, 7.0);
        assert_eq!(record.overall_feedback, "Overall: satisfactory.");
        assert_eq!(record.essay, "Short essay text.");
    }

    #[tokio::test]
    async fn test_stages_run_in_fixed_order() {
        let stub = StubLlm::new();
        let flow = EvaluationFlow::new(&stub);

        flow.run("essay", SessionRecord::new()).await.unwrap();

        let prompts = stub.structured_prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].contains("language quality"));
        assert!(prompts[1].contains("depth of analysis"));
        assert!(prompts[2].contains("clarity of thought"));
    }

    #[tokio::test]
    async fn test_final_prompt_references_all_feedback_and_average() {
        let stub = StubLlm::new();
        let flow = EvaluationFlow::new(&stub);

        flow.run("essay", SessionRecord::new()).await.unwrap();

        let free_text = stub.free_text_prompts.lock().unwrap();
        assert_eq!(free_text.len(), 1);
        let prompt = &free_text[0];
        assert!(prompt.contains("- Language: ok (Score: 7)"));
        assert!(prompt.contains("- Depth of Analysis: ok (Score: 7)"));
        assert!(prompt.contains("- Clarity of Thought: ok (Score: 7)"));
        assert!(prompt.contains("7.00"));
    }

    #[tokio::test]
    async fn test_failure_aborts_before_later_stages() {
        let stub = StubLlm::failing_at(2);
        let flow = EvaluationFlow::new(&stub);

        let result = flow.run("essay", SessionRecord::new()).await;
        assert!(result.is_err());

        // 语言阶段执行过、分析阶段失败、清晰度和汇总阶段从未执行
        assert_eq!(stub.structured_prompts.lock().unwrap().len(), 2);
        assert!(stub.free_text_prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_run_replaces_previous_round() {
        let stub = StubLlm::new();
        let flow = EvaluationFlow::new(&stub);

        let record = flow.run("first essay", SessionRecord::new()).await.unwrap();
        let record = flow.run("second essay", record).await.unwrap();

        // 两轮独立评估：结果仍然只有 3 条
        assert_eq!(record.individual_scores(), vec![7, 7, 7]);
        assert_eq!(record.essay, "second essay");
        // 一共发起了 6 次结构化调用（没有缓存）
        assert_eq!(stub.structured_prompts.lock().unwrap().len(), 6);
    }

    #[test]
    fn test_average_of_empty_list_is_zero() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[7, 7, 7]), 7.0);
        assert_eq!(average(&[8, 6, 7]), 7.0);
        assert_eq!(average(&[0, 10]), 5.0);
    }

    #[test]
    fn test_final_prompt_renders_missing_scores_as_na() {
        let mut record = SessionRecord::new();
        record.rubric_results.push(RubricResult {
            rubric: Rubric::Language,
            feedback: "fine".to_string(),
            score: 6,
        });

        let prompt = build_final_prompt(&record, 6.0);
        assert!(prompt.contains("- Language: fine (Score: 6)"));
        assert!(prompt.contains("- Depth of Analysis: N/A (Score: N/A)"));
        assert!(prompt.contains("- Clarity of Thought: N/A (Score: N/A)"));
    }
}
