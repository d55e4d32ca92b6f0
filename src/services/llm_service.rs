//! LLM 服务 - 业务能力层
//!
//! 只负责"调用 LLM"能力，不关心评估流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use regex::Regex;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::models::EvaluationOutput;

/// 结构化调用的系统消息
///
/// 要求模型只返回固定形状的 JSON，解析失败直接报错，不做兜底
const STRUCTURED_SYSTEM_MESSAGE: &str = "You are an essay evaluation assistant. \
Reply with a single JSON object of the exact shape \
{\"feedback\": \"<detailed feedback for the essay>\", \"score\": <integer from 0 to 10>}. \
Do not include any text outside the JSON object.";

/// LLM 调用接口
///
/// 评估流程只依赖这个接口；测试中用桩实现替换真实服务
#[allow(async_fn_in_trait)]
pub trait LlmApi {
    /// 自由文本模式：发送提示词，返回模型的文本回复
    async fn complete(&self, user_message: &str, system_message: Option<&str>) -> Result<String>;

    /// 结构化模式：发送提示词，返回 `{feedback, score}` 固定形状的结果
    async fn complete_structured(&self, user_message: &str) -> Result<EvaluationOutput>;
}

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API（自由文本 / 结构化两种模式）
/// - 解析并校验结构化返回结果
/// - 不出现 SessionRecord
/// - 不关心评估顺序
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// 这是最基础的 LLM 调用接口，两种模式都基于此函数。
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        // 构建消息列表
        let mut messages = Vec::new();

        // 添加系统消息（如果提供）
        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        // 添加用户消息
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        // 构建请求
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                AppError::Llm(crate::error::LlmError::EmptyResponse {
                    model: self.model_name.clone(),
                })
            })?;

        Ok(content.trim().to_string())
    }
}

impl LlmApi for LlmService {
    async fn complete(&self, user_message: &str, system_message: Option<&str>) -> Result<String> {
        self.send_to_llm(user_message, system_message).await
    }

    async fn complete_structured(&self, user_message: &str) -> Result<EvaluationOutput> {
        let response = self
            .send_to_llm(user_message, Some(STRUCTURED_SYSTEM_MESSAGE))
            .await?;

        let output = parse_evaluation(&response)?;

        debug!("结构化结果解析成功，分数: {}", output.score);

        Ok(output)
    }
}

/// 解析结构化 LLM 响应
///
/// 接受裸 JSON 对象，或包在 ``` 代码块中的 JSON 对象；
/// 其他任何形状都视为解析失败（不做默认值兜底）
pub fn parse_evaluation(response: &str) -> Result<EvaluationOutput> {
    let raw = extract_json(response);

    let output: EvaluationOutput = serde_json::from_str(raw)
        .map_err(|e| AppError::schema_parse_failed(response, e))?;

    if output.score > 10 {
        return Err(AppError::Llm(crate::error::LlmError::ScoreOutOfRange {
            score: output.score,
        })
        .into());
    }

    Ok(output)
}

/// 从响应中提取 JSON 片段
///
/// 模型偶尔会把 JSON 包在 Markdown 代码块里
fn extract_json(response: &str) -> &str {
    if let Ok(fenced) = Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```") {
        if let Some(inner) = fenced.captures(response).and_then(|c| c.get(1)) {
            return inner.as_str();
        }
    }
    response.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_evaluation_bare_json() {
        let output = parse_evaluation(r#"{"feedback": "well written", "score": 8}"#).unwrap();
        assert_eq!(output.feedback, "well written");
        assert_eq!(output.score, 8);
    }

    #[test]
    fn test_parse_evaluation_fenced_json() {
        let response = "```json\n{\"feedback\": \"ok\", \"score\": 7}\n```";
        let output = parse_evaluation(response).unwrap();
        assert_eq!(output.feedback, "ok");
        assert_eq!(output.score, 7);
    }

    #[test]
    fn test_parse_evaluation_fenced_without_language_tag() {
        let response = "```\n{\"feedback\": \"ok\", \"score\": 0}\n```";
        let output = parse_evaluation(response).unwrap();
        assert_eq!(output.score, 0);
    }

    #[test]
    fn test_parse_evaluation_rejects_free_text() {
        let result = parse_evaluation("I would give this essay a 7 out of 10.");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_evaluation_rejects_score_out_of_range() {
        let result = parse_evaluation(r#"{"feedback": "ok", "score": 11}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_evaluation_rejects_negative_score() {
        // u8 反序列化拒绝负数
        let result = parse_evaluation(r#"{"feedback": "ok", "score": -1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_evaluation_rejects_missing_field() {
        let result = parse_evaluation(r#"{"score": 7}"#);
        assert!(result.is_err());
    }

    /// 创建测试用的 LlmService
    fn create_test_service() -> LlmService {
        let config = Config::from_env();
        LlmService::new(&config)
    }

    /// 测试自由文本调用
    ///
    /// 运行方式：
    /// ```bash
    /// cargo test test_complete_free_text -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_complete_free_text() {
        let _ = tracing_subscriber::fmt::try_init();

        let service = create_test_service();

        println!("\n========== 测试自由文本调用 ==========");
        let result = service
            .complete("Say hello in one short sentence.", None)
            .await;

        match result {
            Ok(response) => {
                println!("\n========== LLM 响应 ==========");
                println!("{}", response);
                println!("==============================\n");
                assert!(!response.is_empty());
            }
            Err(e) => {
                println!("❌ LLM 调用失败: {}", e);
                panic!("测试失败: {}", e);
            }
        }
    }

    /// 测试结构化调用
    #[tokio::test]
    #[ignore]
    async fn test_complete_structured_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let service = create_test_service();

        println!("\n========== 测试结构化调用 ==========");
        let prompt = "Evaluate the language quality of the following essay:\nTechnology has changed how people communicate.";

        let result = service.complete_structured(prompt).await;

        match result {
            Ok(output) => {
                println!("\n========== 评估结果 ==========");
                println!("评语: {}", output.feedback);
                println!("分数: {}/10", output.score);
                println!("==============================\n");
                assert!(output.score <= 10);
                assert!(!output.feedback.is_empty());
            }
            Err(e) => {
                println!("❌ 结构化调用失败: {}", e);
                panic!("测试失败: {}", e);
            }
        }
    }
}
