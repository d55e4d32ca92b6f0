//! # Essay Eval
//!
//! 一个基于 LLM 的文章评估助手
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据模型层（Models）
//! - `models/` - 评估维度、会话消息、会话记录
//! - `Rubric` - 三个评估维度（语言质量 / 分析深度 / 思路清晰度）
//! - `SessionRecord` - 每个会话的完整状态
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `LlmService` - LLM 调用能力（自由文本 / 结构化两种模式）
//! - `SessionStore` - 会话记录按 key 存取能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一篇文章"的完整评估流程
//! - `EvaluationFlow` - 四阶段流程编排（语言 → 分析 → 清晰度 → 汇总）
//! - `format_report` - 评估报告格式化
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/interface` - 会话管理（创建 / 提交 / 列出 / 回看）
//! - `orchestrator/app` - 交互式终端应用
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{EvaluationOutput, Message, Role, Rubric, RubricResult, SessionRecord};
pub use orchestrator::{App, SessionInterface};
pub use services::{JsonFileStore, LlmApi, LlmService, MemoryStore, SessionStore};
pub use workflow::{format_report, EvaluationFlow};
