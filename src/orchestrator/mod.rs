//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责会话管理和用户交互，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `interface` - 会话接口
//! - 创建会话、提交文章、列出会话、回看历史会话
//! - 持有会话存储和评估流程
//! - 决定落盘策略（用户发言先落盘，评估结果整体成功后落盘）
//!
//! ### `app` - 终端应用
//! - 交互式主循环（命令解析 + 文章输入）
//! - 渲染会话记录
//! - 捕获提交错误并以非致命方式提示用户
//!
//! ## 层次关系
//!
//! ```text
//! app (终端交互)
//!     ↓
//! interface::SessionInterface (会话管理)
//!     ↓
//! workflow::EvaluationFlow (四阶段评估流程)
//!     ↓
//! services (能力层: LlmService / SessionStore)
//! ```

pub mod app;
pub mod interface;

pub use app::App;
pub use interface::SessionInterface;
