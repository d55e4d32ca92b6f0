//! 终端应用 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责交互式主循环和会话展示。
//!
//! ## 交互方式
//!
//! - `/new` 开启新会话
//! - `/sessions` 列出所有会话（最新的在前）
//! - `/open <key>` 回看指定会话
//! - `/help` 显示帮助
//! - `/quit` 退出
//! - 其他输入视为文章内容，空行结束输入并提交评估
//!
//! 提交过程中的任何错误都在本层捕获，以非致命的行内提示显示给用户，
//! 会话保持可用，已追加的用户发言不回滚

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info};

use crate::config::Config;
use crate::models::{Message, Role};
use crate::orchestrator::SessionInterface;
use crate::services::{JsonFileStore, LlmService};
use crate::utils::logging::{log_startup, truncate_text};
use crate::workflow::EvaluationFlow;

/// 应用主结构
pub struct App {
    interface: SessionInterface<LlmService, JsonFileStore>,
    /// 当前会话 key
    current_key: String,
    /// 当前显示的会话消息（用户 / 助手）
    history: Vec<Message>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let llm = LlmService::new(&config);
        let store = JsonFileStore::new(&config.session_dir);
        let flow = EvaluationFlow::with_verbose_logging(llm, config.verbose_logging);
        let interface = SessionInterface::new(flow, store);

        let current_key = interface.new_session()?;

        Ok(Self {
            interface,
            current_key,
            history: Vec::new(),
        })
    }

    /// 运行交互式主循环
    pub async fn run(&mut self) -> Result<()> {
        print_welcome(&self.current_key);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            prompt()?;

            let Some(line) = lines.next_line().await? else {
                // EOF，正常退出
                break;
            };

            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            if let Some(command) = line.strip_prefix('/') {
                if !self.handle_command(command) {
                    break;
                }
            } else {
                let essay = read_essay(line, &mut lines).await?;
                self.handle_submit(&essay).await;
            }
        }

        info!("👋 程序退出");
        Ok(())
    }

    /// 处理命令，返回 false 表示退出
    fn handle_command(&mut self, command: &str) -> bool {
        let mut parts = command.split_whitespace();
        match parts.next() {
            Some("new") => self.handle_new_session(),
            Some("sessions") => self.handle_list_sessions(),
            Some("open") => match parts.next() {
                Some(key) => self.handle_open_session(key),
                None => println!("用法: /open <会话key>"),
            },
            Some("help") => print_help(),
            Some("quit") | Some("exit") => return false,
            _ => println!("未知命令: /{}（输入 /help 查看帮助）", command),
        }
        true
    }

    /// 开启新会话并清空当前显示
    fn handle_new_session(&mut self) {
        match self.interface.new_session() {
            Ok(key) => {
                self.current_key = key;
                self.history.clear();
                println!("✨ 已开启新会话: {}", self.current_key);
            }
            Err(e) => {
                error!("创建会话失败: {}", e);
                println!("⚠️ 创建会话失败: {}", e);
            }
        }
    }

    /// 列出所有会话，最新的在前
    fn handle_list_sessions(&self) {
        match self.interface.list_sessions() {
            Ok(keys) if keys.is_empty() => println!("（还没有会话）"),
            Ok(keys) => {
                println!("我的评估会话（最新的在前）:");
                for key in keys {
                    let marker = if key == self.current_key { " ← 当前" } else { "" };
                    println!("  {}{}", key, marker);
                }
            }
            Err(e) => {
                error!("读取会话列表失败: {}", e);
                println!("⚠️ 读取会话列表失败: {}", e);
            }
        }
    }

    /// 切换到指定会话并回放其消息
    fn handle_open_session(&mut self, key: &str) {
        match self.interface.open_session(key) {
            Ok(messages) => {
                self.current_key = key.to_string();
                self.history = messages;
                println!("📂 已切换到会话: {}", key);
                self.render_transcript();
            }
            Err(e) => {
                error!("打开会话失败 {}: {}", key, e);
                println!("⚠️ 打开会话失败: {}", e);
            }
        }
    }

    /// 提交文章评估
    ///
    /// 错误在此捕获并行内提示，不中断主循环
    async fn handle_submit(&mut self, essay: &str) {
        info!(
            "✍️ 收到文章（{} 字符）: {}",
            essay.chars().count(),
            truncate_text(essay, 60)
        );
        println!("⏳ 正在评估文章，请稍候...");

        match self.interface.submit(&self.current_key, essay).await {
            Ok(_) => {
                self.refresh_history();
                self.render_transcript();
            }
            Err(e) => {
                error!("评估失败: {}", e);
                println!("\n⚠️ 本次评估出错: {}", e);
                println!("（会话保留，可直接重新提交）\n");
                self.refresh_history();
            }
        }
    }

    /// 从存储重新读取当前会话的消息
    fn refresh_history(&mut self) {
        match self.interface.open_session(&self.current_key) {
            Ok(messages) => self.history = messages,
            Err(e) => error!("刷新会话显示失败: {}", e),
        }
    }

    /// 渲染当前会话的完整消息列表
    fn render_transcript(&self) {
        println!("\n{}", "=".repeat(60));
        println!("会话 {}", self.current_key);
        println!("{}", "=".repeat(60));

        for message in &self.history {
            let speaker = match message.role {
                Role::User => "🧑 用户",
                Role::Assistant => "🤖 助手",
                Role::System => continue,
            };
            println!("\n{}:", speaker);
            println!("{}", message.content);
        }

        println!("\n{}\n", "=".repeat(60));
    }
}

// ========== 输入辅助函数 ==========

/// 显示输入提示符
fn prompt() -> Result<()> {
    print!("📝 > ");
    std::io::stdout().flush()?;
    Ok(())
}

/// 读取多行文章内容，空行或 EOF 结束
async fn read_essay(first_line: String, lines: &mut Lines<BufReader<Stdin>>) -> Result<String> {
    let mut buffer = vec![first_line];

    println!("（继续输入文章内容，空行结束）");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            break;
        }
        buffer.push(line);
    }

    Ok(buffer.join("\n"))
}

fn print_welcome(session_key: &str) {
    println!("{}", "=".repeat(60));
    println!("📝 文章评估助手");
    println!("{}", "=".repeat(60));
    println!("当前会话: {}", session_key);
    print_help();
}

fn print_help() {
    println!("命令:");
    println!("  /new           开启新会话");
    println!("  /sessions      列出所有会话（最新的在前）");
    println!("  /open <key>    回看指定会话");
    println!("  /help          显示帮助");
    println!("  /quit          退出");
    println!("直接输入文章内容即可提交评估（空行结束输入）\n");
}
