use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// LLM 采样温度
    pub llm_temperature: f32,
    /// 单次调用的最大 token 数
    pub llm_max_tokens: u32,
    // --- 会话存储配置 ---
    /// 会话记录存放目录
    pub session_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_temperature: 0.3,
            llm_max_tokens: 1024,
            session_dir: "sessions".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量加载配置（在给定默认值的基础上覆盖）
    pub fn from_env_with(default: Self) -> Self {
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
            llm_max_tokens: std::env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_tokens),
            session_dir: std::env::var("SESSION_DIR").unwrap_or(default.session_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self::from_env_with(Self::default())
    }

    /// 加载配置：先读配置文件（如果存在），再用环境变量覆盖
    pub fn load() -> Self {
        let file_config = Self::from_file("essay_eval.toml").unwrap_or_default();
        Self::from_env_with(file_config)
    }

    /// 从 TOML 配置文件加载
    pub fn from_file(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return None;
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!("配置文件解析失败 {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                warn!("配置文件读取失败 {}: {}", path.display(), e);
                None
            }
        }
    }
}
