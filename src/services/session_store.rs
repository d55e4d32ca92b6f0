//! 会话存储 - 业务能力层
//!
//! 只负责"按 key 存取会话记录"能力，不关心评估流程
//!
//! 两种实现：
//! - `MemoryStore`: 进程内存储，用于测试
//! - `JsonFileStore`: 每个会话一个 JSON 文件，跨进程保留

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{AppError, StoreError};
use crate::models::SessionRecord;

/// 会话注册表 / 检查点存储
///
/// - key 是不透明的唯一标识
/// - 只支持创建和查询，不支持删除
/// - `list_keys` 按创建时间倒序（最新的在前）
/// - 实现必须串行化同一 key 上的并发写入
pub trait SessionStore {
    /// 读取指定 key 的会话记录
    fn get(&self, key: &str) -> Result<Option<SessionRecord>>;

    /// 写入（覆盖）指定 key 的会话记录
    fn put(&self, key: &str, record: &SessionRecord) -> Result<()>;

    /// 返回所有会话 key，最新创建的在前
    fn list_keys(&self) -> Result<Vec<String>>;
}

// ========== 内存存储 ==========

#[derive(Default)]
struct MemoryInner {
    records: HashMap<String, SessionRecord>,
    /// 插入顺序，用于倒序列出
    order: Vec<String>,
}

/// 进程内会话存储
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<SessionRecord>> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.records.get(key).cloned())
    }

    fn put(&self, key: &str, record: &SessionRecord) -> Result<()> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !inner.records.contains_key(key) {
            inner.order.push(key.to_string());
        }
        inner.records.insert(key.to_string(), record.clone());
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.order.iter().rev().cloned().collect())
    }
}

// ========== JSON 文件存储 ==========

/// 基于 JSON 文件的会话存储
///
/// 每个会话一个 `<key>.json` 文件，写入经过互斥锁串行化，
/// 避免同一会话的并发提交交错写入
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// 创建新的文件存储（目录不存在时自动创建）
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn record_path(&self, key: &str) -> Result<PathBuf> {
        // key 作为文件名使用，不允许路径分隔符
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(AppError::Store(StoreError::InvalidKey {
                key: key.to_string(),
            })
            .into());
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn read_record(&self, path: &Path, key: &str) -> Result<SessionRecord> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::store_read_failed(path.display().to_string(), e))?;

        let record = serde_json::from_str(&content).map_err(|e| {
            AppError::Store(StoreError::JsonParseFailed {
                key: key.to_string(),
                source: Box::new(e),
            })
        })?;

        Ok(record)
    }
}

impl SessionStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<SessionRecord>> {
        let path = self.record_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(self.read_record(&path, key)?))
    }

    fn put(&self, key: &str, record: &SessionRecord) -> Result<()> {
        let path = self.record_path(key)?;
        let content = serde_json::to_string_pretty(record)?;

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        fs::create_dir_all(&self.dir)
            .map_err(|e| AppError::store_write_failed(self.dir.display().to_string(), e))?;
        fs::write(&path, content)
            .map_err(|e| AppError::store_write_failed(path.display().to_string(), e))?;

        debug!("会话记录已保存: {}", path.display());

        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut sessions = Vec::new();

        for entry in fs::read_dir(&self.dir)
            .map_err(|e| AppError::store_read_failed(self.dir.display().to_string(), e))?
        {
            let path = entry
                .map_err(|e| AppError::store_read_failed(self.dir.display().to_string(), e))?
                .path();

            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let Some(key) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
                continue;
            };

            match self.read_record(&path, &key) {
                Ok(record) => sessions.push((key, record.created_at)),
                Err(e) => {
                    // 损坏的记录跳过，不影响其他会话
                    warn!("会话记录读取失败 {}: {}", path.display(), e);
                }
            }
        }

        // 最新创建的在前
        sessions.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(sessions.into_iter().map(|(key, _)| key).collect())
    }
}
