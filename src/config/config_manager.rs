// ==========================================
// 纽约房产成交导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::{
    ImportConfigReader, DEFAULT_BATCH_SIZE, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MIN_BODY_BYTES,
    DEFAULT_SOURCE_URL, DEFAULT_USER_AGENT,
};
use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use crate::domain::types::WriteMode;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ImportResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| ImportError::InternalError(format!("lock poisoned: {}", e)))?;
            configure_sqlite_connection(&conn_guard)?;
            ensure_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::InternalError(format!("lock poisoned: {}", e)))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| ImportError::ConfigReadError {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        Ok(value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ImportResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::InternalError(format!("lock poisoned: {}", e)))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// 获取所有 global 配置的快照
    pub fn get_config_snapshot(&self) -> ImportResult<BTreeMap<String, String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::InternalError(format!("lock poisoned: {}", e)))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 数值型配置：格式错误时告警并回退默认值
    fn parse_or_default<T: std::str::FromStr + Copy>(
        &self,
        key: &str,
        default: T,
    ) -> ImportResult<T> {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => Ok(raw.parse::<T>().unwrap_or_else(|_| {
                tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                default
            })),
        }
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_source_url(&self) -> ImportResult<String> {
        self.get_config_or_default(config_keys::SOURCE_URL, DEFAULT_SOURCE_URL)
    }

    async fn get_batch_size(&self) -> ImportResult<usize> {
        let size = self.parse_or_default(config_keys::BATCH_SIZE, DEFAULT_BATCH_SIZE)?;
        if size == 0 {
            tracing::warn!(config_key = config_keys::BATCH_SIZE, "批次大小不能为 0，使用默认值");
            return Ok(DEFAULT_BATCH_SIZE);
        }
        Ok(size)
    }

    async fn get_min_body_bytes(&self) -> ImportResult<usize> {
        self.parse_or_default(config_keys::MIN_BODY_BYTES, DEFAULT_MIN_BODY_BYTES)
    }

    async fn get_max_rows(&self) -> ImportResult<Option<usize>> {
        match self.get_config_value(config_keys::MAX_ROWS)? {
            None => Ok(None),
            Some(raw) => match raw.parse::<usize>() {
                Ok(0) => Ok(None),
                Ok(n) => Ok(Some(n)),
                Err(_) => {
                    tracing::warn!(config_key = config_keys::MAX_ROWS, raw_value = %raw, "配置格式错误，不限制行数");
                    Ok(None)
                }
            },
        }
    }

    async fn get_write_mode(&self) -> ImportResult<WriteMode> {
        match self.get_config_value(config_keys::WRITE_MODE)? {
            None => Ok(WriteMode::Append),
            Some(raw) => raw.parse::<WriteMode>().map_err(|message| {
                ImportError::ConfigValueError {
                    key: config_keys::WRITE_MODE.to_string(),
                    value: raw.clone(),
                    message,
                }
            }),
        }
    }

    async fn get_fetch_timeout(&self) -> ImportResult<Duration> {
        let secs =
            self.parse_or_default(config_keys::FETCH_TIMEOUT_SECS, DEFAULT_FETCH_TIMEOUT_SECS)?;
        Ok(Duration::from_secs(secs))
    }

    async fn get_user_agent(&self) -> ImportResult<String> {
        self.get_config_or_default(config_keys::USER_AGENT, DEFAULT_USER_AGENT)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 数据源
    pub const SOURCE_URL: &str = "source_url";
    pub const FETCH_TIMEOUT_SECS: &str = "fetch_timeout_secs";
    pub const USER_AGENT: &str = "user_agent";
    pub const MIN_BODY_BYTES: &str = "min_body_bytes";

    // 写入
    pub const BATCH_SIZE: &str = "batch_size";
    pub const MAX_ROWS: &str = "max_rows";
    pub const WRITE_MODE: &str = "write_mode"; // APPEND / UPSERT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_table_empty() {
        let manager = setup_manager();
        let settings = manager.load_settings().await.unwrap();

        assert_eq!(settings.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(settings.batch_size, 500);
        assert_eq!(settings.min_body_bytes, 100);
        assert_eq!(settings.max_rows, None);
        assert_eq!(settings.write_mode, WriteMode::Append);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_overrides_from_config_kv() {
        let manager = setup_manager();
        manager.set_config_value(config_keys::BATCH_SIZE, "250").unwrap();
        manager.set_config_value(config_keys::MAX_ROWS, "2000").unwrap();
        manager.set_config_value(config_keys::WRITE_MODE, "upsert").unwrap();

        assert_eq!(manager.get_batch_size().await.unwrap(), 250);
        assert_eq!(manager.get_max_rows().await.unwrap(), Some(2000));
        assert_eq!(manager.get_write_mode().await.unwrap(), WriteMode::Upsert);

        let snapshot = manager.get_config_snapshot().unwrap();
        assert_eq!(snapshot.get("batch_size"), Some(&"250".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_numbers_fall_back() {
        let manager = setup_manager();
        manager.set_config_value(config_keys::BATCH_SIZE, "0").unwrap();
        manager.set_config_value(config_keys::MIN_BODY_BYTES, "lots").unwrap();

        assert_eq!(manager.get_batch_size().await.unwrap(), DEFAULT_BATCH_SIZE);
        assert_eq!(
            manager.get_min_body_bytes().await.unwrap(),
            DEFAULT_MIN_BODY_BYTES
        );
    }

    #[tokio::test]
    async fn test_invalid_write_mode_is_error() {
        let manager = setup_manager();
        manager.set_config_value(config_keys::WRITE_MODE, "merge").unwrap();

        let err = manager.get_write_mode().await.unwrap_err();
        assert!(matches!(err, ImportError::ConfigValueError { .. }));
    }
}
