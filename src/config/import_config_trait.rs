// ==========================================
// 纽约房产成交导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::WriteMode;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::time::Duration;

/// 默认数据源: NYC Department of Finance Rolling Sales
pub const DEFAULT_SOURCE_URL: &str =
    "https://data.cityofnewyork.us/api/views/usep-8jbt/rows.csv?accessType=DOWNLOAD";

/// 默认批次大小
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// 响应体最小字节数（低于此值视为数据源异常）
pub const DEFAULT_MIN_BODY_BYTES: usize = 100;

/// 默认抓取超时（秒）
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 120;

/// 默认 User-Agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; NYCDBDataImporter/1.0)";

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）, ImportSettings（静态配置）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 数据源 URL
    async fn get_source_url(&self) -> ImportResult<String>;

    /// 每批写入条数
    ///
    /// # 默认值
    /// - 500
    async fn get_batch_size(&self) -> ImportResult<usize>;

    /// 响应体最小字节数
    ///
    /// # 默认值
    /// - 100
    async fn get_min_body_bytes(&self) -> ImportResult<usize>;

    /// 单次导入最多处理的行数
    ///
    /// # 默认值
    /// - None（全部处理）
    async fn get_max_rows(&self) -> ImportResult<Option<usize>>;

    /// 写入模式
    ///
    /// # 默认值
    /// - APPEND
    async fn get_write_mode(&self) -> ImportResult<WriteMode>;

    /// 抓取超时
    async fn get_fetch_timeout(&self) -> ImportResult<Duration>;

    /// 抓取请求的 User-Agent
    async fn get_user_agent(&self) -> ImportResult<String>;

    /// 一次性读取全部导入配置
    async fn load_settings(&self) -> ImportResult<ImportSettings> {
        Ok(ImportSettings {
            source_url: self.get_source_url().await?,
            batch_size: self.get_batch_size().await?,
            min_body_bytes: self.get_min_body_bytes().await?,
            max_rows: self.get_max_rows().await?,
            write_mode: self.get_write_mode().await?,
            fetch_timeout: self.get_fetch_timeout().await?,
            user_agent: self.get_user_agent().await?,
        })
    }
}

// ==========================================
// ImportSettings - 导入配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSettings {
    pub source_url: String,
    pub batch_size: usize,
    pub min_body_bytes: usize,
    pub max_rows: Option<usize>,
    pub write_mode: WriteMode,
    pub fetch_timeout: Duration,
    pub user_agent: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            min_body_bytes: DEFAULT_MIN_BODY_BYTES,
            max_rows: None,
            write_mode: WriteMode::Append,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[async_trait]
impl ImportConfigReader for ImportSettings {
    async fn get_source_url(&self) -> ImportResult<String> {
        Ok(self.source_url.clone())
    }

    async fn get_batch_size(&self) -> ImportResult<usize> {
        Ok(self.batch_size.max(1))
    }

    async fn get_min_body_bytes(&self) -> ImportResult<usize> {
        Ok(self.min_body_bytes)
    }

    async fn get_max_rows(&self) -> ImportResult<Option<usize>> {
        Ok(self.max_rows)
    }

    async fn get_write_mode(&self) -> ImportResult<WriteMode> {
        Ok(self.write_mode)
    }

    async fn get_fetch_timeout(&self) -> ImportResult<Duration> {
        Ok(self.fetch_timeout)
    }

    async fn get_user_agent(&self) -> ImportResult<String> {
        Ok(self.user_agent.clone())
    }
}
