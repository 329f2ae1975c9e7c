// ==========================================
// 纽约房产成交导入 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ImportApi, SalesQueryApi};
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::importer::{
    DataCleanerImpl, DerivationServiceImpl, HttpSalesSource, SalesCsvParser, SalesImporter,
    SalesImporterImpl,
};
use crate::repository::{SalesRepository, SalesRepositoryImpl};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "NYC_SALES_DB_PATH";

/// 监听地址环境变量
pub const BIND_ADDR_ENV: &str = "NYC_SALES_BIND_ADDR";

/// 默认监听地址
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// 应用状态
///
/// 包含所有API实例和共享资源，由 axum 以 State 形式注入处理器
#[derive(Clone)]
pub struct AppState {
    /// 导入API
    pub import_api: Arc<ImportApi>,

    /// 查询API
    pub sales_query_api: Arc<SalesQueryApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 成功创建的状态
    /// - Err(String): 初始化失败
    pub fn new(db_path: &str) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let conn = open_sqlite_connection(db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库结构初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let source = HttpSalesSource::new().map_err(|e| format!("HTTP 客户端初始化失败: {}", e))?;

        Self::with_components(conn, Box::new(source))
    }

    /// 使用给定连接与数据源组装状态（测试替换数据源时使用）
    pub fn with_components(
        conn: Arc<Mutex<rusqlite::Connection>>,
        source: Box<dyn crate::importer::SalesSource>,
    ) -> Result<Self, String> {
        // 共享同一连接：仓储与配置管理器
        let sales_repo = Arc::new(
            SalesRepositoryImpl::from_connection(conn.clone())
                .map_err(|e| format!("仓储初始化失败: {}", e))?,
        );
        let config = ConfigManager::from_connection(conn)
            .map_err(|e| format!("配置管理器初始化失败: {}", e))?;

        let importer: Arc<dyn SalesImporter> = Arc::new(SalesImporterImpl::new(
            sales_repo.clone(),
            config,
            source,
            Box::new(SalesCsvParser),
            Box::new(DataCleanerImpl),
            Box::new(DerivationServiceImpl),
        ));

        let query_repo: Arc<dyn SalesRepository> = sales_repo;

        tracing::info!("AppState初始化完成");

        Ok(Self {
            import_api: Arc::new(ImportApi::new(importer)),
            sales_query_api: Arc::new(SalesQueryApi::new(query_repo)),
        })
    }
}

/// 获取默认数据库路径
///
/// # 规则
/// 1. NYC_SALES_DB_PATH 非空时直接使用
/// 2. 用户数据目录下 nyc-sales-importer/nyc_sales.db
/// 3. 回退: ./nyc_sales.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./nyc_sales.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("nyc-sales-importer");
        // 目录创建失败时保留回退路径
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("nyc_sales.db");
        }
    }

    path.to_string_lossy().to_string()
}

/// 获取监听地址
pub fn get_bind_addr() -> String {
    std::env::var(BIND_ADDR_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
}
