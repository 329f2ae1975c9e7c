// ==========================================
// 纽约房产成交导入 - 核心库
// ==========================================
// 技术栈: Rust + axum + SQLite
// 系统定位: 抓取 NYC 成交数据，清洗后入库并提供查询
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 导入参数
pub mod config;

// 数据库连接与结构
pub mod db;

// 日志
pub mod logging;

// API 层
pub mod api;

// 应用层 - HTTP 服务
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{PropertyType, SaleOrder, WriteMode};

// 领域实体
pub use domain::{BatchOutcome, ImportReport, RawSaleRecord, SaleFilter, SaleRecord, StoredSale};

// 导入
pub use importer::{ImportError, SalesImporter, SalesImporterImpl};

// API
pub use api::{ImportApi, SalesQueryApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "NYC Property Sales Importer";
