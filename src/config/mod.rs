// ==========================================
// 纽约房产成交导入 - 配置层
// ==========================================
// 职责: 导入参数管理（数据源/批次/写入模式）
// 存储: config_kv 表，缺省值见 import_config_trait
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::{ImportConfigReader, ImportSettings};
