// ==========================================
// 纽约房产成交导入 - 导入层
// ==========================================
// 职责: 抓取外部成交数据，清洗后写入 property_sales
// 支持: HTTP CSV 数据源
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod derivation;
pub mod error;
pub mod file_parser;
pub mod sales_importer_impl;
pub mod sales_importer_trait;
pub mod source;

// 重导出核心类型
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use derivation::DerivationService as DerivationServiceImpl;
pub use error::{ImportError, ImportResult};
pub use file_parser::{SalesCsvParser, EXPECTED_COLUMNS};
pub use sales_importer_impl::{SalesImporterImpl, BODY_TOO_SMALL_MESSAGE};
pub use source::HttpSalesSource;

// 重导出 Trait 接口
pub use sales_importer_trait::{
    DataCleaner, DerivationService, SalesImporter, SalesParser, SalesSource,
};
