// ==========================================
// 纽约房产成交导入 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod sales;
pub mod types;

// 重导出核心类型
pub use sales::{
    BatchOutcome, ImportReport, RawSaleRecord, SaleFilter, SaleRecord, StoredSale, UpsertCounts,
};
pub use types::{PropertyType, SaleOrder, WriteMode};
