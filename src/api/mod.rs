// ==========================================
// 纽约房产成交导入 - API 层
// ==========================================
// 职责: 提供导入/查询 API 接口，供 HTTP 处理器调用
// ==========================================

pub mod error;
pub mod import_api;
pub mod sales_query_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportApiResponse};
pub use sales_query_api::{CountResponse, SalesQuery, SalesQueryApi};
