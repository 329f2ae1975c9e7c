// ==========================================
// 纽约房产成交导入 - 应用层
// ==========================================
// 职责: HTTP 服务集成，连接请求与 API 层
// ==========================================

pub mod handlers;
pub mod router;
pub mod state;

// 重导出
pub use router::router;
pub use state::{get_bind_addr, get_default_db_path, AppState};
