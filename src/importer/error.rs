// ==========================================
// 纽约房产成交导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 致命错误（抓取/校验/解析）终止整次导入；
// 写入错误仅影响当前批次
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 数据源错误 =====
    #[error("Failed to fetch data: {status} {reason}")]
    FetchError { status: u16, reason: String },

    #[error("Failed to fetch data: {0}")]
    HttpError(String),

    // ===== 响应体校验错误 =====
    #[error("{0}")]
    ValidationError(String),

    // ===== 解析错误 =====
    #[error("CSV parse failed: {0}")]
    CsvParseError(String),

    #[error("CSV schema mismatch at column {column}: expected `{expected}`, found `{found}`")]
    SchemaMismatch {
        column: usize,
        expected: String,
        found: String,
    },

    // ===== 写入错误（非致命）=====
    #[error("batch {batch_index} insert failed: {message}")]
    InsertError { batch_index: usize, message: String },

    // ===== 配置错误 =====
    #[error("config read failed (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("invalid config value (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 数据库错误 =====
    #[error("database error: {0}")]
    DatabaseError(String),

    // ===== 通用错误 =====
    #[error("internal error: {0}")]
    InternalError(String),
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<reqwest::Error>
impl From<reqwest::Error> for ImportError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ImportError::FetchError {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            },
            None => ImportError::HttpError(err.to_string()),
        }
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::DatabaseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
