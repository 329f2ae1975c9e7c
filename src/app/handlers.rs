// ==========================================
// 纽约房产成交导入 - HTTP 处理器
// ==========================================
// 职责: 请求 → API 调用 → JSON 响应
// ==========================================

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::api::{ApiError, ImportApiResponse, SalesQuery};
use crate::app::state::AppState;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ===== 导入 =====

/// POST: 执行一次导入
///
/// 导入在独立任务中执行，客户端断开不会中断导入
pub async fn trigger_import(State(state): State<AppState>) -> Response {
    let import_api = state.import_api.clone();
    let outcome = tokio::spawn(async move { import_api.run_import().await }).await;

    let response = match outcome {
        Ok(response) => response,
        Err(join_err) => {
            error!(error = %join_err, "导入任务异常退出");
            ImportApiResponse::failure(format!("Import task failed: {}", join_err))
        }
    };

    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(response)).into_response()
}

/// OPTIONS: 预检请求，空响应体
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// 其余方法
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

// ===== 查询 =====

pub async fn count_sales(
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> Result<Response, ApiError> {
    let body = state.sales_query_api.count_sales(&query).await?;
    Ok(Json(body).into_response())
}

pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> Result<Response, ApiError> {
    let rows = state.sales_query_api.list_sales(&query).await?;
    Ok(Json(rows).into_response())
}

// ===== 探针 =====

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness() -> StatusCode {
    StatusCode::OK
}
