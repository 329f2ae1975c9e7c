// ==========================================
// 纽约房产成交导入 - 路由
// ==========================================
// 导入入口同时挂载在 /fetch-nycdb-data 与 /functions/v1/fetch-nycdb-data
// 所有响应统一附加 CORS 头
// ==========================================

use axum::http::{HeaderName, HeaderValue};
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::app::handlers;
use crate::app::state::AppState;

pub const IMPORT_PATH: &str = "/fetch-nycdb-data";
pub const IMPORT_FUNCTION_PATH: &str = "/functions/v1/fetch-nycdb-data";

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

fn import_route() -> MethodRouter<AppState> {
    post(handlers::trigger_import)
        .options(handlers::preflight)
        .fallback(handlers::method_not_allowed)
}

/// 构建完整路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(IMPORT_PATH, import_route())
        .route(IMPORT_FUNCTION_PATH, import_route())
        .route("/property-sales", get(handlers::list_sales))
        .route("/property-sales/count", get(handlers::count_sales))
        .route("/_liveness", get(handlers::liveness))
        .route("/_readiness", get(handlers::readiness))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("access-control-allow-origin"),
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("access-control-allow-headers"),
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
