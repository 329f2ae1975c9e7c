// ==========================================
// 纽约房产成交导入 - 服务主入口
// ==========================================
// 用法:
//   nyc-sales-importer          启动 HTTP 服务
//   nyc-sales-importer import   执行一次导入并输出 JSON 结果
// ==========================================

use anyhow::Context;
use nyc_sales_importer::app::{get_bind_addr, get_default_db_path, router, AppState};
use nyc_sales_importer::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", nyc_sales_importer::APP_NAME);
    tracing::info!("系统版本: {}", nyc_sales_importer::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let app_state = AppState::new(&db_path)
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;

    // 单次导入模式
    if std::env::args().nth(1).as_deref() == Some("import") {
        let response = app_state.import_api.run_import().await;
        println!("{}", serde_json::to_string_pretty(&response)?);
        if !response.success {
            std::process::exit(1);
        }
        return Ok(());
    }

    let bind_addr = get_bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("无法监听地址 {}", bind_addr))?;
    tracing::info!("HTTP 服务已启动: {}", bind_addr);

    axum::serve(listener, router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;

    tracing::info!("HTTP 服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "无法监听退出信号");
        std::future::pending::<()>().await;
    }
}
