// ==========================================
// 纽约房产成交导入 - HTTP 数据源
// ==========================================
// 阶段 1: 单次 GET，无重试
// ==========================================

use crate::config::ImportSettings;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::sales_importer_trait::SalesSource;
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::{debug, info};

pub struct HttpSalesSource {
    client: Client,
}

impl HttpSalesSource {
    pub fn new() -> ImportResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SalesSource for HttpSalesSource {
    async fn fetch_text(&self, settings: &ImportSettings) -> ImportResult<String> {
        info!(url = %settings.source_url, "开始抓取数据源");

        let response = self
            .client
            .get(&settings.source_url)
            .header(USER_AGENT, settings.user_agent.as_str())
            .timeout(settings.fetch_timeout)
            .send()
            .await
            .map_err(|e| ImportError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::FetchError {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let text = response.text().await?;
        debug!(bytes = text.len(), "数据源响应体读取完成");
        Ok(text)
    }
}
