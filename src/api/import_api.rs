// ==========================================
// 成交数据导入API
// ==========================================
// 职责: 触发一次导入，并把结果整理为对外响应体
// 成功: {"success": true, "processed": N, "inserted": M, ...}
// 失败: {"success": false, "error": "..."}
// ==========================================

use crate::domain::sales::{BatchOutcome, ImportReport};
use crate::domain::types::WriteMode;
use crate::importer::SalesImporter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// 导入API响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 是否成功（部分批次失败仍视为成功）
    pub success: bool,
    /// 参与处理的行数（含金额为 0 的行）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed: Option<usize>,
    /// 实际写入的行数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted: Option<usize>,
    /// 通过金额过滤的行数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kept: Option<usize>,
    /// 导入批次号
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    /// 写入模式（APPEND / UPSERT）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_mode: Option<WriteMode>,
    /// 分批明细
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batches: Option<Vec<BatchOutcome>>,
    /// 导入耗时（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    /// 失败原因
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImportApiResponse {
    pub fn from_report(report: ImportReport) -> Self {
        Self {
            success: true,
            processed: Some(report.processed),
            inserted: Some(report.inserted),
            kept: Some(report.kept),
            run_id: Some(report.run_id),
            write_mode: Some(report.write_mode),
            batches: Some(report.batches),
            elapsed_ms: Some(report.elapsed_ms),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            processed: None,
            inserted: None,
            kept: None,
            run_id: None,
            write_mode: None,
            batches: None,
            elapsed_ms: None,
            error: Some(message.into()),
        }
    }
}

// ==========================================
// ImportApi
// ==========================================
pub struct ImportApi {
    importer: Arc<dyn SalesImporter>,
}

impl ImportApi {
    pub fn new(importer: Arc<dyn SalesImporter>) -> Self {
        Self { importer }
    }

    /// 执行一次导入
    ///
    /// # 返回
    /// - 始终返回响应体；失败信息放在 error 字段
    pub async fn run_import(&self) -> ImportApiResponse {
        match self.importer.import_property_sales().await {
            Ok(report) => {
                info!(
                    run_id = %report.run_id,
                    processed = report.processed,
                    inserted = report.inserted,
                    "导入请求处理完成"
                );
                ImportApiResponse::from_report(report)
            }
            Err(e) => {
                error!(error = %e, "导入请求失败");
                ImportApiResponse::failure(e.to_string())
            }
        }
    }
}
