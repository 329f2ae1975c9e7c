// ==========================================
// 纽约房产成交导入 - 成交记录领域模型
// ==========================================
// RawSaleRecord: CSV 原始行（21 列，全部为文本）
// SaleRecord: 标准化后的入库实体（property_sales 表）
// ==========================================

use crate::domain::types::{PropertyType, WriteMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// RawSaleRecord - 导入中间结构体
// ==========================================
// 用途: CSV 解析产物，按列位置反序列化
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSaleRecord {
    pub borough: String,
    pub neighborhood: String,
    pub building_class_category: String,
    pub tax_class_at_present: String,
    pub block: String,
    pub lot: String,
    pub easement: String,
    pub building_class_at_present: String,
    pub address: String,
    pub apartment_number: String,
    pub zip_code: String,
    pub residential_units: String,
    pub commercial_units: String,
    pub total_units: String,
    pub land_square_feet: String,
    pub gross_square_feet: String,
    pub year_built: String,
    pub tax_class_at_time_of_sale: String,
    pub building_class_at_time_of_sale: String,
    pub sale_price: String,
    pub sale_date: String,
}

// ==========================================
// SaleRecord - 标准化成交记录
// ==========================================
// 红线: document_amt <= 0 的记录不入库（非真实成交）
// 对齐: property_sales 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub document_id: String,                         // 文档号（DOC-<uuid v5>）
    pub borough: Option<String>,                     // 行政区
    pub property_address: Option<String>,            // 地址
    pub block: Option<i64>,                          // 税务街区号
    pub lot: Option<i64>,                            // 税务地块号
    pub document_amt: f64,                           // 成交金额（解析失败为 0）
    pub document_date: Option<DateTime<Utc>>,        // 成交日期
    pub recorded_datetime: Option<DateTime<Utc>>,    // 登记时间（同源于 sale_date）
    pub property_type: PropertyType,                 // 物业类型
}

impl SaleRecord {
    /// 是否为可入库的真实成交
    pub fn is_arms_length_sale(&self) -> bool {
        self.document_amt > 0.0
    }
}

// ==========================================
// StoredSale - 已入库记录（查询返回）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSale {
    pub id: i64,
    #[serde(flatten)]
    pub record: SaleRecord,
    pub import_run_id: String,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// SaleFilter - 查询过滤条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaleFilter {
    pub borough: Option<String>,
    pub property_type: Option<PropertyType>,
    pub min_amount: Option<f64>,
}

// ==========================================
// BatchOutcome - 单批次写入结果
// ==========================================
// inserted: 成功写入的记录条数，每条记录计一次（与批大小无关）
// merged: UPSERT 模式下覆盖了本次导入已写过的同 document_id 行的条数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub batch_index: usize,        // 批次序号（从 0 开始）
    pub attempted: usize,          // 尝试写入条数
    pub inserted: usize,           // 实际写入条数
    #[serde(default)]
    pub merged: usize,             // 本次导入内重复 document_id 被合并的条数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,     // 写入失败原因
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

// ==========================================
// UpsertCounts - 单批次 UPSERT 写入统计
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertCounts {
    pub written: usize, // 写入条数（更新 + 新增）
    pub merged: usize,  // 更新的行已由同一 run_id 写过
}

// ==========================================
// ImportReport - 导入结果
// ==========================================
// processed >= kept >= inserted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub run_id: String,                 // 导入批次号（UUID v4）
    pub write_mode: WriteMode,          // 写入模式
    pub processed: usize,               // 解析行数（金额过滤前）
    pub kept: usize,                    // 金额过滤后保留行数
    pub inserted: usize,                // 实际写入记录数
    pub batches: Vec<BatchOutcome>,     // 分批写入明细
    pub elapsed_ms: u64,                // 耗时（毫秒）
}

impl ImportReport {
    /// 因金额为 0/无法解析而丢弃的行数
    pub fn skipped_zero_amount(&self) -> usize {
        self.processed - self.kept
    }

    /// 合并到同 document_id 行的记录数（仅 UPSERT 模式非 0）
    pub fn merged(&self) -> usize {
        self.batches.iter().map(|b| b.merged).sum()
    }

    /// 写入失败的批次数
    pub fn failed_batches(&self) -> usize {
        self.batches.iter().filter(|b| !b.is_success()).count()
    }
}
