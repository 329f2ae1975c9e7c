// ==========================================
// 纽约房产成交导入 - 导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 流程: 抓取 → 解析 → 清洗/派生 → 过滤 → 分批写入
// ==========================================

use crate::config::ImportSettings;
use crate::domain::sales::{ImportReport, RawSaleRecord, SaleRecord};
use crate::domain::types::PropertyType;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

// ==========================================
// SalesImporter Trait
// ==========================================
// 用途: 导入主接口
// 实现者: SalesImporterImpl
#[async_trait]
pub trait SalesImporter: Send + Sync {
    /// 抓取数据源并导入 property_sales 表
    ///
    /// # 返回
    /// - Ok(ImportReport): 处理/写入统计 + 分批明细（部分批次失败仍为 Ok）
    /// - Err: 抓取/响应体校验/解析失败（整次导入终止，未写入任何批次）
    ///
    /// # 导入流程（7个阶段）
    /// 1. HTTP 抓取
    /// 2. 响应体大小校验
    /// 3. CSV 解析（表头校验）
    /// 4. 字段清洗 + 物业类型/文档号派生
    /// 5. 过滤金额 <= 0 的记录
    /// 6. 分批写入（失败批次记录后跳过，不重试）
    /// 7. 汇总结果
    async fn import_property_sales(&self) -> ImportResult<ImportReport>;
}

// ==========================================
// SalesSource Trait
// ==========================================
// 用途: 数据源抓取接口（阶段 1）
// 实现者: HttpSalesSource
#[async_trait]
pub trait SalesSource: Send + Sync {
    /// 抓取完整响应体文本
    ///
    /// # 返回
    /// - Ok(String): 响应体
    /// - Err(FetchError): 非 2xx 状态
    /// - Err(HttpError): 网络/超时等传输错误
    async fn fetch_text(&self, settings: &ImportSettings) -> ImportResult<String>;
}

// ==========================================
// SalesParser Trait
// ==========================================
// 用途: 文本解析接口（阶段 3）
// 实现者: SalesCsvParser
pub trait SalesParser: Send + Sync {
    /// 解析文本为原始行记录
    ///
    /// # 返回
    /// - Ok(Vec<RawSaleRecord>): 行记录列表（不含表头）
    /// - Err(SchemaMismatch): 表头与固定列定义不一致
    /// - Err(CsvParseError): 无法切分/列数不一致
    fn parse_records(&self, text: &str) -> ImportResult<Vec<RawSaleRecord>>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 字段清洗接口（阶段 4），单字段失败只降级不报错
// 实现者: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// TRIM + 空值标准化（空白 → None）
    fn clean_text(&self, value: &str) -> Option<String>;

    /// 解析整数（失败 → None）
    fn parse_integer(&self, value: &str) -> Option<i64>;

    /// 解析金额（失败/负数 → 0）
    fn parse_amount(&self, value: &str) -> f64;

    /// 解析成交日期（失败 → None）
    fn parse_sale_date(&self, value: &str) -> Option<DateTime<Utc>>;
}

// ==========================================
// DerivationService Trait
// ==========================================
// 用途: 字段派生接口（阶段 4）
// 实现者: DerivationService
pub trait DerivationService: Send + Sync {
    /// 派生物业类型
    ///
    /// # 规则（按优先级）
    /// 0. 类别为空 → UNKNOWN
    /// 1. 住宅关键字 → RESIDENTIAL
    /// 2. 商业关键字 → COMMERCIAL
    /// 3. MIXED → MIXED-USE
    /// 4. 其他 → OTHER
    fn derive_property_type(&self, building_class_category: Option<&str>) -> PropertyType;

    /// 派生文档号（同一成交多次导入得到同一 ID）
    ///
    /// # 参数
    /// - record: 已清洗的成交记录
    /// - apartment_number: 源数据中的单元号（合作公寓按单元区分）
    fn derive_document_id(&self, record: &SaleRecord, apartment_number: Option<&str>) -> String;
}
