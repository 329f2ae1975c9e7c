// ==========================================
// 纽约房产成交导入 - 导入器实现
// ==========================================
// 职责: 整合导入流程，从数据源到数据库
// 流程: 抓取 → 校验 → 解析 → 清洗/派生 → 过滤 → 分批落库
// 红线: 金额 <= 0 不入库；失败批次不重试、不中断后续批次
// ==========================================

use crate::config::{ImportConfigReader, ImportSettings};
use crate::domain::sales::{BatchOutcome, ImportReport, RawSaleRecord, SaleRecord};
use crate::domain::types::WriteMode;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::sales_importer_trait::{
    DataCleaner, DerivationService, SalesImporter, SalesParser, SalesSource,
};
use crate::repository::SalesRepository;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 响应体过小时的错误信息
pub const BODY_TOO_SMALL_MESSAGE: &str = "CSV data is too small, likely invalid";

// ==========================================
// SalesImporterImpl - 成交数据导入器实现
// ==========================================
pub struct SalesImporterImpl<R, C>
where
    R: SalesRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    sales_repo: Arc<R>,

    // 配置读取器
    config: C,

    // 导入组件
    source: Box<dyn SalesSource>,
    parser: Box<dyn SalesParser>,
    data_cleaner: Box<dyn DataCleaner>,
    derivation_service: Box<dyn DerivationService>,
}

impl<R, C> SalesImporterImpl<R, C>
where
    R: SalesRepository,
    C: ImportConfigReader,
{
    /// 创建新的 SalesImporter 实例
    ///
    /// # 参数
    /// - sales_repo: 成交数据仓储
    /// - config: 配置读取器
    /// - source: 数据源
    /// - parser: CSV 解析器
    /// - data_cleaner: 数据清洗器
    /// - derivation_service: 字段派生服务
    pub fn new(
        sales_repo: Arc<R>,
        config: C,
        source: Box<dyn SalesSource>,
        parser: Box<dyn SalesParser>,
        data_cleaner: Box<dyn DataCleaner>,
        derivation_service: Box<dyn DerivationService>,
    ) -> Self {
        Self {
            sales_repo,
            config,
            source,
            parser,
            data_cleaner,
            derivation_service,
        }
    }

    /// 校验响应体大小
    fn validate_body(&self, body: &str, min_body_bytes: usize) -> ImportResult<()> {
        if body.trim().is_empty() || body.len() < min_body_bytes {
            return Err(ImportError::ValidationError(
                BODY_TOO_SMALL_MESSAGE.to_string(),
            ));
        }
        Ok(())
    }

    /// 原始行 → 标准化成交记录
    fn convert_to_sale_record(&self, raw: &RawSaleRecord) -> SaleRecord {
        let sale_date = self.data_cleaner.parse_sale_date(&raw.sale_date);
        let category = self.data_cleaner.clean_text(&raw.building_class_category);

        let mut record = SaleRecord {
            document_id: String::new(),
            borough: self.data_cleaner.clean_text(&raw.borough),
            property_address: self.data_cleaner.clean_text(&raw.address),
            block: self.data_cleaner.parse_integer(&raw.block),
            lot: self.data_cleaner.parse_integer(&raw.lot),
            document_amt: self.data_cleaner.parse_amount(&raw.sale_price),
            document_date: sale_date,
            recorded_datetime: sale_date,
            property_type: self
                .derivation_service
                .derive_property_type(category.as_deref()),
        };
        let apartment_number = self.data_cleaner.clean_text(&raw.apartment_number);
        record.document_id = self
            .derivation_service
            .derive_document_id(&record, apartment_number.as_deref());
        record
    }

    /// 分批写入
    ///
    /// # 返回
    /// - 每批一条 BatchOutcome；失败批次 inserted = 0 且带错误信息
    /// - inserted 每条成功写入的记录计一次，UPSERT 的合并另计入 merged
    async fn write_batches(
        &self,
        run_id: &str,
        records: &[SaleRecord],
        settings: &ImportSettings,
    ) -> Vec<BatchOutcome> {
        let batch_size = settings.batch_size.max(1);
        let total_batches = records.len().div_ceil(batch_size);
        let mut outcomes = Vec::with_capacity(total_batches);
        let mut inserted_total = 0usize;

        for (batch_index, chunk) in records.chunks(batch_size).enumerate() {
            let result = match settings.write_mode {
                WriteMode::Append => self
                    .sales_repo
                    .bulk_insert(run_id, chunk)
                    .await
                    .map(|inserted| (inserted, 0)),
                WriteMode::Upsert => self
                    .sales_repo
                    .bulk_upsert(run_id, chunk)
                    .await
                    .map(|counts| (counts.written, counts.merged)),
            };

            match result {
                Ok((inserted, merged)) => {
                    inserted_total += inserted;
                    info!(
                        batch_index,
                        total_batches,
                        batch_rows = chunk.len(),
                        merged,
                        inserted_total,
                        "批次写入完成"
                    );
                    outcomes.push(BatchOutcome {
                        batch_index,
                        attempted: chunk.len(),
                        inserted,
                        merged,
                        error: None,
                    });
                }
                Err(e) => {
                    let err = ImportError::InsertError {
                        batch_index,
                        message: e.to_string(),
                    };
                    error!(batch_index, batch_rows = chunk.len(), error = %err, "批次写入失败，跳过");
                    outcomes.push(BatchOutcome {
                        batch_index,
                        attempted: chunk.len(),
                        inserted: 0,
                        merged: 0,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        outcomes
    }
}

#[async_trait::async_trait]
impl<R, C> SalesImporter for SalesImporterImpl<R, C>
where
    R: SalesRepository + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(skip(self), fields(run_id))]
    async fn import_property_sales(&self) -> ImportResult<ImportReport> {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        let settings = self.config.load_settings().await?;
        info!(
            run_id = %run_id,
            source_url = %settings.source_url,
            batch_size = settings.batch_size,
            write_mode = %settings.write_mode,
            "开始导入成交数据"
        );

        // === 步骤 1: 抓取 ===
        debug!("步骤 1: 抓取数据源");
        let body = self.source.fetch_text(&settings).await.map_err(|e| {
            error!(error = %e, "数据源抓取失败");
            e
        })?;
        info!(bytes = body.len(), "数据源抓取完成");

        // === 步骤 2: 响应体校验 ===
        debug!("步骤 2: 响应体校验");
        self.validate_body(&body, settings.min_body_bytes)
            .map_err(|e| {
                error!(bytes = body.len(), min_body_bytes = settings.min_body_bytes, "响应体过小");
                e
            })?;

        // === 步骤 3: 解析 ===
        debug!("步骤 3: 解析 CSV");
        let mut raw_rows = self.parser.parse_records(&body).map_err(|e| {
            error!(error = %e, "CSV 解析失败");
            e
        })?;
        drop(body);

        if let Some(max_rows) = settings.max_rows {
            if raw_rows.len() > max_rows {
                warn!(total_rows = raw_rows.len(), max_rows, "超出单次导入行数上限，截断");
                raw_rows.truncate(max_rows);
            }
        }
        let processed = raw_rows.len();
        info!(processed, "CSV 解析完成");

        // === 步骤 4-5: 清洗/派生 + 过滤 ===
        debug!("步骤 4: 清洗与派生");
        let kept_records: Vec<SaleRecord> = raw_rows
            .iter()
            .map(|raw| self.convert_to_sale_record(raw))
            .filter(SaleRecord::is_arms_length_sale)
            .collect();
        let kept = kept_records.len();
        info!(
            processed,
            kept,
            skipped_zero_amount = processed - kept,
            "过滤非真实成交完成"
        );

        // === 步骤 6: 分批落库 ===
        debug!("步骤 6: 分批落库");
        let batches = self.write_batches(&run_id, &kept_records, &settings).await;

        // === 步骤 7: 汇总 ===
        let inserted = batches.iter().map(|b| b.inserted).sum();
        let report = ImportReport {
            run_id,
            write_mode: settings.write_mode,
            processed,
            kept,
            inserted,
            batches,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };

        let failed_batches = report.failed_batches();
        if failed_batches > 0 {
            warn!(failed_batches, "部分批次写入失败");
        }
        info!(
            run_id = %report.run_id,
            processed,
            kept,
            inserted,
            merged = report.merged(),
            batches = report.batches.len(),
            elapsed_ms = report.elapsed_ms,
            "成交数据导入完成"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sales::{SaleFilter, StoredSale, UpsertCounts};
    use crate::domain::types::SaleOrder;
    use crate::importer::{DataCleanerImpl, DerivationServiceImpl, SalesCsvParser};
    use crate::repository::error::{RepositoryError, RepositoryResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StaticSource(String);

    #[async_trait]
    impl SalesSource for StaticSource {
        async fn fetch_text(&self, _settings: &ImportSettings) -> ImportResult<String> {
            Ok(self.0.clone())
        }
    }

    /// 记录每次写入的批大小；fail_batches 中的批次返回错误
    #[derive(Default)]
    struct RecordingRepo {
        calls: Mutex<Vec<usize>>,
        fail_batches: Vec<usize>,
    }

    #[async_trait]
    impl SalesRepository for RecordingRepo {
        async fn bulk_insert(&self, _run_id: &str, records: &[SaleRecord]) -> RepositoryResult<usize> {
            let mut calls = self.calls.lock().unwrap();
            let idx = calls.len();
            calls.push(records.len());
            if self.fail_batches.contains(&idx) {
                return Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()));
            }
            Ok(records.len())
        }

        async fn bulk_upsert(
            &self,
            run_id: &str,
            records: &[SaleRecord],
        ) -> RepositoryResult<UpsertCounts> {
            let written = self.bulk_insert(run_id, records).await?;
            Ok(UpsertCounts { written, merged: 0 })
        }

        async fn count_sales(&self, _filter: &SaleFilter) -> RepositoryResult<i64> {
            Ok(0)
        }

        async fn list_sales(
            &self,
            _filter: &SaleFilter,
            _order: SaleOrder,
            _limit: usize,
        ) -> RepositoryResult<Vec<StoredSale>> {
            Ok(Vec::new())
        }
    }

    fn csv_with_prices(prices: &[&str]) -> String {
        let mut text = crate::importer::file_parser::EXPECTED_COLUMNS.join(",");
        text.push('\n');
        for (i, price) in prices.iter().enumerate() {
            text.push_str(&format!(
                "1,CHELSEA,01 ONE FAMILY DWELLINGS,1,{},{},,A4,{} W 20TH ST,,10011,1,0,1,1000,2000,1900,1,A4,\"{}\",2023-03-15\n",
                700 + i,
                i + 1,
                i + 1,
                price
            ));
        }
        text
    }

    fn build_importer(
        body: String,
        repo: Arc<RecordingRepo>,
        settings: ImportSettings,
    ) -> SalesImporterImpl<RecordingRepo, ImportSettings> {
        SalesImporterImpl::new(
            repo,
            settings,
            Box::new(StaticSource(body)),
            Box::new(SalesCsvParser),
            Box::new(DataCleanerImpl),
            Box::new(DerivationServiceImpl),
        )
    }

    #[tokio::test]
    async fn test_zero_amount_rows_are_counted_but_not_written() {
        let repo = Arc::new(RecordingRepo::default());
        let body = csv_with_prices(&["$500,000", "0", "-", "$1,000"]);
        let importer = build_importer(body, repo.clone(), ImportSettings::default());

        let report = importer.import_property_sales().await.unwrap();

        assert_eq!(report.processed, 4);
        assert_eq!(report.kept, 2);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.skipped_zero_amount(), 2);
        assert_eq!(*repo.calls.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_batches_follow_batch_size() {
        let repo = Arc::new(RecordingRepo::default());
        let prices = vec!["100"; 5];
        let settings = ImportSettings {
            batch_size: 2,
            ..Default::default()
        };
        let importer = build_importer(csv_with_prices(&prices), repo.clone(), settings);

        let report = importer.import_property_sales().await.unwrap();

        assert_eq!(*repo.calls.lock().unwrap(), vec![2, 2, 1]);
        assert_eq!(report.batches.len(), 3);
        assert_eq!(report.inserted, 5);
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_stop_later_batches() {
        let repo = Arc::new(RecordingRepo {
            calls: Mutex::new(Vec::new()),
            fail_batches: vec![1],
        });
        let prices = vec!["100"; 5];
        let settings = ImportSettings {
            batch_size: 2,
            ..Default::default()
        };
        let importer = build_importer(csv_with_prices(&prices), repo.clone(), settings);

        let report = importer.import_property_sales().await.unwrap();

        assert_eq!(repo.calls.lock().unwrap().len(), 3);
        assert_eq!(report.inserted, 3);
        assert_eq!(report.failed_batches(), 1);
        assert!(report.batches[1].error.is_some());
    }

    #[tokio::test]
    async fn test_max_rows_caps_processed() {
        let repo = Arc::new(RecordingRepo::default());
        let prices = vec!["100"; 6];
        let settings = ImportSettings {
            max_rows: Some(4),
            ..Default::default()
        };
        let importer = build_importer(csv_with_prices(&prices), repo.clone(), settings);

        let report = importer.import_property_sales().await.unwrap();

        assert_eq!(report.processed, 4);
        assert_eq!(report.inserted, 4);
    }

    #[tokio::test]
    async fn test_small_body_is_rejected_before_writes() {
        let repo = Arc::new(RecordingRepo::default());
        let importer = build_importer("BOROUGH\n1".to_string(), repo.clone(), ImportSettings::default());

        let err = importer.import_property_sales().await.unwrap_err();

        assert_eq!(err.to_string(), BODY_TOO_SMALL_MESSAGE);
        assert!(repo.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_convert_to_sale_record_fields() {
        let repo = Arc::new(RecordingRepo::default());
        let importer = build_importer(String::new(), repo, ImportSettings::default());
        let raw = RawSaleRecord {
            borough: " 3 ".to_string(),
            building_class_category: "21 OFFICE BUILDINGS".to_string(),
            block: "1,234".to_string(),
            lot: "0".to_string(),
            address: "  ".to_string(),
            sale_price: "$2,500,000".to_string(),
            sale_date: "bogus".to_string(),
            ..Default::default()
        };

        let record = importer.convert_to_sale_record(&raw);

        assert_eq!(record.borough.as_deref(), Some("3"));
        assert_eq!(record.block, Some(1234));
        assert_eq!(record.lot, Some(0));
        assert_eq!(record.property_address, None);
        assert_eq!(record.document_amt, 2_500_000.0);
        assert_eq!(record.document_date, None);
        assert_eq!(record.recorded_datetime, None);
        assert_eq!(record.property_type, crate::domain::types::PropertyType::Commercial);
        assert!(record.document_id.starts_with("DOC-"));
    }
}
