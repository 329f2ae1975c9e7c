// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、CSV 构造、替身数据源/仓储
// ==========================================
#![allow(dead_code)]

use async_trait::async_trait;
use nyc_sales_importer::config::ImportSettings;
use nyc_sales_importer::db::ensure_schema;
use nyc_sales_importer::domain::{SaleFilter, SaleRecord, StoredSale, UpsertCounts};
use nyc_sales_importer::domain::types::SaleOrder;
use nyc_sales_importer::importer::{ImportResult, SalesSource};
use nyc_sales_importer::repository::{
    RepositoryError, RepositoryResult, SalesRepository, SalesRepositoryImpl,
};
use rusqlite::Connection;
use std::error::Error;
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// NYC Rolling Sales 数据源表头（原始大写格式）
pub const NYC_HEADER: &str = "BOROUGH,NEIGHBORHOOD,BUILDING CLASS CATEGORY,TAX CLASS AT PRESENT,BLOCK,LOT,EASE-MENT,BUILDING CLASS AT PRESENT,ADDRESS,APARTMENT NUMBER,ZIP CODE,RESIDENTIAL UNITS,COMMERCIAL UNITS,TOTAL UNITS,LAND SQUARE FEET,GROSS SQUARE FEET,YEAR BUILT,TAX CLASS AT TIME OF SALE,BUILDING CLASS AT TIME OF SALE,SALE PRICE,SALE DATE";

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = Connection::open(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 写入 global 配置
pub fn insert_test_config(db_path: &str, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let conn = Connection::open(db_path)?;
    conn.execute(
        "INSERT OR REPLACE INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
        rusqlite::params![key, value],
    )?;
    Ok(())
}

/// property_sales 表行数
pub fn count_rows(db_path: &str) -> i64 {
    let conn = Connection::open(db_path).unwrap();
    conn.query_row("SELECT COUNT(*) FROM property_sales", [], |row| row.get(0))
        .unwrap()
}

// ==========================================
// CSV 构造器
// ==========================================
pub struct SalesCsvBuilder {
    rows: Vec<String>,
}

impl SalesCsvBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// 追加一行（其余列使用固定值）
    pub fn sale(mut self, block: u32, lot: u32, category: &str, price: &str, date: &str) -> Self {
        self.rows.push(format!(
            "1,CHELSEA,{category},2,{block},{lot},,R4,\"{lot} WEST 20TH STREET\",,10011,1,0,1,0,0,1920,2,R4,\"{price}\",{date}"
        ));
        self
    }

    /// 追加一行合作公寓单元成交（同楼各单元共用 block/lot/地址）
    pub fn coop_unit(mut self, apartment: &str, price: &str, date: &str) -> Self {
        self.rows.push(format!(
            "1,CHELSEA,10 COOPS - ELEVATOR APARTMENTS,2,718,37,,D4,\"245 WEST 25TH STREET\",{apartment},10001,0,0,0,0,0,1930,2,D4,\"{price}\",{date}"
        ));
        self
    }

    /// 追加 n 行金额为正的住宅成交
    pub fn many_sales(mut self, n: usize) -> Self {
        for i in 0..n {
            self = self.sale(
                1000 + i as u32,
                (i % 90 + 1) as u32,
                "01 ONE FAMILY DWELLINGS",
                "$1,000,000",
                "2023-06-01",
            );
        }
        self
    }

    pub fn build(&self) -> String {
        let mut text = String::from(NYC_HEADER);
        text.push('\n');
        for row in &self.rows {
            text.push_str(row);
            text.push('\n');
        }
        text
    }
}

// ==========================================
// 替身数据源
// ==========================================
pub struct StaticSource(pub String);

#[async_trait]
impl SalesSource for StaticSource {
    async fn fetch_text(&self, _settings: &ImportSettings) -> ImportResult<String> {
        Ok(self.0.clone())
    }
}

// ==========================================
// 替身仓储: 包装真实仓储，记录批大小并按序号注入失败
// ==========================================
pub struct FlakyRepository {
    pub inner: SalesRepositoryImpl,
    pub fail_on: Vec<usize>,
    pub calls: Mutex<Vec<usize>>,
}

impl FlakyRepository {
    pub fn new(db_path: &str, fail_on: Vec<usize>) -> Self {
        Self {
            inner: SalesRepositoryImpl::new(db_path).unwrap(),
            fail_on,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, size: usize) -> RepositoryResult<()> {
        let mut calls = self.calls.lock().unwrap();
        let idx = calls.len();
        calls.push(size);
        if self.fail_on.contains(&idx) {
            return Err(RepositoryError::DatabaseQueryError(format!(
                "injected failure on call {}",
                idx
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SalesRepository for FlakyRepository {
    async fn bulk_insert(&self, run_id: &str, records: &[SaleRecord]) -> RepositoryResult<usize> {
        self.record_call(records.len())?;
        self.inner.bulk_insert(run_id, records).await
    }

    async fn bulk_upsert(
        &self,
        run_id: &str,
        records: &[SaleRecord],
    ) -> RepositoryResult<UpsertCounts> {
        self.record_call(records.len())?;
        self.inner.bulk_upsert(run_id, records).await
    }

    async fn count_sales(&self, filter: &SaleFilter) -> RepositoryResult<i64> {
        self.inner.count_sales(filter).await
    }

    async fn list_sales(
        &self,
        filter: &SaleFilter,
        order: SaleOrder,
        limit: usize,
    ) -> RepositoryResult<Vec<StoredSale>> {
        self.inner.list_sales(filter, order, limit).await
    }
}
