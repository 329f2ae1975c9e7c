// ==========================================
// 纽约房产成交导入 - 成交记录 Repository 实现
// ==========================================
// 职责: 实现 property_sales 表数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::sales::{SaleFilter, SaleRecord, StoredSale, UpsertCounts};
use crate::domain::types::{PropertyType, SaleOrder};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sales_repo::SalesRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Statement, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};

const INSERT_SQL: &str = r#"
    INSERT INTO property_sales (
        document_id, borough, property_address, block, lot, document_amt,
        document_date, recorded_datetime, property_type, import_run_id, created_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
"#;

const SELECT_COLUMNS: &str = r#"
    id, document_id, borough, property_address, block, lot, document_amt,
    document_date, recorded_datetime, property_type, import_run_id, created_at
"#;

// ==========================================
// SalesRepositoryImpl
// ==========================================
pub struct SalesRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl SalesRepositoryImpl {
    /// 创建新的 Repository 实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            ensure_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入单条记录
    fn insert_one(
        stmt: &mut Statement,
        run_id: &str,
        record: &SaleRecord,
        created_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        stmt.execute(params![
            record.document_id,
            record.borough,
            record.property_address,
            record.block,
            record.lot,
            record.document_amt,
            record.document_date,
            record.recorded_datetime,
            record.property_type.as_str(),
            run_id,
            created_at,
        ])?;
        Ok(())
    }

    /// 在事务中批量追加
    fn insert_tx(
        tx: &Transaction,
        run_id: &str,
        records: &[SaleRecord],
        created_at: DateTime<Utc>,
    ) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(INSERT_SQL)?;
        for record in records {
            Self::insert_one(&mut stmt, run_id, record, created_at)?;
        }
        Ok(records.len())
    }

    /// 在事务中按 document_id 覆盖写入
    ///
    /// # 规则
    /// - 逐条处理：已有同 document_id 的行则更新，否则插入
    /// - 同批次内重复的 document_id 依次覆盖，最后一条生效
    /// - 被更新的行若已带本次 run_id，计入 merged
    fn upsert_tx(
        tx: &Transaction,
        run_id: &str,
        records: &[SaleRecord],
        created_at: DateTime<Utc>,
    ) -> RepositoryResult<UpsertCounts> {
        let mut lookup = tx.prepare(
            "SELECT import_run_id FROM property_sales WHERE document_id = ?1 ORDER BY id DESC LIMIT 1",
        )?;
        let mut update = tx.prepare(
            r#"
            UPDATE property_sales SET
                borough = ?2, property_address = ?3, block = ?4, lot = ?5,
                document_amt = ?6, document_date = ?7, recorded_datetime = ?8,
                property_type = ?9, import_run_id = ?10
            WHERE document_id = ?1
            "#,
        )?;
        let mut insert = tx.prepare(INSERT_SQL)?;

        let mut counts = UpsertCounts::default();
        for record in records {
            let previous_run: Option<String> = lookup
                .query_row(params![record.document_id], |row| row.get(0))
                .optional()?;

            match previous_run {
                Some(previous_run) => {
                    update.execute(params![
                        record.document_id,
                        record.borough,
                        record.property_address,
                        record.block,
                        record.lot,
                        record.document_amt,
                        record.document_date,
                        record.recorded_datetime,
                        record.property_type.as_str(),
                        run_id,
                    ])?;
                    if previous_run == run_id {
                        counts.merged += 1;
                    }
                }
                None => Self::insert_one(&mut insert, run_id, record, created_at)?,
            }
            counts.written += 1;
        }

        Ok(counts)
    }

    /// 组装 WHERE 子句与参数
    fn build_where(filter: &SaleFilter) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        if let Some(borough) = &filter.borough {
            values.push(Value::Text(borough.clone()));
            clauses.push(format!("borough = ?{}", values.len()));
        }
        if let Some(property_type) = filter.property_type {
            values.push(Value::Text(property_type.as_str().to_string()));
            clauses.push(format!("property_type = ?{}", values.len()));
        }
        if let Some(min_amount) = filter.min_amount {
            values.push(Value::Real(min_amount));
            clauses.push(format!("document_amt >= ?{}", values.len()));
        }

        let sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        (sql, values)
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<StoredSale> {
        let property_type: String = row.get(9)?;
        Ok(StoredSale {
            id: row.get(0)?,
            record: SaleRecord {
                document_id: row.get(1)?,
                borough: row.get(2)?,
                property_address: row.get(3)?,
                block: row.get(4)?,
                lot: row.get(5)?,
                document_amt: row.get(6)?,
                document_date: row.get(7)?,
                recorded_datetime: row.get(8)?,
                property_type: property_type
                    .parse::<PropertyType>()
                    .unwrap_or(PropertyType::Unknown),
            },
            import_run_id: row.get(10)?,
            created_at: row.get(11)?,
        })
    }
}

#[async_trait]
impl SalesRepository for SalesRepositoryImpl {
    async fn bulk_insert(&self, run_id: &str, records: &[SaleRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let count = Self::insert_tx(&tx, run_id, records, Utc::now())?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    async fn bulk_upsert(
        &self,
        run_id: &str,
        records: &[SaleRecord],
    ) -> RepositoryResult<UpsertCounts> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let counts = Self::upsert_tx(&tx, run_id, records, Utc::now())?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(counts)
    }

    async fn count_sales(&self, filter: &SaleFilter) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let (where_sql, values) = Self::build_where(filter);
        let sql = format!("SELECT COUNT(*) FROM property_sales{}", where_sql);
        let count = conn.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
        Ok(count)
    }

    async fn list_sales(
        &self,
        filter: &SaleFilter,
        order: SaleOrder,
        limit: usize,
    ) -> RepositoryResult<Vec<StoredSale>> {
        let conn = self.get_conn()?;
        let (where_sql, mut values) = Self::build_where(filter);
        values.push(Value::Integer(limit as i64));
        let sql = format!(
            "SELECT {} FROM property_sales{} ORDER BY {} LIMIT ?{}",
            SELECT_COLUMNS,
            where_sql,
            order.to_sql(),
            values.len()
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), Self::map_row)?;

        let mut sales = Vec::new();
        for row in rows {
            sales.push(row?);
        }
        Ok(sales)
    }
}
