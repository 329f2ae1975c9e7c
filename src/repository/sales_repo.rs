// ==========================================
// 纽约房产成交导入 - 成交记录 Repository Trait
// ==========================================
// 职责: 定义 property_sales 表的数据访问接口（不包含实现）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::sales::{SaleFilter, SaleRecord, StoredSale, UpsertCounts};
use crate::domain::types::SaleOrder;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// SalesRepository Trait
// ==========================================
// 用途: 导入器写入 + 读侧查询
// 实现者: SalesRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait SalesRepository: Send + Sync {
    // ===== 批量写入（单批次一个事务）=====

    /// 批量追加成交记录（无去重）
    ///
    /// # 参数
    /// - run_id: 导入批次号（写入每一行）
    /// - records: 标准化成交记录
    ///
    /// # 返回
    /// - Ok(usize): 写入条数
    /// - Err: 数据库错误（整个批次回滚）
    async fn bulk_insert(&self, run_id: &str, records: &[SaleRecord]) -> RepositoryResult<usize>;

    /// 批量写入成交记录（document_id 相同则覆盖）
    ///
    /// # 返回
    /// - Ok(UpsertCounts): written 为写入条数（更新 + 新增，每条记录计一次）；
    ///   merged 为覆盖了同一 run_id 已写行的条数
    /// - Err: 数据库错误（整个批次回滚）
    async fn bulk_upsert(
        &self,
        run_id: &str,
        records: &[SaleRecord],
    ) -> RepositoryResult<UpsertCounts>;

    // ===== 查询 =====

    /// 按过滤条件统计记录数
    async fn count_sales(&self, filter: &SaleFilter) -> RepositoryResult<i64>;

    /// 按过滤条件、排序、条数上限查询记录
    async fn list_sales(
        &self,
        filter: &SaleFilter,
        order: SaleOrder,
        limit: usize,
    ) -> RepositoryResult<Vec<StoredSale>>;
}
