// ==========================================
// 成交数据查询API
// ==========================================
// 职责: 已入库成交记录的统计与列表查询
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::sales::{SaleFilter, StoredSale};
use crate::domain::types::{PropertyType, SaleOrder};
use crate::repository::SalesRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 列表查询默认条数
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// 列表查询最大条数
pub const MAX_LIST_LIMIT: usize = 1000;

/// 查询参数（均为可选）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesQuery {
    pub borough: Option<String>,
    pub property_type: Option<String>,
    pub min_amount: Option<f64>,
    pub order: Option<String>,
    pub limit: Option<usize>,
}

impl SalesQuery {
    /// 参数 → 过滤条件
    pub fn to_filter(&self) -> ApiResult<SaleFilter> {
        let property_type = match self.property_type.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<PropertyType>()
                    .map_err(ApiError::InvalidInput)?,
            ),
        };

        if let Some(min) = self.min_amount {
            if !min.is_finite() {
                return Err(ApiError::InvalidInput(
                    "min_amount must be a finite number".to_string(),
                ));
            }
        }

        Ok(SaleFilter {
            borough: self
                .borough
                .as_deref()
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(str::to_string),
            property_type,
            min_amount: self.min_amount,
        })
    }

    /// 排序参数（缺省按成交日期倒序）
    pub fn to_order(&self) -> ApiResult<SaleOrder> {
        match self.order.as_deref().map(str::trim) {
            None | Some("") => Ok(SaleOrder::default()),
            Some(raw) => raw.parse::<SaleOrder>().map_err(ApiError::InvalidInput),
        }
    }

    /// 条数上限，限制在 1..=MAX_LIST_LIMIT
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: i64,
}

// ==========================================
// SalesQueryApi
// ==========================================
pub struct SalesQueryApi {
    sales_repo: Arc<dyn SalesRepository>,
}

impl SalesQueryApi {
    pub fn new(sales_repo: Arc<dyn SalesRepository>) -> Self {
        Self { sales_repo }
    }

    pub async fn count_sales(&self, query: &SalesQuery) -> ApiResult<CountResponse> {
        let filter = query.to_filter()?;
        let count = self.sales_repo.count_sales(&filter).await?;
        Ok(CountResponse { count })
    }

    pub async fn list_sales(&self, query: &SalesQuery) -> ApiResult<Vec<StoredSale>> {
        let filter = query.to_filter()?;
        let order = query.to_order()?;
        let rows = self
            .sales_repo
            .list_sales(&filter, order, query.effective_limit())
            .await?;
        Ok(rows)
    }
}
