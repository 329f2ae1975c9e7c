// ==========================================
// 纽约房产成交导入 - 领域类型定义
// ==========================================
// 物业类型分类 / 写入模式 / 查询排序
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 物业类型 (Property Type)
// ==========================================
// 由 building_class_category 关键字粗分为四类 + UNKNOWN
// 序列化格式: 与入库值一致（MIXED-USE 带连字符）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "RESIDENTIAL")]
    Residential, // 住宅
    #[serde(rename = "COMMERCIAL")]
    Commercial, // 商业
    #[serde(rename = "MIXED-USE")]
    MixedUse, // 商住混合
    #[serde(rename = "OTHER")]
    Other, // 其他（有类别但未命中关键字）
    #[serde(rename = "UNKNOWN")]
    Unknown, // 类别缺失
}

impl PropertyType {
    /// 入库/接口使用的字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Residential => "RESIDENTIAL",
            PropertyType::Commercial => "COMMERCIAL",
            PropertyType::MixedUse => "MIXED-USE",
            PropertyType::Other => "OTHER",
            PropertyType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RESIDENTIAL" => Ok(PropertyType::Residential),
            "COMMERCIAL" => Ok(PropertyType::Commercial),
            "MIXED-USE" | "MIXED_USE" => Ok(PropertyType::MixedUse),
            "OTHER" => Ok(PropertyType::Other),
            "UNKNOWN" => Ok(PropertyType::Unknown),
            other => Err(format!("unknown property type: {}", other)),
        }
    }
}

// ==========================================
// 写入模式 (Write Mode)
// ==========================================
// APPEND: 无条件追加（重复导入会产生重复行）
// UPSERT: 按 document_id 覆盖已有行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteMode {
    #[default]
    Append,
    Upsert,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Append => write!(f, "APPEND"),
            WriteMode::Upsert => write!(f, "UPSERT"),
        }
    }
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "APPEND" | "INSERT" => Ok(WriteMode::Append),
            "UPSERT" => Ok(WriteMode::Upsert),
            other => Err(format!("unknown write mode: {}", other)),
        }
    }
}

// ==========================================
// 查询排序 (Sale Order)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleOrder {
    #[default]
    DocumentDateDesc,
    DocumentDateAsc,
    DocumentAmtDesc,
    DocumentAmtAsc,
}

impl SaleOrder {
    /// ORDER BY 子句（固定白名单，不拼接外部输入）
    pub fn to_sql(&self) -> &'static str {
        match self {
            SaleOrder::DocumentDateDesc => "document_date DESC, id DESC",
            SaleOrder::DocumentDateAsc => "document_date ASC, id ASC",
            SaleOrder::DocumentAmtDesc => "document_amt DESC, id DESC",
            SaleOrder::DocumentAmtAsc => "document_amt ASC, id ASC",
        }
    }
}

impl FromStr for SaleOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "document_date_desc" => Ok(SaleOrder::DocumentDateDesc),
            "document_date_asc" => Ok(SaleOrder::DocumentDateAsc),
            "document_amt_desc" => Ok(SaleOrder::DocumentAmtDesc),
            "document_amt_asc" => Ok(SaleOrder::DocumentAmtAsc),
            other => Err(format!("unknown order: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_type_serde_matches_db_value() {
        let json = serde_json::to_string(&PropertyType::MixedUse).unwrap();
        assert_eq!(json, "\"MIXED-USE\"");
        assert_eq!(PropertyType::MixedUse.to_string(), "MIXED-USE");
    }

    #[test]
    fn test_property_type_from_str() {
        assert_eq!(
            "mixed-use".parse::<PropertyType>().unwrap(),
            PropertyType::MixedUse
        );
        assert_eq!(
            " residential ".parse::<PropertyType>().unwrap(),
            PropertyType::Residential
        );
        assert!("villa".parse::<PropertyType>().is_err());
    }

    #[test]
    fn test_write_mode_default_is_append() {
        assert_eq!(WriteMode::default(), WriteMode::Append);
        assert_eq!("upsert".parse::<WriteMode>().unwrap(), WriteMode::Upsert);
    }

    #[test]
    fn test_sale_order_parse() {
        assert_eq!(
            "document_amt_desc".parse::<SaleOrder>().unwrap(),
            SaleOrder::DocumentAmtDesc
        );
        assert!("price".parse::<SaleOrder>().is_err());
    }
}
