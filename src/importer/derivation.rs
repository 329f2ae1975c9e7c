// ==========================================
// 纽约房产成交导入 - 字段派生服务实现
// ==========================================
// 职责: property_type 分类 / document_id 生成
// ==========================================

use crate::domain::sales::SaleRecord;
use crate::domain::types::PropertyType;
use crate::importer::sales_importer_trait::DerivationService as DerivationServiceTrait;
use uuid::Uuid;

/// 住宅类关键字
const RESIDENTIAL_KEYWORDS: &[&str] = &["FAMILY", "RESIDENTIAL", "APARTMENT", "DWELLING", "CONDO"];

/// 商业类关键字
const COMMERCIAL_KEYWORDS: &[&str] = &["COMMERCIAL", "OFFICE", "RETAIL", "STORE", "HOTEL", "FACTORY"];

/// 混合用途关键字
const MIXED_KEYWORD: &str = "MIXED";

/// document_id 的 UUID v5 命名空间（固定值，变更会导致历史 ID 全部失配）
const DOCUMENT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6c1f_6f8e_0d2b_4a57_9a51_3c2e_7b4d_8e10);

pub struct DerivationService;

impl DerivationServiceTrait for DerivationService {
    fn derive_property_type(&self, building_class_category: Option<&str>) -> PropertyType {
        let category = match building_class_category.map(|c| c.trim().to_uppercase()) {
            Some(c) if !c.is_empty() => c,
            _ => return PropertyType::Unknown,
        };

        if RESIDENTIAL_KEYWORDS.iter().any(|k| category.contains(k)) {
            return PropertyType::Residential;
        }
        if COMMERCIAL_KEYWORDS.iter().any(|k| category.contains(k)) {
            return PropertyType::Commercial;
        }
        if category.contains(MIXED_KEYWORD) {
            return PropertyType::MixedUse;
        }

        PropertyType::Other
    }

    /// 派生 document_id
    ///
    /// # 规则
    /// - key = borough|block|lot|address|apartment_number|document_date(RFC3339)|document_amt(两位小数)
    /// - address / apartment_number 去首尾空白并转大写
    /// - document_id = "DOC-" + UUIDv5(key)
    /// - 缺失字段以空串参与拼接
    fn derive_document_id(&self, record: &SaleRecord, apartment_number: Option<&str>) -> String {
        let key = format!(
            "{}|{}|{}|{}|{}|{}|{:.2}",
            record.borough.as_deref().unwrap_or(""),
            record.block.map(|b| b.to_string()).unwrap_or_default(),
            record.lot.map(|l| l.to_string()).unwrap_or_default(),
            normalize_key_part(record.property_address.as_deref()),
            normalize_key_part(apartment_number),
            record
                .document_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
            record.document_amt,
        );

        format!("DOC-{}", Uuid::new_v5(&DOCUMENT_ID_NAMESPACE, key.as_bytes()))
    }
}

fn normalize_key_part(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_uppercase()).unwrap_or_default()
}
