// ==========================================
// 纽约房产成交导入 - CSV 解析器实现
// ==========================================
// 阶段 3: 响应体 → RawSaleRecord 列表
// 规则: 首行为表头，必须与 EXPECTED_COLUMNS 完全对应（忽略大小写/分隔符）
//       数据行按列位置反序列化；列数不一致视为致命错误
// ==========================================

use crate::domain::sales::RawSaleRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::sales_importer_trait::SalesParser;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

/// 数据源固定列（顺序敏感）
pub const EXPECTED_COLUMNS: [&str; 21] = [
    "borough",
    "neighborhood",
    "building_class_category",
    "tax_class_at_present",
    "block",
    "lot",
    "easement",
    "building_class_at_present",
    "address",
    "apartment_number",
    "zip_code",
    "residential_units",
    "commercial_units",
    "total_units",
    "land_square_feet",
    "gross_square_feet",
    "year_built",
    "tax_class_at_time_of_sale",
    "building_class_at_time_of_sale",
    "sale_price",
    "sale_date",
];

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct SalesCsvParser;

impl SalesParser for SalesCsvParser {
    fn parse_records(&self, text: &str) -> ImportResult<Vec<RawSaleRecord>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        // 读取表头
        let headers = reader.headers()?.clone();
        validate_headers(&headers)?;

        // 读取所有行
        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;

            // 跳过完全空白的行
            if record.iter().all(|v| v.is_empty()) {
                continue;
            }

            let raw: RawSaleRecord = record.deserialize(None)?;
            records.push(raw);
        }

        debug!(rows = records.len(), "CSV 解析完成");
        Ok(records)
    }
}

/// 表头名规整: 小写，仅保留字母数字
///
/// "BUILDING CLASS CATEGORY" / "building_class_category" / "EASE-MENT"
/// 分别规整为 "buildingclasscategory" / "buildingclasscategory" / "easement"
fn normalize_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// 校验表头与固定列逐一对应
fn validate_headers(headers: &StringRecord) -> ImportResult<()> {
    let column_count = headers.len().max(EXPECTED_COLUMNS.len());

    for idx in 0..column_count {
        let expected = EXPECTED_COLUMNS.get(idx).copied();
        let found = headers.get(idx);

        let matches = match (expected, found) {
            (Some(e), Some(f)) => normalize_header(e) == normalize_header(f),
            _ => false,
        };

        if !matches {
            return Err(ImportError::SchemaMismatch {
                column: idx + 1,
                expected: expected.unwrap_or("<none>").to_string(),
                found: found.unwrap_or("<missing>").to_string(),
            });
        }
    }

    Ok(())
}
