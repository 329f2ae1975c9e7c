// ==========================================
// 纽约房产成交导入 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 整数、金额、日期解析
// 原则: 单字段解析失败只降级（None 或 0），不阻断整行
// ==========================================

use crate::importer::sales_importer_trait::DataCleaner as DataCleanerTrait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// 成交日期（含时间）格式，按顺序尝试
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
];

/// 成交日期（仅日期）格式，视为当日 00:00 UTC
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// 解析整数（block / lot）
    ///
    /// # 规则
    /// - 去除千分位逗号后按十进制解析
    /// - 0 是合法值，保留为 Some(0)
    fn parse_integer(&self, value: &str) -> Option<i64> {
        let digits: String = value
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();
        if digits.is_empty() {
            return None;
        }
        digits.parse::<i64>().ok()
    }

    /// 解析成交金额（sale_price）
    ///
    /// # 规则
    /// - 去除 `$`、千分位逗号、空白
    /// - 空串 / "-" / 无法解析 / 非有限值 / 负数 → 0
    fn parse_amount(&self, value: &str) -> f64 {
        let cleaned: String = value
            .chars()
            .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
            .collect();
        if cleaned.is_empty() || cleaned == "-" {
            return 0.0;
        }

        match cleaned.parse::<f64>() {
            Ok(amount) if amount.is_finite() && amount >= 0.0 => amount,
            _ => 0.0,
        }
    }

    fn parse_sale_date(&self, value: &str) -> Option<DateTime<Utc>> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Some(dt.with_timezone(&Utc));
        }

        for fmt in DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return Some(naive.and_utc());
            }
        }

        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
                return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clean_text() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_text("  MANHATTAN "), Some("MANHATTAN".to_string()));
        assert_eq!(cleaner.clean_text("   "), None);
        assert_eq!(cleaner.clean_text(""), None);
    }

    #[test]
    fn test_parse_integer() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_integer("1234"), Some(1234));
        assert_eq!(cleaner.parse_integer(" 1,234 "), Some(1234));
        assert_eq!(cleaner.parse_integer("0"), Some(0));
        assert_eq!(cleaner.parse_integer(""), None);
        assert_eq!(cleaner.parse_integer("12A"), None);
    }

    #[test]
    fn test_parse_amount() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_amount("$1,250,000"), 1_250_000.0);
        assert_eq!(cleaner.parse_amount("850000"), 850_000.0);
        assert_eq!(cleaner.parse_amount(" - "), 0.0);
        assert_eq!(cleaner.parse_amount(""), 0.0);
        assert_eq!(cleaner.parse_amount("abc"), 0.0);
        assert_eq!(cleaner.parse_amount("-500"), 0.0);
        assert_eq!(cleaner.parse_amount("NaN"), 0.0);
    }

    #[test]
    fn test_parse_sale_date_formats() {
        let cleaner = DataCleaner;
        let midnight = Utc.with_ymd_and_hms(2023, 3, 15, 0, 0, 0).unwrap();

        assert_eq!(cleaner.parse_sale_date("2023-03-15"), Some(midnight));
        assert_eq!(cleaner.parse_sale_date("03/15/2023"), Some(midnight));
        assert_eq!(cleaner.parse_sale_date("2023-03-15 00:00:00"), Some(midnight));
        assert_eq!(
            cleaner.parse_sale_date("03/15/2023 12:00:00 AM"),
            Some(midnight)
        );
        assert_eq!(
            cleaner.parse_sale_date("2023-03-15T14:30:00.000"),
            Some(Utc.with_ymd_and_hms(2023, 3, 15, 14, 30, 0).unwrap())
        );
        assert_eq!(
            cleaner.parse_sale_date("2023-03-15T10:00:00-04:00"),
            Some(Utc.with_ymd_and_hms(2023, 3, 15, 14, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_sale_date_invalid() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_sale_date(""), None);
        assert_eq!(cleaner.parse_sale_date("not a date"), None);
        assert_eq!(cleaner.parse_sale_date("2023-13-45"), None);
    }
}
