// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证文件数据库上的导入配置读取
// ==========================================

mod test_helpers;

use nyc_sales_importer::config::{config_keys, ConfigManager, ImportConfigReader};
use nyc_sales_importer::db::{open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use nyc_sales_importer::domain::types::WriteMode;
use std::time::Duration;
use test_helpers::{create_test_db, insert_test_config};

#[tokio::test]
async fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let config_manager = ConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "ConfigManager should be created successfully"
    );

    let conn = open_sqlite_connection(&db_path).unwrap();
    assert_eq!(
        read_schema_version(&conn).unwrap(),
        Some(CURRENT_SCHEMA_VERSION)
    );
}

#[tokio::test]
async fn test_load_settings_with_overrides() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    insert_test_config(&db_path, config_keys::SOURCE_URL, "http://localhost:9999/sales.csv").unwrap();
    insert_test_config(&db_path, config_keys::FETCH_TIMEOUT_SECS, "5").unwrap();
    insert_test_config(&db_path, config_keys::WRITE_MODE, " upsert ").unwrap();
    insert_test_config(&db_path, config_keys::USER_AGENT, "test-agent/1.0").unwrap();

    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    let settings = config_manager.load_settings().await.unwrap();

    assert_eq!(settings.source_url, "http://localhost:9999/sales.csv");
    assert_eq!(settings.fetch_timeout, Duration::from_secs(5));
    assert_eq!(settings.write_mode, WriteMode::Upsert);
    assert_eq!(settings.user_agent, "test-agent/1.0");
    assert_eq!(settings.batch_size, 500);
}

#[tokio::test]
async fn test_blank_value_uses_default() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    insert_test_config(&db_path, config_keys::MAX_ROWS, "   ").unwrap();
    insert_test_config(&db_path, config_keys::BATCH_SIZE, "-3").unwrap();

    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    assert_eq!(config_manager.get_max_rows().await.unwrap(), None);
    assert_eq!(config_manager.get_batch_size().await.unwrap(), 500);
}
