// ==========================================
// 配置覆写集成测试
// ==========================================
// 测试目标: config_kv 中的导入选项经 ConfigManager 作用到导入器
// ==========================================

mod test_helpers;

use inventory_import::config::config_keys;
use inventory_import::importer::ImportError;
use inventory_import::{
    ConfigManager, DataImporter, LoadedSource, SqliteInventoryRepository, SupportedTable,
};
use test_helpers::{create_test_db, user};

fn configured_manager(db_path: &str) -> ConfigManager {
    let config = ConfigManager::new(db_path).expect("Failed to create ConfigManager");
    config
        .set_global_config_value(config_keys::HEADER_MARKER, "!")
        .unwrap();
    config
        .set_global_config_value(config_keys::CSV_FIELD_DELIMITERS, "|")
        .unwrap();
    config
        .set_global_config_value(config_keys::PERMITTED_SCHEMA_PREFIX, "inv")
        .unwrap();
    config
}

#[tokio::test]
async fn test_importer_uses_configured_options() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = configured_manager(&db_path);

    let repo = SqliteInventoryRepository::new(&db_path).unwrap();
    let importer = DataImporter::with_config(repo, &config).await.unwrap();
    assert_eq!(importer.options().header_marker, '!');
    assert_eq!(importer.options().csv_field_delimiters, vec!['|']);

    let csv = LoadedSource::new("Pcbs.csv", "!PcbId|Name|Cost\r\n1|\"Driver, v2\"|\"3.10\"\r\n");
    let result = importer.import_csv(&[csv], &user()).await.unwrap();
    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert_eq!(result.imported(SupportedTable::Pcbs), 1);

    let sql = LoadedSource::new(
        "dump.sql",
        "INSERT INTO inv.Projects (ProjectId, Name) VALUES (1, N'Bench');",
    );
    let result = importer.import_sql(&[sql], &user()).await.unwrap();
    assert_eq!(result.imported(SupportedTable::Projects), 1);

    // 其它 schema 前缀不再被接受
    let foreign = LoadedSource::new(
        "dump.sql",
        "INSERT INTO dbo.Projects (ProjectId, Name) VALUES (2, N'Desk');",
    );
    let err = importer.import_sql(&[foreign], &user()).await.unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedTable { statement: 1, .. }));
}
