// ==========================================
// 电子表格导入集成测试
// ==========================================
// 测试目标: 工作簿从磁盘读入后按工作表导入
// ==========================================

mod test_helpers;

use inventory_import::{ImportError, LoadedSource, RecordSource, SupportedTable};
use std::path::Path;
use test_helpers::{create_memory_importer, user};

const WORKBOOK: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/inventory.xlsx");

#[tokio::test]
async fn test_workbook_from_disk_imports_named_sheets() {
    let importer = create_memory_importer();

    let result = importer
        .import_paths(&[Path::new(WORKBOOK)], &user())
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert_eq!(result.imported(SupportedTable::Projects), 1);
    assert_eq!(result.imported(SupportedTable::Pcbs), 2);
    assert_eq!(result.total_rows_imported, 3);
    assert_eq!(
        result.warnings,
        vec!["inventory.xlsx: worksheet 'Notes' does not name a supported table; skipped."
            .to_string()]
    );

    let repo = importer.sink();
    let projects = repo.list_projects(&user()).await.unwrap();
    assert_eq!(projects[0].name, "Rover");
    assert_eq!(projects[0].notes.as_deref(), Some("sheet import"));

    let pcbs = repo.list_pcbs(&user()).await.unwrap();
    let main = pcbs.iter().find(|p| p.name == "Main Board").unwrap();
    assert_eq!(main.quantity, 3);
    assert_eq!(main.cost.to_string(), "12.5");
    assert!(pcbs.iter().any(|p| p.name == "Aux Board" && p.quantity == 1));
}

#[tokio::test]
async fn test_spreadsheet_entry_point_rejects_csv_file() {
    let importer = create_memory_importer();
    let sources = vec![LoadedSource::new(
        "Projects.csv",
        "#ProjectId,Name\r\n1,\"Rover\"\r\n",
    )];

    let err = importer
        .import_spreadsheet(&sources, &user())
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::UnsupportedFormat { .. }));
    assert!(importer.sink().list_projects(&user()).await.unwrap().is_empty());
}
