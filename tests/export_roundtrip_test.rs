// ==========================================
// 导出 → 导入 往返测试
// ==========================================
// 测试目标: 导出产物可被导入端完整读回（新库中重建同样的关系）
// ==========================================

mod test_helpers;

use inventory_import::exporter::write_to_dir;
use inventory_import::{
    CsvExporter, ExportedFile, LoadedSource, RecordSource, SqlExporter, SqliteInventoryRepository,
    SupportedTable,
};
use test_helpers::{
    create_memory_importer, create_test_db, create_test_importer, csv_source, full_chain_sources,
    user,
};

/// 源库: 导入完整外键链
async fn seeded_repository() -> (tempfile::NamedTempFile, SqliteInventoryRepository) {
    let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path);
    let result = importer.import_batch(full_chain_sources(), &user()).await;
    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);

    let repo = SqliteInventoryRepository::new(&db_path).expect("Failed to reopen db");
    (temp_file, repo)
}

fn as_sources(files: &[ExportedFile]) -> Vec<LoadedSource> {
    files
        .iter()
        .map(|f| LoadedSource::new(f.file_name.clone(), f.content.clone()))
        .collect()
}

/// 两个库中的关系一致（按业务键比较，不比较主键值）
async fn assert_same_inventory(left: &dyn RecordSource, right: &dyn RecordSource) {
    let u = user();

    let left_projects = left.list_projects(&u).await.unwrap();
    let right_projects = right.list_projects(&u).await.unwrap();
    assert_eq!(left_projects.len(), right_projects.len());
    assert_eq!(left_projects[0].name, right_projects[0].name);
    assert_eq!(left_projects[0].description, right_projects[0].description);
    assert_eq!(left_projects[0].date_created_utc, right_projects[0].date_created_utc);

    let left_parts = left.list_parts(&u).await.unwrap();
    let right_parts = right.list_parts(&u).await.unwrap();
    assert_eq!(left_parts.len(), right_parts.len());
    for part in &left_parts {
        let copy = right_parts
            .iter()
            .find(|p| p.part_number == part.part_number)
            .unwrap();
        assert_eq!(copy.global_id, part.global_id);
        assert_eq!(copy.short_id, part.short_id);
        assert_eq!(copy.cost, part.cost);
        assert_eq!(copy.keywords, part.keywords);
        assert_eq!(copy.project_id.is_some(), part.project_id.is_some());
    }

    let right_types = right.list_part_types(&u).await.unwrap();
    let ceramic = right_types.iter().find(|t| t.name == "Ceramic").unwrap();
    let capacitor = right_types.iter().find(|t| t.name == "Capacitor").unwrap();
    assert_eq!(ceramic.parent_part_type_id, Some(capacitor.part_type_id));
    assert_eq!(ceramic.keywords, vec!["mlcc".to_string(), "smd".to_string()]);

    let right_values = right.list_custom_field_values(&u).await.unwrap();
    assert_eq!(right_values.len(), 2);
    let right_fields = right.list_custom_fields(&u).await.unwrap();
    let supplier = right_fields.iter().find(|f| f.name == "Supplier Code").unwrap();
    let supplier_value = right_values
        .iter()
        .find(|v| v.custom_field_id == supplier.custom_field_id)
        .unwrap();
    let grm = right_parts.iter().find(|p| p.part_number == "GRM188").unwrap();
    assert_eq!(supplier_value.record_id, grm.part_id);

    let left_parametrics = left.list_part_parametrics(&u).await.unwrap();
    let right_parametrics = right.list_part_parametrics(&u).await.unwrap();
    assert_eq!(left_parametrics[0].value_number, right_parametrics[0].value_number);

    assert_eq!(
        right.list_project_part_assignments(&u).await.unwrap().len(),
        left.list_project_part_assignments(&u).await.unwrap().len()
    );
    assert_eq!(right.list_project_pcb_assignments(&u).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_csv_export_round_trip() {
    let (_source_db, source) = seeded_repository().await;

    let files = CsvExporter::default().export(&source, &user()).await.unwrap();
    assert_eq!(files.len(), SupportedTable::ORDERED.len());

    let (_target_db, target_path) = create_test_db().expect("Failed to create target db");
    let importer = create_test_importer(&target_path);
    let result = importer.import_csv(&as_sources(&files), &user()).await.unwrap();

    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
    assert_eq!(result.total_rows_imported, 15);
    assert_same_inventory(&source, importer.sink()).await;
}

#[tokio::test]
async fn test_sql_export_round_trip_through_disk() {
    let (_source_db, source) = seeded_repository().await;

    let script = SqlExporter::default().export(&source, &user()).await.unwrap();
    assert!(script.content.starts_with("INSERT INTO dbo.Projects ("));

    let dir = tempfile::tempdir().unwrap();
    let written = write_to_dir(dir.path(), &[script]).await.unwrap();
    assert_eq!(written.len(), 1);

    let (_target_db, target_path) = create_test_db().expect("Failed to create target db");
    let importer = create_test_importer(&target_path);
    let result = importer.import_paths(&written, &user()).await.unwrap();

    assert!(result.success);
    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert_eq!(result.total_rows_imported, 15);
    assert_same_inventory(&source, importer.sink()).await;
}

#[tokio::test]
async fn test_reimport_of_export_reports_duplicates() {
    let (_source_db, source) = seeded_repository().await;
    let files = CsvExporter::default().export(&source, &user()).await.unwrap();

    // 导回同一个库: 命名实体全部判重，子记录按已有主键挂接
    let importer = inventory_import::DataImporter::new(source, Default::default());
    let result = importer.import_csv(&as_sources(&files), &user()).await.unwrap();

    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert_eq!(result.imported(SupportedTable::Projects), 0);
    assert_eq!(result.imported(SupportedTable::Parts), 0);
    assert_eq!(result.imported(SupportedTable::Pcbs), 0);
    assert!(result
        .warnings
        .contains(&"Pcb with name 'Power Board' already exists.".to_string()));
    assert_eq!(result.imported(SupportedTable::PartParametrics), 1);
}

#[tokio::test]
async fn test_backslashes_and_fractional_seconds_survive_round_trip() {
    let source = create_memory_importer();
    let seed = csv_source(
        "Projects.csv",
        &[
            "#ProjectId,Name,Description,Notes,DateCreatedUtc",
            r#"1,"Share","C:\\new\\table","tab\there","2023-06-30 13:45:10.250""#,
        ],
    );
    let seeded = source.import_csv(&[seed], &user()).await.unwrap();
    assert!(seeded.errors.is_empty(), "errors: {:?}", seeded.errors);

    let original = &source.sink().list_projects(&user()).await.unwrap()[0];
    assert_eq!(original.description.as_deref(), Some(r"C:\new\table"));
    assert_eq!(original.notes.as_deref(), Some("tab\there"));
    assert_eq!(
        original.date_created_utc.to_string(),
        "2023-06-30 13:45:10.250"
    );

    let csv_files = CsvExporter::default()
        .export(source.sink(), &user())
        .await
        .unwrap();
    let script = SqlExporter::default()
        .export(source.sink(), &user())
        .await
        .unwrap();

    let from_csv = create_memory_importer();
    from_csv.import_csv(&as_sources(&csv_files), &user()).await.unwrap();
    let from_sql = create_memory_importer();
    from_sql.import_sql(&as_sources(&[script]), &user()).await.unwrap();

    for target in [&from_csv, &from_sql] {
        let copy = &target.sink().list_projects(&user()).await.unwrap()[0];
        assert_eq!(copy.description, original.description);
        assert_eq!(copy.notes, original.notes);
        assert_eq!(copy.date_created_utc, original.date_created_utc);
    }
}
