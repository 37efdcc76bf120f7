// ==========================================
// DataImporter 集成测试
// ==========================================
// 测试目标: CSV 导入全流程（主键重映射、去重、行级隔离、批量）
// ==========================================

mod test_helpers;

use inventory_import::importer::ImportError;
use inventory_import::{
    logging, DataImporter, ImportOptions, LoadedSource, RecordSource, SqliteInventoryRepository,
    SupportedTable,
};
use test_helpers::{
    create_memory_importer, create_test_db, create_test_importer, csv_source, full_chain_sources,
    user,
};

fn widget_file() -> LoadedSource {
    csv_source(
        "Projects.csv",
        &[
            "#Name,Description,Location,Color,DateCreatedUtc",
            "\"Widget\",,,\"0\",\"2024-01-01 00:00:00\"",
        ],
    )
}

#[tokio::test]
async fn test_widget_project_imported_once() {
    logging::init_test();

    let importer = create_memory_importer();

    let first = importer.import_csv(&[widget_file()], &user()).await.unwrap();
    assert!(first.success);
    assert_eq!(first.total_rows_imported, 1);
    assert!(first.errors.is_empty(), "errors: {:?}", first.errors);

    let projects = importer.sink().list_projects(&user()).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "Widget");
    assert_eq!(projects[0].description, None);
    assert_eq!(projects[0].location, None);
    assert_eq!(projects[0].color, 0);

    // 第二次导入同一文件: 警告而非错误，不计数
    let second = importer.import_csv(&[widget_file()], &user()).await.unwrap();
    assert!(second.success);
    assert_eq!(second.total_rows_imported, 0);
    assert!(second.errors.is_empty());
    assert!(second
        .warnings
        .contains(&"Project with name 'Widget' already exists.".to_string()));
    assert_eq!(importer.sink().list_projects(&user()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_row_is_isolated() {
    let importer = create_memory_importer();
    let source = csv_source(
        "Projects.csv",
        &[
            "#ProjectId,Name",
            "1,\"Alpha\"",
            "2,\"Beta\",\"unexpected\"",
            "3,\"Gamma\"",
            "4,\"Delta\"",
        ],
    );

    let result = importer.import_csv(&[source], &user()).await.unwrap();

    assert_eq!(result.total_rows_imported, 3);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(
        result.warnings[0],
        "Projects.csv: row 2 has 3 fields but the header has 2; row skipped."
    );
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn test_full_foreign_key_chain_is_remapped() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path);

    let result = importer.import_batch(full_chain_sources(), &user()).await;
    assert!(result.success);
    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert_eq!(result.total_rows_imported, 15);
    assert_eq!(result.imported(SupportedTable::PartTypes), 2);
    assert_eq!(result.imported(SupportedTable::ProjectPartAssignments), 2);

    let repo = importer.sink();
    let projects = repo.list_projects(&user()).await.unwrap();
    let project_id = projects[0].project_id;

    // 子类型排在父类型之后写入，父引用指向新主键
    let part_types = repo.list_part_types(&user()).await.unwrap();
    let capacitor = part_types.iter().find(|t| t.name == "Capacitor").unwrap();
    let ceramic = part_types.iter().find(|t| t.name == "Ceramic").unwrap();
    assert_eq!(capacitor.parent_part_type_id, None);
    assert_eq!(ceramic.parent_part_type_id, Some(capacitor.part_type_id));
    assert_eq!(ceramic.keywords, vec!["mlcc".to_string(), "smd".to_string()]);

    let parts = repo.list_parts(&user()).await.unwrap();
    let cl10 = parts.iter().find(|p| p.part_number == "CL10A106").unwrap();
    let grm = parts.iter().find(|p| p.part_number == "GRM188").unwrap();
    assert_eq!(cl10.part_type_id, ceramic.part_type_id);
    assert_eq!(cl10.project_id, Some(project_id));
    assert_eq!(cl10.global_id, "0c6f2f7e-9d0e-4d3e-8d6a-3f1d4b1f2a10");
    assert_eq!(grm.project_id, None);
    assert!(!grm.global_id.is_empty());
    assert!(!grm.short_id.is_empty());

    let parametrics = repo.list_part_parametrics(&user()).await.unwrap();
    assert_eq!(parametrics[0].part_id, cl10.part_id);

    let models = repo.list_part_models(&user()).await.unwrap();
    assert_eq!(models[0].part_id, grm.part_id);

    // RecordId 按归属类型重映射
    let fields = repo.list_custom_fields(&user()).await.unwrap();
    let supplier = fields.iter().find(|f| f.name == "Supplier Code").unwrap();
    assert!(supplier.is_required);
    let values = repo.list_custom_field_values(&user()).await.unwrap();
    let supplier_value = values
        .iter()
        .find(|v| v.custom_field_id == supplier.custom_field_id)
        .unwrap();
    assert_eq!(supplier_value.record_id, grm.part_id);
    let owner_value = values
        .iter()
        .find(|v| v.custom_field_id != supplier.custom_field_id)
        .unwrap();
    assert_eq!(owner_value.record_id, project_id);

    let pcbs = repo.list_pcbs(&user()).await.unwrap();
    let pcb_assignments = repo.list_project_pcb_assignments(&user()).await.unwrap();
    assert_eq!(pcb_assignments[0].project_id, project_id);
    assert_eq!(pcb_assignments[0].pcb_id, pcbs[0].pcb_id);

    let part_assignments = repo.list_project_part_assignments(&user()).await.unwrap();
    let first = part_assignments
        .iter()
        .find(|a| a.reference_id.as_deref() == Some("C1 C2 C3 C4"))
        .unwrap();
    assert_eq!(first.part_id, Some(cl10.part_id));
    assert_eq!(first.pcb_id, Some(pcbs[0].pcb_id));
    let second = part_assignments
        .iter()
        .find(|a| a.reference_id.as_deref() == Some("J1"))
        .unwrap();
    assert_eq!(second.part_id, None);
    assert_eq!(second.pcb_id, None);
}

#[tokio::test]
async fn test_missing_reference_is_row_scoped() {
    let importer = create_memory_importer();
    let sources = vec![
        csv_source("PartTypes.csv", &["#PartTypeId,Name", "1,\"Resistor\""]),
        csv_source(
            "Parts.csv",
            &[
                "#PartId,PartNumber,PartTypeId",
                "5,\"RC0603\",\"99\"",
                "6,\"RC0805\",\"1\"",
            ],
        ),
    ];

    let result = importer.import_csv(&sources, &user()).await.unwrap();

    assert!(result.success);
    assert_eq!(result.imported(SupportedTable::Parts), 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Parts row 1 (PartId=5): "));
    assert!(result.errors[0].contains("original id 99"));
}

#[tokio::test]
async fn test_zero_foreign_key_depends_on_option() {
    let sources = || {
        vec![
            csv_source("PartTypes.csv", &["#PartTypeId,Name", "1,\"Inductor\""]),
            csv_source(
                "Parts.csv",
                &["#PartId,PartNumber,PartTypeId,ProjectId", "7,\"L0402\",\"1\",\"0\""],
            ),
        ]
    };

    // 默认: 0 视为无引用
    let lenient = create_memory_importer();
    let result = lenient.import_csv(&sources(), &user()).await.unwrap();
    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    let parts = lenient.sink().list_parts(&user()).await.unwrap();
    assert_eq!(parts[0].project_id, None);

    // 关闭后: 0 是一次查找失败
    let strict = DataImporter::new(
        SqliteInventoryRepository::in_memory().unwrap(),
        ImportOptions {
            treat_zero_as_null: false,
            ..ImportOptions::default()
        },
    );
    let result = strict.import_csv(&sources(), &user()).await.unwrap();
    assert_eq!(result.imported(SupportedTable::Parts), 0);
    assert_eq!(result.errors.len(), 1);
}

#[tokio::test]
async fn test_import_paths_reads_files_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let projects = dir.path().join("Projects.csv");
    let notes = dir.path().join("notes.txt");
    tokio::fs::write(&projects, "#ProjectId,Name\r\n1,\"Lander\"\r\n")
        .await
        .unwrap();
    tokio::fs::write(&notes, "not an export").await.unwrap();

    let importer = create_memory_importer();
    let result = importer
        .import_paths(&[projects.clone(), notes], &user())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.imported(SupportedTable::Projects), 1);
    assert!(result
        .warnings
        .contains(&"notes.txt: unsupported file format; skipped.".to_string()));

    let missing = dir.path().join("Pcbs.csv");
    let err = importer.import_paths(&[missing], &user()).await.unwrap_err();
    assert!(matches!(err, ImportError::FileRead(_)));
}

#[tokio::test]
async fn test_unsupported_file_name_aborts_csv_group() {
    let importer = create_memory_importer();
    let result = importer
        .import_batch(
            vec![
                csv_source("Orders.csv", &["#OrderId,Name", "1,\"x\""]),
                LoadedSource::new(
                    "dump.sql",
                    "INSERT INTO dbo.Pcbs (PcbId, Name) VALUES (1, N'Main');",
                ),
            ],
            &user(),
        )
        .await;

    // csv 组中止，sql 组仍完整处理
    assert!(result.success);
    assert_eq!(result.imported(SupportedTable::Pcbs), 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("csv import aborted: "));
}
