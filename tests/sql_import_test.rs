// ==========================================
// SQL INSERT 导入集成测试
// ==========================================
// 测试目标: 语句按表顺序重排、致命错误中止、值解码
// ==========================================

mod test_helpers;

use inventory_import::importer::ImportError;
use inventory_import::{LoadedSource, RecordSource, SupportedTable};
use test_helpers::{create_memory_importer, user};

#[tokio::test]
async fn test_shuffled_statements_follow_table_order() {
    let importer = create_memory_importer();
    let script = [
        "INSERT INTO dbo.ProjectPcbAssignments (ProjectPcbAssignmentId, ProjectId, PcbId) \
         VALUES (1, 20, 30);",
        "INSERT INTO dbo.Pcbs (PcbId, Name, Quantity) VALUES (30, N'Sensor Board', 5);",
        "INSERT INTO [dbo].[Projects] ([ProjectId], [Name], [Notes]) \
         VALUES (20, N'Rover', N'O''Brien; rev 2');",
    ]
    .join("\r\n");

    let result = importer
        .import_sql(&[LoadedSource::new("backup.sql", script)], &user())
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert_eq!(result.total_rows_imported, 3);

    let repo = importer.sink();
    let projects = repo.list_projects(&user()).await.unwrap();
    assert_eq!(projects[0].notes.as_deref(), Some("O'Brien; rev 2"));
    let pcbs = repo.list_pcbs(&user()).await.unwrap();
    assert_eq!(pcbs[0].quantity, 5);

    let assignments = repo.list_project_pcb_assignments(&user()).await.unwrap();
    assert_eq!(assignments[0].project_id, projects[0].project_id);
    assert_eq!(assignments[0].pcb_id, pcbs[0].pcb_id);
}

#[tokio::test]
async fn test_unsupported_table_aborts_before_any_write() {
    let importer = create_memory_importer();
    let script = "INSERT INTO dbo.Projects (ProjectId, Name) VALUES (1, N'Alpha');\r\n\
                  INSERT INTO dbo.Invoices (InvoiceId) VALUES (9);";

    let err = importer
        .import_sql(&[LoadedSource::new("backup.sql", script)], &user())
        .await
        .unwrap_err();

    match err {
        ImportError::UnsupportedTable { statement, table } => {
            assert_eq!(statement, 2);
            assert!(table.contains("Invoices"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(importer.sink().list_projects(&user()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_insert_statements_are_warnings() {
    let importer = create_memory_importer();
    let script = "SET IDENTITY_INSERT dbo.Pcbs ON;\r\n\
                  INSERT INTO dbo.Pcbs (PcbId, Name, Cost) VALUES (3, N'Relay Board', 4.75);\r\n\
                  INSERT INTO dbo.Pcbs (PcbId, Name) VALUES (4);";

    let result = importer
        .import_sql(&[LoadedSource::new("backup.sql", script)], &user())
        .await
        .unwrap();

    assert_eq!(result.imported(SupportedTable::Pcbs), 1);
    assert_eq!(result.warnings.len(), 2);
    assert_eq!(
        result.warnings[0],
        "backup.sql: statement 1 is not an INSERT statement; skipped."
    );
    assert_eq!(
        result.warnings[1],
        "backup.sql: statement 3 has 1 values but 2 columns; statement skipped."
    );

    let pcbs = importer.sink().list_pcbs(&user()).await.unwrap();
    assert_eq!(pcbs[0].cost.to_string(), "4.75");
}

#[tokio::test]
async fn test_reversed_ten_table_script_is_reordered() {
    let importer = create_memory_importer();
    // 每张支持表一条语句，按依赖的逆序排列
    let script = [
        "INSERT INTO dbo.ProjectPartAssignments \
         (ProjectPartAssignmentId, ProjectId, PartId, PcbId, Quantity, ReferenceId) \
         VALUES (1, 41, 70, 30, 4, N'C1 C2 C3 C4');",
        "INSERT INTO dbo.ProjectPcbAssignments (ProjectPcbAssignmentId, ProjectId, PcbId) \
         VALUES (1, 41, 30);",
        "INSERT INTO dbo.Pcbs (PcbId, Name, Quantity, Cost) VALUES (30, N'Power Board', 2, 12.50);",
        "INSERT INTO dbo.CustomFieldValues \
         (CustomFieldValueId, CustomFieldId, CustomFieldTypeId, RecordId, Value) \
         VALUES (1, 8, 1, 70, N'SC-01');",
        "INSERT INTO dbo.CustomFields (CustomFieldId, CustomFieldTypeId, Name, IsRequired) \
         VALUES (8, 1, N'Supplier Code', 1);",
        "INSERT INTO dbo.PartModels (PartModelId, PartId, Name, Filename) \
         VALUES (3, 70, N'0603', N'0603.step');",
        "INSERT INTO dbo.PartParametrics (PartParametricId, PartId, Name, Value, ValueNumber) \
         VALUES (5, 70, N'Capacitance', N'10uF', 0.00001);",
        "INSERT INTO dbo.Parts (PartId, PartNumber, PartTypeId, ProjectId, Quantity) \
         VALUES (70, N'CL10A106', 12, 41, 250);",
        "INSERT INTO dbo.PartTypes (PartTypeId, ParentPartTypeId, Name) \
         VALUES (12, 11, N'Ceramic');",
        "INSERT INTO dbo.PartTypes (PartTypeId, ParentPartTypeId, Name) \
         VALUES (11, NULL, N'Capacitor');",
        "INSERT INTO dbo.Projects (ProjectId, Name) VALUES (41, N'Rover');",
    ]
    .join("\r\n");

    let result = importer
        .import_sql(&[LoadedSource::new("backup.sql", script)], &user())
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
    assert_eq!(result.total_rows_imported, 11);
    for table in SupportedTable::ORDERED {
        assert!(result.imported(table) >= 1, "{} not imported", table);
    }

    let repo = importer.sink();
    let project = &repo.list_projects(&user()).await.unwrap()[0];
    let part_types = repo.list_part_types(&user()).await.unwrap();
    let capacitor = part_types.iter().find(|t| t.name == "Capacitor").unwrap();
    let ceramic = part_types.iter().find(|t| t.name == "Ceramic").unwrap();
    assert_eq!(ceramic.parent_part_type_id, Some(capacitor.part_type_id));

    let part = &repo.list_parts(&user()).await.unwrap()[0];
    assert_eq!(part.part_type_id, ceramic.part_type_id);
    assert_eq!(part.project_id, Some(project.project_id));
    assert_eq!(repo.list_part_parametrics(&user()).await.unwrap()[0].part_id, part.part_id);
    assert_eq!(repo.list_part_models(&user()).await.unwrap()[0].part_id, part.part_id);
    assert_eq!(repo.list_custom_field_values(&user()).await.unwrap()[0].record_id, part.part_id);

    let pcb = &repo.list_pcbs(&user()).await.unwrap()[0];
    let pcb_assignment = &repo.list_project_pcb_assignments(&user()).await.unwrap()[0];
    assert_eq!(pcb_assignment.project_id, project.project_id);
    assert_eq!(pcb_assignment.pcb_id, pcb.pcb_id);

    let part_assignment = &repo.list_project_part_assignments(&user()).await.unwrap()[0];
    assert_eq!(part_assignment.part_id, Some(part.part_id));
    assert_eq!(part_assignment.pcb_id, Some(pcb.pcb_id));
}
