// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、导入器构造、源文件构造
// ==========================================

#![allow(dead_code)]

use inventory_import::{
    DataImporter, ImportOptions, LoadedSource, SqliteInventoryRepository, UserContext,
};
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().ok_or("非 UTF-8 路径")?.to_string();

    // 仓储创建时建表
    SqliteInventoryRepository::new(&db_path)?;

    Ok((temp_file, db_path))
}

/// 基于文件数据库的导入器（默认选项）
pub fn create_test_importer(db_path: &str) -> DataImporter<SqliteInventoryRepository> {
    let repo = SqliteInventoryRepository::new(db_path).expect("Failed to open repository");
    DataImporter::new(repo, ImportOptions::default())
}

/// 基于内存数据库的导入器
pub fn create_memory_importer() -> DataImporter<SqliteInventoryRepository> {
    let repo = SqliteInventoryRepository::in_memory().expect("Failed to open in-memory repository");
    DataImporter::new(repo, ImportOptions::default())
}

/// 构造 CSV 源文件
pub fn csv_source(file_name: &str, lines: &[&str]) -> LoadedSource {
    LoadedSource::new(file_name, lines.join("\r\n"))
}

pub fn user() -> UserContext {
    UserContext::default()
}

/// 完整外键链的一组 CSV 文件（源主键刻意偏离 1 起始）
pub fn full_chain_sources() -> Vec<LoadedSource> {
    vec![
        csv_source(
            "Projects.csv",
            &[
                "#ProjectId,Name,Description,Color,DateCreatedUtc",
                "41,\"Rover\",\"Mars rover\",\"3\",\"2024-02-01 08:00:00\"",
            ],
        ),
        csv_source(
            "PartTypes.csv",
            &[
                "#PartTypeId,ParentPartTypeId,Name,Keywords",
                "12,11,\"Ceramic\",\"mlcc smd\"",
                "11,,\"Capacitor\",",
            ],
        ),
        csv_source(
            "Parts.csv",
            &[
                "#PartId,PartNumber,PartTypeId,ProjectId,Quantity,Cost,GlobalId",
                concat!(
                    "70,\"CL10A106\",\"12\",\"41\",\"250\",\"0.015\",",
                    "\"0c6f2f7e-9d0e-4d3e-8d6a-3f1d4b1f2a10\""
                ),
                "71,\"GRM188\",\"12\",\"0\",\"100\",\"0.02\",",
            ],
        ),
        csv_source(
            "PartParametrics.csv",
            &[
                "#PartParametricId,PartId,Name,Value,ValueNumber,Units",
                "5,\"70\",\"Capacitance\",\"10uF\",\"0.00001\",\"F\"",
            ],
        ),
        csv_source(
            "PartModels.csv",
            &["#PartModelId,PartId,Name,Filename", "3,\"71\",\"0603\",\"0603.step\""],
        ),
        csv_source(
            "CustomFields.csv",
            &[
                "#CustomFieldId,CustomFieldTypeId,Name,IsRequired",
                "8,\"1\",\"Supplier Code\",\"true\"",
                "9,\"2\",\"Budget Owner\",\"false\"",
            ],
        ),
        csv_source(
            "CustomFieldValues.csv",
            &[
                "#CustomFieldValueId,CustomFieldId,CustomFieldTypeId,RecordId,Value",
                "1,\"8\",\"1\",\"71\",\"SC-01\"",
                "2,\"9\",\"2\",\"41\",\"Alice\"",
            ],
        ),
        csv_source(
            "Pcbs.csv",
            &["#PcbId,Name,Quantity,Cost", "30,\"Power Board\",\"2\",\"12.50\""],
        ),
        csv_source(
            "ProjectPcbAssignments.csv",
            &["#ProjectPcbAssignmentId,ProjectId,PcbId", "1,\"41\",\"30\""],
        ),
        csv_source(
            "ProjectPartAssignments.csv",
            &[
                "#ProjectPartAssignmentId,ProjectId,PartId,PcbId,Quantity,ReferenceId",
                "1,\"41\",\"70\",\"30\",\"4\",\"C1 C2 C3 C4\"",
                "2,\"41\",\"0\",\"0\",\"1\",\"J1\"",
            ],
        ),
    ]
}
