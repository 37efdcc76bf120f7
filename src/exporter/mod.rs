// ==========================================
// 库存管理系统 - 数据导出层
// ==========================================
// 职责: 把全部库存表导出为导入端可直接读取的格式
// 格式: 每表一个 CSV 文件 / 单个 SQL INSERT 脚本
// 顺序: 按支持表顺序导出，每表按主键升序
// ==========================================

pub mod csv_exporter;
pub mod error;
pub mod sql_exporter;

pub use csv_exporter::CsvExporter;
pub use error::{ExportError, ExportResult};
pub use sql_exporter::SqlExporter;

use crate::domain::inventory::TableRecord;
use crate::domain::schema::table_fields;
use crate::domain::types::{FieldValue, SupportedTable, UserContext};
use crate::repository::RecordSource;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 导出产物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub content: String,
}

/// 单表快照（值按字段清单顺序）
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    pub table: SupportedTable,
    pub rows: Vec<Vec<FieldValue>>,
}

impl TableSnapshot {
    fn of<T: TableRecord>(records: Vec<T>) -> Self {
        Self {
            table: T::TABLE,
            rows: records.iter().map(T::field_values).collect(),
        }
    }

    /// 列名（字段清单顺序）
    pub fn column_names(&self) -> Vec<&'static str> {
        table_fields(self.table).iter().map(|f| f.name).collect()
    }
}

/// 按支持表顺序读取全部记录
pub async fn snapshot(
    source: &dyn RecordSource,
    user: &UserContext,
) -> ExportResult<Vec<TableSnapshot>> {
    let snapshots = vec![
        TableSnapshot::of(source.list_projects(user).await?),
        TableSnapshot::of(source.list_part_types(user).await?),
        TableSnapshot::of(source.list_parts(user).await?),
        TableSnapshot::of(source.list_part_parametrics(user).await?),
        TableSnapshot::of(source.list_part_models(user).await?),
        TableSnapshot::of(source.list_custom_fields(user).await?),
        TableSnapshot::of(source.list_custom_field_values(user).await?),
        TableSnapshot::of(source.list_pcbs(user).await?),
        TableSnapshot::of(source.list_project_pcb_assignments(user).await?),
        TableSnapshot::of(source.list_project_part_assignments(user).await?),
    ];

    for s in &snapshots {
        debug!(table = %s.table, rows = s.rows.len(), "读取导出数据");
    }
    Ok(snapshots)
}

/// 把导出产物写入目录（目录不存在时创建）
///
/// # 返回
/// - 写入的文件路径列表
pub async fn write_to_dir(dir: &Path, files: &[ExportedFile]) -> ExportResult<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir).await?;

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(&file.file_name);
        tokio::fs::write(&path, file.content.as_bytes()).await?;
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), "导出文件已写入");
    Ok(written)
}
