// ==========================================
// 库存管理系统 - SQL 导出器
// ==========================================
// 格式: 单个脚本，每条记录一行
//   INSERT INTO dbo.{表} (列, ...) VALUES (值, ...);
// 文本/日期用单引号（内部单引号加倍），空值写 NULL
// ==========================================

use crate::config::ImportOptions;
use crate::domain::types::{FieldValue, UserContext};
use crate::exporter::error::ExportResult;
use crate::exporter::{snapshot, ExportedFile, TableSnapshot};
use crate::importer::tokenizer::encode_escapes;
use crate::repository::RecordSource;
use tracing::info;

/// 默认导出文件名
pub const SQL_EXPORT_FILE_NAME: &str = "inventory_export.sql";

pub struct SqlExporter {
    schema: String,
}

impl Default for SqlExporter {
    fn default() -> Self {
        Self::new(&ImportOptions::default())
    }
}

impl SqlExporter {
    pub fn new(options: &ImportOptions) -> Self {
        Self {
            schema: options.permitted_schema_prefix.clone(),
        }
    }

    /// 导出全部表为一个 SQL 脚本
    pub async fn export(
        &self,
        source: &dyn RecordSource,
        user: &UserContext,
    ) -> ExportResult<ExportedFile> {
        let snapshots = snapshot(source, user).await?;

        let mut content = String::new();
        let mut statements = 0usize;
        for table in &snapshots {
            statements += table.rows.len();
            content.push_str(&self.render_table(table));
        }

        info!(statements, "SQL 导出完成");
        Ok(ExportedFile {
            file_name: SQL_EXPORT_FILE_NAME.to_string(),
            content,
        })
    }

    /// 渲染单表的 INSERT 语句
    pub fn render_table(&self, table: &TableSnapshot) -> String {
        let columns = table.column_names().join(", ");
        let mut out = String::new();

        for row in &table.rows {
            let values: Vec<String> = row.iter().map(render_literal).collect();
            out.push_str(&format!(
                "INSERT INTO {}.{} ({}) VALUES ({});\r\n",
                self.schema,
                table.table,
                columns,
                values.join(", ")
            ));
        }

        out
    }
}

/// 字段值 → SQL 字面量
fn render_literal(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => "NULL".to_string(),
        FieldValue::Int64(v) => v.to_string(),
        FieldValue::Int32(v) => v.to_string(),
        FieldValue::Double(v) => v.to_string(),
        FieldValue::Decimal(v) => v.to_string(),
        FieldValue::Bool(v) => (if *v { "1" } else { "0" }).to_string(),
        other => format!("'{}'", encode_escapes(&other.to_string()).replace('\'', "''")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::SupportedTable;
    use rust_decimal::Decimal;

    #[test]
    fn test_render_pcb_statement() {
        let table = TableSnapshot {
            table: SupportedTable::Pcbs,
            rows: vec![vec![
                FieldValue::Int64(4),
                FieldValue::Text("Rev 'B'; main".to_string()),
                FieldValue::Null,
                FieldValue::Int32(2),
                FieldValue::Decimal(Decimal::new(1250, 2)),
                FieldValue::Null,
                FieldValue::Null,
                FieldValue::Null,
            ]],
        };

        let sql = SqlExporter::default().render_table(&table);
        assert_eq!(
            sql,
            "INSERT INTO dbo.Pcbs (PcbId, Name, Description, Quantity, Cost, \
             SerialNumberFormat, LastSerialNumber, DateCreatedUtc) \
             VALUES (4, 'Rev ''B''; main', NULL, 2, 12.50, NULL, NULL, NULL);\r\n"
        );
    }

    #[test]
    fn test_render_literal_escapes_line_breaks() {
        assert_eq!(
            render_literal(&FieldValue::Text("a\r\nb".to_string())),
            "'a\\r\\nb'"
        );
        assert_eq!(render_literal(&FieldValue::Bool(false)), "0");
    }
}
