// ==========================================
// 库存管理系统 - 电子表格数据源适配器
// ==========================================
// 格式: 每张支持表一个工作表（表名大小写不敏感）
// 第 0 行为表头；空行跳过；未知工作表记警告
// 工具: calamine（只读）
// ==========================================

use crate::config::ImportOptions;
use crate::domain::types::{SupportedTable, DATETIME_EXPORT_FORMAT};
use crate::importer::error::ImportOutcome;
use crate::importer::header::Header;
use crate::importer::source_adapter::{
    sort_blocks, LoadedSource, SourceAdapter, SourceFormat, SourceRow, TableRows,
};
use crate::importer::tokenizer::Cell;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{NaiveDate, TimeDelta};
use std::io::Cursor;
use tracing::debug;

pub struct ExcelDataImporter {
    permitted_schema: String,
}

impl ExcelDataImporter {
    pub fn new(options: &ImportOptions) -> Self {
        Self {
            permitted_schema: options.permitted_schema_prefix.clone(),
        }
    }

    fn read_workbook(
        &self,
        source: &LoadedSource,
        warnings: &mut Vec<String>,
    ) -> ImportOutcome<Vec<TableRows>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(source.content.clone()))?;
        let mut blocks = Vec::new();

        for sheet_name in workbook.sheet_names() {
            let table = SupportedTable::from_qualified_name(&sheet_name, &self.permitted_schema);
            let table = match table {
                Some(table) => table,
                None => {
                    warnings.push(format!(
                        "{}: worksheet '{}' does not name a supported table; skipped.",
                        source.file_name, sheet_name
                    ));
                    continue;
                }
            };

            let range = workbook.worksheet_range(&sheet_name)?;
            let mut sheet_rows = range.rows();

            // 空工作表没有表头，视为无数据
            let header_row = match sheet_rows.next() {
                Some(row) => row,
                None => continue,
            };
            let header = Header::from_names(header_row.iter().map(cell_text));

            let mut rows = Vec::new();
            for (idx, data_row) in sheet_rows.enumerate() {
                let cells: Vec<Cell> = data_row
                    .iter()
                    .map(|c| Cell {
                        text: cell_text(c),
                        quoted: false,
                    })
                    .collect();

                if cells.iter().all(|c| c.text.trim().is_empty()) {
                    continue;
                }

                rows.push(SourceRow {
                    number: idx + 1,
                    cells,
                });
            }

            debug!(file = %source.file_name, sheet = %sheet_name, rows = rows.len(), "工作表解析完成");

            blocks.push(TableRows {
                table,
                origin: format!("{}[{}]", source.file_name, sheet_name),
                header,
                rows,
            });
        }

        Ok(blocks)
    }
}

impl SourceAdapter for ExcelDataImporter {
    fn format(&self) -> SourceFormat {
        SourceFormat::Spreadsheet
    }

    fn parse_tables(
        &self,
        sources: &[LoadedSource],
        warnings: &mut Vec<String>,
    ) -> ImportOutcome<Vec<TableRows>> {
        let mut blocks = Vec::new();
        for source in sources {
            blocks.extend(self.read_workbook(source, warnings)?);
        }

        sort_blocks(&mut blocks);
        Ok(blocks)
    }
}

/// 单元格 → 文本
///
/// - 日期单元格转为 `%Y-%m-%d %H:%M:%S`
/// - 整数值浮点数不带小数部分（1.0 → "1"）
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DateTime(dt) => excel_serial_to_text(dt.as_f64()),
        Data::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}

/// Excel 日期序列号（1899-12-30 起的天数）→ 文本
///
/// 超出日期范围的序列号原样输出数值文本
fn excel_serial_to_text(serial: f64) -> String {
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;

    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|base| base.and_hms_opt(0, 0, 0))
        .and_then(|base| base.checked_add_signed(TimeDelta::try_days(days)?))
        .and_then(|dt| dt.checked_add_signed(TimeDelta::try_seconds(seconds)?))
        .map(|dt| dt.format(DATETIME_EXPORT_FORMAT).to_string())
        .unwrap_or_else(|| serial.to_string())
}
