// ==========================================
// 库存管理系统 - CSV 导出器
// ==========================================
// 格式: 每表一个 {表名}.csv
// - 首行 '#' 标记的表头
// - 非空值一律加双引号（内部双引号加倍），空值留空
// - 换行/制表符写为 \r \n \t 字面量
// ==========================================

use crate::config::ImportOptions;
use crate::domain::types::{FieldValue, UserContext};
use crate::exporter::error::{ExportError, ExportResult};
use crate::exporter::{snapshot, ExportedFile, TableSnapshot};
use crate::importer::tokenizer::encode_escapes;
use crate::repository::RecordSource;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::info;

pub struct CsvExporter {
    header_marker: char,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new(&ImportOptions::default())
    }
}

impl CsvExporter {
    pub fn new(options: &ImportOptions) -> Self {
        Self {
            header_marker: options.header_marker,
        }
    }

    /// 导出全部表
    pub async fn export(
        &self,
        source: &dyn RecordSource,
        user: &UserContext,
    ) -> ExportResult<Vec<ExportedFile>> {
        let snapshots = snapshot(source, user).await?;
        let files = snapshots
            .iter()
            .map(|s| self.render_table(s))
            .collect::<ExportResult<Vec<_>>>()?;

        info!(files = files.len(), "CSV 导出完成");
        Ok(files)
    }

    /// 渲染单表
    pub fn render_table(&self, table: &TableSnapshot) -> ExportResult<ExportedFile> {
        // 引号由本模块控制，csv writer 只负责分隔与行结束
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::CRLF)
            .flexible(false)
            .from_writer(Vec::new());

        let mut header: Vec<String> = table.column_names().iter().map(|n| n.to_string()).collect();
        if let Some(first) = header.first_mut() {
            first.insert(0, self.header_marker);
        }
        writer.write_record(&header)?;

        for row in &table.rows {
            writer.write_record(row.iter().map(render_cell))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))?;

        Ok(ExportedFile {
            file_name: format!("{}.csv", table.table),
            content: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// 单元格渲染: Null → 空；其余 → 加引号的文本
fn render_cell(value: &FieldValue) -> String {
    if value.is_null() {
        return String::new();
    }
    let text = encode_escapes(&value.to_string());
    format!("\"{}\"", text.replace('"', "\"\""))
}
