// ==========================================
// 库存管理系统 - CSV 数据源适配器
// ==========================================
// 格式: 每张表一个文件，文件名（可带 schema 前缀）即表名
// 首行: '#' 开头的表头；其余为数据行
// 列数与表头不一致的行: 记警告并跳过
// ==========================================

use crate::config::ImportOptions;
use crate::domain::types::SupportedTable;
use crate::importer::error::{ImportError, ImportOutcome};
use crate::importer::header::Header;
use crate::importer::source_adapter::{
    sort_blocks, LoadedSource, SourceAdapter, SourceFormat, SourceRow, TableRows,
};
use crate::importer::tokenizer::{split_boundaries, split_fields, unquote};
use std::path::Path;
use tracing::debug;

const ROW_DELIMITERS: &[char] = &['\r', '\n'];

pub struct CsvDataImporter {
    header_marker: char,
    field_delimiters: Vec<char>,
    permitted_schema: String,
}

impl CsvDataImporter {
    pub fn new(options: &ImportOptions) -> Self {
        Self {
            header_marker: options.header_marker,
            field_delimiters: options.csv_field_delimiters.clone(),
            permitted_schema: options.permitted_schema_prefix.clone(),
        }
    }

    /// 由文件名确定目标表
    fn table_for(&self, file_name: &str) -> ImportOutcome<SupportedTable> {
        Path::new(file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| SupportedTable::from_qualified_name(stem, &self.permitted_schema))
            .ok_or_else(|| ImportError::UnsupportedFileName(file_name.to_string()))
    }

    fn read_file(
        &self,
        source: &LoadedSource,
        warnings: &mut Vec<String>,
    ) -> ImportOutcome<TableRows> {
        let table = self.table_for(&source.file_name)?;
        let origin = source.file_name.clone();
        let text = source.text();
        let lines = split_boundaries(&text, ROW_DELIMITERS, true);

        let header_line = lines
            .first()
            .ok_or_else(|| ImportError::MissingHeader { origin: origin.clone() })?;
        let header = Header::from_delimited_row(
            &origin,
            header_line,
            self.header_marker,
            &self.field_delimiters,
        )?;

        let mut rows = Vec::with_capacity(lines.len().saturating_sub(1));
        for (idx, line) in lines.iter().skip(1).enumerate() {
            let number = idx + 1;
            if line.trim().is_empty() {
                continue;
            }

            let fields = split_fields(line, &self.field_delimiters);
            if fields.len() != header.len() {
                warnings.push(format!(
                    "{}: row {} has {} fields but the header has {}; row skipped.",
                    origin,
                    number,
                    fields.len(),
                    header.len()
                ));
                continue;
            }

            rows.push(SourceRow {
                number,
                cells: fields.iter().map(|f| unquote(f)).collect(),
            });
        }

        debug!(file = %origin, table = %table, rows = rows.len(), "CSV 文件解析完成");

        Ok(TableRows {
            table,
            origin,
            header,
            rows,
        })
    }
}

impl SourceAdapter for CsvDataImporter {
    fn format(&self) -> SourceFormat {
        SourceFormat::Csv
    }

    fn parse_tables(
        &self,
        sources: &[LoadedSource],
        warnings: &mut Vec<String>,
    ) -> ImportOutcome<Vec<TableRows>> {
        let mut blocks = sources
            .iter()
            .map(|source| self.read_file(source, warnings))
            .collect::<ImportOutcome<Vec<_>>>()?;

        sort_blocks(&mut blocks);
        Ok(blocks)
    }
}
