// ==========================================
// 库存管理系统 - 数据源适配器接口
// ==========================================
// 职责: 定义格式适配器接口与统一的中间结构（不包含实现）
// 实现者: CsvDataImporter / ExcelDataImporter / SqlDataImporter
// 红线: 适配器只做解析，不写库、不解析外键
// ==========================================

use crate::domain::import_result::ImportResult;
use crate::domain::types::SupportedTable;
use crate::importer::error::ImportOutcome;
use crate::importer::header::Header;
use crate::importer::tokenizer::Cell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ==========================================
// 源文件格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
    Sql,
}

impl SourceFormat {
    /// 批量导入时各格式组的处理顺序
    pub const BATCH_ORDER: [SourceFormat; 3] =
        [SourceFormat::Csv, SourceFormat::Spreadsheet, SourceFormat::Sql];

    /// 按扩展名判定格式（大小写不敏感）
    pub fn from_file_name(file_name: &str) -> Option<SourceFormat> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Some(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xls" => Some(SourceFormat::Spreadsheet),
            "sql" => Some(SourceFormat::Sql),
            _ => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Spreadsheet => "spreadsheet",
            SourceFormat::Sql => "sql",
        };
        write!(f, "{}", name)
    }
}

/// 已读入内存的源文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSource {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl LoadedSource {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// 内容按 UTF-8 解码（非法字节替换），去掉 BOM
    pub fn text(&self) -> String {
        let text = String::from_utf8_lossy(&self.content);
        text.trim_start_matches('\u{feff}').to_string()
    }
}

/// 源数据行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    /// 行号: CSV/工作表为数据行序号，SQL 为语句序号（从 1 开始）
    pub number: usize,
    pub cells: Vec<Cell>,
}

/// 同一张表的一组源数据行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRows {
    pub table: SupportedTable,
    /// 来源描述（文件名 / 工作表名）
    pub origin: String,
    pub header: Header,
    pub rows: Vec<SourceRow>,
}

// ==========================================
// SourceAdapter Trait
// ==========================================
pub trait SourceAdapter: Send + Sync {
    fn format(&self) -> SourceFormat;

    /// 解析源文件为按导入顺序排列的表数据块
    ///
    /// # 参数
    /// - sources: 本格式的全部源文件
    /// - warnings: 解析阶段的行警告
    ///
    /// # 返回
    /// - Ok(Vec<TableRows>): 已按支持表顺序排列
    /// - Err: 致命错误（中止本次导入，不写入任何行）
    fn parse_tables(
        &self,
        sources: &[LoadedSource],
        warnings: &mut Vec<String>,
    ) -> ImportOutcome<Vec<TableRows>>;

    /// 解析全部源文件，成功后把解析警告写入报告
    ///
    /// 致命错误时报告保持不变
    fn read_tables(
        &self,
        sources: &[LoadedSource],
        report: &mut ImportResult,
    ) -> ImportOutcome<Vec<TableRows>> {
        let mut warnings = Vec::new();
        let blocks = self.parse_tables(sources, &mut warnings)?;
        for warning in warnings {
            report.add_warning(warning);
        }
        Ok(blocks)
    }
}

/// 按表顺序稳定排序（同表块保持源顺序）
pub fn sort_blocks(blocks: &mut [TableRows]) {
    blocks.sort_by_key(|block| block.table.position());
}
