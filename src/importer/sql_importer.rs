// ==========================================
// 库存管理系统 - SQL INSERT 数据源适配器
// ==========================================
// 格式: 每行 / 每个分号一条语句，只处理 INSERT INTO <表> (<列>) VALUES (<值>)
// 流程:
// 1. 切分语句，跳过注释与非 INSERT 语句（记警告）
// 2. 校验全部表名（任一不支持 → 整体中止，不写入任何行）
// 3. 按支持表顺序稳定重排
// 4. 相邻同表同列语句合并为一个数据块
// ==========================================

use crate::config::ImportOptions;
use crate::domain::types::SupportedTable;
use crate::importer::error::{ImportError, ImportOutcome};
use crate::importer::header::Header;
use crate::importer::source_adapter::{
    LoadedSource, SourceAdapter, SourceFormat, SourceRow, TableRows,
};
use crate::importer::tokenizer::{
    find_balanced_group, split_boundaries, split_fields, unquote, Cell,
};
use tracing::debug;

const STATEMENT_DELIMITERS: &[char] = &['\r', '\n', ';'];
const LIST_DELIMITERS: &[char] = &[','];

/// 单条已解析的 INSERT 语句
#[derive(Debug)]
struct InsertStatement {
    number: usize,
    table: SupportedTable,
    header: Header,
    values: Vec<Cell>,
}

pub struct SqlDataImporter {
    permitted_schema: String,
}

impl SqlDataImporter {
    pub fn new(options: &ImportOptions) -> Self {
        Self {
            permitted_schema: options.permitted_schema_prefix.clone(),
        }
    }

    /// 解析一个 SQL 文件中的全部语句
    fn read_statements(
        &self,
        source: &LoadedSource,
        warnings: &mut Vec<String>,
    ) -> ImportOutcome<Vec<InsertStatement>> {
        let text = source.text();
        let mut statements = Vec::new();

        for (idx, raw) in split_boundaries(&text, STATEMENT_DELIMITERS, true).iter().enumerate() {
            let number = idx + 1;
            let statement = raw.trim();
            if statement.is_empty() {
                continue;
            }

            if statement.starts_with("--") {
                warnings.push(format!(
                    "{}: statement {} is a comment; skipped.",
                    source.file_name, number
                ));
                continue;
            }

            let is_insert = statement
                .split_whitespace()
                .next()
                .map(|keyword| keyword.eq_ignore_ascii_case("INSERT"))
                .unwrap_or(false);
            if !is_insert {
                warnings.push(format!(
                    "{}: statement {} is not an INSERT statement; skipped.",
                    source.file_name, number
                ));
                continue;
            }

            let parsed = self.parse_insert(&source.file_name, number, statement, warnings)?;
            if let Some(parsed) = parsed {
                statements.push(parsed);
            }
        }

        Ok(statements)
    }

    /// 解析 INSERT 语句
    ///
    /// # 返回
    /// - Ok(Some): 解析成功
    /// - Ok(None): 列数与值数不一致（已记入 warnings）
    /// - Err: 表名不支持 / 括号组缺失或不平衡（致命）
    fn parse_insert(
        &self,
        file_name: &str,
        number: usize,
        statement: &str,
        warnings: &mut Vec<String>,
    ) -> ImportOutcome<Option<InsertStatement>> {
        let table = self.table_name(number, statement)?;

        let (column_open, column_close) =
            find_balanced_group(statement, 0).ok_or_else(|| ImportError::MalformedStatement {
                statement: number,
                message: "missing or unbalanced column list".to_string(),
            })?;

        let after_columns = column_close + 1;
        let values_at = statement[after_columns..]
            .to_ascii_uppercase()
            .find("VALUES")
            .map(|pos| after_columns + pos + "VALUES".len())
            .ok_or_else(|| ImportError::MalformedStatement {
                statement: number,
                message: "missing VALUES clause".to_string(),
            })?;

        let (value_open, value_close) = find_balanced_group(statement, values_at)
            .ok_or_else(|| ImportError::MalformedStatement {
                statement: number,
                message: "missing or unbalanced value list".to_string(),
            })?;

        let header = Header::from_names(split_fields(
            &statement[column_open + 1..column_close],
            LIST_DELIMITERS,
        ));
        let value_list = &statement[value_open + 1..value_close];
        let values: Vec<Cell> = split_fields(value_list, LIST_DELIMITERS)
            .iter()
            .map(|v| unquote(v))
            .collect();

        if values.len() != header.len() {
            warnings.push(format!(
                "{}: statement {} has {} values but {} columns; statement skipped.",
                file_name,
                number,
                values.len(),
                header.len()
            ));
            return Ok(None);
        }

        Ok(Some(InsertStatement {
            number,
            table,
            header,
            values,
        }))
    }

    /// 提取并校验表名（INSERT INTO 之后的标识符，截断到左括号）
    fn table_name(&self, number: usize, statement: &str) -> ImportOutcome<SupportedTable> {
        let tokens: Vec<&str> = statement.split_whitespace().collect();
        let raw = match tokens.get(1) {
            Some(t) if t.eq_ignore_ascii_case("INTO") => tokens.get(2),
            other => other,
        }
        .map(|t| t.split('(').next().unwrap_or(""))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ImportError::MalformedStatement {
            statement: number,
            message: "missing table name".to_string(),
        })?;

        SupportedTable::from_qualified_name(raw, &self.permitted_schema).ok_or_else(|| {
            ImportError::UnsupportedTable {
                statement: number,
                table: raw.to_string(),
            }
        })
    }
}

impl SourceAdapter for SqlDataImporter {
    fn format(&self) -> SourceFormat {
        SourceFormat::Sql
    }

    fn parse_tables(
        &self,
        sources: &[LoadedSource],
        warnings: &mut Vec<String>,
    ) -> ImportOutcome<Vec<TableRows>> {
        let mut statements: Vec<(String, InsertStatement)> = Vec::new();
        for source in sources {
            for statement in self.read_statements(source, warnings)? {
                statements.push((source.file_name.clone(), statement));
            }
        }

        // 稳定排序: 同表语句保持源顺序
        statements.sort_by_key(|(_, s)| s.table.position());

        let mut blocks: Vec<TableRows> = Vec::new();
        for (origin, statement) in statements {
            let row = SourceRow {
                number: statement.number,
                cells: statement.values,
            };

            match blocks.last_mut() {
                Some(block)
                    if block.table == statement.table
                        && block.origin == origin
                        && block.header == statement.header =>
                {
                    block.rows.push(row);
                }
                _ => blocks.push(TableRows {
                    table: statement.table,
                    origin,
                    header: statement.header,
                    rows: vec![row],
                }),
            }
        }

        debug!(blocks = blocks.len(), "SQL 语句解析完成");
        Ok(blocks)
    }
}
