// ==========================================
// 库存管理系统 - 导入结果报告
// ==========================================
// 用途: 导入接口返回值
// 说明: 导入过程中逐步累加，从不回滚（是报告，不是事务日志）
// ==========================================

use crate::domain::types::SupportedTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    pub total_rows_imported: usize,
    pub rows_imported: BTreeMap<SupportedTable, usize>, // 每张表已导入行数（全部预置为 0）
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Default for ImportResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportResult {
    pub fn new() -> Self {
        Self {
            success: false,
            total_rows_imported: 0,
            rows_imported: SupportedTable::ORDERED.iter().map(|t| (*t, 0)).collect(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// 记录一行成功写入
    pub fn record_imported(&mut self, table: SupportedTable) {
        *self.rows_imported.entry(table).or_insert(0) += 1;
        self.total_rows_imported += 1;
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// 指定表的已导入行数
    pub fn imported(&self, table: SupportedTable) -> usize {
        self.rows_imported.get(&table).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_seeds_every_table() {
        let result = ImportResult::new();
        assert_eq!(result.rows_imported.len(), SupportedTable::ORDERED.len());
        assert!(result.rows_imported.values().all(|c| *c == 0));
        assert!(!result.success);
    }

    #[test]
    fn test_record_imported_updates_totals() {
        let mut result = ImportResult::new();
        result.record_imported(SupportedTable::Parts);
        result.record_imported(SupportedTable::Parts);
        result.record_imported(SupportedTable::Projects);

        assert_eq!(result.imported(SupportedTable::Parts), 2);
        assert_eq!(result.imported(SupportedTable::Projects), 1);
        assert_eq!(result.total_rows_imported, 3);
    }

    #[test]
    fn test_serializes_table_names_as_keys() {
        let result = ImportResult::new();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["rows_imported"]["Projects"], 0);
    }
}
