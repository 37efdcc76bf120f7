// ==========================================
// 库存管理系统 - 导入会话
// ==========================================
// 职责: 一次导入调用内的主键映射表与导入报告
// 流程: 按表顺序 → 逐行映射 → (PartTypes 父节点优先) → 构建写入
// 约束: 单行失败只记入报告，不中止整个导入
// ==========================================

use crate::config::ImportOptions;
use crate::domain::import_result::ImportResult;
use crate::domain::schema::identity_field;
use crate::domain::types::{SupportedTable, UserContext};
use crate::importer::error::ImportError;
use crate::importer::field_mapper::{map_row, FieldMap};
use crate::importer::key_tracker::TemporaryKeyTracker;
use crate::importer::record_builder::{RecordBuilder, RowOutcome};
use crate::importer::source_adapter::{SourceRow, TableRows};
use crate::repository::RecordSink;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// 行定位信息（用于警告/错误文本）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLabel {
    pub table: SupportedTable,
    pub number: usize,
    pub key_name: &'static str,
    pub original_id: String,
}

impl RowLabel {
    fn for_row(block: &TableRows, row: &SourceRow) -> Self {
        let key_name = identity_field(block.table);
        let original_id = block
            .header
            .get_header_index(key_name)
            .and_then(|idx| row.cells.get(idx))
            .map(|cell| cell.text.trim().to_string())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| "n/a".to_string());

        Self {
            table: block.table,
            number: row.number,
            key_name,
            original_id,
        }
    }
}

impl fmt::Display for RowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} row {} ({}={})",
            self.table, self.number, self.key_name, self.original_id
        )
    }
}

/// 已完成字段映射、等待写入的行
#[derive(Debug, Clone)]
struct PreparedRow {
    label: RowLabel,
    fields: FieldMap,
}

// ==========================================
// ImportSession
// ==========================================
pub struct ImportSession<'a> {
    builder: RecordBuilder<'a>,
    options: &'a ImportOptions,
    tracker: TemporaryKeyTracker,
    result: ImportResult,
}

impl<'a> ImportSession<'a> {
    pub fn new(
        sink: &'a dyn RecordSink,
        user: &'a UserContext,
        options: &'a ImportOptions,
    ) -> Self {
        Self {
            builder: RecordBuilder::new(sink, user, options),
            options,
            tracker: TemporaryKeyTracker::new(),
            result: ImportResult::new(),
        }
    }

    /// 导入报告（适配器解析阶段写入警告）
    pub fn report_mut(&mut self) -> &mut ImportResult {
        &mut self.result
    }

    /// 标记至少一个格式组完整处理
    pub fn mark_completed(&mut self) {
        self.result.success = true;
    }

    /// 结束会话，返回报告（映射表随之丢弃）
    pub fn finish(self) -> ImportResult {
        debug!(mappings = self.tracker.mapping_count(), "导入会话结束");
        self.result
    }

    /// 导入全部数据块（按支持表顺序）
    ///
    /// # 参数
    /// - blocks: 适配器产出的数据块
    #[instrument(skip_all, fields(blocks = blocks.len()))]
    pub async fn import_blocks(&mut self, blocks: Vec<TableRows>) {
        for table in SupportedTable::ORDERED {
            let table_blocks: Vec<&TableRows> =
                blocks.iter().filter(|b| b.table == table).collect();
            if table_blocks.is_empty() {
                continue;
            }

            let mut prepared = self.prepare_rows(&table_blocks);
            if table == SupportedTable::PartTypes {
                prepared = order_parent_first(prepared, self.options.treat_zero_as_null);
            }

            let before = self.result.imported(table);
            for row in prepared {
                self.build_row(table, row).await;
            }

            info!(
                table = %table,
                imported = self.result.imported(table) - before,
                "数据表导入完成"
            );
        }
    }

    /// 阶段 1: 字段映射（映射失败的行直接记错误）
    fn prepare_rows(&mut self, blocks: &[&TableRows]) -> Vec<PreparedRow> {
        let mut prepared = Vec::new();

        for block in blocks {
            for row in &block.rows {
                let label = RowLabel::for_row(block, row);
                match map_row(block.table, &block.header, &row.cells) {
                    Ok(mapped) => {
                        for warning in mapped.warnings {
                            self.result.add_warning(format!("{}: {}", label, warning));
                        }
                        prepared.push(PreparedRow {
                            label,
                            fields: mapped.fields,
                        });
                    }
                    Err(err) => self.row_error(&label, &err),
                }
            }
        }

        prepared
    }

    /// 阶段 2: 构建并写入单行
    async fn build_row(&mut self, table: SupportedTable, row: PreparedRow) {
        match self.builder.build(table, &row.fields, &mut self.tracker).await {
            Ok(RowOutcome::Inserted { .. }) => self.result.record_imported(table),
            Ok(RowOutcome::Duplicate { warning, .. }) => {
                debug!(row = %row.label, "自然键重复，跳过");
                self.result.add_warning(warning);
            }
            Err(err) => self.row_error(&row.label, &err),
        }
    }

    fn row_error(&mut self, label: &RowLabel, err: &ImportError) {
        warn!(row = %label, error = %err, "行导入失败");
        self.result.add_error(format!("{}: {}", label, err));
    }
}

/// PartTypes 自引用: 父节点先于子节点写入
///
/// 父节点不在本次数据中的行视为就绪；存在环时剩余行按源顺序追加
/// （其外键在构建时报错）。
fn order_parent_first(rows: Vec<PreparedRow>, treat_zero_as_null: bool) -> Vec<PreparedRow> {
    let own_id = |row: &PreparedRow| row.fields.int64("PartTypeId");
    let parent_id = |row: &PreparedRow| {
        row.fields
            .int64("ParentPartTypeId")
            .filter(|id| !(treat_zero_as_null && *id == 0))
    };

    let mut pending: HashSet<i64> = rows.iter().filter_map(own_id).collect();
    let mut remaining = rows;
    let mut ordered = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let (ready, blocked): (Vec<PreparedRow>, Vec<PreparedRow>) =
            remaining.into_iter().partition(|row| match parent_id(row) {
                None => true,
                Some(parent) => Some(parent) == own_id(row) || !pending.contains(&parent),
            });

        if ready.is_empty() {
            ordered.extend(blocked);
            break;
        }

        for row in &ready {
            if let Some(id) = own_id(row) {
                pending.remove(&id);
            }
        }
        ordered.extend(ready);
        remaining = blocked;
    }

    ordered
}
