// ==========================================
// 库存管理系统 - 临时主键映射表
// ==========================================
// 职责: 记录 源主键 → 新分配主键，供后续表解析外键
// 生命周期: 每次导入调用一个实例，不持久化
// 约束: 同一 (表, 键名, 源主键) 至多一条映射
// ==========================================

use crate::domain::types::SupportedTable;
use crate::importer::error::KeyMappingError;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyMapping {
    pub key_name: String,
    pub original_id: i64,
    pub remapped_id: i64,
    pub global_id: Option<String>,
}

/// 外键查找选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupOptions {
    /// 源主键 0 视为“无引用”
    pub treat_zero_as_null: bool,
    /// 未找到映射时返回错误（否则返回 None）
    pub error_if_missing: bool,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            treat_zero_as_null: true,
            error_if_missing: true,
        }
    }
}

impl LookupOptions {
    /// 可空外键: 找不到映射时视为无引用
    pub fn lenient(treat_zero_as_null: bool) -> Self {
        Self {
            treat_zero_as_null,
            error_if_missing: false,
        }
    }
}

// ==========================================
// TemporaryKeyTracker
// ==========================================
#[derive(Debug, Default)]
pub struct TemporaryKeyTracker {
    mappings: HashMap<SupportedTable, Vec<KeyMapping>>,
}

impl TemporaryKeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条主键映射
    ///
    /// # 返回
    /// - Err(Collision): 同一 (表, 键名, 源主键) 已存在映射
    pub fn add_key_mapping(
        &mut self,
        table: SupportedTable,
        key_name: &str,
        original_id: i64,
        remapped_id: i64,
        global_id: Option<String>,
    ) -> Result<(), KeyMappingError> {
        let entries = self.mappings.entry(table).or_default();
        if entries
            .iter()
            .any(|m| m.original_id == original_id && m.key_name.eq_ignore_ascii_case(key_name))
        {
            return Err(KeyMappingError::Collision {
                table,
                key_name: key_name.to_string(),
                original_id,
            });
        }

        entries.push(KeyMapping {
            key_name: key_name.to_string(),
            original_id,
            remapped_id,
            global_id,
        });
        Ok(())
    }

    /// 按源主键查找新主键
    ///
    /// # 返回
    /// - Ok(None): 源值为空（或为 0 且 treat_zero_as_null），或未找到且 !error_if_missing
    /// - Ok(Some(id)): 已映射的新主键
    /// - Err(Missing): 未找到且 error_if_missing
    pub fn get_mapped_id(
        &self,
        table: SupportedTable,
        key_name: &str,
        original_id: Option<i64>,
        options: LookupOptions,
    ) -> Result<Option<i64>, KeyMappingError> {
        let original_id = match original_id {
            None => return Ok(None),
            Some(0) if options.treat_zero_as_null => return Ok(None),
            Some(id) => id,
        };

        match self.find(table, key_name, original_id) {
            Some(mapping) => Ok(Some(mapping.remapped_id)),
            None => Self::missing(table, key_name, original_id, options),
        }
    }

    /// 先按源主键查找，找不到再按全局 ID 查找
    pub fn get_mapped_id_by_global_id(
        &self,
        table: SupportedTable,
        key_name: &str,
        original_id: Option<i64>,
        global_id: Option<&str>,
        options: LookupOptions,
    ) -> Result<Option<i64>, KeyMappingError> {
        let lenient = LookupOptions::lenient(options.treat_zero_as_null);
        let positional = self.get_mapped_id(table, key_name, original_id, lenient)?;
        if positional.is_some() {
            return Ok(positional);
        }

        let by_global = global_id.filter(|g| !g.trim().is_empty()).and_then(|global_id| {
            self.mappings_for(table).iter().find(|m| {
                m.key_name.eq_ignore_ascii_case(key_name)
                    && m.global_id
                        .as_deref()
                        .map(|g| g.eq_ignore_ascii_case(global_id))
                        .unwrap_or(false)
            })
        });

        match (by_global, original_id) {
            (Some(mapping), _) => Ok(Some(mapping.remapped_id)),
            (None, None) => Ok(None),
            (None, Some(0)) if options.treat_zero_as_null => Ok(None),
            (None, Some(id)) => Self::missing(table, key_name, id, options),
        }
    }

    /// 映射总数
    pub fn mapping_count(&self) -> usize {
        self.mappings.values().map(Vec::len).sum()
    }

    /// 指定表的全部映射（按记录顺序）
    pub fn mappings_for(&self, table: SupportedTable) -> &[KeyMapping] {
        self.mappings.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    fn find(&self, table: SupportedTable, key_name: &str, original_id: i64) -> Option<&KeyMapping> {
        self.mappings_for(table)
            .iter()
            .find(|m| m.original_id == original_id && m.key_name.eq_ignore_ascii_case(key_name))
    }

    fn missing(
        table: SupportedTable,
        key_name: &str,
        original_id: i64,
        options: LookupOptions,
    ) -> Result<Option<i64>, KeyMappingError> {
        if options.error_if_missing {
            Err(KeyMappingError::Missing {
                table,
                key_name: key_name.to_string(),
                original_id,
            })
        } else {
            Ok(None)
        }
    }
}
