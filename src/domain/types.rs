// ==========================================
// 库存管理系统 - 领域类型定义
// ==========================================
// 职责: 支持的数据表、字段类型、字段值（带类型标签）
// 红线: 表顺序即外键拓扑顺序，不得随意调整
// ==========================================

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 支持导入的数据表 (Supported Table)
// ==========================================
// 声明顺序 = 导入顺序: 任一表只引用排在它前面的表
// 派生 Ord 依赖声明顺序，BTreeMap 遍历即为导入顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SupportedTable {
    Projects,
    PartTypes,
    Parts,
    PartParametrics,
    PartModels,
    CustomFields,
    CustomFieldValues,
    Pcbs,
    ProjectPcbAssignments,
    ProjectPartAssignments,
}

impl SupportedTable {
    /// 固定导入顺序
    pub const ORDERED: [SupportedTable; 10] = [
        SupportedTable::Projects,
        SupportedTable::PartTypes,
        SupportedTable::Parts,
        SupportedTable::PartParametrics,
        SupportedTable::PartModels,
        SupportedTable::CustomFields,
        SupportedTable::CustomFieldValues,
        SupportedTable::Pcbs,
        SupportedTable::ProjectPcbAssignments,
        SupportedTable::ProjectPartAssignments,
    ];

    /// 表名（与导出文件名 / SQL 表名一致）
    pub fn name(&self) -> &'static str {
        match self {
            SupportedTable::Projects => "Projects",
            SupportedTable::PartTypes => "PartTypes",
            SupportedTable::Parts => "Parts",
            SupportedTable::PartParametrics => "PartParametrics",
            SupportedTable::PartModels => "PartModels",
            SupportedTable::CustomFields => "CustomFields",
            SupportedTable::CustomFieldValues => "CustomFieldValues",
            SupportedTable::Pcbs => "Pcbs",
            SupportedTable::ProjectPcbAssignments => "ProjectPcbAssignments",
            SupportedTable::ProjectPartAssignments => "ProjectPartAssignments",
        }
    }

    /// 在导入顺序中的位置
    pub fn position(&self) -> usize {
        *self as usize
    }

    /// 按表名查找（大小写不敏感，不处理 schema 前缀）
    pub fn from_name(name: &str) -> Option<SupportedTable> {
        Self::ORDERED
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
    }

    /// 按可能带 schema 前缀的表名查找
    ///
    /// # 规则
    /// - 去掉方括号 / 反引号 / 双引号
    /// - `schema.Table` 仅当 schema 与 permitted_schema 相同（大小写不敏感）时接受
    pub fn from_qualified_name(name: &str, permitted_schema: &str) -> Option<SupportedTable> {
        let cleaned: String = name
            .trim()
            .chars()
            .filter(|c| !matches!(c, '[' | ']' | '`' | '"'))
            .collect();

        match cleaned.rsplit_once('.') {
            Some((schema, table)) => {
                if schema.eq_ignore_ascii_case(permitted_schema) {
                    Self::from_name(table)
                } else {
                    None
                }
            }
            None => Self::from_name(&cleaned),
        }
    }
}

impl fmt::Display for SupportedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ==========================================
// 字段语义类型 (Field Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Int64,
    Int32,
    Bool,
    Double,
    Decimal,
    DateTime,
    StringSet,
}

impl FieldType {
    /// 类型默认值（值类型取零值，文本/集合取 Null）
    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldType::Text => FieldValue::Null,
            FieldType::Int64 => FieldValue::Int64(0),
            FieldType::Int32 => FieldValue::Int32(0),
            FieldType::Bool => FieldValue::Bool(false),
            FieldType::Double => FieldValue::Double(0.0),
            FieldType::Decimal => FieldValue::Decimal(Decimal::ZERO),
            FieldType::DateTime => FieldValue::Null,
            FieldType::StringSet => FieldValue::StringSet(Vec::new()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "string",
            FieldType::Int64 => "int64",
            FieldType::Int32 => "int32",
            FieldType::Bool => "boolean",
            FieldType::Double => "double",
            FieldType::Decimal => "decimal",
            FieldType::DateTime => "datetime",
            FieldType::StringSet => "string set",
        };
        write!(f, "{}", name)
    }
}

// ==========================================
// 字段值 (Field Value)
// ==========================================
// 每个单元格在映射阶段即完成类型转换，带类型标签传给记录构建器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Text(String),
    Int64(i64),
    Int32(i32),
    Bool(bool),
    Double(f64),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
    StringSet(Vec<String>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

/// 导出时日期时间的统一格式（秒的小数部分为零时不输出）
pub const DATETIME_EXPORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Text(v) => write!(f, "{}", v),
            FieldValue::Int64(v) => write!(f, "{}", v),
            FieldValue::Int32(v) => write!(f, "{}", v),
            FieldValue::Bool(v) => write!(f, "{}", v),
            FieldValue::Double(v) => write!(f, "{}", v),
            FieldValue::Decimal(v) => write!(f, "{}", v),
            FieldValue::DateTime(v) => write!(f, "{}", v.format(DATETIME_EXPORT_FORMAT)),
            FieldValue::StringSet(v) => write!(f, "{}", v.join(",")),
        }
    }
}

// ==========================================
// 自定义字段归属类型 (Custom Field Type)
// ==========================================
// RecordId 指向的表由该类型决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomFieldType {
    Inventory = 1,
    Project = 2,
    PartType = 3,
}

impl CustomFieldType {
    pub fn from_id(id: i32) -> Option<CustomFieldType> {
        match id {
            1 => Some(CustomFieldType::Inventory),
            2 => Some(CustomFieldType::Project),
            3 => Some(CustomFieldType::PartType),
            _ => None,
        }
    }

    /// RecordId 引用的表及其主键名
    pub fn record_table(&self) -> (SupportedTable, &'static str) {
        match self {
            CustomFieldType::Inventory => (SupportedTable::Parts, "PartId"),
            CustomFieldType::Project => (SupportedTable::Projects, "ProjectId"),
            CustomFieldType::PartType => (SupportedTable::PartTypes, "PartTypeId"),
        }
    }
}

// ==========================================
// 用户上下文 (User Context)
// ==========================================
// 原样透传给记录写入端，导入引擎本身不做鉴权
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: Option<i64>,
    pub organization_id: Option<i64>,
}
