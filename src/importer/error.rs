// ==========================================
// 库存管理系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分级: 致命错误（中止整个文件/格式组）与行级错误（记入报告后继续）
// ==========================================

use crate::domain::types::{FieldType, SupportedTable};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 临时主键映射错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyMappingError {
    #[error(
        "key mapping collision: {table}.{key_name} original id {original_id} is already mapped"
    )]
    Collision {
        table: SupportedTable,
        key_name: String,
        original_id: i64,
    },

    #[error("no key mapping recorded for {table}.{key_name} original id {original_id}")]
    Missing {
        table: SupportedTable,
        key_name: String,
        original_id: i64,
    },
}

/// 单元格类型转换错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("value '{value}' for field '{field}' is not a valid {field_type}")]
pub struct CoercionError {
    pub field: String,
    pub field_type: FieldType,
    pub value: String,
}

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误（致命）=====
    #[error("failed to read file: {0}")]
    FileRead(String),

    #[error("file '{file}' is not a {expected} file")]
    UnsupportedFormat { file: String, expected: String },

    #[error("file '{0}' does not name a supported table")]
    UnsupportedFileName(String),

    #[error("spreadsheet could not be parsed: {0}")]
    Spreadsheet(String),

    #[error("{origin}: file is empty, a header row is required")]
    MissingHeader { origin: String },

    #[error("{origin}: invalid header row: {message}")]
    InvalidHeader { origin: String, message: String },

    #[error("statement {statement}: table '{table}' is not supported")]
    UnsupportedTable { statement: usize, table: String },

    #[error("statement {statement}: {message}")]
    MalformedStatement { statement: usize, message: String },

    // ===== 行级错误 =====
    #[error("required field '{0}' is missing")]
    RequiredField(String),

    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error(transparent)]
    KeyMapping(#[from] KeyMappingError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("{0}")]
    Validation(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::Spreadsheet(err.to_string())
    }
}

/// Result 类型别名
pub type ImportOutcome<T> = Result<T, ImportError>;
