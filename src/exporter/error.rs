// ==========================================
// 库存管理系统 - 导出模块错误类型
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write export file: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported export format: {0} (expected csv or sql)")]
    UnsupportedFormat(String),
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;
