// ==========================================
// 库存管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供记录写入/读取接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod inventory_repo_impl;
pub mod record_sink;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use inventory_repo_impl::SqliteInventoryRepository;
pub use record_sink::{RecordSink, RecordSource};
