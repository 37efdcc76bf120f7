// ==========================================
// 库存管理系统 - 领域模型层
// ==========================================
// 职责: 定义库存实体、表结构描述、导入结果
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod import_result;
pub mod inventory;
pub mod schema;
pub mod types;

// 重导出核心类型
pub use import_result::ImportResult;
pub use inventory::{
    CustomField, CustomFieldValue, Part, PartModel, PartParametric, PartType, Pcb, Project,
    ProjectPartAssignment, ProjectPcbAssignment, TableRecord,
};
pub use schema::{identity_field, table_fields, FieldDescriptor, FieldPresence};
pub use types::{CustomFieldType, FieldType, FieldValue, SupportedTable, UserContext};
