// ==========================================
// 库存管理系统 - 记录写入端 / 读取端 Trait
// ==========================================
// 职责: 定义导入引擎与持久化存储之间的接口（不包含实现）
// 红线: 写入端负责分配新主键，导入引擎不关心存储细节
// ==========================================

use crate::domain::inventory::{
    CustomField, CustomFieldValue, Part, PartModel, PartParametric, PartType, Pcb, Project,
    ProjectPartAssignment, ProjectPcbAssignment,
};
use crate::domain::types::UserContext;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// RecordSink Trait
// ==========================================
// 用途: 导入引擎写入记录、按自然键查重
// 实现者: SqliteInventoryRepository（使用 rusqlite）
#[async_trait]
pub trait RecordSink: Send + Sync {
    // ===== 写入（返回带新主键的记录）=====

    async fn add_project(&self, project: Project, user: &UserContext) -> RepositoryResult<Project>;

    async fn add_part_type(
        &self,
        part_type: PartType,
        user: &UserContext,
    ) -> RepositoryResult<PartType>;

    async fn add_part(&self, part: Part, user: &UserContext) -> RepositoryResult<Part>;

    async fn add_part_parametric(
        &self,
        parametric: PartParametric,
        user: &UserContext,
    ) -> RepositoryResult<PartParametric>;

    async fn add_part_model(
        &self,
        model: PartModel,
        user: &UserContext,
    ) -> RepositoryResult<PartModel>;

    async fn add_custom_field(
        &self,
        field: CustomField,
        user: &UserContext,
    ) -> RepositoryResult<CustomField>;

    async fn add_custom_field_value(
        &self,
        value: CustomFieldValue,
        user: &UserContext,
    ) -> RepositoryResult<CustomFieldValue>;

    async fn add_pcb(&self, pcb: Pcb, user: &UserContext) -> RepositoryResult<Pcb>;

    async fn add_project_pcb_assignment(
        &self,
        assignment: ProjectPcbAssignment,
        user: &UserContext,
    ) -> RepositoryResult<ProjectPcbAssignment>;

    async fn add_project_part_assignment(
        &self,
        assignment: ProjectPartAssignment,
        user: &UserContext,
    ) -> RepositoryResult<ProjectPartAssignment>;

    // ===== 自然键查询（用于查重）=====

    async fn get_project_by_name(
        &self,
        name: &str,
        user: &UserContext,
    ) -> RepositoryResult<Option<Project>>;

    async fn get_part_type_by_name(
        &self,
        name: &str,
        user: &UserContext,
    ) -> RepositoryResult<Option<PartType>>;

    async fn get_part_by_number(
        &self,
        part_number: &str,
        user: &UserContext,
    ) -> RepositoryResult<Option<Part>>;

    /// 自定义字段按 (归属类型, 名称) 唯一
    async fn get_custom_field_by_name(
        &self,
        custom_field_type_id: i32,
        name: &str,
        user: &UserContext,
    ) -> RepositoryResult<Option<CustomField>>;

    async fn get_pcb_by_name(&self, name: &str, user: &UserContext)
        -> RepositoryResult<Option<Pcb>>;
}

// ==========================================
// RecordSource Trait
// ==========================================
// 用途: 导出时按表读取全部记录（按主键升序）
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn list_projects(&self, user: &UserContext) -> RepositoryResult<Vec<Project>>;

    async fn list_part_types(&self, user: &UserContext) -> RepositoryResult<Vec<PartType>>;

    async fn list_parts(&self, user: &UserContext) -> RepositoryResult<Vec<Part>>;

    async fn list_part_parametrics(
        &self,
        user: &UserContext,
    ) -> RepositoryResult<Vec<PartParametric>>;

    async fn list_part_models(&self, user: &UserContext) -> RepositoryResult<Vec<PartModel>>;

    async fn list_custom_fields(&self, user: &UserContext) -> RepositoryResult<Vec<CustomField>>;

    async fn list_custom_field_values(
        &self,
        user: &UserContext,
    ) -> RepositoryResult<Vec<CustomFieldValue>>;

    async fn list_pcbs(&self, user: &UserContext) -> RepositoryResult<Vec<Pcb>>;

    async fn list_project_pcb_assignments(
        &self,
        user: &UserContext,
    ) -> RepositoryResult<Vec<ProjectPcbAssignment>>;

    async fn list_project_part_assignments(
        &self,
        user: &UserContext,
    ) -> RepositoryResult<Vec<ProjectPartAssignment>>;
}
