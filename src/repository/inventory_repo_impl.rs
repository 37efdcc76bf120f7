// ==========================================
// 库存管理系统 - 库存 Repository 实现
// ==========================================
// 职责: 以 rusqlite 实现 RecordSink / RecordSource
// 红线: Repository 不含业务规则，只做数据 CRUD
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

use crate::db::{init_schema, open_in_memory_connection, open_sqlite_connection};
use crate::domain::inventory::{
    CustomField, CustomFieldValue, Part, PartModel, PartParametric, PartType, Pcb, Project,
    ProjectPartAssignment, ProjectPcbAssignment,
};
use crate::domain::types::UserContext;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_sink::{RecordSink, RecordSource};
use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// 列读写辅助
// ==========================================

fn join_keywords(keywords: &[String]) -> Option<String> {
    if keywords.is_empty() {
        None
    } else {
        Some(keywords.join(","))
    }
}

fn split_keywords(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

fn get_decimal(row: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(raw.trim())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ==========================================
// 行映射
// ==========================================

const PROJECT_COLUMNS: &str = "ProjectId, Name, Description, Location, Color, Notes, \
     DateCreatedUtc, DateModifiedUtc";

fn map_project(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        project_id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        location: row.get(3)?,
        color: row.get(4)?,
        notes: row.get(5)?,
        date_created_utc: row.get(6)?,
        date_modified_utc: row.get(7)?,
    })
}

const PART_TYPE_COLUMNS: &str = "PartTypeId, ParentPartTypeId, Name, Description, \
     ReferenceDesignator, SymbolId, Keywords, Icon, DateCreatedUtc";

fn map_part_type(row: &Row) -> rusqlite::Result<PartType> {
    Ok(PartType {
        part_type_id: row.get(0)?,
        parent_part_type_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        reference_designator: row.get(4)?,
        symbol_id: row.get(5)?,
        keywords: split_keywords(row.get(6)?),
        icon: row.get(7)?,
        date_created_utc: row.get(8)?,
    })
}

const PART_COLUMNS: &str = "PartId, PartNumber, PartTypeId, ProjectId, Quantity, \
     LowStockThreshold, Cost, Currency, Description, Keywords, Manufacturer, \
     ManufacturerPartNumber, DigiKeyPartNumber, MouserPartNumber, ArrowPartNumber, \
     DatasheetUrl, ProductUrl, ImageUrl, Location, BinNumber, BinNumber2, PackageType, \
     MountingTypeId, LowestCostSupplier, LowestCostSupplierUrl, FootprintName, SymbolName, \
     ExtensionValue1, ExtensionValue2, GlobalId, ShortId, DateCreatedUtc, DateModifiedUtc";

fn map_part(row: &Row) -> rusqlite::Result<Part> {
    Ok(Part {
        part_id: row.get(0)?,
        part_number: row.get(1)?,
        part_type_id: row.get(2)?,
        project_id: row.get(3)?,
        quantity: row.get(4)?,
        low_stock_threshold: row.get(5)?,
        cost: get_decimal(row, 6)?,
        currency: row.get(7)?,
        description: row.get(8)?,
        keywords: split_keywords(row.get(9)?),
        manufacturer: row.get(10)?,
        manufacturer_part_number: row.get(11)?,
        digikey_part_number: row.get(12)?,
        mouser_part_number: row.get(13)?,
        arrow_part_number: row.get(14)?,
        datasheet_url: row.get(15)?,
        product_url: row.get(16)?,
        image_url: row.get(17)?,
        location: row.get(18)?,
        bin_number: row.get(19)?,
        bin_number2: row.get(20)?,
        package_type: row.get(21)?,
        mounting_type_id: row.get(22)?,
        lowest_cost_supplier: row.get(23)?,
        lowest_cost_supplier_url: row.get(24)?,
        footprint_name: row.get(25)?,
        symbol_name: row.get(26)?,
        extension_value1: row.get(27)?,
        extension_value2: row.get(28)?,
        global_id: row.get(29)?,
        short_id: row.get(30)?,
        date_created_utc: row.get(31)?,
        date_modified_utc: row.get(32)?,
    })
}

const PART_PARAMETRIC_COLUMNS: &str =
    "PartParametricId, PartId, Name, Value, ValueNumber, Units, DigiKeyValueId, DateCreatedUtc";

fn map_part_parametric(row: &Row) -> rusqlite::Result<PartParametric> {
    Ok(PartParametric {
        part_parametric_id: row.get(0)?,
        part_id: row.get(1)?,
        name: row.get(2)?,
        value: row.get(3)?,
        value_number: row.get(4)?,
        units: row.get(5)?,
        digikey_value_id: row.get(6)?,
        date_created_utc: row.get(7)?,
    })
}

const PART_MODEL_COLUMNS: &str =
    "PartModelId, PartId, Name, Filename, ModelType, Source, Url, DateCreatedUtc";

fn map_part_model(row: &Row) -> rusqlite::Result<PartModel> {
    Ok(PartModel {
        part_model_id: row.get(0)?,
        part_id: row.get(1)?,
        name: row.get(2)?,
        filename: row.get(3)?,
        model_type: row.get(4)?,
        source: row.get(5)?,
        url: row.get(6)?,
        date_created_utc: row.get(7)?,
    })
}

const CUSTOM_FIELD_COLUMNS: &str =
    "CustomFieldId, CustomFieldTypeId, Name, Description, IsRequired, DateCreatedUtc";

fn map_custom_field(row: &Row) -> rusqlite::Result<CustomField> {
    Ok(CustomField {
        custom_field_id: row.get(0)?,
        custom_field_type_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        is_required: row.get(4)?,
        date_created_utc: row.get(5)?,
    })
}

const CUSTOM_FIELD_VALUE_COLUMNS: &str =
    "CustomFieldValueId, CustomFieldId, CustomFieldTypeId, RecordId, Value, DateCreatedUtc";

fn map_custom_field_value(row: &Row) -> rusqlite::Result<CustomFieldValue> {
    Ok(CustomFieldValue {
        custom_field_value_id: row.get(0)?,
        custom_field_id: row.get(1)?,
        custom_field_type_id: row.get(2)?,
        record_id: row.get(3)?,
        value: row.get(4)?,
        date_created_utc: row.get(5)?,
    })
}

const PCB_COLUMNS: &str = "PcbId, Name, Description, Quantity, Cost, SerialNumberFormat, \
     LastSerialNumber, DateCreatedUtc";

fn map_pcb(row: &Row) -> rusqlite::Result<Pcb> {
    Ok(Pcb {
        pcb_id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        quantity: row.get(3)?,
        cost: get_decimal(row, 4)?,
        serial_number_format: row.get(5)?,
        last_serial_number: row.get(6)?,
        date_created_utc: row.get(7)?,
    })
}

const PROJECT_PCB_ASSIGNMENT_COLUMNS: &str =
    "ProjectPcbAssignmentId, ProjectId, PcbId, DateCreatedUtc";

fn map_project_pcb_assignment(row: &Row) -> rusqlite::Result<ProjectPcbAssignment> {
    Ok(ProjectPcbAssignment {
        project_pcb_assignment_id: row.get(0)?,
        project_id: row.get(1)?,
        pcb_id: row.get(2)?,
        date_created_utc: row.get(3)?,
    })
}

const PROJECT_PART_ASSIGNMENT_COLUMNS: &str = "ProjectPartAssignmentId, ProjectId, PartId, \
     PcbId, PartName, Quantity, QuantityAvailable, Notes, ReferenceId, SchematicReferenceId, \
     CustomDescription, Cost, Currency, DateCreatedUtc";

fn map_project_part_assignment(row: &Row) -> rusqlite::Result<ProjectPartAssignment> {
    Ok(ProjectPartAssignment {
        project_part_assignment_id: row.get(0)?,
        project_id: row.get(1)?,
        part_id: row.get(2)?,
        pcb_id: row.get(3)?,
        part_name: row.get(4)?,
        quantity: row.get(5)?,
        quantity_available: row.get(6)?,
        notes: row.get(7)?,
        reference_id: row.get(8)?,
        schematic_reference_id: row.get(9)?,
        custom_description: row.get(10)?,
        cost: get_decimal(row, 11)?,
        currency: row.get(12)?,
        date_created_utc: row.get(13)?,
    })
}

// ==========================================
// SqliteInventoryRepository
// ==========================================
pub struct SqliteInventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteInventoryRepository {
    /// 打开数据库文件并建表
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 内存数据库（测试使用）
    pub fn in_memory() -> RepositoryResult<Self> {
        let conn = open_in_memory_connection()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（调用方负责建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 共享连接（配置管理器复用同一数据库）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn query_optional<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        mapper: fn(&Row) -> rusqlite::Result<T>,
    ) -> RepositoryResult<Option<T>> {
        let conn = self.lock()?;
        Ok(conn.query_row(sql, params, mapper).optional()?)
    }

    fn query_list<T>(
        &self,
        sql: &str,
        user: &UserContext,
        mapper: fn(&Row) -> rusqlite::Result<T>,
    ) -> RepositoryResult<Vec<T>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![user.user_id], mapper)?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }
}

#[async_trait]
impl RecordSink for SqliteInventoryRepository {
    async fn add_project(
        &self,
        mut project: Project,
        user: &UserContext,
    ) -> RepositoryResult<Project> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO Projects (
                Name, Description, Location, Color, Notes,
                DateCreatedUtc, DateModifiedUtc, UserId, OrganizationId
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                project.name,
                project.description,
                project.location,
                project.color,
                project.notes,
                project.date_created_utc,
                project.date_modified_utc,
                user.user_id,
                user.organization_id,
            ],
        )?;
        project.project_id = conn.last_insert_rowid();
        Ok(project)
    }

    async fn add_part_type(
        &self,
        mut part_type: PartType,
        user: &UserContext,
    ) -> RepositoryResult<PartType> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO PartTypes (
                ParentPartTypeId, Name, Description, ReferenceDesignator, SymbolId,
                Keywords, Icon, DateCreatedUtc, UserId, OrganizationId
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                part_type.parent_part_type_id,
                part_type.name,
                part_type.description,
                part_type.reference_designator,
                part_type.symbol_id,
                join_keywords(&part_type.keywords),
                part_type.icon,
                part_type.date_created_utc,
                user.user_id,
                user.organization_id,
            ],
        )?;
        part_type.part_type_id = conn.last_insert_rowid();
        Ok(part_type)
    }

    async fn add_part(&self, mut part: Part, user: &UserContext) -> RepositoryResult<Part> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO Parts (
                PartNumber, PartTypeId, ProjectId, Quantity, LowStockThreshold,
                Cost, Currency, Description, Keywords, Manufacturer,
                ManufacturerPartNumber, DigiKeyPartNumber, MouserPartNumber, ArrowPartNumber,
                DatasheetUrl, ProductUrl, ImageUrl, Location, BinNumber, BinNumber2,
                PackageType, MountingTypeId, LowestCostSupplier, LowestCostSupplierUrl,
                FootprintName, SymbolName, ExtensionValue1, ExtensionValue2,
                GlobalId, ShortId, DateCreatedUtc, DateModifiedUtc, UserId, OrganizationId
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31, ?32,
                ?33, ?34
            )
            "#,
            params![
                part.part_number,
                part.part_type_id,
                part.project_id,
                part.quantity,
                part.low_stock_threshold,
                part.cost.to_string(),
                part.currency,
                part.description,
                join_keywords(&part.keywords),
                part.manufacturer,
                part.manufacturer_part_number,
                part.digikey_part_number,
                part.mouser_part_number,
                part.arrow_part_number,
                part.datasheet_url,
                part.product_url,
                part.image_url,
                part.location,
                part.bin_number,
                part.bin_number2,
                part.package_type,
                part.mounting_type_id,
                part.lowest_cost_supplier,
                part.lowest_cost_supplier_url,
                part.footprint_name,
                part.symbol_name,
                part.extension_value1,
                part.extension_value2,
                part.global_id,
                part.short_id,
                part.date_created_utc,
                part.date_modified_utc,
                user.user_id,
                user.organization_id,
            ],
        )?;
        part.part_id = conn.last_insert_rowid();
        Ok(part)
    }

    async fn add_part_parametric(
        &self,
        mut parametric: PartParametric,
        user: &UserContext,
    ) -> RepositoryResult<PartParametric> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO PartParametrics (
                PartId, Name, Value, ValueNumber, Units, DigiKeyValueId,
                DateCreatedUtc, UserId, OrganizationId
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                parametric.part_id,
                parametric.name,
                parametric.value,
                parametric.value_number,
                parametric.units,
                parametric.digikey_value_id,
                parametric.date_created_utc,
                user.user_id,
                user.organization_id,
            ],
        )?;
        parametric.part_parametric_id = conn.last_insert_rowid();
        Ok(parametric)
    }

    async fn add_part_model(
        &self,
        mut model: PartModel,
        user: &UserContext,
    ) -> RepositoryResult<PartModel> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO PartModels (
                PartId, Name, Filename, ModelType, Source, Url,
                DateCreatedUtc, UserId, OrganizationId
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                model.part_id,
                model.name,
                model.filename,
                model.model_type,
                model.source,
                model.url,
                model.date_created_utc,
                user.user_id,
                user.organization_id,
            ],
        )?;
        model.part_model_id = conn.last_insert_rowid();
        Ok(model)
    }

    async fn add_custom_field(
        &self,
        mut field: CustomField,
        user: &UserContext,
    ) -> RepositoryResult<CustomField> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO CustomFields (
                CustomFieldTypeId, Name, Description, IsRequired,
                DateCreatedUtc, UserId, OrganizationId
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                field.custom_field_type_id,
                field.name,
                field.description,
                field.is_required,
                field.date_created_utc,
                user.user_id,
                user.organization_id,
            ],
        )?;
        field.custom_field_id = conn.last_insert_rowid();
        Ok(field)
    }

    async fn add_custom_field_value(
        &self,
        mut value: CustomFieldValue,
        user: &UserContext,
    ) -> RepositoryResult<CustomFieldValue> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO CustomFieldValues (
                CustomFieldId, CustomFieldTypeId, RecordId, Value,
                DateCreatedUtc, UserId, OrganizationId
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                value.custom_field_id,
                value.custom_field_type_id,
                value.record_id,
                value.value,
                value.date_created_utc,
                user.user_id,
                user.organization_id,
            ],
        )?;
        value.custom_field_value_id = conn.last_insert_rowid();
        Ok(value)
    }

    async fn add_pcb(&self, mut pcb: Pcb, user: &UserContext) -> RepositoryResult<Pcb> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO Pcbs (
                Name, Description, Quantity, Cost, SerialNumberFormat, LastSerialNumber,
                DateCreatedUtc, UserId, OrganizationId
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                pcb.name,
                pcb.description,
                pcb.quantity,
                pcb.cost.to_string(),
                pcb.serial_number_format,
                pcb.last_serial_number,
                pcb.date_created_utc,
                user.user_id,
                user.organization_id,
            ],
        )?;
        pcb.pcb_id = conn.last_insert_rowid();
        Ok(pcb)
    }

    async fn add_project_pcb_assignment(
        &self,
        mut assignment: ProjectPcbAssignment,
        user: &UserContext,
    ) -> RepositoryResult<ProjectPcbAssignment> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO ProjectPcbAssignments (
                ProjectId, PcbId, DateCreatedUtc, UserId, OrganizationId
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                assignment.project_id,
                assignment.pcb_id,
                assignment.date_created_utc,
                user.user_id,
                user.organization_id,
            ],
        )?;
        assignment.project_pcb_assignment_id = conn.last_insert_rowid();
        Ok(assignment)
    }

    async fn add_project_part_assignment(
        &self,
        mut assignment: ProjectPartAssignment,
        user: &UserContext,
    ) -> RepositoryResult<ProjectPartAssignment> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO ProjectPartAssignments (
                ProjectId, PartId, PcbId, PartName, Quantity, QuantityAvailable, Notes,
                ReferenceId, SchematicReferenceId, CustomDescription, Cost, Currency,
                DateCreatedUtc, UserId, OrganizationId
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                assignment.project_id,
                assignment.part_id,
                assignment.pcb_id,
                assignment.part_name,
                assignment.quantity,
                assignment.quantity_available,
                assignment.notes,
                assignment.reference_id,
                assignment.schematic_reference_id,
                assignment.custom_description,
                assignment.cost.to_string(),
                assignment.currency,
                assignment.date_created_utc,
                user.user_id,
                user.organization_id,
            ],
        )?;
        assignment.project_part_assignment_id = conn.last_insert_rowid();
        Ok(assignment)
    }

    async fn get_project_by_name(
        &self,
        name: &str,
        user: &UserContext,
    ) -> RepositoryResult<Option<Project>> {
        let sql = format!(
            "SELECT {} FROM Projects WHERE Name = ?1 COLLATE NOCASE AND UserId IS ?2 LIMIT 1",
            PROJECT_COLUMNS
        );
        self.query_optional(&sql, params![name, user.user_id], map_project)
    }

    async fn get_part_type_by_name(
        &self,
        name: &str,
        user: &UserContext,
    ) -> RepositoryResult<Option<PartType>> {
        let sql = format!(
            "SELECT {} FROM PartTypes WHERE Name = ?1 COLLATE NOCASE AND UserId IS ?2 LIMIT 1",
            PART_TYPE_COLUMNS
        );
        self.query_optional(&sql, params![name, user.user_id], map_part_type)
    }

    async fn get_part_by_number(
        &self,
        part_number: &str,
        user: &UserContext,
    ) -> RepositoryResult<Option<Part>> {
        let sql = format!(
            "SELECT {} FROM Parts WHERE PartNumber = ?1 COLLATE NOCASE AND UserId IS ?2 LIMIT 1",
            PART_COLUMNS
        );
        self.query_optional(&sql, params![part_number, user.user_id], map_part)
    }

    async fn get_custom_field_by_name(
        &self,
        custom_field_type_id: i32,
        name: &str,
        user: &UserContext,
    ) -> RepositoryResult<Option<CustomField>> {
        let sql = format!(
            "SELECT {} FROM CustomFields \
             WHERE CustomFieldTypeId = ?1 AND Name = ?2 COLLATE NOCASE AND UserId IS ?3 LIMIT 1",
            CUSTOM_FIELD_COLUMNS
        );
        self.query_optional(
            &sql,
            params![custom_field_type_id, name, user.user_id],
            map_custom_field,
        )
    }

    async fn get_pcb_by_name(
        &self,
        name: &str,
        user: &UserContext,
    ) -> RepositoryResult<Option<Pcb>> {
        let sql = format!(
            "SELECT {} FROM Pcbs WHERE Name = ?1 COLLATE NOCASE AND UserId IS ?2 LIMIT 1",
            PCB_COLUMNS
        );
        self.query_optional(&sql, params![name, user.user_id], map_pcb)
    }
}

#[async_trait]
impl RecordSource for SqliteInventoryRepository {
    async fn list_projects(&self, user: &UserContext) -> RepositoryResult<Vec<Project>> {
        let sql = format!(
            "SELECT {} FROM Projects WHERE UserId IS ?1 ORDER BY ProjectId",
            PROJECT_COLUMNS
        );
        self.query_list(&sql, user, map_project)
    }

    async fn list_part_types(&self, user: &UserContext) -> RepositoryResult<Vec<PartType>> {
        let sql = format!(
            "SELECT {} FROM PartTypes WHERE UserId IS ?1 ORDER BY PartTypeId",
            PART_TYPE_COLUMNS
        );
        self.query_list(&sql, user, map_part_type)
    }

    async fn list_parts(&self, user: &UserContext) -> RepositoryResult<Vec<Part>> {
        let sql = format!(
            "SELECT {} FROM Parts WHERE UserId IS ?1 ORDER BY PartId",
            PART_COLUMNS
        );
        self.query_list(&sql, user, map_part)
    }

    async fn list_part_parametrics(
        &self,
        user: &UserContext,
    ) -> RepositoryResult<Vec<PartParametric>> {
        let sql = format!(
            "SELECT {} FROM PartParametrics WHERE UserId IS ?1 ORDER BY PartParametricId",
            PART_PARAMETRIC_COLUMNS
        );
        self.query_list(&sql, user, map_part_parametric)
    }

    async fn list_part_models(&self, user: &UserContext) -> RepositoryResult<Vec<PartModel>> {
        let sql = format!(
            "SELECT {} FROM PartModels WHERE UserId IS ?1 ORDER BY PartModelId",
            PART_MODEL_COLUMNS
        );
        self.query_list(&sql, user, map_part_model)
    }

    async fn list_custom_fields(&self, user: &UserContext) -> RepositoryResult<Vec<CustomField>> {
        let sql = format!(
            "SELECT {} FROM CustomFields WHERE UserId IS ?1 ORDER BY CustomFieldId",
            CUSTOM_FIELD_COLUMNS
        );
        self.query_list(&sql, user, map_custom_field)
    }

    async fn list_custom_field_values(
        &self,
        user: &UserContext,
    ) -> RepositoryResult<Vec<CustomFieldValue>> {
        let sql = format!(
            "SELECT {} FROM CustomFieldValues WHERE UserId IS ?1 ORDER BY CustomFieldValueId",
            CUSTOM_FIELD_VALUE_COLUMNS
        );
        self.query_list(&sql, user, map_custom_field_value)
    }

    async fn list_pcbs(&self, user: &UserContext) -> RepositoryResult<Vec<Pcb>> {
        let sql = format!(
            "SELECT {} FROM Pcbs WHERE UserId IS ?1 ORDER BY PcbId",
            PCB_COLUMNS
        );
        self.query_list(&sql, user, map_pcb)
    }

    async fn list_project_pcb_assignments(
        &self,
        user: &UserContext,
    ) -> RepositoryResult<Vec<ProjectPcbAssignment>> {
        let sql = format!(
            "SELECT {} FROM ProjectPcbAssignments WHERE UserId IS ?1 \
             ORDER BY ProjectPcbAssignmentId",
            PROJECT_PCB_ASSIGNMENT_COLUMNS
        );
        self.query_list(&sql, user, map_project_pcb_assignment)
    }

    async fn list_project_part_assignments(
        &self,
        user: &UserContext,
    ) -> RepositoryResult<Vec<ProjectPartAssignment>> {
        let sql = format!(
            "SELECT {} FROM ProjectPartAssignments WHERE UserId IS ?1 \
             ORDER BY ProjectPartAssignmentId",
            PROJECT_PART_ASSIGNMENT_COLUMNS
        );
        self.query_list(&sql, user, map_project_part_assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn project(name: &str) -> Project {
        Project {
            project_id: 99,
            name: name.to_string(),
            description: None,
            location: None,
            color: 0,
            notes: None,
            date_created_utc: ts(),
            date_modified_utc: ts(),
        }
    }

    #[tokio::test]
    async fn test_add_project_assigns_new_id() {
        let repo = SqliteInventoryRepository::in_memory().unwrap();
        let user = UserContext::default();

        let first = repo.add_project(project("A"), &user).await.unwrap();
        let second = repo.add_project(project("B"), &user).await.unwrap();

        assert_eq!(first.project_id, 1);
        assert_eq!(second.project_id, 2);
    }

    #[tokio::test]
    async fn test_get_project_by_name_case_insensitive() {
        let repo = SqliteInventoryRepository::in_memory().unwrap();
        let user = UserContext::default();
        repo.add_project(project("Widget"), &user).await.unwrap();

        let found = repo.get_project_by_name("widget", &user).await.unwrap();
        assert_eq!(found.map(|p| p.name), Some("Widget".to_string()));
        assert!(repo
            .get_project_by_name("Gadget", &user)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_lookup_scoped_by_user() {
        let repo = SqliteInventoryRepository::in_memory().unwrap();
        let alice = UserContext {
            user_id: Some(1),
            organization_id: None,
        };
        let bob = UserContext {
            user_id: Some(2),
            organization_id: None,
        };
        repo.add_project(project("Widget"), &alice).await.unwrap();

        assert!(repo.get_project_by_name("Widget", &bob).await.unwrap().is_none());
        assert_eq!(repo.list_projects(&alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_part_foreign_key_enforced() {
        let repo = SqliteInventoryRepository::in_memory().unwrap();
        let user = UserContext::default();
        let part = Part {
            part_id: 0,
            part_number: "LM358".to_string(),
            part_type_id: 42,
            project_id: None,
            quantity: 1,
            low_stock_threshold: 0,
            cost: Decimal::new(25, 2),
            currency: None,
            description: None,
            keywords: vec!["opamp".to_string()],
            manufacturer: None,
            manufacturer_part_number: None,
            digikey_part_number: None,
            mouser_part_number: None,
            arrow_part_number: None,
            datasheet_url: None,
            product_url: None,
            image_url: None,
            location: None,
            bin_number: None,
            bin_number2: None,
            package_type: None,
            mounting_type_id: 0,
            lowest_cost_supplier: None,
            lowest_cost_supplier_url: None,
            footprint_name: None,
            symbol_name: None,
            extension_value1: None,
            extension_value2: None,
            global_id: "g".to_string(),
            short_id: "s".to_string(),
            date_created_utc: ts(),
            date_modified_utc: ts(),
        };

        let err = repo.add_part(part, &user).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }
}
