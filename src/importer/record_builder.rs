// ==========================================
// 库存管理系统 - 记录构建器
// ==========================================
// 职责: 带类型字段表 → 领域记录 → 写入端
// 流程: 解析外键 → 补默认值 → 自然键查重 → 写入 → 记录主键映射
// 查重: 自然键已存在时记警告、不计数，并把源主键映射到已有记录
// ==========================================

use crate::config::ImportOptions;
use crate::domain::inventory::{
    CustomField, CustomFieldValue, Part, PartModel, PartParametric, PartType, Pcb, Project,
    ProjectPartAssignment, ProjectPcbAssignment,
};
use crate::domain::schema::identity_field;
use crate::domain::types::{CustomFieldType, SupportedTable, UserContext};
use crate::importer::error::{ImportError, ImportOutcome, KeyMappingError};
use crate::importer::field_mapper::FieldMap;
use crate::importer::key_tracker::{LookupOptions, TemporaryKeyTracker};
use crate::repository::RecordSink;
use chrono::{NaiveDateTime, Utc};
use tracing::debug;
use uuid::Uuid;

/// 单行处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// 已写入（计数）
    Inserted { remapped_id: i64 },
    /// 自然键重复（警告，不计数）
    Duplicate { existing_id: i64, warning: String },
}

/// 生成短 ID（UUID simple 形式截断）
pub fn generate_short_id(length: usize) -> String {
    Uuid::new_v4().simple().to_string().chars().take(length).collect()
}

// ==========================================
// RecordBuilder
// ==========================================
pub struct RecordBuilder<'a> {
    sink: &'a dyn RecordSink,
    user: &'a UserContext,
    options: &'a ImportOptions,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(
        sink: &'a dyn RecordSink,
        user: &'a UserContext,
        options: &'a ImportOptions,
    ) -> Self {
        Self { sink, user, options }
    }

    /// 构建并写入一行
    ///
    /// # 参数
    /// - table: 目标表
    /// - fields: 已映射的字段表
    /// - tracker: 本次导入的主键映射表
    ///
    /// # 返回
    /// - Ok(RowOutcome): 写入或查重结果
    /// - Err: 行级错误（外键缺失、写入失败等）
    pub async fn build(
        &self,
        table: SupportedTable,
        fields: &FieldMap,
        tracker: &mut TemporaryKeyTracker,
    ) -> ImportOutcome<RowOutcome> {
        let original_id = fields.int64(identity_field(table)).unwrap_or(0);
        self.ensure_unmapped(tracker, table, original_id)?;

        match table {
            SupportedTable::Projects => self.build_project(fields, original_id, tracker).await,
            SupportedTable::PartTypes => self.build_part_type(fields, original_id, tracker).await,
            SupportedTable::Parts => self.build_part(fields, original_id, tracker).await,
            SupportedTable::PartParametrics => {
                self.build_part_parametric(fields, original_id, tracker).await
            }
            SupportedTable::PartModels => self.build_part_model(fields, original_id, tracker).await,
            SupportedTable::CustomFields => {
                self.build_custom_field(fields, original_id, tracker).await
            }
            SupportedTable::CustomFieldValues => {
                self.build_custom_field_value(fields, original_id, tracker).await
            }
            SupportedTable::Pcbs => self.build_pcb(fields, original_id, tracker).await,
            SupportedTable::ProjectPcbAssignments => {
                self.build_project_pcb_assignment(fields, original_id, tracker).await
            }
            SupportedTable::ProjectPartAssignments => {
                self.build_project_part_assignment(fields, original_id, tracker).await
            }
        }
    }

    // ===== Projects =====

    async fn build_project(
        &self,
        fields: &FieldMap,
        original_id: i64,
        tracker: &mut TemporaryKeyTracker,
    ) -> ImportOutcome<RowOutcome> {
        let table = SupportedTable::Projects;
        let name = fields.require_text("Name")?;

        if let Some(existing) = self.sink.get_project_by_name(&name, self.user).await? {
            return self.duplicate(
                tracker,
                table,
                original_id,
                existing.project_id,
                format!("Project with name '{}' already exists.", name),
            );
        }

        let created = created_at(fields);
        let project = Project {
            project_id: 0,
            name,
            description: fields.text("Description"),
            location: fields.text("Location"),
            color: fields.int32("Color").unwrap_or(0),
            notes: fields.text("Notes"),
            date_created_utc: created,
            date_modified_utc: fields.datetime("DateModifiedUtc").unwrap_or(created),
        };

        let saved = self.sink.add_project(project, self.user).await?;
        self.inserted(tracker, table, original_id, saved.project_id, None)
    }

    // ===== PartTypes =====

    async fn build_part_type(
        &self,
        fields: &FieldMap,
        original_id: i64,
        tracker: &mut TemporaryKeyTracker,
    ) -> ImportOutcome<RowOutcome> {
        let table = SupportedTable::PartTypes;
        let name = fields.require_text("Name")?;

        if let Some(existing) = self.sink.get_part_type_by_name(&name, self.user).await? {
            return self.duplicate(
                tracker,
                table,
                original_id,
                existing.part_type_id,
                format!("Part type with name '{}' already exists.", name),
            );
        }

        let part_type = PartType {
            part_type_id: 0,
            parent_part_type_id: self.optional_reference(
                tracker,
                fields,
                "ParentPartTypeId",
                SupportedTable::PartTypes,
                "PartTypeId",
            )?,
            name,
            description: fields.text("Description"),
            reference_designator: fields.text("ReferenceDesignator"),
            symbol_id: fields.text("SymbolId"),
            keywords: fields.string_set("Keywords"),
            icon: fields.text("Icon"),
            date_created_utc: created_at(fields),
        };

        let saved = self.sink.add_part_type(part_type, self.user).await?;
        self.inserted(tracker, table, original_id, saved.part_type_id, None)
    }

    // ===== Parts =====

    async fn build_part(
        &self,
        fields: &FieldMap,
        original_id: i64,
        tracker: &mut TemporaryKeyTracker,
    ) -> ImportOutcome<RowOutcome> {
        let table = SupportedTable::Parts;
        let part_number = fields.require_text("PartNumber")?;
        let global_id = fields
            .text("GlobalId")
            .filter(|g| !g.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let duplicate_warning = format!("Part with part number '{}' already exists.", part_number);

        // 同一零件已在本次导入的其它文件中写入
        let seen = tracker.get_mapped_id_by_global_id(
            table,
            "PartId",
            None,
            Some(&global_id),
            LookupOptions::lenient(self.options.treat_zero_as_null),
        )?;
        if let Some(existing_id) = seen {
            return self.duplicate(tracker, table, original_id, existing_id, duplicate_warning);
        }

        if let Some(existing) = self.sink.get_part_by_number(&part_number, self.user).await? {
            return self.duplicate(tracker, table, original_id, existing.part_id, duplicate_warning);
        }

        let created = created_at(fields);
        let part = Part {
            part_id: 0,
            part_type_id: self.required_reference(
                tracker,
                fields,
                "PartTypeId",
                SupportedTable::PartTypes,
                "PartTypeId",
            )?,
            project_id: self.optional_reference(
                tracker,
                fields,
                "ProjectId",
                SupportedTable::Projects,
                "ProjectId",
            )?,
            part_number,
            quantity: fields.int64("Quantity").unwrap_or(0),
            low_stock_threshold: fields.int32("LowStockThreshold").unwrap_or(0),
            cost: fields.decimal("Cost"),
            currency: fields.text("Currency"),
            description: fields.text("Description"),
            keywords: fields.string_set("Keywords"),
            manufacturer: fields.text("Manufacturer"),
            manufacturer_part_number: fields.text("ManufacturerPartNumber"),
            digikey_part_number: fields.text("DigiKeyPartNumber"),
            mouser_part_number: fields.text("MouserPartNumber"),
            arrow_part_number: fields.text("ArrowPartNumber"),
            datasheet_url: fields.text("DatasheetUrl"),
            product_url: fields.text("ProductUrl"),
            image_url: fields.text("ImageUrl"),
            location: fields.text("Location"),
            bin_number: fields.text("BinNumber"),
            bin_number2: fields.text("BinNumber2"),
            package_type: fields.text("PackageType"),
            mounting_type_id: fields.int32("MountingTypeId").unwrap_or(0),
            lowest_cost_supplier: fields.text("LowestCostSupplier"),
            lowest_cost_supplier_url: fields.text("LowestCostSupplierUrl"),
            footprint_name: fields.text("FootprintName"),
            symbol_name: fields.text("SymbolName"),
            extension_value1: fields.text("ExtensionValue1"),
            extension_value2: fields.text("ExtensionValue2"),
            global_id: global_id.clone(),
            short_id: fields
                .text("ShortId")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| generate_short_id(self.options.short_id_length)),
            date_created_utc: created,
            date_modified_utc: fields.datetime("DateModifiedUtc").unwrap_or(created),
        };

        let saved = self.sink.add_part(part, self.user).await?;
        self.inserted(tracker, table, original_id, saved.part_id, Some(global_id))
    }

    // ===== PartParametrics =====

    async fn build_part_parametric(
        &self,
        fields: &FieldMap,
        original_id: i64,
        tracker: &mut TemporaryKeyTracker,
    ) -> ImportOutcome<RowOutcome> {
        let parametric = PartParametric {
            part_parametric_id: 0,
            part_id: self.required_reference(
                tracker,
                fields,
                "PartId",
                SupportedTable::Parts,
                "PartId",
            )?,
            name: fields.require_text("Name")?,
            value: fields.text("Value"),
            value_number: fields.double("ValueNumber"),
            units: fields.text("Units"),
            digikey_value_id: fields.text("DigiKeyValueId"),
            date_created_utc: created_at(fields),
        };

        let saved = self.sink.add_part_parametric(parametric, self.user).await?;
        self.inserted(
            tracker,
            SupportedTable::PartParametrics,
            original_id,
            saved.part_parametric_id,
            None,
        )
    }

    // ===== PartModels =====

    async fn build_part_model(
        &self,
        fields: &FieldMap,
        original_id: i64,
        tracker: &mut TemporaryKeyTracker,
    ) -> ImportOutcome<RowOutcome> {
        let model = PartModel {
            part_model_id: 0,
            part_id: self.required_reference(
                tracker,
                fields,
                "PartId",
                SupportedTable::Parts,
                "PartId",
            )?,
            name: fields.require_text("Name")?,
            filename: fields.text("Filename"),
            model_type: fields.int32("ModelType").unwrap_or(0),
            source: fields.int32("Source").unwrap_or(0),
            url: fields.text("Url"),
            date_created_utc: created_at(fields),
        };

        let saved = self.sink.add_part_model(model, self.user).await?;
        self.inserted(tracker, SupportedTable::PartModels, original_id, saved.part_model_id, None)
    }

    // ===== CustomFields =====

    async fn build_custom_field(
        &self,
        fields: &FieldMap,
        original_id: i64,
        tracker: &mut TemporaryKeyTracker,
    ) -> ImportOutcome<RowOutcome> {
        let table = SupportedTable::CustomFields;
        let type_id = custom_field_type(fields)?;
        let name = fields.require_text("Name")?;

        if let Some(existing) = self
            .sink
            .get_custom_field_by_name(type_id as i32, &name, self.user)
            .await?
        {
            return self.duplicate(
                tracker,
                table,
                original_id,
                existing.custom_field_id,
                format!("Custom field with name '{}' already exists.", name),
            );
        }

        let custom_field = CustomField {
            custom_field_id: 0,
            custom_field_type_id: type_id as i32,
            name,
            description: fields.text("Description"),
            is_required: fields.bool("IsRequired"),
            date_created_utc: created_at(fields),
        };

        let saved = self.sink.add_custom_field(custom_field, self.user).await?;
        self.inserted(tracker, table, original_id, saved.custom_field_id, None)
    }

    // ===== CustomFieldValues =====

    async fn build_custom_field_value(
        &self,
        fields: &FieldMap,
        original_id: i64,
        tracker: &mut TemporaryKeyTracker,
    ) -> ImportOutcome<RowOutcome> {
        let type_id = custom_field_type(fields)?;
        // RecordId 指向的表由归属类型决定
        let (record_table, record_key) = type_id.record_table();

        let value = CustomFieldValue {
            custom_field_value_id: 0,
            custom_field_id: self.required_reference(
                tracker,
                fields,
                "CustomFieldId",
                SupportedTable::CustomFields,
                "CustomFieldId",
            )?,
            custom_field_type_id: type_id as i32,
            record_id: self.required_reference(
                tracker,
                fields,
                "RecordId",
                record_table,
                record_key,
            )?,
            value: fields.text("Value"),
            date_created_utc: created_at(fields),
        };

        let saved = self.sink.add_custom_field_value(value, self.user).await?;
        self.inserted(
            tracker,
            SupportedTable::CustomFieldValues,
            original_id,
            saved.custom_field_value_id,
            None,
        )
    }

    // ===== Pcbs =====

    async fn build_pcb(
        &self,
        fields: &FieldMap,
        original_id: i64,
        tracker: &mut TemporaryKeyTracker,
    ) -> ImportOutcome<RowOutcome> {
        let table = SupportedTable::Pcbs;
        let name = fields.require_text("Name")?;

        if let Some(existing) = self.sink.get_pcb_by_name(&name, self.user).await? {
            return self.duplicate(
                tracker,
                table,
                original_id,
                existing.pcb_id,
                format!("Pcb with name '{}' already exists.", name),
            );
        }

        let pcb = Pcb {
            pcb_id: 0,
            name,
            description: fields.text("Description"),
            quantity: fields.int32("Quantity").unwrap_or(0),
            cost: fields.decimal("Cost"),
            serial_number_format: fields.text("SerialNumberFormat"),
            last_serial_number: fields.text("LastSerialNumber"),
            date_created_utc: created_at(fields),
        };

        let saved = self.sink.add_pcb(pcb, self.user).await?;
        self.inserted(tracker, table, original_id, saved.pcb_id, None)
    }

    // ===== ProjectPcbAssignments =====

    async fn build_project_pcb_assignment(
        &self,
        fields: &FieldMap,
        original_id: i64,
        tracker: &mut TemporaryKeyTracker,
    ) -> ImportOutcome<RowOutcome> {
        let assignment = ProjectPcbAssignment {
            project_pcb_assignment_id: 0,
            project_id: self.required_reference(
                tracker,
                fields,
                "ProjectId",
                SupportedTable::Projects,
                "ProjectId",
            )?,
            pcb_id: self.required_reference(
                tracker,
                fields,
                "PcbId",
                SupportedTable::Pcbs,
                "PcbId",
            )?,
            date_created_utc: created_at(fields),
        };

        let saved = self
            .sink
            .add_project_pcb_assignment(assignment, self.user)
            .await?;
        self.inserted(
            tracker,
            SupportedTable::ProjectPcbAssignments,
            original_id,
            saved.project_pcb_assignment_id,
            None,
        )
    }

    // ===== ProjectPartAssignments =====

    async fn build_project_part_assignment(
        &self,
        fields: &FieldMap,
        original_id: i64,
        tracker: &mut TemporaryKeyTracker,
    ) -> ImportOutcome<RowOutcome> {
        let assignment = ProjectPartAssignment {
            project_part_assignment_id: 0,
            project_id: self.required_reference(
                tracker,
                fields,
                "ProjectId",
                SupportedTable::Projects,
                "ProjectId",
            )?,
            part_id: self.optional_reference(
                tracker,
                fields,
                "PartId",
                SupportedTable::Parts,
                "PartId",
            )?,
            pcb_id: self.optional_reference(
                tracker,
                fields,
                "PcbId",
                SupportedTable::Pcbs,
                "PcbId",
            )?,
            part_name: fields.text("PartName"),
            quantity: fields.int32("Quantity").unwrap_or(0),
            quantity_available: fields.int32("QuantityAvailable").unwrap_or(0),
            notes: fields.text("Notes"),
            reference_id: fields.text("ReferenceId"),
            schematic_reference_id: fields.text("SchematicReferenceId"),
            custom_description: fields.text("CustomDescription"),
            cost: fields.decimal("Cost"),
            currency: fields.text("Currency"),
            date_created_utc: created_at(fields),
        };

        let saved = self
            .sink
            .add_project_part_assignment(assignment, self.user)
            .await?;
        self.inserted(
            tracker,
            SupportedTable::ProjectPartAssignments,
            original_id,
            saved.project_part_assignment_id,
            None,
        )
    }

    // ===== 外键与映射 =====

    fn lookup_options(&self) -> LookupOptions {
        LookupOptions {
            treat_zero_as_null: self.options.treat_zero_as_null,
            error_if_missing: true,
        }
    }

    /// 非空外键: 源值为空或未映射均为行错误
    fn required_reference(
        &self,
        tracker: &TemporaryKeyTracker,
        fields: &FieldMap,
        field: &str,
        target: SupportedTable,
        key_name: &str,
    ) -> ImportOutcome<i64> {
        tracker
            .get_mapped_id(target, key_name, fields.int64(field), self.lookup_options())?
            .ok_or_else(|| {
                ImportError::Validation(format!("required reference '{}' is empty", field))
            })
    }

    /// 可空外键: 源值为空取 None；非空但未映射为行错误
    fn optional_reference(
        &self,
        tracker: &TemporaryKeyTracker,
        fields: &FieldMap,
        field: &str,
        target: SupportedTable,
        key_name: &str,
    ) -> ImportOutcome<Option<i64>> {
        Ok(tracker.get_mapped_id(target, key_name, fields.int64(field), self.lookup_options())?)
    }

    /// 同一源主键在本次导入中只能出现一次
    fn ensure_unmapped(
        &self,
        tracker: &TemporaryKeyTracker,
        table: SupportedTable,
        original_id: i64,
    ) -> ImportOutcome<()> {
        if self.skips_mapping(original_id) {
            return Ok(());
        }

        let key_name = identity_field(table);
        let existing = tracker.get_mapped_id(
            table,
            key_name,
            Some(original_id),
            LookupOptions::lenient(false),
        )?;
        match existing {
            Some(_) => Err(KeyMappingError::Collision {
                table,
                key_name: key_name.to_string(),
                original_id,
            }
            .into()),
            None => Ok(()),
        }
    }

    /// 源主键缺失（0）时无需记录映射
    fn skips_mapping(&self, original_id: i64) -> bool {
        original_id == 0 && self.options.treat_zero_as_null
    }

    fn remember(
        &self,
        tracker: &mut TemporaryKeyTracker,
        table: SupportedTable,
        original_id: i64,
        remapped_id: i64,
        global_id: Option<String>,
    ) -> ImportOutcome<()> {
        if self.skips_mapping(original_id) {
            return Ok(());
        }
        tracker.add_key_mapping(table, identity_field(table), original_id, remapped_id, global_id)?;
        Ok(())
    }

    fn inserted(
        &self,
        tracker: &mut TemporaryKeyTracker,
        table: SupportedTable,
        original_id: i64,
        remapped_id: i64,
        global_id: Option<String>,
    ) -> ImportOutcome<RowOutcome> {
        debug!(table = %table, original_id, remapped_id, "记录已写入");
        self.remember(tracker, table, original_id, remapped_id, global_id)?;
        Ok(RowOutcome::Inserted { remapped_id })
    }

    fn duplicate(
        &self,
        tracker: &mut TemporaryKeyTracker,
        table: SupportedTable,
        original_id: i64,
        existing_id: i64,
        warning: String,
    ) -> ImportOutcome<RowOutcome> {
        debug!(table = %table, original_id, existing_id, "自然键重复，映射到已有记录");
        self.remember(tracker, table, original_id, existing_id, None)?;
        Ok(RowOutcome::Duplicate { existing_id, warning })
    }
}

fn created_at(fields: &FieldMap) -> NaiveDateTime {
    fields
        .datetime("DateCreatedUtc")
        .unwrap_or_else(|| Utc::now().naive_utc())
}

fn custom_field_type(fields: &FieldMap) -> ImportOutcome<CustomFieldType> {
    let raw = fields.int32("CustomFieldTypeId").unwrap_or(0);
    CustomFieldType::from_id(raw)
        .ok_or_else(|| ImportError::Validation(format!("unsupported CustomFieldTypeId {}", raw)))
}
