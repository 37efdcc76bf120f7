// ==========================================
// 库存管理系统 - 数据表字段描述
// ==========================================
// 职责: 每张支持表的静态字段清单（名称、语义类型、可空性）
// 用途: 导入时驱动单元格类型转换，导出时决定列顺序
// ==========================================

use crate::domain::types::{FieldType, SupportedTable};

// ==========================================
// 字段出现规则 (Field Presence)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPresence {
    /// 代理主键: 缺失/非法取默认值（写入端会重新分配）
    Identity,
    /// 必填: 缺失或非法即为行错误
    Required,
    /// 非空但容忍默认值: 缺失取类型默认值，非法为行错误
    Defaulted,
    /// 可空: 缺失/非法取 Null
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub field_type: FieldType,
    pub presence: FieldPresence,
}

impl FieldDescriptor {
    const fn new(name: &'static str, field_type: FieldType, presence: FieldPresence) -> Self {
        Self {
            name,
            field_type,
            presence,
        }
    }

    const fn identity(name: &'static str) -> Self {
        Self::new(name, FieldType::Int64, FieldPresence::Identity)
    }

    const fn required(name: &'static str, field_type: FieldType) -> Self {
        Self::new(name, field_type, FieldPresence::Required)
    }

    const fn defaulted(name: &'static str, field_type: FieldType) -> Self {
        Self::new(name, field_type, FieldPresence::Defaulted)
    }

    const fn optional(name: &'static str, field_type: FieldType) -> Self {
        Self::new(name, field_type, FieldPresence::Optional)
    }
}

use FieldType::{Bool, DateTime, Decimal, Double, Int32, Int64, StringSet, Text};

const PROJECT_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::identity("ProjectId"),
    FieldDescriptor::required("Name", Text),
    FieldDescriptor::optional("Description", Text),
    FieldDescriptor::optional("Location", Text),
    FieldDescriptor::defaulted("Color", Int32),
    FieldDescriptor::optional("Notes", Text),
    FieldDescriptor::optional("DateCreatedUtc", DateTime),
    FieldDescriptor::optional("DateModifiedUtc", DateTime),
];

const PART_TYPE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::identity("PartTypeId"),
    FieldDescriptor::optional("ParentPartTypeId", Int64),
    FieldDescriptor::required("Name", Text),
    FieldDescriptor::optional("Description", Text),
    FieldDescriptor::optional("ReferenceDesignator", Text),
    FieldDescriptor::optional("SymbolId", Text),
    FieldDescriptor::optional("Keywords", StringSet),
    FieldDescriptor::optional("Icon", Text),
    FieldDescriptor::optional("DateCreatedUtc", DateTime),
];

const PART_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::identity("PartId"),
    FieldDescriptor::required("PartNumber", Text),
    FieldDescriptor::defaulted("PartTypeId", Int64),
    FieldDescriptor::optional("ProjectId", Int64),
    FieldDescriptor::defaulted("Quantity", Int64),
    FieldDescriptor::defaulted("LowStockThreshold", Int32),
    FieldDescriptor::defaulted("Cost", Decimal),
    FieldDescriptor::optional("Currency", Text),
    FieldDescriptor::optional("Description", Text),
    FieldDescriptor::optional("Keywords", StringSet),
    FieldDescriptor::optional("Manufacturer", Text),
    FieldDescriptor::optional("ManufacturerPartNumber", Text),
    FieldDescriptor::optional("DigiKeyPartNumber", Text),
    FieldDescriptor::optional("MouserPartNumber", Text),
    FieldDescriptor::optional("ArrowPartNumber", Text),
    FieldDescriptor::optional("DatasheetUrl", Text),
    FieldDescriptor::optional("ProductUrl", Text),
    FieldDescriptor::optional("ImageUrl", Text),
    FieldDescriptor::optional("Location", Text),
    FieldDescriptor::optional("BinNumber", Text),
    FieldDescriptor::optional("BinNumber2", Text),
    FieldDescriptor::optional("PackageType", Text),
    FieldDescriptor::defaulted("MountingTypeId", Int32),
    FieldDescriptor::optional("LowestCostSupplier", Text),
    FieldDescriptor::optional("LowestCostSupplierUrl", Text),
    FieldDescriptor::optional("FootprintName", Text),
    FieldDescriptor::optional("SymbolName", Text),
    FieldDescriptor::optional("ExtensionValue1", Text),
    FieldDescriptor::optional("ExtensionValue2", Text),
    FieldDescriptor::optional("GlobalId", Text),
    FieldDescriptor::optional("ShortId", Text),
    FieldDescriptor::optional("DateCreatedUtc", DateTime),
    FieldDescriptor::optional("DateModifiedUtc", DateTime),
];

const PART_PARAMETRIC_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::identity("PartParametricId"),
    FieldDescriptor::required("PartId", Int64),
    FieldDescriptor::required("Name", Text),
    FieldDescriptor::optional("Value", Text),
    FieldDescriptor::optional("ValueNumber", Double),
    FieldDescriptor::optional("Units", Text),
    FieldDescriptor::optional("DigiKeyValueId", Text),
    FieldDescriptor::optional("DateCreatedUtc", DateTime),
];

const PART_MODEL_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::identity("PartModelId"),
    FieldDescriptor::required("PartId", Int64),
    FieldDescriptor::required("Name", Text),
    FieldDescriptor::optional("Filename", Text),
    FieldDescriptor::defaulted("ModelType", Int32),
    FieldDescriptor::defaulted("Source", Int32),
    FieldDescriptor::optional("Url", Text),
    FieldDescriptor::optional("DateCreatedUtc", DateTime),
];

const CUSTOM_FIELD_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::identity("CustomFieldId"),
    FieldDescriptor::required("CustomFieldTypeId", Int32),
    FieldDescriptor::required("Name", Text),
    FieldDescriptor::optional("Description", Text),
    FieldDescriptor::defaulted("IsRequired", Bool),
    FieldDescriptor::optional("DateCreatedUtc", DateTime),
];

const CUSTOM_FIELD_VALUE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::identity("CustomFieldValueId"),
    FieldDescriptor::required("CustomFieldId", Int64),
    FieldDescriptor::required("CustomFieldTypeId", Int32),
    FieldDescriptor::required("RecordId", Int64),
    FieldDescriptor::optional("Value", Text),
    FieldDescriptor::optional("DateCreatedUtc", DateTime),
];

const PCB_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::identity("PcbId"),
    FieldDescriptor::required("Name", Text),
    FieldDescriptor::optional("Description", Text),
    FieldDescriptor::defaulted("Quantity", Int32),
    FieldDescriptor::defaulted("Cost", Decimal),
    FieldDescriptor::optional("SerialNumberFormat", Text),
    FieldDescriptor::optional("LastSerialNumber", Text),
    FieldDescriptor::optional("DateCreatedUtc", DateTime),
];

const PROJECT_PCB_ASSIGNMENT_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::identity("ProjectPcbAssignmentId"),
    FieldDescriptor::required("ProjectId", Int64),
    FieldDescriptor::required("PcbId", Int64),
    FieldDescriptor::optional("DateCreatedUtc", DateTime),
];

const PROJECT_PART_ASSIGNMENT_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::identity("ProjectPartAssignmentId"),
    FieldDescriptor::required("ProjectId", Int64),
    FieldDescriptor::optional("PartId", Int64),
    FieldDescriptor::optional("PcbId", Int64),
    FieldDescriptor::optional("PartName", Text),
    FieldDescriptor::defaulted("Quantity", Int32),
    FieldDescriptor::defaulted("QuantityAvailable", Int32),
    FieldDescriptor::optional("Notes", Text),
    FieldDescriptor::optional("ReferenceId", Text),
    FieldDescriptor::optional("SchematicReferenceId", Text),
    FieldDescriptor::optional("CustomDescription", Text),
    FieldDescriptor::defaulted("Cost", Decimal),
    FieldDescriptor::optional("Currency", Text),
    FieldDescriptor::optional("DateCreatedUtc", DateTime),
];

/// 指定表的字段清单（顺序即导出列顺序）
pub fn table_fields(table: SupportedTable) -> &'static [FieldDescriptor] {
    match table {
        SupportedTable::Projects => PROJECT_FIELDS,
        SupportedTable::PartTypes => PART_TYPE_FIELDS,
        SupportedTable::Parts => PART_FIELDS,
        SupportedTable::PartParametrics => PART_PARAMETRIC_FIELDS,
        SupportedTable::PartModels => PART_MODEL_FIELDS,
        SupportedTable::CustomFields => CUSTOM_FIELD_FIELDS,
        SupportedTable::CustomFieldValues => CUSTOM_FIELD_VALUE_FIELDS,
        SupportedTable::Pcbs => PCB_FIELDS,
        SupportedTable::ProjectPcbAssignments => PROJECT_PCB_ASSIGNMENT_FIELDS,
        SupportedTable::ProjectPartAssignments => PROJECT_PART_ASSIGNMENT_FIELDS,
    }
}

/// 指定表的代理主键名
pub fn identity_field(table: SupportedTable) -> &'static str {
    table_fields(table)
        .iter()
        .find(|f| f.presence == FieldPresence::Identity)
        .map(|f| f.name)
        .unwrap_or("Id")
}
