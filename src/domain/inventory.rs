// ==========================================
// 库存管理系统 - 库存实体
// ==========================================
// 职责: 十张支持表对应的记录结构
// 说明: 主键字段在写入前为原始值，写入后由写入端回填新值
// ==========================================

use crate::domain::schema::table_fields;
use crate::domain::types::{FieldValue, SupportedTable};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// TableRecord Trait
// ==========================================
// 用途: 按字段清单顺序输出记录值（导出使用）
pub trait TableRecord {
    const TABLE: SupportedTable;

    /// 与 `table_fields(Self::TABLE)` 一一对应的值
    fn field_values(&self) -> Vec<FieldValue>;

    /// (字段名, 值) 对
    fn named_values(&self) -> Vec<(&'static str, FieldValue)> {
        table_fields(Self::TABLE)
            .iter()
            .map(|f| f.name)
            .zip(self.field_values())
            .collect()
    }
}

fn text(value: &Option<String>) -> FieldValue {
    value.clone().map(FieldValue::Text).unwrap_or(FieldValue::Null)
}

fn id(value: Option<i64>) -> FieldValue {
    value.map(FieldValue::Int64).unwrap_or(FieldValue::Null)
}

fn datetime(value: Option<NaiveDateTime>) -> FieldValue {
    value.map(FieldValue::DateTime).unwrap_or(FieldValue::Null)
}

fn string_set(value: &[String]) -> FieldValue {
    if value.is_empty() {
        FieldValue::Null
    } else {
        FieldValue::StringSet(value.to_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub color: i32,
    pub notes: Option<String>,
    pub date_created_utc: NaiveDateTime,
    pub date_modified_utc: NaiveDateTime,
}

impl TableRecord for Project {
    const TABLE: SupportedTable = SupportedTable::Projects;

    fn field_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int64(self.project_id),
            FieldValue::Text(self.name.clone()),
            text(&self.description),
            text(&self.location),
            FieldValue::Int32(self.color),
            text(&self.notes),
            FieldValue::DateTime(self.date_created_utc),
            FieldValue::DateTime(self.date_modified_utc),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartType {
    pub part_type_id: i64,
    pub parent_part_type_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub reference_designator: Option<String>,
    pub symbol_id: Option<String>,
    pub keywords: Vec<String>,
    pub icon: Option<String>,
    pub date_created_utc: NaiveDateTime,
}

impl TableRecord for PartType {
    const TABLE: SupportedTable = SupportedTable::PartTypes;

    fn field_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int64(self.part_type_id),
            id(self.parent_part_type_id),
            FieldValue::Text(self.name.clone()),
            text(&self.description),
            text(&self.reference_designator),
            text(&self.symbol_id),
            string_set(&self.keywords),
            text(&self.icon),
            FieldValue::DateTime(self.date_created_utc),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub part_id: i64,
    pub part_number: String,
    pub part_type_id: i64,
    pub project_id: Option<i64>,
    pub quantity: i64,
    pub low_stock_threshold: i32,
    pub cost: Decimal,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub manufacturer: Option<String>,
    pub manufacturer_part_number: Option<String>,
    pub digikey_part_number: Option<String>,
    pub mouser_part_number: Option<String>,
    pub arrow_part_number: Option<String>,
    pub datasheet_url: Option<String>,
    pub product_url: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub bin_number: Option<String>,
    pub bin_number2: Option<String>,
    pub package_type: Option<String>,
    pub mounting_type_id: i32,
    pub lowest_cost_supplier: Option<String>,
    pub lowest_cost_supplier_url: Option<String>,
    pub footprint_name: Option<String>,
    pub symbol_name: Option<String>,
    pub extension_value1: Option<String>,
    pub extension_value2: Option<String>,
    pub global_id: String,
    pub short_id: String,
    pub date_created_utc: NaiveDateTime,
    pub date_modified_utc: NaiveDateTime,
}

impl TableRecord for Part {
    const TABLE: SupportedTable = SupportedTable::Parts;

    fn field_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int64(self.part_id),
            FieldValue::Text(self.part_number.clone()),
            FieldValue::Int64(self.part_type_id),
            id(self.project_id),
            FieldValue::Int64(self.quantity),
            FieldValue::Int32(self.low_stock_threshold),
            FieldValue::Decimal(self.cost),
            text(&self.currency),
            text(&self.description),
            string_set(&self.keywords),
            text(&self.manufacturer),
            text(&self.manufacturer_part_number),
            text(&self.digikey_part_number),
            text(&self.mouser_part_number),
            text(&self.arrow_part_number),
            text(&self.datasheet_url),
            text(&self.product_url),
            text(&self.image_url),
            text(&self.location),
            text(&self.bin_number),
            text(&self.bin_number2),
            text(&self.package_type),
            FieldValue::Int32(self.mounting_type_id),
            text(&self.lowest_cost_supplier),
            text(&self.lowest_cost_supplier_url),
            text(&self.footprint_name),
            text(&self.symbol_name),
            text(&self.extension_value1),
            text(&self.extension_value2),
            FieldValue::Text(self.global_id.clone()),
            FieldValue::Text(self.short_id.clone()),
            FieldValue::DateTime(self.date_created_utc),
            FieldValue::DateTime(self.date_modified_utc),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartParametric {
    pub part_parametric_id: i64,
    pub part_id: i64,
    pub name: String,
    pub value: Option<String>,
    pub value_number: Option<f64>,
    pub units: Option<String>,
    pub digikey_value_id: Option<String>,
    pub date_created_utc: NaiveDateTime,
}

impl TableRecord for PartParametric {
    const TABLE: SupportedTable = SupportedTable::PartParametrics;

    fn field_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int64(self.part_parametric_id),
            FieldValue::Int64(self.part_id),
            FieldValue::Text(self.name.clone()),
            text(&self.value),
            self.value_number
                .map(FieldValue::Double)
                .unwrap_or(FieldValue::Null),
            text(&self.units),
            text(&self.digikey_value_id),
            FieldValue::DateTime(self.date_created_utc),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartModel {
    pub part_model_id: i64,
    pub part_id: i64,
    pub name: String,
    pub filename: Option<String>,
    pub model_type: i32,
    pub source: i32,
    pub url: Option<String>,
    pub date_created_utc: NaiveDateTime,
}

impl TableRecord for PartModel {
    const TABLE: SupportedTable = SupportedTable::PartModels;

    fn field_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int64(self.part_model_id),
            FieldValue::Int64(self.part_id),
            FieldValue::Text(self.name.clone()),
            text(&self.filename),
            FieldValue::Int32(self.model_type),
            FieldValue::Int32(self.source),
            text(&self.url),
            FieldValue::DateTime(self.date_created_utc),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub custom_field_id: i64,
    pub custom_field_type_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub is_required: bool,
    pub date_created_utc: NaiveDateTime,
}

impl TableRecord for CustomField {
    const TABLE: SupportedTable = SupportedTable::CustomFields;

    fn field_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int64(self.custom_field_id),
            FieldValue::Int32(self.custom_field_type_id),
            FieldValue::Text(self.name.clone()),
            text(&self.description),
            FieldValue::Bool(self.is_required),
            FieldValue::DateTime(self.date_created_utc),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldValue {
    pub custom_field_value_id: i64,
    pub custom_field_id: i64,
    pub custom_field_type_id: i32,
    pub record_id: i64,
    pub value: Option<String>,
    pub date_created_utc: NaiveDateTime,
}

impl TableRecord for CustomFieldValue {
    const TABLE: SupportedTable = SupportedTable::CustomFieldValues;

    fn field_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int64(self.custom_field_value_id),
            FieldValue::Int64(self.custom_field_id),
            FieldValue::Int32(self.custom_field_type_id),
            FieldValue::Int64(self.record_id),
            text(&self.value),
            FieldValue::DateTime(self.date_created_utc),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pcb {
    pub pcb_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub cost: Decimal,
    pub serial_number_format: Option<String>,
    pub last_serial_number: Option<String>,
    pub date_created_utc: NaiveDateTime,
}

impl TableRecord for Pcb {
    const TABLE: SupportedTable = SupportedTable::Pcbs;

    fn field_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int64(self.pcb_id),
            FieldValue::Text(self.name.clone()),
            text(&self.description),
            FieldValue::Int32(self.quantity),
            FieldValue::Decimal(self.cost),
            text(&self.serial_number_format),
            text(&self.last_serial_number),
            FieldValue::DateTime(self.date_created_utc),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPcbAssignment {
    pub project_pcb_assignment_id: i64,
    pub project_id: i64,
    pub pcb_id: i64,
    pub date_created_utc: NaiveDateTime,
}

impl TableRecord for ProjectPcbAssignment {
    const TABLE: SupportedTable = SupportedTable::ProjectPcbAssignments;

    fn field_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int64(self.project_pcb_assignment_id),
            FieldValue::Int64(self.project_id),
            FieldValue::Int64(self.pcb_id),
            FieldValue::DateTime(self.date_created_utc),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPartAssignment {
    pub project_part_assignment_id: i64,
    pub project_id: i64,
    pub part_id: Option<i64>,
    pub pcb_id: Option<i64>,
    pub part_name: Option<String>,
    pub quantity: i32,
    pub quantity_available: i32,
    pub notes: Option<String>,
    pub reference_id: Option<String>,
    pub schematic_reference_id: Option<String>,
    pub custom_description: Option<String>,
    pub cost: Decimal,
    pub currency: Option<String>,
    pub date_created_utc: NaiveDateTime,
}

impl TableRecord for ProjectPartAssignment {
    const TABLE: SupportedTable = SupportedTable::ProjectPartAssignments;

    fn field_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int64(self.project_part_assignment_id),
            FieldValue::Int64(self.project_id),
            id(self.part_id),
            id(self.pcb_id),
            text(&self.part_name),
            FieldValue::Int32(self.quantity),
            FieldValue::Int32(self.quantity_available),
            text(&self.notes),
            text(&self.reference_id),
            text(&self.schematic_reference_id),
            text(&self.custom_description),
            FieldValue::Decimal(self.cost),
            text(&self.currency),
            FieldValue::DateTime(self.date_created_utc),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_field_values_match_descriptor_count() {
        let project = Project {
            project_id: 1,
            name: "Widget".to_string(),
            description: None,
            location: None,
            color: 0,
            notes: None,
            date_created_utc: ts(),
            date_modified_utc: ts(),
        };
        assert_eq!(
            project.field_values().len(),
            table_fields(SupportedTable::Projects).len()
        );

        let assignment = ProjectPartAssignment {
            project_part_assignment_id: 1,
            project_id: 1,
            part_id: Some(2),
            pcb_id: None,
            part_name: None,
            quantity: 1,
            quantity_available: 0,
            notes: None,
            reference_id: None,
            schematic_reference_id: None,
            custom_description: None,
            cost: Decimal::ZERO,
            currency: None,
            date_created_utc: ts(),
        };
        assert_eq!(
            assignment.field_values().len(),
            table_fields(SupportedTable::ProjectPartAssignments).len()
        );
    }

    #[test]
    fn test_named_values_pairs_names() {
        let pcb = Pcb {
            pcb_id: 3,
            name: "Main board".to_string(),
            description: None,
            quantity: 2,
            cost: Decimal::new(1250, 2),
            serial_number_format: None,
            last_serial_number: None,
            date_created_utc: ts(),
        };
        let named = pcb.named_values();
        assert_eq!(named[0], ("PcbId", FieldValue::Int64(3)));
        assert_eq!(named[4], ("Cost", FieldValue::Decimal(Decimal::new(1250, 2))));
    }
}
