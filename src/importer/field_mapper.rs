// ==========================================
// 库存管理系统 - 字段映射器
// ==========================================
// 职责: 源行（表头 + 单元格）→ 带类型字段表 FieldMap
// 规则: 按字段描述的出现规则处理缺失 / 非法值
// - Identity: 缺失/非法取默认值
// - Required: 缺失/非法为行错误
// - Defaulted: 缺失取类型默认值，非法为行错误
// - Optional: 缺失/非法取 Null（非法附带行警告）
// ==========================================

use crate::domain::schema::{table_fields, FieldPresence};
use crate::domain::types::{FieldValue, SupportedTable};
use crate::importer::error::{ImportError, ImportOutcome};
use crate::importer::header::Header;
use crate::importer::tokenizer::Cell;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

// ==========================================
// FieldMap - 带类型字段表
// ==========================================
// 映射完成后目标表的每个声明字段都存在
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    values: BTreeMap<&'static str, FieldValue>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &'static str, value: FieldValue) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> &FieldValue {
        self.values.get(name).unwrap_or(&FieldValue::Null)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn int64(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            FieldValue::Int64(v) => Some(*v),
            FieldValue::Int32(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn int32(&self, name: &str) -> Option<i32> {
        match self.get(name) {
            FieldValue::Int32(v) => Some(*v),
            FieldValue::Int64(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn double(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            FieldValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn decimal(&self, name: &str) -> Decimal {
        match self.get(name) {
            FieldValue::Decimal(v) => *v,
            _ => Decimal::ZERO,
        }
    }

    pub fn bool(&self, name: &str) -> bool {
        matches!(self.get(name), FieldValue::Bool(true))
    }

    pub fn text(&self, name: &str) -> Option<String> {
        match self.get(name) {
            FieldValue::Text(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// 必填文本；缺失或为空即行错误
    pub fn require_text(&self, name: &str) -> ImportOutcome<String> {
        match self.text(name) {
            Some(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ImportError::RequiredField(name.to_string())),
        }
    }

    pub fn datetime(&self, name: &str) -> Option<NaiveDateTime> {
        match self.get(name) {
            FieldValue::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    pub fn string_set(&self, name: &str) -> Vec<String> {
        match self.get(name) {
            FieldValue::StringSet(v) => v.clone(),
            _ => Vec::new(),
        }
    }
}

/// 单行映射结果
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    pub fields: FieldMap,
    pub warnings: Vec<String>,
}

/// 将一行源数据映射为目标表的带类型字段表
///
/// # 参数
/// - table: 目标表
/// - header: 源表头
/// - cells: 该行单元格（已去引号）
///
/// # 返回
/// - Ok(MappedRow): 字段表 + 行警告
/// - Err: 必填字段缺失 / 非空字段无法转换（行级错误）
pub fn map_row(table: SupportedTable, header: &Header, cells: &[Cell]) -> ImportOutcome<MappedRow> {
    let mut fields = FieldMap::new();
    let mut warnings = Vec::new();

    for descriptor in table_fields(table) {
        let name = descriptor.name;
        let value = match header.try_get_value(cells, name, descriptor.field_type) {
            Ok(Some(value)) => {
                if descriptor.presence == FieldPresence::Required && value.is_null() {
                    return Err(ImportError::RequiredField(name.to_string()));
                }
                value
            }
            Ok(None) => match descriptor.presence {
                FieldPresence::Required => return Err(ImportError::RequiredField(name.to_string())),
                FieldPresence::Identity | FieldPresence::Defaulted => {
                    descriptor.field_type.default_value()
                }
                FieldPresence::Optional => FieldValue::Null,
            },
            Err(err) => match descriptor.presence {
                FieldPresence::Required | FieldPresence::Defaulted => return Err(err.into()),
                FieldPresence::Identity => {
                    warnings.push(format!("{}; the default was used", err));
                    descriptor.field_type.default_value()
                }
                FieldPresence::Optional => {
                    warnings.push(format!("{}; the value was treated as null", err));
                    FieldValue::Null
                }
            },
        };
        fields.insert(name, value);
    }

    Ok(MappedRow { fields, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::tokenizer::{split_fields, unquote};

    fn row(header: &str, data: &str) -> (Header, Vec<Cell>) {
        let header = Header::from_delimited_row("test.csv", header, '#', &[',']).unwrap();
        let cells = split_fields(data, &[',']).iter().map(|f| unquote(f)).collect();
        (header, cells)
    }

    #[test]
    fn test_every_declared_field_present() {
        let (header, cells) = row("#Name", "\"Widget\"");
        let mapped = map_row(SupportedTable::Projects, &header, &cells).unwrap();

        assert_eq!(mapped.fields.len(), table_fields(SupportedTable::Projects).len());
        assert_eq!(mapped.fields.text("Name"), Some("Widget".to_string()));
        assert_eq!(mapped.fields.int32("Color"), Some(0));
        assert_eq!(mapped.fields.int64("ProjectId"), Some(0));
        assert_eq!(mapped.fields.get("Description"), &FieldValue::Null);
        assert!(mapped.warnings.is_empty());
    }

    #[test]
    fn test_required_field_missing() {
        let (header, cells) = row("#ProjectId,Description", "1,\"x\"");
        let err = map_row(SupportedTable::Projects, &header, &cells).unwrap_err();
        assert!(matches!(err, ImportError::RequiredField(ref f) if f == "Name"));
    }

    #[test]
    fn test_required_field_null() {
        let (header, cells) = row("#ProjectId,Name", "1,null");
        assert!(map_row(SupportedTable::Projects, &header, &cells).is_err());
    }

    #[test]
    fn test_defaulted_field_invalid_is_row_error() {
        let (header, cells) = row("#PartNumber,Quantity", "\"R1\",\"many\"");
        let err = map_row(SupportedTable::Parts, &header, &cells).unwrap_err();
        assert!(matches!(err, ImportError::Coercion(_)));
    }

    #[test]
    fn test_optional_field_invalid_becomes_null_with_warning() {
        let (header, cells) = row("#PartNumber,ProjectId", "\"R1\",\"abc\"");
        let mapped = map_row(SupportedTable::Parts, &header, &cells).unwrap();
        assert_eq!(mapped.fields.int64("ProjectId"), None);
        assert_eq!(mapped.warnings.len(), 1);
        assert!(mapped.warnings[0].contains("ProjectId"));
    }

    #[test]
    fn test_accessors() {
        let (header, cells) = row(
            "#PartNumber,Cost,Keywords,DateCreatedUtc",
            "\"R1\",\"0.25\",\"res smd\",\"2024-01-01 00:00:00\"",
        );
        let fields = map_row(SupportedTable::Parts, &header, &cells).unwrap().fields;

        assert_eq!(fields.decimal("Cost"), Decimal::new(25, 2));
        assert_eq!(fields.string_set("Keywords"), vec!["res", "smd"]);
        assert!(fields.datetime("DateCreatedUtc").is_some());
        assert!(fields.require_text("Manufacturer").is_err());
    }
}
