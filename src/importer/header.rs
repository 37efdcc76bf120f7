// ==========================================
// 库存管理系统 - 表头与单元格类型转换
// ==========================================
// 职责: 列名 → 列位置（大小写不敏感），单元格文本 → 带类型字段值
// 约定: 未知列名 = 值缺失（不是错误）
// ==========================================

use crate::domain::types::{FieldType, FieldValue};
use crate::importer::error::{CoercionError, ImportError, ImportOutcome};
use crate::importer::tokenizer::{split_fields, unquote, Cell};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

/// 支持的日期时间格式（按顺序尝试）
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
];

/// 仅日期格式（时间取 00:00:00）
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderColumn {
    pub name: String,
    pub position: usize,
}

// ==========================================
// Header - 有序列名表
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    columns: Vec<HeaderColumn>,
}

impl Header {
    /// 从带标记的分隔行解析表头（CSV 第一行）
    ///
    /// # 参数
    /// - origin: 来源描述（文件名），用于错误信息
    /// - row: 原始表头行
    /// - marker: 表头前导标记（默认 '#'）
    /// - delimiters: 字段分隔符
    pub fn from_delimited_row(
        origin: &str,
        row: &str,
        marker: char,
        delimiters: &[char],
    ) -> ImportOutcome<Header> {
        let body = row.trim_start().strip_prefix(marker).ok_or_else(|| {
            ImportError::InvalidHeader {
                origin: origin.to_string(),
                message: format!("the header row must start with '{}'", marker),
            }
        })?;

        let header = Header::from_names(split_fields(body, delimiters));
        if header.columns.iter().all(|c| c.name.is_empty()) {
            return Err(ImportError::InvalidHeader {
                origin: origin.to_string(),
                message: "the header row names no columns".to_string(),
            });
        }

        Ok(header)
    }

    /// 从列名序列构建表头（工作表首行 / SQL 列清单）
    pub fn from_names<I, S>(names: I) -> Header
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns = names
            .into_iter()
            .enumerate()
            .map(|(position, name)| HeaderColumn {
                name: clean_column_name(name.as_ref()),
                position,
            })
            .collect();

        Header { columns }
    }

    /// 列位置（大小写不敏感的精确匹配）
    pub fn get_header_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.position)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// 读取并转换一个单元格
    ///
    /// # 返回
    /// - Ok(None): 表头中没有该列（值缺失）
    /// - Ok(Some(v)): 转换后的值；null 字面量/空单元格已按类型取默认值
    /// - Err(CoercionError): 单元格存在但无法转换为目标类型
    pub fn try_get_value(
        &self,
        cells: &[Cell],
        name: &str,
        field_type: FieldType,
    ) -> Result<Option<FieldValue>, CoercionError> {
        let cell = match self.get_header_index(name).and_then(|idx| cells.get(idx)) {
            Some(cell) => cell,
            None => return Ok(None),
        };

        coerce_cell(cell, name, field_type).map(Some)
    }
}

/// 去掉列名两侧的引号与方括号
fn clean_column_name(raw: &str) -> String {
    let name = unquote(raw).text;
    let name = name.trim();
    name.strip_prefix('[')
        .and_then(|n| n.strip_suffix(']'))
        .unwrap_or(name)
        .trim()
        .to_string()
}

/// 单元格文本 → 字段值
pub fn coerce_cell(
    cell: &Cell,
    name: &str,
    field_type: FieldType,
) -> Result<FieldValue, CoercionError> {
    let raw = cell.text.as_str();

    let is_null_literal = !cell.quoted && raw.trim().eq_ignore_ascii_case("null");
    let is_blank = !cell.quoted && raw.trim().is_empty();
    if is_null_literal || is_blank {
        return Ok(match field_type {
            FieldType::Text => FieldValue::Null,
            other => other.default_value(),
        });
    }

    let invalid = || CoercionError {
        field: name.to_string(),
        field_type,
        value: raw.to_string(),
    };
    let trimmed = raw.trim();

    let value = match field_type {
        FieldType::Text => FieldValue::Text(raw.to_string()),
        FieldType::Int64 => FieldValue::Int64(trimmed.parse().map_err(|_| invalid())?),
        FieldType::Int32 => FieldValue::Int32(trimmed.parse().map_err(|_| invalid())?),
        FieldType::Bool => FieldValue::Bool(parse_bool(trimmed).ok_or_else(invalid)?),
        FieldType::Double => FieldValue::Double(trimmed.parse().map_err(|_| invalid())?),
        FieldType::Decimal => FieldValue::Decimal(parse_decimal(trimmed).ok_or_else(invalid)?),
        FieldType::DateTime => FieldValue::DateTime(parse_datetime(trimmed).ok_or_else(invalid)?),
        FieldType::StringSet => FieldValue::StringSet(split_string_set(raw)),
    };

    Ok(value)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_decimal(value: &str) -> Option<Decimal> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// 解析日期时间（支持若干常见导出格式）
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// 关键字集合: 按逗号/空格切分，丢弃空项
pub fn split_string_set(value: &str) -> Vec<String> {
    value
        .split([',', ' '])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
