// ==========================================
// 库存管理系统 - 导入选项
// ==========================================
// 职责: 导入流程可调参数及默认值
// ==========================================

use serde::{Deserialize, Serialize};

/// 导入选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// CSV 表头行的前导标记
    pub header_marker: char,
    /// CSV 行内字段分隔符
    pub csv_field_delimiters: Vec<char>,
    /// 允许出现在表名/文件名前的 schema 前缀
    pub permitted_schema_prefix: String,
    /// 生成短 ID 的长度
    pub short_id_length: usize,
    /// 外键值 0 视为“无引用”
    pub treat_zero_as_null: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            header_marker: '#',
            csv_field_delimiters: vec![',', ';'],
            permitted_schema_prefix: "dbo".to_string(),
            short_id_length: 10,
            treat_zero_as_null: true,
        }
    }
}
