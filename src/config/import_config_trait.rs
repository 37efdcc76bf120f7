// ==========================================
// 库存管理系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::import_options::ImportOptions;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取 CSV 表头前导标记
    ///
    /// # 默认值
    /// - '#'
    async fn get_header_marker(&self) -> Result<char, Box<dyn Error + Send + Sync>>;

    /// 获取 CSV 字段分隔符
    ///
    /// # 默认值
    /// - [',', ';']
    async fn get_csv_field_delimiters(&self) -> Result<Vec<char>, Box<dyn Error + Send + Sync>>;

    /// 获取允许的 schema 前缀
    ///
    /// # 默认值
    /// - "dbo"
    async fn get_permitted_schema_prefix(&self) -> Result<String, Box<dyn Error + Send + Sync>>;

    /// 获取短 ID 长度
    ///
    /// # 默认值
    /// - 10
    async fn get_short_id_length(&self) -> Result<usize, Box<dyn Error + Send + Sync>>;

    /// 外键值 0 是否视为无引用
    ///
    /// # 默认值
    /// - true
    async fn get_treat_zero_as_null(&self) -> Result<bool, Box<dyn Error + Send + Sync>>;

    /// 汇总为 ImportOptions
    async fn load_import_options(&self) -> Result<ImportOptions, Box<dyn Error + Send + Sync>> {
        Ok(ImportOptions {
            header_marker: self.get_header_marker().await?,
            csv_field_delimiters: self.get_csv_field_delimiters().await?,
            permitted_schema_prefix: self.get_permitted_schema_prefix().await?,
            short_id_length: self.get_short_id_length().await?,
            treat_zero_as_null: self.get_treat_zero_as_null().await?,
        })
    }
}
