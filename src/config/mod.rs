// ==========================================
// 库存管理系统 - 配置层
// ==========================================
// 职责: 导入选项管理,支持 config_kv 覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config_trait;
pub mod import_options;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImportConfigReader;
pub use import_options::ImportOptions;
