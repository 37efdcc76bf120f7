// ==========================================
// 库存管理系统 - 数据导入/导出核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 库存关系数据的跨库迁移（CSV / 电子表格 / SQL INSERT）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与表结构
pub mod domain;

// 数据仓储层 - 记录写入/读取
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 导出层 - 导入端可读的格式
pub mod exporter;

// 配置层 - 导入选项
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CustomFieldType, FieldType, FieldValue, SupportedTable, UserContext};

// 领域实体
pub use domain::{
    CustomField, CustomFieldValue, ImportResult, Part, PartModel, PartParametric, PartType, Pcb,
    Project, ProjectPartAssignment, ProjectPcbAssignment,
};

// 导入
pub use importer::{DataImporter, ImportError, LoadedSource, SourceFormat, TemporaryKeyTracker};

// 导出
pub use exporter::{CsvExporter, ExportError, ExportedFile, SqlExporter};

// 仓储
pub use repository::{RecordSink, RecordSource, SqliteInventoryRepository};

// 配置
pub use config::{ConfigManager, ImportOptions};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "库存管理系统";
