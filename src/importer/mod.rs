// ==========================================
// 库存管理系统 - 数据导入层
// ==========================================
// 职责: CSV / 电子表格 / SQL INSERT 导入，主键重映射
// 流程: 适配器解析 → 字段映射 → 外键解析 → 写入端
// ==========================================

pub mod csv_importer;
pub mod data_importer;
pub mod error;
pub mod excel_importer;
pub mod field_mapper;
pub mod header;
pub mod key_tracker;
pub mod record_builder;
pub mod session;
pub mod source_adapter;
pub mod sql_importer;
pub mod tokenizer;

// 重导出核心类型
pub use csv_importer::CsvDataImporter;
pub use data_importer::DataImporter;
pub use error::{CoercionError, ImportError, ImportOutcome, KeyMappingError};
pub use excel_importer::ExcelDataImporter;
pub use field_mapper::{map_row, FieldMap, MappedRow};
pub use header::Header;
pub use key_tracker::{KeyMapping, LookupOptions, TemporaryKeyTracker};
pub use record_builder::{RecordBuilder, RowOutcome};
pub use session::ImportSession;
pub use source_adapter::{LoadedSource, SourceAdapter, SourceFormat, SourceRow, TableRows};
pub use sql_importer::SqlDataImporter;
