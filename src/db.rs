// ==========================================
// 库存管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 提供库存表与配置表的建表语句（参考写入端与测试共用）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开内存数据库（测试/临时导入使用）
pub fn open_in_memory_connection() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 默认数据库路径
///
/// # 规则
/// - 环境变量 INVENTORY_IMPORT_DB_PATH 优先
/// - 否则为用户数据目录下 inventory-import/inventory.db
/// - 无法获取数据目录时回退到当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("INVENTORY_IMPORT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./inventory.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("inventory-import");
        // 目录创建失败时 Connection::open 会给出明确错误
        let _ = std::fs::create_dir_all(&dir);
        path = dir.join("inventory.db");
    }

    path.to_string_lossy().to_string()
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL DEFAULT 'global',
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS Projects (
    ProjectId INTEGER PRIMARY KEY AUTOINCREMENT,
    Name TEXT NOT NULL,
    Description TEXT,
    Location TEXT,
    Color INTEGER NOT NULL DEFAULT 0,
    Notes TEXT,
    DateCreatedUtc TEXT NOT NULL,
    DateModifiedUtc TEXT NOT NULL,
    UserId INTEGER,
    OrganizationId INTEGER
);

CREATE TABLE IF NOT EXISTS PartTypes (
    PartTypeId INTEGER PRIMARY KEY AUTOINCREMENT,
    ParentPartTypeId INTEGER REFERENCES PartTypes(PartTypeId),
    Name TEXT NOT NULL,
    Description TEXT,
    ReferenceDesignator TEXT,
    SymbolId TEXT,
    Keywords TEXT,
    Icon TEXT,
    DateCreatedUtc TEXT NOT NULL,
    UserId INTEGER,
    OrganizationId INTEGER
);

CREATE TABLE IF NOT EXISTS Parts (
    PartId INTEGER PRIMARY KEY AUTOINCREMENT,
    PartNumber TEXT NOT NULL,
    PartTypeId INTEGER NOT NULL REFERENCES PartTypes(PartTypeId),
    ProjectId INTEGER REFERENCES Projects(ProjectId),
    Quantity INTEGER NOT NULL DEFAULT 0,
    LowStockThreshold INTEGER NOT NULL DEFAULT 0,
    Cost TEXT NOT NULL DEFAULT '0',
    Currency TEXT,
    Description TEXT,
    Keywords TEXT,
    Manufacturer TEXT,
    ManufacturerPartNumber TEXT,
    DigiKeyPartNumber TEXT,
    MouserPartNumber TEXT,
    ArrowPartNumber TEXT,
    DatasheetUrl TEXT,
    ProductUrl TEXT,
    ImageUrl TEXT,
    Location TEXT,
    BinNumber TEXT,
    BinNumber2 TEXT,
    PackageType TEXT,
    MountingTypeId INTEGER NOT NULL DEFAULT 0,
    LowestCostSupplier TEXT,
    LowestCostSupplierUrl TEXT,
    FootprintName TEXT,
    SymbolName TEXT,
    ExtensionValue1 TEXT,
    ExtensionValue2 TEXT,
    GlobalId TEXT NOT NULL,
    ShortId TEXT NOT NULL,
    DateCreatedUtc TEXT NOT NULL,
    DateModifiedUtc TEXT NOT NULL,
    UserId INTEGER,
    OrganizationId INTEGER
);

CREATE TABLE IF NOT EXISTS PartParametrics (
    PartParametricId INTEGER PRIMARY KEY AUTOINCREMENT,
    PartId INTEGER NOT NULL REFERENCES Parts(PartId),
    Name TEXT NOT NULL,
    Value TEXT,
    ValueNumber REAL,
    Units TEXT,
    DigiKeyValueId TEXT,
    DateCreatedUtc TEXT NOT NULL,
    UserId INTEGER,
    OrganizationId INTEGER
);

CREATE TABLE IF NOT EXISTS PartModels (
    PartModelId INTEGER PRIMARY KEY AUTOINCREMENT,
    PartId INTEGER NOT NULL REFERENCES Parts(PartId),
    Name TEXT NOT NULL,
    Filename TEXT,
    ModelType INTEGER NOT NULL DEFAULT 0,
    Source INTEGER NOT NULL DEFAULT 0,
    Url TEXT,
    DateCreatedUtc TEXT NOT NULL,
    UserId INTEGER,
    OrganizationId INTEGER
);

CREATE TABLE IF NOT EXISTS CustomFields (
    CustomFieldId INTEGER PRIMARY KEY AUTOINCREMENT,
    CustomFieldTypeId INTEGER NOT NULL,
    Name TEXT NOT NULL,
    Description TEXT,
    IsRequired INTEGER NOT NULL DEFAULT 0,
    DateCreatedUtc TEXT NOT NULL,
    UserId INTEGER,
    OrganizationId INTEGER
);

CREATE TABLE IF NOT EXISTS CustomFieldValues (
    CustomFieldValueId INTEGER PRIMARY KEY AUTOINCREMENT,
    CustomFieldId INTEGER NOT NULL REFERENCES CustomFields(CustomFieldId),
    CustomFieldTypeId INTEGER NOT NULL,
    RecordId INTEGER NOT NULL,
    Value TEXT,
    DateCreatedUtc TEXT NOT NULL,
    UserId INTEGER,
    OrganizationId INTEGER
);

CREATE TABLE IF NOT EXISTS Pcbs (
    PcbId INTEGER PRIMARY KEY AUTOINCREMENT,
    Name TEXT NOT NULL,
    Description TEXT,
    Quantity INTEGER NOT NULL DEFAULT 0,
    Cost TEXT NOT NULL DEFAULT '0',
    SerialNumberFormat TEXT,
    LastSerialNumber TEXT,
    DateCreatedUtc TEXT NOT NULL,
    UserId INTEGER,
    OrganizationId INTEGER
);

CREATE TABLE IF NOT EXISTS ProjectPcbAssignments (
    ProjectPcbAssignmentId INTEGER PRIMARY KEY AUTOINCREMENT,
    ProjectId INTEGER NOT NULL REFERENCES Projects(ProjectId),
    PcbId INTEGER NOT NULL REFERENCES Pcbs(PcbId),
    DateCreatedUtc TEXT NOT NULL,
    UserId INTEGER,
    OrganizationId INTEGER
);

CREATE TABLE IF NOT EXISTS ProjectPartAssignments (
    ProjectPartAssignmentId INTEGER PRIMARY KEY AUTOINCREMENT,
    ProjectId INTEGER NOT NULL REFERENCES Projects(ProjectId),
    PartId INTEGER REFERENCES Parts(PartId),
    PcbId INTEGER REFERENCES Pcbs(PcbId),
    PartName TEXT,
    Quantity INTEGER NOT NULL DEFAULT 0,
    QuantityAvailable INTEGER NOT NULL DEFAULT 0,
    Notes TEXT,
    ReferenceId TEXT,
    SchematicReferenceId TEXT,
    CustomDescription TEXT,
    Cost TEXT NOT NULL DEFAULT '0',
    Currency TEXT,
    DateCreatedUtc TEXT NOT NULL,
    UserId INTEGER,
    OrganizationId INTEGER
);
"#;
