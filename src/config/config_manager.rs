// ==========================================
// 库存管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::config::import_options::ImportOptions;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取配置，缺失或格式错误时返回默认值
    fn get_parsed_or_default<T: std::str::FromStr>(
        &self,
        key: &str,
        default: T,
    ) -> ConfigResult<T> {
        let value = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match value.trim().parse::<T>() {
            Ok(parsed) => Ok(parsed),
            Err(_) => {
                tracing::warn!(config_key = key, raw_value = %value, "配置值格式错误，使用默认值");
                Ok(default)
            }
        }
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_header_marker(&self) -> ConfigResult<char> {
        let default = ImportOptions::default().header_marker;
        self.get_parsed_or_default(config_keys::HEADER_MARKER, default)
    }

    async fn get_csv_field_delimiters(&self) -> ConfigResult<Vec<char>> {
        let default = ImportOptions::default().csv_field_delimiters;
        let value = match self.get_config_value(config_keys::CSV_FIELD_DELIMITERS)? {
            Some(v) => v,
            None => return Ok(default),
        };

        // 配置格式: 直接列出分隔符字符，例如 ",;" 或 "\t"
        let delimiters: Vec<char> = value
            .replace("\\t", "\t")
            .chars()
            .filter(|c| !c.is_alphanumeric() && *c != '"' && *c != '\'')
            .collect();

        if delimiters.is_empty() {
            Ok(default)
        } else {
            Ok(delimiters)
        }
    }

    async fn get_permitted_schema_prefix(&self) -> ConfigResult<String> {
        let value = self.get_config_value(config_keys::PERMITTED_SCHEMA_PREFIX)?;
        Ok(value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| ImportOptions::default().permitted_schema_prefix))
    }

    async fn get_short_id_length(&self) -> ConfigResult<usize> {
        let default = ImportOptions::default().short_id_length;
        let length = self.get_parsed_or_default(config_keys::SHORT_ID_LENGTH, default)?;
        // UUID simple 形式只有 32 位
        Ok(length.clamp(4, 32))
    }

    async fn get_treat_zero_as_null(&self) -> ConfigResult<bool> {
        let default = ImportOptions::default().treat_zero_as_null;
        self.get_parsed_or_default(config_keys::TREAT_ZERO_AS_NULL, default)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const HEADER_MARKER: &str = "import/header_marker";
    pub const CSV_FIELD_DELIMITERS: &str = "import/csv_field_delimiters";
    pub const PERMITTED_SCHEMA_PREFIX: &str = "import/permitted_schema_prefix";
    pub const SHORT_ID_LENGTH: &str = "import/short_id_length";
    pub const TREAT_ZERO_AS_NULL: &str = "import/treat_zero_as_null";
}
