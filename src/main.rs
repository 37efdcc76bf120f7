// ==========================================
// 库存管理系统 - 命令行入口
// ==========================================
// 用法:
//   inventory-import import <db_path|-> <file>...
//   inventory-import export <db_path|-> <csv|sql> <out_dir>
//
// db_path 为 '-' 时使用默认路径（INVENTORY_IMPORT_DB_PATH 或用户数据目录）
// 导入报告以 JSON 输出到 stdout，日志输出到 stderr
// ==========================================

use anyhow::{anyhow, bail, Context};
use inventory_import::config::{ConfigManager, ImportConfigReader};
use inventory_import::db::get_default_db_path;
use inventory_import::exporter::{write_to_dir, CsvExporter, ExportError, SqlExporter};
use inventory_import::{logging, DataImporter, SqliteInventoryRepository, UserContext};
use std::path::PathBuf;
use tracing::info;

const USAGE: &str = concat!(
    "usage:\n",
    "  inventory-import import <db_path|-> <file>...\n",
    "  inventory-import export <db_path|-> <csv|sql> <out_dir>"
);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, rest) = match args.split_first() {
        Some((command, rest)) => (command.as_str(), rest),
        None => bail!("{}", USAGE),
    };

    info!(
        "{} v{} 启动: {}",
        inventory_import::APP_NAME,
        inventory_import::VERSION,
        command
    );

    match command {
        "import" => run_import(rest).await,
        "export" => run_export(rest).await,
        _ => bail!("unknown command '{}'\n{}", command, USAGE),
    }
}

fn resolve_db_path(arg: &str) -> String {
    if arg == "-" {
        get_default_db_path()
    } else {
        arg.to_string()
    }
}

async fn run_import(args: &[String]) -> anyhow::Result<()> {
    let (db_arg, files) = match args.split_first() {
        Some((db, files)) if !files.is_empty() => (db, files),
        _ => bail!("{}", USAGE),
    };
    let db_path = resolve_db_path(db_arg);
    info!("使用数据库: {}", db_path);

    let repo = SqliteInventoryRepository::new(&db_path)
        .with_context(|| format!("failed to open database {}", db_path))?;
    let config =
        ConfigManager::from_connection(repo.connection()).map_err(|e| anyhow!("{}", e))?;
    let importer = DataImporter::with_config(repo, &config).await?;

    let paths: Vec<PathBuf> = files.iter().map(PathBuf::from).collect();
    let result = importer.import_paths(&paths, &UserContext::default()).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.success {
        bail!("import failed: {} error(s)", result.errors.len());
    }
    Ok(())
}

async fn run_export(args: &[String]) -> anyhow::Result<()> {
    let (db_arg, format, out_dir) = match args {
        [db, format, out_dir] => (db, format.as_str(), PathBuf::from(out_dir)),
        _ => bail!("{}", USAGE),
    };
    let db_path = resolve_db_path(db_arg);

    let repo = SqliteInventoryRepository::new(&db_path)
        .with_context(|| format!("failed to open database {}", db_path))?;
    let options = ConfigManager::from_connection(repo.connection())
        .map_err(|e| anyhow!("{}", e))?
        .load_import_options()
        .await
        .map_err(|e| anyhow!("{}", e))?;
    let user = UserContext::default();

    let files = match format {
        "csv" => CsvExporter::new(&options).export(&repo, &user).await?,
        "sql" => vec![SqlExporter::new(&options).export(&repo, &user).await?],
        other => return Err(ExportError::UnsupportedFormat(other.to_string()).into()),
    };

    let written = write_to_dir(&out_dir, &files).await?;
    for path in &written {
        println!("{}", path.display());
    }
    Ok(())
}
