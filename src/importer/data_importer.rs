// ==========================================
// 库存管理系统 - 数据导入入口
// ==========================================
// 职责: 选择格式适配器，驱动导入会话，汇总导入报告
// 流程: 读取 → 适配器解析（致命错误在此阶段暴露）→ 会话逐行写入
// 批量: 按 csv → 电子表格 → sql 顺序处理各格式组，共享同一会话
// ==========================================

use crate::config::{ImportConfigReader, ImportOptions};
use crate::domain::import_result::ImportResult;
use crate::domain::types::UserContext;
use crate::importer::csv_importer::CsvDataImporter;
use crate::importer::error::{ImportError, ImportOutcome};
use crate::importer::excel_importer::ExcelDataImporter;
use crate::importer::session::ImportSession;
use crate::importer::source_adapter::{LoadedSource, SourceAdapter, SourceFormat};
use crate::importer::sql_importer::SqlDataImporter;
use crate::repository::RecordSink;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{error, info, instrument, warn};

// ==========================================
// DataImporter
// ==========================================
pub struct DataImporter<S>
where
    S: RecordSink,
{
    // 记录写入端
    sink: S,

    // 导入选项
    options: ImportOptions,
}

impl<S> DataImporter<S>
where
    S: RecordSink,
{
    /// 创建导入器
    ///
    /// # 参数
    /// - sink: 记录写入端
    /// - options: 导入选项
    pub fn new(sink: S, options: ImportOptions) -> Self {
        Self { sink, options }
    }

    /// 从配置读取器加载导入选项后创建导入器
    pub async fn with_config<C>(sink: S, config: &C) -> ImportOutcome<Self>
    where
        C: ImportConfigReader,
    {
        let options = config
            .load_import_options()
            .await
            .map_err(|e| {
                ImportError::Other(anyhow::anyhow!("failed to load import options: {}", e))
            })?;
        Ok(Self::new(sink, options))
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn adapter(&self, format: SourceFormat) -> Box<dyn SourceAdapter> {
        match format {
            SourceFormat::Csv => Box::new(CsvDataImporter::new(&self.options)),
            SourceFormat::Spreadsheet => Box::new(ExcelDataImporter::new(&self.options)),
            SourceFormat::Sql => Box::new(SqlDataImporter::new(&self.options)),
        }
    }

    /// 导入 CSV 文件（每表一个文件）
    ///
    /// # 返回
    /// - Ok(ImportResult): 导入报告（含行级警告/错误）
    /// - Err: 致命错误（含扩展名不是 .csv 的源文件），未写入任何行
    pub async fn import_csv(
        &self,
        sources: &[LoadedSource],
        user: &UserContext,
    ) -> ImportOutcome<ImportResult> {
        self.import_format(SourceFormat::Csv, sources, user).await
    }

    /// 导入电子表格（每表一个工作表）
    pub async fn import_spreadsheet(
        &self,
        sources: &[LoadedSource],
        user: &UserContext,
    ) -> ImportOutcome<ImportResult> {
        self.import_format(SourceFormat::Spreadsheet, sources, user).await
    }

    /// 导入 SQL INSERT 脚本
    pub async fn import_sql(
        &self,
        sources: &[LoadedSource],
        user: &UserContext,
    ) -> ImportOutcome<ImportResult> {
        self.import_format(SourceFormat::Sql, sources, user).await
    }

    #[instrument(skip(self, sources, user), fields(files = sources.len()))]
    async fn import_format(
        &self,
        format: SourceFormat,
        sources: &[LoadedSource],
        user: &UserContext,
    ) -> ImportOutcome<ImportResult> {
        info!(format = %format, "开始导入");

        // 扩展名与请求格式不符: 整次中止
        if let Some(source) = sources
            .iter()
            .find(|s| SourceFormat::from_file_name(&s.file_name) != Some(format))
        {
            error!(format = %format, file = %source.file_name, "源文件格式不符");
            return Err(ImportError::UnsupportedFormat {
                file: source.file_name.clone(),
                expected: format.to_string(),
            });
        }

        let mut session = ImportSession::new(&self.sink, user, &self.options);
        let blocks = self
            .adapter(format)
            .read_tables(sources, session.report_mut())
            .map_err(|e| {
                error!(format = %format, error = %e, "导入中止");
                e
            })?;

        session.import_blocks(blocks).await;
        session.mark_completed();
        let result = session.finish();

        info!(
            total = result.total_rows_imported,
            warnings = result.warnings.len(),
            errors = result.errors.len(),
            "导入完成"
        );
        Ok(result)
    }

    /// 批量导入（按扩展名分组）
    ///
    /// # 说明
    /// - 各格式组按 csv → 电子表格 → sql 顺序处理，共享一个主键映射表
    /// - 某组的致命错误记为该组的报告错误，其它组继续
    /// - success: 至少一个格式组完整处理
    #[instrument(skip_all, fields(files = sources.len()))]
    pub async fn import_batch(
        &self,
        sources: Vec<LoadedSource>,
        user: &UserContext,
    ) -> ImportResult {
        let mut session = ImportSession::new(&self.sink, user, &self.options);

        let mut groups: BTreeMap<SourceFormat, Vec<LoadedSource>> = BTreeMap::new();
        for source in sources {
            match SourceFormat::from_file_name(&source.file_name) {
                Some(format) => groups.entry(format).or_default().push(source),
                None => {
                    warn!(file = %source.file_name, "不支持的文件格式，跳过");
                    session.report_mut().add_warning(format!(
                        "{}: unsupported file format; skipped.",
                        source.file_name
                    ));
                }
            }
        }

        for format in SourceFormat::BATCH_ORDER {
            let group = match groups.get(&format) {
                Some(group) => group,
                None => continue,
            };

            info!(format = %format, files = group.len(), "处理格式组");
            match self.adapter(format).read_tables(group, session.report_mut()) {
                Ok(blocks) => {
                    session.import_blocks(blocks).await;
                    session.mark_completed();
                }
                Err(e) => {
                    error!(format = %format, error = %e, "格式组导入中止");
                    session
                        .report_mut()
                        .add_error(format!("{} import aborted: {}", format, e));
                }
            }
        }

        session.finish()
    }

    /// 从磁盘读取文件后批量导入
    ///
    /// # 返回
    /// - Err(FileRead): 任一文件无法读取（未写入任何行）
    pub async fn import_paths<P>(
        &self,
        paths: &[P],
        user: &UserContext,
    ) -> ImportOutcome<ImportResult>
    where
        P: AsRef<Path> + Sync,
    {
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let content = tokio::fs::read(path)
                .await
                .map_err(|e| ImportError::FileRead(format!("{}: {}", path.display(), e)))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            sources.push(LoadedSource::new(file_name, content));
        }

        Ok(self.import_batch(sources, user).await)
    }
}
