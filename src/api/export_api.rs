// ==========================================
// TPM/MTO PRO - 导出 API
// ==========================================
// 职责: 历史记录 → 扁平行 / CSV 文件
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::tracker_config::TrackerConfig;
use crate::engine::export::{export_rows, write_csv, ExportRow};
use crate::engine::history::{HistoryEngine, HistoryFilter};
use crate::i18n::Labels;
use crate::perf::PerfGuard;
use crate::repository::live_fleet::LiveFleet;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::sync::Arc;

pub struct ExportApi {
    fleet: Arc<LiveFleet>,
    labels: Labels,
}

impl ExportApi {
    pub fn new(fleet: Arc<LiveFleet>, config: &TrackerConfig) -> Self {
        Self {
            fleet,
            labels: Labels::for_locale(&config.locale),
        }
    }

    /// 导出行 (时间降序)
    pub fn rows(&self, filter: &HistoryFilter) -> Vec<ExportRow> {
        let entries = HistoryEngine::new().history(&self.fleet.snapshot(), filter, &self.labels);
        export_rows(&entries, &self.labels)
    }

    /// 写出 CSV, 返回行数
    pub fn write_csv<W: io::Write>(&self, filter: &HistoryFilter, writer: W) -> ApiResult<usize> {
        let _perf = PerfGuard::new("export_csv");
        let rows = self.rows(filter);
        write_csv(writer, &rows, &self.labels).map_err(|e| ApiError::InternalError(format!("CSV 写出失败: {}", e)))?;
        Ok(rows.len())
    }

    pub fn export_to_file(&self, filter: &HistoryFilter, path: &Path) -> ApiResult<usize> {
        let file = File::create(path)
            .map_err(|e| ApiError::InvalidInput(format!("无法创建文件 {}: {}", path.display(), e)))?;
        let count = self.write_csv(filter, BufWriter::new(file))?;
        tracing::info!(path = %path.display(), rows = count, "记录已导出");
        Ok(count)
    }
}
