// ==========================================
// TPM/MTO PRO - 车队 KPI 引擎
// ==========================================
// 职责: 合规率 / 停机合计 / 效率 / 可用性分布
// 输入: 车队快照 + 设备过滤 + 可选记录日期范围
// 红线: 除零按 100% 处理; 所有百分比夹在 [0, 100]
//       停用设备不计入任何 KPI
// ==========================================

use crate::config::tracker_config::DEFAULT_NOMINAL_MONTH_DAYS;
use crate::domain::fleet::{FleetIndex, FleetSnapshot};
use crate::domain::record::MaintenanceRecord;
use crate::engine::due_status::DueStatusEvaluator;
use crate::engine::scope::AssetFilter;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

const MINUTES_PER_DAY: u64 = 24 * 60;

/// 四舍五入的百分比, 分母为 0 时视为 100%
pub fn rounded_percent(numerator: f64, denominator: f64) -> u32 {
    if denominator <= 0.0 {
        return 100;
    }
    let pct = (100.0 * numerator / denominator).clamp(0.0, 100.0);
    pct.round() as u32
}

/// KPI 查询条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiQuery {
    pub asset_filter: AssetFilter,
    /// 记录日期范围 (含首尾); None = 全部历史
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

/// 车队 KPI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetKpi {
    /// 范围内非停用设备数
    pub total_assets: usize,
    /// 范围内记录数
    pub total_tasks: usize,
    pub total_downtime_minutes: u64,
    pub compliant_assets: usize,
    /// 合规率 (%)
    pub compliance_rate: u32,
    /// 名义可用分钟 = 设备数 × 名义月天数 × 1440
    pub available_minutes: u64,
    /// 效率 (%)
    pub efficiency: u32,
}

/// 可用性分布 (管理视图饼图)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySplit {
    pub up_to_date: usize,
    pub overdue: usize,
}

// ==========================================
// KpiEngine - 车队 KPI 引擎
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct KpiEngine {
    evaluator: DueStatusEvaluator,
    nominal_month_days: u32,
}

impl Default for KpiEngine {
    fn default() -> Self {
        Self::new(DEFAULT_NOMINAL_MONTH_DAYS)
    }
}

impl KpiEngine {
    /// # 参数
    /// - `nominal_month_days`: 效率计算的名义月天数 (固定口径, 与查询区间无关)
    pub fn new(nominal_month_days: u32) -> Self {
        Self {
            evaluator: DueStatusEvaluator::new(),
            nominal_month_days,
        }
    }

    /// 计算车队 KPI
    #[instrument(skip_all, fields(assets = snapshot.assets.len(), records = snapshot.records.len()))]
    pub fn fleet_kpi(&self, snapshot: &FleetSnapshot, query: &KpiQuery, today: NaiveDate) -> FleetKpi {
        // 1. 范围内设备 (排除停用)
        let assets: Vec<_> = snapshot
            .assets
            .iter()
            .filter(|a| !a.is_stopped() && query.asset_filter.matches(&a.id))
            .collect();
        let total_assets = assets.len();

        // 2. 合规设备: 两条轨道都未逾期
        let compliant_assets = assets
            .iter()
            .filter(|a| self.evaluator.is_compliant(a, today))
            .count();

        // 3. 范围内记录
        let index = snapshot.index();
        let records = records_in_scope(snapshot, &index, query);
        let total_tasks = records.len();
        let total_downtime_minutes: u64 = records
            .iter()
            .map(|r| u64::from(r.downtime_minutes))
            .sum();

        // 4. 效率 (名义月产能)
        let available_minutes =
            total_assets as u64 * u64::from(self.nominal_month_days) * MINUTES_PER_DAY;
        let efficiency = rounded_percent(
            available_minutes.saturating_sub(total_downtime_minutes) as f64,
            available_minutes as f64,
        );

        let kpi = FleetKpi {
            total_assets,
            total_tasks,
            total_downtime_minutes,
            compliant_assets,
            compliance_rate: rounded_percent(compliant_assets as f64, total_assets as f64),
            available_minutes,
            efficiency,
        };
        tracing::debug!(?kpi, "车队KPI计算完成");
        kpi
    }

    /// 可用性分布: 非停用设备中 "按期" 与 "有逾期轨道" 的数量
    pub fn availability(&self, snapshot: &FleetSnapshot, today: NaiveDate) -> AvailabilitySplit {
        let (overdue, up_to_date): (Vec<_>, Vec<_>) = snapshot
            .assets
            .iter()
            .filter(|a| !a.is_stopped())
            .partition(|a| self.evaluator.has_missed_track(a, today));

        AvailabilitySplit {
            up_to_date: up_to_date.len(),
            overdue: overdue.len(),
        }
    }
}

/// KPI 范围内的记录
///
/// 设备已停用的记录排除; 设备已删除的记录仅在 ALL 过滤下保留
pub(crate) fn records_in_scope<'a>(
    snapshot: &'a FleetSnapshot,
    index: &FleetIndex<'_>,
    query: &KpiQuery,
) -> Vec<&'a MaintenanceRecord> {
    snapshot
        .records
        .iter()
        .filter(|r| query.asset_filter.matches(&r.asset_id))
        .filter(|r| index.asset(&r.asset_id).map_or(true, |a| !a.is_stopped()))
        .filter(|r| match query.date_range {
            Some((from, to)) => {
                let d = r.timestamp.date();
                d >= from && d <= to
            }
            None => true,
        })
        .collect()
}
