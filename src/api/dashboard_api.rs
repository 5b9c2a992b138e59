// ==========================================
// TPM/MTO PRO - 看板 API
// ==========================================
// 职责: 基于实时车队快照的只读聚合查询
// 架构: API 层 → LiveFleet (快照) → Engine 层 (纯函数)
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::tracker_config::TrackerConfig;
use crate::domain::fleet::FleetSnapshot;
use crate::engine::calendar::{CalendarAggregator, CalendarCell, CompletedEntry, DayDetail};
use crate::engine::history::{HistoryEngine, HistoryFilter};
use crate::engine::kpi::{AvailabilitySplit, FleetKpi, KpiEngine, KpiQuery};
use crate::engine::productivity::{PersonProductivity, ProductivityEngine, ProductivityWindow};
use crate::engine::scope::ViewScope;
use crate::engine::trend::{TrendEngine, TrendPoint};
use crate::engine::view_model::{DashboardBuilder, DashboardView};
use crate::i18n::Labels;
use crate::perf::PerfGuard;
use crate::repository::live_fleet::LiveFleet;
use chrono::NaiveDate;
use std::sync::Arc;

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    fleet: Arc<LiveFleet>,
    config: TrackerConfig,
    labels: Labels,
}

impl DashboardApi {
    pub fn new(fleet: Arc<LiveFleet>, config: TrackerConfig) -> Self {
        let labels = Labels::for_locale(&config.locale);
        Self { fleet, config, labels }
    }

    /// 当前快照版本号 (变化即需重新查询)
    pub fn revision(&self) -> u64 {
        self.fleet.revision()
    }

    // ==========================================
    // 日历
    // ==========================================

    /// 当日明细
    ///
    /// # 参数
    /// - person_id: None = 全量视图; Some = 按该人员角色确定视图范围
    pub fn day_detail(&self, day: NaiveDate, today: NaiveDate, person_id: Option<&str>) -> ApiResult<DayDetail> {
        let _perf = PerfGuard::new("day_detail");
        let snapshot = self.fleet.snapshot();
        let scope = resolve_scope(&snapshot, person_id)?;
        Ok(CalendarAggregator::new().day_detail(&snapshot, day, today, &scope, &self.labels))
    }

    pub fn month_cells(
        &self,
        year: i32,
        month: u32,
        today: NaiveDate,
        person_id: Option<&str>,
    ) -> ApiResult<Vec<CalendarCell>> {
        let _perf = PerfGuard::new("month_cells");
        if !(1..=12).contains(&month) {
            return Err(ApiError::InvalidInput(format!("月份非法: {}", month)));
        }
        let snapshot = self.fleet.snapshot();
        let scope = resolve_scope(&snapshot, person_id)?;
        Ok(CalendarAggregator::new().month_cells(&snapshot, year, month, today, &scope))
    }

    pub fn range_cells(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        today: NaiveDate,
        person_id: Option<&str>,
    ) -> ApiResult<Vec<CalendarCell>> {
        let _perf = PerfGuard::new("range_cells");
        if from > to {
            return Err(ApiError::InvalidInput(format!("日期范围非法: {} > {}", from, to)));
        }
        let snapshot = self.fleet.snapshot();
        let scope = resolve_scope(&snapshot, person_id)?;
        Ok(CalendarAggregator::new().range_cells(&snapshot, from, to, today, &scope))
    }

    // ==========================================
    // KPI / 效能 / 趋势
    // ==========================================

    pub fn fleet_kpi(&self, query: &KpiQuery, today: NaiveDate) -> ApiResult<FleetKpi> {
        let _perf = PerfGuard::new("fleet_kpi");
        validate_range(query)?;
        let snapshot = self.fleet.snapshot();
        Ok(self.kpi_engine().fleet_kpi(&snapshot, query, today))
    }

    pub fn availability(&self, today: NaiveDate) -> AvailabilitySplit {
        self.kpi_engine().availability(&self.fleet.snapshot(), today)
    }

    pub fn productivity(&self, window: ProductivityWindow) -> Vec<PersonProductivity> {
        let _perf = PerfGuard::new("productivity");
        ProductivityEngine::new(self.config.low_volume_threshold).ranking(&self.fleet.snapshot(), window)
    }

    pub fn trend(&self, query: &KpiQuery) -> ApiResult<Vec<TrendPoint>> {
        validate_range(query)?;
        Ok(TrendEngine::new().daily_series(&self.fleet.snapshot(), query))
    }

    // ==========================================
    // 历史 / 告警
    // ==========================================

    pub fn history(&self, filter: &HistoryFilter) -> ApiResult<Vec<CompletedEntry>> {
        let _perf = PerfGuard::new("history");
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(ApiError::InvalidInput(format!("日期范围非法: {} > {}", from, to)));
            }
        }
        Ok(HistoryEngine::new().history(&self.fleet.snapshot(), filter, &self.labels))
    }

    pub fn active_alerts(&self) -> Vec<CompletedEntry> {
        HistoryEngine::new().active_alerts(&self.fleet.snapshot(), &self.labels)
    }

    pub fn recent_events(&self) -> Vec<CompletedEntry> {
        HistoryEngine::new().recent(&self.fleet.snapshot(), self.config.recent_events_limit, &self.labels)
    }

    // ==========================================
    // 角色看板
    // ==========================================

    pub fn dashboard_for(&self, person_id: &str, today: NaiveDate) -> ApiResult<DashboardView> {
        let _perf = PerfGuard::new("dashboard_for");
        let snapshot = self.fleet.snapshot();
        let person = snapshot
            .person(person_id)
            .ok_or_else(|| ApiError::NotFound(format!("人员(id={})不存在", person_id)))?;
        Ok(DashboardBuilder::new(&self.config, &self.labels).build(&snapshot, person, today))
    }

    fn kpi_engine(&self) -> KpiEngine {
        KpiEngine::new(self.config.nominal_month_days)
    }
}

fn resolve_scope(snapshot: &FleetSnapshot, person_id: Option<&str>) -> ApiResult<ViewScope> {
    match person_id {
        None => Ok(ViewScope::All),
        Some(id) => snapshot
            .person(id)
            .map(ViewScope::for_person)
            .ok_or_else(|| ApiError::NotFound(format!("人员(id={})不存在", id))),
    }
}

fn validate_range(query: &KpiQuery) -> ApiResult<()> {
    match query.date_range {
        Some((from, to)) if from > to => Err(ApiError::InvalidInput(format!("日期范围非法: {} > {}", from, to))),
        _ => Ok(()),
    }
}
