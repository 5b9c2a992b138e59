// ==========================================
// TPM/MTO PRO - 角色视图模型
// ==========================================
// 职责: 按 Role 一次性选择看板数据 ("看什么"), 不涉及渲染
// OPERATOR → 本人任务 + 本人日历
// LEADER   → 本人任务 + 本人日历 + 未关闭故障告警
// MANAGER / SUPERVISOR → 车队 KPI + 效能排名 + 趋势 + 最新事件 + 全量日历
// ==========================================

use crate::config::tracker_config::TrackerConfig;
use crate::domain::fleet::FleetSnapshot;
use crate::domain::person::Person;
use crate::domain::types::{AssetType, DueStatus, Role, TrackType};
use crate::engine::calendar::{CalendarAggregator, CalendarCell, CompletedEntry, DayDetail};
use crate::engine::checklist::checklist_items;
use crate::engine::due_status::DueStatusEvaluator;
use crate::engine::history::HistoryEngine;
use crate::engine::kpi::{AvailabilitySplit, FleetKpi, KpiEngine, KpiQuery};
use crate::engine::productivity::{PersonProductivity, ProductivityEngine, ProductivityWindow};
use crate::engine::scope::ViewScope;
use crate::engine::trend::{TrendEngine, TrendPoint};
use crate::i18n::Labels;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// 任务卡片 (一台设备的一条轨道)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCard {
    pub asset_id: String,
    pub asset_name: String,
    pub asset_type: AssetType,
    pub track_type: TrackType,
    pub next_due: NaiveDate,
    pub status: DueStatus,
    pub checklist: Vec<String>,
}

/// 一线人员看板
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonDashboard {
    pub person_id: String,
    pub person_name: String,
    pub role_label: String,
    /// 逾期在前, 其余按到期日升序
    pub tasks: Vec<TaskCard>,
    pub today: DayDetail,
    pub month: Vec<CalendarCell>,
    /// 本月本人效能
    pub productivity: Option<PersonProductivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderDashboard {
    #[serde(flatten)]
    pub personal: PersonDashboard,
    pub alerts: Vec<CompletedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerDashboard {
    pub person_id: String,
    pub role_label: String,
    pub kpi: FleetKpi,
    pub availability: AvailabilitySplit,
    pub ranking: Vec<PersonProductivity>,
    pub trend: Vec<TrendPoint>,
    pub recent_events: Vec<CompletedEntry>,
    pub today: DayDetail,
    pub month: Vec<CalendarCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DashboardView {
    Operator(PersonDashboard),
    Leader(LeaderDashboard),
    Manager(ManagerDashboard),
}

// ==========================================
// DashboardBuilder - 视图模型选择
// ==========================================
pub struct DashboardBuilder<'a> {
    config: &'a TrackerConfig,
    labels: &'a Labels,
    evaluator: DueStatusEvaluator,
    calendar: CalendarAggregator,
}

impl<'a> DashboardBuilder<'a> {
    pub fn new(config: &'a TrackerConfig, labels: &'a Labels) -> Self {
        Self {
            config,
            labels,
            evaluator: DueStatusEvaluator::new(),
            calendar: CalendarAggregator::new(),
        }
    }

    /// 按角色选择看板
    #[instrument(skip_all, fields(person_id = %person.id, role = %person.role, today = %today))]
    pub fn build(&self, snapshot: &FleetSnapshot, person: &Person, today: NaiveDate) -> DashboardView {
        match person.role {
            Role::Operator => DashboardView::Operator(self.personal(snapshot, person, today)),
            Role::Leader => DashboardView::Leader(LeaderDashboard {
                personal: self.personal(snapshot, person, today),
                alerts: HistoryEngine::new().active_alerts(snapshot, self.labels),
            }),
            Role::Manager | Role::Supervisor => DashboardView::Manager(self.manager(snapshot, person, today)),
        }
    }

    /// 本人可执行的任务卡片
    pub fn task_cards(&self, snapshot: &FleetSnapshot, scope: &ViewScope, today: NaiveDate) -> Vec<TaskCard> {
        let mut cards = Vec::new();
        for asset in snapshot.assets.iter().filter(|a| !a.is_stopped()) {
            for track in scope.tracks() {
                if !scope.includes_track(asset, *track) {
                    continue;
                }
                cards.push(TaskCard {
                    asset_id: asset.id.clone(),
                    asset_name: asset.name.clone(),
                    asset_type: asset.asset_type,
                    track_type: *track,
                    next_due: self.evaluator.next_due(asset, *track),
                    status: self.evaluator.evaluate(asset, *track, today),
                    checklist: checklist_items(asset.asset_type, *track)
                        .into_iter()
                        .map(String::from)
                        .collect(),
                });
            }
        }
        cards.sort_by(|a, b| {
            let a_missed = a.status == DueStatus::Missed;
            let b_missed = b.status == DueStatus::Missed;
            b_missed
                .cmp(&a_missed)
                .then(a.next_due.cmp(&b.next_due))
                .then(a.asset_name.cmp(&b.asset_name))
        });
        cards
    }

    fn personal(&self, snapshot: &FleetSnapshot, person: &Person, today: NaiveDate) -> PersonDashboard {
        let scope = ViewScope::for_person(person);
        let productivity = ProductivityEngine::new(self.config.low_volume_threshold)
            .ranking(snapshot, ProductivityWindow::current_month(today))
            .into_iter()
            .find(|p| p.person_id == person.id);

        PersonDashboard {
            person_id: person.id.clone(),
            person_name: person.name.clone(),
            role_label: self.labels.role(person.role).to_string(),
            tasks: self.task_cards(snapshot, &scope, today),
            today: self.calendar.day_detail(snapshot, today, today, &scope, self.labels),
            month: self
                .calendar
                .month_cells(snapshot, today.year(), today.month(), today, &scope),
            productivity,
        }
    }

    fn manager(&self, snapshot: &FleetSnapshot, person: &Person, today: NaiveDate) -> ManagerDashboard {
        let scope = ViewScope::All;
        let kpi_engine = KpiEngine::new(self.config.nominal_month_days);
        let query = KpiQuery::default();

        ManagerDashboard {
            person_id: person.id.clone(),
            role_label: self.labels.role(person.role).to_string(),
            kpi: kpi_engine.fleet_kpi(snapshot, &query, today),
            availability: kpi_engine.availability(snapshot, today),
            ranking: ProductivityEngine::new(self.config.low_volume_threshold)
                .ranking(snapshot, ProductivityWindow::current_month(today)),
            trend: TrendEngine::new().daily_series(snapshot, &query),
            recent_events: HistoryEngine::new().recent(snapshot, self.config.recent_events_limit, self.labels),
            today: self.calendar.day_detail(snapshot, today, today, &scope, self.labels),
            month: self
                .calendar
                .month_cells(snapshot, today.year(), today.month(), today, &scope),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::asset::Asset;
    use crate::domain::record::MaintenanceRecord;
    use crate::domain::types::DayStatus;
    use chrono::{Duration, NaiveDateTime};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn now() -> NaiveDateTime {
        today().and_hms_opt(12, 0, 0).unwrap()
    }

    fn snapshot() -> FleetSnapshot {
        let mut overdue = Asset::new("M1", "Prensa", AssetType::Machine, now());
        overdue.operator_track.last_serviced_at = now() - Duration::days(20);
        let mut assigned = Asset::new("M2", "Torno", AssetType::Machine, now());
        assigned.operator_track.responsible_id = Some("U2".to_string());

        let mut issue = MaintenanceRecord::new("R1", "M2", "U2", now() - Duration::hours(2), TrackType::Light);
        issue.is_issue = true;

        FleetSnapshot::new(
            vec![
                Person::new("U1", "Ana", Role::Operator),
                Person::new("U2", "Bruno", Role::Operator),
                Person::new("L1", "Lucia", Role::Leader),
                Person::new("S1", "Sara", Role::Supervisor),
            ],
            vec![overdue, assigned],
            vec![issue],
        )
    }

    #[test]
    fn test_operator_sees_only_own_or_unassigned_light_tasks() {
        let config = TrackerConfig::default();
        let labels = Labels::for_locale("en");
        let snapshot = snapshot();
        let person = snapshot.person("U1").unwrap().clone();

        match DashboardBuilder::new(&config, &labels).build(&snapshot, &person, today()) {
            DashboardView::Operator(view) => {
                assert_eq!(view.tasks.len(), 1);
                assert_eq!(view.tasks[0].asset_id, "M1");
                assert_eq!(view.tasks[0].track_type, TrackType::Light);
                assert_eq!(view.tasks[0].status, DueStatus::Missed);
                assert_eq!(view.tasks[0].checklist.len(), 5);
                assert_eq!(view.month.len(), 31);
                assert_eq!(view.productivity.map(|p| p.task_count), Some(0));
            }
            other => panic!("操作工应得到操作工看板: {:?}", other),
        }
    }

    #[test]
    fn test_leader_gets_alerts_and_heavy_tasks() {
        let config = TrackerConfig::default();
        let labels = Labels::for_locale("en");
        let snapshot = snapshot();
        let person = snapshot.person("L1").unwrap().clone();

        match DashboardBuilder::new(&config, &labels).build(&snapshot, &person, today()) {
            DashboardView::Leader(view) => {
                assert_eq!(view.personal.tasks.len(), 2);
                assert!(view.personal.tasks.iter().all(|t| t.track_type == TrackType::Heavy));
                assert_eq!(view.alerts.len(), 1);
                assert_eq!(view.alerts[0].record_id, "R1");
            }
            other => panic!("负责人应得到负责人看板: {:?}", other),
        }
    }

    #[test]
    fn test_supervisor_gets_manager_view() {
        let config = TrackerConfig::default();
        let labels = Labels::for_locale("en");
        let snapshot = snapshot();
        let person = snapshot.person("S1").unwrap().clone();

        match DashboardBuilder::new(&config, &labels).build(&snapshot, &person, today()) {
            DashboardView::Manager(view) => {
                assert_eq!(view.kpi.total_assets, 2);
                assert_eq!(view.kpi.compliance_rate, 50);
                assert_eq!(view.availability.overdue, 1);
                assert_eq!(view.ranking.len(), 3);
                assert_eq!(view.recent_events.len(), 1);
                assert_eq!(view.today.status, DayStatus::Issue);
            }
            other => panic!("主管应得到管理看板: {:?}", other),
        }
    }
}
