// ==========================================
// TPM/MTO PRO - 引擎层
// ==========================================
// 职责: 纯派生计算 (到期判定 / 日历 / KPI / 效能 / 趋势 / 历史 / 导出 / 视图模型)
// 红线: 引擎不做 I/O, 不持有状态, 相同输入得到相同输出
// ==========================================

pub mod calendar;
pub mod checklist;
pub mod due_status;
pub mod export;
pub mod history;
pub mod kpi;
pub mod productivity;
pub mod scope;
pub mod trend;
pub mod view_model;

// 重导出核心引擎
pub use calendar::{month_bounds, CalendarAggregator, CalendarCell, CompletedEntry, DayDetail, PendingEntry};
pub use checklist::{checklist_items, compose_observations, ChecklistItemResult, ChecklistResult};
pub use due_status::{safe_date, DueStatusEvaluator};
pub use export::{export_rows, write_csv, ExportRow};
pub use history::{HistoryEngine, HistoryFilter};
pub use kpi::{rounded_percent, AvailabilitySplit, FleetKpi, KpiEngine, KpiQuery};
pub use productivity::{PersonProductivity, ProductivityEngine, ProductivityWindow};
pub use scope::{AssetFilter, ViewScope};
pub use trend::{TrendEngine, TrendPoint};
pub use view_model::{DashboardBuilder, DashboardView, LeaderDashboard, ManagerDashboard, PersonDashboard, TaskCard};
