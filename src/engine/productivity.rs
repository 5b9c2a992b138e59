// ==========================================
// TPM/MTO PRO - 人员效能引擎
// ==========================================
// 职责: 一线人员任务量 + 预防性比例排名
// 红线: 无任务时效能记为 100% (不因不活跃扣分)
//       低产量只作为提示标记, 不影响效能值
// ==========================================

use crate::config::tracker_config::DEFAULT_LOW_VOLUME_THRESHOLD;
use crate::domain::fleet::FleetSnapshot;
use crate::domain::types::Role;
use crate::engine::kpi::rounded_percent;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;

/// 统计窗口
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductivityWindow {
    #[default]
    AllTime,
    Month { year: i32, month: u32 },
}

impl ProductivityWindow {
    /// 基准日期所在自然月
    pub fn current_month(today: NaiveDate) -> Self {
        ProductivityWindow::Month {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            ProductivityWindow::AllTime => true,
            ProductivityWindow::Month { year, month } => date.year() == *year && date.month() == *month,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonProductivity {
    pub person_id: String,
    pub name: String,
    pub role: Role,
    pub task_count: usize,
    pub preventive_count: usize,
    pub issue_count: usize,
    /// 预防性比例 (%)
    pub effectiveness_rate: u32,
    /// 任务量低于阈值
    pub low_volume: bool,
}

// ==========================================
// ProductivityEngine - 人员效能引擎
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ProductivityEngine {
    low_volume_threshold: usize,
}

impl Default for ProductivityEngine {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_VOLUME_THRESHOLD)
    }
}

impl ProductivityEngine {
    pub fn new(low_volume_threshold: usize) -> Self {
        Self { low_volume_threshold }
    }

    /// 一线人员效能排名
    ///
    /// 排序: 任务数降序 → 效能降序 → 姓名升序
    #[instrument(skip_all, fields(people = snapshot.people.len()))]
    pub fn ranking(&self, snapshot: &FleetSnapshot, window: ProductivityWindow) -> Vec<PersonProductivity> {
        // (任务数, 预防性数) 按作者汇总
        let mut tally: HashMap<&str, (usize, usize)> = HashMap::new();
        for record in snapshot
            .records
            .iter()
            .filter(|r| window.contains(r.timestamp.date()))
        {
            let entry = tally.entry(record.author_id.as_str()).or_insert((0, 0));
            entry.0 += 1;
            if record.is_preventive() {
                entry.1 += 1;
            }
        }

        let mut ranking: Vec<PersonProductivity> = snapshot
            .people
            .iter()
            .filter(|p| p.role.is_operational())
            .map(|p| {
                let (task_count, preventive_count) =
                    tally.get(p.id.as_str()).copied().unwrap_or((0, 0));
                PersonProductivity {
                    person_id: p.id.clone(),
                    name: p.name.clone(),
                    role: p.role,
                    task_count,
                    preventive_count,
                    issue_count: task_count - preventive_count,
                    effectiveness_rate: rounded_percent(preventive_count as f64, task_count as f64),
                    low_volume: task_count < self.low_volume_threshold,
                }
            })
            .collect();

        ranking.sort_by(|a, b| {
            b.task_count
                .cmp(&a.task_count)
                .then(b.effectiveness_rate.cmp(&a.effectiveness_rate))
                .then(a.name.cmp(&b.name))
        });
        ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::person::Person;
    use crate::domain::record::MaintenanceRecord;
    use crate::domain::types::TrackType;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn record(id: &str, author: &str, date: NaiveDate, issue: bool) -> MaintenanceRecord {
        let mut r = MaintenanceRecord::new(id, "M1", author, date.and_hms_opt(9, 0, 0).unwrap(), TrackType::Light);
        r.is_issue = issue;
        r
    }

    fn snapshot() -> FleetSnapshot {
        FleetSnapshot::new(
            vec![
                Person::new("U1", "Ana", Role::Operator),
                Person::new("U2", "Bruno", Role::Operator),
                Person::new("L1", "Lucia", Role::Leader),
                Person::new("G1", "Gerente", Role::Manager),
            ],
            vec![],
            vec![
                record("R1", "U1", day(10, 1), false),
                record("R2", "U1", day(10, 2), false),
                record("R3", "U1", day(10, 3), true),
                record("R4", "U1", day(10, 4), false),
                record("R5", "L1", day(9, 30), false),
                record("R6", "G1", day(10, 5), false),
            ],
        )
    }

    #[test]
    fn test_scenario_d_no_tasks_is_fully_effective() {
        let ranking = ProductivityEngine::default().ranking(&snapshot(), ProductivityWindow::AllTime);
        let bruno = ranking.iter().find(|p| p.person_id == "U2").unwrap();
        assert_eq!(bruno.task_count, 0);
        assert_eq!(bruno.effectiveness_rate, 100);
        assert!(bruno.low_volume);
    }

    #[test]
    fn test_ranking_counts_and_order() {
        let ranking = ProductivityEngine::default().ranking(&snapshot(), ProductivityWindow::AllTime);

        assert_eq!(ranking.len(), 3, "管理层不参与效能排名");
        assert_eq!(ranking[0].person_id, "U1");
        assert_eq!(ranking[0].task_count, 4);
        assert_eq!(ranking[0].preventive_count, 3);
        assert_eq!(ranking[0].issue_count, 1);
        assert_eq!(ranking[0].effectiveness_rate, 75);
        assert!(!ranking[0].low_volume);
        assert_eq!(ranking[1].person_id, "L1");
        assert_eq!(ranking[2].person_id, "U2");
    }

    #[test]
    fn test_month_window() {
        let window = ProductivityWindow::current_month(day(10, 18));
        let ranking = ProductivityEngine::new(1).ranking(&snapshot(), window);
        let lucia = ranking.iter().find(|p| p.person_id == "L1").unwrap();
        assert_eq!(lucia.task_count, 0, "上月记录不计入本月");
        assert!(lucia.low_volume);
        let ana = ranking.iter().find(|p| p.person_id == "U1").unwrap();
        assert_eq!(ana.task_count, 4);
    }
}
