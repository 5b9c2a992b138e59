// ==========================================
// TPM/MTO PRO - 趋势序列引擎
// ==========================================
// 职责: 记录按自然日分组 → 任务数 / 停机 / 预防性比例
// 输出: 日期升序
// ==========================================

use crate::domain::fleet::FleetSnapshot;
use crate::engine::kpi::{records_in_scope, KpiQuery};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub task_count: usize,
    pub total_downtime: u64,
    pub preventive_count: usize,
    /// 当日预防性比例 (%), 无任务为 0
    pub effectiveness_pct: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrendEngine;

impl TrendEngine {
    pub fn new() -> Self {
        Self
    }

    /// 日趋势序列 (与 KPI 使用同一记录范围)
    pub fn daily_series(&self, snapshot: &FleetSnapshot, query: &KpiQuery) -> Vec<TrendPoint> {
        let index = snapshot.index();
        let mut by_day: BTreeMap<NaiveDate, (usize, u64, usize)> = BTreeMap::new();

        for record in records_in_scope(snapshot, &index, query) {
            let entry = by_day.entry(record.timestamp.date()).or_insert((0, 0, 0));
            entry.0 += 1;
            entry.1 += u64::from(record.downtime_minutes);
            if record.is_preventive() {
                entry.2 += 1;
            }
        }

        by_day
            .into_iter()
            .map(|(date, (task_count, total_downtime, preventive_count))| TrendPoint {
                date,
                task_count,
                total_downtime,
                preventive_count,
                effectiveness_pct: if task_count == 0 {
                    0
                } else {
                    (100.0 * preventive_count as f64 / task_count as f64).round() as u32
                },
            })
            .collect()
    }
}
