// ==========================================
// TPM/MTO PRO - 日历聚合引擎
// ==========================================
// 职责: 指定日期/日期范围 → 日历格状态 + 当日明细 (已完成 / 待执行)
// 输入: 车队快照 + 视图范围 + 基准日期
// 红线: 纯函数; 悬空引用替换为哨兵标签, 不中断聚合
//       停用设备不产生任何日历标记
// ==========================================

use crate::domain::asset::Asset;
use crate::domain::fleet::{FleetIndex, FleetSnapshot};
use crate::domain::record::MaintenanceRecord;
use crate::domain::types::{DayStatus, TrackDayMark, TrackType};
use crate::engine::due_status::DueStatusEvaluator;
use crate::engine::scope::ViewScope;
use crate::i18n::Labels;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::instrument;

// ==========================================
// 输出结构
// ==========================================

/// 当日已完成记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedEntry {
    pub record_id: String,
    pub asset_id: String,
    pub asset_name: String,
    pub author_id: String,
    pub author_name: String,
    pub track_type: TrackType,
    pub track_label: String,
    pub timestamp: NaiveDateTime,
    pub is_issue: bool,
    pub downtime_minutes: u32,
    pub observations: String,
}

/// 当日待执行任务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEntry {
    pub asset_id: String,
    pub asset_name: String,
    pub track_type: TrackType,
    /// 执行角色标签
    pub role_label: String,
    pub responsible_id: Option<String>,
    /// 责任人姓名 (未指定时为"轮值"标签)
    pub responsible_name: String,
    /// 到期日早于今天
    pub overdue: bool,
}

/// 当日明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub completed: Vec<CompletedEntry>,
    pub pending: Vec<PendingEntry>,
}

/// 日历格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub completed_count: usize,
    pub pending_count: usize,
}

/// 单日原始判定结果 (不含展示标签)
struct DayFacts<'a> {
    completed: Vec<&'a MaintenanceRecord>,
    pending: Vec<(&'a Asset, TrackType, TrackDayMark)>,
}

impl DayFacts<'_> {
    /// 日历格状态
    ///
    /// 优先级: issue > done > missed > planned > none
    fn status(&self) -> DayStatus {
        if self.completed.iter().any(|r| r.is_issue) {
            DayStatus::Issue
        } else if !self.completed.is_empty() {
            DayStatus::Done
        } else if self.pending.iter().any(|(_, _, m)| *m == TrackDayMark::Missed) {
            DayStatus::Missed
        } else if !self.pending.is_empty() {
            DayStatus::Planned
        } else {
            DayStatus::None
        }
    }
}

// ==========================================
// CalendarAggregator - 日历聚合引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarAggregator {
    evaluator: DueStatusEvaluator,
}

impl CalendarAggregator {
    pub fn new() -> Self {
        Self {
            evaluator: DueStatusEvaluator::new(),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 当日明细 (已完成 + 待执行 + 格状态)
    #[instrument(skip_all, fields(day = %day, records = snapshot.records.len()))]
    pub fn day_detail(
        &self,
        snapshot: &FleetSnapshot,
        day: NaiveDate,
        today: NaiveDate,
        scope: &ViewScope,
        labels: &Labels,
    ) -> DayDetail {
        let index = snapshot.index();
        let day_records = records_on(snapshot, &index, day);
        let facts = self.collect_day(snapshot, &day_records, day, today, scope);
        let status = facts.status();

        let mut completed: Vec<CompletedEntry> = facts
            .completed
            .iter()
            .map(|r| completed_entry(r, &index, labels))
            .collect();
        completed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let mut pending: Vec<PendingEntry> = facts
            .pending
            .iter()
            .map(|(asset, track, mark)| pending_entry(asset, *track, *mark, &index, labels))
            .collect();
        pending.sort_by(|a, b| {
            a.asset_name
                .cmp(&b.asset_name)
                .then(a.track_type.cmp(&b.track_type))
        });

        DayDetail {
            date: day,
            status,
            completed,
            pending,
        }
    }

    /// 单日格状态
    pub fn day_status(
        &self,
        snapshot: &FleetSnapshot,
        day: NaiveDate,
        today: NaiveDate,
        scope: &ViewScope,
    ) -> DayStatus {
        let index = snapshot.index();
        let day_records = records_on(snapshot, &index, day);
        self.collect_day(snapshot, &day_records, day, today, scope).status()
    }

    /// 日期范围内每一天的格状态 (含首尾)
    #[instrument(skip_all, fields(from = %from, to = %to))]
    pub fn range_cells(
        &self,
        snapshot: &FleetSnapshot,
        from: NaiveDate,
        to: NaiveDate,
        today: NaiveDate,
        scope: &ViewScope,
    ) -> Vec<CalendarCell> {
        if from > to {
            return Vec::new();
        }

        // 一次性按日分组, 避免每天全量扫描记录
        let index = snapshot.index();
        let mut by_day: HashMap<NaiveDate, Vec<&MaintenanceRecord>> = HashMap::new();
        for record in snapshot.records.iter().filter(|r| is_visible_record(r, &index)) {
            let date = record.timestamp.date();
            if date >= from && date <= to {
                by_day.entry(date).or_default().push(record);
            }
        }

        let mut cells = Vec::new();
        let mut day = from;
        while day <= to {
            let day_records = by_day.remove(&day).unwrap_or_default();
            let facts = self.collect_day(snapshot, &day_records, day, today, scope);
            cells.push(CalendarCell {
                date: day,
                status: facts.status(),
                completed_count: facts.completed.len(),
                pending_count: facts.pending.len(),
            });
            day += Duration::days(1);
        }
        cells
    }

    /// 自然月内每一天的格状态
    ///
    /// 非法年月返回空列表
    pub fn month_cells(
        &self,
        snapshot: &FleetSnapshot,
        year: i32,
        month: u32,
        today: NaiveDate,
        scope: &ViewScope,
    ) -> Vec<CalendarCell> {
        match month_bounds(year, month) {
            Some((first, last)) => self.range_cells(snapshot, first, last, today, scope),
            None => Vec::new(),
        }
    }

    // ==========================================
    // 内部判定
    // ==========================================

    /// 收集单日事实
    ///
    /// `day_records` 必须已经是当天、且设备未停用的记录
    fn collect_day<'a>(
        &self,
        snapshot: &'a FleetSnapshot,
        day_records: &[&'a MaintenanceRecord],
        day: NaiveDate,
        today: NaiveDate,
        scope: &ViewScope,
    ) -> DayFacts<'a> {
        // 当天已有完工记录的 (设备, 轨道) 不再列为待执行, 与作者无关
        let done_keys: HashSet<(&str, TrackType)> = day_records
            .iter()
            .map(|r| (r.asset_id.as_str(), r.track_type))
            .collect();

        let completed = day_records
            .iter()
            .copied()
            .filter(|r| scope.includes_author(&r.author_id))
            .collect();

        let mut pending = Vec::new();
        for asset in snapshot.assets.iter().filter(|a| !a.is_stopped()) {
            for track in scope.tracks() {
                if !scope.includes_track(asset, *track) {
                    continue;
                }
                if done_keys.contains(&(asset.id.as_str(), *track)) {
                    continue;
                }
                if let Some(mark) = self.evaluator.evaluate_day(asset, *track, day, today) {
                    pending.push((asset, *track, mark));
                }
            }
        }

        DayFacts { completed, pending }
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 自然月首尾日期
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first - Duration::days(1)))
}

/// 记录是否参与日历 (设备已停用的记录不参与; 设备已删除的记录保留)
pub(crate) fn is_visible_record(record: &MaintenanceRecord, index: &FleetIndex<'_>) -> bool {
    index
        .asset(&record.asset_id)
        .map_or(true, |asset| !asset.is_stopped())
}

/// 当天 (自然日, 非 24 小时窗口) 的可见记录
fn records_on<'a>(
    snapshot: &'a FleetSnapshot,
    index: &FleetIndex<'_>,
    day: NaiveDate,
) -> Vec<&'a MaintenanceRecord> {
    snapshot
        .records
        .iter()
        .filter(|r| r.timestamp.date() == day && is_visible_record(r, index))
        .collect()
}

pub(crate) fn completed_entry(record: &MaintenanceRecord, index: &FleetIndex<'_>, labels: &Labels) -> CompletedEntry {
    let asset_name = match index.asset(&record.asset_id) {
        Some(asset) => asset.name.clone(),
        None => {
            tracing::debug!(record_id = %record.id, asset_id = %record.asset_id, "记录引用的设备不存在");
            labels.asset_deleted.clone()
        }
    };
    let author_name = index
        .person(&record.author_id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| labels.unknown_person.clone());

    CompletedEntry {
        record_id: record.id.clone(),
        asset_id: record.asset_id.clone(),
        asset_name,
        author_id: record.author_id.clone(),
        author_name,
        track_type: record.track_type,
        track_label: labels.track(record.track_type).to_string(),
        timestamp: record.timestamp,
        is_issue: record.is_issue,
        downtime_minutes: record.downtime_minutes,
        observations: record.observations.clone(),
    }
}

fn pending_entry(
    asset: &Asset,
    track: TrackType,
    mark: TrackDayMark,
    index: &FleetIndex<'_>,
    labels: &Labels,
) -> PendingEntry {
    let responsible_id = asset.track(track).responsible_id.clone();
    let responsible_name = match responsible_id.as_deref() {
        None => labels.unassigned.clone(),
        Some(id) => index
            .person(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| labels.unknown_person.clone()),
    };

    PendingEntry {
        asset_id: asset.id.clone(),
        asset_name: asset.name.clone(),
        track_type: track,
        role_label: labels.role(track.role()).to_string(),
        responsible_id,
        responsible_name,
        overdue: mark == TrackDayMark::Missed,
    }
}
