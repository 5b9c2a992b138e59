// ==========================================
// TPM/MTO PRO - 历史记录查询
// ==========================================
// 职责: 历史筛选 / 未关闭故障告警 / 最新事件
// 输出: 已解析标签的记录行, 时间降序
// ==========================================

use crate::domain::fleet::{FleetIndex, FleetSnapshot};
use crate::domain::record::MaintenanceRecord;
use crate::engine::calendar::{completed_entry, is_visible_record, CompletedEntry};
use crate::engine::scope::AssetFilter;
use crate::i18n::Labels;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 历史筛选条件 (各条件为 AND 关系)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub asset_filter: AssetFilter,
    pub author_id: Option<String>,
    /// 起始日 (含)
    pub from: Option<NaiveDate>,
    /// 截止日 (含)
    pub to: Option<NaiveDate>,
    /// 只看未关闭故障
    #[serde(default)]
    pub issues_only: bool,
}

impl HistoryFilter {
    pub fn matches(&self, record: &MaintenanceRecord) -> bool {
        let date = record.timestamp.date();
        self.asset_filter.matches(&record.asset_id)
            && self.author_id.as_deref().map_or(true, |a| a == record.author_id)
            && self.from.map_or(true, |from| date >= from)
            && self.to.map_or(true, |to| date <= to)
            && (!self.issues_only || record.is_issue)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryEngine;

impl HistoryEngine {
    pub fn new() -> Self {
        Self
    }

    /// 历史记录 (时间降序)
    pub fn history(&self, snapshot: &FleetSnapshot, filter: &HistoryFilter, labels: &Labels) -> Vec<CompletedEntry> {
        let index = snapshot.index();
        let records: Vec<&MaintenanceRecord> = snapshot
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .collect();
        to_entries(records, &index, labels)
    }

    /// 未关闭故障告警 (负责人视图)
    ///
    /// 停用设备的故障不告警
    pub fn active_alerts(&self, snapshot: &FleetSnapshot, labels: &Labels) -> Vec<CompletedEntry> {
        let index = snapshot.index();
        let records: Vec<&MaintenanceRecord> = snapshot
            .records
            .iter()
            .filter(|r| r.is_issue && is_visible_record(r, &index))
            .collect();
        to_entries(records, &index, labels)
    }

    /// 最新 `limit` 条事件
    ///
    /// 与告警一致, 停用设备的记录不出现; 已删除设备的记录照常显示
    pub fn recent(&self, snapshot: &FleetSnapshot, limit: usize, labels: &Labels) -> Vec<CompletedEntry> {
        let index = snapshot.index();
        let records: Vec<&MaintenanceRecord> = snapshot
            .records
            .iter()
            .filter(|r| is_visible_record(r, &index))
            .collect();
        let mut entries = to_entries(records, &index, labels);
        entries.truncate(limit);
        entries
    }
}

fn to_entries(
    mut records: Vec<&MaintenanceRecord>,
    index: &FleetIndex<'_>,
    labels: &Labels,
) -> Vec<CompletedEntry> {
    // 同一时间按 id 排, 保证输出稳定
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(a.id.cmp(&b.id)));
    records
        .into_iter()
        .map(|r| completed_entry(r, index, labels))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::asset::Asset;
    use crate::domain::person::Person;
    use crate::domain::types::{AssetStatus, AssetType, Role, TrackType};
    use chrono::NaiveDateTime;

    fn at(d: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, d)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn record(id: &str, asset: &str, author: &str, ts: NaiveDateTime, issue: bool) -> MaintenanceRecord {
        let mut r = MaintenanceRecord::new(id, asset, author, ts, TrackType::Light);
        r.is_issue = issue;
        r
    }

    fn snapshot() -> FleetSnapshot {
        let mut stopped = Asset::new("M3", "Fresa", AssetType::Machine, at(1, 0));
        stopped.status = AssetStatus::Stopped;
        FleetSnapshot::new(
            vec![Person::new("U1", "Ana", Role::Operator), Person::new("U2", "Bruno", Role::Operator)],
            vec![
                Asset::new("M1", "Prensa", AssetType::Machine, at(1, 0)),
                Asset::new("M2", "Torno", AssetType::Machine, at(1, 0)),
                stopped,
            ],
            vec![
                record("R1", "M1", "U1", at(5, 9), false),
                record("R2", "M2", "U2", at(7, 9), true),
                record("R3", "M1", "U2", at(9, 9), true),
                record("R4", "M3", "U1", at(10, 9), true),
                record("R5", "GONE", "U1", at(11, 9), false),
            ],
        )
    }

    #[test]
    fn test_history_filter_combines_conditions() {
        let engine = HistoryEngine::new();
        let labels = Labels::for_locale("en");

        let all = engine.history(&snapshot(), &HistoryFilter::default(), &labels);
        let ids: Vec<_> = all.iter().map(|e| e.record_id.as_str()).collect();
        assert_eq!(ids, vec!["R5", "R4", "R3", "R2", "R1"]);

        let filter = HistoryFilter {
            asset_filter: AssetFilter::Asset("M1".to_string()),
            author_id: Some("U2".to_string()),
            ..HistoryFilter::default()
        };
        let one = engine.history(&snapshot(), &filter, &labels);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].record_id, "R3");

        let ranged = HistoryFilter {
            from: NaiveDate::from_ymd_opt(2026, 10, 6),
            to: NaiveDate::from_ymd_opt(2026, 10, 9),
            ..HistoryFilter::default()
        };
        let ids: Vec<_> = engine
            .history(&snapshot(), &ranged, &labels)
            .into_iter()
            .map(|e| e.record_id)
            .collect();
        assert_eq!(ids, vec!["R3".to_string(), "R2".to_string()]);
    }

    #[test]
    fn test_active_alerts_skip_stopped_assets() {
        let alerts = HistoryEngine::new().active_alerts(&snapshot(), &Labels::for_locale("en"));
        let ids: Vec<_> = alerts.iter().map(|e| e.record_id.as_str()).collect();
        assert_eq!(ids, vec!["R3", "R2"]);
    }

    #[test]
    fn test_recent_limit_and_sentinel() {
        let recent = HistoryEngine::new().recent(&snapshot(), 2, &Labels::for_locale("en"));
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].record_id, "R5");
        assert_eq!(recent[0].asset_name, "Asset Deleted");
    }

    #[test]
    fn test_recent_skips_stopped_assets_like_alerts() {
        let engine = HistoryEngine::new();
        let labels = Labels::for_locale("en");

        let recent = engine.recent(&snapshot(), 10, &labels);
        let ids: Vec<_> = recent.iter().map(|e| e.record_id.as_str()).collect();
        assert_eq!(ids, vec!["R5", "R3", "R2", "R1"]);

        // 历史记录保留全部, 含停用设备
        let all = engine.history(&snapshot(), &HistoryFilter::default(), &labels);
        assert!(all.iter().any(|e| e.record_id == "R4"));
    }
}
