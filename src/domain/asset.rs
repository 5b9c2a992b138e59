// ==========================================
// TPM/MTO PRO - 设备实体
// ==========================================
// 职责: 设备主数据 + 两条独立保养轨道
// 红线: 上次保养时间只能由"对应轨道的完工记录"推进
// ==========================================

use crate::domain::record::MaintenanceRecord;
use crate::domain::types::{AssetStatus, AssetType, TrackType};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 操作工轨道默认周期 (天)
pub const DEFAULT_OPERATOR_INTERVAL_DAYS: u32 = 15;

/// 负责人轨道默认周期 (天)
pub const DEFAULT_LEADER_INTERVAL_DAYS: u32 = 30;

/// 保养周期上限 (天), 超出视为非法输入
pub const MAX_INTERVAL_DAYS: u32 = 3650;

// ==========================================
// ServiceTrack - 保养轨道
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTrack {
    /// 上次保养时间 (缺失/非法时在边界层回退为"现在")
    pub last_serviced_at: NaiveDateTime,
    /// 保养周期 (天, > 0)
    pub interval_days: u32,
    /// 责任人 (None = 同角色任何人均可执行, 显示为"轮值")
    pub responsible_id: Option<String>,
}

impl ServiceTrack {
    pub fn new(last_serviced_at: NaiveDateTime, interval_days: u32) -> Self {
        Self {
            last_serviced_at,
            interval_days,
            responsible_id: None,
        }
    }

    /// 下次到期日 = 上次保养时间 + 周期
    ///
    /// 超出日期可表示范围时取 `NaiveDate::MAX` (永不逾期)
    pub fn next_due_date(&self) -> NaiveDate {
        self.last_serviced_at
            .checked_add_signed(Duration::days(i64::from(self.interval_days)))
            .map_or(NaiveDate::MAX, |due| due.date())
    }

    /// 该轨道是否归属于指定人员
    ///
    /// 未指定责任人时视为同角色任何人的任务
    pub fn is_owned_by(&self, person_id: &str) -> bool {
        match self.responsible_id.as_deref() {
            Some(id) => id == person_id,
            None => true,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.responsible_id.is_none()
    }
}

// ==========================================
// Asset - 设备 (机台/车辆/叉车)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub asset_type: AssetType,
    pub status: AssetStatus,
    /// 操作工轨道 (LIGHT)
    pub operator_track: ServiceTrack,
    /// 负责人轨道 (HEAVY)
    pub leader_track: ServiceTrack,
}

impl Asset {
    /// 以默认周期创建新设备, 两条轨道都从 `now` 起算
    pub fn new(id: impl Into<String>, name: impl Into<String>, asset_type: AssetType, now: NaiveDateTime) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            asset_type,
            status: AssetStatus::Active,
            operator_track: ServiceTrack::new(now, DEFAULT_OPERATOR_INTERVAL_DAYS),
            leader_track: ServiceTrack::new(now, DEFAULT_LEADER_INTERVAL_DAYS),
        }
    }

    pub fn track(&self, track_type: TrackType) -> &ServiceTrack {
        match track_type {
            TrackType::Light => &self.operator_track,
            TrackType::Heavy => &self.leader_track,
        }
    }

    pub fn track_mut(&mut self, track_type: TrackType) -> &mut ServiceTrack {
        match track_type {
            TrackType::Light => &mut self.operator_track,
            TrackType::Heavy => &mut self.leader_track,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.status == AssetStatus::Stopped
    }

    /// 应用完工记录: 推进对应轨道的上次保养时间
    ///
    /// 返回是否发生变更 (记录不属于本设备时不变更)
    pub fn apply_completion(&mut self, record: &MaintenanceRecord) -> bool {
        if record.asset_id != self.id {
            return false;
        }
        self.track_mut(record.track_type).last_serviced_at = record.timestamp;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_next_due_date_adds_interval() {
        let track = ServiceTrack::new(at(2026, 3, 1), 15);
        assert_eq!(track.next_due_date(), NaiveDate::from_ymd_opt(2026, 3, 16).unwrap());
    }

    #[test]
    fn test_next_due_date_saturates_on_huge_interval() {
        let track = ServiceTrack::new(at(2026, 3, 1), 200_000_000);
        assert_eq!(track.next_due_date(), NaiveDate::MAX);

        let track = ServiceTrack::new(at(2026, 3, 1), u32::MAX);
        assert_eq!(track.next_due_date(), NaiveDate::MAX);
    }

    #[test]
    fn test_unassigned_track_belongs_to_everyone() {
        let mut track = ServiceTrack::new(at(2026, 3, 1), 15);
        assert!(track.is_owned_by("U1"));
        track.responsible_id = Some("U2".to_string());
        assert!(!track.is_owned_by("U1"));
        assert!(track.is_owned_by("U2"));
    }

    #[test]
    fn test_apply_completion_only_moves_matching_track() {
        let mut asset = Asset::new("M1", "Prensa 1", AssetType::Machine, at(2026, 3, 1));
        let record = MaintenanceRecord::new("R1", "M1", "U1", at(2026, 3, 10), TrackType::Heavy);

        assert!(asset.apply_completion(&record));
        assert_eq!(asset.leader_track.last_serviced_at, at(2026, 3, 10));
        assert_eq!(asset.operator_track.last_serviced_at, at(2026, 3, 1));

        let foreign = MaintenanceRecord::new("R2", "M2", "U1", at(2026, 3, 12), TrackType::Light);
        assert!(!asset.apply_completion(&foreign));
        assert_eq!(asset.operator_track.last_serviced_at, at(2026, 3, 1));
    }
}
