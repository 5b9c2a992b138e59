// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tpm_mto_pro::domain::{Asset, AssetStatus, AssetType, FleetSnapshot, MaintenanceRecord, Person, Role, TrackType};

fn morning(day: NaiveDate) -> NaiveDateTime {
    day.and_hms_opt(8, 0, 0).unwrap()
}

// ==========================================
// Asset 构建器
// ==========================================

pub struct AssetBuilder {
    id: String,
    name: String,
    asset_type: AssetType,
    status: AssetStatus,
    operator_last: NaiveDateTime,
    operator_interval: u32,
    operator_responsible: Option<String>,
    leader_last: NaiveDateTime,
    leader_interval: u32,
    leader_responsible: Option<String>,
}

impl AssetBuilder {
    /// 默认: 两条轨道都在 `today` 当天刚保养过
    pub fn new(id: &str, today: NaiveDate) -> Self {
        Self {
            id: id.to_string(),
            name: format!("Equipo {}", id),
            asset_type: AssetType::Machine,
            status: AssetStatus::Active,
            operator_last: morning(today),
            operator_interval: 1,
            operator_responsible: None,
            leader_last: morning(today),
            leader_interval: 30,
            leader_responsible: None,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn asset_type(mut self, asset_type: AssetType) -> Self {
        self.asset_type = asset_type;
        self
    }

    pub fn stopped(mut self) -> Self {
        self.status = AssetStatus::Stopped;
        self
    }

    /// 操作工轨道: 上次保养日 + 周期
    pub fn operator_track(mut self, last: NaiveDate, interval_days: u32) -> Self {
        self.operator_last = morning(last);
        self.operator_interval = interval_days;
        self
    }

    pub fn leader_track(mut self, last: NaiveDate, interval_days: u32) -> Self {
        self.leader_last = morning(last);
        self.leader_interval = interval_days;
        self
    }

    pub fn operator(mut self, person_id: &str) -> Self {
        self.operator_responsible = Some(person_id.to_string());
        self
    }

    pub fn leader(mut self, person_id: &str) -> Self {
        self.leader_responsible = Some(person_id.to_string());
        self
    }

    pub fn build(self) -> Asset {
        let mut asset = Asset::new(self.id, self.name, self.asset_type, self.operator_last);
        asset.status = self.status;
        asset.operator_track.interval_days = self.operator_interval;
        asset.operator_track.responsible_id = self.operator_responsible;
        asset.leader_track.last_serviced_at = self.leader_last;
        asset.leader_track.interval_days = self.leader_interval;
        asset.leader_track.responsible_id = self.leader_responsible;
        asset
    }
}

// ==========================================
// MaintenanceRecord 构建器
// ==========================================

pub struct RecordBuilder {
    id: String,
    asset_id: String,
    author_id: String,
    timestamp: NaiveDateTime,
    track_type: TrackType,
    is_issue: bool,
    downtime_minutes: u32,
    observations: String,
}

impl RecordBuilder {
    pub fn new(id: &str, asset_id: &str, author_id: &str, timestamp: NaiveDateTime) -> Self {
        Self {
            id: id.to_string(),
            asset_id: asset_id.to_string(),
            author_id: author_id.to_string(),
            timestamp,
            track_type: TrackType::Light,
            is_issue: false,
            downtime_minutes: 0,
            observations: String::new(),
        }
    }

    pub fn heavy(mut self) -> Self {
        self.track_type = TrackType::Heavy;
        self
    }

    pub fn issue(mut self) -> Self {
        self.is_issue = true;
        self
    }

    pub fn downtime(mut self, minutes: u32) -> Self {
        self.downtime_minutes = minutes;
        self
    }

    pub fn observations(mut self, text: &str) -> Self {
        self.observations = text.to_string();
        self
    }

    pub fn build(self) -> MaintenanceRecord {
        let mut record = MaintenanceRecord::new(self.id, self.asset_id, self.author_id, self.timestamp, self.track_type);
        record.is_issue = self.is_issue;
        record.downtime_minutes = self.downtime_minutes;
        record.observations = self.observations;
        record
    }
}

// ==========================================
// 人员 / 快照
// ==========================================

/// 标准人员: 两名操作工、一名负责人、一名主管、一名经理
pub fn standard_people() -> Vec<Person> {
    vec![
        Person::new("OP1", "Ana", Role::Operator),
        Person::new("OP2", "Bruno", Role::Operator),
        Person::new("LD1", "Lucia", Role::Leader),
        Person::new("SV1", "Sergio", Role::Supervisor),
        Person::new("MG1", "Marta", Role::Manager),
    ]
}

pub fn snapshot(assets: Vec<Asset>, records: Vec<MaintenanceRecord>) -> FleetSnapshot {
    FleetSnapshot::new(standard_people(), assets, records)
}

pub fn days(n: i64) -> Duration {
    Duration::days(n)
}
