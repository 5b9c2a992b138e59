// ==========================================
// TPM/MTO PRO - 字段映射器
// ==========================================
// 职责: 原始文档 ⇄ 领域实体
// 红线: 缺失/非法日期 → "现在"; 缺失/非正周期 → 默认周期
//       停机分钟数为负 → 0; 未知角色 → OPERATOR (warn)
//       单个文档损坏只跳过该文档
// ==========================================

use crate::config::tracker_config::TrackerConfig;
use crate::domain::asset::{Asset, ServiceTrack, MAX_INTERVAL_DAYS};
use crate::domain::person::Person;
use crate::domain::record::{IncidentResolution, MaintenanceRecord};
use crate::domain::types::{AssetStatus, AssetType, Role, TrackType};
use crate::engine::due_status::safe_date;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::raw::{RawAsset, RawPerson, RawRecord, RawResolution, RawTrack};
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 写回文档库的时间格式 (工厂本地时间, 无时区)
pub const DOCUMENT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn format_document_datetime(ts: NaiveDateTime) -> String {
    ts.format(DOCUMENT_DATETIME_FORMAT).to_string()
}

// ==========================================
// FieldMapper - 字段映射器
// ==========================================
pub struct FieldMapper {
    /// 日期回退使用的"现在"
    now: NaiveDateTime,
    operator_interval_days: u32,
    leader_interval_days: u32,
}

impl FieldMapper {
    pub fn new(now: NaiveDateTime, config: &TrackerConfig) -> Self {
        Self {
            now,
            operator_interval_days: config.default_interval(TrackType::Light),
            leader_interval_days: config.default_interval(TrackType::Heavy),
        }
    }

    // ==========================================
    // 读方向: 文档 → 实体
    // ==========================================

    pub fn map_asset(&self, doc_id: &str, body: &Value) -> ImportResult<Asset> {
        let raw: RawAsset = parse_body("assets", doc_id, body)?;

        let asset_type = raw
            .asset_type
            .as_deref()
            .and_then(AssetType::parse_lenient)
            .unwrap_or(AssetType::Machine);
        let status = raw
            .status
            .as_deref()
            .and_then(AssetStatus::parse_lenient)
            .unwrap_or(AssetStatus::Active);

        // 历史文档只有一条轨道, 映射到操作工轨道
        let operator_raw = raw.operator_track.unwrap_or_else(|| RawTrack {
            last_serviced_date: raw.last_maintenance.clone(),
            interval_days: raw.interval_days.clone(),
            responsible_id: raw.assigned_to.clone(),
        });
        let leader_raw = raw.leader_track.unwrap_or_default();

        Ok(Asset {
            id: doc_id.to_string(),
            name: non_empty(raw.name).unwrap_or_else(|| doc_id.to_string()),
            asset_type,
            status,
            operator_track: self.map_track(doc_id, &operator_raw, self.operator_interval_days),
            leader_track: self.map_track(doc_id, &leader_raw, self.leader_interval_days),
        })
    }

    pub fn map_person(&self, doc_id: &str, body: &Value) -> ImportResult<Person> {
        let raw: RawPerson = parse_body("people", doc_id, body)?;

        let role = match raw.role.as_deref() {
            Some(s) => Role::parse_lenient(s).unwrap_or_else(|| {
                tracing::warn!(doc_id, role = s, "未知角色, 按 OPERATOR 处理");
                Role::Operator
            }),
            None => {
                tracing::warn!(doc_id, "角色缺失, 按 OPERATOR 处理");
                Role::Operator
            }
        };

        Ok(Person {
            id: doc_id.to_string(),
            name: non_empty(raw.name).unwrap_or_else(|| doc_id.to_string()),
            role,
            phone: non_empty(raw.phone),
            pin: raw.pin.as_ref().and_then(value_to_string),
        })
    }

    pub fn map_record(&self, doc_id: &str, body: &Value) -> ImportResult<MaintenanceRecord> {
        let raw: RawRecord = parse_body("records", doc_id, body)?;

        let asset_id = non_empty(raw.asset_id).ok_or_else(|| ImportError::MissingField {
            doc_id: doc_id.to_string(),
            field: "assetId".to_string(),
        })?;
        let author_id = non_empty(raw.author_id).ok_or_else(|| ImportError::MissingField {
            doc_id: doc_id.to_string(),
            field: "authorId".to_string(),
        })?;

        let track_type = match raw.track_type.as_deref() {
            Some(s) => TrackType::parse_lenient(s).unwrap_or_else(|| {
                tracing::warn!(doc_id, track = s, "未知轨道类型, 按 LIGHT 处理");
                TrackType::Light
            }),
            None => TrackType::Light,
        };

        let downtime_minutes = raw
            .downtime_minutes
            .as_ref()
            .and_then(value_to_i64)
            .map(|m| m.clamp(0, i64::from(u32::MAX)) as u32)
            .unwrap_or(0);

        Ok(MaintenanceRecord {
            id: doc_id.to_string(),
            asset_id,
            author_id,
            timestamp: safe_date(raw.timestamp.as_deref(), self.now),
            track_type,
            observations: raw.observations.unwrap_or_default(),
            is_issue: raw.is_issue.unwrap_or(false),
            downtime_minutes,
            resolution: raw.resolution.and_then(|r| self.map_resolution(r)),
        })
    }

    fn map_track(&self, doc_id: &str, raw: &RawTrack, default_interval: u32) -> ServiceTrack {
        let interval_days = match raw.interval_days.as_ref().and_then(value_to_i64) {
            Some(days) if days > 0 && days <= i64::from(MAX_INTERVAL_DAYS) => {
                u32::try_from(days).unwrap_or(default_interval)
            }
            Some(days) => {
                tracing::warn!(doc_id, days, "保养周期越界, 使用默认周期");
                default_interval
            }
            None => default_interval,
        };

        ServiceTrack {
            last_serviced_at: safe_date(raw.last_serviced_date.as_deref(), self.now),
            interval_days,
            responsible_id: non_empty(raw.responsible_id.clone()),
        }
    }

    fn map_resolution(&self, raw: RawResolution) -> Option<IncidentResolution> {
        let resolved_by = non_empty(raw.resolved_by)?;
        Some(IncidentResolution {
            resolved_by,
            resolved_at: safe_date(raw.resolved_at.as_deref(), self.now),
            note: raw.note.unwrap_or_default(),
        })
    }
}

// ==========================================
// 写方向: 实体 → 文档 (统一的双轨道形态)
// ==========================================

pub fn asset_document(asset: &Asset) -> Value {
    let track = |t: &ServiceTrack| RawTrack {
        last_serviced_date: Some(format_document_datetime(t.last_serviced_at)),
        interval_days: Some(Value::from(t.interval_days)),
        responsible_id: t.responsible_id.clone(),
    };
    let raw = RawAsset {
        name: Some(asset.name.clone()),
        asset_type: Some(asset.asset_type.to_string()),
        status: Some(asset.status.to_string()),
        operator_track: Some(track(&asset.operator_track)),
        leader_track: Some(track(&asset.leader_track)),
        ..RawAsset::default()
    };
    serde_json::to_value(raw).unwrap_or(Value::Null)
}

pub fn person_document(person: &Person) -> Value {
    let raw = RawPerson {
        name: Some(person.name.clone()),
        role: Some(person.role.to_string()),
        phone: person.phone.clone(),
        pin: person.pin.clone().map(Value::String),
    };
    serde_json::to_value(raw).unwrap_or(Value::Null)
}

pub fn record_document(record: &MaintenanceRecord) -> Value {
    let raw = RawRecord {
        asset_id: Some(record.asset_id.clone()),
        author_id: Some(record.author_id.clone()),
        timestamp: Some(format_document_datetime(record.timestamp)),
        track_type: Some(record.track_type.to_string()),
        observations: Some(record.observations.clone()),
        is_issue: Some(record.is_issue),
        downtime_minutes: Some(Value::from(record.downtime_minutes)),
        resolution: record.resolution.as_ref().map(|r| RawResolution {
            resolved_by: Some(r.resolved_by.clone()),
            resolved_at: Some(format_document_datetime(r.resolved_at)),
            note: Some(r.note.clone()),
        }),
    };
    serde_json::to_value(raw).unwrap_or(Value::Null)
}

// ==========================================
// 辅助函数
// ==========================================

fn parse_body<T: DeserializeOwned>(collection: &str, doc_id: &str, body: &Value) -> ImportResult<T> {
    serde_json::from_value(body.clone()).map_err(|e| ImportError::MalformedDocument {
        collection: collection.to_string(),
        doc_id: doc_id.to_string(),
        message: e.to_string(),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// 数字或数字字符串 → i64 (小数截断)
fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(Some(s.clone())),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
