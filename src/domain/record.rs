// ==========================================
// TPM/MTO PRO - 保养记录实体
// ==========================================
// 红线: 记录创建后不可变, 唯一允许的变更是关闭故障
//       (清除 is_issue + 追加处理说明)
// ==========================================

use crate::domain::types::TrackType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 故障关闭说明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentResolution {
    pub resolved_by: String,
    pub resolved_at: NaiveDateTime,
    pub note: String,
}

// ==========================================
// MaintenanceRecord - 保养/故障记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: String,
    pub asset_id: String,
    pub author_id: String,
    /// 完工时间 (工厂本地时间)
    pub timestamp: NaiveDateTime,
    pub track_type: TrackType,
    /// 自由文本 (可能内嵌点检结果/停机说明, 本层不解析)
    pub observations: String,
    /// 未关闭的故障
    pub is_issue: bool,
    /// 停机分钟数 (非负, 默认 0)
    pub downtime_minutes: u32,
    #[serde(default)]
    pub resolution: Option<IncidentResolution>,
}

impl MaintenanceRecord {
    pub fn new(
        id: impl Into<String>,
        asset_id: impl Into<String>,
        author_id: impl Into<String>,
        timestamp: NaiveDateTime,
        track_type: TrackType,
    ) -> Self {
        Self {
            id: id.into(),
            asset_id: asset_id.into(),
            author_id: author_id.into(),
            timestamp,
            track_type,
            observations: String::new(),
            is_issue: false,
            downtime_minutes: 0,
            resolution: None,
        }
    }

    /// 预防性记录 (非故障上报)
    pub fn is_preventive(&self) -> bool {
        !self.is_issue
    }

    /// 关闭故障
    ///
    /// 仅对未关闭的故障生效, 返回是否发生变更
    pub fn resolve(&mut self, resolved_by: &str, resolved_at: NaiveDateTime, note: &str) -> bool {
        if !self.is_issue {
            return false;
        }
        self.is_issue = false;
        self.resolution = Some(IncidentResolution {
            resolved_by: resolved_by.to_string(),
            resolved_at,
            note: note.trim().to_string(),
        });
        true
    }
}
