// ==========================================
// TPM/MTO PRO - 原始文档结构
// ==========================================
// 职责: 持久化层文档的宽松形态 (字段可缺失, 类型不可信)
// 说明: 字段名沿用文档库中的 camelCase; 历史单轨道字段单独保留
// ==========================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 轨道原始字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrack {
    #[serde(default)]
    pub last_serviced_date: Option<String>,
    /// 数字或字符串, 由映射层解析
    #[serde(default)]
    pub interval_days: Option<Value>,
    #[serde(default)]
    pub responsible_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAsset {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type", alias = "assetType")]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub operator_track: Option<RawTrack>,
    #[serde(default)]
    pub leader_track: Option<RawTrack>,

    // ===== 历史单轨道字段 (映射到操作工轨道) =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_maintenance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_days: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPerson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub pin: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResolution {
    #[serde(default)]
    pub resolved_by: Option<String>,
    #[serde(default)]
    pub resolved_at: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default, alias = "machineId")]
    pub asset_id: Option<String>,
    #[serde(default, alias = "userId")]
    pub author_id: Option<String>,
    #[serde(default, alias = "date")]
    pub timestamp: Option<String>,
    #[serde(default, rename = "trackType", alias = "type")]
    pub track_type: Option<String>,
    #[serde(default)]
    pub observations: Option<String>,
    #[serde(default)]
    pub is_issue: Option<bool>,
    #[serde(default)]
    pub downtime_minutes: Option<Value>,
    #[serde(default)]
    pub resolution: Option<RawResolution>,
}
