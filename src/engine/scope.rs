// ==========================================
// TPM/MTO PRO - 视图范围
// ==========================================
// 职责: 按角色决定"哪些数据可见"
// MANAGER / SUPERVISOR = 全量; OPERATOR / LEADER = 本人 + 本轨道
// ==========================================

use crate::domain::asset::Asset;
use crate::domain::person::Person;
use crate::domain::types::TrackType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewScope {
    /// 管理视图: 所有人、所有轨道
    All,
    /// 本人视图: 只看本人记录, 以及归属本人 (或未指定责任人) 的本轨道任务
    Person { person_id: String, track: TrackType },
}

impl ViewScope {
    /// 由人员角色推导视图范围
    pub fn for_person(person: &Person) -> Self {
        match person.role.track() {
            Some(track) => ViewScope::Person {
                person_id: person.id.clone(),
                track,
            },
            None => ViewScope::All,
        }
    }

    pub fn is_unscoped(&self) -> bool {
        matches!(self, ViewScope::All)
    }

    /// 记录作者是否在范围内
    pub fn includes_author(&self, author_id: &str) -> bool {
        match self {
            ViewScope::All => true,
            ViewScope::Person { person_id, .. } => person_id == author_id,
        }
    }

    /// 设备轨道是否在范围内 (责任人过滤)
    pub fn includes_track(&self, asset: &Asset, track_type: TrackType) -> bool {
        match self {
            ViewScope::All => true,
            ViewScope::Person { person_id, track } => {
                *track == track_type && asset.track(track_type).is_owned_by(person_id)
            }
        }
    }

    /// 范围内的轨道列表
    pub fn tracks(&self) -> &'static [TrackType] {
        match self {
            ViewScope::All => &TrackType::ALL,
            ViewScope::Person { track: TrackType::Light, .. } => &[TrackType::Light],
            ViewScope::Person { track: TrackType::Heavy, .. } => &[TrackType::Heavy],
        }
    }
}

// ==========================================
// 设备过滤 (ALL / 单台设备)
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "asset_id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetFilter {
    #[default]
    All,
    Asset(String),
}

impl AssetFilter {
    /// 由界面参数解析 ("ALL" / 空 → All)
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => AssetFilter::All,
            Some(s) if s.eq_ignore_ascii_case("ALL") => AssetFilter::All,
            Some(id) => AssetFilter::Asset(id.to_string()),
        }
    }

    pub fn matches(&self, asset_id: &str) -> bool {
        match self {
            AssetFilter::All => true,
            AssetFilter::Asset(id) => id == asset_id,
        }
    }
}
