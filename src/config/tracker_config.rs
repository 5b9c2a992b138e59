// ==========================================
// TPM/MTO PRO - 跟踪参数
// ==========================================
// 职责: 引擎/API 使用的参数快照 (全部带默认值)
// ==========================================

use crate::domain::asset::{DEFAULT_LEADER_INTERVAL_DAYS, DEFAULT_OPERATOR_INTERVAL_DAYS};
use crate::domain::types::TrackType;
use crate::i18n::DEFAULT_LOCALE;
use serde::{Deserialize, Serialize};

/// 效率计算使用的名义月天数 (固定值, 与查询区间无关)
pub const DEFAULT_NOMINAL_MONTH_DAYS: u32 = 30;

/// 低产量提示阈值 (任务数低于此值)
pub const DEFAULT_LOW_VOLUME_THRESHOLD: usize = 4;

/// 管理视图"最近事件"条数
pub const DEFAULT_RECENT_EVENTS_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub operator_interval_days: u32,
    pub leader_interval_days: u32,
    pub nominal_month_days: u32,
    pub low_volume_threshold: usize,
    pub recent_events_limit: usize,
    pub locale: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            operator_interval_days: DEFAULT_OPERATOR_INTERVAL_DAYS,
            leader_interval_days: DEFAULT_LEADER_INTERVAL_DAYS,
            nominal_month_days: DEFAULT_NOMINAL_MONTH_DAYS,
            low_volume_threshold: DEFAULT_LOW_VOLUME_THRESHOLD,
            recent_events_limit: DEFAULT_RECENT_EVENTS_LIMIT,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl TrackerConfig {
    /// 轨道默认周期
    pub fn default_interval(&self, track: TrackType) -> u32 {
        match track {
            TrackType::Light => self.operator_interval_days,
            TrackType::Heavy => self.leader_interval_days,
        }
    }
}
