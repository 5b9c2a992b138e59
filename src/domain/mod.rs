// ==========================================
// TPM/MTO PRO - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、实体内规则
// 红线: 不含数据访问逻辑,不含聚合逻辑
// ==========================================

pub mod asset;
pub mod fleet;
pub mod person;
pub mod record;
pub mod types;

// 重导出核心类型
pub use asset::{Asset, ServiceTrack, DEFAULT_LEADER_INTERVAL_DAYS, DEFAULT_OPERATOR_INTERVAL_DAYS};
pub use fleet::{FleetIndex, FleetSnapshot};
pub use person::Person;
pub use record::{IncidentResolution, MaintenanceRecord};
pub use types::{AssetStatus, AssetType, DayStatus, DueStatus, Role, TrackDayMark, TrackType};
