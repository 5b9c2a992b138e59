// ==========================================
// TPM/MTO PRO - 领域类型定义
// ==========================================
// 红线: 角色/保养类型是封闭枚举,不在视图层散落字符串判断
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 人员角色 (Role)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与存储一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Operator,   // 操作工 (轻保养轨道)
    Leader,     // 保养负责人 (重保养轨道)
    Manager,    // 管理层
    Supervisor, // 主管
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Operator => write!(f, "OPERATOR"),
            Role::Leader => write!(f, "LEADER"),
            Role::Manager => write!(f, "MANAGER"),
            Role::Supervisor => write!(f, "SUPERVISOR"),
        }
    }
}

impl Role {
    /// 宽松解析角色字符串
    ///
    /// 兼容历史文档中的展示名 (OPERARIO / LÍDER MANTENIMIENTO / GERENCIA),
    /// 无法识别返回 None, 由调用方决定回退策略
    pub fn parse_lenient(s: &str) -> Option<Self> {
        let normalized = s.trim().to_uppercase();
        match normalized.as_str() {
            "OPERATOR" | "OPERARIO" => Some(Role::Operator),
            "LEADER" | "LÍDER MANTENIMIENTO" | "LIDER MANTENIMIENTO" | "LÍDER" | "LIDER" => {
                Some(Role::Leader)
            }
            "MANAGER" | "GERENCIA" | "GERENTE" => Some(Role::Manager),
            "SUPERVISOR" => Some(Role::Supervisor),
            _ => None,
        }
    }

    /// 该角色负责的保养轨道 (管理层/主管不直接执行保养)
    pub fn track(&self) -> Option<TrackType> {
        match self {
            Role::Operator => Some(TrackType::Light),
            Role::Leader => Some(TrackType::Heavy),
            Role::Manager | Role::Supervisor => None,
        }
    }

    /// 是否为一线作业角色 (参与个人效能统计)
    pub fn is_operational(&self) -> bool {
        self.track().is_some()
    }

    /// 是否可以关闭故障
    pub fn can_resolve_incidents(&self) -> bool {
        matches!(self, Role::Leader | Role::Supervisor | Role::Manager)
    }

    /// 是否可以管理设备与人员
    pub fn can_manage_fleet(&self) -> bool {
        matches!(self, Role::Manager)
    }
}

// ==========================================
// 保养轨道类型 (Track Type)
// ==========================================
// LIGHT = 操作工轨道 (频繁, 默认 15 天)
// HEAVY = 负责人轨道 (深度, 默认 30 天)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackType {
    Light,
    Heavy,
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackType::Light => write!(f, "LIGHT"),
            TrackType::Heavy => write!(f, "HEAVY"),
        }
    }
}

impl TrackType {
    pub const ALL: [TrackType; 2] = [TrackType::Light, TrackType::Heavy];

    /// 宽松解析 (兼容 Liviano / Pesado)
    pub fn parse_lenient(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "LIGHT" | "LIVIANO" | "OPERATOR" => Some(TrackType::Light),
            "HEAVY" | "PESADO" | "LEADER" => Some(TrackType::Heavy),
            _ => None,
        }
    }

    /// 执行该轨道的角色
    pub fn role(&self) -> Role {
        match self {
            TrackType::Light => Role::Operator,
            TrackType::Heavy => Role::Leader,
        }
    }
}

// ==========================================
// 设备类型 (Asset Type)
// ==========================================
// 只影响点检项目, 不参与到期计算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Machine,  // 机台
    Vehicle,  // 车辆
    Forklift, // 叉车
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetType::Machine => write!(f, "MACHINE"),
            AssetType::Vehicle => write!(f, "VEHICLE"),
            AssetType::Forklift => write!(f, "FORKLIFT"),
        }
    }
}

impl AssetType {
    pub fn parse_lenient(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "MACHINE" | "MAQUINA" | "MÁQUINA" => Some(AssetType::Machine),
            "VEHICLE" | "VEHICULO" | "VEHÍCULO" => Some(AssetType::Vehicle),
            "FORKLIFT" | "MONTACARGAS" => Some(AssetType::Forklift),
            _ => None,
        }
    }
}

// ==========================================
// 设备运行状态 (Asset Status)
// ==========================================
// STOPPED 设备不参与任何到期/合规统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetStatus {
    Active,
    Stopped,
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetStatus::Active => write!(f, "ACTIVE"),
            AssetStatus::Stopped => write!(f, "STOPPED"),
        }
    }
}

impl AssetStatus {
    pub fn parse_lenient(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" | "ACTIVO" | "OPERATIVO" => Some(AssetStatus::Active),
            "STOPPED" | "DETENIDO" | "PARADO" => Some(AssetStatus::Stopped),
            _ => None,
        }
    }
}

// ==========================================
// 到期状态 (Due Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DueStatus {
    Upcoming,      // 未到期 (含今天)
    Missed,        // 已逾期 (严格早于今天)
    NotApplicable, // 设备停用
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueStatus::Upcoming => write!(f, "UPCOMING"),
            DueStatus::Missed => write!(f, "MISSED"),
            DueStatus::NotApplicable => write!(f, "NOT_APPLICABLE"),
        }
    }
}

// ==========================================
// 单轨道在某一天的计划标记
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackDayMark {
    Planned, // 到期日 >= 今天
    Missed,  // 到期日 < 今天
}

// ==========================================
// 日历格状态 (Day Status)
// ==========================================
// 优先级: Issue > Done > Missed > Planned > None
// 派生 Ord 的顺序即优先级顺序 (None 最低)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayStatus {
    None,
    Planned,
    Missed,
    Done,
    Issue,
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayStatus::None => write!(f, "NONE"),
            DayStatus::Planned => write!(f, "PLANNED"),
            DayStatus::Missed => write!(f, "MISSED"),
            DayStatus::Done => write!(f, "DONE"),
            DayStatus::Issue => write!(f, "ISSUE"),
        }
    }
}
