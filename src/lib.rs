// ==========================================
// TPM/MTO PRO - 核心库
// ==========================================
// 职责: 设备双轨道保养跟踪 (到期判定 + 日历/KPI 聚合)
// 技术栈: Rust + SQLite 文档库 + tokio 订阅
// 红线: 引擎层纯计算, 所有时间按工厂本地时间处理
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "es");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 持久化端口与实时快照
pub mod repository;

// 引擎层 - 派生计算
pub mod engine;

// 导入层 - 宽松文档规范化
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 性能埋点
pub mod perf;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AssetStatus, AssetType, DayStatus, DueStatus, Role, TrackDayMark, TrackType};

// 领域实体
pub use domain::{Asset, FleetSnapshot, IncidentResolution, MaintenanceRecord, Person, ServiceTrack};

// 引擎
pub use engine::{CalendarAggregator, DueStatusEvaluator, HistoryEngine, KpiEngine, ProductivityEngine, TrendEngine};

// API
pub use api::{DashboardApi, ExportApi, MaintenanceApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "TPM/MTO PRO";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "TPM/MTO PRO");
    }
}
