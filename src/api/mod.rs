// ==========================================
// TPM/MTO PRO - API 层
// ==========================================
// 职责: 界面调用的业务接口 (看板查询 / 保养作业 / 导出)
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod export_api;
pub mod maintenance_api;

// 重导出核心类型
pub use dashboard_api::DashboardApi;
pub use error::{ApiError, ApiResult};
pub use export_api::ExportApi;
pub use maintenance_api::{CompleteTaskRequest, MaintenanceApi, RegisterAssetRequest, RegisterPersonRequest};
