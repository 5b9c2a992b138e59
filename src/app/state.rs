// ==========================================
// TPM/MTO PRO - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 装配: 文档库 → 配置 → 实时车队快照 → API
// ==========================================

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::api::{DashboardApi, ExportApi, MaintenanceApi};
use crate::config::config_manager::ConfigManager;
use crate::config::tracker_config::TrackerConfig;
use crate::repository::{LiveFleet, PersistencePort, SqliteDocumentStore};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "TPM_MTO_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    db_path: String,
    pub store: Arc<SqliteDocumentStore>,
    pub config_manager: Arc<ConfigManager>,
    pub config: TrackerConfig,
    pub fleet: Arc<LiveFleet>,
    pub dashboard_api: Arc<DashboardApi>,
    pub maintenance_api: Arc<MaintenanceApi>,
    pub export_api: Arc<ExportApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 只完成装配; 快照同步由 `start_sync` / `load_once` 启动
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let store = Arc::new(
            SqliteDocumentStore::new(&db_path).map_err(|e| format!("无法打开文档库: {}", e))?,
        );
        // 配置与文档共用一个连接
        let config_manager = Arc::new(ConfigManager::from_connection(store.connection()));
        let config = config_manager
            .load_tracker_config()
            .map_err(|e| format!("无法加载配置: {}", e))?;
        tracing::info!(?config, "配置已加载");

        let fleet = Arc::new(LiveFleet::new(&config));
        let port: Arc<dyn PersistencePort> = store.clone();

        let dashboard_api = Arc::new(DashboardApi::new(fleet.clone(), config.clone()));
        let maintenance_api = Arc::new(MaintenanceApi::new(port, config.clone()));
        let export_api = Arc::new(ExportApi::new(fleet.clone(), &config));

        Ok(Self {
            db_path,
            store,
            config_manager,
            config,
            fleet,
            dashboard_api,
            maintenance_api,
            export_api,
        })
    }

    /// 一次性加载快照 (命令行工具)
    pub async fn load_once(&self) -> Result<(), String> {
        self.fleet
            .load(self.store.as_ref())
            .await
            .map_err(|e| format!("加载车队快照失败: {}", e))
    }

    /// 启动持续同步
    pub async fn start_sync(&self) -> Result<JoinHandle<()>, String> {
        let port: Arc<dyn PersistencePort> = self.store.clone();
        self.fleet
            .clone()
            .spawn_sync(port)
            .await
            .map_err(|e| format!("启动车队订阅失败: {}", e))
    }

    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - `TPM_MTO_DB_PATH` 环境变量 (若设置)
/// - 开发环境: 用户数据目录/tpm-mto-pro-dev/tpm_mto_pro.db
/// - 生产环境: 用户数据目录/tpm-mto-pro/tpm_mto_pro.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./tpm_mto_pro.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("tpm-mto-pro-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("tpm-mto-pro");
        }

        // 目录创建失败时交给 SQLite 打开时报错
        std::fs::create_dir_all(&path).ok();
        path = path.join("tpm_mto_pro.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[tokio::test]
    async fn test_app_state_wires_in_memory_db() {
        let state = AppState::new(":memory:".to_string()).unwrap();
        assert_eq!(state.config, TrackerConfig::default());

        state.load_once().await.unwrap();
        assert_eq!(state.fleet.revision(), 3);
        assert!(state.dashboard_api.recent_events().is_empty());
    }
}
