// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 临时数据库 + AppState 装配 + 种子数据写入
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::error::Error;
use tempfile::NamedTempFile;

use tpm_mto_pro::app::AppState;
use tpm_mto_pro::domain::{Asset, MaintenanceRecord, Person};
use tpm_mto_pro::importer::{asset_document, person_document, record_document};
use tpm_mto_pro::repository::{Collection, Document, PersistencePort};

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含 AppState 与临时数据库文件
pub struct ApiTestEnv {
    pub state: AppState,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let (temp_file, db_path) = test_helpers::create_test_db()?;
        let state = AppState::new(db_path)?;
        Ok(Self {
            state,
            _temp_file: temp_file,
        })
    }

    /// 写入种子数据后一次性加载车队快照
    pub async fn seed(
        &self,
        people: &[Person],
        assets: &[Asset],
        records: &[MaintenanceRecord],
    ) -> Result<(), Box<dyn Error>> {
        let mut documents = Vec::new();
        documents.extend(
            people
                .iter()
                .map(|p| Document::new(Collection::People, p.id.clone(), person_document(p))),
        );
        documents.extend(
            assets
                .iter()
                .map(|a| Document::new(Collection::Assets, a.id.clone(), asset_document(a))),
        );
        documents.extend(
            records
                .iter()
                .map(|r| Document::new(Collection::Records, r.id.clone(), record_document(r))),
        );
        self.state.store.write_batch(&documents).await?;
        self.reload().await
    }

    /// 重新加载快照 (API 写入后读取看板前调用)
    pub async fn reload(&self) -> Result<(), Box<dyn Error>> {
        self.state.load_once().await?;
        Ok(())
    }
}
