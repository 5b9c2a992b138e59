// ==========================================
// TPM/MTO PRO - 实时车队快照
// ==========================================
// 职责: 消费三个集合的订阅流 → 规范化 → 维护最新 FleetSnapshot
// 每应用一次集合快照, revision + 1, 调用方据此重新聚合
// ==========================================

use crate::config::tracker_config::TrackerConfig;
use crate::domain::fleet::FleetSnapshot;
use crate::importer::{FieldMapper, FleetImporter};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::port::{Collection, CollectionSnapshot, PersistencePort};
use chrono::Local;
use futures::stream::{self, StreamExt};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::instrument;

pub struct LiveFleet {
    config: TrackerConfig,
    state: RwLock<FleetSnapshot>,
    revision: watch::Sender<u64>,
}

impl LiveFleet {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            config: config.clone(),
            state: RwLock::new(FleetSnapshot::default()),
            revision: watch::Sender::new(0),
        }
    }

    /// 当前快照 (克隆)
    pub fn snapshot(&self) -> FleetSnapshot {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// 订阅 revision 变化
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// 应用一个集合的全量快照, 返回新的 revision
    #[instrument(skip_all, fields(collection = %update.collection, docs = update.documents.len()))]
    pub fn apply(&self, update: &CollectionSnapshot) -> u64 {
        let importer = FleetImporter::new(FieldMapper::new(Local::now().naive_local(), &self.config));
        {
            let mut state = match self.state.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            match update.collection {
                Collection::People => state.people = importer.import_people(&update.documents).items,
                Collection::Assets => state.assets = importer.import_assets(&update.documents).items,
                Collection::Records => state.records = importer.import_records(&update.documents).items,
            }
        }

        let mut next = 0;
        self.revision.send_modify(|rev| {
            *rev += 1;
            next = *rev;
        });
        tracing::debug!(revision = next, "车队快照已更新");
        next
    }

    /// 一次性加载: 取每个集合订阅的首个快照
    pub async fn load(&self, port: &dyn PersistencePort) -> RepositoryResult<()> {
        for collection in Collection::ALL {
            let mut sub = port.subscribe(collection).await?;
            let first = sub
                .next()
                .await
                .ok_or_else(|| RepositoryError::ChannelClosed(collection.to_string()))?;
            self.apply(&first);
        }
        Ok(())
    }

    /// 持续同步
    ///
    /// 返回前已应用三个集合的初始快照; 后台任务在所有订阅结束后退出
    pub async fn spawn_sync(self: Arc<Self>, port: Arc<dyn PersistencePort>) -> RepositoryResult<JoinHandle<()>> {
        let mut streams = Vec::with_capacity(Collection::ALL.len());
        for collection in Collection::ALL {
            let mut sub = port.subscribe(collection).await?;
            let first = sub
                .next()
                .await
                .ok_or_else(|| RepositoryError::ChannelClosed(collection.to_string()))?;
            self.apply(&first);
            streams.push(sub);
        }

        let mut merged = stream::select_all(streams);
        let fleet = Arc::clone(&self);
        Ok(tokio::spawn(async move {
            while let Some(update) = merged.next().await {
                fleet.apply(&update);
            }
            tracing::info!("车队订阅已结束");
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::document_store::SqliteDocumentStore;
    use crate::repository::port::Document;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_load_normalizes_all_collections() {
        let store = SqliteDocumentStore::new(":memory:").unwrap();
        store
            .write_batch(&[
                Document::new(Collection::People, "U1", json!({ "name": "Ana", "role": "OPERARIO" })),
                Document::new(Collection::Assets, "M1", json!({ "name": "Prensa" })),
                Document::new(Collection::Records, "R1", json!({ "machineId": "M1", "userId": "U1" })),
                Document::new(Collection::Records, "R2", json!({ "userId": "U1" })),
            ])
            .await
            .unwrap();

        let fleet = LiveFleet::new(&TrackerConfig::default());
        fleet.load(&store).await.unwrap();

        let snapshot = fleet.snapshot();
        assert_eq!(snapshot.people.len(), 1);
        assert_eq!(snapshot.assets.len(), 1);
        assert_eq!(snapshot.records.len(), 1, "缺少设备的记录被跳过");
        assert_eq!(fleet.revision(), 3);
    }

    #[tokio::test]
    async fn test_spawn_sync_follows_writes() {
        let store: Arc<SqliteDocumentStore> = Arc::new(SqliteDocumentStore::new(":memory:").unwrap());
        let fleet = Arc::new(LiveFleet::new(&TrackerConfig::default()));
        let mut rx = fleet.watch();

        let handle = Arc::clone(&fleet).spawn_sync(store.clone()).await.unwrap();
        assert_eq!(fleet.revision(), 3);
        let _ = rx.borrow_and_update();

        store
            .write(Document::new(Collection::Assets, "M1", json!({ "name": "Prensa" })))
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("等待快照更新超时")
            .unwrap();

        assert_eq!(fleet.snapshot().assets.len(), 1);
        handle.abort();
    }
}
