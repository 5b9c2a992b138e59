// ==========================================
// TPM/MTO PRO - 持久化端口
// ==========================================
// 职责: 文档集合的连接 / 订阅 / 写入 (单条与批量) / 删除
// 订阅语义: 先推送当前全量快照, 之后每次变更再推送全量快照
// 红线: 端口只搬运文档, 不做字段规范化 (交给 importer)
// ==========================================

use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// 文档集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    People,
    Assets,
    Records,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::People, Collection::Assets, Collection::Records];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::People => "people",
            Collection::Assets => "assets",
            Collection::Records => "records",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 原始文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub collection: Collection,
    pub id: String,
    pub body: Value,
}

impl Document {
    pub fn new(collection: Collection, id: impl Into<String>, body: Value) -> Self {
        Self {
            collection,
            id: id.into(),
            body,
        }
    }
}

/// 集合全量快照
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot {
    pub collection: Collection,
    pub documents: Arc<Vec<Document>>,
}

// ==========================================
// PersistencePort Trait
// ==========================================
// 实现者: SqliteDocumentStore
#[async_trait]
pub trait PersistencePort: Send + Sync {
    /// 建立连接 (幂等)
    async fn connect(&self) -> RepositoryResult<()>;

    /// 订阅集合
    ///
    /// 流的第一项是订阅时刻的全量快照
    async fn subscribe(&self, collection: Collection) -> RepositoryResult<BoxStream<'static, CollectionSnapshot>>;

    /// 写入文档 (存在则覆盖)
    async fn write(&self, document: Document) -> RepositoryResult<()>;

    /// 批量写入, 全部成功或全部不生效; 返回写入条数
    async fn write_batch(&self, documents: &[Document]) -> RepositoryResult<usize>;

    /// 删除文档, 返回是否存在
    async fn delete(&self, collection: Collection, id: &str) -> RepositoryResult<bool>;

    /// 读取单个文档
    async fn get(&self, collection: Collection, id: &str) -> RepositoryResult<Option<Document>>;
}
