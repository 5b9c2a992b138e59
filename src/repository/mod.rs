// ==========================================
// TPM/MTO PRO - 仓储层
// ==========================================
// 职责: 持久化端口 + SQLite 文档库实现 + 实时车队快照
// 红线: Repository 不含业务逻辑
// ==========================================

pub mod document_store;
pub mod error;
pub mod live_fleet;
pub mod port;

pub use document_store::SqliteDocumentStore;
pub use error::{RepositoryError, RepositoryResult};
pub use live_fleet::LiveFleet;
pub use port::{Collection, CollectionSnapshot, Document, PersistencePort};
