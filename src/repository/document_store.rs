// ==========================================
// TPM/MTO PRO - SQLite 文档库
// ==========================================
// 职责: PersistencePort 的 SQLite 实现 (documents 表, body 为 JSON)
// 订阅: 每个集合一个 broadcast 通道; 每次写入/删除后推送该集合全量快照
// 红线: Repository 不含业务逻辑，只负责文档搬运
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::perf::install_sqlite_tracing;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::port::{Collection, CollectionSnapshot, Document, PersistencePort};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// 订阅通道容量; 落后的订阅者会收到 Lagged, 随后重读全量快照
const SUBSCRIPTION_CAPACITY: usize = 64;

// ==========================================
// SqliteDocumentStore - 文档库
// ==========================================
pub struct SqliteDocumentStore {
    conn: Arc<Mutex<Connection>>,
    channels: HashMap<Collection, broadcast::Sender<CollectionSnapshot>>,
}

impl SqliteDocumentStore {
    /// 打开 (或创建) 数据库文件
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let mut conn = open_sqlite_connection(db_path)?;
        install_sqlite_tracing(&mut conn);
        init_schema(&conn)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建 (调用方负责建表)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        let channels = Collection::ALL
            .iter()
            .map(|c| (*c, broadcast::channel(SUBSCRIPTION_CAPACITY).0))
            .collect();
        Self { conn, channels }
    }

    /// 共享连接 (供配置管理器复用)
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// 当前全量快照
    pub fn snapshot(&self, collection: Collection) -> RepositoryResult<CollectionSnapshot> {
        read_snapshot(&self.conn, collection)
    }

    /// 推送集合全量快照
    ///
    /// 调用方必须持有连接锁, 保证推送顺序与提交顺序一致
    fn publish_locked(&self, conn: &Connection, collection: Collection) -> RepositoryResult<()> {
        let Some(tx) = self.channels.get(&collection) else {
            return Ok(());
        };
        if tx.receiver_count() == 0 {
            return Ok(());
        }
        let snapshot = query_snapshot(conn, collection)?;
        // 订阅者在读快照期间全部退出时 send 失败, 可忽略
        let _ = tx.send(snapshot);
        Ok(())
    }

    fn sender(&self, collection: Collection) -> RepositoryResult<&broadcast::Sender<CollectionSnapshot>> {
        self.channels
            .get(&collection)
            .ok_or_else(|| RepositoryError::ChannelClosed(collection.to_string()))
    }
}

#[async_trait]
impl PersistencePort for SqliteDocumentStore {
    async fn connect(&self) -> RepositoryResult<()> {
        let conn = lock(&self.conn)?;
        init_schema(&conn)?;
        tracing::debug!("文档库已连接");
        Ok(())
    }

    async fn subscribe(&self, collection: Collection) -> RepositoryResult<BoxStream<'static, CollectionSnapshot>> {
        // 持锁订阅并读快照: 其间不会有推送, 初始快照之后的变更全部可见
        let (rx, initial) = {
            let conn = lock(&self.conn)?;
            let rx = self.sender(collection)?.subscribe();
            (rx, query_snapshot(&conn, collection)?)
        };
        let conn = Arc::clone(&self.conn);

        let updates = stream::unfold((rx, conn), move |(mut rx, conn)| async move {
            loop {
                match rx.recv().await {
                    Ok(snapshot) => return Some((snapshot, (rx, conn))),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(collection = %collection, missed, "订阅落后, 重读全量快照");
                        match read_snapshot(&conn, collection) {
                            Ok(snapshot) => return Some((snapshot, (rx, conn))),
                            Err(e) => tracing::warn!(collection = %collection, error = %e, "重读快照失败"),
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        Ok(stream::once(async move { initial }).chain(updates).boxed())
    }

    async fn write(&self, document: Document) -> RepositoryResult<()> {
        let conn = lock(&self.conn)?;
        upsert(&conn, &document)?;
        tracing::debug!(collection = %document.collection, doc_id = %document.id, "文档已写入");
        self.publish_locked(&conn, document.collection)
    }

    async fn write_batch(&self, documents: &[Document]) -> RepositoryResult<usize> {
        let conn = lock(&self.conn)?;
        let tx = conn.unchecked_transaction()?;
        for doc in documents {
            upsert(&tx, doc)?;
        }
        tx.commit()?;
        tracing::debug!(count = documents.len(), "批量写入已提交");

        for collection in Collection::ALL {
            if documents.iter().any(|d| d.collection == collection) {
                self.publish_locked(&conn, collection)?;
            }
        }
        Ok(documents.len())
    }

    async fn delete(&self, collection: Collection, id: &str) -> RepositoryResult<bool> {
        let conn = lock(&self.conn)?;
        let affected = conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
            params![collection.as_str(), id],
        )?;
        if affected > 0 {
            tracing::debug!(collection = %collection, doc_id = id, "文档已删除");
            self.publish_locked(&conn, collection)?;
        }
        Ok(affected > 0)
    }

    async fn get(&self, collection: Collection, id: &str) -> RepositoryResult<Option<Document>> {
        let conn = lock(&self.conn)?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2",
                params![collection.as_str(), id],
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(text) => Ok(Some(Document::new(collection, id, serde_json::from_str(&text)?))),
            None => Ok(None),
        }
    }
}

// ==========================================
// 内部 SQL
// ==========================================

fn lock(conn: &Arc<Mutex<Connection>>) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| RepositoryError::LockError(e.to_string()))
}

fn upsert(conn: &Connection, doc: &Document) -> RepositoryResult<()> {
    let body = serde_json::to_string(&doc.body)?;
    conn.execute(
        r#"
        INSERT INTO documents (collection, doc_id, body, updated_at)
        VALUES (?1, ?2, ?3, datetime('now'))
        ON CONFLICT(collection, doc_id) DO UPDATE SET
            body = excluded.body,
            updated_at = excluded.updated_at
        "#,
        params![doc.collection.as_str(), doc.id, body],
    )?;
    Ok(())
}

fn read_snapshot(conn: &Arc<Mutex<Connection>>, collection: Collection) -> RepositoryResult<CollectionSnapshot> {
    let conn = lock(conn)?;
    query_snapshot(&conn, collection)
}

fn query_snapshot(conn: &Connection, collection: Collection) -> RepositoryResult<CollectionSnapshot> {
    let mut stmt = conn.prepare("SELECT doc_id, body FROM documents WHERE collection = ?1 ORDER BY doc_id")?;
    let rows = stmt.query_map(params![collection.as_str()], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut documents = Vec::new();
    for row in rows {
        let (id, text) = row?;
        match serde_json::from_str(&text) {
            Ok(body) => documents.push(Document::new(collection, id, body)),
            Err(e) => tracing::warn!(collection = %collection, doc_id = %id, error = %e, "文档 JSON 损坏, 跳过"),
        }
    }

    Ok(CollectionSnapshot {
        collection,
        documents: Arc::new(documents),
    })
}
