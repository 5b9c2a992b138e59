// ==========================================
// TPM/MTO PRO - 车队快照导入
// ==========================================
// 职责: 一个集合的原始文档 → 领域实体列表
// 红线: 损坏文档跳过并记录 warn, 其余文档照常导入
// ==========================================

use crate::domain::asset::Asset;
use crate::domain::person::Person;
use crate::domain::record::MaintenanceRecord;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::FieldMapper;
use crate::repository::port::{Collection, Document};
use tracing::instrument;

/// 单个集合的导入结果
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome<T> {
    pub items: Vec<T>,
    /// 被跳过的文档 id
    pub skipped: Vec<String>,
}

pub struct FleetImporter {
    mapper: FieldMapper,
}

impl FleetImporter {
    pub fn new(mapper: FieldMapper) -> Self {
        Self { mapper }
    }

    #[instrument(skip_all, fields(docs = docs.len()))]
    pub fn import_people(&self, docs: &[Document]) -> ImportOutcome<Person> {
        self.import_with(Collection::People, docs, |id, body| self.mapper.map_person(id, body))
    }

    #[instrument(skip_all, fields(docs = docs.len()))]
    pub fn import_assets(&self, docs: &[Document]) -> ImportOutcome<Asset> {
        self.import_with(Collection::Assets, docs, |id, body| self.mapper.map_asset(id, body))
    }

    #[instrument(skip_all, fields(docs = docs.len()))]
    pub fn import_records(&self, docs: &[Document]) -> ImportOutcome<MaintenanceRecord> {
        self.import_with(Collection::Records, docs, |id, body| self.mapper.map_record(id, body))
    }

    fn import_with<T, F>(&self, collection: Collection, docs: &[Document], map: F) -> ImportOutcome<T>
    where
        F: Fn(&str, &serde_json::Value) -> ImportResult<T>,
    {
        let mut items = Vec::with_capacity(docs.len());
        let mut skipped = Vec::new();

        for doc in docs.iter().filter(|d| d.collection == collection) {
            match map(&doc.id, &doc.body) {
                Ok(item) => items.push(item),
                Err(e) => {
                    tracing::warn!(collection = %collection, doc_id = %doc.id, error = %e, "跳过损坏文档");
                    skipped.push(doc.id.clone());
                }
            }
        }

        if !skipped.is_empty() {
            tracing::info!(collection = %collection, imported = items.len(), skipped = skipped.len(), "集合导入完成");
        }
        ImportOutcome { items, skipped }
    }
}
