// ==========================================
// TPM/MTO PRO - 车队快照
// ==========================================
// 职责: 持久化层推送的三个集合在内存中的聚合视图
// 红线: 引擎只读快照, 不直接修改
// ==========================================

use crate::domain::asset::Asset;
use crate::domain::person::Person;
use crate::domain::record::MaintenanceRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub people: Vec<Person>,
    pub assets: Vec<Asset>,
    pub records: Vec<MaintenanceRecord>,
}

impl FleetSnapshot {
    pub fn new(people: Vec<Person>, assets: Vec<Asset>, records: Vec<MaintenanceRecord>) -> Self {
        Self {
            people,
            assets,
            records,
        }
    }

    /// 构建只读索引, 供一次聚合内重复查找
    pub fn index(&self) -> FleetIndex<'_> {
        FleetIndex {
            assets: self.assets.iter().map(|a| (a.id.as_str(), a)).collect(),
            people: self.people.iter().map(|p| (p.id.as_str(), p)).collect(),
        }
    }

    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn person(&self, id: &str) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }

    pub fn record(&self, id: &str) -> Option<&MaintenanceRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}

/// 按 id 的查找表
///
/// 查不到返回 None, 由调用方替换为哨兵标签
pub struct FleetIndex<'a> {
    assets: HashMap<&'a str, &'a Asset>,
    people: HashMap<&'a str, &'a Person>,
}

impl<'a> FleetIndex<'a> {
    pub fn asset(&self, id: &str) -> Option<&'a Asset> {
        self.assets.get(id).copied()
    }

    pub fn person(&self, id: &str) -> Option<&'a Person> {
        self.people.get(id).copied()
    }
}
