// ==========================================
// TPM/MTO PRO - 导入层
// ==========================================
// 职责: 持久化端口边界的规范化
// 宽松文档 → 带默认值的强类型实体 (反方向统一写回双轨道形态)
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod fleet_importer;
pub mod raw;

pub use error::{ImportError, ImportResult};
pub use field_mapper::{asset_document, person_document, record_document, FieldMapper};
pub use fleet_importer::{FleetImporter, ImportOutcome};
