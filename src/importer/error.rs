// ==========================================
// TPM/MTO PRO - 文档映射错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 映射错误只用于跳过单个文档, 不向上中断快照
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("文档结构无法解析 (集合 {collection}, 文档 {doc_id}): {message}")]
    MalformedDocument {
        collection: String,
        doc_id: String,
        message: String,
    },

    #[error("必填字段缺失 (文档 {doc_id}): {field}")]
    MissingField { doc_id: String, field: String },
}

pub type ImportResult<T> = Result<T, ImportError>;
