// ==========================================
// TPM/MTO PRO - 人员实体
// ==========================================

use crate::domain::types::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
    /// 签认前的轻量确认码 (不是安全边界)
    #[serde(default)]
    pub pin: Option<String>,
}

impl Person {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            phone: None,
            pin: None,
        }
    }

    /// 确认 PIN
    ///
    /// 未设置 PIN 的人员无需确认
    pub fn confirm_pin(&self, input: Option<&str>) -> bool {
        match self.pin.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            None => true,
            Some(pin) => input.map(str::trim) == Some(pin),
        }
    }
}
