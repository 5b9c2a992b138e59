// ==========================================
// TPM/MTO PRO - 点检清单目录
// ==========================================
// 职责: 按设备类型 + 轨道给出点检项; 汇总点检结果
// 红线: 任一点检项未通过 → 记录为故障
// ==========================================

use crate::domain::types::{AssetType, TrackType};
use serde::{Deserialize, Serialize};

const MACHINE_LIGHT: &[&str] = &["Lubricación", "Limpieza", "Ajustes", "Sensores", "Fugas"];
const VEHICLE_LIGHT: &[&str] = &["Niveles de aceite", "Presión de neumáticos", "Luces", "Frenos", "Limpieza"];
const FORKLIFT_LIGHT: &[&str] = &["Nivel de batería/combustible", "Horquillas", "Cadenas de elevación", "Bocina y luces", "Fugas hidráulicas"];

const MACHINE_HEAVY: &[&str] = &["Guardas de seguridad", "Paro de emergencia", "Anclajes y estructura", "Tablero eléctrico"];
const VEHICLE_HEAVY: &[&str] = &["Suspensión", "Dirección", "Chasis", "Cinturones y extintor"];
const FORKLIFT_HEAVY: &[&str] = &["Mástil y estructura", "Sistema hidráulico", "Cinturón de seguridad", "Placa de capacidad"];

/// 点检项目录
///
/// 负责人轨道 = 基础项 + 结构/安全项
pub fn checklist_items(asset_type: AssetType, track: TrackType) -> Vec<&'static str> {
    let (base, heavy) = match asset_type {
        AssetType::Machine => (MACHINE_LIGHT, MACHINE_HEAVY),
        AssetType::Vehicle => (VEHICLE_LIGHT, VEHICLE_HEAVY),
        AssetType::Forklift => (FORKLIFT_LIGHT, FORKLIFT_HEAVY),
    };
    let mut items = base.to_vec();
    if track == TrackType::Heavy {
        items.extend_from_slice(heavy);
    }
    items
}

/// 单项点检结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItemResult {
    pub item: String,
    pub passed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistResult {
    pub items: Vec<ChecklistItemResult>,
}

impl ChecklistResult {
    /// 由目录 + 通过标记构建; 缺少的标记视为未通过
    pub fn from_flags(items: &[&str], passed: &[bool]) -> Self {
        Self {
            items: items
                .iter()
                .enumerate()
                .map(|(i, item)| ChecklistItemResult {
                    item: item.to_string(),
                    passed: passed.get(i).copied().unwrap_or(false),
                })
                .collect(),
        }
    }

    /// 全部通过
    pub fn all_passed(items: &[&str]) -> Self {
        Self::from_flags(items, &vec![true; items.len()])
    }

    pub fn has_failures(&self) -> bool {
        self.items.iter().any(|i| !i.passed)
    }

    pub fn failed_items(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|i| !i.passed)
            .map(|i| i.item.as_str())
            .collect()
    }
}

/// 拼接记录的观察文本
///
/// 格式: "<自由文本> | FALLAS: a, b | PARADA: N min", 空段省略
pub fn compose_observations(result: &ChecklistResult, text: &str, downtime_minutes: u32) -> String {
    let mut parts = Vec::new();
    let text = text.trim();
    if !text.is_empty() {
        parts.push(text.to_string());
    }
    let failed = result.failed_items();
    if !failed.is_empty() {
        parts.push(format!("FALLAS: {}", failed.join(", ")));
    }
    if downtime_minutes > 0 {
        parts.push(format!("PARADA: {} min", downtime_minutes));
    }
    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_per_type_and_track() {
        let light = checklist_items(AssetType::Machine, TrackType::Light);
        assert_eq!(light, vec!["Lubricación", "Limpieza", "Ajustes", "Sensores", "Fugas"]);

        let heavy = checklist_items(AssetType::Machine, TrackType::Heavy);
        assert_eq!(heavy.len(), 9);
        assert!(heavy.starts_with(&light));
        assert!(heavy.contains(&"Paro de emergencia"));

        assert!(checklist_items(AssetType::Forklift, TrackType::Light).contains(&"Horquillas"));
        assert!(checklist_items(AssetType::Vehicle, TrackType::Heavy).contains(&"Chasis"));
    }

    #[test]
    fn test_missing_flag_counts_as_failure() {
        let items = checklist_items(AssetType::Machine, TrackType::Light);
        let result = ChecklistResult::from_flags(&items, &[true, true, true, true]);
        assert!(result.has_failures());
        assert_eq!(result.failed_items(), vec!["Fugas"]);

        assert!(!ChecklistResult::all_passed(&items).has_failures());
    }

    #[test]
    fn test_compose_observations() {
        let items = checklist_items(AssetType::Machine, TrackType::Light);
        let result = ChecklistResult::from_flags(&items, &[true, false, true, true, false]);
        assert_eq!(
            compose_observations(&result, " ruido en eje ", 45),
            "ruido en eje | FALLAS: Limpieza, Fugas | PARADA: 45 min"
        );
        assert_eq!(compose_observations(&ChecklistResult::all_passed(&items), "", 0), "");
    }
}
