// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持西班牙语（默认）、英文和中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use crate::domain::types::{Role, TrackType};
use serde::{Deserialize, Serialize};

/// 默认语言
pub const DEFAULT_LOCALE: &str = "es";

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"es"、"en" 或 "zh-CN"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（当前语言）
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（指定语言, 不读写全局 locale）
pub fn t_for(key: &str, locale: &str) -> String {
    rust_i18n::t!(key, locale = locale).to_string()
}

// ==========================================
// Labels - 展示标签快照
// ==========================================
// 聚合一次性取用的标签集合; 引擎只接收已解析的字符串,
// 不依赖全局 locale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Labels {
    pub locale: String,
    /// 记录引用的设备已被删除
    pub asset_deleted: String,
    /// 记录引用的人员不存在
    pub unknown_person: String,
    /// 轨道未指定责任人
    pub unassigned: String,
    pub track_light: String,
    pub track_heavy: String,
    pub role_operator: String,
    pub role_leader: String,
    pub role_manager: String,
    pub role_supervisor: String,
    pub issue_suffix: String,
    /// 导出 CSV 表头 (列顺序与 ExportRow 一致)
    pub csv_headers: Vec<String>,
}

/// 导出 CSV 表头的翻译键
const CSV_HEADER_KEYS: [&str; 6] = [
    "export.header_date",
    "export.header_time",
    "export.header_asset",
    "export.header_person",
    "export.header_type",
    "export.header_observations",
];

impl Labels {
    /// 按语言解析全部标签
    pub fn for_locale(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            asset_deleted: t_for("label.asset_deleted", locale),
            unknown_person: t_for("label.unknown_person", locale),
            unassigned: t_for("label.unassigned", locale),
            track_light: t_for("track.light", locale),
            track_heavy: t_for("track.heavy", locale),
            role_operator: t_for("role.operator", locale),
            role_leader: t_for("role.leader", locale),
            role_manager: t_for("role.manager", locale),
            role_supervisor: t_for("role.supervisor", locale),
            issue_suffix: t_for("export.issue_suffix", locale),
            csv_headers: CSV_HEADER_KEYS.iter().map(|key| t_for(key, locale)).collect(),
        }
    }

    pub fn track(&self, track_type: TrackType) -> &str {
        match track_type {
            TrackType::Light => &self.track_light,
            TrackType::Heavy => &self.track_heavy,
        }
    }

    pub fn role(&self, role: Role) -> &str {
        match role {
            Role::Operator => &self.role_operator,
            Role::Leader => &self.role_leader,
            Role::Manager => &self.role_manager,
            Role::Supervisor => &self.role_supervisor,
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::for_locale(DEFAULT_LOCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(current_locale(), "en");
        assert_eq!(t("common.success"), "Operation successful");

        set_locale(DEFAULT_LOCALE);
        assert_eq!(current_locale(), "es");
    }

    #[test]
    fn test_labels_do_not_touch_global_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale(DEFAULT_LOCALE);

        let en = Labels::for_locale("en");
        assert_eq!(en.asset_deleted, "Asset Deleted");
        assert_eq!(en.track(TrackType::Heavy), "Heavy Maintenance");
        assert_eq!(current_locale(), "es", "按语言取标签不应切换全局语言");

        let zh = Labels::for_locale("zh-CN");
        assert_eq!(zh.asset_deleted, "设备已删除");
        assert_eq!(zh.role(Role::Operator), "操作工");
        assert_eq!(zh.csv_headers[0], "日期");
    }

    #[test]
    fn test_default_labels_are_spanish() {
        let labels = Labels::default();
        assert_eq!(labels.locale, "es");
        assert_eq!(labels.role(Role::Leader), "LÍDER MANTENIMIENTO");
        assert_eq!(
            labels.csv_headers,
            vec!["Fecha", "Hora", "Equipo", "Responsable", "Tipo", "Observaciones"]
        );
    }
}
