// ==========================================
// TPM/MTO PRO - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::tracker_config::TrackerConfig;
use crate::domain::asset::MAX_INTERVAL_DAYS;
use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置
    pub fn get_config_snapshot(&self) -> RepositoryResult<HashMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut config_map = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }

    /// 加载跟踪参数
    ///
    /// 缺失的键使用默认值; 无法解析的值记录告警后使用默认值
    pub fn load_tracker_config(&self) -> RepositoryResult<TrackerConfig> {
        let kv = self.get_config_snapshot()?;
        let defaults = TrackerConfig::default();

        let config = TrackerConfig {
            operator_interval_days: interval_or_default(
                &kv,
                config_keys::OPERATOR_INTERVAL_DAYS,
                defaults.operator_interval_days,
            ),
            leader_interval_days: interval_or_default(
                &kv,
                config_keys::LEADER_INTERVAL_DAYS,
                defaults.leader_interval_days,
            ),
            nominal_month_days: interval_or_default(
                &kv,
                config_keys::NOMINAL_MONTH_DAYS,
                defaults.nominal_month_days,
            ),
            low_volume_threshold: parse_or_default(
                &kv,
                config_keys::LOW_VOLUME_THRESHOLD,
                defaults.low_volume_threshold,
            ),
            recent_events_limit: parse_or_default(
                &kv,
                config_keys::RECENT_EVENTS_LIMIT,
                defaults.recent_events_limit,
            ),
            locale: kv
                .get(config_keys::LOCALE)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.locale),
        };

        tracing::debug!(?config, "跟踪参数已加载");
        Ok(config)
    }
}

fn parse_or_default<T>(kv: &HashMap<String, String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match kv.get(key) {
        None => default,
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(config_key = key, raw_value = %raw, default = %default, "配置格式错误，使用默认值");
            default
        }),
    }
}

/// 周期类配置必须在 1..=MAX_INTERVAL_DAYS 之间
fn interval_or_default(kv: &HashMap<String, String>, key: &str, default: u32) -> u32 {
    let value = parse_or_default(kv, key, default);
    if value == 0 || value > MAX_INTERVAL_DAYS {
        tracing::warn!(config_key = key, value, default, "保养周期越界，使用默认值");
        return default;
    }
    value
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 保养周期
    pub const OPERATOR_INTERVAL_DAYS: &str = "operator_interval_days";
    pub const LEADER_INTERVAL_DAYS: &str = "leader_interval_days";

    // KPI
    pub const NOMINAL_MONTH_DAYS: &str = "nominal_month_days";
    pub const LOW_VOLUME_THRESHOLD: &str = "low_volume_threshold";
    pub const RECENT_EVENTS_LIMIT: &str = "recent_events_limit";

    // 展示
    pub const LOCALE: &str = "locale";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConfigManager {
        ConfigManager::new(":memory:").unwrap()
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = manager().load_tracker_config().unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.operator_interval_days, 15);
        assert_eq!(config.leader_interval_days, 30);
        assert_eq!(config.nominal_month_days, 30);
    }

    #[test]
    fn test_override_and_fallback() {
        let manager = manager();
        manager.set_global_config_value(config_keys::OPERATOR_INTERVAL_DAYS, "7").unwrap();
        manager.set_global_config_value(config_keys::LEADER_INTERVAL_DAYS, "0").unwrap();
        manager.set_global_config_value(config_keys::LOW_VOLUME_THRESHOLD, "muchos").unwrap();
        manager.set_global_config_value(config_keys::LOCALE, "en").unwrap();

        let config = manager.load_tracker_config().unwrap();
        assert_eq!(config.operator_interval_days, 7);
        assert_eq!(config.leader_interval_days, 30, "0 天周期应回退默认值");
        assert_eq!(config.low_volume_threshold, 4, "无法解析应回退默认值");
        assert_eq!(config.locale, "en");
    }

    #[test]
    fn test_oversized_interval_falls_back() {
        let manager = manager();
        manager
            .set_global_config_value(config_keys::OPERATOR_INTERVAL_DAYS, "200000000")
            .unwrap();

        let config = manager.load_tracker_config().unwrap();
        assert_eq!(config.operator_interval_days, 15);
    }
}
