// ==========================================
// TPM/MTO PRO - 命令行入口
// ==========================================
// 用法: tpm-mto-pro [db_path] [person_id] [YYYY-MM-DD]
// - 无 person_id: 输出全车队 KPI + 可用性
// - 有 person_id: 输出该人员的角色看板
// 输出均为 JSON (stdout), 日志走 stderr
// ==========================================

use chrono::{Local, NaiveDate};
use std::error::Error;
use tpm_mto_pro::app::{get_default_db_path, AppState};
use tpm_mto_pro::engine::KpiQuery;

fn main() -> Result<(), Box<dyn Error>> {
    // 初始化日志系统
    tpm_mto_pro::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 设备保养跟踪", tpm_mto_pro::APP_NAME);
    tracing::info!("系统版本: {}", tpm_mto_pro::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let db_path = args.first().cloned().unwrap_or_else(get_default_db_path);
    let person_id = args.get(1).filter(|s| !s.trim().is_empty()).cloned();
    let today = match args.get(2) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")?,
        None => Local::now().date_naive(),
    };
    tracing::info!("使用数据库: {}", db_path);

    let runtime = tokio::runtime::Runtime::new()?;
    let output = runtime.block_on(async {
        let state = AppState::new(db_path)?;
        tpm_mto_pro::i18n::set_locale(&state.config.locale);
        state.load_once().await?;

        let value = match person_id {
            Some(id) => {
                let view = state.dashboard_api.dashboard_for(&id, today).map_err(|e| e.to_string())?;
                serde_json::to_value(view).map_err(|e| e.to_string())?
            }
            None => {
                let kpi = state
                    .dashboard_api
                    .fleet_kpi(&KpiQuery::default(), today)
                    .map_err(|e| e.to_string())?;
                serde_json::json!({
                    "kpi": kpi,
                    "availability": state.dashboard_api.availability(today),
                })
            }
        };
        Ok::<_, String>(value)
    })?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
