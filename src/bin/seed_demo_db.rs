// ==========================================
// TPM/MTO PRO - 演示数据库生成
// ==========================================
// 用法: seed_demo_db [db_path] [history_days]
// 旧库先备份再重建, 生成人员/设备/近 N 天记录
// ==========================================

use chrono::{Duration, Local, NaiveDateTime};
use std::error::Error;
use std::fs;
use std::path::Path;

use tpm_mto_pro::app::get_default_db_path;
use tpm_mto_pro::domain::{Asset, AssetStatus, AssetType, MaintenanceRecord, Person, Role, TrackType};
use tpm_mto_pro::importer::{asset_document, person_document, record_document};
use tpm_mto_pro::repository::{Collection, Document, PersistencePort, SqliteDocumentStore};

const DEFAULT_HISTORY_DAYS: i64 = 45;

fn main() -> Result<(), Box<dyn Error>> {
    tpm_mto_pro::logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    let history_days = std::env::args()
        .nth(2)
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_HISTORY_DAYS)
        .clamp(1, 365);

    backup_and_reset_db(&db_path)?;

    let store = SqliteDocumentStore::new(&db_path)?;
    let now = Local::now().naive_local();

    let people = seed_people();
    let assets = seed_assets(now);
    let records = seed_records(&assets, now, history_days);

    let mut documents = Vec::with_capacity(people.len() + assets.len() + records.len());
    documents.extend(
        people
            .iter()
            .map(|p| Document::new(Collection::People, p.id.clone(), person_document(p))),
    );
    documents.extend(
        assets
            .iter()
            .map(|a| Document::new(Collection::Assets, a.id.clone(), asset_document(a))),
    );
    documents.extend(
        records
            .iter()
            .map(|r| Document::new(Collection::Records, r.id.clone(), record_document(r))),
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let written = runtime.block_on(store.write_batch(&documents))?;
    eprintln!(
        "Seeded {}: people={}, assets={}, records={} (documents={})",
        db_path,
        people.len(),
        assets.len(),
        records.len(),
        written
    );
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

fn seed_people() -> Vec<Person> {
    let mut people = vec![
        Person::new("U-OP-1", "Ana Torres", Role::Operator),
        Person::new("U-OP-2", "Luis Pérez", Role::Operator),
        Person::new("U-OP-3", "Marta Díaz", Role::Operator),
        Person::new("U-LD-1", "Carlos Ruiz", Role::Leader),
        Person::new("U-LD-2", "Elena Vega", Role::Leader),
        Person::new("U-SV-1", "Jorge Mora", Role::Supervisor),
        Person::new("U-MG-1", "Sofía León", Role::Manager),
    ];
    for (idx, person) in people.iter_mut().enumerate() {
        person.pin = Some(format!("{:04}", 1000 + idx));
    }
    people
}

fn seed_assets(now: NaiveDateTime) -> Vec<Asset> {
    let specs: [(&str, &str, AssetType, Option<&str>, Option<&str>); 8] = [
        ("M-01", "Prensa 01", AssetType::Machine, Some("U-OP-1"), Some("U-LD-1")),
        ("M-02", "Torno CNC", AssetType::Machine, Some("U-OP-1"), Some("U-LD-1")),
        ("M-03", "Inyectora 02", AssetType::Machine, Some("U-OP-2"), Some("U-LD-2")),
        ("M-04", "Compresor", AssetType::Machine, None, Some("U-LD-2")),
        ("V-01", "Camión Reparto", AssetType::Vehicle, Some("U-OP-3"), Some("U-LD-1")),
        ("V-02", "Camioneta", AssetType::Vehicle, Some("U-OP-3"), None),
        ("F-01", "Montacargas A", AssetType::Forklift, Some("U-OP-2"), Some("U-LD-2")),
        ("F-02", "Montacargas B", AssetType::Forklift, None, None),
    ];

    specs
        .iter()
        .enumerate()
        .map(|(idx, (id, name, asset_type, operator, leader))| {
            let mut asset = Asset::new(*id, *name, *asset_type, now);
            // 错开上次保养时间, 演示 OK / DUE_TODAY / MISSED 混合
            asset.operator_track.last_serviced_at = now - Duration::days(idx as i64 % 3);
            asset.leader_track.last_serviced_at = now - Duration::days(3 + (idx as i64 * 2) % 10);
            asset.operator_track.responsible_id = operator.map(str::to_string);
            asset.leader_track.responsible_id = leader.map(str::to_string);
            if *id == "F-02" {
                asset.status = AssetStatus::Stopped;
            }
            asset
        })
        .collect()
}

fn seed_records(assets: &[Asset], now: NaiveDateTime, history_days: i64) -> Vec<MaintenanceRecord> {
    let mut records = Vec::new();
    for day in (1..=history_days).rev() {
        for (idx, asset) in assets.iter().enumerate() {
            // 约三分之一的天数缺勤, 制造合规缺口
            if (day + idx as i64) % 3 == 0 {
                continue;
            }
            let at = now - Duration::days(day) + Duration::minutes(idx as i64 * 17);
            let author = asset.operator_track.responsible_id.as_deref().unwrap_or("U-OP-2");
            let mut record = MaintenanceRecord::new(
                format!("R-{}-{}", asset.id, day),
                asset.id.clone(),
                author,
                at,
                TrackType::Light,
            );
            record.observations = "Rutina completa".to_string();
            if (day * 7 + idx as i64) % 23 == 0 {
                record.is_issue = true;
                record.downtime_minutes = 30 + (idx as u32 * 15);
                record.observations = format!("Rutina | FALLAS: Fugas | PARADA: {} min", record.downtime_minutes);
                if day > 5 {
                    record.resolve("U-LD-1", at + Duration::hours(4), "Reparado en turno");
                }
            }
            records.push(record);

            if day % 7 == 0 {
                if let Some(leader) = asset.leader_track.responsible_id.as_deref() {
                    let mut heavy = MaintenanceRecord::new(
                        format!("RH-{}-{}", asset.id, day),
                        asset.id.clone(),
                        leader,
                        at + Duration::hours(2),
                        TrackType::Heavy,
                    );
                    heavy.observations = "Revisión semanal".to_string();
                    records.push(heavy);
                }
            }
        }
    }
    records
}
