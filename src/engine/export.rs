// ==========================================
// TPM/MTO PRO - 记录导出
// ==========================================
// 职责: 记录 → 扁平行 (日期 dd/MM/yyyy, 时间 HH:mm) → CSV
// 表头随界面语言翻译
// ==========================================

use crate::engine::calendar::CompletedEntry;
use crate::i18n::Labels;
use serde::{Deserialize, Serialize};
use std::io;

/// 导出行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub date: String,
    pub time: String,
    pub asset_name: String,
    pub person_name: String,
    pub type_label: String,
    pub observations: String,
}

impl ExportRow {
    /// 故障记录的类型标签追加后缀
    pub fn from_entry(entry: &CompletedEntry, labels: &Labels) -> Self {
        let type_label = if entry.is_issue {
            format!("{} {}", entry.track_label, labels.issue_suffix)
        } else {
            entry.track_label.clone()
        };
        Self {
            date: entry.timestamp.format("%d/%m/%Y").to_string(),
            time: entry.timestamp.format("%H:%M").to_string(),
            asset_name: entry.asset_name.clone(),
            person_name: entry.author_name.clone(),
            type_label,
            observations: entry.observations.clone(),
        }
    }

    /// CSV 列值, 顺序与 `Labels::csv_headers` 一致
    pub fn fields(&self) -> [&str; 6] {
        [
            &self.date,
            &self.time,
            &self.asset_name,
            &self.person_name,
            &self.type_label,
            &self.observations,
        ]
    }
}

pub fn export_rows(entries: &[CompletedEntry], labels: &Labels) -> Vec<ExportRow> {
    entries.iter().map(|e| ExportRow::from_entry(e, labels)).collect()
}

/// 写出 CSV (首行为按语言翻译的表头)
pub fn write_csv<W: io::Write>(writer: W, rows: &[ExportRow], labels: &Labels) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&labels.csv_headers)?;
    for row in rows {
        wtr.write_record(row.fields())?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::TrackType;
    use chrono::NaiveDate;

    fn entry(is_issue: bool) -> CompletedEntry {
        CompletedEntry {
            record_id: "R1".to_string(),
            asset_id: "M1".to_string(),
            asset_name: "Prensa".to_string(),
            author_id: "U1".to_string(),
            author_name: "Ana".to_string(),
            track_type: TrackType::Light,
            track_label: "Light Maintenance".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2026, 3, 7)
                .unwrap()
                .and_hms_opt(6, 5, 0)
                .unwrap(),
            is_issue,
            downtime_minutes: 0,
            observations: "ok, sin novedad".to_string(),
        }
    }

    #[test]
    fn test_row_format() {
        let labels = Labels::for_locale("en");
        let row = ExportRow::from_entry(&entry(true), &labels);
        assert_eq!(row.date, "07/03/2026");
        assert_eq!(row.time, "06:05");
        assert_eq!(row.type_label, "Light Maintenance (FAILURE)");

        let ok = ExportRow::from_entry(&entry(false), &labels);
        assert_eq!(ok.type_label, "Light Maintenance");
    }

    #[test]
    fn test_write_csv() {
        let labels = Labels::for_locale("en");
        let rows = export_rows(&[entry(false)], &labels);
        let mut buf = Vec::new();
        write_csv(&mut buf, &rows, &labels).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Date,Time,Asset,Person,Type,Observations"));
        assert_eq!(lines.next(), Some("07/03/2026,06:05,Prensa,Ana,Light Maintenance,\"ok, sin novedad\""));
    }

    #[test]
    fn test_csv_header_follows_locale() {
        for (locale, header) in [
            ("es", "Fecha,Hora,Equipo,Responsable,Tipo,Observaciones"),
            ("zh-CN", "日期,时间,设备,执行人,类型,备注"),
        ] {
            let labels = Labels::for_locale(locale);
            let mut buf = Vec::new();
            write_csv(&mut buf, &[], &labels).unwrap();
            assert_eq!(String::from_utf8(buf).unwrap().trim_end(), header);
        }
    }
}
