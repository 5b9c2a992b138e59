// ==========================================
// TPM/MTO PRO - 到期判定引擎
// ==========================================
// 职责: 设备轨道 + 基准日期 → 下次到期日 / 到期状态 / 单日计划标记
// 红线: 纯函数, 不抛错; 非法日期回退为"现在"
//       当天到期不算逾期
// ==========================================

use crate::domain::asset::Asset;
use crate::domain::types::{DueStatus, TrackDayMark, TrackType};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// 可接受的无时区时间格式 (按顺序尝试)
const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// 日期回退策略: 解析失败或缺失时返回 `now`
///
/// 支持:
/// - RFC3339 (取其本地时间部分)
/// - `YYYY-MM-DDTHH:MM:SS[.fff]` / `YYYY-MM-DD HH:MM:SS`
/// - `YYYY-MM-DD` (当天 00:00)
pub fn safe_date(input: Option<&str>, now: NaiveDateTime) -> NaiveDateTime {
    let raw = match input.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return now,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.naive_local();
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return dt;
        }
    }
    if let Some(dt) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return dt;
    }

    tracing::debug!(raw = %raw, fallback = %now, "日期无法解析, 回退为当前时间");
    now
}

// ==========================================
// DueStatusEvaluator - 到期判定引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct DueStatusEvaluator;

impl DueStatusEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// 下次到期日
    pub fn next_due(&self, asset: &Asset, track_type: TrackType) -> NaiveDate {
        asset.track(track_type).next_due_date()
    }

    /// 轨道到期状态
    ///
    /// - 停用设备 → NotApplicable
    /// - next_due < today → Missed
    /// - 其他 (含今天) → Upcoming
    pub fn evaluate(&self, asset: &Asset, track_type: TrackType, today: NaiveDate) -> DueStatus {
        if asset.is_stopped() {
            return DueStatus::NotApplicable;
        }
        if self.next_due(asset, track_type) < today {
            DueStatus::Missed
        } else {
            DueStatus::Upcoming
        }
    }

    /// 指定日期的计划标记
    ///
    /// 只有 day == next_due 时有标记:
    /// - day < today → Missed
    /// - day >= today → Planned
    pub fn evaluate_day(
        &self,
        asset: &Asset,
        track_type: TrackType,
        day: NaiveDate,
        today: NaiveDate,
    ) -> Option<TrackDayMark> {
        if asset.is_stopped() || self.next_due(asset, track_type) != day {
            return None;
        }
        if day < today {
            Some(TrackDayMark::Missed)
        } else {
            Some(TrackDayMark::Planned)
        }
    }

    /// 设备合规: 两条轨道都没有逾期 (停用设备不参与, 调用方需先排除)
    pub fn is_compliant(&self, asset: &Asset, today: NaiveDate) -> bool {
        TrackType::ALL
            .iter()
            .all(|t| self.evaluate(asset, *t, today) != DueStatus::Missed)
    }

    /// 设备是否有任一轨道逾期
    pub fn has_missed_track(&self, asset: &Asset, today: NaiveDate) -> bool {
        TrackType::ALL
            .iter()
            .any(|t| self.evaluate(asset, *t, today) == DueStatus::Missed)
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{AssetStatus, AssetType};
    use chrono::Duration;

    /// 基准日期: 2026-10-18
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn now() -> NaiveDateTime {
        today().and_hms_opt(9, 0, 0).unwrap()
    }

    fn asset_serviced_days_ago(days: i64, interval: u32) -> Asset {
        let mut asset = Asset::new("M1", "Inyectora 1", AssetType::Machine, now());
        asset.operator_track.last_serviced_at = now() - Duration::days(days);
        asset.operator_track.interval_days = interval;
        asset
    }

    // ==========================================
    // 日期回退
    // ==========================================

    #[test]
    fn test_safe_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 4)
            .unwrap()
            .and_hms_opt(5, 6, 7)
            .unwrap();
        assert_eq!(safe_date(Some("2026-03-04T05:06:07Z"), now()), expected);
        assert_eq!(safe_date(Some("2026-03-04T05:06:07.250"), now()).date(), expected.date());
        assert_eq!(safe_date(Some("2026-03-04 05:06:07"), now()), expected);
        assert_eq!(
            safe_date(Some("2026-03-04"), now()),
            NaiveDate::from_ymd_opt(2026, 3, 4).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_safe_date_falls_back_to_now() {
        assert_eq!(safe_date(None, now()), now());
        assert_eq!(safe_date(Some(""), now()), now());
        assert_eq!(safe_date(Some("ayer"), now()), now());
        assert_eq!(safe_date(Some("2026-13-45"), now()), now());
    }

    #[test]
    fn test_new_asset_is_never_overdue() {
        // 新设备上次保养时间回退为"现在", 不会被误判为逾期
        let engine = DueStatusEvaluator::new();
        let asset = Asset::new("M9", "Nueva", AssetType::Forklift, safe_date(None, now()));
        assert!(engine.is_compliant(&asset, today()));
        assert_eq!(engine.evaluate(&asset, TrackType::Light, today()), DueStatus::Upcoming);
    }

    // ==========================================
    // 到期状态
    // ==========================================

    #[test]
    fn test_scenario_a_missed_operator_track() {
        let engine = DueStatusEvaluator::new();
        let asset = asset_serviced_days_ago(20, 15);

        assert_eq!(engine.next_due(&asset, TrackType::Light), today() - Duration::days(5));
        assert_eq!(engine.evaluate(&asset, TrackType::Light, today()), DueStatus::Missed);
        assert!(!engine.is_compliant(&asset, today()));
    }

    #[test]
    fn test_due_today_is_not_missed() {
        let engine = DueStatusEvaluator::new();
        let asset = asset_serviced_days_ago(15, 15);

        assert_eq!(engine.next_due(&asset, TrackType::Light), today());
        assert_eq!(engine.evaluate(&asset, TrackType::Light, today()), DueStatus::Upcoming);
        assert_eq!(
            engine.evaluate_day(&asset, TrackType::Light, today(), today()),
            Some(TrackDayMark::Planned),
            "当天到期应为 planned"
        );
        assert!(engine.is_compliant(&asset, today()));
    }

    #[test]
    fn test_stopped_asset_not_applicable() {
        let engine = DueStatusEvaluator::new();
        let mut asset = asset_serviced_days_ago(60, 15);
        asset.status = AssetStatus::Stopped;

        assert_eq!(engine.evaluate(&asset, TrackType::Light, today()), DueStatus::NotApplicable);
        assert_eq!(engine.evaluate(&asset, TrackType::Heavy, today()), DueStatus::NotApplicable);
        let due = engine.next_due(&asset, TrackType::Light);
        assert_eq!(engine.evaluate_day(&asset, TrackType::Light, due, today()), None);
    }

    #[test]
    fn test_interval_shift_moves_due_date_equally() {
        let engine = DueStatusEvaluator::new();
        for base in [1_u32, 7, 15, 30] {
            for delta in [1_u32, 3, 10] {
                let short = asset_serviced_days_ago(4, base);
                let long = asset_serviced_days_ago(4, base + delta);
                let shift = engine.next_due(&long, TrackType::Light)
                    - engine.next_due(&short, TrackType::Light);
                assert_eq!(shift, Duration::days(i64::from(delta)));
            }
        }
    }

    // ==========================================
    // 单日标记
    // ==========================================

    #[test]
    fn test_evaluate_day_marks() {
        let engine = DueStatusEvaluator::new();
        let overdue = asset_serviced_days_ago(20, 15);
        let due_past = today() - Duration::days(5);

        assert_eq!(
            engine.evaluate_day(&overdue, TrackType::Light, due_past, today()),
            Some(TrackDayMark::Missed)
        );
        assert_eq!(engine.evaluate_day(&overdue, TrackType::Light, today(), today()), None);

        let upcoming = asset_serviced_days_ago(5, 15);
        let due_future = today() + Duration::days(10);
        assert_eq!(
            engine.evaluate_day(&upcoming, TrackType::Light, due_future, today()),
            Some(TrackDayMark::Planned)
        );
    }
}
