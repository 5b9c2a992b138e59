// ==========================================
// TPM/MTO PRO - 保养作业 API
// ==========================================
// 职责: 完工签认 / 故障关闭 / 设备与人员管理
// 红线: 记录创建后只允许"关闭故障"一种变更
//       轨道上次保养时间只由对应轨道的完工推进
//       设备删除不级联删除记录
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::tracker_config::TrackerConfig;
use crate::domain::asset::{Asset, MAX_INTERVAL_DAYS};
use crate::domain::person::Person;
use crate::domain::record::MaintenanceRecord;
use crate::domain::types::{AssetStatus, AssetType, Role, TrackType};
use crate::engine::checklist::{compose_observations, ChecklistResult};
use crate::importer::{asset_document, person_document, record_document, FieldMapper};
use crate::perf::PerfGuard;
use crate::repository::port::{Collection, Document, PersistencePort};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

// ==========================================
// 请求结构
// ==========================================

/// 完工签认请求
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompleteTaskRequest {
    pub person_id: String,
    pub asset_id: String,
    pub checklist: ChecklistResult,
    #[serde(default)]
    pub observations: String,
    #[serde(default)]
    pub downtime_minutes: u32,
    /// 点检全部通过但仍需上报故障
    #[serde(default)]
    pub report_issue: bool,
    #[serde(default)]
    pub pin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterAssetRequest {
    pub name: String,
    pub asset_type: AssetType,
    #[serde(default)]
    pub operator_interval_days: Option<u32>,
    #[serde(default)]
    pub leader_interval_days: Option<u32>,
    #[serde(default)]
    pub operator_responsible_id: Option<String>,
    #[serde(default)]
    pub leader_responsible_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterPersonRequest {
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub pin: Option<String>,
}

// ==========================================
// MaintenanceApi - 保养作业 API
// ==========================================
pub struct MaintenanceApi {
    port: Arc<dyn PersistencePort>,
    config: TrackerConfig,
}

impl MaintenanceApi {
    pub fn new(port: Arc<dyn PersistencePort>, config: TrackerConfig) -> Self {
        Self { port, config }
    }

    // ==========================================
    // 一线作业
    // ==========================================

    /// 完工签认
    ///
    /// 执行人按角色对应轨道签认; 任一点检项未通过或主动上报 → 记录为故障
    pub async fn complete_task(&self, request: CompleteTaskRequest, now: NaiveDateTime) -> ApiResult<MaintenanceRecord> {
        let _perf = PerfGuard::new("complete_task");

        let person = self.load_person(&request.person_id, now).await?;
        if !person.confirm_pin(request.pin.as_deref()) {
            tracing::warn!(person_id = %person.id, "PIN 确认失败");
            return Err(ApiError::PinRejected(person.id));
        }
        let track = person.role.track().ok_or_else(|| ApiError::PermissionDenied {
            role: person.role.to_string(),
            action: "complete_task".to_string(),
        })?;

        let mut asset = self.load_asset(&request.asset_id, now).await?;
        if asset.is_stopped() {
            return Err(ApiError::InvalidStateTransition {
                from: AssetStatus::Stopped.to_string(),
                to: "SERVICED".to_string(),
            });
        }
        if !asset.track(track).is_owned_by(&person.id) {
            return Err(ApiError::PermissionDenied {
                role: person.role.to_string(),
                action: format!("complete_task:{}:{}", asset.id, track),
            });
        }

        let mut record = MaintenanceRecord::new(Uuid::new_v4().to_string(), asset.id.clone(), person.id.clone(), now, track);
        record.is_issue = request.checklist.has_failures() || request.report_issue;
        record.downtime_minutes = request.downtime_minutes;
        record.observations = compose_observations(&request.checklist, &request.observations, request.downtime_minutes);

        asset.apply_completion(&record);

        // 记录与轨道推进同一批提交
        self.port
            .write_batch(&[
                Document::new(Collection::Records, record.id.clone(), record_document(&record)),
                Document::new(Collection::Assets, asset.id.clone(), asset_document(&asset)),
            ])
            .await?;

        tracing::info!(
            record_id = %record.id,
            asset_id = %asset.id,
            person_id = %person.id,
            track = %track,
            is_issue = record.is_issue,
            "完工签认已保存"
        );
        Ok(record)
    }

    /// 关闭故障
    pub async fn resolve_incident(
        &self,
        person_id: &str,
        record_id: &str,
        note: &str,
        now: NaiveDateTime,
    ) -> ApiResult<MaintenanceRecord> {
        let _perf = PerfGuard::new("resolve_incident");

        let person = self.load_person(person_id, now).await?;
        if !person.role.can_resolve_incidents() {
            return Err(ApiError::PermissionDenied {
                role: person.role.to_string(),
                action: "resolve_incident".to_string(),
            });
        }

        let mut record = self.load_record(record_id, now).await?;
        if !record.resolve(&person.id, now, note) {
            return Err(ApiError::InvalidStateTransition {
                from: if record.resolution.is_some() { "RESOLVED" } else { "PREVENTIVE" }.to_string(),
                to: "RESOLVED".to_string(),
            });
        }

        self.port
            .write(Document::new(Collection::Records, record.id.clone(), record_document(&record)))
            .await?;
        tracing::info!(record_id, resolved_by = %person.id, "故障已关闭");
        Ok(record)
    }

    // ==========================================
    // 设备管理 (MANAGER)
    // ==========================================

    pub async fn register_asset(
        &self,
        actor_id: &str,
        request: RegisterAssetRequest,
        now: NaiveDateTime,
    ) -> ApiResult<Asset> {
        let _perf = PerfGuard::new("register_asset");
        self.require_manager(actor_id, "register_asset", now).await?;

        let name = request.name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("设备名称不能为空".to_string()));
        }

        let mut asset = Asset::new(Uuid::new_v4().to_string(), name, request.asset_type, now);
        asset.operator_track.interval_days = positive_interval(request.operator_interval_days, self.config.operator_interval_days)?;
        asset.leader_track.interval_days = positive_interval(request.leader_interval_days, self.config.leader_interval_days)?;
        for (track, responsible) in [
            (TrackType::Light, request.operator_responsible_id),
            (TrackType::Heavy, request.leader_responsible_id),
        ] {
            if let Some(id) = responsible {
                self.check_responsible(&id, track, now).await?;
                asset.track_mut(track).responsible_id = Some(id);
            }
        }

        self.save_asset(&asset).await?;
        tracing::info!(asset_id = %asset.id, name = %asset.name, "设备已登记");
        Ok(asset)
    }

    pub async fn update_asset_status(
        &self,
        actor_id: &str,
        asset_id: &str,
        status: AssetStatus,
        now: NaiveDateTime,
    ) -> ApiResult<Asset> {
        let _perf = PerfGuard::new("update_asset_status");
        self.require_manager(actor_id, "update_asset_status", now).await?;

        let mut asset = self.load_asset(asset_id, now).await?;
        asset.status = status;
        self.save_asset(&asset).await?;
        tracing::info!(asset_id, status = %status, "设备状态已更新");
        Ok(asset)
    }

    /// 指定轨道责任人 (None = 轮值)
    pub async fn assign_responsible(
        &self,
        actor_id: &str,
        asset_id: &str,
        track: TrackType,
        responsible_id: Option<String>,
        now: NaiveDateTime,
    ) -> ApiResult<Asset> {
        let _perf = PerfGuard::new("assign_responsible");
        self.require_manager(actor_id, "assign_responsible", now).await?;

        let mut asset = self.load_asset(asset_id, now).await?;
        if let Some(id) = responsible_id.as_deref() {
            self.check_responsible(id, track, now).await?;
        }
        asset.track_mut(track).responsible_id = responsible_id;
        self.save_asset(&asset).await?;
        Ok(asset)
    }

    pub async fn update_interval(
        &self,
        actor_id: &str,
        asset_id: &str,
        track: TrackType,
        interval_days: u32,
        now: NaiveDateTime,
    ) -> ApiResult<Asset> {
        let _perf = PerfGuard::new("update_interval");
        self.require_manager(actor_id, "update_interval", now).await?;

        let mut asset = self.load_asset(asset_id, now).await?;
        asset.track_mut(track).interval_days = positive_interval(Some(interval_days), interval_days)?;
        self.save_asset(&asset).await?;
        Ok(asset)
    }

    /// 删除设备 (历史记录保留, 显示为"设备已删除")
    pub async fn delete_asset(&self, actor_id: &str, asset_id: &str, now: NaiveDateTime) -> ApiResult<()> {
        let _perf = PerfGuard::new("delete_asset");
        self.require_manager(actor_id, "delete_asset", now).await?;

        if !self.port.delete(Collection::Assets, asset_id).await? {
            return Err(ApiError::NotFound(format!("设备(id={})不存在", asset_id)));
        }
        tracing::info!(asset_id, "设备已删除");
        Ok(())
    }

    // ==========================================
    // 人员管理 (MANAGER)
    // ==========================================

    pub async fn register_person(
        &self,
        actor_id: &str,
        request: RegisterPersonRequest,
        now: NaiveDateTime,
    ) -> ApiResult<Person> {
        let _perf = PerfGuard::new("register_person");
        self.require_manager(actor_id, "register_person", now).await?;

        let name = request.name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("人员姓名不能为空".to_string()));
        }

        let mut person = Person::new(Uuid::new_v4().to_string(), name, request.role);
        person.phone = request.phone.filter(|p| !p.trim().is_empty());
        person.pin = request.pin.filter(|p| !p.trim().is_empty());

        self.port
            .write(Document::new(Collection::People, person.id.clone(), person_document(&person)))
            .await?;
        tracing::info!(person_id = %person.id, role = %person.role, "人员已登记");
        Ok(person)
    }

    pub async fn delete_person(&self, actor_id: &str, person_id: &str, now: NaiveDateTime) -> ApiResult<()> {
        let _perf = PerfGuard::new("delete_person");
        self.require_manager(actor_id, "delete_person", now).await?;

        if actor_id == person_id {
            return Err(ApiError::InvalidInput("不能删除当前登录人员".to_string()));
        }
        if !self.port.delete(Collection::People, person_id).await? {
            return Err(ApiError::NotFound(format!("人员(id={})不存在", person_id)));
        }
        tracing::info!(person_id, "人员已删除");
        Ok(())
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    async fn require_manager(&self, actor_id: &str, action: &str, now: NaiveDateTime) -> ApiResult<Person> {
        let actor = self.load_person(actor_id, now).await?;
        if !actor.role.can_manage_fleet() {
            return Err(ApiError::PermissionDenied {
                role: actor.role.to_string(),
                action: action.to_string(),
            });
        }
        Ok(actor)
    }

    /// 责任人必须存在且角色与轨道匹配
    async fn check_responsible(&self, person_id: &str, track: TrackType, now: NaiveDateTime) -> ApiResult<()> {
        let person = self.load_person(person_id, now).await?;
        if person.role.track() != Some(track) {
            return Err(ApiError::InvalidInput(format!(
                "人员 {} 的角色 {} 不能负责 {} 轨道",
                person.id, person.role, track
            )));
        }
        Ok(())
    }

    async fn save_asset(&self, asset: &Asset) -> ApiResult<()> {
        self.port
            .write(Document::new(Collection::Assets, asset.id.clone(), asset_document(asset)))
            .await?;
        Ok(())
    }

    fn mapper(&self, now: NaiveDateTime) -> FieldMapper {
        FieldMapper::new(now, &self.config)
    }

    async fn load_document(&self, collection: Collection, id: &str, entity: &str) -> ApiResult<Document> {
        self.port
            .get(collection, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("{}(id={})不存在", entity, id)))
    }

    async fn load_person(&self, id: &str, now: NaiveDateTime) -> ApiResult<Person> {
        let doc = self.load_document(Collection::People, id, "人员").await?;
        self.mapper(now)
            .map_person(&doc.id, &doc.body)
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }

    async fn load_asset(&self, id: &str, now: NaiveDateTime) -> ApiResult<Asset> {
        let doc = self.load_document(Collection::Assets, id, "设备").await?;
        self.mapper(now)
            .map_asset(&doc.id, &doc.body)
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }

    async fn load_record(&self, id: &str, now: NaiveDateTime) -> ApiResult<MaintenanceRecord> {
        let doc = self.load_document(Collection::Records, id, "记录").await?;
        self.mapper(now)
            .map_record(&doc.id, &doc.body)
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }
}

/// 周期必须为正且不超过上限; 未提供时使用默认值
fn positive_interval(requested: Option<u32>, default: u32) -> ApiResult<u32> {
    match requested {
        None => Ok(default),
        Some(0) => Err(ApiError::InvalidInput("保养周期必须大于 0".to_string())),
        Some(days) if days > MAX_INTERVAL_DAYS => Err(ApiError::InvalidInput(format!(
            "保养周期不能超过 {} 天",
            MAX_INTERVAL_DAYS
        ))),
        Some(days) => Ok(days),
    }
}
