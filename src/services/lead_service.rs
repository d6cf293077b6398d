use crate::error::{AppError, AppResult};
use crate::external::VerificationProvider;
use crate::models::{FormView, LeadRecord, LeadSubmission, ServiceStatus, SubmissionReceipt};
use crate::services::{IntakeSubmitter, VerificationController};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

struct LeadForm {
    id: Uuid,
    controller: VerificationController,
    created_at: DateTime<Utc>,
}

impl LeadForm {
    fn view(&self) -> FormView {
        FormView {
            form_id: self.id,
            verification: self.controller.session().clone(),
            created_at: self.created_at,
        }
    }

    fn session_phone(&self) -> Option<String> {
        self.controller.session().phone.clone()
    }
}

/// 按表单实例管理验证会话与线索提交
///
/// 每个表单各自持有一把锁；锁被占用时直接返回 `AppError::Busy`，
/// 同一表单上同时最多只有一个外部请求。
#[derive(Clone)]
pub struct LeadFormService {
    forms: Arc<RwLock<HashMap<Uuid, Arc<Mutex<LeadForm>>>>>,
    provider: Arc<dyn VerificationProvider>,
    submitter: IntakeSubmitter,
    default_country_code: String,
    form_ttl: Duration,
    max_open_forms: usize,
}

impl LeadFormService {
    pub fn new(
        provider: Arc<dyn VerificationProvider>,
        submitter: IntakeSubmitter,
        default_country_code: String,
        form_ttl: Duration,
        max_open_forms: usize,
    ) -> Self {
        Self {
            forms: Arc::new(RwLock::new(HashMap::new())),
            provider,
            submitter,
            default_country_code,
            form_ttl,
            max_open_forms,
        }
    }

    /// 表单数达到上限时返回 `AppError::TooManyForms`
    pub async fn create_form(&self) -> AppResult<FormView> {
        let mut forms = self.forms.write().await;
        if forms.len() >= self.max_open_forms {
            return Err(AppError::TooManyForms);
        }

        let form = LeadForm {
            id: Uuid::new_v4(),
            controller: VerificationController::new(
                self.provider.clone(),
                self.default_country_code.clone(),
            ),
            created_at: Utc::now(),
        };
        let view = form.view();
        forms.insert(form.id, Arc::new(Mutex::new(form)));
        log::debug!("Lead form created: {}", view.form_id);
        Ok(view)
    }

    pub async fn form(&self, form_id: Uuid) -> AppResult<FormView> {
        let form = self.acquire(form_id).await?;
        Ok(form.view())
    }

    pub async fn send_code(&self, form_id: Uuid, phone: &str) -> AppResult<FormView> {
        let mut form = self.acquire(form_id).await?;
        form.controller.request_code(phone).await?;
        Ok(form.view())
    }

    /// 不传号码时沿用会话中的号码
    pub async fn resend_code(&self, form_id: Uuid, phone: Option<&str>) -> AppResult<FormView> {
        let mut form = self.acquire(form_id).await?;
        let phone = match phone {
            Some(p) => p.to_string(),
            None => form.session_phone().unwrap_or_default(),
        };
        form.controller.resend_code(&phone).await?;
        Ok(form.view())
    }

    pub async fn verify_code(&self, form_id: Uuid, code: &str) -> AppResult<FormView> {
        let mut form = self.acquire(form_id).await?;
        let phone = form.session_phone().unwrap_or_default();
        form.controller.check_code(&phone, code).await?;
        Ok(form.view())
    }

    /// 提交成功后表单连同验证会话一起销毁；失败时保留，允许重新提交
    pub async fn submit_lead(
        &self,
        form_id: Uuid,
        submission: LeadSubmission,
    ) -> AppResult<SubmissionReceipt> {
        let form = self.acquire(form_id).await?;
        let verified = form.controller.is_verified();
        let phone = form
            .controller
            .verified_phone()
            .map(str::to_string)
            .or_else(|| form.session_phone())
            .unwrap_or_default();

        let record = LeadRecord::from_submission(submission, phone);
        let delivery = self.submitter.submit(&record, verified).await?;

        self.forms.write().await.remove(&form_id);
        drop(form);

        Ok(SubmissionReceipt {
            form_id,
            phone: record.phone,
            delivery,
            submitted_at: Utc::now(),
        })
    }

    pub async fn status(&self) -> ServiceStatus {
        ServiceStatus {
            verification_configured: self.provider.is_configured(),
            intake_configured: self.submitter.is_configured(),
            default_country_code: self.default_country_code.clone(),
            open_forms: self.forms.read().await.len(),
        }
    }

    /// 清理超过存活时间的表单
    pub async fn purge_expired(&self) -> usize {
        match Utc::now().checked_sub_signed(self.form_ttl) {
            Some(cutoff) => self.purge_created_before(cutoff).await,
            None => 0,
        }
    }

    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut forms = self.forms.write().await;
        let before = forms.len();
        // 正在处理请求的表单先保留，下一轮再清理
        forms.retain(|_, form| match form.try_lock() {
            Ok(form) => form.created_at > cutoff,
            Err(_) => true,
        });
        before - forms.len()
    }

    async fn acquire(&self, form_id: Uuid) -> AppResult<OwnedMutexGuard<LeadForm>> {
        let form = self
            .forms
            .read()
            .await
            .get(&form_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Form not found or expired".to_string()))?;
        form.try_lock_owned().map_err(|_| AppError::Busy)
    }
}
