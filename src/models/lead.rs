use crate::error::{AppError, AppResult};
use crate::external::DeliveryOutcome;
use crate::utils::{validate_e164_phone, validate_email};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    Villa,
    Townhouse,
    Commercial,
    Land,
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyType::Apartment => write!(f, "apartment"),
            PropertyType::Villa => write!(f, "villa"),
            PropertyType::Townhouse => write!(f, "townhouse"),
            PropertyType::Commercial => write!(f, "commercial"),
            PropertyType::Land => write!(f, "land"),
        }
    }
}

/// 预算区间（美元）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum BudgetRange {
    #[serde(rename = "100k-300k")]
    From100kTo300k,
    #[serde(rename = "300k-500k")]
    From300kTo500k,
    #[serde(rename = "500k-1m")]
    From500kTo1m,
    #[serde(rename = "1m+")]
    Above1m,
}

impl std::fmt::Display for BudgetRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetRange::From100kTo300k => write!(f, "100k-300k"),
            BudgetRange::From300kTo500k => write!(f, "300k-500k"),
            BudgetRange::From500kTo1m => write!(f, "500k-1m"),
            BudgetRange::Above1m => write!(f, "1m+"),
        }
    }
}

/// 表单提交的线索内容，手机号取自已验证的会话
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadSubmission {
    #[schema(example = "Asha Rao")]
    pub name: String,
    #[schema(example = "asha@example.com")]
    pub email: String,
    pub property_type: PropertyType,
    pub budget: BudgetRange,
    #[schema(example = "Looking for a sea-facing apartment")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub property_type: PropertyType,
    pub budget: BudgetRange,
    pub message: Option<String>,
}

impl LeadRecord {
    pub fn from_submission(submission: LeadSubmission, verified_phone: String) -> Self {
        Self {
            name: submission.name.trim().to_string(),
            email: submission.email.trim().to_string(),
            phone: verified_phone,
            property_type: submission.property_type,
            budget: submission.budget,
            message: submission
                .message
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Please enter your full name".to_string(),
            ));
        }
        if self.email.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Please enter your email address".to_string(),
            ));
        }
        if self.phone.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Please enter a phone number".to_string(),
            ));
        }
        validate_email(&self.email)?;
        validate_e164_phone(&self.phone)?;
        Ok(())
    }

    /// 接收端要求的扁平表单字段
    pub fn to_form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("email", self.email.clone()),
            ("phone", self.phone.clone()),
            ("propertyType", self.property_type.to_string()),
            ("budget", self.budget.to_string()),
            ("message", self.message.clone().unwrap_or_default()),
        ]
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmissionReceipt {
    pub form_id: uuid::Uuid,
    pub phone: String,
    /// `dispatched` 表示请求已发出但接收端未确认
    pub delivery: DeliveryOutcome,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}
