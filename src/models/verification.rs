use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    NotStarted,
    CodeSent,
    Verified,
    Failed,
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationStatus::NotStarted => write!(f, "not_started"),
            VerificationStatus::CodeSent => write!(f, "code_sent"),
            VerificationStatus::Verified => write!(f, "verified"),
            VerificationStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct VerificationSession {
    pub phone: Option<String>,
    pub status: VerificationStatus,
    pub last_error: Option<String>,
    /// 该号码至少成功下发过一次验证码
    pub code_sent: bool,
}

impl Default for VerificationSession {
    fn default() -> Self {
        Self {
            phone: None,
            status: VerificationStatus::NotStarted,
            last_error: None,
            code_sent: false,
        }
    }
}

impl VerificationSession {
    pub fn for_phone(phone: String) -> Self {
        Self {
            phone: Some(phone),
            ..Self::default()
        }
    }

    pub fn is_verified(&self) -> bool {
        self.status == VerificationStatus::Verified
    }

    pub fn targets(&self, phone: &str) -> bool {
        self.phone.as_deref() == Some(phone)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendCodeRequest {
    #[schema(example = "9876543210")]
    pub phone: String,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ResendCodeRequest {
    #[schema(example = "+919876543210")]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyCodeRequest {
    #[schema(example = "123456")]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormView {
    pub form_id: Uuid,
    pub verification: VerificationSession,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceStatus {
    pub verification_configured: bool,
    pub intake_configured: bool,
    pub default_country_code: String,
    pub open_forms: usize,
}
