use crate::error::{AppError, AppResult};
use crate::external::VerificationProvider;
use crate::models::{VerificationSession, VerificationStatus};
use crate::utils::{mask_phone, normalize_phone, validate_e164_phone, validate_otp_code};
use std::sync::Arc;

const STATUS_PENDING: &str = "pending";
const STATUS_APPROVED: &str = "approved";

#[derive(Debug, Clone, Copy)]
enum CodeDispatch {
    Initial,
    Resend,
}

impl CodeDispatch {
    fn provider_fallback(self) -> &'static str {
        match self {
            CodeDispatch::Initial => "Error sending OTP",
            CodeDispatch::Resend => "Error resending OTP",
        }
    }

    fn transport_fallback(self) -> &'static str {
        match self {
            CodeDispatch::Initial => "Error sending OTP. Please try again.",
            CodeDispatch::Resend => "Error resending OTP. Please try again.",
        }
    }
}

/// 单个表单的手机号验证流程
///
/// 状态流转：`NotStarted -> CodeSent -> Verified`。发码失败置为 `Failed`，
/// 校验失败保持原状态；`Verified` 之后只有换号码才会开启新会话。
/// 所有方法都要求 `&mut self`，同一会话上不会有重叠的请求。
pub struct VerificationController {
    provider: Arc<dyn VerificationProvider>,
    default_country_code: String,
    session: VerificationSession,
}

impl VerificationController {
    pub fn new(provider: Arc<dyn VerificationProvider>, default_country_code: String) -> Self {
        Self {
            provider,
            default_country_code,
            session: VerificationSession::default(),
        }
    }

    pub fn session(&self) -> &VerificationSession {
        &self.session
    }

    pub fn is_verified(&self) -> bool {
        self.session.is_verified()
    }

    /// 已验证时返回规范化后的号码
    pub fn verified_phone(&self) -> Option<&str> {
        if self.is_verified() {
            self.session.phone.as_deref()
        } else {
            None
        }
    }

    pub async fn request_code(&mut self, phone: &str) -> AppResult<()> {
        self.dispatch_code(phone, CodeDispatch::Initial).await
    }

    pub async fn resend_code(&mut self, phone: &str) -> AppResult<()> {
        self.dispatch_code(phone, CodeDispatch::Resend).await
    }

    pub async fn check_code(&mut self, phone: &str, code: &str) -> AppResult<()> {
        self.ensure_configured()?;
        if phone.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Please enter a phone number".to_string(),
            ));
        }
        if code.is_empty() {
            return Err(AppError::ValidationError(
                "Please enter a valid 6-digit OTP".to_string(),
            ));
        }
        let phone = self.normalize(phone)?;
        validate_otp_code(code)?;

        if self.session.targets(&phone) && self.session.is_verified() {
            return Ok(());
        }
        if !self.session.targets(&phone) || !self.session.code_sent {
            return Err(AppError::ValidationError(
                "Please request an OTP first".to_string(),
            ));
        }

        let result = match self.provider.check_verification(&phone, code).await {
            Ok(reply) if reply.is(STATUS_APPROVED) => {
                self.session.status = VerificationStatus::Verified;
                self.session.last_error = None;
                log::info!("Phone number verified: {}", mask_phone(&phone));
                return Ok(());
            }
            Ok(reply) => AppError::ProviderError(
                reply.message.unwrap_or_else(|| "Invalid OTP".to_string()),
            ),
            Err(AppError::TransportError(detail)) => {
                log::error!("OTP check transport failure for {}: {detail}", mask_phone(&phone));
                AppError::TransportError("Invalid OTP. Please try again.".to_string())
            }
            Err(other) => other,
        };

        // 校验失败不改变状态，允许重试或重发
        self.session.last_error = Some(result.user_message());
        Err(result)
    }

    async fn dispatch_code(&mut self, phone: &str, kind: CodeDispatch) -> AppResult<()> {
        self.ensure_configured()?;
        if phone.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Please enter a phone number".to_string(),
            ));
        }
        let phone = self.normalize(phone)?;

        if self.session.targets(&phone) {
            if self.session.is_verified() {
                return Err(AppError::ValidationError(
                    "Phone number is already verified".to_string(),
                ));
            }
        } else {
            // 换号码即开启新会话
            self.session = VerificationSession::for_phone(phone.clone());
        }

        let result = match self.provider.start_verification(&phone).await {
            Ok(reply) if reply.is(STATUS_PENDING) => {
                self.session.status = VerificationStatus::CodeSent;
                self.session.code_sent = true;
                self.session.last_error = None;
                log::info!("OTP dispatched ({kind:?}) to {}", mask_phone(&phone));
                return Ok(());
            }
            Ok(reply) => AppError::ProviderError(
                reply
                    .message
                    .unwrap_or_else(|| kind.provider_fallback().to_string()),
            ),
            Err(AppError::TransportError(detail)) => {
                log::error!(
                    "OTP dispatch ({kind:?}) transport failure for {}: {detail}",
                    mask_phone(&phone)
                );
                AppError::TransportError(kind.transport_fallback().to_string())
            }
            Err(other) => other,
        };

        self.session.status = VerificationStatus::Failed;
        self.session.last_error = Some(result.user_message());
        Err(result)
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if !self.provider.is_configured() {
            return Err(AppError::ConfigurationError(
                "Configuration error: Missing verification credentials".to_string(),
            ));
        }
        Ok(())
    }

    fn normalize(&self, phone: &str) -> AppResult<String> {
        let phone = normalize_phone(phone, &self.default_country_code);
        validate_e164_phone(&phone)?;
        Ok(phone)
    }
}
