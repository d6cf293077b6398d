use crate::error::AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 验证服务返回的原始结果，状态判定交给调用方
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderReply {
    pub http_success: bool,
    pub status: Option<String>,
    pub message: Option<String>,
}

impl ProviderReply {
    pub fn is(&self, expected_status: &str) -> bool {
        self.http_success && self.status.as_deref() == Some(expected_status)
    }
}

/// 短信验证码服务（发码、校验）
///
/// 传输层失败返回 `AppError::TransportError`；服务端拒绝不算错误，
/// 通过 `ProviderReply` 原样交回。
#[async_trait]
pub trait VerificationProvider: Send + Sync {
    /// 凭据是否齐全，不齐全时不得发起任何请求
    fn is_configured(&self) -> bool;

    async fn start_verification(&self, to: &str) -> AppResult<ProviderReply>;

    async fn check_verification(&self, to: &str, code: &str) -> AppResult<ProviderReply>;
}

/// 线索投递结果，随提交回执返回给调用方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// 请求已发出，接收端结果未知
    Dispatched,
    /// 接收端返回 2xx
    Acknowledged,
}

/// 线索接收端
#[async_trait]
pub trait IntakeSink: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn deliver(&self, fields: &[(&'static str, String)]) -> AppResult<DeliveryOutcome>;
}
