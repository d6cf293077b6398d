use crate::config::TwilioConfig;
use crate::error::{AppError, AppResult};
use crate::external::{ProviderReply, VerificationProvider};
use crate::utils::mask_phone;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Twilio Verify v2 的响应体。出错时 `status` 是 HTTP 状态码数字，成功时是字符串。
#[derive(Debug, Default, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    status: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

impl VerifyResponse {
    fn status_text(&self) -> Option<String> {
        match &self.status {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

/// 把 HTTP 状态与响应体转换成 `ProviderReply`
///
/// 响应体不是 JSON 时按缺省字段处理；空白的 message 视为没有。
fn reply_from(http_status: StatusCode, body: &str) -> ProviderReply {
    let parsed: VerifyResponse = serde_json::from_str(body).unwrap_or_else(|e| {
        log::warn!("Twilio returned unparseable body (HTTP {http_status}): {e}");
        VerifyResponse::default()
    });

    ProviderReply {
        http_success: http_status.is_success(),
        status: parsed.status_text(),
        message: parsed.message.filter(|m| !m.trim().is_empty()),
    }
}

#[derive(Clone)]
pub struct TwilioVerifyClient {
    client: Client,
    config: TwilioConfig,
}

impl TwilioVerifyClient {
    pub fn new(config: TwilioConfig) -> AppResult<Self> {
        let mut builder = Client::builder().user_agent("estate-leads/verify");
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::InternalError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, resource: &str) -> String {
        format!(
            "{}/v2/Services/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.verify_service_sid,
            resource
        )
    }

    async fn post(&self, resource: &str, params: &[(&str, &str)]) -> AppResult<ProviderReply> {
        let response = self
            .client
            .post(self.endpoint(resource))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(params)
            .send()
            .await?;

        let http_status = response.status();
        let body = response.text().await?;
        Ok(reply_from(http_status, &body))
    }
}

#[async_trait]
impl VerificationProvider for TwilioVerifyClient {
    fn is_configured(&self) -> bool {
        self.config.is_complete()
    }

    async fn start_verification(&self, to: &str) -> AppResult<ProviderReply> {
        let reply = self
            .post("Verifications", &[("To", to), ("Channel", "sms")])
            .await?;
        log::info!(
            "Twilio verification started for {}: status={:?}",
            mask_phone(to),
            reply.status
        );
        Ok(reply)
    }

    async fn check_verification(&self, to: &str, code: &str) -> AppResult<ProviderReply> {
        let reply = self
            .post("VerificationCheck", &[("To", to), ("Code", code)])
            .await?;
        log::info!(
            "Twilio verification check for {}: status={:?}",
            mask_phone(to),
            reply.status
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TwilioConfig {
        TwilioConfig {
            account_sid: "AC123".to_string(),
            auth_token: "secret".to_string(),
            verify_service_sid: "VA456".to_string(),
            base_url: "https://verify.example.test/".to_string(),
            request_timeout_secs: Some(10),
        }
    }

    #[test]
    fn test_endpoint_paths() {
        let client = TwilioVerifyClient::new(config()).unwrap();
        assert_eq!(
            client.endpoint("Verifications"),
            "https://verify.example.test/v2/Services/VA456/Verifications"
        );
        assert_eq!(
            client.endpoint("VerificationCheck"),
            "https://verify.example.test/v2/Services/VA456/VerificationCheck"
        );
    }

    #[test]
    fn test_is_configured_follows_credentials() {
        assert!(TwilioVerifyClient::new(config()).unwrap().is_configured());

        let mut missing = config();
        missing.verify_service_sid.clear();
        assert!(!TwilioVerifyClient::new(missing).unwrap().is_configured());
    }

    #[test]
    fn test_error_body_status_is_numeric() {
        let parsed: VerifyResponse = serde_json::from_str(
            r#"{"code":20404,"message":"The requested resource was not found","status":404}"#,
        )
        .unwrap();
        assert_eq!(parsed.status_text(), None);
        assert_eq!(
            parsed.message.as_deref(),
            Some("The requested resource was not found")
        );

        let parsed: VerifyResponse =
            serde_json::from_str(r#"{"sid":"VE1","status":"pending","valid":false}"#).unwrap();
        assert_eq!(parsed.status_text().as_deref(), Some("pending"));
    }

    #[test]
    fn test_reply_from_pending_verification() {
        let reply = reply_from(
            StatusCode::CREATED,
            r#"{"sid":"VE1","to":"+919876543210","status":"pending","valid":false}"#,
        );
        assert!(reply.is("pending"));
        assert_eq!(reply.message, None);
    }

    #[test]
    fn test_reply_from_error_body_keeps_message() {
        let reply = reply_from(
            StatusCode::NOT_FOUND,
            r#"{"code":20404,"message":"The requested resource was not found","status":404}"#,
        );
        assert!(!reply.http_success);
        assert_eq!(reply.status, None);
        assert_eq!(
            reply.message.as_deref(),
            Some("The requested resource was not found")
        );
    }

    #[test]
    fn test_reply_from_non_2xx_is_never_approved() {
        let reply = reply_from(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"status":"approved","message":"Max check attempts reached"}"#,
        );
        assert_eq!(reply.status.as_deref(), Some("approved"));
        assert!(!reply.is("approved"));
    }

    #[test]
    fn test_reply_from_unparseable_body_falls_back_to_defaults() {
        let reply = reply_from(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>");
        assert_eq!(
            reply,
            ProviderReply {
                http_success: false,
                status: None,
                message: None,
            }
        );

        // 2xx 但响应体为空，同样不能算作成功
        let reply = reply_from(StatusCode::OK, "");
        assert!(reply.http_success);
        assert!(!reply.is("approved"));
    }

    #[test]
    fn test_reply_from_drops_blank_message() {
        let reply = reply_from(StatusCode::BAD_REQUEST, r#"{"status":400,"message":"   "}"#);
        assert_eq!(reply.message, None);
    }
}
