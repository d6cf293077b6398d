use crate::config::{DeliveryMode, IntakeConfig};
use crate::error::{AppError, AppResult};
use crate::external::{DeliveryOutcome, IntakeSink};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// 以表单方式把线索推送到表格 webhook（如 Google Apps Script）
#[derive(Clone)]
pub struct WebhookIntakeSink {
    client: Client,
    config: IntakeConfig,
}

impl WebhookIntakeSink {
    pub fn new(config: IntakeConfig) -> AppResult<Self> {
        let mut builder = Client::builder().user_agent("estate-leads/intake");
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::InternalError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl IntakeSink for WebhookIntakeSink {
    fn is_configured(&self) -> bool {
        self.config.is_complete()
    }

    async fn deliver(&self, fields: &[(&'static str, String)]) -> AppResult<DeliveryOutcome> {
        let response = self
            .client
            .post(&self.config.endpoint_url)
            .form(fields)
            .send()
            .await?;

        match self.config.delivery_mode {
            // 接收端不保证返回可解析的结果，响应体不读取
            DeliveryMode::FireAndForget => {
                log::debug!("Intake webhook responded with HTTP {}", response.status());
                Ok(DeliveryOutcome::Dispatched)
            }
            DeliveryMode::Acknowledged => {
                let status = response.status();
                if status.is_success() {
                    Ok(DeliveryOutcome::Acknowledged)
                } else {
                    Err(AppError::ProviderError(format!(
                        "Intake endpoint rejected the submission (HTTP {})",
                        status.as_u16()
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_configured_requires_endpoint() {
        let sink = WebhookIntakeSink::new(IntakeConfig::default()).unwrap();
        assert!(!sink.is_configured());

        let sink = WebhookIntakeSink::new(IntakeConfig {
            endpoint_url: "https://script.google.com/macros/s/abc/exec".to_string(),
            ..IntakeConfig::default()
        })
        .unwrap();
        assert!(sink.is_configured());
    }
}
