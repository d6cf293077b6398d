use crate::error::{AppError, AppResult};
use crate::external::{DeliveryOutcome, IntakeSink};
use crate::models::LeadRecord;
use crate::utils::mask_phone;
use std::sync::Arc;

#[derive(Clone)]
pub struct IntakeSubmitter {
    sink: Arc<dyn IntakeSink>,
}

impl IntakeSubmitter {
    pub fn new(sink: Arc<dyn IntakeSink>) -> Self {
        Self { sink }
    }

    pub fn is_configured(&self) -> bool {
        self.sink.is_configured()
    }

    /// 投递线索。未验证时直接拒绝，不产生任何网络请求。
    ///
    /// `FireAndForget` 模式下接收端是否真正入库无法得知，
    /// 返回 `DeliveryOutcome::Dispatched` 仅代表请求已发出。
    pub async fn submit(&self, record: &LeadRecord, verified: bool) -> AppResult<DeliveryOutcome> {
        if !verified {
            return Err(AppError::NotVerified);
        }
        if !self.sink.is_configured() {
            return Err(AppError::ConfigurationError(
                "Configuration error: Missing intake endpoint".to_string(),
            ));
        }
        record.validate()?;

        match self.sink.deliver(&record.to_form_fields()).await {
            Ok(outcome) => {
                log::info!(
                    "Lead submitted for {} ({}, {}): {outcome:?}",
                    mask_phone(&record.phone),
                    record.property_type,
                    record.budget
                );
                Ok(outcome)
            }
            Err(AppError::TransportError(detail)) => {
                log::error!("Error submitting lead to intake endpoint: {detail}");
                Err(AppError::TransportError(
                    "Error submitting form. Please try again.".to_string(),
                ))
            }
            Err(other) => Err(other),
        }
    }
}
