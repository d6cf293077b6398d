//! Background tasks for the application.
//!
//! Call `spawn_all` once during startup to launch them.

use crate::services::LeadFormService;

/// Spawn all background tasks.
///
/// Notes
/// - Tasks are detached via `tokio::spawn`; this function does not block.
pub fn spawn_all(lead_service: LeadFormService, purge_interval_secs: u64) {
    // 清理被放弃的表单
    tokio::spawn(async move {
        let interval = std::time::Duration::from_secs(purge_interval_secs.max(1));
        loop {
            tokio::time::sleep(interval).await;
            let removed = lead_service.purge_expired().await;
            if removed > 0 {
                log::info!("Expired lead forms purged: {removed}");
            }
        }
    });
}
