use crate::models::*;
use crate::services::LeadFormService;
use actix_web::{HttpResponse, Result, web};

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "服务状态与配置完整性", body = StatusApiResponse)
    )
)]
pub async fn health(lead_service: web::Data<LeadFormService>) -> Result<HttpResponse> {
    let status = lead_service.status().await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(status)))
}

pub fn health_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
