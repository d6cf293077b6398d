use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::LeadFormService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/leads/forms",
    tag = "leads",
    responses(
        (status = 201, description = "表单已创建", body = FormApiResponse),
        (status = 429, description = "同时打开的表单过多")
    )
)]
pub async fn create_form(lead_service: web::Data<LeadFormService>) -> Result<HttpResponse> {
    match lead_service.create_form().await {
        Ok(view) => Ok(HttpResponse::Created().json(ApiResponse::success(view))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/leads/forms/{form_id}",
    tag = "leads",
    params(("form_id" = Uuid, Path, description = "表单 ID")),
    responses(
        (status = 200, description = "表单状态", body = FormApiResponse),
        (status = 404, description = "表单不存在或已过期"),
        (status = 409, description = "该表单有请求正在处理")
    )
)]
pub async fn get_form(
    lead_service: web::Data<LeadFormService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match lead_service.form(path.into_inner()).await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success(view))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/leads/forms/{form_id}/send-code",
    tag = "leads",
    params(("form_id" = Uuid, Path, description = "表单 ID")),
    request_body = SendCodeRequest,
    responses(
        (status = 200, description = "验证码已发送", body = FormApiResponse),
        (status = 400, description = "手机号为空或格式错误"),
        (status = 409, description = "该表单有请求正在处理"),
        (status = 422, description = "验证服务拒绝"),
        (status = 502, description = "验证服务不可达"),
        (status = 503, description = "缺少验证服务配置")
    )
)]
pub async fn send_code(
    lead_service: web::Data<LeadFormService>,
    path: web::Path<Uuid>,
    request: web::Json<SendCodeRequest>,
) -> Result<HttpResponse> {
    match lead_service
        .send_code(path.into_inner(), &request.phone)
        .await
    {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            view,
            "OTP has been sent to your phone!",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/leads/forms/{form_id}/resend-code",
    tag = "leads",
    params(("form_id" = Uuid, Path, description = "表单 ID")),
    request_body(content = ResendCodeRequest, description = "不传号码时沿用已发送的号码"),
    responses(
        (status = 200, description = "验证码已重新发送", body = FormApiResponse),
        (status = 400, description = "手机号为空或格式错误"),
        (status = 409, description = "该表单有请求正在处理"),
        (status = 422, description = "验证服务拒绝"),
        (status = 502, description = "验证服务不可达"),
        (status = 503, description = "缺少验证服务配置")
    )
)]
pub async fn resend_code(
    lead_service: web::Data<LeadFormService>,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let request = match parse_resend_body(&body) {
        Ok(request) => request,
        Err(e) => return Ok(e.error_response()),
    };
    match lead_service
        .resend_code(path.into_inner(), request.phone.as_deref())
        .await
    {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            view,
            "New OTP has been sent to your phone!",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/leads/forms/{form_id}/verify-code",
    tag = "leads",
    params(("form_id" = Uuid, Path, description = "表单 ID")),
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "手机号验证成功", body = FormApiResponse),
        (status = 400, description = "验证码格式错误或尚未发送"),
        (status = 409, description = "该表单有请求正在处理"),
        (status = 422, description = "验证码错误或已过期"),
        (status = 502, description = "验证服务不可达"),
        (status = 503, description = "缺少验证服务配置")
    )
)]
pub async fn verify_code(
    lead_service: web::Data<LeadFormService>,
    path: web::Path<Uuid>,
    request: web::Json<VerifyCodeRequest>,
) -> Result<HttpResponse> {
    match lead_service
        .verify_code(path.into_inner(), &request.code)
        .await
    {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            view,
            "Phone number verified successfully!",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/leads/forms/{form_id}/submit",
    tag = "leads",
    params(("form_id" = Uuid, Path, description = "表单 ID")),
    request_body = LeadSubmission,
    responses(
        (status = 200, description = "线索已提交", body = SubmissionApiResponse),
        (status = 400, description = "表单内容不合法"),
        (status = 403, description = "手机号尚未验证"),
        (status = 409, description = "该表单有请求正在处理"),
        (status = 502, description = "接收端不可达"),
        (status = 503, description = "缺少接收端配置")
    )
)]
pub async fn submit_lead(
    lead_service: web::Data<LeadFormService>,
    path: web::Path<Uuid>,
    request: web::Json<LeadSubmission>,
) -> Result<HttpResponse> {
    match lead_service
        .submit_lead(path.into_inner(), request.into_inner())
        .await
    {
        Ok(receipt) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            receipt,
            "Form submitted successfully! We will contact you soon.",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 空请求体视为未传号码；非空时必须是合法 JSON
fn parse_resend_body(body: &[u8]) -> AppResult<ResendCodeRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ResendCodeRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::ValidationError(format!("Json deserialize error: {e}")))
}

/// 请求体解析失败时返回统一的错误结构
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

pub fn lead_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/leads")
            .app_data(json_config())
            .route("/forms", web::post().to(create_form))
            .route("/forms/{form_id}", web::get().to(get_form))
            .route("/forms/{form_id}/send-code", web::post().to(send_code))
            .route("/forms/{form_id}/resend-code", web::post().to(resend_code))
            .route("/forms/{form_id}/verify-code", web::post().to(verify_code))
            .route("/forms/{form_id}/submit", web::post().to(submit_lead)),
    );
}
