use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::external::DeliveryOutcome;
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::lead::create_form,
        handlers::lead::get_form,
        handlers::lead::send_code,
        handlers::lead::resend_code,
        handlers::lead::verify_code,
        handlers::lead::submit_lead,
        handlers::health::health,
    ),
    components(
        schemas(
            SendCodeRequest,
            ResendCodeRequest,
            VerifyCodeRequest,
            VerificationStatus,
            VerificationSession,
            FormView,
            LeadSubmission,
            PropertyType,
            BudgetRange,
            SubmissionReceipt,
            DeliveryOutcome,
            ServiceStatus,
            ApiError,
            FormApiResponse,
            SubmissionApiResponse,
            StatusApiResponse,
        )
    ),
    tags(
        (name = "leads", description = "Phone-verified lead capture API"),
        (name = "health", description = "Service status API"),
    ),
    info(
        title = "Estate Leads API",
        version = "0.1.0",
        description = "Lead capture with OTP phone verification"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_lead_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/leads/forms/{form_id}/submit"));
        assert!(paths.iter().any(|p| p.as_str() == "/health"));

        let schemas = &doc.components.as_ref().unwrap().schemas;
        assert!(schemas.contains_key("DeliveryOutcome"));
        assert!(schemas.contains_key("SubmissionReceipt"));
    }
}
