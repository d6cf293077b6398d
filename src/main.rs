use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use estate_leads::{
    config::Config,
    external::{TwilioVerifyClient, WebhookIntakeSink},
    handlers,
    middlewares::create_cors,
    services::{IntakeSubmitter, LeadFormService},
    swagger::swagger_config,
    tasks,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml()?;

    if !config.twilio.is_complete() {
        log::warn!("Twilio Verify credentials are missing; phone verification is disabled");
    }
    if !config.intake.is_complete() {
        log::warn!("Intake endpoint URL is missing; lead submission is disabled");
    }

    // 创建外部服务
    let provider = Arc::new(TwilioVerifyClient::new(config.twilio.clone())?);
    let sink = Arc::new(WebhookIntakeSink::new(config.intake.clone())?);

    let lead_service = LeadFormService::new(
        provider,
        IntakeSubmitter::new(sink),
        config.phone.country_code(),
        config.forms.ttl()?,
        config.forms.max_open_forms,
    );

    tasks::spawn_all(lead_service.clone(), config.forms.purge_interval_secs);

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let allowed_origins = config.server.allowed_origins.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors(&allowed_origins))
            .app_data(web::Data::new(lead_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::lead_config)
                    .configure(handlers::health_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
