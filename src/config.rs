use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub twilio: TwilioConfig,
    #[serde(default)]
    pub intake: IntakeConfig,
    #[serde(default)]
    pub phone: PhoneConfig,
    #[serde(default)]
    pub forms: FormsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 为空时允许任意来源
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    #[serde(default)]
    pub account_sid: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default)]
    pub verify_service_sid: String,
    #[serde(default = "default_verify_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_verify_base_url() -> String {
    "https://verify.twilio.com".to_string()
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            verify_service_sid: String::new(),
            base_url: default_verify_base_url(),
            request_timeout_secs: None,
        }
    }
}

impl TwilioConfig {
    /// 三项凭据齐全才允许发起验证请求
    pub fn is_complete(&self) -> bool {
        !self.account_sid.trim().is_empty()
            && !self.auth_token.trim().is_empty()
            && !self.verify_service_sid.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// 只要传输层没有报错就视为成功，不读取响应体
    #[default]
    FireAndForget,
    /// 要求 2xx 响应
    Acknowledged,
}

impl std::str::FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fire_and_forget" => Ok(DeliveryMode::FireAndForget),
            "acknowledged" => Ok(DeliveryMode::Acknowledged),
            other => Err(format!("unknown intake delivery mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IntakeConfig {
    #[serde(default)]
    pub endpoint_url: String,
    #[serde(default)]
    pub delivery_mode: DeliveryMode,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl IntakeConfig {
    pub fn is_complete(&self) -> bool {
        !self.endpoint_url.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneConfig {
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
}

fn default_country_code() -> String {
    "+91".to_string()
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            default_country_code: default_country_code(),
        }
    }
}

impl PhoneConfig {
    /// 统一为 "+<digits>" 形式
    pub fn country_code(&self) -> String {
        let code = self.default_country_code.trim();
        if code.starts_with('+') {
            code.to_string()
        } else {
            format!("+{code}")
        }
    }
}

/// 表单存活时间上限：7 天
pub const MAX_FORM_TTL_SECS: u64 = 7 * 24 * 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    pub ttl_secs: u64,
    pub purge_interval_secs: u64,
    /// 同时存在的表单数上限
    pub max_open_forms: usize,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 1800,
            purge_interval_secs: 60,
            max_open_forms: 10_000,
        }
    }
}

impl FormsConfig {
    pub fn ttl(&self) -> anyhow::Result<TimeDelta> {
        if self.ttl_secs == 0 || self.ttl_secs > MAX_FORM_TTL_SECS {
            anyhow::bail!(
                "forms.ttl_secs must be between 1 and {MAX_FORM_TTL_SECS}, got {}",
                self.ttl_secs
            );
        }
        i64::try_from(self.ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| anyhow::anyhow!("forms.ttl_secs is out of range: {}", self.ttl_secs))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.ttl()?;
        if self.purge_interval_secs == 0 {
            anyhow::bail!("forms.purge_interval_secs must be greater than 0");
        }
        if self.max_open_forms == 0 {
            anyhow::bail!("forms.max_open_forms must be greater than 0");
        }
        Ok(())
    }
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 配置文件不存在时完全依赖环境变量与默认值
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("Config file {config_path} not found, using environment only");
                Config::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!("failed to read config file {config_path}: {e}"));
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 启动前检查取值范围，越界时拒绝启动
    pub fn validate(&self) -> anyhow::Result<()> {
        self.forms.validate()
    }

    pub fn parse(config_str: &str) -> anyhow::Result<Self> {
        toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("failed to parse config file: {e}"))
    }

    fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT") {
            self.server.port = v
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid SERVER_PORT: {v}"))?;
        }
        if let Ok(v) = env::var("CORS_ALLOWED_ORIGINS") {
            self.server.allowed_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        // Twilio Verify
        if let Ok(v) = env::var("TWILIO_ACCOUNT_SID") {
            self.twilio.account_sid = v;
        }
        if let Ok(v) = env::var("TWILIO_AUTH_TOKEN") {
            self.twilio.auth_token = v;
        }
        if let Ok(v) = env::var("TWILIO_VERIFY_SERVICE_SID") {
            self.twilio.verify_service_sid = v;
        }
        if let Ok(v) = env::var("TWILIO_VERIFY_BASE_URL") {
            self.twilio.base_url = v;
        }

        // 线索接收端
        if let Ok(v) = env::var("INTAKE_ENDPOINT_URL") {
            self.intake.endpoint_url = v;
        }
        if let Ok(v) = env::var("INTAKE_DELIVERY_MODE") {
            self.intake.delivery_mode = v.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        }

        if let Ok(v) = env::var("DEFAULT_COUNTRY_CODE") {
            self.phone.default_country_code = v;
        }
        if let Ok(v) = env::var("FORM_TTL_SECS") {
            self.forms.ttl_secs = v
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid FORM_TTL_SECS: {v}"))?;
        }
        if let Ok(v) = env::var("FORM_PURGE_INTERVAL_SECS") {
            self.forms.purge_interval_secs = v
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid FORM_PURGE_INTERVAL_SECS: {v}"))?;
        }
        if let Ok(v) = env::var("FORM_MAX_OPEN") {
            self.forms.max_open_forms = v
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid FORM_MAX_OPEN: {v}"))?;
        }

        Ok(())
    }
}
