use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

static E164_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{6,14}$").expect("valid E.164 regex"));

pub const OTP_CODE_LENGTH: usize = 6;

/// 没有 "+" 前缀的号码补上默认国家码，已带 "+" 的原样返回
pub fn normalize_phone(phone: &str, default_country_code: &str) -> String {
    let phone = phone.trim();
    if phone.starts_with('+') {
        phone.to_string()
    } else {
        format!("{default_country_code}{phone}")
    }
}

/// 校验规范化之后的号码是否为 E.164 格式
pub fn validate_e164_phone(phone: &str) -> AppResult<()> {
    if !E164_REGEX.is_match(phone) {
        return Err(AppError::ValidationError(
            "Please enter a valid phone number".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_otp_code(code: &str) -> AppResult<()> {
    if code.len() != OTP_CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::ValidationError(
            "Please enter a valid 6-digit OTP".to_string(),
        ));
    }
    Ok(())
}

/// 日志中只保留号码末四位
pub fn mask_phone(phone: &str) -> String {
    let count = phone.chars().count();
    phone
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if c.is_ascii_digit() && i + 4 < count {
                '*'
            } else {
                c
            }
        })
        .collect()
}
