use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub jwt_secret: String,
    /// Session lifetime in seconds.
    pub session_ttl: usize,
    pub cookie_secure: bool,
    /// Lower-cased emails that receive the admin role at signup.
    pub admin_emails: Vec<String>,
    pub seed_demo_data: bool,
    pub log_dir: String,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_signup_per_min: u32,
    pub rate_protected_per_min: u32,
}

fn var_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .with_context(|| format!("{key} has an invalid value: {raw:?}"))
}

fn required(key: &str) -> Result<String> {
    let value = env::var(key).with_context(|| format!("{key} must be set"))?;
    if value.trim().is_empty() {
        bail!("{key} must not be empty");
    }
    Ok(value)
}

pub fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            session_ttl: var_or("SESSION_TTL", "604800")?, // default 7 days
            cookie_secure: var_or("COOKIE_SECURE", "false")?,
            admin_emails: parse_email_list(&env::var("ADMIN_EMAILS").unwrap_or_default()),
            seed_demo_data: var_or("SEED_DEMO_DATA", "false")?,
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            rate_login_per_min: var_or("RATE_LOGIN_PER_MIN", "60")?,
            rate_signup_per_min: var_or("RATE_SIGNUP_PER_MIN", "30")?,
            rate_protected_per_min: var_or("RATE_PROTECTED_PER_MIN", "1000")?,
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".into(),
            database_url: "memory://".into(),
            jwt_secret: "test-secret".into(),
            session_ttl: 3600,
            cookie_secure: false,
            admin_emails: vec!["admin@company.com".into()],
            seed_demo_data: false,
            log_dir: "logs".into(),
            rate_login_per_min: 1000,
            rate_signup_per_min: 1000,
            rate_protected_per_min: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_list_is_trimmed_and_lowercased() {
        assert_eq!(
            parse_email_list(" Admin@Company.com, ,ops@company.com "),
            vec!["admin@company.com", "ops@company.com"]
        );
        assert!(parse_email_list("").is_empty());
    }

    #[test]
    fn invalid_number_is_an_error() {
        // key is unique to this test so it cannot race other tests
        unsafe { env::set_var("SHIFTBOARD_TEST_BAD_NUMBER", "ten") };
        let parsed: Result<u32> = var_or("SHIFTBOARD_TEST_BAD_NUMBER", "1");
        assert!(parsed.is_err());
        let fallback: u32 = var_or("SHIFTBOARD_TEST_UNSET_NUMBER", "7").unwrap();
        assert_eq!(fallback, 7);
    }
}
