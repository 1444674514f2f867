use std::env;
use tracing::warn;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub clinic_api_url: String,
    pub clinic_api_key: String,
    pub finance_api_url: String,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let clinic_api_url = env::var("CLINIC_API_URL").unwrap_or_else(|_| {
            warn!("CLINIC_API_URL not set, using empty value");
            String::new()
        });

        let config = Self {
            clinic_api_key: env::var("CLINIC_API_KEY").unwrap_or_else(|_| {
                warn!("CLINIC_API_KEY not set, using empty value");
                String::new()
            }),
            finance_api_url: env::var("FINANCE_API_URL").unwrap_or_else(|_| {
                // The finance gateway usually lives behind the same host.
                clinic_api_url.clone()
            }),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            clinic_api_url,
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.clinic_api_url.is_empty() && !self.clinic_api_key.is_empty()
    }
}
