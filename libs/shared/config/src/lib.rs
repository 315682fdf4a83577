use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    /// Bearer used for record-store writes that happen outside a caller's request.
    pub supabase_service_role_key: String,
    /// Substring matched against hospital names when ranking doctors.
    pub home_region: String,
    /// Offset applied when deciding whether an appointment falls on "today".
    pub clinic_utc_offset_minutes: i32,
    /// Period of the background admission pass; 0 disables it.
    pub admission_interval_secs: u64,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, record writes will use the anon key");
                    String::new()
                }),
            home_region: env::var("HOME_REGION")
                .unwrap_or_else(|_| {
                    warn!("HOME_REGION not set, locality bonus disabled");
                    String::new()
                }),
            clinic_utc_offset_minutes: parse_var("CLINIC_UTC_OFFSET_MINUTES", 0),
            admission_interval_secs: parse_var("ADMISSION_INTERVAL_SECS", 60),
            server_port: parse_var("SERVER_PORT", 3000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    /// Token for server-initiated writes; falls back to the anon key.
    pub fn record_store_token(&self) -> &str {
        if self.supabase_service_role_key.is_empty() {
            &self.supabase_anon_key
        } else {
            &self.supabase_service_role_key
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_jwt_secret: String::new(),
            supabase_service_role_key: String::new(),
            home_region: String::new(),
            clinic_utc_offset_minutes: 0,
            admission_interval_secs: 60,
            server_port: 3000,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default", name, raw);
            default
        }),
        Err(_) => default,
    }
}
