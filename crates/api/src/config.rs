use std::env;
use std::path::PathBuf;

use anyhow::Context;

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    /// Registration fee per team, INR. The event total is this times the
    /// number of teams; client-supplied totals are ignored.
    pub fee_per_team: i32,
    pub auth: AuthConfig,
    pub email: EmailConfig,
    pub gateway: GatewayConfig,
    pub committee_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
    pub admin_username: String,
    /// bcrypt hash of the admin password.
    pub admin_password_hash: String,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_base: String,
    pub api_key: String,
    pub from: String,
    pub admin_email: String,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub organization_id: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let port = var_or("PORT", "8080")
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let fee_per_team = var_or("FEE_PER_TEAM_INR", "8850")
            .parse::<i32>()
            .context("FEE_PER_TEAM_INR must be an integer")?;

        Ok(Self {
            port,
            database_url,
            fee_per_team,
            auth: AuthConfig::from_env()?,
            email: EmailConfig::from_env(),
            gateway: GatewayConfig::from_env(),
            committee_file: env::var("COMMITTEE_FILE").ok().map(PathBuf::from),
        })
    }
}

impl AuthConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let jwt_expiration_hours = var_or("JWT_EXPIRATION_HOURS", "12")
            .parse::<u64>()
            .context("JWT_EXPIRATION_HOURS must be an integer")?;

        // Either a precomputed bcrypt hash, or a plain password hashed at
        // startup (development convenience).
        let admin_password_hash = match env::var("ADMIN_PASSWORD_HASH") {
            Ok(hash) => hash,
            Err(_) => {
                let plain = env::var("ADMIN_PASSWORD")
                    .context("set ADMIN_PASSWORD_HASH or ADMIN_PASSWORD")?;
                bcrypt::hash(plain, bcrypt::DEFAULT_COST)
                    .context("failed to hash ADMIN_PASSWORD")?
            }
        };

        Ok(Self {
            jwt_secret,
            jwt_expiration_hours,
            admin_username: var_or("ADMIN_USERNAME", "admin"),
            admin_password_hash,
        })
    }
}

impl EmailConfig {
    pub fn from_env() -> Self {
        Self {
            api_base: var_or("EMAIL_API_BASE", "https://api.elasticemail.com"),
            // An empty key disables dispatch; lifecycle notifications then
            // surface as warnings rather than hard failures.
            api_key: var_or("EMAIL_API_KEY", ""),
            from: var_or("EMAIL_FROM", "RCGC <noreply@rcgcbooking.in>"),
            admin_email: var_or("ADMIN_ALERT_EMAIL", "rcgcbowls@gmail.com"),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: var_or(
                "GATEWAY_BASE_URL",
                "https://rcgcbooking.in/ccavenue_pg_v2/make_payment_merchant.php",
            ),
            organization_id: var_or("GATEWAY_ORGANIZATION_ID", "RCGC"),
        }
    }
}
