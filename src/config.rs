// region:    --- Imports
use std::env;
use std::path::PathBuf;
// endregion: --- Imports

// region:    --- App Config
/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub upload_dir: PathBuf,
    pub admin_email: String,
    pub admin_password: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;
        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "static/uploads".to_string())
                .into(),
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@auction.com".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()),
        })
    }
}
// endregion: --- App Config
