//! Configuration for Products API

use axum::http::HeaderValue;
use core_config::{app_info, server::ServerConfig, AppInfo, FromEnv};
use database::mongodb::MongoConfig;

pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Origins allowed by the CORS layer; empty disables CORS entirely
    pub cors_allowed_origins: Vec<HeaderValue>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let cors_allowed_origins = parse_cors_origins()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            cors_allowed_origins,
        })
    }
}

/// Parse comma-separated origins from `CORS_ALLOWED_ORIGIN`
///
/// The variable is optional; when unset the API serves same-origin traffic
/// only. A present but unparseable origin is a hard startup error.
fn parse_cors_origins() -> eyre::Result<Vec<HeaderValue>> {
    let Ok(origins) = std::env::var("CORS_ALLOWED_ORIGIN") else {
        return Ok(Vec::new());
    };

    origins
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<HeaderValue>()
                .map_err(|e| eyre::eyre!("Invalid CORS_ALLOWED_ORIGIN value {:?}: {}", s, e))
        })
        .collect()
}
