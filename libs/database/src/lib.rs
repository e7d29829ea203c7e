//! MongoDB connection management for the product catalog services
//!
//! Provides configuration loading, connection establishment with retry, and
//! health probes on top of the official `mongodb` driver.
//!
//! # Examples
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//!
//! let config = MongoConfig::from_env()?;
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;
pub mod mongodb;

pub use common::{RetryConfig, retry, retry_with_backoff};
