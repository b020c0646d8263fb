//! Configuration, secrets and the request-scoped data model

pub mod config;
pub mod models;
pub mod secrets;

pub use config::{AppConfig, Credentials, Settings};
pub use models::{FormattedResponse, InboundUpdate, MediaReference, MediaVariant};
pub use secrets::{SecretStore, SsmSecretStore};
