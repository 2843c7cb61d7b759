//! Handles settings for the CLI. Configuration is read from `settings.toml`
//! when present; every key has a default, so the file is optional.

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level filter for the `tracing` subscriber.
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Sqlite {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub sqlite: Sqlite,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "warn")?
            .set_default("sqlite.path", "./gruzzolo.db")?
            .add_source(File::with_name("settings").required(false))
            .build()?;

        settings.try_deserialize()
    }
}
