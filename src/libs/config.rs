use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::libs::error::{Error, Result};
use crate::libs::render::Quoting;

pub const DATABASE_URL_ENV: &str = "LITEMODEL_DATABASE_URL";

fn default_max_connections() -> u32 {
    5
}

/// Connection settings for [`SqliteOrm`](crate::SqliteOrm).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrmConfig {
    pub database_url: String,
    /// Database file opened as-is. Takes precedence over `database_url`,
    /// which then only names the database in logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub create_if_missing: bool,
    /// Quoting used for statements the executor runs. The existence query
    /// only works against sqlite with `Escaped`.
    #[serde(default = "escaped")]
    pub quoting: Quoting,
}

fn escaped() -> Quoting {
    Quoting::Escaped
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            filename: None,
            max_connections: default_max_connections(),
            create_if_missing: false,
            quoting: Quoting::Escaped,
        }
    }
}

impl OrmConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    /// Config for a database file on disk. The path is never parsed as a
    /// url, so `?` and `#` in file names are kept.
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            filename: Some(path.to_path_buf()),
            ..Self::new(format!("sqlite://{}", path.display()))
        }
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn quoting(mut self, quoting: Quoting) -> Self {
        self.quoting = quoting;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reads the URL from `LITEMODEL_DATABASE_URL`.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(DATABASE_URL_ENV)
            .map_err(|_| Error::Config(format!("{DATABASE_URL_ENV} is not set")))?;
        let config = Self::new(url);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.database_url.starts_with("sqlite:") {
            return Err(Error::Config(format!(
                "expected a sqlite url, got {}",
                self.database_url
            )));
        }
        if self.max_connections == 0 {
            return Err(Error::Config("max_connections must be at least 1".into()));
        }
        Ok(())
    }
}
