//! Configuration file handling for fintrack.
//!
//! The configuration file is stored at `$FINTRACK_HOME/config.json`. It holds the address the HTTP
//! server binds to and the settings of the financial advisor. The Gemini API key is never written
//! to `config.json`: it comes from the `GEMINI_API_KEY` environment variable or from
//! `$FINTRACK_HOME/.secrets/gemini_api_key`.

use crate::advisor::{
    AdvisorConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_RECENT_TRANSACTIONS,
    DEFAULT_SYSTEM_INSTRUCTION,
};
use crate::db::Db;
use crate::error::{IntoResult, Res};
use crate::{utils, ErrorType, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "fintrack";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const CONFIG_JSON: &str = "config.json";
const FINTRACK_SQLITE: &str = "fintrack.sqlite";
const GEMINI_API_KEY_FILE: &str = "gemini_api_key";
const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// The environment variable that holds the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINTRACK_HOME` and from there it loads `$FINTRACK_HOME/config.json` and opens the
/// database.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the data directory, the `.secrets` subdirectory, an initial `config.json` with
    /// default settings and an empty database.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or if a database already exists in `dir`.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::create_inner(dir.into()).await.pub_result(ErrorType::Config)
    }

    async fn create_inner(maybe_relative: PathBuf) -> Res<Self> {
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the fintrack home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!("A config file already exists at '{}'", config_path.display());
        }
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let sqlite_path = root.join(FINTRACK_SQLITE);
        let db = Db::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;

        debug!("Created fintrack home at {}", root.display());
        Ok(Self {
            root,
            secrets,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    /// This will
    /// - validate that `fintrack_home` exists and that the config file exists
    /// - load the config file
    /// - open the database, bringing its schema up to date
    pub async fn load(fintrack_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = fintrack_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The fintrack home directory is missing. Run `fintrack init` first.")
            .pub_result(ErrorType::Config)?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            return Err(anyhow::anyhow!(
                "The config file is missing '{}'",
                config_path.display()
            ))
            .pub_result(ErrorType::Config);
        }
        let config_file = ConfigFile::load(&config_path)
            .await
            .pub_result(ErrorType::Config)?;

        let sqlite_path = root.join(FINTRACK_SQLITE);
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")
            .pub_result(ErrorType::Database)?;

        Ok(Self {
            secrets: root.join(SECRETS),
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    /// The address `fintrack serve` listens on unless `--bind` is given.
    pub fn bind(&self) -> &str {
        &self.config_file.bind
    }

    /// Builds the advisor settings from `config.json` and the API key. The key is read from
    /// `GEMINI_API_KEY` first, then from `.secrets/gemini_api_key`. A missing key is not an error
    /// here; it only matters once a question is sent to Google.
    pub async fn advisor_config(&self) -> Result<AdvisorConfig> {
        let api_key = match std::env::var(GEMINI_API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Some(key.trim().to_string()),
            _ => self.api_key_from_file().await.pub_result(ErrorType::Config)?,
        };
        let settings = &self.config_file.advisor;
        Ok(AdvisorConfig {
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            system_instruction: settings.system_instruction.clone(),
            recent_transactions: settings.recent_transactions,
            api_key,
        })
    }

    async fn api_key_from_file(&self) -> Res<Option<String>> {
        let path = self.secrets.join(GEMINI_API_KEY_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let key = utils::read(&path).await?;
        let key = key.trim();
        Ok((!key.is_empty()).then(|| key.to_string()))
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "fintrack",
///   "config_version": 1,
///   "bind": "127.0.0.1:8000",
///   "advisor": {
///     "endpoint": "https://generativelanguage.googleapis.com/v1beta",
///     "model": "gemini-2.5-flash",
///     "system_instruction": "You are a personal financial advisor...",
///     "recent_transactions": 30
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "fintrack"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The address the HTTP server listens on
    #[serde(default = "default_bind")]
    bind: String,

    #[serde(default)]
    advisor: AdvisorSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            bind: default_bind(),
            advisor: AdvisorSettings::default(),
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// The advisor section of `config.json`. Every field is optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
struct AdvisorSettings {
    endpoint: String,
    model: String,
    system_instruction: String,
    recent_transactions: u32,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            recent_transactions: DEFAULT_RECENT_TRANSACTIONS,
        }
    }
}

impl ConfigFile {
    /// Loads and validates a ConfigFile from the specified path.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "The config file version {} is newer than this build supports ({})",
            config.config_version,
            CONFIG_VERSION
        );
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }
}
