use crate::error::{Result, SpamError};
use crate::text::StemmerKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `SPAM__SERVER__LISTEN_ADDR`
pub const ENV_PREFIX: &str = "SPAM";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub artifacts: ArtifactsConfig,
    pub normalizer: NormalizerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub vectorizer_path: PathBuf,
    pub model_path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub stemmer: StemmerKind,
    /// Added to the bundled English stop-words
    pub extra_stop_words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            vectorizer_path: PathBuf::from("artifacts/vectorizer.json"),
            model_path: PathBuf::from("artifacts/model.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Parse a TOML file; missing keys take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SpamError::Config(e.to_string()))?;

        toml::from_str(&content).map_err(|e| SpamError::Config(e.to_string()))
    }

    /// Layer defaults, an optional TOML file and `SPAM__*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&Config::default())
            .map_err(|e| SpamError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("normalizer.extra_stop_words")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| SpamError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| SpamError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.listen_addr.trim().is_empty() {
            return Err(SpamError::Config("server.listen_addr is empty".to_string()));
        }
        if self.artifacts.vectorizer_path.as_os_str().is_empty() {
            return Err(SpamError::Config(
                "artifacts.vectorizer_path is empty".to_string(),
            ));
        }
        if self.artifacts.model_path.as_os_str().is_empty() {
            return Err(SpamError::Config("artifacts.model_path is empty".to_string()));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(SpamError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }
        Ok(())
    }
}
