use std::path::PathBuf;
use thiserror::Error;

/// Failures talking to the log backend. The `Display` text is what ends up
/// in the status banner after the `Error: ` prefix.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid backend url '{0}'")]
    InvalidBaseUrl(String),

    #[error("could not read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration directory on this platform")]
    NoConfigDir,

    #[error("config file i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
