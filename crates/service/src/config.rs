use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use common::auth::UserEntry;
use common::storage::StorageConfig;

/// Suffix appended to the application id to form the default bucket name.
const DEFAULT_BUCKET_SUFFIX: &str = ".artifacts";

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// address for the repository server to listen on.
    ///  if not set then 0.0.0.0:8080 will be used
    pub listen_addr: Option<SocketAddr>,

    // storage configuration
    /// backend the repository serves artifacts from
    pub storage: StorageConfig,

    // repository policy
    /// path to the TOML credentials file,
    ///  if not set the server starts with an empty credential table
    pub credentials_path: Option<PathBuf>,
    /// reject uploads that would overwrite an existing artifact
    pub unique_artifacts: bool,
    /// Cache-Control value applied to listing responses
    pub cache_control_list: Option<String>,
    /// Cache-Control value applied to fetch responses
    pub cache_control_fetch: Option<String>,

    // misc
    pub log_level: tracing::Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 8080)),
            storage: StorageConfig::Memory,
            credentials_path: None,
            unique_artifacts: false,
            cache_control_list: None,
            cache_control_fetch: None,
            log_level: tracing::Level::INFO,
        }
    }
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
            .unwrap_or_else(|| SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 8080))
    }

    /// Default bucket name derived from an application id.
    pub fn default_bucket(app_id: &str) -> String {
        format!("{app_id}{DEFAULT_BUCKET_SUFFIX}")
    }

    /// Load the credential entries named by the configuration, in file
    /// order. No configured file means an empty table.
    pub fn load_credentials(&self) -> Result<Vec<UserEntry>, ConfigError> {
        match &self.credentials_path {
            Some(path) => read_credentials(path),
            None => Ok(Vec::new()),
        }
    }
}

/// Credentials file shape: a list of `[[user]]` tables.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    user: Vec<UserEntry>,
}

fn read_credentials(path: &Path) -> Result<Vec<UserEntry>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::CredentialsRead {
        path: path.to_path_buf(),
        source,
    })?;
    let file: CredentialsFile =
        toml::from_str(&raw).map_err(|source| ConfigError::CredentialsParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(file.user)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read credentials file {path}: {source}")]
    CredentialsRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse credentials file {path}: {source}")]
    CredentialsParse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
