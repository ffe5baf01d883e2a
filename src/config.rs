use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File browser configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// The filesystem subtree exposed by this service
    #[serde(default = "default_root_directory")]
    pub root_directory: PathBuf,

    /// Address to bind to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_root_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    1337
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_directory: default_root_directory(),
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Address to listen on; accepts IPv4 and IPv6 binds
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.bind.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
