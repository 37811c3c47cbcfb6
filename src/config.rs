//! Configuration for wedding-rsvp
//!
//! Two layers: a TOML file ([`Config`], every field defaulted) and command
//! line arguments with environment fallbacks ([`Args`]). Values given on the
//! command line or in the environment override the file.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::admission::AdmissionPolicy;
use crate::cli::AdminCommand;

/// Password used when running in dev mode without one configured
pub const DEV_ADMIN_PASSWORD: &str = "dev-only-insecure-password";

/// Default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wedding-rsvp")
}

/// Configuration file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the ledger and guest list
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Address the HTTP API listens on
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Shared secret for admin operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,

    /// Take the client address from `X-Forwarded-For` when present
    #[serde(default)]
    pub trust_proxy: bool,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Ledger file name inside `data_dir`
    #[serde(default = "default_ledger_file")]
    pub ledger_file: String,

    /// Guest list file name inside `data_dir`
    #[serde(default = "default_guest_list_file")]
    pub guest_list_file: String,

    #[serde(default)]
    pub admission: AdmissionPolicy,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_ledger_file() -> String {
    "rsvps.json".to_string()
}

fn default_guest_list_file() -> String {
    "guests.txt".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            listen: default_listen(),
            admin_password: None,
            trust_proxy: false,
            max_body_bytes: default_max_body_bytes(),
            ledger_file: default_ledger_file(),
            guest_list_file: default_guest_list_file(),
            admission: AdmissionPolicy::default(),
        }
    }
}

impl Config {
    /// Load config from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Save config to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), std::io::Error> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Build the effective config: file (if any), then CLI/env overrides
    pub fn from_args(args: &Args) -> Result<Self, std::io::Error> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(args);
        Ok(config)
    }

    /// Apply CLI/env overrides
    pub fn apply_overrides(&mut self, args: &Args) {
        if let Some(dir) = &args.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(listen) = args.listen {
            self.listen = listen;
        }
        if let Some(password) = &args.admin_password {
            self.admin_password = Some(password.clone());
        }
        if args.trust_proxy {
            self.trust_proxy = true;
        }
    }

    /// Effective admin password (falls back to a fixed one in dev mode)
    pub fn admin_password(&self, dev_mode: bool) -> Option<String> {
        match &self.admin_password {
            Some(p) if !p.is_empty() => Some(p.clone()),
            _ if dev_mode => Some(DEV_ADMIN_PASSWORD.to_string()),
            _ => None,
        }
    }

    /// Validate configuration
    pub fn validate(&self, dev_mode: bool) -> Result<(), String> {
        if self.admin_password(dev_mode).is_none() {
            return Err("ADMIN_PASSWORD is required outside dev mode".to_string());
        }
        if self.ledger_file == self.guest_list_file {
            return Err("ledger_file and guest_list_file must differ".to_string());
        }
        if self.max_body_bytes == 0 {
            return Err("max_body_bytes must be greater than zero".to_string());
        }
        self.admission.validate()
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(&self.ledger_file)
    }

    pub fn guest_list_path(&self) -> PathBuf {
        self.data_dir.join(&self.guest_list_file)
    }
}

/// Wedding RSVP service
#[derive(Parser, Debug, Clone)]
#[command(name = "wedding-rsvp")]
#[command(about = "Guest-list gated RSVP service")]
pub struct Args {
    /// Path to config file
    #[arg(short, long, env = "RSVP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data directory (ledger and guest list)
    #[arg(long, env = "RSVP_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Admin password for maintenance operations (required in production)
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Enable development mode (default admin password)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Trust X-Forwarded-For for the client address
    #[arg(long, env = "TRUST_PROXY", default_value = "false")]
    pub trust_proxy: bool,

    /// Offline admin command; runs against the store and exits
    #[command(subcommand)]
    pub command: Option<AdminCommand>,
}
