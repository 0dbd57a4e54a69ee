use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "KEYHOLE_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "KEYHOLE_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "KEYHOLE_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "KEYHOLE_MYSQL_DSN";
pub const KEY_LENGTH_ENV: &str = "KEYHOLE_KEY_LENGTH";
pub const MAX_RETRIES_ENV: &str = "KEYHOLE_MAX_RETRIES";
pub const LOG_FORMAT_ENV: &str = "KEYHOLE_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "keyhole-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Public address that short URLs are built on.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    /// Number of hex characters in generated keys (1-64).
    #[arg(long, env = KEY_LENGTH_ENV, default_value_t = keyhole_generator::settings::DEFAULT_KEY_LENGTH)]
    pub key_length: usize,

    #[arg(long, env = MAX_RETRIES_ENV, default_value_t = keyhole_generator::settings::DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}
