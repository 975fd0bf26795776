use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "BURNBOX_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "BURNBOX_STORAGE_BACKEND";
pub const REDIS_URL_ENV: &str = "BURNBOX_REDIS_URL";
pub const REDIS_KEY_PREFIX_ENV: &str = "BURNBOX_REDIS_KEY_PREFIX";
pub const PUBLIC_BASE_URL_ENV: &str = "BURNBOX_PUBLIC_BASE_URL";
pub const MAX_CONTENT_BYTES_ENV: &str = "BURNBOX_MAX_CONTENT_BYTES";
pub const TEST_MODE_ENV: &str = "BURNBOX_TEST_MODE";
pub const TEST_NOW_MS_ENV: &str = "BURNBOX_TEST_NOW_MS";
pub const LOG_FORMAT_ENV: &str = "BURNBOX_LOG_FORMAT";
pub const SWEEP_INTERVAL_ENV: &str = "BURNBOX_SWEEP_INTERVAL_SECS";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_MAX_CONTENT_BYTES: usize = 1024 * 1024;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "redis")]
    Redis,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "burnbox", about = "Self-destructing paste service")]
pub struct Cli {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("storage", "redis"))]
    pub redis_url: Option<String>,

    #[arg(
        long,
        env = REDIS_KEY_PREFIX_ENV,
        default_value = burnbox_storage::redis::DEFAULT_KEY_PREFIX,
    )]
    pub redis_key_prefix: String,

    /// Base of returned paste urls; derived from the `Host` header when unset.
    #[arg(long, env = PUBLIC_BASE_URL_ENV)]
    pub public_base_url: Option<String>,

    #[arg(long, env = MAX_CONTENT_BYTES_ENV, default_value_t = DEFAULT_MAX_CONTENT_BYTES)]
    pub max_content_bytes: usize,

    /// Honour the `x-test-now-ms` header on read routes.
    #[arg(long, env = TEST_MODE_ENV)]
    pub test_mode: bool,

    /// In test mode, epoch milliseconds used by reads without an `x-test-now-ms` header.
    #[arg(long, env = TEST_NOW_MS_ENV, requires = "test_mode")]
    pub test_now_ms: Option<String>,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    /// How often the in-memory backend drops expired pastes.
    #[arg(long, env = SWEEP_INTERVAL_ENV, default_value_t = DEFAULT_SWEEP_INTERVAL_SECS)]
    pub sweep_interval_secs: u64,
}
