use clap::{Parser, ValueEnum};
use kurteyt_redirector::{RedirectStatus, DEFAULT_RESERVED_PREFIXES};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "KURTEYT_LISTEN_ADDR";
pub const PUBLIC_BASE_URL_ENV: &str = "KURTEYT_PUBLIC_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "KURTEYT_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "KURTEYT_MYSQL_DSN";
pub const DYNAMODB_TABLE_ENV: &str = "KURTEYT_TABLE";
pub const DYNAMODB_REGION_ENV: &str = "KURTEYT_DYNAMODB_REGION";
pub const DYNAMODB_ENDPOINT_ENV: &str = "KURTEYT_DYNAMODB_ENDPOINT";
pub const INIT_SCHEMA_ENV: &str = "KURTEYT_INIT_SCHEMA";
pub const EXPIRED_REDIRECT_URL_ENV: &str = "KURTEYT_EXPIRED_REDIRECT_URL";
pub const REDIRECT_STATUS_ENV: &str = "KURTEYT_REDIRECT_STATUS";
pub const CACHE_MAX_AGE_ENV: &str = "KURTEYT_CACHE_MAX_AGE";
pub const RESERVED_PREFIXES_ENV: &str = "KURTEYT_RESERVED_PREFIXES";
pub const LOG_LEVEL_ENV: &str = "KURTEYT_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "KURTEYT_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_CACHE_MAX_AGE: u32 = 60;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
    #[value(name = "dynamodb")]
    DynamoDb,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
            StorageBackendArg::DynamoDb => write!(f, "dynamodb"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

fn parse_redirect_status(raw: &str) -> Result<RedirectStatus, String> {
    let code: u16 = raw
        .parse()
        .map_err(|_| format!("not a status code: {raw}"))?;
    RedirectStatus::try_from(code).map_err(|e| e.to_string())
}

#[derive(Debug, Parser)]
#[command(name = "kurteyt-gateway", version)]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Base of the short links handed back to clients.
    #[arg(long, env = PUBLIC_BASE_URL_ENV, default_value = DEFAULT_PUBLIC_BASE_URL)]
    pub public_base_url: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(long, env = DYNAMODB_TABLE_ENV, required_if_eq("storage", "dynamodb"))]
    pub dynamodb_table: Option<String>,

    #[arg(long, env = DYNAMODB_REGION_ENV)]
    pub dynamodb_region: Option<String>,

    /// Overrides the DynamoDB endpoint, e.g. for DynamoDB Local.
    #[arg(long, env = DYNAMODB_ENDPOINT_ENV)]
    pub dynamodb_endpoint: Option<String>,

    /// Create the table on startup if it is missing.
    #[arg(long, env = INIT_SCHEMA_ENV)]
    pub init_schema: bool,

    /// Where unknown and expired short links are sent.
    #[arg(long, env = EXPIRED_REDIRECT_URL_ENV)]
    pub expired_redirect_url: String,

    #[arg(
        long,
        env = REDIRECT_STATUS_ENV,
        default_value = "301",
        value_parser = parse_redirect_status
    )]
    pub redirect_status: RedirectStatus,

    #[arg(long, env = CACHE_MAX_AGE_ENV, default_value_t = DEFAULT_CACHE_MAX_AGE)]
    pub cache_max_age: u32,

    #[arg(
        long,
        env = RESERVED_PREFIXES_ENV,
        value_delimiter = ',',
        default_values_t = DEFAULT_RESERVED_PREFIXES.iter().map(ToString::to_string)
    )]
    pub reserved_prefixes: Vec<String>,

    /// Used when `RUST_LOG` is not set.
    #[arg(long, env = LOG_LEVEL_ENV, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}
