use crate::store::StoreSettings;
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, fmt};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_REGION: &str = "auto";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments; read once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub json_logs: bool,
    /// Shared secret expected in `X-API-Key`.
    pub api_key: String,
    pub endpoint_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
    /// Base for derived object URLs, without a trailing slash.
    pub public_url: String,
    pub region: String,
    pub force_path_style: bool,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Authenticated HTTP gateway for a single S3 bucket")]
pub struct Args {
    /// Host to bind to (overrides GATEWAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides GATEWAY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Maximum accepted upload body in bytes (overrides GATEWAY_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Emit JSON logs (or set GATEWAY_JSON_LOGS=true)
    #[arg(long)]
    pub json_logs: bool,

    /// Object store endpoint URL (overrides R2_ENDPOINT_URL)
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Bucket to serve (overrides R2_BUCKET_NAME)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Public base URL for object links (overrides R2_PUBLIC_URL)
    #[arg(long)]
    pub public_url: Option<String>,

    /// Store region marker (overrides R2_REGION)
    #[arg(long)]
    pub region: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();
        Self::resolve(args, |name| env::var(name).ok())
    }

    /// Merge `args` over the variables returned by `lookup`.
    ///
    /// Secrets (credentials, API key) are only read from the environment so
    /// they never show up in process listings.
    pub fn resolve(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &str| {
            var(name).with_context(|| format!("missing required environment variable {name}"))
        };

        let port = match args.port {
            Some(port) => port,
            None => parse_var(var("GATEWAY_PORT"), "GATEWAY_PORT", DEFAULT_PORT)?,
        };
        let max_upload_bytes = match args.max_upload_bytes {
            Some(limit) => limit,
            None => parse_var(
                var("GATEWAY_MAX_UPLOAD_BYTES"),
                "GATEWAY_MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
        };
        let json_logs = args.json_logs
            || parse_var(var("GATEWAY_JSON_LOGS"), "GATEWAY_JSON_LOGS", false)?;
        let force_path_style =
            parse_var(var("R2_FORCE_PATH_STYLE"), "R2_FORCE_PATH_STYLE", false)?;

        let public_url = match args.public_url {
            Some(url) => url,
            None => required("R2_PUBLIC_URL")?,
        };
        let public_url = public_url.trim_end_matches('/').to_string();
        if public_url.is_empty() {
            bail!("R2_PUBLIC_URL must not be empty");
        }

        Ok(Self {
            host: args
                .host
                .or_else(|| var("GATEWAY_HOST"))
                .unwrap_or_else(|| DEFAULT_HOST.into()),
            port,
            max_upload_bytes,
            json_logs,
            api_key: required("API_KEY")?,
            endpoint_url: match args.endpoint_url {
                Some(url) => url,
                None => required("R2_ENDPOINT_URL")?,
            },
            access_key_id: required("R2_ACCESS_KEY_ID")?,
            secret_access_key: required("R2_SECRET_ACCESS_KEY")?,
            bucket_name: match args.bucket {
                Some(bucket) => bucket,
                None => required("R2_BUCKET_NAME")?,
            },
            public_url,
            region: args
                .region
                .or_else(|| var("R2_REGION"))
                .unwrap_or_else(|| DEFAULT_REGION.into()),
            force_path_style,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connection parameters for the store adapter.
    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            endpoint_url: self.endpoint_url.clone(),
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            bucket: self.bucket_name.clone(),
            region: self.region.clone(),
            force_path_style: self.force_path_style,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("json_logs", &self.json_logs)
            .field("api_key", &"<redacted>")
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("bucket_name", &self.bucket_name)
            .field("public_url", &self.public_url)
            .field("region", &self.region)
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

fn parse_var<T>(value: Option<String>, name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("parsing {name} value `{value}`")),
        None => Ok(default),
    }
}
