use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Greeting seeded the first time the panel opens on an empty conversation.
pub const DEFAULT_GREETING: &str = "Hello! I'm your shopping assistant. How can I help you today?";

/// Agent turn shown when the backend answers with an unusable body.
pub const DEFAULT_FALLBACK_REPLY: &str = "Something went wrong. Please try again.";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Base URL of the agent backend
    #[arg(long, env = "BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Open the chat panel on startup
    #[arg(long)]
    pub open: bool,

    /// Log output format (compact or json)
    #[arg(long, env = "LOG_FORMAT")]
    pub log_format: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub widget: WidgetConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub greeting: String,
    pub fallback_reply: String,
    pub start_open: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
            start_open: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl AppConfig {
    /// Load from defaults, files and environment only. Process arguments are
    /// ignored so this is safe to call under a test harness.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args().take(1))
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::load_from_cli(&cli)
    }

    pub fn load_from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("backend.base_url", "http://localhost:8000")?
            .set_default("backend.request_timeout_secs", 30)?
            .set_default("widget.greeting", DEFAULT_GREETING)?
            .set_default("widget.fallback_reply", DEFAULT_FALLBACK_REPLY)?
            .set_default("widget.start_open", false)?
            .set_default("logging.format", "compact")?;

        // 2. Config file: explicit path, else ./config.yaml when present
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        } else if Path::new("config.yaml").exists() {
            builder = builder.add_source(File::with_name("config.yaml").required(false));
        }

        // 3. Environment variables, e.g. SHOP_ASSISTANT_BACKEND__BASE_URL
        builder = builder.add_source(
            Environment::with_prefix("SHOP_ASSISTANT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI flags (clap also resolves their own env vars)
        if let Some(url) = &cli.backend_url {
            builder = builder.set_override("backend.base_url", url.as_str())?;
        }
        if let Some(secs) = cli.request_timeout_secs {
            builder = builder.set_override("backend.request_timeout_secs", secs)?;
        }
        if cli.open {
            builder = builder.set_override("widget.start_open", true)?;
        }
        if let Some(format) = &cli.log_format {
            builder = builder.set_override("logging.format", format.to_lowercase())?;
        }

        let cfg = builder.build()?;
        let app: Self = cfg.try_deserialize()?;
        if app.backend.request_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "backend.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(app)
    }
}
