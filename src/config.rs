use clap::Parser;
use std::time::Duration;

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_PORT: u16 = 3000;

// 256 KiB
pub const BODY_LIMIT_BYTES: usize = 256 * 1024;

pub const RATE_LIMIT_REQUESTS: u32 = 200;
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);
pub const RATE_LIMIT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

// Process configuration, read once at startup from flags or the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "openrouter-relay")]
#[command(about = "Relays chat completions to OpenRouter without exposing the API key")]
pub struct Config {
    // Upstream credential, sent as a bearer token
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub openrouter_api_key: Option<String>,

    // Secret clients present in the x-proxy-key header
    #[arg(long, env = "PROXY_SECRET", hide_env_values = true)]
    pub proxy_secret: Option<String>,

    // Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openrouter_api_key: None,
            proxy_secret: None,
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    // Key for the upstream Authorization header. Empty when unset so the
    // upstream rejects the call and the rejection is passed through.
    pub fn upstream_key(&self) -> &str {
        self.openrouter_api_key.as_deref().unwrap_or_default()
    }
}
