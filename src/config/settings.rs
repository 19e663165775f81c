//! Runtime configuration, read from the environment once at startup.

use std::env;

/// Everything the server needs to know about its collaborators.
///
/// Every field has a default so the server boots without any environment set;
/// missing credentials surface later as inline errors or test-mode behaviour.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_address: String,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub redis_uri: String,
    pub llm: LlmSettings,
    /// Static allow-list of service API keys (`API_KEYS`, comma separated).
    pub api_keys: Vec<String>,
    pub jwt_secret: String,
    pub token_expiry_days: i64,
    pub stripe: StripeSettings,
    pub static_dir: String,
    pub assistant_name: String,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub default_model: String,
}

#[derive(Debug, Clone)]
pub struct StripeSettings {
    pub api_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub api_base: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("BIND_ADDRESS", "0.0.0.0:8080"),
            mongodb_uri: env_or("MONGODB_URI", "mongodb://127.0.0.1:27017"),
            mongodb_database: env_or("MONGODB_DATABASE", "codeport"),
            redis_uri: env_or("REDIS_URI", "redis://127.0.0.1:6379"),
            llm: LlmSettings::from_env(),
            api_keys: parse_list(&env_or("API_KEYS", "")),
            jwt_secret: env_or("JWT_SECRET", "codeport-development-secret"),
            token_expiry_days: parse_env("TOKEN_EXPIRY_DAYS", 7),
            stripe: StripeSettings {
                api_key: non_empty("STRIPE_API_KEY"),
                webhook_secret: non_empty("STRIPE_WEBHOOK_SECRET"),
                api_base: env_or("STRIPE_API_BASE", "https://api.stripe.com/v1"),
                success_url: env_or(
                    "CHECKOUT_SUCCESS_URL",
                    "https://example.com/success?session_id={CHECKOUT_SESSION_ID}",
                ),
                cancel_url: env_or("CHECKOUT_CANCEL_URL", "https://example.com/cancel"),
            },
            static_dir: env_or("STATIC_DIR", "static"),
            assistant_name: env_or("ASSISTANT_NAME", "Polly"),
        }
    }
}

impl LlmSettings {
    /// Groq wins when its key is present (lower latency); OpenRouter otherwise.
    pub fn from_env() -> Self {
        if let Some(api_key) = non_empty("GROQ_API_KEY") {
            return Self {
                base_url: env_or("GROQ_BASE_URL", "https://api.groq.com/openai/v1"),
                api_key: Some(api_key),
                default_model: env_or("DEFAULT_MODEL", "llama-3.3-70b-versatile"),
            };
        }

        Self {
            base_url: env_or("OPENROUTER_BASE_URL", "https://openrouter.ai/api/v1"),
            api_key: non_empty("OPENROUTER_API_KEY"),
            default_model: env_or("DEFAULT_MODEL", "mistralai/devstral-2512:free"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
