use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env_opt(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    match env_opt(key) {
        Some(v) => v
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => default.iter().map(|s| s.to_string()).collect(),
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub aws: AwsConfig,
    pub queue: QueueConfig,
    pub emr: EmrConfig,
    pub model: ModelConfig,
    pub fetch: FetchConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            aws: AwsConfig::from_env(),
            queue: QueueConfig::from_env(),
            emr: EmrConfig::from_env(),
            model: ModelConfig::from_env(),
            fetch: FetchConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  aws:    region={}, bucket={}",
            self.aws.region,
            self.aws.data_bucket
        );
        tracing::info!("  queue:  url={}", self.queue.queue_url);
        tracing::info!(
            "  emr:    application={}, entry_point={}",
            self.emr.application_id,
            self.emr.entry_point
        );
        tracing::info!("  model:  url={}, batch_size={}", self.model.url, self.model.batch_size);
        tracing::info!(
            "  fetch:  coins={}, subreddits={}",
            self.fetch.coins.join(","),
            self.fetch.subreddits.join(",")
        );
    }
}

// ── AWS / object storage ──────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    /// Bucket holding both the raw landing zone and the processed store.
    pub data_bucket: String,
    pub endpoint_url: Option<String>,
}

impl AwsConfig {
    fn from_env() -> Self {
        Self {
            region: env_or("AWS_REGION", "us-east-1"),
            access_key_id: env_opt("AWS_ACCESS_KEY_ID"),
            secret_access_key: env_opt("AWS_SECRET_ACCESS_KEY"),
            session_token: env_opt("AWS_SESSION_TOKEN"),
            data_bucket: env_or("DATA_BUCKET_NAME", "coinpulse-data-bucket"),
            endpoint_url: env_opt("AWS_ENDPOINT_URL"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.access_key_id.is_some() || self.endpoint_url.is_some()
    }
}

// ── Queue ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    pub queue_url: String,
    pub dlq_url: Option<String>,
    pub visibility_timeout_secs: u32,
    pub max_batch_size: u32,
}

impl QueueConfig {
    fn from_env() -> Self {
        Self {
            queue_url: env_or("SQS_QUEUE_URL", ""),
            dlq_url: env_opt("SQS_DLQ_URL"),
            visibility_timeout_secs: env_u32("SQS_VISIBILITY_TIMEOUT_SECS", 120),
            max_batch_size: env_u32("SQS_MAX_BATCH_SIZE", 10),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.queue_url.is_empty()
    }
}

// ── EMR Serverless ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmrConfig {
    pub application_id: String,
    pub execution_role_arn: String,
    /// Bucket-relative path of the job entry point.
    pub entry_point: String,
    /// Bucket-relative path of the packaged job environment archive.
    pub environment_archive: String,
}

impl EmrConfig {
    fn from_env() -> Self {
        Self {
            application_id: env_or("EMR_APPLICATION_ID", ""),
            execution_role_arn: env_or("EMR_EXECUTION_ROLE_ARN", ""),
            entry_point: env_or("EMR_ENTRY_POINT", "jobs/fusion-worker"),
            environment_archive: env_or(
                "EMR_ENVIRONMENT_ARCHIVE",
                "jobs/dependencies/fusion_env.tar.gz",
            ),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.application_id.is_empty() && !self.execution_role_arn.is_empty()
    }
}

// ── Sentiment model ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of the text-classification inference endpoint.
    pub url: String,
    pub model: String,
    /// Posts per inference call.
    pub batch_size: u32,
}

impl ModelConfig {
    fn from_env() -> Self {
        Self {
            url: env_or("MODEL_URL", "http://localhost:8080"),
            model: env_or("MODEL_NAME", "sentiment-crypto"),
            batch_size: env_u32("MODEL_BATCH_SIZE", 32),
        }
    }
}

// ── Fetchers ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub coins: Vec<String>,
    pub currency: String,
    pub subreddits: Vec<String>,
    pub post_limit: u32,
    pub user_agent: String,
    pub compress: bool,
    /// Top-level key prefix for the raw landing zone.
    pub raw_prefix: String,
}

impl FetchConfig {
    fn from_env() -> Self {
        Self {
            coins: env_list("FETCH_COINS", &["bitcoin", "ethereum", "dogecoin"]),
            currency: env_or("FETCH_CURRENCY", "usd"),
            subreddits: env_list("FETCH_SUBREDDITS", &["Bitcoin", "ethereum", "dogecoin"]),
            post_limit: env_u32("FETCH_POST_LIMIT", 20),
            user_agent: env_or("FETCH_USER_AGENT", "coinpulse-bot"),
            compress: env_bool("FETCH_COMPRESS", true),
            raw_prefix: env_or("FETCH_RAW_PREFIX", "raw"),
        }
    }
}
