//! Configuration module
//!
//! Everything the proxy needs is read once at startup into [`Config`] and passed
//! explicitly to each component. Nothing below the setup layer reads the
//! process environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS, DEFAULT_SEARCH_COUNT, DEFAULT_SEARCH_QUERY,
    DEFAULT_TIMELINE_COUNT, MAX_ANIMATED_GIF_SIZE_BYTES, MAX_FORM_FILE_BYTES,
    MAX_IMAGE_SIZE_BYTES, MAX_REQUEST_BODY_BYTES, MAX_VIDEO_SIZE_BYTES,
};
use crate::models::MediaCategory;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_API_URL: &str = "https://api.twitter.com/1.1";
const DEFAULT_UPLOAD_URL: &str = "https://upload.twitter.com/1.1";
const DEFAULT_PERMALINK_BASE: &str = "https://twitter.com";
const HTTP_TIMEOUT_SECS: u64 = 60;

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub max_request_body_bytes: usize,
    pub max_form_file_bytes: u64,
}

/// OAuth 1.0a credentials for the remote account.
#[derive(Clone)]
pub struct TwitterCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl std::fmt::Debug for TwitterCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"***")
            .field("access_token", &self.access_token)
            .field("access_token_secret", &"***")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub api_url: String,
    pub upload_url: String,
    pub timeout_secs: u64,
    pub credentials: TwitterCredentials,
}

/// Per-category maximum file sizes in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MediaLimits {
    pub image: u64,
    pub animated_image: u64,
    pub video: u64,
}

impl MediaLimits {
    pub fn max_for(&self, category: MediaCategory) -> u64 {
        match category {
            MediaCategory::Image => self.image,
            MediaCategory::AnimatedImage => self.animated_image,
            MediaCategory::Video => self.video,
        }
    }
}

impl Default for MediaLimits {
    fn default() -> Self {
        Self {
            image: MAX_IMAGE_SIZE_BYTES,
            animated_image: MAX_ANIMATED_GIF_SIZE_BYTES,
            video: MAX_VIDEO_SIZE_BYTES,
        }
    }
}

/// Settings consumed by the orchestrators.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    pub screen_name: String,
    pub search_query: String,
    pub search_count: u32,
    pub timeline_count: u32,
    pub cache_ttl_secs: u64,
    pub permalink_base: String,
    pub limits: MediaLimits,
}

impl ProxyConfig {
    /// Defaults for everything except the account handle.
    pub fn new(screen_name: impl Into<String>) -> Self {
        Self {
            screen_name: screen_name.into(),
            search_query: DEFAULT_SEARCH_QUERY.to_string(),
            search_count: DEFAULT_SEARCH_COUNT,
            timeline_count: DEFAULT_TIMELINE_COUNT,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            permalink_base: DEFAULT_PERMALINK_BASE.to_string(),
            limits: MediaLimits::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheDriver {
    /// Bounded in-process LRU
    Memory { capacity: usize },
    /// One JSON file per key under `path`
    Files { path: PathBuf },
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub remote: RemoteConfig,
    pub proxy: ProxyConfig,
    pub cache: CacheDriver,
}

impl Config {
    /// Load `.env` (if present) then read the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            cors_origins,
            environment,
            max_request_body_bytes: parse_or(
                &lookup,
                "MAX_REQUEST_BODY_BYTES",
                MAX_REQUEST_BODY_BYTES,
            )?,
            max_form_file_bytes: parse_or(&lookup, "MAX_FORM_FILE_BYTES", MAX_FORM_FILE_BYTES)?,
        };

        let credentials = TwitterCredentials {
            consumer_key: required(&lookup, "CONSUMER_KEY")?,
            consumer_secret: required(&lookup, "CONSUMER_SECRET")?,
            access_token: required(&lookup, "ACCESS_TOKEN")?,
            access_token_secret: required(&lookup, "ACCESS_TOKEN_SECRET")?,
        };

        let remote = RemoteConfig {
            api_url: lookup("TWITTER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            upload_url: lookup("TWITTER_UPLOAD_URL")
                .unwrap_or_else(|| DEFAULT_UPLOAD_URL.to_string()),
            timeout_secs: parse_or(&lookup, "HTTP_TIMEOUT_SECS", HTTP_TIMEOUT_SECS)?,
            credentials,
        };

        let proxy = ProxyConfig {
            screen_name: required(&lookup, "SCREEN_NAME")?,
            search_query: lookup("SEARCH_QUERY")
                .unwrap_or_else(|| DEFAULT_SEARCH_QUERY.to_string()),
            search_count: parse_or(&lookup, "SEARCH_COUNT", DEFAULT_SEARCH_COUNT)?,
            timeline_count: parse_or(&lookup, "TIMELINE_COUNT", DEFAULT_TIMELINE_COUNT)?,
            cache_ttl_secs: parse_or(&lookup, "CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?,
            permalink_base: lookup("PERMALINK_BASE")
                .unwrap_or_else(|| DEFAULT_PERMALINK_BASE.to_string()),
            limits: MediaLimits {
                image: parse_or(&lookup, "MAX_IMAGE_SIZE_BYTES", MAX_IMAGE_SIZE_BYTES)?,
                animated_image: parse_or(
                    &lookup,
                    "MAX_ANIMATED_GIF_SIZE_BYTES",
                    MAX_ANIMATED_GIF_SIZE_BYTES,
                )?,
                video: parse_or(&lookup, "MAX_VIDEO_SIZE_BYTES", MAX_VIDEO_SIZE_BYTES)?,
            },
        };

        let cache = match lookup("CACHE_DRIVER")
            .unwrap_or_else(|| "memory".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => CacheDriver::Memory {
                capacity: parse_or(&lookup, "CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?,
            },
            "files" => CacheDriver::Files {
                path: lookup("CACHE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| env::temp_dir().join("roost-cache")),
            },
            other => {
                return Err(anyhow::anyhow!(
                    "CACHE_DRIVER must be 'memory' or 'files', got '{}'",
                    other
                ))
            }
        };

        let config = Config {
            base,
            remote,
            proxy,
            cache,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.proxy.screen_name.trim().is_empty() {
            return Err(anyhow::anyhow!("SCREEN_NAME must not be empty"));
        }

        if self.proxy.cache_ttl_secs == 0 {
            return Err(anyhow::anyhow!("CACHE_TTL_SECS must be greater than 0"));
        }

        if let CacheDriver::Memory { capacity } = self.cache {
            if capacity == 0 {
                return Err(anyhow::anyhow!("CACHE_CAPACITY must be greater than 0"));
            }
        }

        for (name, url) in [
            ("TWITTER_API_URL", &self.remote.api_url),
            ("TWITTER_UPLOAD_URL", &self.remote.upload_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!("{} must be an http(s) URL", name));
            }
        }

        Ok(())
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn max_request_body_bytes(&self) -> usize {
        self.base.max_request_body_bytes
    }

    pub fn max_form_file_bytes(&self) -> u64 {
        self.base.max_form_file_bytes
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} must be set", key))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number", key)),
        None => Ok(default),
    }
}
