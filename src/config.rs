use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub jwt_secret: String,
    pub summary_cache_ttl: Duration,
    pub event_channel_capacity: usize,
    pub frontend_urls: Vec<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("jwt_secret", &"<redacted>")
            .field("summary_cache_ttl", &self.summary_cache_ttl)
            .field("event_channel_capacity", &self.event_channel_capacity)
            .field("frontend_urls", &self.frontend_urls)
            .finish()
    }
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            port: env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(4000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string()),
            summary_cache_ttl: Duration::from_secs(
                env::var("SUMMARY_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(300),
            ),
            event_channel_capacity: env::var("EVENT_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(256),
            frontend_urls: parse_origins(
                &env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string()),
            ),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins("http://a.test, http://b.test,,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn debug_redacts_secret() {
        let config = Config {
            port: 1,
            log_level: "info".to_string(),
            jwt_secret: "hunter2".to_string(),
            summary_cache_ttl: Duration::from_secs(1),
            event_channel_capacity: 1,
            frontend_urls: vec![],
        };
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
