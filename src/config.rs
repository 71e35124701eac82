//! Runtime configuration loaded from environment variables

use axum::http::{header, HeaderValue, Method};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tower_http::cors::CorsLayer;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Settings for the notification hub
#[derive(Debug, Clone, PartialEq)]
pub struct HubConfig {
    /// Upper bound for a single write (text frame, ping or close) to one client
    pub write_timeout: Duration,
    /// How often each read loop pings its client
    pub ping_interval: Duration,
    /// Read loop gives up after this long without any inbound frame
    pub idle_timeout: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            write_timeout: Duration::from_secs(5),
            ping_interval: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Longest timer the hub arms, so deadline arithmetic stays in range
pub const MAX_TIMER: Duration = Duration::from_secs(7 * 24 * 60 * 60);

impl HubConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let write_timeout = env_parse::<u64>("WS_WRITE_TIMEOUT_MS")
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.write_timeout);

        let ping_interval = env_parse::<u64>("WS_PING_INTERVAL_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.ping_interval);

        let idle_timeout = env_parse::<u64>("WS_IDLE_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.idle_timeout);

        let mut config = Self {
            write_timeout,
            ping_interval,
            idle_timeout,
        }
        .bounded();

        // A client answering every ping must never trip the idle timer
        if config.idle_timeout < config.ping_interval * 2 {
            tracing::warn!(
                idle_timeout = ?config.idle_timeout,
                ping_interval = ?config.ping_interval,
                "WS_IDLE_TIMEOUT_SECS below twice the ping interval, raising it"
            );
            config.idle_timeout = config.ping_interval * 2;
        }

        config
    }

    /// Clamp every timer to [`MAX_TIMER`] (twice that for the idle timeout).
    /// The ping interval is also kept non-zero.
    pub fn bounded(self) -> Self {
        Self {
            write_timeout: self.write_timeout.min(MAX_TIMER),
            ping_interval: self
                .ping_interval
                .clamp(Duration::from_millis(1), MAX_TIMER),
            idle_timeout: self.idle_timeout.min(MAX_TIMER * 2),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Browser origin allowed by CORS
    pub allowed_origin: String,
    /// How long to wait for in-flight requests after a shutdown signal
    pub shutdown_timeout: Duration,
    pub hub: HubConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            shutdown_timeout: Duration::from_secs(5),
            hub: HubConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = env_parse("BIND_ADDR").unwrap_or(defaults.bind_addr);
        let port = env_parse("PORT").unwrap_or(defaults.port);

        let allowed_origin = std::env::var("CORS_ALLOWED_ORIGIN")
            .ok()
            .and_then(|origin| {
                let trimmed = origin.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or(defaults.allowed_origin);

        let shutdown_timeout = env_parse("SHUTDOWN_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.shutdown_timeout);

        let hub = HubConfig::from_env();

        tracing::info!(
            %bind_addr,
            port,
            allowed_origin = %allowed_origin,
            write_timeout_ms = hub.write_timeout.as_millis() as u64,
            ping_interval_secs = hub.ping_interval.as_secs(),
            idle_timeout_secs = hub.idle_timeout.as_secs(),
            "Server config loaded"
        );

        Self {
            bind_addr,
            port,
            allowed_origin,
            shutdown_timeout,
            hub,
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// CORS policy for the browser frontend
    pub fn cors_layer(&self) -> CorsLayer {
        let origin = HeaderValue::from_str(&self.allowed_origin).unwrap_or_else(|_| {
            tracing::warn!(
                origin = %self.allowed_origin,
                "Invalid CORS origin, falling back to {}",
                DEFAULT_ALLOWED_ORIGIN
            );
            HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN)
        });

        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true)
            .max_age(Duration::from_secs(12 * 60 * 60))
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
