#[cfg(unix)]
use std::path::PathBuf;
use std::{env, time::Duration};

#[derive(Debug, Clone)]
pub enum Endpoint {
    #[cfg(unix)]
    Unix(PathBuf),
    #[cfg(windows)]
    Pipe(String),
    Tcp(String), // host:port (default for the Cocos bridge plugin)
}

#[derive(Debug, Clone)]
pub struct IpcConfig {
    pub endpoint: Option<String>, // raw string like "unix:///...", "pipe://...", "tcp://host:port"
    pub token: Option<String>,
    pub connect_timeout: Duration,
    pub handshake_timeout: Duration,
    pub call_timeout: Duration,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            endpoint: env::var("COCOS_IPC_ENDPOINT").ok(),
            token: env::var("COCOS_IPC_TOKEN").ok(),
            connect_timeout: Duration::from_millis(
                env::var("COCOS_IPC_CONNECT_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(2000),
            ),
            handshake_timeout: Duration::from_millis(
                env::var("COCOS_IPC_HANDSHAKE_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(2000),
            ),
            call_timeout: Duration::from_millis(
                env::var("COCOS_IPC_CALL_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(4000),
            ),
        }
    }
}

impl IpcConfig {
    /// The endpoint string this config will resolve to, for status reporting.
    pub fn describe_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_TCP_ENDPOINT.to_string())
    }
}

const DEFAULT_TCP_ENDPOINT: &str = "tcp://127.0.0.1:6400";

pub fn default_endpoint() -> Endpoint {
    if let Ok(raw) = env::var("COCOS_IPC_ENDPOINT") {
        return parse_endpoint(&raw);
    }
    // The bridge plugin listens on TCP by default on every platform.
    Endpoint::Tcp("127.0.0.1:6400".to_string())
}

pub fn parse_endpoint(s: &str) -> Endpoint {
    #[cfg(unix)]
    {
        if let Some(rest) = s.strip_prefix("unix://") {
            return Endpoint::Unix(PathBuf::from(rest));
        }
    }
    #[cfg(windows)]
    {
        if let Some(rest) = s.strip_prefix("pipe://") {
            return Endpoint::Pipe(rest.to_string());
        }
    }
    if let Some(rest) = s.strip_prefix("tcp://") {
        return Endpoint::Tcp(rest.to_string());
    }
    // Bare strings are treated as TCP host:port
    Endpoint::Tcp(s.to_string())
}
