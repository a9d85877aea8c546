use std::{env, time::Duration};

use crate::ipc::path::IpcConfig;

/// Process-level configuration: the bridge endpoint plus the default budget a
/// tool call may spend waiting on the editor.
#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    pub ipc: IpcConfig,
    /// Explicit override; without one the ipc call timeout is the budget.
    pub tool_timeout_secs: Option<u64>,
}

impl ServerConfig {
    pub const ENV_TOOL_TIMEOUT: &'static str = "COCOS_TOOL_TIMEOUT"; // seconds

    /// Construct from real process environment variables.
    pub fn load() -> Self {
        Self::from_reader(|k| env::var(k).ok())
    }

    /// Construct from an arbitrary key/value source (for tests).
    pub fn from_map<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        use std::collections::HashMap;
        let map: HashMap<String, String> = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_reader(|k| map.get(k).cloned())
    }

    fn from_reader<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = get(Self::ENV_TOOL_TIMEOUT) {
            if let Ok(secs) = raw.trim().parse::<u64>() {
                if secs > 0 {
                    cfg.tool_timeout_secs = Some(secs);
                }
            }
        }

        cfg
    }

    /// Budget one tool call may spend on the editor: the explicit override,
    /// or the ipc call timeout when none is set.
    pub fn tool_timeout(&self) -> Duration {
        self.tool_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.ipc.call_timeout)
    }
}
