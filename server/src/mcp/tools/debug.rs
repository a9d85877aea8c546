use crate::mcp::service::McpService;
use crate::mcp::tools::{json_content, SceneScriptRequest};
use rmcp::{model::CallToolResult, ErrorData as McpError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleLogsOutput {
    pub entries: Vec<Value>,
    /// entries matching the level filter, before the limit is applied
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleClearOutput {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneScriptOutput {
    pub result: Value,
}

impl McpService {
    pub(super) async fn do_cocos_console_logs(
        &self,
        limit: Option<u32>,
        level: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        let raw = ipc
            .request("console", "query", vec![], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Console query error: {}", e), None))?;

        let all: Vec<Value> = raw.as_array().cloned().unwrap_or_default();
        let (entries, total) = select_entries(all, level.as_deref(), limit.map(|n| n as usize));
        json_content(&ConsoleLogsOutput { entries, total })
    }

    pub(super) async fn do_cocos_console_clear(
        &self,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        ipc.request("console", "clear", vec![], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Console clear error: {}", e), None))?;
        json_content(&ConsoleClearOutput { ok: true })
    }

    pub(super) async fn do_cocos_scene_script(
        &self,
        req: SceneScriptRequest,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(req.timeout_secs);
        let ipc = self.require_ipc().await?;
        let result = ipc
            .request(
                "scene",
                "execute-scene-script",
                vec![json!({
                    "name": req.plugin,
                    "method": req.method,
                    "args": req.args.unwrap_or_default(),
                })],
                timeout,
            )
            .await
            .map_err(|e| McpError::internal_error(format!("Scene script error: {}", e), None))?;
        json_content(&SceneScriptOutput { result })
    }
}

/// Level filter first, then the limit keeping the newest entries. The
/// returned count is of the filtered set, so `entries.len() <= total` holds.
fn select_entries(
    all: Vec<Value>,
    level: Option<&str>,
    limit: Option<usize>,
) -> (Vec<Value>, usize) {
    let mut entries: Vec<Value> = match level {
        Some(level) => all
            .into_iter()
            .filter(|e| e.get("type").and_then(Value::as_str) == Some(level))
            .collect(),
        None => all,
    };
    let total = entries.len();
    if let Some(limit) = limit {
        if entries.len() > limit {
            entries = entries.split_off(entries.len() - limit);
        }
    }
    (entries, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logs() -> Vec<Value> {
        vec![
            json!({ "type": "log", "message": "a" }),
            json!({ "type": "error", "message": "b" }),
            json!({ "type": "log", "message": "c" }),
            json!({ "type": "warn", "message": "d" }),
        ]
    }

    #[test]
    fn total_counts_the_filtered_set() {
        let (entries, total) = select_entries(logs(), Some("log"), None);
        assert_eq!(total, 2);
        assert_eq!(entries.len(), 2);

        let (entries, total) = select_entries(logs(), Some("error"), Some(10));
        assert_eq!(total, 1);
        assert_eq!(entries[0]["message"], "b");
    }

    #[test]
    fn limit_keeps_the_newest_entries() {
        let (entries, total) = select_entries(logs(), None, Some(2));
        assert_eq!(total, 4);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["message"], "c");
        assert_eq!(entries[1]["message"], "d");
    }
}
