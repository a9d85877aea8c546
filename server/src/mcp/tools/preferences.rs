use crate::mcp::service::McpService;
use crate::mcp::tools::json_content;
use rmcp::{model::CallToolResult, ErrorData as McpError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceOutput {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceSetOutput {
    pub ok: bool,
}

fn scope_or_default(scope: Option<String>) -> Result<String, McpError> {
    let scope = scope.unwrap_or_else(|| "global".to_string());
    match scope.as_str() {
        "global" | "local" => Ok(scope),
        other => Err(McpError::invalid_params(
            format!("scope must be `global` or `local`, got `{other}`"),
            None,
        )),
    }
}

impl McpService {
    pub(super) async fn do_cocos_preferences_get(
        &self,
        key: String,
        scope: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let scope = scope_or_default(scope)?;
        let ipc = self.require_ipc().await?;
        let value = ipc
            .request(
                "preferences",
                "query-config",
                vec![json!(key), json!(scope)],
                timeout,
            )
            .await
            .map_err(|e| McpError::internal_error(format!("Preferences read error: {}", e), None))?;
        json_content(&PreferenceOutput { key, value })
    }

    pub(super) async fn do_cocos_preferences_set(
        &self,
        key: String,
        value: Value,
        scope: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let scope = scope_or_default(scope)?;
        let ipc = self.require_ipc().await?;
        ipc.request(
            "preferences",
            "set-config",
            vec![json!(key), value, json!(scope)],
            timeout,
        )
        .await
        .map_err(|e| McpError::internal_error(format!("Preferences write error: {}", e), None))?;
        json_content(&PreferenceSetOutput { ok: true })
    }
}
