use crate::mcp::service::McpService;
use crate::mcp::tools::json_content;
use rmcp::{model::CallToolResult, ErrorData as McpError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeStatusOutput {
    pub connected: bool,
    pub attempt: u32,
    pub last_error: Option<String>,
    pub endpoint: String,
    /// handshake details when connected
    pub editor_version: Option<String>,
    pub bridge_version: Option<String>,
    pub session_id: Option<String>,
    pub listened_channels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorHealthOutput {
    pub ready: bool,
    pub editor_version: String,
    pub bridge_version: String,
    pub detail: Value,
}

impl McpService {
    // Status never connects: it reports what is known even when the editor is
    // down, so agents can diagnose a dead bridge.
    pub(super) async fn do_cocos_bridge_status(&self) -> Result<CallToolResult, McpError> {
        let bridge = self.get_bridge_state().await;
        let mut out = BridgeStatusOutput {
            connected: bridge.connected,
            attempt: bridge.attempt,
            last_error: bridge.last_error,
            endpoint: bridge.endpoint,
            editor_version: None,
            bridge_version: None,
            session_id: None,
            listened_channels: Vec::new(),
        };

        if bridge.connected {
            let ipc = self.state().ipc.lock().await;
            if let Some(client) = ipc.as_ref() {
                let welcome = client.welcome();
                out.editor_version = Some(welcome.editor_version.clone());
                out.bridge_version = Some(welcome.server_version.clone());
                out.session_id = Some(welcome.session_id.clone());
            }
        }

        let listened = self.state().listened.lock().await;
        out.listened_channels = listened.iter().cloned().collect();
        out.listened_channels.sort();

        json_content(&out)
    }

    pub(super) async fn do_cocos_editor_health(
        &self,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        let detail = ipc
            .health(timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Editor health error: {}", e), None))?;
        let welcome = ipc.welcome();
        json_content(&EditorHealthOutput {
            ready: true,
            editor_version: welcome.editor_version.clone(),
            bridge_version: welcome.server_version.clone(),
            detail,
        })
    }
}
