use crate::mcp::service::McpService;
use crate::mcp::tools::json_content;
use crate::mcp::log::CapturedMessage;
use rmcp::{model::CallToolResult, ErrorData as McpError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastListenOutput {
    pub ok: bool,
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BroadcastMessagesOutput {
    pub messages: Vec<CapturedMessage>,
    pub cleared: Option<usize>,
}

impl McpService {
    pub(super) async fn do_cocos_broadcast_listen(
        &self,
        channel: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        ipc.listen(&channel, timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Broadcast listen error: {}", e), None))?;

        let mut listened = self.state().listened.lock().await;
        listened.insert(channel);
        let mut channels: Vec<String> = listened.iter().cloned().collect();
        channels.sort();
        json_content(&BroadcastListenOutput { ok: true, channels })
    }

    pub(super) async fn do_cocos_broadcast_unlisten(
        &self,
        channel: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        ipc.unlisten(&channel, timeout).await.map_err(|e| {
            McpError::internal_error(format!("Broadcast unlisten error: {}", e), None)
        })?;

        let mut listened = self.state().listened.lock().await;
        listened.remove(&channel);
        let mut channels: Vec<String> = listened.iter().cloned().collect();
        channels.sort();
        json_content(&BroadcastListenOutput { ok: true, channels })
    }

    pub(super) async fn do_cocos_broadcast_messages(
        &self,
        channel: Option<String>,
        limit: Option<u32>,
        clear: Option<bool>,
    ) -> Result<CallToolResult, McpError> {
        let messages = self
            .state()
            .messages
            .query(channel.as_deref(), limit.map(|n| n as usize))
            .await;
        let cleared = if clear.unwrap_or(false) {
            Some(self.state().messages.clear().await)
        } else {
            None
        };
        json_content(&BroadcastMessagesOutput { messages, cleared })
    }
}
