use crate::mcp::service::McpService;
use crate::mcp::tools::json_content;
use rmcp::{model::CallToolResult, ErrorData as McpError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceImageOpOutput {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceImageQueryOutput {
    pub config: Value,
}

impl McpService {
    pub(super) async fn do_cocos_reference_image_add(
        &self,
        path: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        ipc.request("reference-image", "add-image", vec![json!(path)], timeout)
            .await
            .map_err(|e| {
                McpError::internal_error(format!("Reference image add error: {}", e), None)
            })?;
        json_content(&ReferenceImageOpOutput { ok: true })
    }

    pub(super) async fn do_cocos_reference_image_remove(
        &self,
        path: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        let args = match path {
            Some(path) => vec![json!(path)],
            None => vec![],
        };
        ipc.request("reference-image", "remove-image", args, timeout)
            .await
            .map_err(|e| {
                McpError::internal_error(format!("Reference image remove error: {}", e), None)
            })?;
        json_content(&ReferenceImageOpOutput { ok: true })
    }

    pub(super) async fn do_cocos_reference_image_switch(
        &self,
        path: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        ipc.request("reference-image", "switch-image", vec![json!(path)], timeout)
            .await
            .map_err(|e| {
                McpError::internal_error(format!("Reference image switch error: {}", e), None)
            })?;
        json_content(&ReferenceImageOpOutput { ok: true })
    }

    pub(super) async fn do_cocos_reference_image_query(
        &self,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        let config = ipc
            .request("reference-image", "query-config", vec![], timeout)
            .await
            .map_err(|e| {
                McpError::internal_error(format!("Reference image query error: {}", e), None)
            })?;
        json_content(&ReferenceImageQueryOutput { config })
    }
}
