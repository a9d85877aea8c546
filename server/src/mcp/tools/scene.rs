use crate::mcp::service::McpService;
use crate::mcp::tools::json_content;
use rmcp::{model::CallToolResult, ErrorData as McpError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneOpOutput {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneListOutput {
    pub scenes: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDumpOutput {
    pub scene: Value,
}

impl McpService {
    pub(super) async fn do_cocos_scene_open(
        &self,
        scene: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;

        // open-scene wants a uuid; db:// urls resolve through the asset db first
        let uuid = if scene.starts_with("db://") {
            let resolved = ipc
                .request("asset-db", "query-uuid", vec![json!(scene)], timeout)
                .await
                .map_err(|e| McpError::internal_error(format!("Scene lookup error: {}", e), None))?;
            resolved
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| McpError::invalid_params(format!("no scene asset at {scene}"), None))?
        } else {
            scene
        };

        ipc.request("scene", "open-scene", vec![json!(uuid)], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Scene open error: {}", e), None))?;
        json_content(&SceneOpOutput { ok: true })
    }

    pub(super) async fn do_cocos_scene_save(
        &self,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        ipc.request("scene", "save-scene", vec![], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Scene save error: {}", e), None))?;
        json_content(&SceneOpOutput { ok: true })
    }

    pub(super) async fn do_cocos_scene_close(
        &self,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        ipc.request("scene", "close-scene", vec![], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Scene close error: {}", e), None))?;
        json_content(&SceneOpOutput { ok: true })
    }

    pub(super) async fn do_cocos_scene_list(
        &self,
        pattern: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        let pattern = pattern.unwrap_or_else(|| "db://assets/**/*.scene".to_string());
        let scenes = ipc
            .request(
                "asset-db",
                "query-assets",
                vec![json!({ "pattern": pattern, "ccType": "cc.SceneAsset" })],
                timeout,
            )
            .await
            .map_err(|e| McpError::internal_error(format!("Scene list error: {}", e), None))?;
        json_content(&SceneListOutput { scenes })
    }

    pub(super) async fn do_cocos_scene_hierarchy(
        &self,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        let tree = ipc
            .request("scene", "query-node-tree", vec![], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Scene hierarchy error: {}", e), None))?;
        json_content(&SceneDumpOutput { scene: tree })
    }

    pub(super) async fn do_cocos_scene_current(
        &self,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        let scene = ipc
            .request("scene", "query-current-scene", vec![], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Scene query error: {}", e), None))?;
        json_content(&SceneDumpOutput { scene })
    }
}
