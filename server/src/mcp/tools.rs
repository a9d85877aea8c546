pub mod asset;
pub mod broadcast;
pub mod component;
pub mod debug;
pub mod node;
pub mod preferences;
pub mod reference_image;
pub mod scene;
pub mod status;

use crate::mcp::service::McpService;
use rmcp::{
    handler::server::tool::Parameters, model::CallToolResult, model::Content,
    ErrorData as McpError, tool, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;

#[tool_router]
impl McpService {
    // ---- bridge -----------------------------------------------------------

    #[tool(description = "Editor bridge connection status (always available)")]
    pub async fn cocos_bridge_status(&self) -> Result<CallToolResult, McpError> {
        self.do_cocos_bridge_status().await
    }

    #[tool(description = "Editor health check: round-trips the bridge and reports versions")]
    pub async fn cocos_editor_health(
        &self,
        Parameters(req): Parameters<EditorHealthRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_editor_health(req.timeout_secs).await
    }

    // ---- scene ------------------------------------------------------------

    #[tool(description = "Open a scene by asset url or uuid")]
    pub async fn cocos_scene_open(
        &self,
        Parameters(req): Parameters<SceneOpenRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_scene_open(req.scene, req.timeout_secs).await
    }

    #[tool(description = "Save the currently open scene")]
    pub async fn cocos_scene_save(
        &self,
        Parameters(req): Parameters<TimeoutRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_scene_save(req.timeout_secs).await
    }

    #[tool(description = "Close the currently open scene")]
    pub async fn cocos_scene_close(
        &self,
        Parameters(req): Parameters<TimeoutRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_scene_close(req.timeout_secs).await
    }

    #[tool(description = "List scene assets in the project")]
    pub async fn cocos_scene_list(
        &self,
        Parameters(req): Parameters<SceneListRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_scene_list(req.pattern, req.timeout_secs).await
    }

    #[tool(description = "Dump the node tree of the open scene")]
    pub async fn cocos_scene_hierarchy(
        &self,
        Parameters(req): Parameters<TimeoutRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_scene_hierarchy(req.timeout_secs).await
    }

    #[tool(description = "Info about the currently open scene")]
    pub async fn cocos_scene_current(
        &self,
        Parameters(req): Parameters<TimeoutRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_scene_current(req.timeout_secs).await
    }

    // ---- node -------------------------------------------------------------

    #[tool(description = "Create a node, optionally under a parent or from a prefab")]
    pub async fn cocos_node_create(
        &self,
        Parameters(req): Parameters<NodeCreateRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_node_create(req).await
    }

    #[tool(description = "Delete a node by uuid")]
    pub async fn cocos_node_delete(
        &self,
        Parameters(req): Parameters<NodeRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_node_delete(req.uuid, req.timeout_secs).await
    }

    #[tool(description = "Full dump of one node (transform, components, children)")]
    pub async fn cocos_node_info(
        &self,
        Parameters(req): Parameters<NodeRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_node_info(req.uuid, req.timeout_secs).await
    }

    #[tool(description = "Find nodes whose name contains a pattern (case-insensitive)")]
    pub async fn cocos_node_find(
        &self,
        Parameters(req): Parameters<NodeFindRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_node_find(req.pattern, req.timeout_secs).await
    }

    #[tool(description = "Re-parent a node")]
    pub async fn cocos_node_set_parent(
        &self,
        Parameters(req): Parameters<NodeSetParentRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_node_set_parent(req).await
    }

    #[tool(description = "Set node position/rotation/scale (any subset)")]
    pub async fn cocos_node_set_transform(
        &self,
        Parameters(req): Parameters<NodeSetTransformRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_node_set_transform(req).await
    }

    // ---- component --------------------------------------------------------

    #[tool(description = "Add a component to a node")]
    pub async fn cocos_component_add(
        &self,
        Parameters(req): Parameters<ComponentRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_component_add(req.node_uuid, req.component_type, req.timeout_secs)
            .await
    }

    #[tool(description = "Remove a component from a node")]
    pub async fn cocos_component_remove(
        &self,
        Parameters(req): Parameters<ComponentRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_component_remove(req.node_uuid, req.component_type, req.timeout_secs)
            .await
    }

    #[tool(description = "List components on a node (falls back to the scene script when the direct query is rejected)")]
    pub async fn cocos_component_list(
        &self,
        Parameters(req): Parameters<NodeRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_component_list(req.uuid, req.timeout_secs).await
    }

    #[tool(description = "Read one component property dump")]
    pub async fn cocos_component_get_property(
        &self,
        Parameters(req): Parameters<ComponentGetPropertyRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_component_get_property(req).await
    }

    #[tool(
        description = "Set a component property: coerces the value to the engine wire shape \
                       (color, vec2/vec3, size, node/component/asset references, arrays), \
                       submits it and re-reads the property to confirm the write took effect"
    )]
    pub async fn cocos_component_set_property(
        &self,
        Parameters(req): Parameters<ComponentSetPropertyRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_component_set_property(req).await
    }

    // ---- asset ------------------------------------------------------------

    #[tool(description = "Create an asset at a db:// url with optional text content")]
    pub async fn cocos_asset_create(
        &self,
        Parameters(req): Parameters<AssetCreateRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_asset_create(req).await
    }

    #[tool(description = "Import a file from disk into the asset database")]
    pub async fn cocos_asset_import(
        &self,
        Parameters(req): Parameters<AssetImportRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_asset_import(req).await
    }

    #[tool(description = "Delete an asset by db:// url")]
    pub async fn cocos_asset_delete(
        &self,
        Parameters(req): Parameters<AssetUrlRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_asset_delete(req.url, req.timeout_secs).await
    }

    #[tool(description = "Move or rename an asset")]
    pub async fn cocos_asset_move(
        &self,
        Parameters(req): Parameters<AssetMoveRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_asset_move(req.from_url, req.to_url, req.timeout_secs)
            .await
    }

    #[tool(description = "Query asset info by db:// url or uuid")]
    pub async fn cocos_asset_info(
        &self,
        Parameters(req): Parameters<AssetInfoRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_asset_info(req.asset, req.timeout_secs).await
    }

    #[tool(description = "List assets by url pattern and/or cc type")]
    pub async fn cocos_asset_list(
        &self,
        Parameters(req): Parameters<AssetListRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_asset_list(req.pattern, req.asset_type, req.timeout_secs)
            .await
    }

    #[tool(description = "Refresh an asset (re-import from disk)")]
    pub async fn cocos_asset_refresh(
        &self,
        Parameters(req): Parameters<AssetUrlRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_asset_refresh(req.url, req.timeout_secs).await
    }

    #[tool(description = "Resolve a db:// url to its uuid")]
    pub async fn cocos_asset_query_uuid(
        &self,
        Parameters(req): Parameters<AssetUrlRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_asset_query_uuid(req.url, req.timeout_secs).await
    }

    #[tool(description = "Resolve an asset uuid to its db:// url")]
    pub async fn cocos_asset_query_url(
        &self,
        Parameters(req): Parameters<AssetUuidRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_asset_query_url(req.uuid, req.timeout_secs).await
    }

    // ---- debug ------------------------------------------------------------

    #[tool(description = "Read editor console log entries")]
    pub async fn cocos_console_logs(
        &self,
        Parameters(req): Parameters<ConsoleLogsRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_console_logs(req.limit, req.level, req.timeout_secs)
            .await
    }

    #[tool(description = "Clear the editor console")]
    pub async fn cocos_console_clear(
        &self,
        Parameters(req): Parameters<TimeoutRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_console_clear(req.timeout_secs).await
    }

    #[tool(description = "Invoke a method exported by a plugin's scene script")]
    pub async fn cocos_scene_script(
        &self,
        Parameters(req): Parameters<SceneScriptRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_scene_script(req).await
    }

    // ---- broadcast --------------------------------------------------------

    #[tool(description = "Start capturing broadcast messages on a channel")]
    pub async fn cocos_broadcast_listen(
        &self,
        Parameters(req): Parameters<BroadcastChannelRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_broadcast_listen(req.channel, req.timeout_secs).await
    }

    #[tool(description = "Stop capturing broadcast messages on a channel")]
    pub async fn cocos_broadcast_unlisten(
        &self,
        Parameters(req): Parameters<BroadcastChannelRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_broadcast_unlisten(req.channel, req.timeout_secs)
            .await
    }

    #[tool(description = "Read captured broadcast messages")]
    pub async fn cocos_broadcast_messages(
        &self,
        Parameters(req): Parameters<BroadcastMessagesRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_broadcast_messages(req.channel, req.limit, req.clear)
            .await
    }

    // ---- preferences ------------------------------------------------------

    #[tool(description = "Read an editor preference value")]
    pub async fn cocos_preferences_get(
        &self,
        Parameters(req): Parameters<PreferencesGetRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_preferences_get(req.key, req.scope, req.timeout_secs)
            .await
    }

    #[tool(description = "Write an editor preference value")]
    pub async fn cocos_preferences_set(
        &self,
        Parameters(req): Parameters<PreferencesSetRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_preferences_set(req.key, req.value, req.scope, req.timeout_secs)
            .await
    }

    // ---- reference image --------------------------------------------------

    #[tool(description = "Add a scene-view reference image")]
    pub async fn cocos_reference_image_add(
        &self,
        Parameters(req): Parameters<ReferenceImagePathRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_reference_image_add(req.path, req.timeout_secs).await
    }

    #[tool(description = "Remove a scene-view reference image (the current one when no path is given)")]
    pub async fn cocos_reference_image_remove(
        &self,
        Parameters(req): Parameters<ReferenceImageOptionalPathRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_reference_image_remove(req.path, req.timeout_secs)
            .await
    }

    #[tool(description = "Switch the active scene-view reference image")]
    pub async fn cocos_reference_image_switch(
        &self,
        Parameters(req): Parameters<ReferenceImagePathRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_reference_image_switch(req.path, req.timeout_secs)
            .await
    }

    #[tool(description = "Query the current scene-view reference image setup")]
    pub async fn cocos_reference_image_query(
        &self,
        Parameters(req): Parameters<TimeoutRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.do_cocos_reference_image_query(req.timeout_secs).await
    }
}

// Helper to expose the router across modules while the generated associated
// function `tool_router()` remains private to this module.
pub(crate) fn make_tool_router() -> rmcp::handler::server::tool::ToolRouter<McpService> {
    McpService::tool_router()
}

/// Serialize a tool output into text content, the way every handler returns.
pub(crate) fn json_content<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let content = serde_json::to_string(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(content)]))
}

// ---- request shapes -------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TimeoutRequest {
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EditorHealthRequest {
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneOpenRequest {
    /// db:// url or uuid of the scene asset
    pub scene: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneListRequest {
    /// db:// url glob, defaults to db://assets/**/*.scene
    pub pattern: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NodeRequest {
    pub uuid: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NodeCreateRequest {
    pub name: String,
    pub parent_uuid: Option<String>,
    /// uuid of a prefab asset to instantiate instead of an empty node
    pub prefab_uuid: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NodeFindRequest {
    pub pattern: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NodeSetParentRequest {
    pub uuid: String,
    pub parent_uuid: String,
    pub keep_world_transform: Option<bool>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NodeSetTransformRequest {
    pub uuid: String,
    /// {x,y,z} object or [x,y,z] array
    pub position: Option<Value>,
    /// euler angles, {x,y,z} object or [x,y,z] array
    pub rotation: Option<Value>,
    /// {x,y,z} object or [x,y,z] array
    pub scale: Option<Value>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComponentRequest {
    pub node_uuid: String,
    /// component class name, e.g. cc.Label
    pub component_type: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComponentGetPropertyRequest {
    pub node_uuid: String,
    pub component_type: String,
    pub property: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComponentSetPropertyRequest {
    pub node_uuid: String,
    /// component class name, e.g. cc.Label
    pub component_type: String,
    pub property: String,
    pub value: Value,
    /// explicit element kind when the dump's type metadata is not enough:
    /// string|number|integer|boolean|enum|color|vec2|vec3|size|node|component|asset
    pub value_kind: Option<String>,
    /// concrete asset class recorded in asset references, e.g. cc.SpriteFrame
    pub asset_type: Option<String>,
    /// re-read the property after the write to confirm it took effect (default true)
    pub verify: Option<bool>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetCreateRequest {
    /// target db:// url
    pub url: String,
    pub content: Option<String>,
    pub overwrite: Option<bool>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetImportRequest {
    /// absolute path on disk
    pub source_path: String,
    /// target db:// url
    pub target_url: String,
    pub overwrite: Option<bool>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetUrlRequest {
    pub url: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetUuidRequest {
    pub uuid: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetMoveRequest {
    pub from_url: String,
    pub to_url: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetInfoRequest {
    /// db:// url or uuid
    pub asset: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetListRequest {
    /// db:// url glob, e.g. db://assets/textures/**/*
    pub pattern: Option<String>,
    /// cc type filter, e.g. cc.SpriteFrame
    pub asset_type: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConsoleLogsRequest {
    pub limit: Option<u32>,
    /// log|warn|error
    pub level: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneScriptRequest {
    /// plugin package name that registered the scene script
    pub plugin: String,
    pub method: String,
    pub args: Option<Vec<Value>>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BroadcastChannelRequest {
    pub channel: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BroadcastMessagesRequest {
    pub channel: Option<String>,
    pub limit: Option<u32>,
    /// drop the captured log after reading it
    pub clear: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PreferencesGetRequest {
    pub key: String,
    /// global|local (defaults to global)
    pub scope: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PreferencesSetRequest {
    pub key: String,
    pub value: Value,
    /// global|local (defaults to global)
    pub scope: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceImagePathRequest {
    pub path: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceImageOptionalPathRequest {
    pub path: Option<String>,
    pub timeout_secs: Option<u64>,
}
