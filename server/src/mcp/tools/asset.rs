use crate::mcp::service::McpService;
use crate::mcp::tools::{json_content, AssetCreateRequest, AssetImportRequest};
use rmcp::{model::CallToolResult, ErrorData as McpError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetOutput {
    pub asset: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetOpOutput {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetListOutput {
    pub assets: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetUuidOutput {
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetUrlOutput {
    pub url: Option<String>,
}

impl McpService {
    pub(super) async fn do_cocos_asset_create(
        &self,
        req: AssetCreateRequest,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(req.timeout_secs);
        let ipc = self.require_ipc().await?;
        let content = req.content.map(Value::String).unwrap_or(Value::Null);
        let asset = ipc
            .request(
                "asset-db",
                "create-asset",
                vec![
                    json!(req.url),
                    content,
                    json!({ "overwrite": req.overwrite.unwrap_or(false) }),
                ],
                timeout,
            )
            .await
            .map_err(|e| McpError::internal_error(format!("Asset create error: {}", e), None))?;
        json_content(&AssetOutput { asset })
    }

    pub(super) async fn do_cocos_asset_import(
        &self,
        req: AssetImportRequest,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(req.timeout_secs);
        let ipc = self.require_ipc().await?;
        let asset = ipc
            .request(
                "asset-db",
                "import-asset",
                vec![
                    json!(req.source_path),
                    json!(req.target_url),
                    json!({ "overwrite": req.overwrite.unwrap_or(false) }),
                ],
                timeout,
            )
            .await
            .map_err(|e| McpError::internal_error(format!("Asset import error: {}", e), None))?;
        json_content(&AssetOutput { asset })
    }

    pub(super) async fn do_cocos_asset_delete(
        &self,
        url: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        ipc.request("asset-db", "delete-asset", vec![json!(url)], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Asset delete error: {}", e), None))?;
        json_content(&AssetOpOutput { ok: true })
    }

    pub(super) async fn do_cocos_asset_move(
        &self,
        from_url: String,
        to_url: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        ipc.request(
            "asset-db",
            "move-asset",
            vec![json!(from_url), json!(to_url)],
            timeout,
        )
        .await
        .map_err(|e| McpError::internal_error(format!("Asset move error: {}", e), None))?;
        json_content(&AssetOpOutput { ok: true })
    }

    pub(super) async fn do_cocos_asset_info(
        &self,
        asset: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        let info = ipc
            .request("asset-db", "query-asset-info", vec![json!(asset)], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Asset info error: {}", e), None))?;
        json_content(&AssetOutput { asset: info })
    }

    pub(super) async fn do_cocos_asset_list(
        &self,
        pattern: Option<String>,
        asset_type: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        let mut filter = serde_json::Map::new();
        if let Some(pattern) = pattern {
            filter.insert("pattern".into(), json!(pattern));
        }
        if let Some(ty) = asset_type {
            filter.insert("ccType".into(), json!(ty));
        }
        let assets = ipc
            .request(
                "asset-db",
                "query-assets",
                vec![Value::Object(filter)],
                timeout,
            )
            .await
            .map_err(|e| McpError::internal_error(format!("Asset list error: {}", e), None))?;
        json_content(&AssetListOutput { assets })
    }

    pub(super) async fn do_cocos_asset_refresh(
        &self,
        url: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        ipc.request("asset-db", "refresh-asset", vec![json!(url)], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Asset refresh error: {}", e), None))?;
        json_content(&AssetOpOutput { ok: true })
    }

    pub(super) async fn do_cocos_asset_query_uuid(
        &self,
        url: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        let uuid = ipc
            .request("asset-db", "query-uuid", vec![json!(url)], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Uuid query error: {}", e), None))?;
        json_content(&AssetUuidOutput {
            uuid: uuid.as_str().map(str::to_string),
        })
    }

    pub(super) async fn do_cocos_asset_query_url(
        &self,
        uuid: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        let url = ipc
            .request("asset-db", "query-url", vec![json!(uuid)], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Url query error: {}", e), None))?;
        json_content(&AssetUrlOutput {
            url: url.as_str().map(str::to_string),
        })
    }
}
