use crate::mcp::service::McpService;
use crate::mcp::tools::{json_content, NodeCreateRequest, NodeSetParentRequest, NodeSetTransformRequest};
use crate::props::{self, PropertyKind};
use rmcp::{model::CallToolResult, ErrorData as McpError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeCreateOutput {
    pub uuid: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeOpOutput {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfoOutput {
    pub node: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeMatch {
    pub uuid: String,
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeFindOutput {
    pub matches: Vec<NodeMatch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTransformOutput {
    pub ok: bool,
    pub updated: Vec<String>,
}

impl McpService {
    pub(super) async fn do_cocos_node_create(
        &self,
        req: NodeCreateRequest,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(req.timeout_secs);
        let ipc = self.require_ipc().await?;

        let mut options = Map::new();
        options.insert("name".into(), json!(req.name));
        if let Some(parent) = req.parent_uuid {
            options.insert("parent".into(), json!(parent));
        }
        if let Some(prefab) = req.prefab_uuid {
            options.insert("assetUuid".into(), json!(prefab));
        }

        let uuid = ipc
            .request("scene", "create-node", vec![Value::Object(options)], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Node create error: {}", e), None))?;
        json_content(&NodeCreateOutput { uuid })
    }

    pub(super) async fn do_cocos_node_delete(
        &self,
        uuid: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        ipc.request("scene", "remove-node", vec![json!({ "uuid": uuid })], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Node delete error: {}", e), None))?;
        json_content(&NodeOpOutput { ok: true })
    }

    pub(super) async fn do_cocos_node_info(
        &self,
        uuid: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        let node = ipc
            .request("scene", "query-node", vec![json!(uuid)], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Node query error: {}", e), None))?;
        json_content(&NodeInfoOutput { node })
    }

    pub(super) async fn do_cocos_node_find(
        &self,
        pattern: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        let tree = ipc
            .request("scene", "query-node-tree", vec![], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Node find error: {}", e), None))?;

        let needle = pattern.to_lowercase();
        let mut matches = Vec::new();
        collect_matches(&tree, "", &needle, &mut matches);
        json_content(&NodeFindOutput { matches })
    }

    pub(super) async fn do_cocos_node_set_parent(
        &self,
        req: NodeSetParentRequest,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(req.timeout_secs);
        let ipc = self.require_ipc().await?;
        ipc.request(
            "scene",
            "set-parent",
            vec![json!({
                "parent": req.parent_uuid,
                "uuids": [req.uuid],
                "keepWorldTransform": req.keep_world_transform.unwrap_or(false),
            })],
            timeout,
        )
        .await
        .map_err(|e| McpError::internal_error(format!("Set parent error: {}", e), None))?;
        json_content(&NodeOpOutput { ok: true })
    }

    pub(super) async fn do_cocos_node_set_transform(
        &self,
        req: NodeSetTransformRequest,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(req.timeout_secs);
        let ipc = self.require_ipc().await?;

        let fields = [
            ("position", req.position),
            ("rotation", req.rotation),
            ("scale", req.scale),
        ];
        let mut updated = Vec::new();
        for (path, raw) in fields {
            let Some(raw) = raw else { continue };
            // transform channels are plain vec3 dumps on the node itself
            let descriptor = crate::props::PropertyDescriptor {
                type_name: "cc.Vec3".into(),
                extends: vec![],
                is_array: false,
                enum_list: vec![],
                readonly: false,
                current: Value::Null,
            };
            let value = props::coerce(&PropertyKind::Vec3, &raw, &descriptor, None)
                .map_err(|e| McpError::invalid_params(format!("{path}: {e}"), None))?;
            ipc.request(
                "scene",
                "set-property",
                vec![json!({
                    "uuid": req.uuid,
                    "path": path,
                    "dump": { "type": "cc.Vec3", "value": value },
                })],
                timeout,
            )
            .await
            .map_err(|e| McpError::internal_error(format!("Set {path} error: {}", e), None))?;
            updated.push(path.to_string());
        }

        if updated.is_empty() {
            return Err(McpError::invalid_params(
                "nothing to update: pass position, rotation and/or scale".to_string(),
                None,
            ));
        }
        json_content(&NodeTransformOutput { ok: true, updated })
    }
}

fn collect_matches(node: &Value, parent_path: &str, needle: &str, out: &mut Vec<NodeMatch>) {
    let name = node
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let path = if parent_path.is_empty() {
        name.clone()
    } else {
        format!("{parent_path}/{name}")
    };
    if !name.is_empty() && name.to_lowercase().contains(needle) {
        if let Some(uuid) = node.get("uuid").and_then(Value::as_str) {
            out.push(NodeMatch {
                uuid: uuid.to_string(),
                name,
                path: path.clone(),
            });
        }
    }
    if let Some(children) = node.get("children").and_then(Value::as_array) {
        for child in children {
            collect_matches(child, &path, needle, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_matches_walks_the_tree() {
        let tree = json!({
            "name": "Scene",
            "uuid": "root",
            "children": [
                {
                    "name": "Canvas",
                    "uuid": "c1",
                    "children": [
                        { "name": "ScoreLabel", "uuid": "l1", "children": [] },
                        { "name": "Background", "uuid": "b1" }
                    ]
                },
                { "name": "MainLabel", "uuid": "l2" }
            ]
        });
        let mut out = Vec::new();
        collect_matches(&tree, "", "label", &mut out);
        let uuids: Vec<&str> = out.iter().map(|m| m.uuid.as_str()).collect();
        assert_eq!(uuids, vec!["l1", "l2"]);
        assert_eq!(out[0].path, "Scene/Canvas/ScoreLabel");
    }
}
