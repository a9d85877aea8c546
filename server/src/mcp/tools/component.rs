use std::time::Duration;

use crate::ipc::client::{IpcClient, IpcError};
use crate::mcp::service::McpService;
use crate::mcp::tools::{json_content, ComponentGetPropertyRequest, ComponentSetPropertyRequest};
use crate::props::{self, PropertyDescriptor};
use rmcp::{model::CallToolResult, ErrorData as McpError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// Verification poll: short fixed interval, bounded attempts. Replaces the
// single blind settle-sleep the editor otherwise needs after set-property.
const VERIFY_ATTEMPTS: u32 = 5;
const VERIFY_INTERVAL: Duration = Duration::from_millis(60);

/// Plugin package name of the editor-side bridge; its scene script backs the
/// component-list fallback.
const BRIDGE_PLUGIN: &str = "cocos-mcp-bridge";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentOpOutput {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentListOutput {
    pub components: Vec<ComponentEntry>,
    /// true when the direct node query was rejected and the scene script answered
    pub via_scene_script: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentEntry {
    #[serde(rename = "type")]
    pub component_type: String,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDumpOutput {
    pub property: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPropertyOutput {
    pub ok: bool,
    /// resolved property kind, e.g. "color" or "array of node"
    pub kind: String,
    /// engine-native value actually submitted
    pub submitted: Value,
    /// present unless verification was disabled
    pub verified: Option<bool>,
    /// last re-read value when verification did not confirm the write
    pub observed: Option<Value>,
}

impl McpService {
    pub(super) async fn do_cocos_component_add(
        &self,
        node_uuid: String,
        component_type: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        ipc.request(
            "scene",
            "create-component",
            vec![json!({ "uuid": node_uuid, "component": component_type })],
            timeout,
        )
        .await
        .map_err(|e| McpError::internal_error(format!("Component add error: {}", e), None))?;
        json_content(&ComponentOpOutput { ok: true })
    }

    pub(super) async fn do_cocos_component_remove(
        &self,
        node_uuid: String,
        component_type: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;
        ipc.request(
            "scene",
            "remove-component",
            vec![json!({ "uuid": node_uuid, "component": component_type })],
            timeout,
        )
        .await
        .map_err(|e| McpError::internal_error(format!("Component remove error: {}", e), None))?;
        json_content(&ComponentOpOutput { ok: true })
    }

    pub(super) async fn do_cocos_component_list(
        &self,
        node_uuid: String,
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(timeout_secs);
        let ipc = self.require_ipc().await?;

        match ipc
            .request("scene", "query-node", vec![json!(node_uuid)], timeout)
            .await
        {
            Ok(node) => {
                let components = extract_components(&node);
                json_content(&ComponentListOutput {
                    components,
                    via_scene_script: false,
                })
            }
            // Two-tier fallback: some editor states reject query-node while the
            // bridge's scene script can still reach the node.
            Err(direct_err) => {
                tracing::debug!(error = %direct_err, "query-node rejected, trying scene script");
                let listed = ipc
                    .request(
                        "scene",
                        "execute-scene-script",
                        vec![json!({
                            "name": BRIDGE_PLUGIN,
                            "method": "getNodeComponents",
                            "args": [node_uuid],
                        })],
                        timeout,
                    )
                    .await
                    .map_err(|e| {
                        McpError::internal_error(
                            format!("Component list error: {} (direct query: {})", e, direct_err),
                            None,
                        )
                    })?;
                let components = listed
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|item| {
                                Some(ComponentEntry {
                                    component_type: item
                                        .get("type")
                                        .and_then(Value::as_str)?
                                        .to_string(),
                                    enabled: item.get("enabled").and_then(Value::as_bool),
                                })
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                json_content(&ComponentListOutput {
                    components,
                    via_scene_script: true,
                })
            }
        }
    }

    pub(super) async fn do_cocos_component_get_property(
        &self,
        req: ComponentGetPropertyRequest,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(req.timeout_secs);
        let ipc = self.require_ipc().await?;
        let node = ipc
            .request("scene", "query-node", vec![json!(req.node_uuid)], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Node query error: {}", e), None))?;
        let (_, comp) = props::find_component(&node, &req.component_type).ok_or_else(|| {
            McpError::invalid_params(
                format!("node has no {} component", req.component_type),
                None,
            )
        })?;
        let dump = props::property_dump(comp, &req.property).ok_or_else(|| {
            McpError::invalid_params(
                format!("{} has no property `{}`", req.component_type, req.property),
                None,
            )
        })?;
        json_content(&PropertyDumpOutput {
            property: dump.clone(),
        })
    }

    pub(super) async fn do_cocos_component_set_property(
        &self,
        req: ComponentSetPropertyRequest,
    ) -> Result<CallToolResult, McpError> {
        let timeout = self.call_timeout(req.timeout_secs);
        let ipc = self.require_ipc().await?;

        // 1) introspect the current component state
        let node = ipc
            .request("scene", "query-node", vec![json!(req.node_uuid)], timeout)
            .await
            .map_err(|e| McpError::internal_error(format!("Node query error: {}", e), None))?;
        let (comp_index, comp) =
            props::find_component(&node, &req.component_type).ok_or_else(|| {
                McpError::invalid_params(
                    format!("node has no {} component", req.component_type),
                    None,
                )
            })?;
        let dump = props::property_dump(comp, &req.property).ok_or_else(|| {
            McpError::invalid_params(
                format!("{} has no property `{}`", req.component_type, req.property),
                None,
            )
        })?;
        let descriptor = PropertyDescriptor::from_dump(dump)
            .map_err(|e| McpError::internal_error(format!("Property dump error: {}", e), None))?;

        // 2) resolve the kind and coerce the input to the wire shape
        let kind = props::analyze(&descriptor, req.value_kind.as_deref())
            .map_err(|e| McpError::invalid_params(format!("{}: {e}", req.property), None))?;
        let wire = props::coerce(&kind, &req.value, &descriptor, req.asset_type.as_deref())
            .map_err(|e| McpError::invalid_params(format!("{}: {e}", req.property), None))?;

        // 3) submit through the editor
        let path = format!("__comps__.{comp_index}.{}", req.property);
        ipc.request(
            "scene",
            "set-property",
            vec![json!({
                "uuid": req.node_uuid,
                "path": path,
                "dump": {
                    "type": kind.wire_type(&descriptor),
                    "value": wire,
                    "isArray": descriptor.is_array,
                },
            })],
            timeout,
        )
        .await
        .map_err(|e| McpError::internal_error(format!("Set property error: {}", e), None))?;

        // 4) re-read until the editor reflects the write or attempts run out
        let (verified, observed) = if req.verify.unwrap_or(true) {
            let (ok, seen) = self
                .verify_property_change(&ipc, &req, &kind, &wire, timeout)
                .await;
            (Some(ok), if ok { None } else { seen })
        } else {
            (None, None)
        };

        json_content(&SetPropertyOutput {
            ok: true,
            kind: kind.to_string(),
            submitted: wire,
            verified,
            observed,
        })
    }

    async fn verify_property_change(
        &self,
        ipc: &IpcClient,
        req: &ComponentSetPropertyRequest,
        kind: &props::PropertyKind,
        expected: &Value,
        timeout: Duration,
    ) -> (bool, Option<Value>) {
        let mut observed = None;
        for attempt in 0..VERIFY_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(VERIFY_INTERVAL).await;
            }
            match self.read_back(ipc, req, timeout).await {
                Ok(value) => {
                    if props::values_match(kind, expected, &value) {
                        return (true, Some(value));
                    }
                    observed = Some(value);
                }
                Err(e) => {
                    tracing::debug!(error = %e, attempt, "verification re-read failed");
                }
            }
        }
        (false, observed)
    }

    async fn read_back(
        &self,
        ipc: &IpcClient,
        req: &ComponentSetPropertyRequest,
        timeout: Duration,
    ) -> Result<Value, IpcError> {
        let node = ipc
            .request("scene", "query-node", vec![json!(req.node_uuid)], timeout)
            .await?;
        let value = props::find_component(&node, &req.component_type)
            .and_then(|(_, comp)| props::property_dump(comp, &req.property))
            .map(|dump| props::unwrap_dump(dump).clone())
            .unwrap_or(Value::Null);
        Ok(value)
    }
}

fn extract_components(node: &Value) -> Vec<ComponentEntry> {
    node.get("__comps__")
        .and_then(Value::as_array)
        .map(|comps| {
            comps
                .iter()
                .filter_map(|comp| {
                    let component_type = comp
                        .get("type")
                        .or_else(|| comp.get("__type__"))
                        .and_then(Value::as_str)?
                        .to_string();
                    let enabled = comp
                        .get("value")
                        .and_then(|v| v.get("enabled"))
                        .map(props::unwrap_dump)
                        .and_then(Value::as_bool);
                    Some(ComponentEntry {
                        component_type,
                        enabled,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}
