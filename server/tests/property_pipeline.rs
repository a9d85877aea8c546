//! End-to-end property writes against a stateful mock bridge: analyze the
//! dump, coerce the input, submit set-property, re-read and compare.

use std::sync::Arc;
use std::time::Duration;

use cocos_mcp_server::ipc::client::IpcClient;
use cocos_mcp_server::ipc::path::IpcConfig;
use cocos_mcp_server::ipc::protocol::{
    Body, EditorResponse, Envelope, Welcome, IPC_VERSION,
};
use cocos_mcp_server::ipc::{codec, framing};
use cocos_mcp_server::props::{
    analyze, coerce, find_component, property_dump, unwrap_dump, values_match,
    PropertyDescriptor,
};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

fn initial_node_dump() -> Value {
    json!({
        "uuid": { "value": "node-1" },
        "name": { "value": "Label" },
        "__comps__": [
            {
                "type": "cc.UITransform",
                "value": {
                    "contentSize": {
                        "value": { "width": 100.0, "height": 40.0 },
                        "type": "cc.Size"
                    }
                }
            },
            {
                "type": "cc.Label",
                "value": {
                    "string": { "value": "hello", "type": "String" },
                    "fontSize": { "value": 24, "type": "Number" },
                    "color": {
                        "value": { "r": 255, "g": 255, "b": 255, "a": 255 },
                        "type": "cc.Color"
                    },
                    "horizontalAlign": {
                        "value": 0,
                        "type": "Enum",
                        "enumList": [
                            { "name": "LEFT", "value": 0 },
                            { "name": "CENTER", "value": 1 },
                            { "name": "RIGHT", "value": 2 }
                        ]
                    },
                    "font": {
                        "value": { "uuid": "" },
                        "type": "cc.Font",
                        "extends": ["cc.Asset", "cc.Object"]
                    }
                }
            }
        ]
    })
}

/// Apply a `set-property` option object to the stored dump the way the scene
/// process does: `path` is `__comps__.{index}.{property}`.
fn apply_set_property(node: &mut Value, options: &Value) -> bool {
    let Some(path) = options.get("path").and_then(Value::as_str) else {
        return false;
    };
    let mut parts = path.split('.');
    if parts.next() != Some("__comps__") {
        return false;
    }
    let Some(index) = parts.next().and_then(|p| p.parse::<usize>().ok()) else {
        return false;
    };
    let Some(property) = parts.next() else {
        return false;
    };
    let Some(new_value) = options.get("dump").and_then(|d| d.get("value")) else {
        return false;
    };

    let slot = node
        .get_mut("__comps__")
        .and_then(Value::as_array_mut)
        .and_then(|comps| comps.get_mut(index))
        .and_then(|comp| comp.get_mut("value"))
        .and_then(|v| v.get_mut(property))
        .and_then(|p| p.get_mut("value"));
    match slot {
        Some(slot) => {
            *slot = new_value.clone();
            true
        }
        None => false,
    }
}

async fn spawn_stateful_bridge(node: Arc<Mutex<Value>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let node = node.clone();
            tokio::spawn(async move {
                let mut framed = framing::into_framed(stream);

                // accept any hello
                let Some(Ok(bytes)) = framed.next().await else {
                    return;
                };
                if codec::decode_envelope(bytes.freeze()).is_err() {
                    return;
                }
                let welcome = Envelope::control(Body::Welcome(Welcome {
                    ipc_version: IPC_VERSION,
                    server_version: "0.1.0-test".into(),
                    editor_version: "Cocos Creator 3.8.test".into(),
                    session_id: "session-props".into(),
                }));
                let _ = framed.send(codec::encode_envelope(&welcome).unwrap()).await;

                while let Some(Ok(bytes)) = framed.next().await {
                    let Ok(env) = codec::decode_envelope(bytes.freeze()) else {
                        continue;
                    };
                    let Body::Request(req) = env.body else {
                        continue;
                    };
                    let resp = match (req.namespace.as_str(), req.command.as_str()) {
                        ("scene", "query-node") => EditorResponse {
                            ok: true,
                            data: node.lock().await.clone(),
                            error: None,
                        },
                        ("scene", "set-property") => {
                            let applied = match req.args.first() {
                                Some(options) => {
                                    apply_set_property(&mut *node.lock().await, options)
                                }
                                None => false,
                            };
                            if applied {
                                EditorResponse {
                                    ok: true,
                                    data: Value::Null,
                                    error: None,
                                }
                            } else {
                                EditorResponse {
                                    ok: false,
                                    data: Value::Null,
                                    error: Some("set-property: bad path".into()),
                                }
                            }
                        }
                        _ => EditorResponse {
                            ok: false,
                            data: Value::Null,
                            error: Some(format!("unknown {}/{}", req.namespace, req.command)),
                        },
                    };
                    let env = Envelope::response(env.correlation_id, resp);
                    let _ = framed.send(codec::encode_envelope(&env).unwrap()).await;
                }
            });
        }
    });
    addr
}

async fn connect(addr: &str) -> IpcClient {
    IpcClient::connect(IpcConfig {
        endpoint: Some(format!("tcp://{addr}")),
        token: None,
        connect_timeout: Duration::from_secs(2),
        handshake_timeout: Duration::from_secs(2),
        call_timeout: Duration::from_secs(2),
    })
    .await
    .expect("mock bridge should accept")
}

const TIMEOUT: Duration = Duration::from_secs(2);

/// Drive one property write through the same steps the tool takes.
async fn set_and_verify(
    client: &IpcClient,
    component_type: &str,
    property: &str,
    raw: Value,
    declared: Option<&str>,
    asset_type: Option<&str>,
) -> anyhow::Result<Value> {
    let node = client
        .request("scene", "query-node", vec![json!("node-1")], TIMEOUT)
        .await?;
    let (index, comp) = find_component(&node, component_type)
        .ok_or_else(|| anyhow::anyhow!("component {component_type} not on node"))?;
    let dump = property_dump(comp, property)
        .ok_or_else(|| anyhow::anyhow!("property {property} not on component"))?;

    let descriptor = PropertyDescriptor::from_dump(dump)?;
    let kind = analyze(&descriptor, declared)?;
    let wire = coerce(&kind, &raw, &descriptor, asset_type)?;

    client
        .request(
            "scene",
            "set-property",
            vec![json!({
                "uuid": "node-1",
                "path": format!("__comps__.{index}.{property}"),
                "dump": {
                    "type": kind.wire_type(&descriptor),
                    "value": wire,
                    "isArray": descriptor.is_array,
                },
            })],
            TIMEOUT,
        )
        .await?;

    let reread = client
        .request("scene", "query-node", vec![json!("node-1")], TIMEOUT)
        .await?;
    let (_, comp) = find_component(&reread, component_type)
        .ok_or_else(|| anyhow::anyhow!("component lost after write"))?;
    let observed = property_dump(comp, property)
        .map(unwrap_dump)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("property lost after write"))?;

    anyhow::ensure!(
        values_match(&kind, &wire, &observed),
        "written {wire} but observed {observed}"
    );
    Ok(observed)
}

#[tokio::test]
async fn string_write_round_trips() -> anyhow::Result<()> {
    let node = Arc::new(Mutex::new(initial_node_dump()));
    let addr = spawn_stateful_bridge(node).await;
    let client = connect(&addr).await;

    let observed =
        set_and_verify(&client, "cc.Label", "string", json!("updated"), None, None).await?;
    assert_eq!(observed, json!("updated"));
    Ok(())
}

#[tokio::test]
async fn hex_color_lands_as_rgba_object() -> anyhow::Result<()> {
    let node = Arc::new(Mutex::new(initial_node_dump()));
    let addr = spawn_stateful_bridge(node).await;
    let client = connect(&addr).await;

    let observed =
        set_and_verify(&client, "cc.Label", "color", json!("#ff8000"), None, None).await?;
    assert_eq!(observed, json!({ "r": 255, "g": 128, "b": 0, "a": 255 }));
    Ok(())
}

#[tokio::test]
async fn enum_name_resolves_to_index() -> anyhow::Result<()> {
    let node = Arc::new(Mutex::new(initial_node_dump()));
    let addr = spawn_stateful_bridge(node).await;
    let client = connect(&addr).await;

    let observed = set_and_verify(
        &client,
        "cc.Label",
        "horizontalAlign",
        json!("CENTER"),
        None,
        None,
    )
    .await?;
    assert_eq!(observed, json!(1));
    Ok(())
}

#[tokio::test]
async fn size_write_accepts_array_input() -> anyhow::Result<()> {
    let node = Arc::new(Mutex::new(initial_node_dump()));
    let addr = spawn_stateful_bridge(node).await;
    let client = connect(&addr).await;

    let observed = set_and_verify(
        &client,
        "cc.UITransform",
        "contentSize",
        json!([320, 200]),
        None,
        None,
    )
    .await?;
    assert_eq!(observed, json!({ "width": 320.0, "height": 200.0 }));
    Ok(())
}

#[tokio::test]
async fn asset_ref_records_caller_supplied_type() -> anyhow::Result<()> {
    let node = Arc::new(Mutex::new(initial_node_dump()));
    let addr = spawn_stateful_bridge(node).await;
    let client = connect(&addr).await;

    let observed = set_and_verify(
        &client,
        "cc.Label",
        "font",
        json!("font-uuid-1"),
        None,
        Some("cc.TTFFont"),
    )
    .await?;
    assert_eq!(observed, json!({ "uuid": "font-uuid-1", "type": "cc.TTFFont" }));
    Ok(())
}

#[tokio::test]
async fn declared_kind_overrides_unknown_metadata() -> anyhow::Result<()> {
    let node = Arc::new(Mutex::new(initial_node_dump()));
    let addr = spawn_stateful_bridge(node).await;
    let client = connect(&addr).await;

    // fontSize dumps as Number; writing it as an integer keeps it numeric
    let observed = set_and_verify(
        &client,
        "cc.Label",
        "fontSize",
        json!("32"),
        Some("integer"),
        None,
    )
    .await?;
    assert_eq!(observed, json!(32));
    Ok(())
}
