//! Wire types for the bridge-plugin channel.
//!
//! Every frame is one JSON envelope. Requests mirror the editor's message bus
//! 1:1: a `(namespace, command, args)` triple that the bridge forwards to
//! `Editor.Message.request` and answers with the resolved value or the
//! rejection reason. Events are broadcast pushes the bridge was asked to
//! forward (`listen`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const IPC_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default)]
    pub correlation_id: String,
    #[serde(flatten)]
    pub body: Body,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "payload", rename_all = "camelCase")]
pub enum Body {
    Hello(Hello),
    Welcome(Welcome),
    Reject(Reject),
    Request(EditorRequest),
    Response(EditorResponse),
    Event(BroadcastEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hello {
    pub ipc_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub client_name: String,
    pub client_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Welcome {
    pub ipc_version: u32,
    pub server_version: String,
    pub editor_version: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reject {
    pub code: RejectCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RejectCode {
    Unauthenticated,
    VersionMismatch,
    Internal,
}

/// One `Editor.Message.request(namespace, command, ...args)` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditorRequest {
    pub namespace: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditorResponse {
    pub ok: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A broadcast the bridge captured on a channel the server subscribed to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastEvent {
    pub channel: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl Envelope {
    pub fn request(correlation_id: String, req: EditorRequest) -> Self {
        Self {
            correlation_id,
            body: Body::Request(req),
        }
    }

    pub fn response(correlation_id: String, resp: EditorResponse) -> Self {
        Self {
            correlation_id,
            body: Body::Response(resp),
        }
    }

    pub fn control(body: Body) -> Self {
        Self {
            correlation_id: String::new(),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_envelope_wire_shape() {
        let env = Envelope::request(
            "0000000000000001".into(),
            EditorRequest {
                namespace: "scene".into(),
                command: "set-property".into(),
                args: vec![json!({"uuid": "n1"})],
            },
        );
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["correlationId"], "0000000000000001");
        assert_eq!(v["kind"], "request");
        assert_eq!(v["payload"]["namespace"], "scene");
        assert_eq!(v["payload"]["command"], "set-property");
        assert_eq!(v["payload"]["args"][0]["uuid"], "n1");
    }

    #[test]
    fn response_defaults_data_to_null() {
        let raw = json!({
            "correlationId": "abc",
            "kind": "response",
            "payload": { "ok": true }
        });
        let env: Envelope = serde_json::from_value(raw).unwrap();
        match env.body {
            Body::Response(resp) => {
                assert!(resp.ok);
                assert!(resp.data.is_null());
                assert!(resp.error.is_none());
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn reject_code_uses_kebab_case() {
        let reject = Reject {
            code: RejectCode::VersionMismatch,
            message: "ipc version 2 unsupported".into(),
        };
        let v = serde_json::to_value(&reject).unwrap();
        assert_eq!(v["code"], "version-mismatch");
    }
}
