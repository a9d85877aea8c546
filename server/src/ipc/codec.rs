use bytes::Bytes;
use thiserror::Error;

use super::protocol::Envelope;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),
}

pub fn encode_envelope(env: &Envelope) -> Result<Bytes, CodecError> {
    let buf = serde_json::to_vec(env).map_err(CodecError::Encode)?;
    Ok(Bytes::from(buf))
}

pub fn decode_envelope(b: Bytes) -> Result<Envelope, CodecError> {
    serde_json::from_slice(&b).map_err(CodecError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::protocol::{Body, EditorRequest, Envelope};
    use serde_json::json;

    #[test]
    fn encode_decode_roundtrip() {
        let original = Envelope::request(
            "test-123".to_string(),
            EditorRequest {
                namespace: "asset-db".into(),
                command: "query-assets".into(),
                args: vec![json!({"pattern": "db://assets/**/*.scene"})],
            },
        );

        let encoded = encode_envelope(&original).expect("encoding should succeed");
        let decoded = decode_envelope(encoded).expect("decoding should succeed");

        assert_eq!(original.correlation_id, decoded.correlation_id);
        match decoded.body {
            Body::Request(req) => {
                assert_eq!(req.namespace, "asset-db");
                assert_eq!(req.command, "query-assets");
                assert_eq!(req.args.len(), 1);
            }
            other => panic!("expected request, got {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_envelope(Bytes::from_static(b"not json"));
        assert!(matches!(err, Err(CodecError::Decode(_))));
    }
}
