use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net,
    sync::{broadcast, mpsc, oneshot, Mutex},
    time,
};

use super::{
    codec, framing,
    path::{default_endpoint, parse_endpoint, Endpoint, IpcConfig},
    protocol::{
        Body, BroadcastEvent, EditorRequest, EditorResponse, Envelope, Hello, Welcome, IPC_VERSION,
    },
};

// Trait for stream types that can be used with IPC
trait IpcStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> IpcStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

#[derive(Debug, Error)]
pub enum IpcError {
    #[error("connect timeout")]
    ConnectTimeout,
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("codec: {0}")]
    Codec(#[from] super::codec::CodecError),
    #[error("request timeout")]
    RequestTimeout,
    #[error("editor error: {0}")]
    Editor(String),
    #[error("closed")]
    Closed,
}

#[derive(Clone)]
pub struct IpcClient {
    inner: Arc<Inner>,
}

struct Inner {
    corr: AtomicU64,
    pending: Mutex<HashMap<String, oneshot::Sender<EditorResponse>>>,
    events_tx: broadcast::Sender<BroadcastEvent>,
    // Write side: outgoing frames are serialized through one mpsc channel
    tx: mpsc::Sender<Bytes>,
    welcome: Welcome,
}

impl IpcClient {
    pub async fn connect(cfg: IpcConfig) -> Result<Self, IpcError> {
        let endpoint = cfg
            .endpoint
            .as_deref()
            .map(parse_endpoint)
            .unwrap_or_else(default_endpoint);

        // 1) connect
        let io = connect_endpoint(&endpoint, cfg.connect_timeout).await?;
        let mut framed = framing::into_framed(io);

        // 2) handshake: hello out, welcome (or reject) back
        let hello = Envelope::control(Body::Hello(Hello {
            ipc_version: IPC_VERSION,
            token: cfg.token.clone(),
            client_name: "cocos-mcp-server".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
        }));
        framed
            .send(codec::encode_envelope(&hello)?)
            .await
            .map_err(IpcError::Io)?;

        let welcome = time::timeout(cfg.handshake_timeout, async {
            while let Some(frame) = framed.next().await {
                let bytes = frame.map_err(IpcError::Io)?;
                let env = codec::decode_envelope(bytes.freeze())?;
                match env.body {
                    Body::Welcome(w) => return Ok::<_, IpcError>(w),
                    Body::Reject(r) => {
                        return Err(IpcError::Handshake(format!("{:?}: {}", r.code, r.message)))
                    }
                    _ => continue,
                }
            }
            Err(IpcError::Handshake("no welcome".into()))
        })
        .await
        .map_err(|_| IpcError::ConnectTimeout)??;

        if welcome.ipc_version != IPC_VERSION {
            return Err(IpcError::Handshake(format!(
                "bridge speaks ipc version {}, expected {}",
                welcome.ipc_version, IPC_VERSION
            )));
        }

        // 3) shared state, then reader/writer tasks
        let (writer_tx, mut writer_rx) = mpsc::channel::<Bytes>(1024);
        let (events_tx, _events_rx) = broadcast::channel(1024);

        let inner = Arc::new(Inner {
            corr: AtomicU64::new(rand::random()),
            pending: Mutex::new(HashMap::new()),
            events_tx,
            tx: writer_tx,
            welcome,
        });

        let (mut writer, mut reader) = framed.split();
        let writer_task = tokio::spawn(async move {
            while let Some(bytes) = writer_rx.recv().await {
                if writer.send(bytes).await.is_err() {
                    break;
                }
            }
        });

        let reader_inner = inner.clone();
        tokio::spawn(async move {
            while let Some(frame) = reader.next().await {
                let Ok(bytes) = frame else {
                    break;
                };
                let Ok(env) = codec::decode_envelope(bytes.freeze()) else {
                    continue;
                };
                match env.body {
                    Body::Response(resp) => {
                        let mut pending = reader_inner.pending.lock().await;
                        if let Some(tx) = pending.remove(&env.correlation_id) {
                            let _ = tx.send(resp);
                        }
                    }
                    Body::Event(ev) => {
                        let _ = reader_inner.events_tx.send(ev);
                    }
                    _ => {}
                }
            }
            // Connection is gone: stop the writer so `is_alive` flips to
            // false, and drop pending senders so waiters resolve with
            // `Closed` instead of running out their timeout.
            writer_task.abort();
            reader_inner.pending.lock().await.clear();
            tracing::debug!("bridge connection closed");
        });

        Ok(Self { inner })
    }

    pub fn events(&self) -> broadcast::Receiver<BroadcastEvent> {
        self.inner.events_tx.subscribe()
    }

    /// Handshake response from the bridge (editor/plugin versions, session id).
    pub fn welcome(&self) -> &Welcome {
        &self.inner.welcome
    }

    /// False once the writer task has shut down.
    pub fn is_alive(&self) -> bool {
        !self.inner.tx.is_closed()
    }

    fn next_cid(&self) -> String {
        format!("{:016x}", self.inner.corr.fetch_add(1, Ordering::Relaxed))
    }

    /// Forward one `Editor.Message.request(namespace, command, ...args)` call
    /// through the bridge and return its resolved value.
    pub async fn request(
        &self,
        namespace: &str,
        command: &str,
        args: Vec<Value>,
        timeout: Duration,
    ) -> Result<Value, IpcError> {
        let cid = self.next_cid();
        let env = Envelope::request(
            cid.clone(),
            EditorRequest {
                namespace: namespace.to_string(),
                command: command.to_string(),
                args,
            },
        );
        let bytes = codec::encode_envelope(&env)?;

        let (tx, rx) = oneshot::channel();
        self.inner.pending.lock().await.insert(cid.clone(), tx);
        if self.inner.tx.send(bytes).await.is_err() {
            self.inner.pending.lock().await.remove(&cid);
            return Err(IpcError::Closed);
        }

        let resp = match time::timeout(timeout, rx).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(_canceled)) => return Err(IpcError::Closed),
            Err(_elapsed) => {
                self.inner.pending.lock().await.remove(&cid);
                return Err(IpcError::RequestTimeout);
            }
        };

        if resp.ok {
            Ok(resp.data)
        } else {
            Err(IpcError::Editor(
                resp.error.unwrap_or_else(|| "unknown editor error".into()),
            ))
        }
    }

    /// Bridge liveness probe.
    pub async fn health(&self, timeout: Duration) -> Result<Value, IpcError> {
        self.request("bridge", "health", vec![], timeout).await
    }

    /// Ask the bridge to start forwarding broadcasts on `channel`.
    pub async fn listen(&self, channel: &str, timeout: Duration) -> Result<(), IpcError> {
        self.request("bridge", "listen", vec![Value::String(channel.into())], timeout)
            .await
            .map(|_| ())
    }

    /// Stop forwarding broadcasts on `channel`.
    pub async fn unlisten(&self, channel: &str, timeout: Duration) -> Result<(), IpcError> {
        self.request(
            "bridge",
            "unlisten",
            vec![Value::String(channel.into())],
            timeout,
        )
        .await
        .map(|_| ())
    }
}

async fn connect_endpoint(
    endpoint: &Endpoint,
    timeout: Duration,
) -> Result<Box<dyn IpcStream>, IpcError> {
    use tokio::time::timeout as tokio_timeout;
    match endpoint {
        #[cfg(unix)]
        Endpoint::Unix(path) => {
            let fut = net::UnixStream::connect(path);
            let stream = tokio_timeout(timeout, fut)
                .await
                .map_err(|_| IpcError::ConnectTimeout)??;
            Ok(Box::new(stream))
        }
        #[cfg(windows)]
        Endpoint::Pipe(name) => {
            use tokio::net::windows::named_pipe::ClientOptions;
            // Pipe opens are synchronous; the connect timeout does not apply.
            let stream = ClientOptions::new().open(name)?;
            Ok(Box::new(stream))
        }
        Endpoint::Tcp(addr) => {
            let fut = net::TcpStream::connect(addr);
            let stream = tokio_timeout(timeout, fut)
                .await
                .map_err(|_| IpcError::ConnectTimeout)??;
            Ok(Box::new(stream))
        }
    }
}
