use std::{collections::HashSet, sync::Arc, time::Duration};

use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRouter},
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use tokio::sync::{broadcast, Mutex};

use crate::config::ServerConfig;
use crate::ipc::client::IpcClient;
use crate::mcp::log::MessageLog;
use crate::mcp::tools;

#[derive(Clone)]
pub struct McpService {
    tool_router: ToolRouter<Self>,
    state: Arc<ServiceState>,
}

pub struct ServiceState {
    pub config: ServerConfig,
    pub ipc: Mutex<Option<IpcClient>>,
    pub bridge: Mutex<BridgeState>,
    pub listened: Mutex<HashSet<String>>,
    pub messages: MessageLog,
}

#[derive(Debug, Clone, Default)]
pub struct BridgeState {
    pub connected: bool,
    pub attempt: u32,
    pub last_error: Option<String>,
    pub endpoint: String,
}

impl McpService {
    pub fn new(config: ServerConfig) -> Self {
        let endpoint = config.ipc.describe_endpoint();
        Self {
            tool_router: tools::make_tool_router(),
            state: Arc::new(ServiceState {
                config,
                ipc: Mutex::new(None),
                bridge: Mutex::new(BridgeState {
                    endpoint,
                    ..Default::default()
                }),
                listened: Mutex::new(HashSet::new()),
                messages: MessageLog::new(),
            }),
        }
    }

    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        let service = self.serve(stdio()).await?;
        service.waiting().await?;
        Ok(())
    }

    pub(crate) fn state(&self) -> &ServiceState {
        &self.state
    }

    pub(crate) async fn get_bridge_state(&self) -> BridgeState {
        self.state.bridge.lock().await.clone()
    }

    /// Per-call timeout: explicit override or the configured default.
    pub(crate) fn call_timeout(&self, secs: Option<u64>) -> Duration {
        secs.map(Duration::from_secs)
            .unwrap_or_else(|| self.state.config.tool_timeout())
    }

    /// Connect lazily on first use. A dead client is replaced; failures are
    /// recorded so `bridge_status` can report them without a live connection.
    pub(crate) async fn require_ipc(&self) -> Result<IpcClient, McpError> {
        let mut guard = self.state.ipc.lock().await;
        if let Some(client) = guard.as_ref() {
            if client.is_alive() {
                return Ok(client.clone());
            }
        }

        {
            let mut bridge = self.state.bridge.lock().await;
            bridge.attempt += 1;
            bridge.connected = false;
        }

        match IpcClient::connect(self.state.config.ipc.clone()).await {
            Ok(client) => {
                {
                    let mut bridge = self.state.bridge.lock().await;
                    bridge.connected = true;
                    bridge.last_error = None;
                }
                self.spawn_event_pump(&client);
                *guard = Some(client.clone());
                tracing::info!("connected to editor bridge");
                Ok(client)
            }
            Err(e) => {
                let mut bridge = self.state.bridge.lock().await;
                bridge.last_error = Some(e.to_string());
                Err(McpError::internal_error(
                    format!("editor bridge unavailable at {}: {e}", bridge.endpoint),
                    None,
                ))
            }
        }
    }

    fn spawn_event_pump(&self, client: &IpcClient) {
        let mut rx = client.events();
        let state = self.state.clone();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => state.messages.push(ev.channel, ev.args).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "broadcast receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}

impl ServerHandler for McpService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "cocos-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Tools for driving a running Cocos Creator editor session: scenes, nodes, \
                 components and their properties, assets, console logs, broadcast messages, \
                 preferences and scene-view reference images."
                    .to_string(),
            ),
        }
    }

    // list_tools is written by hand instead of #[tool_handler] so every input
    // schema goes through the combinator-flattening pass before clients see it.
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let mut tools = self.tool_router.list_all();
        for tool in &mut tools {
            let mut schema = tool.input_schema.as_ref().clone();
            crate::schema::flatten_schema(&mut schema);
            tool.input_schema = Arc::new(schema);
        }
        Ok(ListToolsResult {
            next_cursor: None,
            tools,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let context = ToolCallContext::new(self, request, context);
        self.tool_router.call(context).await
    }
}
