use cocos_mcp_server::config::ServerConfig;
use cocos_mcp_server::mcp::service::McpService;
use cocos_mcp_server::observability;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    observability::init_tracing();

    let config = ServerConfig::load();
    tracing::info!(endpoint = %config.ipc.describe_endpoint(), "starting cocos-mcp-server");

    let svc = McpService::new(config);
    svc.serve_stdio().await
}
