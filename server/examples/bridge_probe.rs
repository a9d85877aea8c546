//! Connect to a running Cocos Creator bridge plugin and print a health
//! round-trip. Endpoint and token come from the usual environment variables
//! (COCOS_IPC_ENDPOINT, COCOS_IPC_TOKEN).
//!
//! Run with: cargo run --example bridge_probe

use cocos_mcp_server::ipc::client::IpcClient;
use cocos_mcp_server::ipc::path::IpcConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cfg = IpcConfig::default();
    let call_budget = cfg.call_timeout;
    println!("connecting to {} ...", cfg.describe_endpoint());

    let client = IpcClient::connect(cfg).await?;
    let welcome = client.welcome();
    println!(
        "connected: editor {} / bridge {} (session {})",
        welcome.editor_version, welcome.server_version, welcome.session_id
    );

    let health = client.health(call_budget).await?;
    println!("health: {health}");
    Ok(())
}
