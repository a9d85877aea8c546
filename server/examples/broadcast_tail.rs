//! Subscribe to editor broadcasts and print them for ten seconds.
//!
//! Run with: cargo run --example broadcast_tail -- scene:ready console:logsUpdated

use cocos_mcp_server::ipc::client::IpcClient;
use cocos_mcp_server::ipc::path::IpcConfig;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let channels: Vec<String> = std::env::args().skip(1).collect();
    if channels.is_empty() {
        anyhow::bail!("usage: broadcast_tail <channel> [channel ...]");
    }

    let cfg = IpcConfig::default();
    let call_budget = cfg.call_timeout;
    let client = IpcClient::connect(cfg).await?;
    let mut events = client.events();
    for channel in &channels {
        client.listen(channel, call_budget).await?;
        println!("listening on {channel}");
    }

    let deadline = tokio::time::sleep(Duration::from_secs(10));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            event = events.recv() => match event {
                Ok(event) => {
                    println!("[{}] {}", event.channel, serde_json::Value::Array(event.args));
                }
                Err(_) => break,
            },
        }
    }

    for channel in &channels {
        let _ = client.unlisten(channel, call_budget).await;
    }
    Ok(())
}
