use std::sync::Arc;

use async_trait::async_trait;
use remote_callbacks::Error;
use remote_callbacks::Item;
use remote_callbacks::ItemListener;
use remote_callbacks::ItemManager;
use remote_callbacks::ItemService;
use remote_callbacks::LocalTransport;
use remote_callbacks::NotifyConfig;
use remote_callbacks::Result;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tracing::error;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

/// Subscriber hosted in the demo's simulated client process.
struct LoggingListener;

#[async_trait]
impl ItemListener for LoggingListener {
    async fn on_new_item(
        &self,
        item: &Item,
    ) {
        info!(%item, "receive new item");
    }
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    init_observability();

    let settings = NotifyConfig::new()?.validate()?;
    info!(?settings, "configuration loaded");

    let service = ItemService::new(settings);
    service.on_start()?;

    // Client side: query, add, subscribe
    let transport = LocalTransport::new();
    let client = transport.publish(Arc::new(LoggingListener));
    let items = service.get_items().await;
    info!(?items, "query item list");
    service.add_item(Item::new(3, "Book3")).await?;
    let items = service.get_items().await;
    info!(?items, "query item list");
    service.register_listener(client.marshal()).await?;

    info!("Application started. Waiting for CTRL+C signal...");
    if let Err(e) = wait_for_shutdown_signal().await {
        error!("Failed to listen for shutdown signal: {:?}", e);
    }

    if client.is_alive() {
        service.unregister_listener(client.marshal()).await?;
    }
    service.shutdown().await?;

    info!("Exiting program.");
    Ok(())
}

async fn wait_for_shutdown_signal() -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt()).map_err(|e| Error::Fatal(e.to_string()))?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(|e| Error::Fatal(e.to_string()))?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }
    Ok(())
}

fn init_observability() {
    let base_subscriber = tracing_subscriber::fmt::layer().with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );
    tracing_subscriber::registry().with(base_subscriber).init();
}
