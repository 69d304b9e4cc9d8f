use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cadence_persist::{ConversationStore, HttpConversationStore, MemoryConversationStore};
use cadence_session::{drive_view, SessionBuilder, SessionConfig};
use cadence_stream::{GenerationClient, HttpGenerationClient};

mod commands;
mod config;
mod repl;
mod terminal;

use crate::config::{Config, StoreConfig, StoreKind};
use crate::repl::Repl;
use crate::terminal::TerminalView;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Cadence");
    tracing::info!("Generation service: {}", config.backend.base_url);

    let generation: Arc<dyn GenerationClient> = Arc::new(HttpGenerationClient::with_connect_timeout(
        config.backend.base_url.clone(),
        config.backend.connect_timeout(),
    )?);
    let store = build_store(&config.store)?;

    let (handle, controller) = SessionBuilder::new()
        .generation(generation)
        .store(store.clone())
        .config(SessionConfig::from(&config.session))
        .spawn()?;

    let updates = handle.subscribe();
    let view = tokio::spawn(async move {
        let mut view = TerminalView::new(std::io::stdout());
        drive_view(updates, &mut view).await;
    });

    print_welcome(&config);
    Repl::new(handle.clone(), store).run().await?;

    handle.shutdown().await.ok();
    if let Err(e) = controller.await {
        tracing::warn!("Session controller ended abnormally: {}", e);
    }
    view.await.ok();

    Ok(())
}

fn build_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn ConversationStore>> {
    let store: Arc<dyn ConversationStore> = match config.kind {
        StoreKind::Http => {
            tracing::info!("Conversation store: {}", config.base_url);
            Arc::new(HttpConversationStore::new(&config.base_url)?)
        }
        StoreKind::Memory => {
            tracing::info!("Conversation store: in-memory");
            Arc::new(MemoryConversationStore::new())
        }
    };
    Ok(store)
}

fn print_welcome(config: &Config) {
    println!("Cadence chat");
    println!("Service: {}", config.backend.base_url);
    println!("Type a message to chat, /help for commands, /quit to exit.");
}

/// Logs go to stderr so streamed replies on stdout stay readable
fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}
