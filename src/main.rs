#![recursion_limit = "256"]
//! # Main Entry Point
//!
//! Wires the layers together:
//! - Domain: Configuration, Types, Traits
//! - Infrastructure: Matrix, GitBook, Reddit, Command registry
//! - Application: Resolver, Feed poller, Auto threads, Command tables, Router
//! - Interface: Native command handlers
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::events::room::{
        member::{MembershipState, StrippedRoomMemberEvent},
        message::{MessageType, Relation, SyncRoomMessageEvent},
    },
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

use crate::application::auto_thread::{AutoThreader, ThreadRegistry};
use crate::application::cache::ResolutionCache;
use crate::application::docs::DocsService;
use crate::application::dynamic_commands::DynamicCommands;
use crate::application::feed::{FeedPoller, PollerSettings};
use crate::application::registry_commands::RegistryCommands;
use crate::application::resolver::ReferenceResolver;
use crate::application::router::CommandRouter;
use crate::application::state::JsonStateStore;
use crate::domain::clock::SystemClock;
use crate::domain::config::{AppConfig, DocsConfig, FeedConfig};
use crate::domain::paths;
use crate::domain::traits::{CommandResolver, ConfigStore};
use crate::domain::types::InboundMessage;
use crate::infrastructure::gitbook::GitBookClient;
use crate::infrastructure::matrix::MatrixService;
use crate::infrastructure::reddit::RedditClient;
use crate::infrastructure::registry::RegistryClient;
use crate::interface::commands::NativeCommands;
use crate::strings::logs;

#[derive(Parser, Debug)]
#[command(name = "ninjabot", about = "Community support bot for Matrix")]
struct Args {
    /// Path to the YAML configuration
    #[arg(long, short, default_value_os_t = paths::default_config_path())]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load Configuration
    let config = AppConfig::load(&args.config)?;
    let data_dir = config.system.data_dir.clone();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir))?;

    // 2. Logging Setup
    let file_appender = tracing_appender::rolling::daily(&data_dir, paths::LOG_FILE);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn,reqwest=warn",
        )
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!("Starting NinjaBot...");
    tracing::info!("{}", logs::config_loaded(&config.services.matrix.username));

    // 3. Application Components
    let store: Arc<dyn ConfigStore> =
        Arc::new(JsonStateStore::load(paths::state_path(&data_dir)).await);
    let dynamic = Arc::new(DynamicCommands::load(paths::dynamic_commands_path(&data_dir)).await?);
    let registry = Arc::new(match &config.services.registry {
        Some(registry) => RegistryCommands::fetch(&RegistryClient::new(&registry.url)).await,
        None => RegistryCommands::default(),
    });
    let docs = config.services.docs.as_ref().and_then(build_docs);
    let threads = Arc::new(ThreadRegistry::new(store.clone()));

    let native = Arc::new(NativeCommands::new(
        dynamic.clone(),
        registry.clone(),
        docs,
        threads.clone(),
        config.commands.moderators.clone(),
    ));

    // 4. Matrix Setup
    let client = Client::builder()
        .homeserver_url(&config.services.matrix.homeserver)
        .build()
        .await?;

    client
        .matrix_auth()
        .login_username(
            &config.services.matrix.username,
            &config.services.matrix.password,
        )
        .initial_device_display_name(
            config
                .services
                .matrix
                .display_name
                .as_deref()
                .unwrap_or("NinjaBot"),
        )
        .send()
        .await?;

    let own_user_id = client
        .user_id()
        .map(|id| id.to_string())
        .context("Logged in without a user id")?;
    tracing::info!("Logged in as {}", own_user_id);

    // Initial sync: populates joined rooms and skips the backlog
    let response = client
        .sync_once(SyncSettings::default())
        .await
        .context("Initial sync failed")?;

    let threader = Arc::new(AutoThreader::new(
        &config.commands,
        own_user_id.clone(),
        threads,
    ));
    let router = Arc::new(CommandRouter::new(
        &config.commands,
        own_user_id,
        vec![
            dynamic.clone() as Arc<dyn CommandResolver>,
            registry.clone() as Arc<dyn CommandResolver>,
        ],
        native,
    ));

    // 5. Event Handlers
    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let router = router.clone();
        let threader = threader.clone();
        async move {
            let Some(original) = ev.as_original() else {
                return;
            };
            let MessageType::Text(text) = &original.content.msgtype else {
                return;
            };
            tracing::debug!("Received message from {}: {}", original.sender, text.body);

            let thread_root = match &original.content.relates_to {
                Some(Relation::Thread(thread)) => Some(thread.event_id.to_string()),
                _ => None,
            };
            let message = InboundMessage {
                event_id: original.event_id.to_string(),
                sender: original.sender.to_string(),
                channel: room.room_id().to_string(),
                body: text.body.clone(),
                thread_root,
            };

            if threader.should_open(&message) {
                let opened = async {
                    let thread = MatrixService::in_thread(room, &message.event_id)?;
                    threader.open(&message, &thread).await
                }
                .await;
                if let Err(e) = opened {
                    tracing::error!("Failed to open thread for {}: {:#}", message.event_id, e);
                }
                return;
            }

            let chat = match message.thread_root.as_deref() {
                Some(root) => match MatrixService::in_thread(room, root) {
                    Ok(chat) => chat,
                    Err(e) => {
                        tracing::warn!("Ignoring message in unreadable thread: {:#}", e);
                        return;
                    }
                },
                None => MatrixService::new(room),
            };
            let outcome = router.route(&chat, &message).await;
            tracing::debug!("Dispatch outcome: {:?}", outcome);
        }
    });

    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite {
            tracing::info!("Joining room {} on invite", room.room_id());
            if let Err(e) = room.join().await {
                tracing::error!("Failed to join room {}: {}", room.room_id(), e);
            }
        }
    });

    // 6. Feed Poller
    let (ready_tx, ready_rx) = watch::channel(false);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poller_handle = match config.services.feed.as_ref() {
        Some(feed) => match build_poller(feed, &client, store.clone()) {
            Ok(poller) => Some(tokio::spawn(poller.run(ready_rx, shutdown_rx))),
            Err(e) => {
                tracing::error!("Feed poller disabled: {:#}", e);
                None
            }
        },
        None => None,
    };

    // 7. Sync Loop
    let sync_client = client.clone();
    let sync_handle = tokio::spawn(async move {
        tracing::info!("{}", logs::SYNC_LOOP_START);
        let settings = SyncSettings::default().token(response.next_batch);
        if let Err(e) = sync_client.sync(settings).await {
            tracing::error!("{}", logs::sync_loop_fail(&e.to_string()));
        }
    });

    let _ = ready_tx.send(true);

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                tracing::error!("{}", logs::shutdown_fail(&e.to_string()));
            }
        }
        res = sync_handle => {
            if let Err(e) = res {
                tracing::error!("Matrix Sync Panic: {}", e);
            }
        }
    }

    tracing::info!("{}", logs::SHUTDOWN);
    let _ = shutdown_tx.send(true);
    if let Some(handle) = poller_handle
        && let Err(e) = handle.await
    {
        tracing::error!("Feed poller panicked: {}", e);
    }

    Ok(())
}

fn build_docs(config: &DocsConfig) -> Option<Arc<DocsService>> {
    let Some(api_key) = config.resolve_api_key() else {
        tracing::warn!("No GitBook API key configured, docs commands disabled");
        return None;
    };
    let api = Arc::new(GitBookClient::new(config, api_key));
    let cache = ResolutionCache::new(
        chrono::Duration::days(config.cache_ttl_days),
        Arc::new(SystemClock),
    );
    let resolver = Arc::new(ReferenceResolver::new(
        api.clone(),
        config.public_url.clone(),
        cache,
    ));
    Some(Arc::new(DocsService::new(
        api,
        resolver,
        config.public_url.clone(),
    )))
}

fn build_poller(
    config: &FeedConfig,
    client: &Client,
    store: Arc<dyn ConfigStore>,
) -> Result<FeedPoller> {
    let client_id = config
        .client_id
        .clone()
        .context("services.feed.client_id is not set")?;
    let client_secret = config
        .resolve_client_secret()
        .context("services.feed client secret is not set")?;
    let source = Arc::new(RedditClient::new(config, client_id, client_secret));
    let sink = Arc::new(MatrixService::for_room(client, &config.channel)?);
    Ok(FeedPoller::new(
        source,
        sink,
        store,
        PollerSettings::from(config),
    ))
}
