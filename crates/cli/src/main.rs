use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orchestrator::{AvatarViewer, ViewerConfig};
use presence::{AvatarSessionProvider, PresenceClient};
use transport::{RoomOptions, RoomTransport};

mod sim;

const DEFAULT_AVATAR_ID: &str = "b9be11b8-89fb-4227-8f86-4a881393cbdb";
const DEFAULT_AVATAR_IDENTITY: &str = "avatar-agent";
const DEFAULT_AVATAR_NAME: &str = "Avatar";

#[derive(Parser)]
#[command(name = "presence-viewer")]
#[command(about = "Viewer for a remotely generated avatar in a media room", long_about = None)]
#[command(version)]
struct Cli {
    /// Avatar to provision a session for
    #[arg(long, env = "AVATAR_ID", default_value = DEFAULT_AVATAR_ID)]
    avatar_id: String,

    /// Media room the avatar joins
    #[arg(long, env = "ROOM_URL", default_value = "wss://room.localhost")]
    room_url: String,

    /// Credential granting the avatar access to the room
    #[arg(long, env = "ROOM_TOKEN", default_value = "dev-token")]
    room_token: String,

    /// Presence service base URL; omit to run against the built-in simulator
    #[arg(long, env = "PRESENCE_URL")]
    presence_url: Option<String>,

    /// API key for the presence service
    #[arg(long, env = "PRESENCE_API_KEY")]
    presence_api_key: Option<String>,

    /// Room identity the avatar participant joins under
    #[arg(long, default_value = DEFAULT_AVATAR_IDENTITY)]
    avatar_identity: String,

    /// Display name for the avatar participant
    #[arg(long, default_value = DEFAULT_AVATAR_NAME)]
    avatar_name: String,

    /// Request audio playback right after connecting
    #[arg(long)]
    start_audio: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let provider: Arc<dyn AvatarSessionProvider> = match &cli.presence_url {
        Some(url) => {
            tracing::info!(presence_url = %url, "using presence service");
            match &cli.presence_api_key {
                Some(key) => Arc::new(PresenceClient::new(url.as_str()).with_api_key(key.as_str())),
                None => Arc::new(PresenceClient::new(url.as_str())),
            }
        }
        None => {
            tracing::info!("no presence URL configured, using built-in simulator");
            Arc::new(sim::SimProvider::new())
        }
    };

    let transport: Arc<dyn RoomTransport> =
        Arc::new(sim::SimRoomTransport::new(&cli.avatar_identity));

    let mut config = ViewerConfig::new(&cli.avatar_id, &cli.room_url, &cli.room_token);
    config.room_options = RoomOptions {
        auto_subscribe: true,
        identity: Some(cli.avatar_identity.clone()),
        name: Some(cli.avatar_name.clone()),
    };

    let viewer = AvatarViewer::new(config, provider, transport);

    // Stream every orchestration event to stdout as JSON lines
    let mut rx = viewer.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(envelope) = rx.recv().await {
            match serde_json::to_string(&envelope) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!(error = %e, "failed to serialize event"),
            }
        }
    });

    viewer.connect().await.context("initial connect failed")?;

    if cli.start_audio {
        if let Err(e) = viewer.start_audio().await {
            tracing::warn!(error = %e, "start audio failed");
        }
    }

    println!();
    println!("Viewing avatar {} in {}", cli.avatar_id, cli.room_url);
    println!("Press Ctrl+C to leave");
    println!();

    tokio::signal::ctrl_c().await?;

    viewer.disconnect().await?;
    printer.abort();

    let snapshot = viewer.snapshot().await;
    tracing::info!(
        phase = snapshot.connection.phase.as_str(),
        events = viewer.events().event_count(),
        "viewer stopped"
    );

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "presence_viewer=info,orchestrator=info,presence=info".into()),
        )
        .init();
}
