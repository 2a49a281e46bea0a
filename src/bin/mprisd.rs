//! mprisd entry point.
//!
//! Connects to the session bus, seeds the player registry and prints one
//! waybar JSON object per player state change on stdout. Diagnostics go to
//! stderr.

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use mprisd::mpris::{Config, MprisClient, MprisError, UPDATE_CHANNEL_CAPACITY};
use mprisd::waybar::WaybarOutput;

#[derive(Debug, Parser)]
#[command(name = "mprisd", about = "MPRIS media player monitor for waybar")]
struct Cli {
    /// Skip players whose bus name contains this pattern (repeatable)
    #[arg(long = "ignore", value_name = "PATTERN")]
    ignored_players: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    mprisd::tracing_config::init()?;
    let cli = Cli::parse();

    let mut client = MprisClient::connect(Config {
        ignored_players: cli.ignored_players,
    })
    .await?;

    match client.discover_players().await {
        Ok(players) => info!("discovered {} player service(s)", players.len()),
        Err(MprisError::NoPlayersFound) => warn!("no players connected yet, waiting for signals"),
        Err(e) => return Err(e.into()),
    }

    let (updates_tx, mut updates_rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
    client.start_listening(updates_tx).await?;

    loop {
        tokio::select! {
            update = updates_rx.recv() => match update {
                Some(player) => match WaybarOutput::from_player(&player).to_json() {
                    Ok(line) => println!("{line}"),
                    Err(e) => error!("failed to serialize waybar output: {e}"),
                },
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break;
            }
        }
    }

    client.stop().await;
    Ok(())
}
