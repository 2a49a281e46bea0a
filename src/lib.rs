//! mprisd - Live MPRIS media player monitoring for waybar.
//!
//! Maintains a queryable view of all MPRIS players on the D-Bus session
//! bus and streams normalized state-change snapshots to consumers.
//! Discovery seeds the registry once at startup; afterwards everything is
//! driven by bus signals, with no polling:
//!
//! - property-change notifications trigger a full re-resolution of the
//!   emitting player's state
//! - name-ownership changes add and remove players as they connect and
//!   disconnect
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mprisd::mpris::{Config, MprisClient, UPDATE_CHANNEL_CAPACITY};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = MprisClient::connect(Config::default()).await?;
//!     if let Err(e) = client.discover_players().await {
//!         eprintln!("discovery: {e}");
//!     }
//!
//!     let (updates_tx, mut updates_rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
//!     client.start_listening(updates_tx).await?;
//!
//!     while let Some(player) = updates_rx.recv().await {
//!         println!(
//!             "{} - {}",
//!             player.metadata.artist.join(", "),
//!             player.metadata.title
//!         );
//!     }
//!
//!     client.stop().await;
//!     Ok(())
//! }
//! ```

/// MPRIS player-state synchronization engine.
pub mod mpris;

/// Tracing subscriber initialization.
pub mod tracing_config;

/// Waybar output formatting.
pub mod waybar;

pub use mpris::{
    Config, MprisClient, MprisError, PlaybackStatus, PlayerInfo, PlayerStatus, ServiceName,
    TrackMetadata,
};
