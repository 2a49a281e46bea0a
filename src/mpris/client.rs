use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use zbus::Connection;

use super::dispatcher::{self, OwnerMap, SharedRegistry, SignalDispatcher};
use super::registry::PlayerRegistry;
use super::{MprisError, PlayerDiscovery, PlayerInfo, ServiceName};

/// Capacity of the notification channel handed to
/// [`MprisClient::start_listening`]. Deliberately small: a slow consumer
/// backpressures the dispatcher instead of growing memory without bound.
pub const UPDATE_CHANNEL_CAPACITY: usize = 10;

/// Configuration for the MPRIS client.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Bus-name substring patterns skipped during discovery and dispatch
    pub ignored_players: Vec<String>,
}

impl Config {
    /// Whether a bus name matches any ignored pattern.
    pub fn is_ignored(&self, bus_name: &str) -> bool {
        self.ignored_players
            .iter()
            .any(|pattern| bus_name.contains(pattern))
    }
}

/// Live, queryable view of the MPRIS players on the session bus.
///
/// Constructor-created and explicitly owned: multiple independent clients
/// can coexist, each with its own registry. Discovery seeds the registry
/// once; [`start_listening`](Self::start_listening) then keeps it
/// consistent from bus signals until [`stop`](Self::stop).
pub struct MprisClient {
    connection: Connection,
    registry: SharedRegistry,
    owners: OwnerMap,
    discovery: PlayerDiscovery,
    config: Config,
    shutdown_tx: Option<watch::Sender<bool>>,
    dispatcher_handle: Option<JoinHandle<()>>,
}

impl MprisClient {
    /// Connect to the session bus.
    ///
    /// # Errors
    /// Returns [`MprisError::Connection`] if the bus is unreachable. This
    /// is fatal at startup and not retried.
    #[instrument(skip(config))]
    pub async fn connect(config: Config) -> Result<Self, MprisError> {
        let connection = Connection::session().await.map_err(MprisError::Connection)?;
        let discovery = PlayerDiscovery::new(connection.clone());

        Ok(Self {
            connection,
            registry: Arc::new(RwLock::new(PlayerRegistry::new())),
            owners: Arc::new(RwLock::new(HashMap::new())),
            discovery,
            config,
            shutdown_tx: None,
            dispatcher_handle: None,
        })
    }

    /// Seed the registry with the players currently connected to the bus.
    ///
    /// Per-player resolution failures are logged and skipped; a player
    /// that disappears between enumeration and resolution must not abort
    /// the rest of the seeding pass.
    ///
    /// # Errors
    /// Returns [`MprisError::NoPlayersFound`] when no player services are
    /// connected (reportable; the caller may keep listening) and
    /// [`MprisError::Connection`] if the bus cannot be queried at all.
    #[instrument(skip(self))]
    pub async fn discover_players(&self) -> Result<Vec<ServiceName>, MprisError> {
        let names = self.discovery.list_players().await?;

        for service in &names {
            if self.config.is_ignored(service.as_str()) {
                debug!(service = %service, "ignoring player per configuration");
                continue;
            }

            match self.discovery.get_player_info(service).await {
                Ok(player_info) => {
                    match self.discovery.name_owner(service).await {
                        Ok(owner) => {
                            let mut owners = self.owners.write().await;
                            owners.insert(owner, service.clone());
                        }
                        Err(e) => warn!(service = %service, "failed to resolve name owner: {e}"),
                    }

                    let mut registry = self.registry.write().await;
                    registry.insert(player_info);
                }
                Err(e) => warn!(service = %service, "skipping player: {e}"),
            }
        }

        info!("seeded registry with {} player(s)", self.registry.read().await.len());
        Ok(names)
    }

    /// Subscribe to the two signal classes and start the dispatch loop.
    ///
    /// Updated [`PlayerInfo`] snapshots are delivered on `updates_tx` in
    /// the order signals were processed. Subscription happens before the
    /// loop is spawned, so a registration failure surfaces here and the
    /// dispatcher never starts.
    ///
    /// # Errors
    /// Returns [`MprisError::Subscription`] if either signal match cannot
    /// be registered or a dispatcher is already running.
    pub async fn start_listening(
        &mut self,
        updates_tx: mpsc::Sender<PlayerInfo>,
    ) -> Result<(), MprisError> {
        if self.dispatcher_handle.is_some() {
            return Err(MprisError::Subscription(
                "dispatcher already listening".to_string(),
            ));
        }

        let (prop_stream, owner_stream) = dispatcher::subscribe(self.connection.clone()).await?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let dispatcher = SignalDispatcher::new(
            self.discovery.clone(),
            Arc::clone(&self.registry),
            Arc::clone(&self.owners),
            self.config.clone(),
            updates_tx,
            shutdown_rx,
        );

        self.shutdown_tx = Some(shutdown_tx);
        self.dispatcher_handle = Some(tokio::spawn(dispatcher.run(prop_stream, owner_stream)));
        Ok(())
    }

    /// Stop the dispatch loop and wait for it to exit.
    ///
    /// Cooperative: an in-flight property query runs to completion before
    /// the loop observes the cancellation. No-op when not listening.
    pub async fn stop(&mut self) {
        let Some(handle) = self.dispatcher_handle.take() else {
            return;
        };

        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(true);
        }

        if handle.await.is_err() {
            warn!("dispatcher task panicked or was aborted");
        }
    }

    /// Whether the dispatch loop is currently running.
    pub fn is_listening(&self) -> bool {
        self.dispatcher_handle.is_some()
    }

    /// Snapshot of all tracked players.
    pub async fn players(&self) -> Vec<PlayerInfo> {
        let registry = self.registry.read().await;
        registry.players().cloned().collect()
    }

    /// Snapshot of one tracked player.
    pub async fn player(&self, service: &ServiceName) -> Option<PlayerInfo> {
        let registry = self.registry.read().await;
        registry.get(service).cloned()
    }

    /// Snapshot of the active player, if one is tracked.
    ///
    /// Best-effort heuristic: the most recently observed player in
    /// `Playing` state. Membership-checked, never a stale reference.
    pub async fn active_player(&self) -> Option<PlayerInfo> {
        let registry = self.registry.read().await;
        registry.active_player().cloned()
    }
}

impl Drop for MprisClient {
    fn drop(&mut self) {
        if let Some(handle) = self.dispatcher_handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignored_patterns_match_substrings() {
        let config = Config {
            ignored_players: vec!["firefox".to_string(), "chromium".to_string()],
        };

        assert!(config.is_ignored("org.mpris.MediaPlayer2.firefox.instance123"));
        assert!(config.is_ignored("org.mpris.MediaPlayer2.chromium"));
        assert!(!config.is_ignored("org.mpris.MediaPlayer2.vlc"));
    }

    #[test]
    fn default_config_ignores_nothing() {
        let config = Config::default();
        assert!(!config.is_ignored("org.mpris.MediaPlayer2.vlc"));
    }
}
