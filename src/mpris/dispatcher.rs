use std::collections::HashMap;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::{RwLock, mpsc, watch};
use tracing::{debug, info, warn};
use zbus::{Connection, MatchRule, Message, MessageStream, fdo, message};

use super::client::Config;
use super::discovery::PlayerDiscovery;
use super::registry::PlayerRegistry;
use super::types::MPRIS_OBJECT_PATH;
use super::{MprisError, PlayerInfo, ServiceName, is_player_bus_name};

/// Shared handle to the player registry.
///
/// The dispatcher is the sole writer; read-side queries go through the
/// same lock so they may run concurrently with dispatch.
pub type SharedRegistry = Arc<RwLock<PlayerRegistry>>;

/// Unique connection name to well-known service name, for attributing
/// property-change signals to the player that emitted them.
pub(super) type OwnerMap = Arc<RwLock<HashMap<String, ServiceName>>>;

/// Register the two signal matches the dispatcher consumes: property
/// changes on the MPRIS object path and ownership changes on the whole
/// bus.
///
/// Failure here is fatal to starting the dispatcher and surfaces
/// synchronously to the caller; there are no retries.
pub(super) async fn subscribe(
    connection: Connection,
) -> Result<(MessageStream, impl Stream<Item = fdo::NameOwnerChanged> + Unpin), MprisError> {
    let dbus_proxy = fdo::DBusProxy::new(&connection)
        .await
        .map_err(|e| MprisError::Subscription(format!("D-Bus proxy setup failed: {e}")))?;

    let owner_stream = dbus_proxy
        .receive_name_owner_changed()
        .await
        .map_err(|e| MprisError::Subscription(format!("NameOwnerChanged match failed: {e}")))?;

    let rule = properties_changed_rule()
        .map_err(|e| MprisError::Subscription(format!("PropertiesChanged match rule: {e}")))?;
    let prop_stream = MessageStream::for_match_rule(rule, &connection, None)
        .await
        .map_err(|e| MprisError::Subscription(format!("PropertiesChanged match failed: {e}")))?;

    Ok((prop_stream, owner_stream))
}

fn properties_changed_rule() -> zbus::Result<MatchRule<'static>> {
    Ok(MatchRule::builder()
        .msg_type(message::Type::Signal)
        .interface("org.freedesktop.DBus.Properties")?
        .member("PropertiesChanged")?
        .path(MPRIS_OBJECT_PATH)?
        .build())
}

/// Classified outcome of a name-owner-change signal.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum OwnerChange {
    /// The service left the bus
    Disappeared,
    /// The service appeared or changed hands; the new unique owner name
    Appeared(String),
    /// Not a player-namespace service
    Ignored,
}

pub(super) fn classify_owner_change(name: &str, new_owner: Option<&str>) -> OwnerChange {
    if !is_player_bus_name(name) {
        return OwnerChange::Ignored;
    }

    match new_owner {
        None | Some("") => OwnerChange::Disappeared,
        Some(owner) => OwnerChange::Appeared(owner.to_string()),
    }
}

/// Consumes raw bus signals and keeps the registry consistent.
///
/// Sole mutator of the registry while running. Each property-change
/// signal triggers a full re-resolution of the emitting player rather
/// than a delta merge; one extra round trip buys correctness under
/// out-of-order delivery.
pub(super) struct SignalDispatcher {
    discovery: PlayerDiscovery,
    registry: SharedRegistry,
    owners: OwnerMap,
    config: Config,
    updates_tx: mpsc::Sender<PlayerInfo>,
    shutdown_rx: watch::Receiver<bool>,
}

impl SignalDispatcher {
    pub(super) fn new(
        discovery: PlayerDiscovery,
        registry: SharedRegistry,
        owners: OwnerMap,
        config: Config,
        updates_tx: mpsc::Sender<PlayerInfo>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            discovery,
            registry,
            owners,
            config,
            updates_tx,
            shutdown_rx,
        }
    }

    /// Dispatch loop. Runs until shutdown is signalled or the bus
    /// connection drops its signal streams.
    ///
    /// In-flight property queries are synchronous round trips and are not
    /// interruptible; cancellation is observed between iterations.
    pub(super) async fn run<S>(self, mut prop_stream: MessageStream, mut owner_stream: S)
    where
        S: Stream<Item = fdo::NameOwnerChanged> + Unpin,
    {
        let mut shutdown_rx = self.shutdown_rx.clone();
        info!("signal dispatcher listening");

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    debug!("shutdown requested, dispatcher exiting");
                    break;
                }
                msg = prop_stream.next() => match msg {
                    Some(Ok(msg)) => self.handle_properties_changed(&msg).await,
                    Some(Err(e)) => warn!("failed to read PropertiesChanged signal: {e}"),
                    None => {
                        debug!("PropertiesChanged stream ended");
                        break;
                    }
                },
                signal = owner_stream.next() => match signal {
                    Some(signal) => self.handle_name_owner_changed(&signal).await,
                    None => {
                        debug!("NameOwnerChanged stream ended");
                        break;
                    }
                },
            }
        }

        info!("signal dispatcher stopped");
    }

    /// A player emitted a property change; the payload only carries the
    /// delta, so re-resolve the full state from the emitting service.
    async fn handle_properties_changed(&self, msg: &Message) {
        let header = msg.header();
        let Some(sender) = header.sender() else {
            return;
        };

        let service = {
            let owners = self.owners.read().await;
            owners.get(sender.as_str()).cloned()
        };

        let Some(service) = service else {
            debug!(sender = %sender, "property change from untracked sender, ignoring");
            return;
        };

        self.refresh_player(service).await;
    }

    async fn handle_name_owner_changed(&self, signal: &fdo::NameOwnerChanged) {
        let args = match signal.args() {
            Ok(args) => args,
            Err(e) => {
                warn!("malformed NameOwnerChanged signal: {e}");
                return;
            }
        };

        let name = args.name().as_str();
        let new_owner = args.new_owner().as_deref();

        match classify_owner_change(name, new_owner) {
            OwnerChange::Ignored => {}
            OwnerChange::Disappeared => {
                let service = ServiceName::from_bus_name(name);

                if let Some(old_owner) = args.old_owner().as_deref() {
                    let mut owners = self.owners.write().await;
                    owners.remove(old_owner);
                }

                let removed = {
                    let mut registry = self.registry.write().await;
                    registry.remove(&service)
                };

                if removed.is_some() {
                    info!(service = %service, "player disappeared");
                }
            }
            OwnerChange::Appeared(owner) => {
                let service = ServiceName::from_bus_name(name);
                if self.config.is_ignored(service.as_str()) {
                    debug!(service = %service, "ignoring player per configuration");
                    return;
                }

                info!(service = %service, "player appeared");
                {
                    let mut owners = self.owners.write().await;
                    owners.insert(owner, service.clone());
                }

                self.refresh_player(service).await;
            }
        }
    }

    /// Re-resolve one player's full state, replace its registry entry and
    /// publish the snapshot. Resolution failure is a soft failure: logged,
    /// never fatal to the loop.
    async fn refresh_player(&self, service: ServiceName) {
        let info = match self.discovery.get_player_info(&service).await {
            Ok(info) => info,
            Err(e) => {
                warn!(service = %service, "failed to resolve player state: {e}");
                return;
            }
        };

        {
            let mut registry = self.registry.write().await;
            registry.insert(info.clone());
        }

        // Bounded channel: a slow consumer backpressures the whole loop,
        // a dropped consumer leaves the queryable view running.
        if self.updates_tx.send(info).await.is_err() {
            debug!("updates receiver dropped, state remains queryable");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_change_ignores_foreign_namespaces() {
        assert_eq!(
            classify_owner_change("org.freedesktop.Notifications", Some(":1.9")),
            OwnerChange::Ignored
        );
    }

    #[test]
    fn empty_new_owner_means_disappeared() {
        assert_eq!(
            classify_owner_change("org.mpris.MediaPlayer2.vlc", Some("")),
            OwnerChange::Disappeared
        );
        assert_eq!(
            classify_owner_change("org.mpris.MediaPlayer2.vlc", None),
            OwnerChange::Disappeared
        );
    }

    #[test]
    fn new_owner_means_appeared() {
        assert_eq!(
            classify_owner_change("org.mpris.MediaPlayer2.vlc", Some(":1.52")),
            OwnerChange::Appeared(":1.52".to_string())
        );
    }
}
