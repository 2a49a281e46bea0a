use tracing::instrument;
use zbus::{Connection, fdo, names::BusName, names::InterfaceName};

use super::decode::{self, PropertyBag};
use super::types::{MPRIS_OBJECT_PATH, PLAYER_INTERFACE, ROOT_INTERFACE, is_player_bus_name};
use super::{MprisError, PlayerInfo, ServiceName};

/// Enumerates player services on the bus and resolves their full state via
/// on-demand property queries.
#[derive(Clone)]
pub struct PlayerDiscovery {
    connection: Connection,
}

impl PlayerDiscovery {
    /// Create a discovery handler over an established bus connection.
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// List currently-connected services matching the player namespace.
    ///
    /// # Errors
    /// Returns [`MprisError::Connection`] if the bus cannot be queried and
    /// [`MprisError::NoPlayersFound`] if no player services are connected;
    /// the latter is reportable, not necessarily fatal to the caller.
    #[instrument(skip(self))]
    pub async fn list_players(&self) -> Result<Vec<ServiceName>, MprisError> {
        let dbus_proxy = fdo::DBusProxy::new(&self.connection)
            .await
            .map_err(MprisError::Connection)?;

        let names = dbus_proxy
            .list_names()
            .await
            .map_err(|e| MprisError::Connection(e.into()))?;

        let players = filter_player_names(names.iter().map(|name| name.as_str()));
        if players.is_empty() {
            return Err(MprisError::NoPlayersFound);
        }

        Ok(players)
    }

    /// Resolve the full state of one player service.
    ///
    /// Issues two `GetAll` round trips (playback interface, then root
    /// interface) and runs both bags through the decoder. The service may
    /// have just disappeared from the bus; that surfaces as a
    /// [`MprisError::PropertyQuery`] soft failure.
    ///
    /// # Errors
    /// Returns [`MprisError::PropertyQuery`] if the service cannot be
    /// reached and [`MprisError::Decode`] on a wire type mismatch.
    #[instrument(skip(self), fields(service = %service))]
    pub async fn get_player_info(&self, service: &ServiceName) -> Result<PlayerInfo, MprisError> {
        let player_props = self.get_all(service, PLAYER_INTERFACE).await?;
        let status = decode::player_status(&player_props)?;
        let metadata = decode::track_metadata(&player_props)?;

        let root_props = self.get_all(service, ROOT_INTERFACE).await?;
        let (identity, desktop_entry) = decode::identity_fields(&root_props)?;
        let identity = if identity.is_empty() {
            service.as_str().to_string()
        } else {
            identity
        };

        Ok(PlayerInfo {
            service_name: service.clone(),
            identity,
            desktop_entry,
            metadata,
            status,
        })
    }

    /// Resolve the unique connection name currently owning a well-known
    /// service name. The dispatcher needs this mapping to attribute
    /// property-change signals, whose sender field carries the unique
    /// name.
    ///
    /// # Errors
    /// Returns [`MprisError::PropertyQuery`] if the owner cannot be
    /// resolved (the service may already be gone).
    pub async fn name_owner(&self, service: &ServiceName) -> Result<String, MprisError> {
        let dbus_proxy = fdo::DBusProxy::new(&self.connection)
            .await
            .map_err(|e| query_error(service, e))?;

        let bus_name =
            BusName::try_from(service.as_str()).map_err(|e| query_error(service, e.into()))?;

        let owner = dbus_proxy
            .get_name_owner(bus_name)
            .await
            .map_err(|e| query_error(service, e.into()))?;

        Ok(owner.to_string())
    }

    async fn get_all(
        &self,
        service: &ServiceName,
        interface: &'static str,
    ) -> Result<PropertyBag, MprisError> {
        let proxy = fdo::PropertiesProxy::builder(&self.connection)
            .destination(service.as_str().to_string())
            .map_err(|e| query_error(service, e))?
            .path(MPRIS_OBJECT_PATH)
            .map_err(|e| query_error(service, e))?
            .build()
            .await
            .map_err(|e| query_error(service, e))?;

        let interface =
            InterfaceName::try_from(interface).map_err(|e| query_error(service, e.into()))?;

        proxy
            .get_all(interface)
            .await
            .map_err(|e| query_error(service, e.into()))
    }
}

fn query_error(service: &ServiceName, source: zbus::Error) -> MprisError {
    MprisError::PropertyQuery {
        service: service.clone(),
        source,
    }
}

fn filter_player_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<ServiceName> {
    names
        .filter(|name| is_player_bus_name(name))
        .map(ServiceName::from_bus_name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_keeps_only_player_namespace() {
        let names = [
            "org.mpris.MediaPlayer2.vlc",
            "org.freedesktop.Notifications",
        ];

        let players = filter_player_names(names.into_iter());
        assert_eq!(
            players,
            vec![ServiceName::from_bus_name("org.mpris.MediaPlayer2.vlc")]
        );
    }

    #[test]
    fn filter_yields_empty_for_no_players() {
        let names = ["org.freedesktop.DBus", ":1.42"];
        assert!(filter_player_names(names.into_iter()).is_empty());
    }
}
