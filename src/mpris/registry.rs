use std::collections::HashMap;

use super::{PlayerInfo, ServiceName};

/// In-memory mapping from bus service name to last-known player state,
/// plus the identity of the most recently observed playing player.
///
/// Plain owned state with no interior locking; the client layer shares it
/// behind a lock so read queries may run while the dispatcher mutates.
/// The active pointer is a last-writer-wins heuristic, not a verified
/// single source of truth.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<ServiceName, PlayerInfo>,
    active: Option<ServiceName>,
}

impl PlayerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a player's entry wholesale.
    ///
    /// There is no field-level diffing; the snapshot passed in becomes the
    /// entry. A player observed in `Playing` state claims the active
    /// pointer.
    pub fn insert(&mut self, info: PlayerInfo) {
        if info.status.playback_status.is_playing() {
            self.active = Some(info.service_name.clone());
        }
        self.players.insert(info.service_name.clone(), info);
    }

    /// Remove a player's entry. Idempotent: removing an absent entry is a
    /// no-op returning `None`. A matching active pointer is cleared.
    pub fn remove(&mut self, service: &ServiceName) -> Option<PlayerInfo> {
        if self.active.as_ref() == Some(service) {
            self.active = None;
        }
        self.players.remove(service)
    }

    /// Last-known state of one player.
    pub fn get(&self, service: &ServiceName) -> Option<&PlayerInfo> {
        self.players.get(service)
    }

    /// Whether the service is currently tracked.
    pub fn contains(&self, service: &ServiceName) -> bool {
        self.players.contains_key(service)
    }

    /// All tracked players, in no particular order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerInfo> {
        self.players.values()
    }

    /// Tracked service names, in no particular order.
    pub fn service_names(&self) -> impl Iterator<Item = &ServiceName> {
        self.players.keys()
    }

    /// Number of tracked players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether no players are tracked.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// The active player, membership-checked: a pointer to a service no
    /// longer tracked yields `None` rather than a stale entry.
    pub fn active_player(&self) -> Option<&PlayerInfo> {
        self.active.as_ref().and_then(|service| self.players.get(service))
    }

    /// Service name the active pointer currently holds, if any.
    pub fn active_service(&self) -> Option<&ServiceName> {
        self.active.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpris::{PlaybackStatus, PlayerStatus, TrackMetadata};

    fn info(service: &str, status: PlaybackStatus, title: &str) -> PlayerInfo {
        PlayerInfo {
            service_name: ServiceName::from_bus_name(service),
            identity: "Test Player".to_string(),
            desktop_entry: String::new(),
            metadata: TrackMetadata {
                title: title.to_string(),
                ..TrackMetadata::default()
            },
            status: PlayerStatus {
                playback_status: status,
                ..PlayerStatus::default()
            },
        }
    }

    const VLC: &str = "org.mpris.MediaPlayer2.vlc";
    const SPOTIFY: &str = "org.mpris.MediaPlayer2.spotify";

    #[test]
    fn insert_replaces_wholesale() {
        let mut registry = PlayerRegistry::new();
        registry.insert(info(VLC, PlaybackStatus::Paused, "First"));
        registry.insert(info(VLC, PlaybackStatus::Paused, "Second"));

        assert_eq!(registry.len(), 1);
        let entry = registry.get(&ServiceName::from_bus_name(VLC)).unwrap();
        assert_eq!(entry.metadata.title, "Second");
    }

    #[test]
    fn playing_player_claims_active_pointer() {
        let mut registry = PlayerRegistry::new();
        registry.insert(info(VLC, PlaybackStatus::Paused, "A"));
        registry.insert(info(SPOTIFY, PlaybackStatus::Playing, "B"));

        assert_eq!(
            registry.active_service(),
            Some(&ServiceName::from_bus_name(SPOTIFY))
        );

        // The other player transitions to Playing; active moves, the
        // spotify entry stays untouched.
        registry.insert(info(VLC, PlaybackStatus::Playing, "A"));
        assert_eq!(
            registry.active_service(),
            Some(&ServiceName::from_bus_name(VLC))
        );
        let other = registry.get(&ServiceName::from_bus_name(SPOTIFY)).unwrap();
        assert_eq!(other.metadata.title, "B");
        assert_eq!(other.status.playback_status, PlaybackStatus::Playing);
    }

    #[test]
    fn paused_update_does_not_steal_active() {
        let mut registry = PlayerRegistry::new();
        registry.insert(info(SPOTIFY, PlaybackStatus::Playing, "B"));
        registry.insert(info(VLC, PlaybackStatus::Paused, "A"));

        assert_eq!(
            registry.active_service(),
            Some(&ServiceName::from_bus_name(SPOTIFY))
        );
    }

    #[test]
    fn removal_is_idempotent() {
        let mut registry = PlayerRegistry::new();
        registry.insert(info(VLC, PlaybackStatus::Playing, "A"));

        let vlc = ServiceName::from_bus_name(VLC);
        assert!(registry.remove(&vlc).is_some());
        assert!(registry.remove(&vlc).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn removal_clears_matching_active_pointer() {
        let mut registry = PlayerRegistry::new();
        registry.insert(info(VLC, PlaybackStatus::Playing, "A"));
        registry.insert(info(SPOTIFY, PlaybackStatus::Paused, "B"));

        registry.remove(&ServiceName::from_bus_name(VLC));
        assert!(registry.active_player().is_none());
        assert!(registry.contains(&ServiceName::from_bus_name(SPOTIFY)));
    }

    #[test]
    fn active_accessor_is_membership_checked() {
        let mut registry = PlayerRegistry::new();
        registry.insert(info(VLC, PlaybackStatus::Playing, "A"));

        let active = registry.active_player().unwrap();
        assert_eq!(active.service_name.as_str(), VLC);

        registry.remove(&ServiceName::from_bus_name(VLC));
        assert!(registry.active_player().is_none());
    }
}
