use std::fmt;
use std::time::Duration;

/// Well-known namespace prefix for MPRIS player services.
pub const PLAYER_NAMESPACE: &str = "org.mpris.MediaPlayer2.";

/// Object path every MPRIS player exports its interfaces on.
pub const MPRIS_OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";

/// Root MPRIS interface carrying `Identity` and `DesktopEntry`.
pub const ROOT_INTERFACE: &str = "org.mpris.MediaPlayer2";

/// Playback interface carrying status, metadata and capability flags.
pub const PLAYER_INTERFACE: &str = "org.mpris.MediaPlayer2.Player";

/// Whether a bus name belongs to the MPRIS player namespace.
pub fn is_player_bus_name(name: &str) -> bool {
    name.starts_with(PLAYER_NAMESPACE)
}

/// Bus-unique name of a player service, the registry's primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceName(String);

impl ServiceName {
    /// Create a ServiceName from a D-Bus bus name.
    pub fn from_bus_name(bus_name: &str) -> Self {
        Self(bus_name.to_string())
    }

    /// Get the D-Bus bus name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this name matches the player namespace.
    pub fn is_player(&self) -> bool {
        is_player_bus_name(&self.0)
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current playback status of a media player.
///
/// Open enumeration: third-party players may report strings beyond the
/// three the MPRIS spec defines, and those are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// Player is currently playing
    Playing,

    /// Player is paused
    Paused,

    /// Player is stopped
    #[default]
    Stopped,

    /// Unrecognized status string reported by the player
    Other(String),
}

impl PlaybackStatus {
    /// Whether the player reports active playback.
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// The status as the player reported it.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
            Self::Other(status) => status,
        }
    }
}

impl From<&str> for PlaybackStatus {
    fn from(status: &str) -> Self {
        match status {
            "Playing" => Self::Playing,
            "Paused" => Self::Paused,
            "Stopped" => Self::Stopped,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Playback state and capability flags of a player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    /// Current playback status
    pub playback_status: PlaybackStatus,

    /// Current playback position (the bus reports microseconds)
    pub position: Duration,

    /// Playback speed multiplier, 1.0 is normal speed
    pub rate: f64,

    /// Volume level, typically 0.0 to 1.0 but not bounds-checked
    pub volume: f64,

    /// Whether the player accepts control at all
    pub can_control: bool,

    /// Whether playback can be started
    pub can_play: bool,

    /// Whether playback can be paused
    pub can_pause: bool,

    /// Whether the player can skip to the next track
    pub can_go_next: bool,

    /// Whether the player can go back to the previous track
    pub can_go_previous: bool,
}

impl Default for PlayerStatus {
    fn default() -> Self {
        Self {
            playback_status: PlaybackStatus::default(),
            position: Duration::ZERO,
            rate: 1.0,
            volume: 0.0,
            can_control: false,
            can_play: false,
            can_pause: false,
            can_go_next: false,
            can_go_previous: false,
        }
    }
}

/// Metadata for the track a player currently holds.
///
/// Immutable once constructed; a new instance replaces the old on every
/// update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackMetadata {
    /// Opaque bus-assigned track identifier (`mpris:trackid`)
    pub track_id: String,

    /// Track duration (`mpris:length`, microseconds on the wire); zero
    /// when the player does not report one
    pub length: Duration,

    /// URL to album artwork (`mpris:artUrl`), may be empty
    pub art_url: String,

    /// Album name (`xesam:album`)
    pub album: String,

    /// Contributing artists in order (`xesam:artist`), usually one entry
    pub artist: Vec<String>,

    /// Track title (`xesam:title`)
    pub title: String,

    /// Source location of the track (`xesam:url`)
    pub url: String,
}

/// Complete last-known state of one player instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInfo {
    /// Bus service name, the primary key
    pub service_name: ServiceName,

    /// Human-readable player name
    pub identity: String,

    /// Desktop file reference, may be empty
    pub desktop_entry: String,

    /// Current track metadata
    pub metadata: TrackMetadata,

    /// Current playback status and capabilities
    pub status: PlayerStatus,
}
