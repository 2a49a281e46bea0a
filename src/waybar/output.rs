use serde::Serialize;

use crate::mpris::{PlaybackStatus, PlayerInfo};

/// One waybar status object, serialized as a single JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaybarOutput {
    /// Bar text: "artist - title"
    pub text: String,

    /// Hover tooltip: title, artist and album on separate lines
    pub tooltip: String,

    /// CSS class derived from the playback status
    pub class: String,

    /// Alternate text, omitted from the JSON when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl WaybarOutput {
    /// Format one player snapshot for waybar.
    pub fn from_player(player: &PlayerInfo) -> Self {
        let artists = player.metadata.artist.join(", ");

        Self {
            text: format!("{} - {}", artists, player.metadata.title),
            tooltip: format!(
                "{}\nby {}\nfrom {}",
                player.metadata.title, artists, player.metadata.album
            ),
            class: class_for(&player.status.playback_status).to_string(),
            alt: None,
        }
    }

    /// Serialize as one line of waybar JSON.
    ///
    /// # Errors
    /// Returns a `serde_json` error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&PlayerInfo> for WaybarOutput {
    fn from(player: &PlayerInfo) -> Self {
        Self::from_player(player)
    }
}

fn class_for(status: &PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Playing => "playing",
        PlaybackStatus::Paused => "paused",
        PlaybackStatus::Stopped => "stopped",
        PlaybackStatus::Other(_) => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpris::{PlayerStatus, ServiceName, TrackMetadata};

    fn player(status: PlaybackStatus) -> PlayerInfo {
        PlayerInfo {
            service_name: ServiceName::from_bus_name("org.mpris.MediaPlayer2.vlc"),
            identity: "VLC media player".to_string(),
            desktop_entry: "vlc".to_string(),
            metadata: TrackMetadata {
                title: "Midnight City".to_string(),
                artist: vec!["M83".to_string()],
                album: "Hurry Up, We're Dreaming".to_string(),
                ..TrackMetadata::default()
            },
            status: PlayerStatus {
                playback_status: status,
                ..PlayerStatus::default()
            },
        }
    }

    #[test]
    fn formats_text_and_tooltip() {
        let output = WaybarOutput::from_player(&player(PlaybackStatus::Playing));

        assert_eq!(output.text, "M83 - Midnight City");
        assert_eq!(
            output.tooltip,
            "Midnight City\nby M83\nfrom Hurry Up, We're Dreaming"
        );
        assert_eq!(output.class, "playing");
    }

    #[test]
    fn joins_multiple_artists() {
        let mut info = player(PlaybackStatus::Paused);
        info.metadata.artist = vec!["Charles Bradley".to_string(), "Menahan Street Band".to_string()];

        let output = WaybarOutput::from_player(&info);
        assert_eq!(
            output.text,
            "Charles Bradley, Menahan Street Band - Midnight City"
        );
        assert_eq!(output.class, "paused");
    }

    #[test]
    fn unrecognized_status_maps_to_unknown_class() {
        let output =
            WaybarOutput::from_player(&player(PlaybackStatus::Other("Buffering".to_string())));
        assert_eq!(output.class, "unknown");
    }

    #[test]
    fn json_omits_absent_alt() {
        let output = WaybarOutput::from_player(&player(PlaybackStatus::Stopped));
        let json = output.to_json().unwrap();

        assert!(json.contains("\"class\":\"stopped\""));
        assert!(!json.contains("\"alt\""));
    }

    #[test]
    fn json_includes_alt_when_set() {
        let mut output = WaybarOutput::from_player(&player(PlaybackStatus::Playing));
        output.alt = Some("playing".to_string());

        let json = output.to_json().unwrap();
        assert!(json.contains("\"alt\":\"playing\""));
    }
}
