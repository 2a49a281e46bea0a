use std::collections::HashMap;
use std::time::Duration;

use zbus::zvariant::{Array, OwnedObjectPath, OwnedValue};

use super::{MprisError, PlaybackStatus, PlayerStatus, TrackMetadata};

/// Self-describing property bag as delivered by a `GetAll` call.
pub type PropertyBag = HashMap<String, OwnedValue>;

/// Decode the `org.mpris.MediaPlayer2.Player` property bag into a typed
/// status.
///
/// Absent fields yield defaults; a decode error is raised only for a field
/// that is present with the wrong wire type.
///
/// # Errors
/// Returns [`MprisError::Decode`] naming the offending property.
pub fn player_status(props: &PropertyBag) -> Result<PlayerStatus, MprisError> {
    let playback_status = match props.get("PlaybackStatus") {
        Some(value) => {
            let raw = String::try_from(value.clone())
                .map_err(|_| decode_error("PlaybackStatus", "string"))?;
            PlaybackStatus::from(raw.as_str())
        }
        None => PlaybackStatus::default(),
    };

    Ok(PlayerStatus {
        playback_status,
        position: micros_duration(props, "Position")?,
        rate: float_prop(props, "Rate", 1.0)?,
        volume: float_prop(props, "Volume", 0.0)?,
        can_control: bool_prop(props, "CanControl")?,
        can_play: bool_prop(props, "CanPlay")?,
        can_pause: bool_prop(props, "CanPause")?,
        can_go_next: bool_prop(props, "CanGoNext")?,
        can_go_previous: bool_prop(props, "CanGoPrevious")?,
    })
}

/// Unwrap the nested `Metadata` dict from the player property bag and
/// decode its track-level fields.
///
/// A missing `Metadata` property yields empty metadata, not an error.
///
/// # Errors
/// Returns [`MprisError::Decode`] naming the offending property.
pub fn track_metadata(props: &PropertyBag) -> Result<TrackMetadata, MprisError> {
    let Some(value) = props.get("Metadata") else {
        return Ok(TrackMetadata::default());
    };

    let metadata = PropertyBag::try_from(value.clone())
        .map_err(|_| decode_error("Metadata", "a{sv} dict"))?;

    Ok(TrackMetadata {
        track_id: track_id(&metadata)?,
        length: micros_duration(&metadata, "mpris:length")?,
        art_url: string_prop(&metadata, "mpris:artUrl")?,
        album: string_prop(&metadata, "xesam:album")?,
        artist: artist_list(&metadata)?,
        title: string_prop(&metadata, "xesam:title")?,
        url: string_prop(&metadata, "xesam:url")?,
    })
}

/// Decode `Identity` and `DesktopEntry` from the root interface bag.
///
/// # Errors
/// Returns [`MprisError::Decode`] naming the offending property.
pub fn identity_fields(props: &PropertyBag) -> Result<(String, String), MprisError> {
    Ok((
        string_prop(props, "Identity")?,
        string_prop(props, "DesktopEntry")?,
    ))
}

fn decode_error(property: &str, expected: &'static str) -> MprisError {
    MprisError::Decode {
        property: property.to_string(),
        expected,
    }
}

fn string_prop(props: &PropertyBag, key: &str) -> Result<String, MprisError> {
    match props.get(key) {
        Some(value) => {
            String::try_from(value.clone()).map_err(|_| decode_error(key, "string"))
        }
        None => Ok(String::new()),
    }
}

fn bool_prop(props: &PropertyBag, key: &str) -> Result<bool, MprisError> {
    match props.get(key) {
        Some(value) => bool::try_from(value.clone()).map_err(|_| decode_error(key, "boolean")),
        None => Ok(false),
    }
}

fn float_prop(props: &PropertyBag, key: &str, default: f64) -> Result<f64, MprisError> {
    match props.get(key) {
        Some(value) => f64::try_from(value.clone()).map_err(|_| decode_error(key, "double")),
        None => Ok(default),
    }
}

// Players report microsecond counts as either t (u64) or x (i64);
// negative counts clamp to zero.
fn micros_duration(props: &PropertyBag, key: &str) -> Result<Duration, MprisError> {
    let Some(value) = props.get(key) else {
        return Ok(Duration::ZERO);
    };

    if let Ok(micros) = u64::try_from(value.clone()) {
        return Ok(Duration::from_micros(micros));
    }

    match i64::try_from(value.clone()) {
        Ok(micros) => Ok(Duration::from_micros(micros.max(0) as u64)),
        Err(_) => Err(decode_error(key, "microsecond count")),
    }
}

// Conforming players send an object path here, sloppy ones a plain string.
fn track_id(metadata: &PropertyBag) -> Result<String, MprisError> {
    let Some(value) = metadata.get("mpris:trackid") else {
        return Ok(String::new());
    };

    if let Ok(path) = OwnedObjectPath::try_from(value.clone()) {
        return Ok(path.to_string());
    }

    String::try_from(value.clone()).map_err(|_| decode_error("mpris:trackid", "object path or string"))
}

fn artist_list(metadata: &PropertyBag) -> Result<Vec<String>, MprisError> {
    let Some(value) = metadata.get("xesam:artist") else {
        return Ok(Vec::new());
    };

    if let Ok(array) = <&Array>::try_from(value) {
        let mut artists = Vec::with_capacity(array.len());
        for entry in array.iter() {
            if let Ok(artist) = entry.downcast_ref::<String>() {
                artists.push(artist);
            } else if let Ok(artist) = entry.downcast_ref::<&str>() {
                artists.push(artist.to_string());
            } else {
                return Err(decode_error("xesam:artist", "string array"));
            }
        }
        return Ok(artists);
    }

    // Some players violate the MPRIS spec and send a single string.
    String::try_from(value.clone())
        .map(|artist| vec![artist])
        .map_err(|_| decode_error("xesam:artist", "string array"))
}
