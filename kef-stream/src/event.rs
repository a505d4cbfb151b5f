//! Event types for the kef-stream crate.

use chrono::{DateTime, Utc};
use kef_api::{BluetoothState, EqProfile, PhysicalSource, PlayerSnapshot, SpeakerStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::RowChange;

/// A typed device event, as delivered on the event channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KefEvent {
    /// Device path the event originated from
    pub source_path: String,
    /// When the event was produced on this side of the wire
    pub timestamp: DateTime<Utc>,
    pub data: EventData,
}

impl KefEvent {
    pub fn new(source_path: impl Into<String>, data: EventData) -> Self {
        Self {
            source_path: source_path.into(),
            timestamp: Utc::now(),
            data,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.data.kind()
    }
}

/// Payload of a [`KefEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventData {
    Volume(i32),
    Source(PhysicalSource),
    Power(SpeakerStatus),
    Mute(bool),
    /// Playback position in milliseconds, -1 when the speaker did not say
    PlayTime(i64),
    PlayerData(PlayerData),
    PlayMode(String),
    EqProfile(EqProfile),
    Playlist(PlaylistUpdate),
    Bluetooth(BluetoothState),
    Network(Option<Value>),
    Firmware(Option<Value>),
    Notification(Option<Value>),
    /// A path with no mapping, or a payload that did not decode
    Unknown(String),
}

impl EventData {
    pub fn kind(&self) -> EventKind {
        match self {
            EventData::Volume(_) => EventKind::Volume,
            EventData::Source(_) => EventKind::Source,
            EventData::Power(_) => EventKind::Power,
            EventData::Mute(_) => EventKind::Mute,
            EventData::PlayTime(_) => EventKind::PlayTime,
            EventData::PlayerData(_) => EventKind::PlayerData,
            EventData::PlayMode(_) => EventKind::PlayMode,
            EventData::EqProfile(_) => EventKind::EqProfile,
            EventData::Playlist(_) => EventKind::Playlist,
            EventData::Bluetooth(_) => EventKind::Bluetooth,
            EventData::Network(_) => EventKind::Network,
            EventData::Firmware(_) => EventKind::Firmware,
            EventData::Notification(_) => EventKind::Notification,
            EventData::Unknown(_) => EventKind::Unknown,
        }
    }
}

/// Discriminant of [`EventData`]
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    Volume,
    Source,
    Power,
    Mute,
    PlayTime,
    PlayerData,
    PlayMode,
    EqProfile,
    Playlist,
    Bluetooth,
    Network,
    Firmware,
    Notification,
    Unknown,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Volume => "volume",
            EventKind::Source => "source",
            EventKind::Power => "power",
            EventKind::Mute => "mute",
            EventKind::PlayTime => "play_time",
            EventKind::PlayerData => "player_data",
            EventKind::PlayMode => "play_mode",
            EventKind::EqProfile => "eq_profile",
            EventKind::Playlist => "playlist",
            EventKind::Bluetooth => "bluetooth",
            EventKind::Network => "network",
            EventKind::Firmware => "firmware",
            EventKind::Notification => "notification",
            EventKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Now-playing information distilled from a player snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerData {
    pub state: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration_ms: i64,
    pub icon_url: String,
}

impl From<&PlayerSnapshot> for PlayerData {
    fn from(snapshot: &PlayerSnapshot) -> Self {
        Self {
            state: snapshot.state.clone(),
            title: snapshot.title().to_string(),
            artist: snapshot.artist().to_string(),
            album: snapshot.album().to_string(),
            duration_ms: snapshot.duration_ms(),
            icon_url: snapshot.icon_url().to_string(),
        }
    }
}

/// Index-level changes to the play queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistUpdate {
    pub changes: Vec<RowChange>,
    pub version: i64,
    pub old_version: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_matches_data() {
        let event = KefEvent::new("player:volume", EventData::Volume(42));
        assert_eq!(event.kind(), EventKind::Volume);
        assert_eq!(event.source_path, "player:volume");

        let event = KefEvent::new("foo:bar", EventData::Unknown("foo:bar".to_string()));
        assert_eq!(event.kind(), EventKind::Unknown);
        assert_eq!(event.kind().to_string(), "unknown");
    }

    #[test]
    fn test_player_data_from_snapshot() {
        let snapshot = PlayerSnapshot::from_value(&json!({
            "state": "playing",
            "trackRoles": {
                "title": "Roygbiv",
                "icon": "http://art/1.jpg",
                "mediaData": {
                    "metaData": {"artist": "Boards of Canada", "album": "Music Has the Right to Children"},
                    "resources": [{"duration": 151000}]
                }
            }
        }))
        .unwrap();

        let data = PlayerData::from(&snapshot);
        assert_eq!(data.state, "playing");
        assert_eq!(data.title, "Roygbiv");
        assert_eq!(data.artist, "Boards of Canada");
        assert_eq!(data.album, "Music Has the Right to Children");
        assert_eq!(data.duration_ms, 151000);
        assert_eq!(data.icon_url, "http://art/1.jpg");
    }
}
