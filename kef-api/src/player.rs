//! Player snapshot model (`player:player/data`)
//!
//! The speaker reports the now-playing state as a nested JSON object. Only
//! the parts the event stream needs are modelled; unknown fields are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;

/// Wire tag used when player data arrives wrapped as a typed value
pub const PLAYER_DATA_TAG: &str = "playerData";

/// Snapshot of the media player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    /// Playback state such as `playing`, `paused` or `stopped`
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub status: Option<PlayerStatus>,
    #[serde(default)]
    pub track_roles: Option<TrackRoles>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatus {
    /// Track duration in milliseconds
    #[serde(default)]
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRoles {
    #[serde(default)]
    pub title: Option<String>,
    /// Cover art URL
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub media_data: Option<MediaData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaData {
    #[serde(default)]
    pub meta_data: Option<MetaData>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub active_resource: Option<Resource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaData {
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub duration: Option<i64>,
}

impl PlayerSnapshot {
    /// Parse a snapshot from any of the shapes the speaker uses for player data:
    /// a bare object, a `{"type": "playerData", "playerData": {...}}` typed value,
    /// or a one-element array holding either.
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let object = match value {
            Value::Array(items) => match items.as_slice() {
                [item] => item,
                other => return Err(DecodeError::NotSingleElement(other.len())),
            },
            other => other,
        };

        let inner = match object.get("type").and_then(Value::as_str) {
            Some(PLAYER_DATA_TAG) => object
                .get(PLAYER_DATA_TAG)
                .filter(|v| !v.is_null())
                .ok_or_else(|| DecodeError::MissingField(PLAYER_DATA_TAG.to_string()))?,
            Some(other) => return Err(DecodeError::UnsupportedType(other.to_string())),
            None => object,
        };

        if !inner.is_object() {
            return Err(DecodeError::NotAnObject);
        }

        serde_json::from_value(inner.clone())
            .map_err(|e| DecodeError::invalid(PLAYER_DATA_TAG, e.to_string()))
    }

    pub fn title(&self) -> &str {
        self.track_roles
            .as_ref()
            .and_then(|t| t.title.as_deref())
            .unwrap_or_default()
    }

    pub fn artist(&self) -> &str {
        self.meta_data()
            .and_then(|m| m.artist.as_deref())
            .unwrap_or_default()
    }

    pub fn album(&self) -> &str {
        self.meta_data()
            .and_then(|m| m.album.as_deref())
            .unwrap_or_default()
    }

    pub fn icon_url(&self) -> &str {
        self.track_roles
            .as_ref()
            .and_then(|t| t.icon.as_deref())
            .unwrap_or_default()
    }

    /// Track duration in milliseconds.
    ///
    /// Taken from the player status first, then the first media resource,
    /// then the active resource. Missing or non-positive values fall through
    /// to the next source; 0 when none has one.
    pub fn duration_ms(&self) -> i64 {
        let media = self.media_data();

        let candidates = [
            self.status.as_ref().and_then(|s| s.duration),
            media.and_then(|m| m.resources.first()).and_then(|r| r.duration),
            media.and_then(|m| m.active_resource.as_ref()).and_then(|r| r.duration),
        ];

        candidates
            .into_iter()
            .flatten()
            .find(|d| *d > 0)
            .unwrap_or(0)
    }

    fn media_data(&self) -> Option<&MediaData> {
        self.track_roles.as_ref().and_then(|t| t.media_data.as_ref())
    }

    fn meta_data(&self) -> Option<&MetaData> {
        self.media_data().and_then(|m| m.meta_data.as_ref())
    }
}
