//! Subscription set and session identifier types.

use serde::{Deserialize, Serialize};

use crate::paths;

/// How the speaker should report changes for a subscribed path.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubscriptionKind {
    /// Report the new value inline with each change
    ItemWithValue,
    /// Report only that the item changed
    Item,
    /// Report index-level changes of an ordered collection
    Rows,
}

/// A device state path to watch.
///
/// Serialises to the `{"path": ..., "type": ...}` shape the registration
/// call expects.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: SubscriptionKind,
}

impl Subscription {
    pub fn new(path: impl Into<String>, kind: SubscriptionKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn item_with_value(path: impl Into<String>) -> Self {
        Self::new(path, SubscriptionKind::ItemWithValue)
    }

    pub fn item(path: impl Into<String>) -> Self {
        Self::new(path, SubscriptionKind::Item)
    }

    pub fn rows(path: impl Into<String>) -> Self {
        Self::new(path, SubscriptionKind::Rows)
    }

    /// Every path the event translator recognises, each with the kind the
    /// speaker expects for it.
    pub fn defaults() -> Vec<Subscription> {
        vec![
            Self::item_with_value(paths::VOLUME),
            Self::item_with_value(paths::PHYSICAL_SOURCE),
            Self::item_with_value(paths::SPEAKER_STATUS),
            Self::item_with_value(paths::MUTE),
            Self::item_with_value(paths::PLAY_TIME),
            // Player data is fetched on change rather than pushed inline
            Self::item(paths::PLAYER_DATA),
            Self::item_with_value(paths::PLAY_MODE),
            Self::item_with_value(paths::EQ_PROFILE),
            Self::rows(paths::PLAY_QUEUE),
            Self::item_with_value(paths::BLUETOOTH),
            Self::item_with_value(paths::NETWORK),
            Self::item_with_value(paths::FIRMWARE),
            Self::item_with_value(paths::NOTIFICATIONS),
        ]
    }
}

/// Opaque session (queue) identifier assigned by the speaker at registration.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subscription_wire_shape() {
        let subs = vec![
            Subscription::item_with_value("player:volume"),
            Subscription::item("player:player/data"),
            Subscription::rows("playlists:pq/getitems"),
        ];

        assert_eq!(
            serde_json::to_value(&subs).unwrap(),
            json!([
                {"path": "player:volume", "type": "itemWithValue"},
                {"path": "player:player/data", "type": "item"},
                {"path": "playlists:pq/getitems", "type": "rows"},
            ])
        );
    }

    #[test]
    fn test_defaults_cover_known_paths_once() {
        let defaults = Subscription::defaults();
        let mut seen = std::collections::HashSet::new();
        for sub in &defaults {
            assert!(seen.insert(sub.path.clone()), "duplicate {}", sub.path);
            assert!(paths::lookup(&sub.path).is_some(), "unrecognised {}", sub.path);
        }
        assert_eq!(defaults.len(), paths::PATH_TABLE.len());
    }

    #[test]
    fn test_session_id() {
        let id = SessionId::from("{a1b2}");
        assert_eq!(id.as_str(), "{a1b2}");
        assert_eq!(id.to_string(), "{a1b2}");
        assert_eq!(SessionId::new(String::from("{a1b2}")), id);
    }
}
