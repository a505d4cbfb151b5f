//! Device state paths and the event kind each one maps to.

use crate::event::EventKind;

pub const VOLUME: &str = "player:volume";
pub const PHYSICAL_SOURCE: &str = "settings:/kef/play/physicalSource";
pub const SPEAKER_STATUS: &str = "settings:/kef/host/speakerStatus";
pub const MUTE: &str = "settings:/mediaPlayer/mute";
pub const PLAY_TIME: &str = "player:player/data/playTime";
pub const PLAYER_DATA: &str = kef_api::PLAYER_DATA_PATH;
pub const PLAY_MODE: &str = "settings:/mediaPlayer/playMode";
pub const EQ_PROFILE: &str = "kef:eqProfile/v2";
pub const PLAY_QUEUE: &str = "playlists:pq/getitems";
pub const BLUETOOTH: &str = "bluetooth:state";
pub const NETWORK: &str = "network:info";
pub const FIRMWARE: &str = "firmwareupdate:updateStatus";
pub const NOTIFICATIONS: &str = "notifications:/display/queue";

pub(crate) const PATH_TABLE: &[(&str, EventKind)] = &[
    (VOLUME, EventKind::Volume),
    (PHYSICAL_SOURCE, EventKind::Source),
    (SPEAKER_STATUS, EventKind::Power),
    (MUTE, EventKind::Mute),
    (PLAY_TIME, EventKind::PlayTime),
    (PLAYER_DATA, EventKind::PlayerData),
    (PLAY_MODE, EventKind::PlayMode),
    (EQ_PROFILE, EventKind::EqProfile),
    (PLAY_QUEUE, EventKind::Playlist),
    (BLUETOOTH, EventKind::Bluetooth),
    (NETWORK, EventKind::Network),
    (FIRMWARE, EventKind::Firmware),
    (NOTIFICATIONS, EventKind::Notification),
];

/// The event kind for an exact path match
pub fn lookup(path: &str) -> Option<EventKind> {
    PATH_TABLE
        .iter()
        .find(|(known, _)| *known == path)
        .map(|(_, kind)| *kind)
}
