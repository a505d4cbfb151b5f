//! Translation of raw poll records into typed events
//!
//! Each record is looked up in a static path table. Values are decoded with
//! the typed value codec and checked against the kind the path maps to.
//! Player data changes are deduplicated on `(state, title, artist)` because
//! the speaker reports every progress tick as a change of the same document.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use kef_api::{codec, ApiError, DecodeError, KefClient, PlayerSnapshot, TypedValue};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::event::{EventData, EventKind, KefEvent, PlayerData, PlaylistUpdate};
use crate::paths;
use crate::record::{MalformedRecord, RawRecord};

/// Source of full player snapshots, used when a player data change arrives
/// without its value.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_player_snapshot(&self) -> Result<PlayerSnapshot, ApiError>;
}

#[async_trait]
impl SnapshotSource for KefClient {
    async fn fetch_player_snapshot(&self) -> Result<PlayerSnapshot, ApiError> {
        self.player_snapshot().await
    }
}

/// The last player state that produced an event
///
/// The translator holds this as `Option<DedupState>` starting at `None`, so
/// the first player data change is always emitted, even one whose state,
/// title and artist are all empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupState {
    pub last_player_state: String,
    pub last_track_title: String,
    pub last_track_artist: String,
}

impl DedupState {
    fn matches(&self, data: &PlayerData) -> bool {
        self.last_player_state == data.state
            && self.last_track_title == data.title
            && self.last_track_artist == data.artist
    }
}

/// Turns [`RawRecord`]s into [`KefEvent`]s
pub struct EventTranslator {
    snapshots: Arc<dyn SnapshotSource>,
    dedup: Mutex<Option<DedupState>>,
    deduplicated: AtomicU64,
}

impl EventTranslator {
    pub fn new(snapshots: Arc<dyn SnapshotSource>) -> Self {
        Self {
            snapshots,
            dedup: Mutex::new(None),
            deduplicated: AtomicU64::new(0),
        }
    }

    /// Translate one record.
    ///
    /// Returns `None` when the record is suppressed: a player data change
    /// that repeats the last emitted state, or one whose snapshot could not
    /// be fetched.
    pub async fn translate(&self, raw: RawRecord) -> Option<KefEvent> {
        match raw {
            RawRecord::Rows {
                path,
                version_old,
                version,
                changes,
            } => {
                let update = PlaylistUpdate {
                    changes,
                    version,
                    old_version: version_old,
                };
                match path {
                    // Rows records without a path belong to the play queue
                    None => Some(KefEvent::new(paths::PLAY_QUEUE, EventData::Playlist(update))),
                    Some(path) if paths::lookup(&path) == Some(EventKind::Playlist) => {
                        Some(KefEvent::new(path, EventData::Playlist(update)))
                    }
                    Some(path) => Some(unknown(path)),
                }
            }
            RawRecord::Value { path, value, .. } => match paths::lookup(&path) {
                None => {
                    debug!(path = %path, "No mapping for path");
                    Some(unknown(path))
                }
                Some(EventKind::PlayerData) => self.player_data(path, value).await,
                Some(kind) => match decode_event(kind, value) {
                    Ok(data) => Some(KefEvent::new(path, data)),
                    Err(e) => {
                        debug!(path = %path, kind = %kind, error = %e, "Failed to decode value");
                        Some(unknown(path))
                    }
                },
            },
        }
    }

    /// Translate a poll element that could not be classified.
    ///
    /// Elements that still carry a path become `Unknown` events, the rest
    /// are dropped.
    pub fn translate_malformed(&self, record: MalformedRecord) -> Option<KefEvent> {
        match record.path {
            Some(path) => {
                debug!(path = %path, reason = %record.reason, "Malformed record");
                Some(unknown(path))
            }
            None => {
                warn!(reason = %record.reason, "Dropping malformed record without a path");
                None
            }
        }
    }

    /// Forget the last player state so the next player data change is emitted
    pub fn reset_dedup(&self) {
        *self.dedup.lock() = None;
    }

    /// The last player state that produced an event, if any
    pub fn dedup_state(&self) -> Option<DedupState> {
        self.dedup.lock().clone()
    }

    /// Number of player data changes suppressed as duplicates
    pub fn deduplicated(&self) -> u64 {
        self.deduplicated.load(Ordering::Relaxed)
    }

    async fn player_data(&self, path: String, value: Option<Value>) -> Option<KefEvent> {
        let inline = value.as_ref().map(PlayerSnapshot::from_value);

        let snapshot = match inline {
            Some(Ok(snapshot)) => snapshot,
            Some(Err(e)) => {
                debug!(path = %path, error = %e, "Inline player data did not decode, fetching snapshot");
                self.fetch_snapshot(&path).await?
            }
            None => self.fetch_snapshot(&path).await?,
        };

        let data = PlayerData::from(&snapshot);

        if !self.record_player_state(&data) {
            self.deduplicated.fetch_add(1, Ordering::Relaxed);
            debug!(state = %data.state, title = %data.title, "Suppressed duplicate player data");
            return None;
        }

        Some(KefEvent::new(path, EventData::PlayerData(data)))
    }

    async fn fetch_snapshot(&self, path: &str) -> Option<PlayerSnapshot> {
        match self.snapshots.fetch_player_snapshot().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(path = %path, error = %e, "Failed to fetch player snapshot, dropping change");
                None
            }
        }
    }

    /// Store `data` as the last player state. Returns false if it was already.
    fn record_player_state(&self, data: &PlayerData) -> bool {
        let mut dedup = self.dedup.lock();
        if dedup.as_ref().is_some_and(|last| last.matches(data)) {
            return false;
        }

        *dedup = Some(DedupState {
            last_player_state: data.state.clone(),
            last_track_title: data.title.clone(),
            last_track_artist: data.artist.clone(),
        });
        true
    }
}

impl std::fmt::Debug for EventTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTranslator")
            .field("dedup", &*self.dedup.lock())
            .field("deduplicated", &self.deduplicated())
            .finish_non_exhaustive()
    }
}

fn unknown(path: String) -> KefEvent {
    let data = EventData::Unknown(path.clone());
    KefEvent::new(path, data)
}

fn decode_event(kind: EventKind, value: Option<Value>) -> Result<EventData, DecodeError> {
    match kind {
        EventKind::Network => return Ok(EventData::Network(value)),
        EventKind::Firmware => return Ok(EventData::Firmware(value)),
        EventKind::Notification => return Ok(EventData::Notification(value)),
        // A value record on the queue path only says the queue changed
        EventKind::Playlist => return Ok(EventData::Playlist(PlaylistUpdate::default())),
        EventKind::PlayTime if value.is_none() => return Ok(EventData::PlayTime(-1)),
        EventKind::Bluetooth => {
            if let Some(state) = value.as_ref().and_then(bare_bluetooth_state) {
                return Ok(EventData::Bluetooth(state));
            }
        }
        _ => {}
    }

    let value = value.ok_or_else(|| DecodeError::MissingField("itemValue".to_string()))?;
    let typed = decode_typed(&value)?;

    match (kind, typed) {
        (EventKind::Volume, TypedValue::Int32(v)) => Ok(EventData::Volume(v)),
        (EventKind::Source, TypedValue::PhysicalSource(s)) => Ok(EventData::Source(s)),
        (EventKind::Power, TypedValue::SpeakerStatus(s)) => Ok(EventData::Power(s)),
        (EventKind::Mute, TypedValue::Bool(b)) => Ok(EventData::Mute(b)),
        (EventKind::PlayTime, TypedValue::Int64(ms)) => Ok(EventData::PlayTime(ms)),
        (EventKind::PlayTime, TypedValue::Int32(ms)) => Ok(EventData::PlayTime(i64::from(ms))),
        (EventKind::PlayMode, TypedValue::PlayMode(mode) | TypedValue::Text(mode)) => {
            Ok(EventData::PlayMode(mode))
        }
        (EventKind::EqProfile, TypedValue::EqProfile(profile)) => Ok(EventData::EqProfile(profile)),
        (EventKind::Bluetooth, TypedValue::BluetoothState(state)) => Ok(EventData::Bluetooth(state)),
        (kind, other) => Err(DecodeError::InvalidPayload {
            tag: other.tag().to_string(),
            reason: format!("unexpected type for {} event", kind),
        }),
    }
}

/// Values arrive either as the bare `{"type": ..}` item or wrapped in the
/// one-element array used by `getData`
fn decode_typed(value: &Value) -> Result<TypedValue, DecodeError> {
    match value {
        Value::Array(_) => codec::decode_value(value),
        other => codec::decode_item(other),
    }
}

/// Bluetooth state is sometimes sent as a plain object rather than a typed value
fn bare_bluetooth_state(value: &Value) -> Option<kef_api::BluetoothState> {
    let object = value.as_object()?;
    if object.contains_key("type") {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}
