//! # kef-stream
//!
//! Live event feed for KEF network speakers.
//!
//! The speaker exposes change notifications through a long-poll queue:
//! a client registers the paths it cares about, receives a queue id, then
//! polls that queue repeatedly. This crate handles registration, runs the
//! poll loop with retry, turns raw records into typed [`KefEvent`]s and
//! delivers them in order on a bounded channel.
//!
//! ```rust,ignore
//! use kef_stream::{EventData, KefStream, StreamConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let stream = KefStream::connect_host("192.168.1.40", StreamConfig::default()).await?;
//! let mut events = stream.events().unwrap();
//! let _task = stream.spawn(CancellationToken::new());
//!
//! while let Some(event) = events.recv().await {
//!     if let EventData::Volume(volume) = event.data {
//!         println!("volume is now {}", volume);
//!     }
//! }
//! ```

pub mod channel;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod paths;
pub mod poller;
pub mod record;
pub mod registrar;
pub mod subscription;
pub mod translator;

pub use channel::{EventChannel, EventReceiver, SendOutcome};
pub use client::KefStream;
pub use config::StreamConfig;
pub use error::{RegistrationError, Result, StreamError, TransportError};
pub use event::{EventData, EventKind, KefEvent, PlayerData, PlaylistUpdate};
pub use poller::{PollLoop, PollStats};
pub use record::{parse_poll_response, MalformedRecord, RawRecord, RowChange};
pub use registrar::SessionRegistrar;
pub use subscription::{SessionId, Subscription, SubscriptionKind};
pub use translator::{DedupState, EventTranslator, SnapshotSource};
