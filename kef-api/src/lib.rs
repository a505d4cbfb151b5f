//! # kef-api
//!
//! Typed access to the JSON API of KEF network speakers.
//!
//! The speaker describes every value with a small tagged union
//! (`[{"type": "i32_", "i32_": 42}]`). This crate decodes that encoding into
//! [`TypedValue`] with checked, per-tag rules, encodes values back, models
//! the player snapshot document, and provides [`KefClient`] for `getData`
//! reads.
//!
//! ```rust,ignore
//! use kef_api::{KefClient, TypedValue};
//!
//! let client = KefClient::new("192.168.1.40")?;
//! if let TypedValue::Int32(volume) = client.get_typed("player:volume").await? {
//!     println!("volume is {}", volume);
//! }
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod player;
pub mod value;

pub use client::{KefClient, PLAYER_DATA_PATH};
pub use codec::{decode, decode_item, decode_value, encode, encode_item, encode_to_vec};
pub use error::{ApiError, DecodeError, EncodeError, Result};
pub use player::PlayerSnapshot;
pub use value::{
    BluetoothState, CableMode, EqProfile, PhysicalSource, SpeakerStatus, TypedValue, UnknownVariant,
};

// Re-export the transport seam so downstream crates need only one dependency
pub use http_client::{HttpClient, HttpError, Transport};
