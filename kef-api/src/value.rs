//! Domain value types carried by the speaker's typed value encoding

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a wire string does not name a known enum member
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} '{value}'")]
pub struct UnknownVariant {
    /// Which enum was being parsed
    pub kind: &'static str,
    /// The unrecognised wire string
    pub value: String,
}

/// Generates a string-backed enum with `as_str`, `Display` and `FromStr`
/// implementations that map each member to its wire spelling.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )*
        }

        impl $name {
            /// Wire spelling of this value
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok($name::$variant), )*
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Physical input selected on the speaker
    PhysicalSource("physical source") {
        /// Speaker is in standby, no input active
        Standby => "standby",
        Wifi => "wifi",
        Bluetooth => "bluetooth",
        Tv => "tv",
        Optical => "optic",
        Coaxial => "coaxial",
        Analog => "analog",
        Usb => "usb",
    }
}

wire_enum! {
    /// Power status reported by the speaker host
    SpeakerStatus("speaker status") {
        Standby => "standby",
        PowerOn => "powerOn",
    }
}

wire_enum! {
    /// How the two speakers of a pair are linked
    CableMode("cable mode") {
        Wired => "wired",
        Wireless => "wireless",
    }
}

/// DSP/EQ profile (`kefEqProfileV2`)
///
/// Known fields are typed and range-checked by serde. Anything else the
/// speaker sends is kept in `extra` so a decoded profile encodes back
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EqProfile {
    pub profile_name: String,
    pub profile_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_expert_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desk_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desk_mode_setting: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_mode_setting: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bass_extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treble_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_correction: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_pass_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_pass_mode_freq: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_out_lp_freq: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subwoofer_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subwoofer_gain: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subwoofer_preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subwoofer_polarity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_polarity: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Bluetooth link state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BluetoothState {
    pub state: String,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub pairing: bool,
}

/// A decoded value from the speaker's tagged-union encoding
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Int32(i32),
    Int64(i64),
    Text(String),
    Bool(bool),
    PhysicalSource(PhysicalSource),
    SpeakerStatus(SpeakerStatus),
    CableMode(CableMode),
    EqProfile(EqProfile),
    BluetoothState(BluetoothState),
    /// Repeat/shuffle mode as reported by the media player
    PlayMode(String),
}

impl TypedValue {
    /// The wire discriminant for this value
    pub fn tag(&self) -> &'static str {
        self.value_tag().wire_name()
    }

    pub(crate) fn value_tag(&self) -> ValueTag {
        match self {
            TypedValue::Int32(_) => ValueTag::Int32,
            TypedValue::Int64(_) => ValueTag::Int64,
            TypedValue::Text(_) => ValueTag::Text,
            TypedValue::Bool(_) => ValueTag::Bool,
            TypedValue::PhysicalSource(_) => ValueTag::PhysicalSource,
            TypedValue::SpeakerStatus(_) => ValueTag::SpeakerStatus,
            TypedValue::CableMode(_) => ValueTag::CableMode,
            TypedValue::EqProfile(_) => ValueTag::EqProfile,
            TypedValue::BluetoothState(_) => ValueTag::BluetoothState,
            TypedValue::PlayMode(_) => ValueTag::PlayMode,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            TypedValue::Int32(v) => Some(*v),
            TypedValue::Int64(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Int32(v) => Some(i64::from(*v)),
            TypedValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Text content of `Text` and `PlayMode` values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::Text(v) | TypedValue::PlayMode(v) => Some(v),
            _ => None,
        }
    }
}

/// Wire discriminants understood by the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueTag {
    Int32,
    Int64,
    Text,
    Bool,
    PhysicalSource,
    SpeakerStatus,
    CableMode,
    EqProfile,
    BluetoothState,
    PlayMode,
}

impl ValueTag {
    pub(crate) fn wire_name(self) -> &'static str {
        match self {
            ValueTag::Int32 => "i32_",
            ValueTag::Int64 => "i64_",
            ValueTag::Text => "string_",
            ValueTag::Bool => "bool_",
            ValueTag::PhysicalSource => "kefPhysicalSource",
            ValueTag::SpeakerStatus => "kefSpeakerStatus",
            ValueTag::CableMode => "kefCableMode",
            ValueTag::EqProfile => "kefEqProfileV2",
            ValueTag::BluetoothState => "bluetoothState",
            ValueTag::PlayMode => "playerPlayMode",
        }
    }

    pub(crate) fn from_wire(tag: &str) -> Option<Self> {
        Some(match tag {
            "i32_" => ValueTag::Int32,
            "i64_" => ValueTag::Int64,
            "string_" => ValueTag::Text,
            "bool_" => ValueTag::Bool,
            "kefPhysicalSource" => ValueTag::PhysicalSource,
            "kefSpeakerStatus" => ValueTag::SpeakerStatus,
            "kefCableMode" => ValueTag::CableMode,
            "kefEqProfileV2" => ValueTag::EqProfile,
            "bluetoothState" => ValueTag::BluetoothState,
            "playerPlayMode" => ValueTag::PlayMode,
            _ => return None,
        })
    }
}
