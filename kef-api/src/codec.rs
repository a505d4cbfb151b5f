//! Codec for the speaker's tagged-union value encoding
//!
//! Every value travels as a one-element JSON array holding an object whose
//! `type` field names a sibling field that carries the payload:
//!
//! ```text
//! [{"type": "i32_", "i32_": 42}]
//! [{"type": "bool_", "bool_": "false"}]
//! [{"type": "kefPhysicalSource", "kefPhysicalSource": "tv"}]
//! ```
//!
//! Booleans and enum-likes are quoted strings on the wire. Decoding checks
//! every payload against its tag and never truncates numbers.

use serde_json::{json, Map, Value};

use crate::error::{DecodeError, EncodeError};
use crate::value::{BluetoothState, EqProfile, TypedValue, ValueTag};

/// Decode a typed value from raw response bytes
pub fn decode(bytes: &[u8]) -> Result<TypedValue, DecodeError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| DecodeError::Json(e.to_string()))?;
    decode_value(&value)
}

/// Decode a typed value from an already parsed one-element JSON array
pub fn decode_value(value: &Value) -> Result<TypedValue, DecodeError> {
    let items = value.as_array().ok_or(DecodeError::NotAnArray)?;
    match items.as_slice() {
        [item] => decode_item(item),
        other => Err(DecodeError::NotSingleElement(other.len())),
    }
}

/// Decode a single `{"type": tag, tag: payload}` object
pub fn decode_item(item: &Value) -> Result<TypedValue, DecodeError> {
    let object = item.as_object().ok_or(DecodeError::NotAnObject)?;

    let tag = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?;

    let value_tag =
        ValueTag::from_wire(tag).ok_or_else(|| DecodeError::UnsupportedType(tag.to_string()))?;

    let payload = match object.get(tag) {
        Some(Value::Null) | None => return Err(DecodeError::MissingField(tag.to_string())),
        Some(payload) => payload,
    };

    decode_payload(value_tag, tag, payload)
}

fn decode_payload(value_tag: ValueTag, tag: &str, payload: &Value) -> Result<TypedValue, DecodeError> {
    match value_tag {
        ValueTag::Int32 => {
            let wide = integer(tag, payload)?;
            let narrow = i32::try_from(wide)
                .map_err(|_| DecodeError::invalid(tag, format!("{} does not fit in 32 bits", wide)))?;
            Ok(TypedValue::Int32(narrow))
        }
        ValueTag::Int64 => Ok(TypedValue::Int64(integer(tag, payload)?)),
        ValueTag::Text => Ok(TypedValue::Text(text(tag, payload)?.to_string())),
        ValueTag::PlayMode => Ok(TypedValue::PlayMode(text(tag, payload)?.to_string())),
        // Anything other than the literal "false" reads as true.
        ValueTag::Bool => Ok(TypedValue::Bool(text(tag, payload)? != "false")),
        ValueTag::PhysicalSource => text(tag, payload)?
            .parse()
            .map(TypedValue::PhysicalSource)
            .map_err(|e| DecodeError::invalid(tag, e.to_string())),
        ValueTag::SpeakerStatus => text(tag, payload)?
            .parse()
            .map(TypedValue::SpeakerStatus)
            .map_err(|e| DecodeError::invalid(tag, e.to_string())),
        ValueTag::CableMode => text(tag, payload)?
            .parse()
            .map(TypedValue::CableMode)
            .map_err(|e| DecodeError::invalid(tag, e.to_string())),
        ValueTag::EqProfile => {
            require_object(tag, payload)?;
            serde_json::from_value::<EqProfile>(payload.clone())
                .map(TypedValue::EqProfile)
                .map_err(|e| DecodeError::invalid(tag, e.to_string()))
        }
        ValueTag::BluetoothState => {
            require_object(tag, payload)?;
            serde_json::from_value::<BluetoothState>(payload.clone())
                .map(TypedValue::BluetoothState)
                .map_err(|e| DecodeError::invalid(tag, e.to_string()))
        }
    }
}

fn integer(tag: &str, payload: &Value) -> Result<i64, DecodeError> {
    match payload {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| DecodeError::invalid(tag, format!("{} is not a 64-bit integer", n))),
        other => Err(DecodeError::invalid(tag, format!("expected integer, found {}", kind_of(other)))),
    }
}

fn text<'a>(tag: &str, payload: &'a Value) -> Result<&'a str, DecodeError> {
    payload
        .as_str()
        .ok_or_else(|| DecodeError::invalid(tag, format!("expected string, found {}", kind_of(payload))))
}

fn require_object(tag: &str, payload: &Value) -> Result<(), DecodeError> {
    if payload.is_object() {
        Ok(())
    } else {
        Err(DecodeError::invalid(tag, format!("expected object, found {}", kind_of(payload))))
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Encode a typed value into its one-element array wire form
pub fn encode(value: &TypedValue) -> Result<Value, EncodeError> {
    Ok(Value::Array(vec![encode_item(value)?]))
}

/// Encode a typed value as raw bytes ready to send to the speaker
pub fn encode_to_vec(value: &TypedValue) -> Result<Vec<u8>, EncodeError> {
    let encoded = encode(value)?;
    serde_json::to_vec(&encoded).map_err(|e| EncodeError {
        tag: value.tag().to_string(),
        reason: e.to_string(),
    })
}

/// Encode a typed value as a single `{"type": tag, tag: payload}` object
pub fn encode_item(value: &TypedValue) -> Result<Value, EncodeError> {
    let tag = value.tag();
    let payload = match value {
        TypedValue::Int32(v) => json!(v),
        TypedValue::Int64(v) => json!(v),
        TypedValue::Text(v) | TypedValue::PlayMode(v) => json!(v),
        TypedValue::Bool(v) => json!(if *v { "true" } else { "false" }),
        TypedValue::PhysicalSource(v) => json!(v.as_str()),
        TypedValue::SpeakerStatus(v) => json!(v.as_str()),
        TypedValue::CableMode(v) => json!(v.as_str()),
        TypedValue::EqProfile(profile) => to_payload(tag, profile)?,
        TypedValue::BluetoothState(state) => to_payload(tag, state)?,
    };

    let mut object = Map::new();
    object.insert("type".to_string(), Value::String(tag.to_string()));
    object.insert(tag.to_string(), payload);
    Ok(Value::Object(object))
}

fn to_payload<T: serde::Serialize>(tag: &str, value: &T) -> Result<Value, EncodeError> {
    serde_json::to_value(value).map_err(|e| EncodeError {
        tag: tag.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{CableMode, PhysicalSource, SpeakerStatus};
    use rstest::rstest;

    #[rstest]
    #[case(r#"[{"type":"i32_","i32_":42}]"#, TypedValue::Int32(42))]
    #[case(r#"[{"type":"i32_","i32_":-7}]"#, TypedValue::Int32(-7))]
    #[case(r#"[{"type":"i64_","i64_":5000000000}]"#, TypedValue::Int64(5_000_000_000))]
    #[case(r#"[{"type":"string_","string_":"Living room"}]"#, TypedValue::Text("Living room".into()))]
    #[case(r#"[{"type":"bool_","bool_":"true"}]"#, TypedValue::Bool(true))]
    #[case(r#"[{"type":"bool_","bool_":"false"}]"#, TypedValue::Bool(false))]
    #[case(r#"[{"type":"kefPhysicalSource","kefPhysicalSource":"optic"}]"#, TypedValue::PhysicalSource(PhysicalSource::Optical))]
    #[case(r#"[{"type":"kefSpeakerStatus","kefSpeakerStatus":"standby"}]"#, TypedValue::SpeakerStatus(SpeakerStatus::Standby))]
    #[case(r#"[{"type":"kefCableMode","kefCableMode":"wireless"}]"#, TypedValue::CableMode(CableMode::Wireless))]
    #[case(r#"[{"type":"playerPlayMode","playerPlayMode":"repeatAll"}]"#, TypedValue::PlayMode("repeatAll".into()))]
    fn test_decode_scalars(#[case] input: &str, #[case] expected: TypedValue) {
        assert_eq!(decode(input.as_bytes()).unwrap(), expected);
    }

    #[test]
    fn test_bool_non_literal_reads_true() {
        let value = decode(br#"[{"type":"bool_","bool_":"1"}]"#).unwrap();
        assert_eq!(value, TypedValue::Bool(true));
    }

    #[test]
    fn test_bool_native_boolean_is_rejected() {
        let err = decode(br#"[{"type":"bool_","bool_":false}]"#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidPayload { .. }));
    }

    #[rstest]
    #[case(r#"[]"#, DecodeError::NotSingleElement(0))]
    #[case(
        r#"[{"type":"i32_","i32_":1},{"type":"i32_","i32_":2}]"#,
        DecodeError::NotSingleElement(2)
    )]
    #[case(r#"{"type":"i32_","i32_":1}"#, DecodeError::NotAnArray)]
    #[case(r#"[42]"#, DecodeError::NotAnObject)]
    #[case(r#"[{"i32_":1}]"#, DecodeError::MissingType)]
    #[case(r#"[{"type":"i32_"}]"#, DecodeError::MissingField("i32_".into()))]
    #[case(r#"[{"type":"i32_","i64_":1}]"#, DecodeError::MissingField("i32_".into()))]
    #[case(r#"[{"type":"kefEqProfileV2","kefEqProfileV2":null}]"#, DecodeError::MissingField("kefEqProfileV2".into()))]
    #[case(r#"[{"type":"double_","double_":1.5}]"#, DecodeError::UnsupportedType("double_".into()))]
    fn test_decode_structural_errors(#[case] input: &str, #[case] expected: DecodeError) {
        assert_eq!(decode(input.as_bytes()).unwrap_err(), expected);
    }

    #[rstest]
    #[case(r#"[{"type":"i32_","i32_":3000000000}]"#)]
    #[case(r#"[{"type":"i32_","i32_":1.5}]"#)]
    #[case(r#"[{"type":"i32_","i32_":"42"}]"#)]
    #[case(r#"[{"type":"i64_","i64_":18446744073709551615}]"#)]
    #[case(r#"[{"type":"kefPhysicalSource","kefPhysicalSource":"hdmi"}]"#)]
    #[case(r#"[{"type":"kefEqProfileV2","kefEqProfileV2":"flat"}]"#)]
    #[case(r#"[{"type":"kefEqProfileV2","kefEqProfileV2":{"profileName":"x","profileId":"y","balance":2.5}}]"#)]
    #[case(r#"[{"type":"bluetoothState","bluetoothState":{"connected":true}}]"#)]
    fn test_decode_invalid_payloads(#[case] input: &str) {
        let err = decode(input.as_bytes()).unwrap_err();
        assert!(
            matches!(err, DecodeError::InvalidPayload { .. }),
            "unexpected error {:?}",
            err
        );
    }

    #[test]
    fn test_decode_garbage_is_json_error() {
        assert!(matches!(decode(b"not json"), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_decode_eq_profile_keeps_unknown_fields() {
        let input = br#"[{"type":"kefEqProfileV2","kefEqProfileV2":{
            "profileName":"Kitchen","profileId":"4ce2f2f2","isExpertMode":true,
            "deskModeSetting":-3.0,"balance":0,"subwooferCount":1,
            "bassExtension":"standard","isKW1":false}}]"#;

        let value = decode(input).unwrap();
        let TypedValue::EqProfile(profile) = &value else {
            panic!("Expected EqProfile, got {:?}", value);
        };
        assert_eq!(profile.profile_name, "Kitchen");
        assert_eq!(profile.is_expert_mode, Some(true));
        assert_eq!(profile.desk_mode_setting, Some(-3.0));
        assert_eq!(profile.subwoofer_count, Some(1));
        assert_eq!(profile.extra.get("isKW1"), Some(&Value::Bool(false)));

        let reencoded = encode(&value).unwrap();
        assert_eq!(decode_value(&reencoded).unwrap(), value);
    }

    #[test]
    fn test_decode_bluetooth_state() {
        let value = decode(
            br#"[{"type":"bluetoothState","bluetoothState":{"state":"connected","connected":true,"pairing":false}}]"#,
        )
        .unwrap();
        assert_eq!(
            value,
            TypedValue::BluetoothState(BluetoothState {
                state: "connected".into(),
                connected: true,
                pairing: false,
            })
        );
    }

    #[test]
    fn test_encode_quotes_bools_and_enums() {
        assert_eq!(
            encode(&TypedValue::Bool(false)).unwrap(),
            json!([{"type": "bool_", "bool_": "false"}])
        );
        assert_eq!(
            encode(&TypedValue::SpeakerStatus(SpeakerStatus::PowerOn)).unwrap(),
            json!([{"type": "kefSpeakerStatus", "kefSpeakerStatus": "powerOn"}])
        );
        assert_eq!(
            encode_item(&TypedValue::Int32(30)).unwrap(),
            json!({"type": "i32_", "i32_": 30})
        );
    }

    #[test]
    fn test_encode_to_vec_is_decodable() {
        let bytes = encode_to_vec(&TypedValue::PhysicalSource(PhysicalSource::Bluetooth)).unwrap();
        assert_eq!(
            decode(&bytes).unwrap(),
            TypedValue::PhysicalSource(PhysicalSource::Bluetooth)
        );
    }

    mod roundtrip {
        use super::*;
        use proptest::prelude::*;

        fn setting() -> impl Strategy<Value = Option<f64>> {
            proptest::option::of(-100.0f64..100.0)
        }

        fn eq_profile() -> impl Strategy<Value = EqProfile> {
            use proptest::option::of;

            (
                ("[A-Za-z ]{0,16}", "[a-f0-9-]{0,36}"),
                (of(any::<bool>()), of(any::<bool>()), setting(), of(any::<bool>()), setting()),
                (of("[a-z]+"), setting(), of(-50i32..50), of(any::<bool>()), of(any::<bool>())),
                (of(20i32..200), setting(), of(0i32..3), of(-10i32..10)),
                (of("[a-z]+"), of("[a-z]+"), of("[a-z]+")),
            )
                .prop_map(
                    |(
                        (profile_name, profile_id),
                        (is_expert_mode, desk_mode, desk_mode_setting, wall_mode, wall_mode_setting),
                        (bass_extension, treble_amount, balance, phase_correction, high_pass_mode),
                        (high_pass_mode_freq, sub_out_lp_freq, subwoofer_count, subwoofer_gain),
                        (subwoofer_preset, subwoofer_polarity, audio_polarity),
                    )| EqProfile {
                        profile_name,
                        profile_id,
                        is_expert_mode,
                        desk_mode,
                        desk_mode_setting,
                        wall_mode,
                        wall_mode_setting,
                        bass_extension,
                        treble_amount,
                        balance,
                        phase_correction,
                        high_pass_mode,
                        high_pass_mode_freq,
                        sub_out_lp_freq,
                        subwoofer_count,
                        subwoofer_gain,
                        subwoofer_preset,
                        subwoofer_polarity,
                        audio_polarity,
                        extra: Map::new(),
                    },
                )
        }

        fn typed_value() -> impl Strategy<Value = TypedValue> {
            prop_oneof![
                any::<i32>().prop_map(TypedValue::Int32),
                any::<i64>().prop_map(TypedValue::Int64),
                ".*".prop_map(TypedValue::Text),
                any::<bool>().prop_map(TypedValue::Bool),
                prop_oneof![
                    Just(PhysicalSource::Standby),
                    Just(PhysicalSource::Wifi),
                    Just(PhysicalSource::Bluetooth),
                    Just(PhysicalSource::Tv),
                    Just(PhysicalSource::Optical),
                    Just(PhysicalSource::Coaxial),
                    Just(PhysicalSource::Analog),
                    Just(PhysicalSource::Usb),
                ]
                .prop_map(TypedValue::PhysicalSource),
                prop_oneof![Just(SpeakerStatus::Standby), Just(SpeakerStatus::PowerOn)]
                    .prop_map(TypedValue::SpeakerStatus),
                prop_oneof![Just(CableMode::Wired), Just(CableMode::Wireless)]
                    .prop_map(TypedValue::CableMode),
                ("[a-z]+", any::<bool>(), any::<bool>()).prop_map(|(state, connected, pairing)| {
                    TypedValue::BluetoothState(BluetoothState { state, connected, pairing })
                }),
                eq_profile().prop_map(TypedValue::EqProfile),
                ".*".prop_map(TypedValue::PlayMode),
            ]
        }

        proptest! {
            #[test]
            fn decode_after_encode_preserves_value(value in typed_value()) {
                let encoded = encode(&value).unwrap();
                prop_assert_eq!(decode_value(&encoded).unwrap(), value);
            }
        }
    }
}
