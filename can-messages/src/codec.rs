//! Payload packing and unpacking
//!
//! Places signal values into an 8-byte payload and reads them back. Used for
//! documentation examples and tests, not for live traffic.

use crate::message::Message;
use crate::signal::{max_raw, ByteOrder, Signal};
use crate::types::{CanDbError, DecodedSignal, Result, PAYLOAD_BYTES};
use byteorder::{ByteOrder as _, LittleEndian};

/// Decode every signal of `message` from `data`
///
/// Payloads shorter than 8 bytes are zero-padded; longer ones are rejected.
pub fn decode_payload(message: &Message, data: &[u8]) -> Result<Vec<DecodedSignal>> {
    let payload = pad_payload(data)?;

    message
        .signals()
        .iter()
        .map(|signal| {
            let raw_value = extract(&payload, signal);
            let value = signal.decode(raw_value)?;
            Ok(DecodedSignal {
                name: signal.name().to_string(),
                value,
                unit: if signal.unit().is_empty() {
                    None
                } else {
                    Some(signal.unit().to_string())
                },
                raw_value,
            })
        })
        .collect()
}

/// Encode physical values into a payload
///
/// Signals not listed in `values` are left at zero. Unknown signal names are
/// rejected.
pub fn encode_payload(message: &Message, values: &[(&str, f64)]) -> Result<[u8; PAYLOAD_BYTES]> {
    let mut payload = [0u8; PAYLOAD_BYTES];

    for (name, value) in values {
        let signal = message.signal(name).ok_or_else(|| {
            CanDbError::InvalidPayload(format!(
                "Message '{}' has no signal '{}'",
                message.name(),
                name
            ))
        })?;
        insert(&mut payload, signal, signal.encode(*value));
    }

    Ok(payload)
}

/// Extract the raw bits of a signal
pub fn extract(payload: &[u8; PAYLOAD_BYTES], signal: &Signal) -> u64 {
    let start_bit = signal.start_bit() as usize;
    let length = signal.bit_length() as usize;

    match signal.byte_order() {
        ByteOrder::LittleEndian => {
            let word = LittleEndian::read_u64(payload);
            (word >> start_bit) & max_raw(signal.bit_length())
        }
        ByteOrder::BigEndian => extract_big_endian(payload, start_bit, length),
    }
}

/// Write the raw bits of a signal, leaving other bits untouched
pub fn insert(payload: &mut [u8; PAYLOAD_BYTES], signal: &Signal, raw: u64) {
    let start_bit = signal.start_bit() as usize;
    let length = signal.bit_length() as usize;
    let raw = raw & max_raw(signal.bit_length());

    match signal.byte_order() {
        ByteOrder::LittleEndian => {
            let mask = max_raw(signal.bit_length()) << start_bit;
            let word = LittleEndian::read_u64(payload);
            let word = (word & !mask) | (raw << start_bit);
            LittleEndian::write_u64(payload, word);
        }
        ByteOrder::BigEndian => insert_big_endian(payload, start_bit, length, raw),
    }
}

fn pad_payload(data: &[u8]) -> Result<[u8; PAYLOAD_BYTES]> {
    if data.len() > PAYLOAD_BYTES {
        return Err(CanDbError::InvalidPayload(format!(
            "payload has {} bytes, at most {} supported",
            data.len(),
            PAYLOAD_BYTES
        )));
    }

    let mut payload = [0u8; PAYLOAD_BYTES];
    payload[..data.len()].copy_from_slice(data);
    Ok(payload)
}

/// Extract signal with big-endian (Motorola) byte order
///
/// Bit positions count MSB-first within each byte (bit 0 = MSB of byte 0);
/// the signal's start bit is its most significant bit.
fn extract_big_endian(data: &[u8], start_bit: usize, length: usize) -> u64 {
    let mut result: u64 = 0;

    for i in 0..length {
        let bit_pos = start_bit + i;
        let byte_idx = bit_pos / 8;
        let bit_in_byte = 7 - (bit_pos % 8);

        let bit_value = (data[byte_idx] >> bit_in_byte) & 0x01;
        result |= (bit_value as u64) << (length - 1 - i);
    }

    result
}

fn insert_big_endian(data: &mut [u8], start_bit: usize, length: usize, raw: u64) {
    for i in 0..length {
        let bit_pos = start_bit + i;
        let byte_idx = bit_pos / 8;
        let bit_in_byte = 7 - (bit_pos % 8);

        let bit_value = ((raw >> (length - 1 - i)) & 0x01) as u8;
        data[byte_idx] = (data[byte_idx] & !(1 << bit_in_byte)) | (bit_value << bit_in_byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::ValueTable;
    use crate::types::{Module, SignalValue};

    fn software_version() -> Message {
        Message::builder(0x0A00_1310, "modu_card_suspension_software_version")
            .senders([Module::ModuCard])
            .receivers([Module::Jetson])
            .signals([
                Signal::signed("uid", 0, 32).unwrap(),
                Signal::unsigned("software_version_major", 32, 8).unwrap(),
                Signal::unsigned("software_version_minor", 40, 16).unwrap(),
                Signal::unsigned("software_version_build", 56, 8).unwrap(),
            ])
            .extended_frame(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_extract_little_endian_simple() {
        let payload = [0xAB, 0xCD, 0xEF, 0x12, 0, 0, 0, 0];
        let signal = Signal::unsigned("byte0", 0, 8).unwrap();
        assert_eq!(extract(&payload, &signal), 0xAB);
    }

    #[test]
    fn test_extract_little_endian_cross_byte() {
        let payload = [0xAB, 0xCD, 0xEF, 0x12, 0, 0, 0, 0];
        let signal = Signal::unsigned("word", 4, 16).unwrap();
        assert_eq!(extract(&payload, &signal), 0xFCDA);
    }

    #[test]
    fn test_extract_big_endian_simple() {
        let payload = [0xAB, 0xCD, 0xEF, 0x12, 0, 0, 0, 0];
        let signal = Signal::unsigned("word", 0, 16)
            .unwrap()
            .with_byte_order(ByteOrder::BigEndian);
        assert_eq!(extract(&payload, &signal), 0xABCD);
    }

    #[test]
    fn test_insert_keeps_neighbours() {
        let mut payload = [0xFF; PAYLOAD_BYTES];
        let signal = Signal::unsigned("nibble", 4, 4).unwrap();
        insert(&mut payload, &signal, 0x0);
        assert_eq!(payload[0], 0x0F);

        let signal = signal.with_byte_order(ByteOrder::BigEndian);
        insert(&mut payload, &signal, 0x5);
        assert_eq!(payload[0], 0x05);
    }

    #[test]
    fn test_payload_round_trip() {
        let message = software_version();
        let payload = encode_payload(
            &message,
            &[
                ("uid", -42.0),
                ("software_version_major", 2.0),
                ("software_version_minor", 513.0),
                ("software_version_build", 7.0),
            ],
        )
        .unwrap();

        let decoded = decode_payload(&message, &payload).unwrap();
        let values: Vec<SignalValue> = decoded.into_iter().map(|s| s.value).collect();
        assert_eq!(
            values,
            vec![
                SignalValue::Integer(-42),
                SignalValue::Unsigned(2),
                SignalValue::Unsigned(513),
                SignalValue::Unsigned(7),
            ]
        );
    }

    #[test]
    fn test_float_payload_round_trip() {
        let message = Message::builder(0x002, "set_pos")
            .senders([Module::Jetson])
            .receivers([Module::KonArm])
            .signals([
                Signal::float32("position", 0).unwrap().with_unit("rad"),
                Signal::float32("velocity", 32).unwrap().with_unit("rad/s"),
            ])
            .build()
            .unwrap();

        let payload = encode_payload(&message, &[("position", 1.25), ("velocity", -0.5)]).unwrap();
        let decoded = decode_payload(&message, &payload).unwrap();
        assert_eq!(decoded[0].value, SignalValue::Float(1.25));
        assert_eq!(decoded[0].unit.as_deref(), Some("rad"));
        assert_eq!(decoded[1].value, SignalValue::Float(-0.5));
    }

    #[test]
    fn test_unknown_enum_code_in_payload() {
        let message = Message::builder(0x001, "status")
            .senders([Module::KonArm])
            .receivers([Module::Jetson])
            .signal(
                Signal::enumeration("status", 0, 8, ValueTable::new([(1, "ok"), (2, "fault")]))
                    .unwrap(),
            )
            .build()
            .unwrap();

        let decoded = decode_payload(&message, &[2]).unwrap();
        assert_eq!(decoded[0].value.label(), Some("fault"));

        let err = decode_payload(&message, &[9]).unwrap_err();
        assert!(matches!(err, CanDbError::UnknownEnumCode(_)));
    }

    #[test]
    fn test_rejects_bad_input() {
        let message = software_version();
        assert!(matches!(
            decode_payload(&message, &[0; 9]),
            Err(CanDbError::InvalidPayload(_))
        ));
        assert!(matches!(
            encode_payload(&message, &[("missing", 1.0)]),
            Err(CanDbError::InvalidPayload(_))
        ));
    }
}
