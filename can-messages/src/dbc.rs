//! DBC file writer
//!
//! Serializes a validated [`Database`] into Vector DBC text. Output depends only
//! on the database contents and order, so rebuilding an unchanged database
//! produces an identical file.

use crate::database::Database;
use crate::message::Message;
use crate::signal::{max_raw, ByteOrder, Signal, SignalKind};
use crate::types::{Module, Result, PAYLOAD_BYTES};
use std::fmt::{self, Write};

/// Flag set on extended frame IDs in DBC files
pub const EXTENDED_ID_FLAG: u32 = 0x8000_0000;

/// Render the whole database as DBC text
pub fn write_dbc(database: &Database) -> Result<String> {
    let mut out = String::new();
    render(&mut out, database)?;
    log::debug!("Serialized {} messages to DBC ({} bytes)", database.len(), out.len());
    Ok(out)
}

fn render(out: &mut impl Write, database: &Database) -> fmt::Result {
    out.write_str("VERSION \"\"\n\n\n")?;
    out.write_str("NS_ :\n\n")?;
    out.write_str("BS_:\n\n")?;

    let nodes: Vec<&str> = Module::ALL
        .iter()
        .filter(|module| {
            database
                .iter()
                .any(|m| m.senders().contains(module) || m.receivers().contains(module))
        })
        .map(|module| module.as_str())
        .collect();
    writeln!(out, "BU_: {}\n", nodes.join(" "))?;

    for message in database {
        write_message(out, message)?;
    }

    for message in database.iter().filter(|m| m.senders().len() > 1) {
        let senders: Vec<&str> = message.senders().iter().map(|m| m.as_str()).collect();
        writeln!(out, "BO_TX_BU_ {} : {};", dbc_id(message), senders.join(","))?;
    }

    for message in database {
        for signal in message.signals() {
            if let Some(table) = signal.value_table() {
                write!(out, "VAL_ {} {}", dbc_id(message), signal.name())?;
                for (code, name) in table.entries() {
                    write!(out, " {} \"{}\"", code, escape(name))?;
                }
                out.write_str(" ;\n")?;
            }
        }
    }

    for message in database {
        for signal in message.signals() {
            if signal.kind() == SignalKind::Float32 {
                writeln!(out, "SIG_VALTYPE_ {} {} : 1;", dbc_id(message), signal.name())?;
            }
        }
    }

    Ok(())
}

/// Frame ID as written in DBC files (extended IDs carry bit 31)
pub fn dbc_id(message: &Message) -> u32 {
    if message.is_extended() {
        message.frame_id() | EXTENDED_ID_FLAG
    } else {
        message.frame_id()
    }
}

fn write_message(out: &mut impl Write, message: &Message) -> fmt::Result {
    let transmitter = message
        .senders()
        .first()
        .map(|m| m.as_str())
        .unwrap_or("Vector__XXX");

    writeln!(
        out,
        "BO_ {} {}: {} {}",
        dbc_id(message),
        message.name(),
        PAYLOAD_BYTES,
        transmitter
    )?;

    let receivers: Vec<&str> = message.receivers().iter().map(|m| m.as_str()).collect();
    let receivers = receivers.join(",");

    for signal in message.signals() {
        let (min, max) = physical_range(signal);
        writeln!(
            out,
            " SG_ {} : {}|{}@{}{} ({},{}) [{}|{}] \"{}\" {}",
            signal.name(),
            dbc_start_bit(signal),
            signal.bit_length(),
            match signal.byte_order() {
                ByteOrder::LittleEndian => '1',
                ByteOrder::BigEndian => '0',
            },
            if signal.kind() == SignalKind::Signed { '-' } else { '+' },
            signal.scale(),
            signal.offset(),
            min,
            max,
            escape(signal.unit()),
            receivers
        )?;
    }

    out.write_char('\n')
}

/// DBC start bit: the LSB for Intel signals, the MSB in sawtooth numbering for
/// Motorola signals
fn dbc_start_bit(signal: &Signal) -> u16 {
    match signal.byte_order() {
        ByteOrder::LittleEndian => signal.start_bit(),
        ByteOrder::BigEndian => {
            let msb = signal.start_bit();
            (msb / 8) * 8 + (7 - msb % 8)
        }
    }
}

fn physical_range(signal: &Signal) -> (f64, f64) {
    let (raw_min, raw_max) = match signal.kind() {
        SignalKind::Float32 => return (0.0, 0.0),
        SignalKind::Signed => {
            let half = (1u128 << (signal.bit_length() - 1)) as f64;
            (-half, half - 1.0)
        }
        SignalKind::Unsigned | SignalKind::Bool | SignalKind::Enum => {
            (0.0, max_raw(signal.bit_length()) as f64)
        }
    };

    let a = raw_min * signal.scale() + signal.offset();
    let b = raw_max * signal.scale() + signal.offset();
    (a.min(b), a.max(b))
}

fn escape(text: &str) -> String {
    text.replace('"', "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseBuilder;
    use crate::signal::ValueTable;

    fn database() -> Database {
        let status = Message::builder(0x611, "konarm_1_status")
            .senders([Module::KonArm])
            .receivers([Module::Jetson])
            .signal(
                Signal::enumeration("status", 0, 8, ValueTable::new([(1, "ok"), (2, "fault")]))
                    .unwrap(),
            )
            .build()
            .unwrap();

        let forces = Message::builder(0x1312, "suspension_read_forces")
            .senders([Module::Jetson])
            .receivers([Module::Suspension])
            .signals([
                Signal::float32("wheel_force", 0).unwrap().with_unit("N"),
                Signal::unsigned("wheel_index", 32, 16).unwrap(),
            ])
            .extended_frame(true)
            .build()
            .unwrap();

        let mut builder = DatabaseBuilder::new();
        builder.add_module(vec![status, forces]);
        builder.build().unwrap()
    }

    #[test]
    fn test_write_messages() {
        let text = write_dbc(&database()).unwrap();

        assert!(text.starts_with("VERSION \"\""));
        assert!(text.contains("BU_: Jetson KonARM Suspension\n"));
        assert!(text.contains("BO_ 1553 konarm_1_status: 8 KonARM\n"));
        assert!(text.contains(" SG_ status : 0|8@1+ (1,0) [0|255] \"\" Jetson\n"));
        assert!(text.contains("BO_ 2147488530 suspension_read_forces: 8 Jetson\n"));
        assert!(text.contains(" SG_ wheel_force : 0|32@1+ (1,0) [0|0] \"N\" Suspension\n"));
        assert!(text.contains("VAL_ 1553 status 1 \"ok\" 2 \"fault\" ;\n"));
        assert!(text.contains("SIG_VALTYPE_ 2147488530 wheel_force : 1;\n"));
    }

    #[test]
    fn test_output_is_deterministic() {
        assert_eq!(write_dbc(&database()).unwrap(), write_dbc(&database()).unwrap());
    }

    #[test]
    fn test_signed_and_scaled_ranges() {
        let signal = Signal::signed("uid", 0, 8).unwrap();
        assert_eq!(physical_range(&signal), (-128.0, 127.0));

        let signal = Signal::unsigned("voltage", 0, 8)
            .unwrap()
            .with_scale(-0.5, 10.0)
            .unwrap();
        assert_eq!(physical_range(&signal), (-117.5, 10.0));
    }

    #[test]
    fn test_motorola_start_bit() {
        let signal = Signal::unsigned("word", 0, 16)
            .unwrap()
            .with_byte_order(ByteOrder::BigEndian);
        assert_eq!(dbc_start_bit(&signal), 7);

        let signal = Signal::unsigned("word", 12, 4)
            .unwrap()
            .with_byte_order(ByteOrder::BigEndian);
        assert_eq!(dbc_start_bit(&signal), 11);
    }

    #[test]
    fn test_extra_senders_listed() {
        let message = Message::builder(0x100, "shared")
            .senders([Module::Jetson, Module::Gpio])
            .receivers([Module::PowerBoard])
            .build()
            .unwrap();
        let mut builder = DatabaseBuilder::new();
        builder.add_module(vec![message]);

        let text = write_dbc(&builder.build().unwrap()).unwrap();
        assert!(text.contains("BO_ 256 shared: 8 Jetson\n"));
        assert!(text.contains("BO_TX_BU_ 256 : Jetson,GPIO;\n"));
    }

    struct FullSink;

    impl fmt::Write for FullSink {
        fn write_str(&mut self, _s: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn test_write_errors_propagate() {
        assert_eq!(render(&mut FullSink, &database()), Err(fmt::Error));

        let err: crate::types::CanDbError = fmt::Error.into();
        assert!(err.to_string().starts_with("Text rendering failed"));
    }
}
