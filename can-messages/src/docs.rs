//! Markdown documentation writer
//!
//! Renders a validated [`Database`] as a Markdown reference: an index of all
//! messages followed by one section per message with its addressing and a
//! signal table. Like the DBC writer, output depends only on the database.

use crate::database::{Database, DatabaseStats};
use crate::message::Message;
use crate::signal::{ByteOrder, Signal, SignalKind};
use crate::types::{Module, Result};
use std::fmt::{self, Write};

/// Render the whole database as Markdown
pub fn write_markdown(database: &Database) -> Result<String> {
    let mut out = String::new();
    render(&mut out, database)?;
    log::debug!("Rendered documentation for {} messages ({} bytes)", database.len(), out.len());
    Ok(out)
}

fn render(out: &mut impl Write, database: &Database) -> fmt::Result {
    let DatabaseStats {
        num_messages,
        num_signals,
        num_extended,
    } = database.stats();

    writeln!(out, "# CAN messages\n")?;
    writeln!(
        out,
        "{} messages, {} signals, {} extended frames.\n",
        num_messages, num_signals, num_extended
    )?;

    writeln!(out, "| ID | Name | Senders | Receivers |")?;
    writeln!(out, "|---|---|---|---|")?;
    for message in database {
        writeln!(
            out,
            "| {} | [{}](#{}) | {} | {} |",
            format_id(message),
            message.name(),
            message.name(),
            modules(message.senders()),
            modules(message.receivers())
        )?;
    }

    for message in database {
        out.write_char('\n')?;
        write_message(out, message)?;
    }

    Ok(())
}

fn write_message(out: &mut impl Write, message: &Message) -> fmt::Result {
    writeln!(out, "## {}\n", message.name())?;
    writeln!(
        out,
        "- ID: `{}` ({})",
        format_id(message),
        if message.is_extended() { "extended" } else { "standard" }
    )?;
    writeln!(out, "- Senders: {}", modules(message.senders()))?;
    writeln!(out, "- Receivers: {}", modules(message.receivers()))?;

    if message.signals().is_empty() {
        return writeln!(out, "\nNo signals.");
    }

    writeln!(out, "\n| Signal | Bits | Type | Scale | Offset | Unit | Values |")?;
    writeln!(out, "|---|---|---|---|---|---|---|")?;
    for signal in message.signals() {
        writeln!(
            out,
            "| {} | {}..{}{} | {} | {} | {} | {} | {} |",
            signal.name(),
            signal.start_bit(),
            signal.end_bit(),
            match signal.byte_order() {
                ByteOrder::LittleEndian => "",
                ByteOrder::BigEndian => " (BE)",
            },
            kind_name(signal),
            signal.scale(),
            signal.offset(),
            signal.unit(),
            values(signal)
        )?;
    }

    Ok(())
}

fn format_id(message: &Message) -> String {
    if message.is_extended() {
        format!("0x{:08X}", message.frame_id())
    } else {
        format!("0x{:03X}", message.frame_id())
    }
}

fn modules(modules: &[Module]) -> String {
    let names: Vec<&str> = modules.iter().map(|m| m.as_str()).collect();
    names.join(", ")
}

fn kind_name(signal: &Signal) -> String {
    match signal.kind() {
        SignalKind::Float32 => "float32".to_string(),
        SignalKind::Unsigned => format!("uint{}", signal.bit_length()),
        SignalKind::Signed => format!("int{}", signal.bit_length()),
        SignalKind::Bool => "bool".to_string(),
        SignalKind::Enum => format!("enum{}", signal.bit_length()),
    }
}

fn values(signal: &Signal) -> String {
    match signal.value_table() {
        Some(table) => {
            let entries: Vec<String> = table
                .entries()
                .iter()
                .map(|(code, name)| format!("{}={}", code, name))
                .collect();
            entries.join(", ")
        }
        None => String::new(),
    }
}
