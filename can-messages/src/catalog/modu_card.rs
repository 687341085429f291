//! ModuCard expansion boards
//!
//! ModuCards use 29-bit identifiers laid out by
//! [`FrameIdScheme::MODU_CARD`]: the command sits in the top four bits and the
//! card's base ID fills the lower 25. The heartbeat_1 frame ID of a card
//! therefore equals its base ID.

use super::status_table;
use crate::frame_id::{BitField, FrameIdScheme};
use crate::message::{Message, MessageBuilder};
use crate::signal::Signal;
use crate::template::{Node, ProtocolTemplate};
use crate::types::{Module, Result};

pub const CAN_PACKET_HEARTBEAT_1: u32 = 0;
pub const CAN_PACKET_HEARTBEAT_2: u32 = 1;
pub const CAN_PACKET_RESET: u32 = 2;
pub const CAN_PACKET_ENABLE: u32 = 3;
pub const CAN_PACKET_DISABLE: u32 = 4;
pub const CAN_PACKET_SOFTWARE_VERSION: u32 = 5;

/// Node offsets occupy the base address of the scheme
pub fn node_field() -> BitField {
    let scheme = FrameIdScheme::MODU_CARD;
    BitField::new(0, scheme.base_width())
}

fn command(packet: u32, name: &str) -> Result<MessageBuilder> {
    let frame_id = FrameIdScheme::MODU_CARD.compose_id(packet, 0)?;
    Ok(Message::builder(frame_id, name)
        .signal(Signal::signed("uid", 0, 32)?)
        .extended_frame(true))
}

fn uplink(packet: u32, name: &str) -> Result<MessageBuilder> {
    Ok(command(packet, name)?
        .senders([Module::ModuCard])
        .receivers([Module::Jetson]))
}

fn downlink(packet: u32, name: &str) -> Result<MessageBuilder> {
    Ok(command(packet, name)?
        .senders([Module::Jetson])
        .receivers([Module::ModuCard]))
}

/// Per-card template messages (base ID zero)
pub fn templates() -> Result<Vec<Message>> {
    Ok(vec![
        uplink(CAN_PACKET_HEARTBEAT_1, "heartbeat_1")?
            .signal(Signal::enumeration("status", 32, 8, status_table())?)
            .build()?,
        uplink(CAN_PACKET_HEARTBEAT_2, "heartbeat_2")?
            .signal(Signal::enumeration("status", 32, 8, status_table())?)
            .build()?,
        downlink(CAN_PACKET_RESET, "reset")?.build()?,
        downlink(CAN_PACKET_ENABLE, "enable")?.build()?,
        downlink(CAN_PACKET_DISABLE, "disable")?.build()?,
        uplink(CAN_PACKET_SOFTWARE_VERSION, "software_version")?
            .signals([
                Signal::unsigned("software_version_major", 32, 8)?,
                Signal::unsigned("software_version_minor", 40, 16)?,
                Signal::unsigned("software_version_build", 56, 8)?,
            ])
            .build()?,
    ])
}

/// Installed cards and their base IDs
pub fn nodes() -> Vec<Node> {
    vec![Node::new(0, "base"), Node::new(0x1310, "suspension")]
}

pub fn protocol() -> Result<ProtocolTemplate> {
    Ok(ProtocolTemplate::new("modu_card", node_field(), templates()?)?)
}

pub fn messages() -> Result<Vec<Message>> {
    Ok(protocol()?.expand(&nodes())?)
}
