//! KonARM joint controllers
//!
//! Six identical joint boards share one protocol. Template IDs use the low
//! four bits; each joint adds its offset (0x610, 0x620, ... 0x660) in bits
//! 4..11.

use crate::frame_id::BitField;
use crate::message::{Message, MessageBuilder};
use crate::signal::{Signal, ValueTable};
use crate::template::{Node, ProtocolTemplate};
use crate::types::{Module, Result};

/// Bits carrying the joint offset
pub const NODE_FIELD: BitField = BitField::new(4, 7);

fn joint_status() -> ValueTable {
    ValueTable::new([
        (1, "ok"),
        (2, "fault"),
        (3, "overheat"),
        (4, "emergency_stop"),
    ])
}

fn error_status() -> ValueTable {
    ValueTable::new([(0, "ok"), (1, "fault")])
}

fn control_mode() -> ValueTable {
    ValueTable::new([
        (1, "velocity_control"),
        (2, "position_control"),
        (3, "torque_control"),
    ])
}

const ERROR_FLAGS: [&str; 13] = [
    "temp_engine_overheating",
    "temp_driver_overheating",
    "temp_board_overheating",
    "temp_engine_sensor_disconnect",
    "temp_driver_sensor_disconnect",
    "temp_board_sensor_disconnect",
    "encoder_arm_disconnect",
    "encoder_motor_disconnect",
    "board_overvoltage",
    "board_undervoltage",
    "can_disconnected",
    "can_error",
    "controler_motor_limit_position",
];

fn to_arm(frame_id: u32, name: &str) -> MessageBuilder {
    Message::builder(frame_id, name)
        .senders([Module::Jetson])
        .receivers([Module::KonArm])
}

fn from_arm(frame_id: u32, name: &str) -> MessageBuilder {
    Message::builder(frame_id, name)
        .senders([Module::KonArm])
        .receivers([Module::Jetson])
}

/// The per-joint template messages
pub fn templates() -> Result<Vec<Message>> {
    let error_flags = ERROR_FLAGS
        .iter()
        .zip(0u16..)
        .map(|(name, bit)| Signal::enumeration(*name, bit, 1, error_status()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(vec![
        from_arm(0x001, "status")
            .signal(Signal::enumeration("status", 0, 8, joint_status())?)
            .build()?,
        to_arm(0x002, "set_pos")
            .signals([
                Signal::float32("position", 0)?.with_unit("rad"),
                Signal::float32("velocity", 32)?.with_unit("rad/s"),
            ])
            .build()?,
        from_arm(0x003, "get_pos")
            .signals([
                Signal::float32("position", 0)?.with_unit("rad"),
                Signal::float32("velocity", 32)?.with_unit("rad/s"),
            ])
            .build()?,
        from_arm(0x00B, "get_torque")
            .signal(Signal::float32("torque", 0)?.with_unit("Nm"))
            .build()?,
        from_arm(0x00C, "set_torque")
            .signal(Signal::float32("torque", 0)?.with_unit("Nm"))
            .build()?,
        to_arm(0x004, "clear_errors").build()?,
        to_arm(0x005, "get_errors").signals(error_flags).build()?,
        to_arm(0x006, "set_control_mode")
            .signal(Signal::enumeration("control_mode", 0, 8, control_mode())?)
            .build()?,
        to_arm(0x007, "get_config")
            .signal(Signal::unsigned("config_part", 0, 64)?)
            .build()?,
        from_arm(0x008, "send_config")
            .signal(Signal::unsigned("config_part", 0, 64)?)
            .build()?,
        to_arm(0x009, "set_and_reset").build()?,
        to_arm(0x00A, "set_effector_position")
            .signal(Signal::unsigned("pos_percentage", 0, 8)?.with_unit("%"))
            .build()?,
    ])
}

/// The six joints, base to effector
pub fn nodes() -> Vec<Node> {
    (1..=6u32)
        .map(|joint| Node::new(0x600 + (joint << 4), joint.to_string()))
        .collect()
}

pub fn protocol() -> Result<ProtocolTemplate> {
    Ok(ProtocolTemplate::new("konarm", NODE_FIELD, templates()?)?)
}

pub fn messages() -> Result<Vec<Message>> {
    Ok(protocol()?.expand(&nodes())?)
}
