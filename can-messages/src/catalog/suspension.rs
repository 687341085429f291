//! Suspension controller
//!
//! Wheels are indexed clockwise starting at the front right: on a four-wheel
//! rover 0 is front right, 1 rear right, 2 rear left, 3 front left.

use super::status_table;
use crate::message::Message;
use crate::signal::Signal;
use crate::types::{Module, Result};

pub fn messages() -> Result<Vec<Message>> {
    // IDs above 0x7FF need 29-bit framing
    Ok(vec![
        Message::builder(0x1311, "suspension_status")
            .senders([Module::Suspension])
            .receivers([Module::Jetson])
            .signal(Signal::enumeration("status", 0, 8, status_table())?)
            .extended_frame(true)
            .build()?,
        Message::builder(0x1312, "suspension_read_forces")
            .senders([Module::Jetson])
            .receivers([Module::Suspension])
            .signals([
                Signal::float32("wheel_force", 0)?.with_unit("N"),
                Signal::unsigned("wheel_index", 32, 16)?,
            ])
            .extended_frame(true)
            .build()?,
        Message::builder(0x1313, "suspension_read_positions")
            .senders([Module::Jetson])
            .receivers([Module::Suspension])
            .signals([
                Signal::float32("suspension_angle", 0)?.with_unit("rad"),
                Signal::unsigned("wheel_index", 32, 16)?,
            ])
            .extended_frame(true)
            .build()?,
    ])
}
