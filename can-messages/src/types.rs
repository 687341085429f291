//! Core types for the CAN message database
//!
//! This module defines the module identities that appear as senders and
//! receivers, the values produced by the decode helpers, and the error
//! taxonomy shared by every stage of the build.

use std::fmt;

/// Result type for database operations
pub type Result<T> = std::result::Result<T, CanDbError>;

/// Number of payload bits available to signals (8-byte payload)
pub const PAYLOAD_BITS: u16 = 64;

/// Payload size in bytes
pub const PAYLOAD_BYTES: usize = (PAYLOAD_BITS / 8) as usize;

/// Largest standard (11-bit) frame ID
pub const MAX_STANDARD_ID: u32 = 0x7FF;

/// Largest extended (29-bit) frame ID
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

/// Physical node classes on the bus
///
/// Used only as an address label for senders and receivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Module {
    Jetson,
    ODrive,
    PowerBoard,
    SensorBoard,
    MetalDetectorBoard,
    KonArm,
    Vesc,
    Gpio,
    Geiger,
    ModuCard,
    Suspension,
}

impl Module {
    /// Every module, in declaration order
    pub const ALL: [Module; 11] = [
        Module::Jetson,
        Module::ODrive,
        Module::PowerBoard,
        Module::SensorBoard,
        Module::MetalDetectorBoard,
        Module::KonArm,
        Module::Vesc,
        Module::Gpio,
        Module::Geiger,
        Module::ModuCard,
        Module::Suspension,
    ];

    /// Node name as it appears in generated database files
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Jetson => "Jetson",
            Module::ODrive => "ODrive",
            Module::PowerBoard => "PowerBoard",
            Module::SensorBoard => "SensorBoard",
            Module::MetalDetectorBoard => "MetalDetectorBoard",
            Module::KonArm => "KonARM",
            Module::Vesc => "VESC",
            Module::Gpio => "GPIO",
            Module::Geiger => "GEIGER",
            Module::ModuCard => "ModuCard",
            Module::Suspension => "Suspension",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while declaring signals and messages
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("Signal '{signal}' has zero bit length")]
    ZeroLength { signal: String },

    #[error("Signal '{signal}' occupies bits {start}..{end}, payload has only {} bits", PAYLOAD_BITS)]
    OutOfRange { signal: String, start: u16, end: u16 },

    #[error("Float32 signal '{signal}' must be 32 bits long, got {length}")]
    FloatLength { signal: String, length: u16 },

    #[error("Signal '{signal}' has invalid scale {scale}")]
    InvalidScale { signal: String, scale: f64 },

    #[error("Enum signal '{signal}' has an empty value table")]
    EmptyValueTable { signal: String },

    #[error("Enum signal '{signal}' declares code {code} more than once")]
    DuplicateEnumCode { signal: String, code: u64 },

    #[error("Enum signal '{signal}' code {code} does not fit in {length} bits")]
    EnumCodeOutOfRange { signal: String, code: u64, length: u16 },

    #[error(
        "Message '{message}': signals '{first}' (bits {first_start}..{first_end}) and \
         '{second}' (bits {second_start}..{second_end}) overlap"
    )]
    Overlap {
        message: String,
        first: String,
        first_start: u16,
        first_end: u16,
        second: String,
        second_start: u16,
        second_end: u16,
    },

    #[error("Message '{message}' declares signal '{signal}' more than once")]
    DuplicateSignalName { message: String, signal: String },

    #[error("Message '{message}': frame ID 0x{frame_id:X} does not fit in {bits} bits")]
    FrameIdOutOfRange {
        message: String,
        frame_id: u32,
        bits: u8,
    },

    #[error("Message '{message}' has no {role}")]
    NoEndpoints { message: String, role: &'static str },
}

/// Errors raised while composing frame IDs or expanding templates
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompositionError {
    #[error("Frame ID fields '{first}' and '{second}' overlap")]
    OverlappingFields {
        first: &'static str,
        second: &'static str,
    },

    #[error("Frame ID field '{field}' (shift {shift}, width {width}) exceeds 29 bits")]
    FieldOutOfRange {
        field: &'static str,
        shift: u32,
        width: u32,
    },

    #[error("Value 0x{value:X} does not fit the {width}-bit '{field}' field")]
    ValueOutOfRange {
        field: &'static str,
        value: u32,
        width: u32,
    },

    #[error(
        "Template '{template}' of protocol '{protocol}' uses reserved node bits \
         (frame ID 0x{frame_id:X}, reserved mask 0x{mask:X})"
    )]
    ReservedBitsSet {
        protocol: String,
        template: String,
        frame_id: u32,
        mask: u32,
    },

    #[error(
        "Node '{label}' of protocol '{protocol}' has offset 0x{offset:X} outside the \
         node field 0x{mask:X}"
    )]
    OffsetOutsideField {
        protocol: String,
        label: String,
        offset: u32,
        mask: u32,
    },

    #[error("Protocol '{protocol}' declares node '{label}' (offset 0x{offset:X}) twice")]
    DuplicateNode {
        protocol: String,
        label: String,
        offset: u32,
    },

    #[error("Expanded message '{message}' has frame ID 0x{frame_id:X} beyond its frame width")]
    IdOverflow { message: String, frame_id: u32 },
}

/// Global consistency errors found while building the database
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatabaseError {
    #[error("Messages '{first}' and '{second}' share frame ID 0x{frame_id:X}")]
    DuplicateFrameId {
        first: String,
        second: String,
        frame_id: u32,
    },

    #[error("Messages with frame IDs 0x{first_id:X} and 0x{second_id:X} share the name '{name}'")]
    DuplicateName {
        name: String,
        first_id: u32,
        second_id: u32,
    },

    #[error("Invalid layout: {0}")]
    Layout(#[from] LayoutError),
}

/// A raw value that is not present in an enum signal's value table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Signal '{signal}' has no value table entry for code {code}")]
pub struct UnknownEnumCodeError {
    pub signal: String,
    pub code: u64,
}

/// Top-level error for the whole build pipeline
#[derive(Debug, thiserror::Error)]
pub enum CanDbError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    UnknownEnumCode(#[from] UnknownEnumCodeError),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Compiler collaborator failed: {0}")]
    Collaborator(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Text rendering failed: {0}")]
    Format(#[from] std::fmt::Error),
}

/// A decoded signal with its physical value
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSignal {
    /// Signal name
    pub name: String,
    /// Physical value
    pub value: SignalValue,
    /// Engineering unit (e.g., "rad", "Nm")
    pub unit: Option<String>,
    /// Raw value before scaling
    pub raw_value: u64,
}

/// Physical signal values produced by the decode helpers
#[derive(Debug, Clone, PartialEq)]
pub enum SignalValue {
    /// Signed integer value (no scaling applied)
    Integer(i64),
    /// Unsigned integer value (no scaling applied)
    Unsigned(u64),
    /// Floating-point value (after scaling/offset)
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Enum code with its symbolic name
    Enum { code: u64, label: String },
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Integer(v) => write!(f, "{}", v),
            SignalValue::Unsigned(v) => write!(f, "{}", v),
            SignalValue::Float(v) => write!(f, "{:.3}", v),
            SignalValue::Boolean(v) => write!(f, "{}", if *v { "true" } else { "false" }),
            SignalValue::Enum { code, label } => write!(f, "{} ({})", label, code),
        }
    }
}

impl SignalValue {
    /// Convert signal value to f64
    pub fn as_f64(&self) -> f64 {
        match self {
            SignalValue::Integer(v) => *v as f64,
            SignalValue::Unsigned(v) => *v as f64,
            SignalValue::Float(v) => *v,
            SignalValue::Boolean(v) => if *v { 1.0 } else { 0.0 },
            SignalValue::Enum { code, .. } => *code as f64,
        }
    }

    /// Symbolic name for enum values
    pub fn label(&self) -> Option<&str> {
        match self {
            SignalValue::Enum { label, .. } => Some(label),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_names() {
        assert_eq!(Module::KonArm.to_string(), "KonARM");
        assert_eq!(Module::Vesc.as_str(), "VESC");
        assert_eq!(Module::ALL.len(), 11);
    }

    #[test]
    fn test_signal_value_display() {
        assert_eq!(format!("{}", SignalValue::Integer(42)), "42");
        assert_eq!(format!("{}", SignalValue::Unsigned(u64::MAX)), "18446744073709551615");
        assert_eq!(format!("{}", SignalValue::Float(3.14159)), "3.142");
        assert_eq!(format!("{}", SignalValue::Boolean(true)), "true");
        let status = SignalValue::Enum { code: 1, label: "fault".to_string() };
        assert_eq!(format!("{}", status), "fault (1)");
        assert_eq!(status.label(), Some("fault"));
        assert_eq!(status.as_f64(), 1.0);
    }

    #[test]
    fn test_error_messages_name_offenders() {
        let err = DatabaseError::DuplicateFrameId {
            first: "konarm_1_status".to_string(),
            second: "other_status".to_string(),
            frame_id: 0x611,
        };
        let text = err.to_string();
        assert!(text.contains("konarm_1_status"));
        assert!(text.contains("other_status"));
        assert!(text.contains("0x611"));

        let err = LayoutError::FrameIdOutOfRange {
            message: "big".to_string(),
            frame_id: 0x1311,
            bits: 11,
        };
        assert!(err.to_string().contains("0x1311"));
        assert!(err.to_string().contains("11 bits"));
    }
}
