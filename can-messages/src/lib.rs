//! CAN Message Database
//!
//! Declares the CAN messages exchanged between the rover's embedded modules,
//! validates them as a whole and hands the result to a compiler collaborator.
//!
//! # Architecture
//!
//! - [`Signal`]s are bit-fields of an 8-byte payload, validated on construction
//! - [`Message`]s group non-overlapping signals under a frame ID
//! - [`frame_id`] packs command and address fields into 29-bit identifiers
//! - [`ProtocolTemplate`] replicates one protocol across identical boards
//! - [`DatabaseBuilder`] collects every subsystem and checks global uniqueness
//!
//! The library does NOT:
//! - Transmit or receive frames
//! - Decode live traffic
//! - Generate C sources (see [`DatabaseCompiler`])
//!
//! # Example Usage
//!
//! ```
//! use can_messages::{DatabaseBuilder, Message, Module, Signal};
//!
//! let status = Message::builder(0x001, "status")
//!     .senders([Module::KonArm])
//!     .receivers([Module::Jetson])
//!     .signal(Signal::unsigned("state", 0, 8)?)
//!     .build()?;
//!
//! let mut builder = DatabaseBuilder::new();
//! builder.add_module(vec![status]);
//! let database = builder.build()?;
//! assert_eq!(database.len(), 1);
//! # Ok::<(), can_messages::CanDbError>(())
//! ```

// Public modules
pub mod catalog;
pub mod codec;
pub mod compiler;
pub mod config;
pub mod database;
pub mod dbc;
pub mod docs;
pub mod frame_id;
pub mod message;
pub mod signal;
pub mod template;
pub mod types;

// Re-export main types for convenience
pub use compiler::{compile, CompileSummary, DatabaseCompiler};
pub use config::CompilerConfig;
pub use database::{Database, DatabaseBuilder, DatabaseStats};
pub use frame_id::{compose_id, BitField, FrameIdFields, FrameIdScheme};
pub use message::{Message, MessageBuilder};
pub use signal::{ByteOrder, Signal, SignalKind, ValueTable};
pub use template::{Node, ProtocolTemplate};
pub use types::{
    CanDbError, CompositionError, DatabaseError, DecodedSignal, LayoutError, Module, Result,
    SignalValue, UnknownEnumCodeError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
