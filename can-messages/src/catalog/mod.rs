//! Message definitions for every subsystem on the bus
//!
//! Each submodule exposes `messages()`, returning that subsystem's contribution
//! in declaration order. [`register_all`] feeds them to a builder in the order
//! the generated files expect.

pub mod konarm;
pub mod modu_card;
pub mod suspension;

use crate::database::DatabaseBuilder;
use crate::signal::ValueTable;
use crate::types::Result;

/// Generic module status shared by several subsystems
pub fn status_table() -> ValueTable {
    ValueTable::new([
        (0, "ok"),
        (1, "fault"),
        (2, "disconnected"),
        (3, "warning"),
        (4, "initializing"),
    ])
}

/// Add every subsystem to `builder`
pub fn register_all(builder: &mut DatabaseBuilder) -> Result<()> {
    builder.add_module(konarm::messages()?);
    builder.add_module(suspension::messages()?);
    builder.add_module(modu_card::messages()?);
    Ok(())
}

/// Builder pre-loaded with every subsystem
pub fn builder() -> Result<DatabaseBuilder> {
    let mut builder = DatabaseBuilder::new();
    register_all(&mut builder)?;
    Ok(builder)
}
