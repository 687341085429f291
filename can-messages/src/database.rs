//! Message database
//!
//! Collects the messages contributed by every subsystem and validates them as
//! a whole. Per-message checks happen at construction; only the builder can
//! see collisions between subsystems.

use crate::message::Message;
use crate::types::DatabaseError;
use std::collections::HashMap;

/// Accumulates messages from all subsystems before validation
#[derive(Debug, Clone, Default)]
pub struct DatabaseBuilder {
    messages: Vec<Message>,
    modules: usize,
}

impl DatabaseBuilder {
    /// Create a new empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one subsystem's messages, keeping their order
    pub fn add_module(&mut self, messages: impl IntoIterator<Item = Message>) -> &mut Self {
        let before = self.messages.len();
        self.messages.extend(messages);
        self.modules += 1;

        log::debug!(
            "Registered module #{} with {} messages",
            self.modules,
            self.messages.len() - before
        );
        self
    }

    /// Number of messages collected so far
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Validate the collected messages and freeze them into a [`Database`]
    ///
    /// Checks run in order: frame ID uniqueness, name uniqueness, then each
    /// message's signal layout. The first violation aborts the build.
    pub fn build(self) -> Result<Database, DatabaseError> {
        log::info!(
            "Building database from {} modules ({} messages)",
            self.modules,
            self.messages.len()
        );

        let mut by_id: HashMap<u32, usize> = HashMap::with_capacity(self.messages.len());
        for (idx, message) in self.messages.iter().enumerate() {
            if let Some(&first) = by_id.get(&message.frame_id()) {
                return Err(DatabaseError::DuplicateFrameId {
                    first: self.messages[first].name().to_string(),
                    second: message.name().to_string(),
                    frame_id: message.frame_id(),
                });
            }
            by_id.insert(message.frame_id(), idx);
        }

        let mut by_name: HashMap<&str, usize> = HashMap::with_capacity(self.messages.len());
        for (idx, message) in self.messages.iter().enumerate() {
            if let Some(&first) = by_name.get(message.name()) {
                return Err(DatabaseError::DuplicateName {
                    name: message.name().to_string(),
                    first_id: self.messages[first].frame_id(),
                    second_id: message.frame_id(),
                });
            }
            by_name.insert(message.name(), idx);
        }

        for message in &self.messages {
            message.validate()?;
        }

        let by_name = by_name
            .into_iter()
            .map(|(name, idx)| (name.to_string(), idx))
            .collect();

        let database = Database {
            messages: self.messages,
            by_id,
            by_name,
        };

        let stats = database.stats();
        log::info!(
            "Database validated: {} messages ({} extended), {} signals",
            stats.num_messages,
            stats.num_extended,
            stats.num_signals
        );

        Ok(database)
    }
}

/// A validated, immutable, ordered message database
#[derive(Debug, Clone)]
pub struct Database {
    messages: Vec<Message>,
    by_id: HashMap<u32, usize>,
    by_name: HashMap<String, usize>,
}

impl Database {
    /// All messages in insertion order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Get a message by frame ID
    pub fn get_message(&self, frame_id: u32) -> Option<&Message> {
        self.by_id.get(&frame_id).map(|&idx| &self.messages[idx])
    }

    /// Get a message by name
    pub fn get_message_by_name(&self, name: &str) -> Option<&Message> {
        self.by_name.get(name).map(|&idx| &self.messages[idx])
    }

    /// Get database statistics
    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            num_messages: self.messages.len(),
            num_signals: self.messages.iter().map(|m| m.signals().len()).sum(),
            num_extended: self.messages.iter().filter(|m| m.is_extended()).count(),
        }
    }
}

impl<'a> IntoIterator for &'a Database {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// Database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Total number of messages
    pub num_messages: usize,
    /// Total number of signals across all messages
    pub num_signals: usize,
    /// Messages using 29-bit identifiers
    pub num_extended: usize,
}
