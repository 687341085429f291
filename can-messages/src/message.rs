//! Message definitions
//!
//! A message is an addressed frame made of signals. Construction goes through
//! [`MessageBuilder`], which rejects overlapping or out-of-range layouts.

use crate::signal::Signal;
use crate::types::{LayoutError, Module, MAX_EXTENDED_ID, MAX_STANDARD_ID};

/// A complete CAN message definition
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    frame_id: u32,
    name: String,
    senders: Vec<Module>,
    receivers: Vec<Module>,
    signals: Vec<Signal>,
    extended_frame: bool,
}

impl Message {
    /// Start building a message with the given frame ID and name
    pub fn builder(frame_id: u32, name: impl Into<String>) -> MessageBuilder {
        MessageBuilder {
            frame_id,
            name: name.into(),
            senders: Vec::new(),
            receivers: Vec::new(),
            signals: Vec::new(),
            extended_frame: false,
        }
    }

    pub fn frame_id(&self) -> u32 {
        self.frame_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn senders(&self) -> &[Module] {
        &self.senders
    }

    pub fn receivers(&self) -> &[Module] {
        &self.receivers
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name() == name)
    }

    /// True if this message uses a 29-bit identifier
    pub fn is_extended(&self) -> bool {
        self.extended_frame
    }

    /// Largest frame ID allowed by this message's frame format
    pub fn max_frame_id(&self) -> u32 {
        max_frame_id(self.extended_frame)
    }

    /// Re-check every layout invariant of this message and its signals
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.frame_id > self.max_frame_id() {
            return Err(LayoutError::FrameIdOutOfRange {
                message: self.name.clone(),
                frame_id: self.frame_id,
                bits: if self.extended_frame { 29 } else { 11 },
            });
        }

        if self.senders.is_empty() {
            return Err(LayoutError::NoEndpoints {
                message: self.name.clone(),
                role: "senders",
            });
        }

        if self.receivers.is_empty() {
            return Err(LayoutError::NoEndpoints {
                message: self.name.clone(),
                role: "receivers",
            });
        }

        for (idx, signal) in self.signals.iter().enumerate() {
            signal.validate()?;

            for earlier in &self.signals[..idx] {
                if earlier.name() == signal.name() {
                    return Err(LayoutError::DuplicateSignalName {
                        message: self.name.clone(),
                        signal: signal.name().to_string(),
                    });
                }

                if earlier.overlaps(signal) {
                    return Err(LayoutError::Overlap {
                        message: self.name.clone(),
                        first: earlier.name().to_string(),
                        first_start: earlier.start_bit(),
                        first_end: earlier.end_bit(),
                        second: signal.name().to_string(),
                        second_start: signal.start_bit(),
                        second_end: signal.end_bit(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Independent copy of this message under a new address and name
    ///
    /// The caller is responsible for checking that `frame_id` fits the frame
    /// width; template expansion does so before calling this.
    pub(crate) fn readdressed(&self, frame_id: u32, name: String) -> Message {
        Message {
            frame_id,
            name,
            ..self.clone()
        }
    }
}

/// Largest frame ID for the given frame format
pub fn max_frame_id(extended_frame: bool) -> u32 {
    if extended_frame {
        MAX_EXTENDED_ID
    } else {
        MAX_STANDARD_ID
    }
}

/// Builder for [`Message`]
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    frame_id: u32,
    name: String,
    senders: Vec<Module>,
    receivers: Vec<Module>,
    signals: Vec<Signal>,
    extended_frame: bool,
}

impl MessageBuilder {
    /// Builder method: add sending modules
    pub fn senders(mut self, senders: impl IntoIterator<Item = Module>) -> Self {
        push_unique(&mut self.senders, senders);
        self
    }

    /// Builder method: add receiving modules
    pub fn receivers(mut self, receivers: impl IntoIterator<Item = Module>) -> Self {
        push_unique(&mut self.receivers, receivers);
        self
    }

    /// Builder method: append one signal
    pub fn signal(mut self, signal: Signal) -> Self {
        self.signals.push(signal);
        self
    }

    /// Builder method: append signals in order
    pub fn signals(mut self, signals: impl IntoIterator<Item = Signal>) -> Self {
        self.signals.extend(signals);
        self
    }

    /// Builder method: use a 29-bit extended identifier
    pub fn extended_frame(mut self, extended: bool) -> Self {
        self.extended_frame = extended;
        self
    }

    /// Validate and create the message
    pub fn build(self) -> Result<Message, LayoutError> {
        let message = Message {
            frame_id: self.frame_id,
            name: self.name,
            senders: self.senders,
            receivers: self.receivers,
            signals: self.signals,
            extended_frame: self.extended_frame,
        };
        message.validate()?;
        Ok(message)
    }
}

fn push_unique(target: &mut Vec<Module>, modules: impl IntoIterator<Item = Module>) {
    for module in modules {
        if !target.contains(&module) {
            target.push(module);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_pos() -> MessageBuilder {
        Message::builder(0x003, "get_pos")
            .senders([Module::KonArm])
            .receivers([Module::Jetson])
    }

    #[test]
    fn test_build_message() {
        let message = get_pos()
            .signals([
                Signal::float32("position", 0).unwrap().with_unit("rad"),
                Signal::float32("velocity", 32).unwrap().with_unit("rad/s"),
            ])
            .build()
            .unwrap();

        assert_eq!(message.frame_id(), 0x003);
        assert_eq!(message.name(), "get_pos");
        assert_eq!(message.senders(), &[Module::KonArm]);
        assert_eq!(message.signals().len(), 2);
        assert_eq!(message.signal("velocity").unwrap().unit(), "rad/s");
        assert!(!message.is_extended());
    }

    #[test]
    fn test_empty_payload_is_valid() {
        let message = Message::builder(0x004, "clear_errors")
            .senders([Module::Jetson])
            .receivers([Module::KonArm])
            .build()
            .unwrap();
        assert!(message.signals().is_empty());
    }

    #[test]
    fn test_overlap_names_both_signals() {
        let err = get_pos()
            .signal(Signal::float32("position", 0).unwrap())
            .signal(Signal::unsigned("index", 24, 16).unwrap())
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            LayoutError::Overlap {
                message: "get_pos".to_string(),
                first: "position".to_string(),
                first_start: 0,
                first_end: 32,
                second: "index".to_string(),
                second_start: 24,
                second_end: 40,
            }
        );
    }

    #[test]
    fn test_gaps_are_allowed() {
        let message = get_pos()
            .signal(Signal::boolean("a", 0).unwrap())
            .signal(Signal::boolean("b", 63).unwrap())
            .build()
            .unwrap();
        assert_eq!(message.signals().len(), 2);
    }

    #[test]
    fn test_duplicate_signal_name() {
        let err = get_pos()
            .signal(Signal::boolean("flag", 0).unwrap())
            .signal(Signal::boolean("flag", 1).unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, LayoutError::DuplicateSignalName { .. }));
    }

    #[test]
    fn test_frame_id_width() {
        let err = Message::builder(0x1311, "suspension_status")
            .senders([Module::Suspension])
            .receivers([Module::Jetson])
            .build()
            .unwrap_err();
        assert!(matches!(err, LayoutError::FrameIdOutOfRange { bits: 11, .. }));

        let message = Message::builder(0x1311, "suspension_status")
            .senders([Module::Suspension])
            .receivers([Module::Jetson])
            .extended_frame(true)
            .build()
            .unwrap();
        assert!(message.is_extended());

        let err = Message::builder(0x2000_0000, "too_big")
            .senders([Module::Suspension])
            .receivers([Module::Jetson])
            .extended_frame(true)
            .build()
            .unwrap_err();
        assert!(matches!(err, LayoutError::FrameIdOutOfRange { bits: 29, .. }));
    }

    #[test]
    fn test_endpoints_required_and_deduplicated() {
        let err = Message::builder(0x10, "orphan")
            .receivers([Module::Jetson])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::NoEndpoints {
                message: "orphan".to_string(),
                role: "senders"
            }
        );

        let message = Message::builder(0x10, "chatty")
            .senders([Module::Jetson, Module::Gpio, Module::Jetson])
            .receivers([Module::Gpio])
            .build()
            .unwrap();
        assert_eq!(message.senders(), &[Module::Jetson, Module::Gpio]);
    }

    #[test]
    fn test_readdressed_is_independent() {
        let template = get_pos()
            .signal(Signal::float32("position", 0).unwrap())
            .build()
            .unwrap();
        let copy = template.readdressed(0x623, "konarm_2_get_pos".to_string());

        assert_eq!(copy.frame_id(), 0x623);
        assert_eq!(copy.name(), "konarm_2_get_pos");
        assert_eq!(copy.signals(), template.signals());
        assert_eq!(template.frame_id(), 0x003);
    }
}
