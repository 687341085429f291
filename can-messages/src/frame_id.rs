//! Structured frame identifiers
//!
//! Extended (29-bit) identifiers are not opaque handles. They are split into
//! fixed fields:
//!
//! ```text
//! | 4 bits  |  10 bits  |   15 bits   |
//! | Command |  Base ID  | Command ID  |
//! ```
//!
//! `compose_id(command, base)` places the command in the top field and treats
//! the lower 25 bits (base ID and command ID together) as the module base
//! address.

use crate::types::CompositionError;

/// Number of usable bits in an extended identifier
pub const EXTENDED_ID_BITS: u32 = 29;

/// A contiguous run of bits inside a frame ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Position of the least significant bit
    pub shift: u32,
    /// Number of bits
    pub width: u32,
}

impl BitField {
    pub const fn new(shift: u32, width: u32) -> Self {
        Self { shift, width }
    }

    /// Mask selecting this field's bits in place
    ///
    /// Bits shifted past bit 31 are dropped; a field starting at or above bit
    /// 32 has an empty mask.
    pub const fn mask(&self) -> u32 {
        let bits = if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        };
        match bits.checked_shl(self.shift) {
            Some(mask) => mask,
            None => 0,
        }
    }

    /// Largest value the field can hold
    pub const fn max_value(&self) -> u32 {
        match self.mask().checked_shr(self.shift) {
            Some(max) => max,
            None => 0,
        }
    }

    /// True if the two fields share at least one bit
    pub const fn overlaps(&self, other: &BitField) -> bool {
        self.mask() & other.mask() != 0
    }

    /// Shift `value` into position, failing if it does not fit
    pub fn place(&self, field: &'static str, value: u32) -> Result<u32, CompositionError> {
        match value.checked_shl(self.shift) {
            Some(placed) if value <= self.max_value() => Ok(placed),
            _ => Err(CompositionError::ValueOutOfRange {
                field,
                value,
                width: self.width,
            }),
        }
    }

    /// Read this field back out of a frame ID
    pub const fn extract(&self, frame_id: u32) -> u32 {
        match (frame_id & self.mask()).checked_shr(self.shift) {
            Some(value) => value,
            None => 0,
        }
    }

    /// Check that the field is non-empty and ends within 29 bits
    pub fn check_range(&self, field: &'static str) -> Result<(), CompositionError> {
        let fits = match self.shift.checked_add(self.width) {
            Some(end) => end <= EXTENDED_ID_BITS,
            None => false,
        };
        if self.width == 0 || !fits {
            return Err(CompositionError::FieldOutOfRange {
                field,
                shift: self.shift,
                width: self.width,
            });
        }
        Ok(())
    }
}

/// Field values recovered from a frame ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameIdFields {
    pub command: u32,
    pub base_id: u32,
    pub command_id: u32,
}

impl FrameIdFields {
    /// Base ID and command ID as the single address passed to `compose_id`
    pub fn base(&self, scheme: &FrameIdScheme) -> u32 {
        (self.base_id << scheme.base_id.shift) | (self.command_id << scheme.command_id.shift)
    }
}

/// Protocol-wide split of an extended frame ID into command/address fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameIdScheme {
    command: BitField,
    base_id: BitField,
    command_id: BitField,
}

impl FrameIdScheme {
    /// The 4 | 10 | 15 split used by the ModuCard modules
    pub const MODU_CARD: FrameIdScheme = FrameIdScheme {
        command: BitField::new(25, 4),
        base_id: BitField::new(15, 10),
        command_id: BitField::new(0, 15),
    };

    /// Create a scheme, checking that the fields are disjoint and fit 29 bits
    pub fn new(
        command: BitField,
        base_id: BitField,
        command_id: BitField,
    ) -> Result<Self, CompositionError> {
        let fields = [
            ("command", command),
            ("base_id", base_id),
            ("command_id", command_id),
        ];

        for (idx, (name, field)) in fields.iter().enumerate() {
            field.check_range(*name)?;
            for (other_name, other) in &fields[..idx] {
                if field.overlaps(other) {
                    return Err(CompositionError::OverlappingFields {
                        first: *other_name,
                        second: *name,
                    });
                }
            }
        }

        Ok(Self {
            command,
            base_id,
            command_id,
        })
    }

    pub fn command_field(&self) -> BitField {
        self.command
    }

    pub fn base_id_field(&self) -> BitField {
        self.base_id
    }

    pub fn command_id_field(&self) -> BitField {
        self.command_id
    }

    /// Mask covering the base address (base ID plus command ID)
    pub fn address_mask(&self) -> u32 {
        self.base_id.mask() | self.command_id.mask()
    }

    /// Width in bits of the field that `command` is shifted over
    pub fn base_width(&self) -> u32 {
        self.command.shift
    }

    /// `(command << base_width) | base`
    ///
    /// `base` must only use the address bits of the scheme, so distinct
    /// `(command, base)` pairs always yield distinct IDs.
    pub fn compose_id(&self, command: u32, base: u32) -> Result<u32, CompositionError> {
        let command = self.command.place("command", command)?;
        if base & !self.address_mask() != 0 {
            return Err(CompositionError::ValueOutOfRange {
                field: "base",
                value: base,
                width: self.base_width(),
            });
        }
        Ok(command | base)
    }

    /// Compose an ID from all three fields
    pub fn compose(
        &self,
        command: u32,
        base_id: u32,
        command_id: u32,
    ) -> Result<u32, CompositionError> {
        Ok(self.command.place("command", command)?
            | self.base_id.place("base_id", base_id)?
            | self.command_id.place("command_id", command_id)?)
    }

    /// Split an ID back into its fields
    pub fn decompose(&self, frame_id: u32) -> FrameIdFields {
        FrameIdFields {
            command: self.command.extract(frame_id),
            base_id: self.base_id.extract(frame_id),
            command_id: self.command_id.extract(frame_id),
        }
    }
}

impl Default for FrameIdScheme {
    fn default() -> Self {
        Self::MODU_CARD
    }
}

/// Compose an extended frame ID with the protocol-wide scheme
pub fn compose_id(command: u32, base: u32) -> Result<u32, CompositionError> {
    FrameIdScheme::MODU_CARD.compose_id(command, base)
}
