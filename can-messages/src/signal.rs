//! Signal definitions
//!
//! A signal is a named bit-field inside a message payload. Every constructor
//! validates the layout up front, so a `Signal` value is always well formed.

use crate::types::{LayoutError, SignalValue, UnknownEnumCodeError, PAYLOAD_BITS};

/// Bit length of a Float32 signal
pub const FLOAT32_BITS: u16 = 32;

/// How a signal's raw bits are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// IEEE-754 single precision
    Float32,
    /// Unsigned integer
    Unsigned,
    /// Two's complement signed integer
    Signed,
    /// Boolean flag
    Bool,
    /// Integer code with a value table
    Enum,
}

/// Byte order for signal placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Little-endian (Intel format)
    #[default]
    LittleEndian,
    /// Big-endian (Motorola format)
    BigEndian,
}

/// Mapping from integer codes to symbolic names, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueTable {
    entries: Vec<(u64, String)>,
}

impl ValueTable {
    /// Create a value table from `(code, name)` pairs
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u64, S)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(code, name)| (code, name.into()))
                .collect(),
        }
    }

    /// Look up the name for a code
    pub fn name(&self, code: u64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| name.as_str())
    }

    /// Look up the code for a name
    pub fn code(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(_, n)| n == name)
            .map(|(code, _)| *code)
    }

    pub fn entries(&self) -> &[(u64, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn validate(&self, signal: &str, bit_length: u16) -> Result<(), LayoutError> {
        if self.entries.is_empty() {
            return Err(LayoutError::EmptyValueTable {
                signal: signal.to_string(),
            });
        }

        for (idx, (code, _)) in self.entries.iter().enumerate() {
            if *code > max_raw(bit_length) {
                return Err(LayoutError::EnumCodeOutOfRange {
                    signal: signal.to_string(),
                    code: *code,
                    length: bit_length,
                });
            }
            if self.entries[..idx].iter().any(|(c, _)| c == code) {
                return Err(LayoutError::DuplicateEnumCode {
                    signal: signal.to_string(),
                    code: *code,
                });
            }
        }

        Ok(())
    }
}

/// A CAN signal definition
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    name: String,
    start_bit: u16,
    bit_length: u16,
    kind: SignalKind,
    byte_order: ByteOrder,
    scale: f64,
    offset: f64,
    unit: String,
    value_table: Option<ValueTable>,
}

impl Signal {
    fn new(
        name: impl Into<String>,
        start_bit: u16,
        bit_length: u16,
        kind: SignalKind,
        value_table: Option<ValueTable>,
    ) -> Result<Self, LayoutError> {
        let signal = Self {
            name: name.into(),
            start_bit,
            bit_length,
            kind,
            byte_order: ByteOrder::default(),
            scale: 1.0,
            offset: 0.0,
            unit: String::new(),
            value_table,
        };
        signal.validate()?;
        Ok(signal)
    }

    /// 32-bit IEEE-754 float starting at `start_bit`
    pub fn float32(name: impl Into<String>, start_bit: u16) -> Result<Self, LayoutError> {
        Self::new(name, start_bit, FLOAT32_BITS, SignalKind::Float32, None)
    }

    pub fn unsigned(
        name: impl Into<String>,
        start_bit: u16,
        bit_length: u16,
    ) -> Result<Self, LayoutError> {
        Self::new(name, start_bit, bit_length, SignalKind::Unsigned, None)
    }

    pub fn signed(
        name: impl Into<String>,
        start_bit: u16,
        bit_length: u16,
    ) -> Result<Self, LayoutError> {
        Self::new(name, start_bit, bit_length, SignalKind::Signed, None)
    }

    /// Single-bit flag
    pub fn boolean(name: impl Into<String>, start_bit: u16) -> Result<Self, LayoutError> {
        Self::new(name, start_bit, 1, SignalKind::Bool, None)
    }

    /// Enumerated signal; every code in `table` must fit in `bit_length` bits
    pub fn enumeration(
        name: impl Into<String>,
        start_bit: u16,
        bit_length: u16,
        table: ValueTable,
    ) -> Result<Self, LayoutError> {
        Self::new(name, start_bit, bit_length, SignalKind::Enum, Some(table))
    }

    /// Set the engineering unit
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Set the affine raw-to-physical transform
    ///
    /// `scale` must be finite and non-zero, `offset` finite.
    pub fn with_scale(mut self, scale: f64, offset: f64) -> Result<Self, LayoutError> {
        self.scale = scale;
        self.offset = offset;
        self.validate()?;
        Ok(self)
    }

    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_bit(&self) -> u16 {
        self.start_bit
    }

    pub fn bit_length(&self) -> u16 {
        self.bit_length
    }

    /// One past the last payload bit used by this signal
    pub fn end_bit(&self) -> u16 {
        self.start_bit + self.bit_length
    }

    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn value_table(&self) -> Option<&ValueTable> {
        self.value_table.as_ref()
    }

    /// True if the bit ranges of both signals intersect
    pub fn overlaps(&self, other: &Signal) -> bool {
        self.start_bit < other.end_bit() && other.start_bit < self.end_bit()
    }

    /// Check every layout invariant of this signal
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.bit_length == 0 {
            return Err(LayoutError::ZeroLength {
                signal: self.name.clone(),
            });
        }

        if self.kind == SignalKind::Float32 && self.bit_length != FLOAT32_BITS {
            return Err(LayoutError::FloatLength {
                signal: self.name.clone(),
                length: self.bit_length,
            });
        }

        // u32 so that a start bit near u16::MAX cannot wrap
        let end = u32::from(self.start_bit) + u32::from(self.bit_length);
        if end > u32::from(PAYLOAD_BITS) {
            return Err(LayoutError::OutOfRange {
                signal: self.name.clone(),
                start: self.start_bit,
                end: end.min(u32::from(u16::MAX)) as u16,
            });
        }

        if !self.scale.is_finite() || self.scale == 0.0 || !self.offset.is_finite() {
            return Err(LayoutError::InvalidScale {
                signal: self.name.clone(),
                scale: self.scale,
            });
        }

        match (&self.kind, &self.value_table) {
            (SignalKind::Enum, Some(table)) => table.validate(&self.name, self.bit_length),
            (SignalKind::Enum, None) => Err(LayoutError::EmptyValueTable {
                signal: self.name.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Convert a raw field value into its physical value
    ///
    /// Bits above `bit_length` are ignored. Enum codes missing from the value
    /// table are rejected.
    pub fn decode(&self, raw: u64) -> Result<SignalValue, UnknownEnumCodeError> {
        let raw = raw & max_raw(self.bit_length);

        let value = match self.kind {
            SignalKind::Float32 => {
                let value = f32::from_bits(raw as u32) as f64;
                SignalValue::Float(value * self.scale + self.offset)
            }
            SignalKind::Bool => SignalValue::Boolean(raw != 0),
            SignalKind::Unsigned if self.is_unscaled() => SignalValue::Unsigned(raw),
            SignalKind::Unsigned => SignalValue::Float(raw as f64 * self.scale + self.offset),
            SignalKind::Signed => {
                let value = sign_extend(raw, self.bit_length);
                if self.is_unscaled() {
                    SignalValue::Integer(value)
                } else {
                    SignalValue::Float(value as f64 * self.scale + self.offset)
                }
            }
            SignalKind::Enum => {
                let label = self
                    .value_table
                    .as_ref()
                    .and_then(|table| table.name(raw))
                    .ok_or_else(|| UnknownEnumCodeError {
                        signal: self.name.clone(),
                        code: raw,
                    })?;
                SignalValue::Enum {
                    code: raw,
                    label: label.to_string(),
                }
            }
        };

        Ok(value)
    }

    /// Convert a physical value into the raw field value
    ///
    /// Integer kinds round to the nearest raw step and saturate at the field
    /// limits.
    pub fn encode(&self, physical: f64) -> u64 {
        let scaled = (physical - self.offset) / self.scale;

        match self.kind {
            SignalKind::Float32 => u64::from((scaled as f32).to_bits()),
            SignalKind::Bool => u64::from(scaled != 0.0),
            SignalKind::Unsigned | SignalKind::Enum => {
                let max = max_raw(self.bit_length);
                let rounded = scaled.round();
                if rounded <= 0.0 {
                    0
                } else if rounded >= max as f64 {
                    max
                } else {
                    rounded as u64
                }
            }
            SignalKind::Signed => {
                let bits = u32::from(self.bit_length);
                let min = -(1i128 << (bits - 1));
                let max = (1i128 << (bits - 1)) - 1;
                let value = (scaled.round() as i128).clamp(min, max) as i64;
                (value as u64) & max_raw(self.bit_length)
            }
        }
    }

    fn is_unscaled(&self) -> bool {
        self.scale == 1.0 && self.offset == 0.0
    }
}

/// Largest raw value representable in `bit_length` bits
pub fn max_raw(bit_length: u16) -> u64 {
    if bit_length >= 64 {
        u64::MAX
    } else {
        (1u64 << bit_length) - 1
    }
}

/// Sign-extend a value from N bits to 64 bits
fn sign_extend(value: u64, bit_length: u16) -> i64 {
    if bit_length >= 64 {
        return value as i64;
    }

    let sign_bit = 1u64 << (bit_length - 1);
    if (value & sign_bit) != 0 {
        let mask = !0u64 << bit_length;
        (value | mask) as i64
    } else {
        value as i64
    }
}
