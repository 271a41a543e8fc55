//! Opcode-tagged message registry.
//!
//! Each message kind contributes one [`MessageCodec`]. The registry assigns
//! opcodes, sizes the opcode field from the number of registered kinds, checks
//! every layout against the channel width once at build time, and then
//! dispatches encode/decode through the table.

use std::collections::BTreeMap;

use crate::bits::{bits_for, BitCursor, MAX_CHANNEL_WIDTH};
use crate::config::ProtocolConfig;
use crate::coord::GridPos;
use crate::error::{DecodeError, EncodeError, RegistryError};
use crate::field::{AngleField, DecodeContext, EnumField, FieldCodec, WindowField};
use crate::kind::UnitKind;
use crate::message::{Message, MessageKind};

/// Field layout and (de)serialization for one message kind.
pub trait MessageCodec: Send + Sync {
    fn kind(&self) -> MessageKind;

    /// Widths of the payload fields, in wire order.
    fn field_widths(&self) -> Vec<u32>;

    fn payload_bits(&self) -> u32 {
        self.field_widths().iter().sum()
    }

    fn write(&self, message: &Message, cursor: &mut BitCursor) -> Result<(), EncodeError>;

    fn read(&self, cursor: &mut BitCursor, ctx: &DecodeContext) -> Result<Message, DecodeError>;
}

/// Layout summary of one registered kind.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VariantLayout {
    pub kind: MessageKind,
    pub opcode: u32,
    pub opcode_bits: u32,
    pub field_widths: Vec<u32>,
    pub total_bits: u32,
}

struct Entry {
    opcode: u32,
    codec: Box<dyn MessageCodec>,
}

pub struct Registry {
    width: u32,
    opcode_bits: u32,
    entries: BTreeMap<MessageKind, Entry>,
    by_opcode: Vec<MessageKind>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("width", &self.width)
            .field("opcode_bits", &self.opcode_bits)
            .field("kinds", &self.by_opcode)
            .finish()
    }
}

impl Registry {
    pub fn builder(config: &ProtocolConfig) -> RegistryBuilder {
        RegistryBuilder {
            width: config.channel_width_bits,
            codecs: Vec::new(),
        }
    }

    /// Registry with every built-in message kind.
    pub fn standard(config: &ProtocolConfig) -> Result<Self, RegistryError> {
        config.validate()?;
        let window_bits = config.window_bits;
        Registry::builder(config)
            .register(BareCodec::new(Message::Empty))
            .register(BareCodec::new(Message::LeaderClaim))
            .register(BareCodec::new(Message::FollowerClaim))
            .register(PatrolCodec::new())
            .register(PositionCodec::attack(window_bits))
            .register(SightingCodec::new(window_bits))
            .register(PositionCodec::missing(window_bits))
            .register(PositionCodec::base(window_bits))
            .build()
    }

    pub fn channel_width(&self) -> u32 {
        self.width
    }

    pub fn opcode_bits(&self) -> u32 {
        self.opcode_bits
    }

    pub fn contains(&self, kind: MessageKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn encode(&self, message: &Message) -> Result<u32, EncodeError> {
        let kind = message.kind();
        let entry = self
            .entries
            .get(&kind)
            .ok_or(EncodeError::Unregistered(kind))?;

        let mut cursor = BitCursor::empty(self.width);
        if self.opcode_bits > 0 {
            cursor.write_bits(self.opcode_bits, entry.opcode);
        }
        entry.codec.write(message, &mut cursor)?;
        Ok(cursor.into_value())
    }

    /// Classifies a flag from its opcode alone, without decoding the payload.
    pub fn opcode(&self, raw: u32) -> Result<MessageKind, DecodeError> {
        self.check_width(raw)?;
        let opcode = self.opcode_of(raw);
        self.by_opcode
            .get(opcode as usize)
            .copied()
            .ok_or(DecodeError::UnknownOpcode { opcode })
    }

    pub fn decode(&self, raw: u32, ctx: &DecodeContext) -> Result<Message, DecodeError> {
        let kind = self.opcode(raw)?;
        let entry = self.entries.get(&kind).ok_or(DecodeError::UnknownOpcode {
            opcode: self.opcode_of(raw),
        })?;

        let mut cursor = BitCursor::new(raw, self.width);
        cursor.seek(self.opcode_bits);
        let message = entry.codec.read(&mut cursor, ctx)?;

        let rest = cursor.remaining_bits();
        if rest > 0 {
            let bits = cursor.read_bits(rest);
            if bits != 0 {
                return Err(DecodeError::TrailingBits { kind, bits });
            }
        }
        Ok(message)
    }

    /// Every registered kind in opcode order.
    pub fn layouts(&self) -> Vec<VariantLayout> {
        self.by_opcode
            .iter()
            .filter_map(|kind| self.entries.get(kind).map(|entry| (kind, entry)))
            .map(|(kind, entry)| {
                let field_widths = entry.codec.field_widths();
                VariantLayout {
                    kind: *kind,
                    opcode: entry.opcode,
                    opcode_bits: self.opcode_bits,
                    total_bits: self.opcode_bits + field_widths.iter().sum::<u32>(),
                    field_widths,
                }
            })
            .collect()
    }

    fn opcode_of(&self, raw: u32) -> u32 {
        if self.opcode_bits == 0 {
            0
        } else {
            BitCursor::new(raw, self.width).peek_bits(self.opcode_bits)
        }
    }

    fn check_width(&self, raw: u32) -> Result<(), DecodeError> {
        if self.width < MAX_CHANNEL_WIDTH && (raw >> self.width) != 0 {
            return Err(DecodeError::TooWide {
                value: raw,
                width: self.width,
            });
        }
        Ok(())
    }
}

/// Collects codecs; opcodes are assigned on [`build`](RegistryBuilder::build)
/// by ascending [`MessageKind`] order, so registration order does not matter.
pub struct RegistryBuilder {
    width: u32,
    codecs: Vec<Box<dyn MessageCodec>>,
}

impl RegistryBuilder {
    pub fn register(mut self, codec: impl MessageCodec + 'static) -> Self {
        self.codecs.push(Box::new(codec));
        self
    }

    pub fn build(self) -> Result<Registry, RegistryError> {
        if self.width == 0 || self.width > MAX_CHANNEL_WIDTH {
            return Err(RegistryError::ChannelWidth(self.width));
        }
        if self.codecs.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut by_kind: BTreeMap<MessageKind, Box<dyn MessageCodec>> = BTreeMap::new();
        for codec in self.codecs {
            let kind = codec.kind();
            if by_kind.insert(kind, codec).is_some() {
                return Err(RegistryError::DuplicateKind(kind));
            }
        }

        let opcode_bits = bits_for(by_kind.len());
        let mut entries = BTreeMap::new();
        let mut by_opcode = Vec::with_capacity(by_kind.len());
        for (opcode, (kind, codec)) in by_kind.into_iter().enumerate() {
            let needed = opcode_bits + codec.payload_bits();
            if needed > self.width {
                return Err(RegistryError::PayloadTooWide {
                    kind,
                    needed,
                    capacity: self.width,
                });
            }
            by_opcode.push(kind);
            entries.insert(
                kind,
                Entry {
                    opcode: opcode as u32,
                    codec,
                },
            );
        }

        Ok(Registry {
            width: self.width,
            opcode_bits,
            entries,
            by_opcode,
        })
    }
}

fn mismatch(codec: MessageKind, message: &Message) -> EncodeError {
    EncodeError::KindMismatch {
        codec,
        message: message.kind(),
    }
}

/// Kinds with no payload.
#[derive(Debug, Clone, Copy)]
pub struct BareCodec {
    message: Message,
}

impl BareCodec {
    pub fn new(message: Message) -> Self {
        Self { message }
    }
}

impl MessageCodec for BareCodec {
    fn kind(&self) -> MessageKind {
        self.message.kind()
    }

    fn field_widths(&self) -> Vec<u32> {
        Vec::new()
    }

    fn write(&self, message: &Message, _cursor: &mut BitCursor) -> Result<(), EncodeError> {
        if *message == self.message {
            Ok(())
        } else {
            Err(mismatch(self.kind(), message))
        }
    }

    fn read(&self, _cursor: &mut BitCursor, _ctx: &DecodeContext) -> Result<Message, DecodeError> {
        Ok(self.message)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PatrolCodec {
    heading: AngleField,
}

impl PatrolCodec {
    pub fn new() -> Self {
        Self {
            heading: AngleField::new("outbound_direction_degrees"),
        }
    }
}

impl Default for PatrolCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageCodec for PatrolCodec {
    fn kind(&self) -> MessageKind {
        MessageKind::PatrolAssignment
    }

    fn field_widths(&self) -> Vec<u32> {
        vec![self.heading.bits()]
    }

    fn write(&self, message: &Message, cursor: &mut BitCursor) -> Result<(), EncodeError> {
        match message {
            Message::PatrolAssignment {
                outbound_direction_degrees,
            } => self.heading.write(cursor, outbound_direction_degrees),
            other => Err(mismatch(self.kind(), other)),
        }
    }

    fn read(&self, cursor: &mut BitCursor, ctx: &DecodeContext) -> Result<Message, DecodeError> {
        Ok(Message::PatrolAssignment {
            outbound_direction_degrees: self.heading.read(cursor, ctx)?,
        })
    }
}

/// Kinds whose whole payload is one window-encoded position.
#[derive(Clone, Copy)]
pub struct PositionCodec {
    kind: MessageKind,
    position: WindowField,
    wrap: fn(GridPos) -> Message,
    unwrap: fn(&Message) -> Option<GridPos>,
}

impl PositionCodec {
    pub fn attack(window_bits: u32) -> Self {
        Self {
            kind: MessageKind::AttackAssignment,
            position: WindowField::new("target", window_bits),
            wrap: |target| Message::AttackAssignment { target },
            unwrap: |message| match message {
                Message::AttackAssignment { target } => Some(*target),
                _ => None,
            },
        }
    }

    pub fn missing(window_bits: u32) -> Self {
        Self {
            kind: MessageKind::TargetMissing,
            position: WindowField::new("position", window_bits),
            wrap: |position| Message::TargetMissing { position },
            unwrap: |message| match message {
                Message::TargetMissing { position } => Some(*position),
                _ => None,
            },
        }
    }

    pub fn base(window_bits: u32) -> Self {
        Self {
            kind: MessageKind::BaseSighted,
            position: WindowField::new("position", window_bits),
            wrap: |position| Message::BaseSighted { position },
            unwrap: |message| match message {
                Message::BaseSighted { position } => Some(*position),
                _ => None,
            },
        }
    }
}

impl MessageCodec for PositionCodec {
    fn kind(&self) -> MessageKind {
        self.kind
    }

    fn field_widths(&self) -> Vec<u32> {
        vec![self.position.bits()]
    }

    fn write(&self, message: &Message, cursor: &mut BitCursor) -> Result<(), EncodeError> {
        let position = (self.unwrap)(message).ok_or_else(|| mismatch(self.kind, message))?;
        self.position.write(cursor, &position)
    }

    fn read(&self, cursor: &mut BitCursor, ctx: &DecodeContext) -> Result<Message, DecodeError> {
        Ok((self.wrap)(self.position.read(cursor, ctx)?))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SightingCodec {
    unit_kind: EnumField<UnitKind>,
    position: WindowField,
}

impl SightingCodec {
    pub fn new(window_bits: u32) -> Self {
        Self {
            unit_kind: EnumField::new("unit_kind"),
            position: WindowField::new("position", window_bits),
        }
    }
}

impl MessageCodec for SightingCodec {
    fn kind(&self) -> MessageKind {
        MessageKind::EnemySighted
    }

    fn field_widths(&self) -> Vec<u32> {
        vec![self.unit_kind.bits(), self.position.bits()]
    }

    fn write(&self, message: &Message, cursor: &mut BitCursor) -> Result<(), EncodeError> {
        match message {
            Message::EnemySighted {
                unit_kind,
                position,
            } => {
                self.unit_kind.write(cursor, unit_kind)?;
                self.position.write(cursor, position)
            }
            other => Err(mismatch(self.kind(), other)),
        }
    }

    fn read(&self, cursor: &mut BitCursor, ctx: &DecodeContext) -> Result<Message, DecodeError> {
        let unit_kind = self.unit_kind.read(cursor, ctx)?;
        let position = self.position.read(cursor, ctx)?;
        Ok(Message::EnemySighted {
            unit_kind,
            position,
        })
    }
}
