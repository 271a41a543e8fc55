//! Bit-exact flag protocol for agents that share one small broadcast slot each.
//!
//! A flag is a single unsigned integer of at most [`ProtocolConfig::channel_width_bits`]
//! bits. Bits are numbered from the least significant end; every encoded
//! message starts with an opcode and is followed by the fixed field layout of
//! its variant. Unused high bits are always zero.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod bits;
pub mod config;
pub mod coord;
pub mod error;
pub mod field;
pub mod kind;
pub mod message;
pub mod registry;

pub use bits::{bits_for, BitCursor, MAX_CHANNEL_WIDTH};
pub use config::ProtocolConfig;
pub use coord::{GridPos, Offset};
pub use error::{DecodeError, EncodeError, RegistryError};
pub use field::{
    AngleField, DecodeContext, EnumField, FieldCodec, OffsetField, SignedField, UIntField,
    WindowField, MAX_WINDOW_BITS,
};
pub use kind::{Direction, Enumerated, UnitKind};
pub use message::{Message, MessageKind};
pub use registry::{MessageCodec, Registry, RegistryBuilder, VariantLayout};
