use thiserror::Error;

use crate::message::MessageKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("field `{field}` value {value} is outside its {bits}-bit range")]
    FieldOutOfRange {
        field: &'static str,
        value: i64,
        bits: u32,
    },
    #[error("message kind {0:?} is not registered")]
    Unregistered(MessageKind),
    #[error("codec for {codec:?} cannot encode a {message:?} message")]
    KindMismatch {
        codec: MessageKind,
        message: MessageKind,
    },
}

/// Rejection of a received flag. Never guessed around: the message is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("flag {value:#x} is wider than the {width}-bit channel")]
    TooWide { value: u32, width: u32 },
    #[error("unknown opcode {opcode}")]
    UnknownOpcode { opcode: u32 },
    #[error("field `{field}` decoded to out-of-range value {raw}")]
    FieldOutOfRange { field: &'static str, raw: u32 },
    #[error("non-zero bits {bits:#x} after the {kind:?} payload")]
    TrailingBits { kind: MessageKind, bits: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("channel width {0} is outside 1..=32 bits")]
    ChannelWidth(u32),
    #[error("message kind {0:?} registered twice")]
    DuplicateKind(MessageKind),
    #[error("{kind:?} needs {needed} bits but the channel holds {capacity}")]
    PayloadTooWide {
        kind: MessageKind,
        needed: u32,
        capacity: u32,
    },
    #[error("registry has no message kinds")]
    Empty,
    #[error("coordinate window of {0} bits per axis is outside 1..=15")]
    WindowBits(u32),
}
