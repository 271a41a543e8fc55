//! Fixed-width field codecs.
//!
//! Every field declares its width up front; `encode` maps a typed value to
//! exactly that many bits and `decode` rejects bit patterns that do not name a
//! valid value.

use std::marker::PhantomData;

use crate::bits::{fits, BitCursor};
use crate::coord::{residue, unwrap_residue, GridPos, Offset};
use crate::error::{DecodeError, EncodeError};
use crate::kind::Enumerated;

/// What the receiver knows when it decodes a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeContext {
    /// The receiver's own location. Window coordinates are reconstructed
    /// relative to it.
    pub reference: GridPos,
}

impl DecodeContext {
    pub const fn at(reference: GridPos) -> Self {
        Self { reference }
    }
}

pub trait FieldCodec {
    type Value;

    fn bits(&self) -> u32;

    fn encode(&self, value: &Self::Value) -> Result<u32, EncodeError>;

    fn decode(&self, raw: u32, ctx: &DecodeContext) -> Result<Self::Value, DecodeError>;

    fn write(&self, cursor: &mut BitCursor, value: &Self::Value) -> Result<(), EncodeError> {
        let raw = self.encode(value)?;
        if self.bits() > 0 {
            cursor.write_bits(self.bits(), raw);
        }
        Ok(())
    }

    fn read(&self, cursor: &mut BitCursor, ctx: &DecodeContext) -> Result<Self::Value, DecodeError> {
        let raw = if self.bits() > 0 {
            cursor.read_bits(self.bits())
        } else {
            0
        };
        self.decode(raw, ctx)
    }
}

/// Unsigned integer in `[0, 2^bits)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UIntField {
    name: &'static str,
    bits: u32,
}

impl UIntField {
    pub const fn new(name: &'static str, bits: u32) -> Self {
        assert!(bits > 0 && bits <= 32, "unsigned field width must be in 1..=32");
        Self { name, bits }
    }
}

impl FieldCodec for UIntField {
    type Value = u32;

    fn bits(&self) -> u32 {
        self.bits
    }

    fn encode(&self, value: &u32) -> Result<u32, EncodeError> {
        if fits(*value, self.bits) {
            Ok(*value)
        } else {
            Err(EncodeError::FieldOutOfRange {
                field: self.name,
                value: i64::from(*value),
                bits: self.bits,
            })
        }
    }

    fn decode(&self, raw: u32, _ctx: &DecodeContext) -> Result<u32, DecodeError> {
        Ok(raw)
    }
}

/// Signed integer in `[-2^(bits-1), 2^(bits-1))`, stored offset-binary
/// (`raw = value + 2^(bits-1)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedField {
    name: &'static str,
    bits: u32,
}

impl SignedField {
    pub const fn new(name: &'static str, bits: u32) -> Self {
        assert!(bits > 0 && bits <= 31, "signed field width must be in 1..=31");
        Self { name, bits }
    }

    pub fn min(&self) -> i32 {
        -(1i32 << (self.bits - 1))
    }

    pub fn max(&self) -> i32 {
        (1i32 << (self.bits - 1)) - 1
    }

    fn bias(&self) -> i64 {
        1i64 << (self.bits - 1)
    }
}

impl FieldCodec for SignedField {
    type Value = i32;

    fn bits(&self) -> u32 {
        self.bits
    }

    fn encode(&self, value: &i32) -> Result<u32, EncodeError> {
        if *value < self.min() || *value > self.max() {
            return Err(EncodeError::FieldOutOfRange {
                field: self.name,
                value: i64::from(*value),
                bits: self.bits,
            });
        }
        Ok((i64::from(*value) + self.bias()) as u32)
    }

    fn decode(&self, raw: u32, _ctx: &DecodeContext) -> Result<i32, DecodeError> {
        Ok((i64::from(raw) - self.bias()) as i32)
    }
}

/// Ordinal of an [`Enumerated`] value. Width is derived from the
/// enumeration's cardinality.
pub struct EnumField<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Enumerated> EnumField<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for EnumField<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for EnumField<T> {}

impl<T> std::fmt::Debug for EnumField<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnumField").field("name", &self.name).finish()
    }
}

impl<T: Enumerated> FieldCodec for EnumField<T> {
    type Value = T;

    fn bits(&self) -> u32 {
        T::bit_width()
    }

    fn encode(&self, value: &T) -> Result<u32, EncodeError> {
        Ok(value.ordinal())
    }

    fn decode(&self, raw: u32, _ctx: &DecodeContext) -> Result<T, DecodeError> {
        T::from_ordinal(raw).ok_or(DecodeError::FieldOutOfRange {
            field: self.name,
            raw,
        })
    }
}

/// Whole degrees in `[0, 360)`, 9 bits, no rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleField {
    name: &'static str,
}

impl AngleField {
    pub const BITS: u32 = 9;
    pub const FULL_TURN: u16 = 360;

    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl FieldCodec for AngleField {
    type Value = u16;

    fn bits(&self) -> u32 {
        Self::BITS
    }

    fn encode(&self, value: &u16) -> Result<u32, EncodeError> {
        if *value >= Self::FULL_TURN {
            return Err(EncodeError::FieldOutOfRange {
                field: self.name,
                value: i64::from(*value),
                bits: Self::BITS,
            });
        }
        Ok(u32::from(*value))
    }

    fn decode(&self, raw: u32, _ctx: &DecodeContext) -> Result<u16, DecodeError> {
        if raw >= u32::from(Self::FULL_TURN) {
            return Err(DecodeError::FieldOutOfRange {
                field: self.name,
                raw,
            });
        }
        Ok(raw as u16)
    }
}

/// Small `(dx, dy)` displacement; `dx` occupies the low component bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetField {
    dx: SignedField,
    dy: SignedField,
}

impl OffsetField {
    pub const fn new(component_bits: u32) -> Self {
        Self {
            dx: SignedField::new("dx", component_bits),
            dy: SignedField::new("dy", component_bits),
        }
    }
}

impl FieldCodec for OffsetField {
    type Value = Offset;

    fn bits(&self) -> u32 {
        self.dx.bits() + self.dy.bits()
    }

    fn encode(&self, value: &Offset) -> Result<u32, EncodeError> {
        let dx = self.dx.encode(&value.dx)?;
        let dy = self.dy.encode(&value.dy)?;
        Ok(dx | (dy << self.dx.bits()))
    }

    fn decode(&self, raw: u32, ctx: &DecodeContext) -> Result<Offset, DecodeError> {
        let low = raw & ((1u32 << self.dx.bits()) - 1);
        let dx = self.dx.decode(low, ctx)?;
        let dy = self.dy.decode(raw >> self.dx.bits(), ctx)?;
        Ok(Offset::new(dx, dy))
    }
}

/// Widest per-axis window a [`WindowField`] accepts.
pub const MAX_WINDOW_BITS: u32 = 15;

/// Absolute position sent as `(x mod W, y mod W)` with `W = 2^window_bits`.
///
/// Decoding picks, per axis, the value nearest the receiver's reference. It is
/// exact only while the true position is within `[-W/2, W/2)` of the
/// reference on both axes; callers are responsible for that bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowField {
    name: &'static str,
    window_bits: u32,
}

impl WindowField {
    pub const fn new(name: &'static str, window_bits: u32) -> Self {
        assert!(
            window_bits > 0 && window_bits <= MAX_WINDOW_BITS,
            "window width must be in 1..=15 bits per axis"
        );
        Self { name, window_bits }
    }

    pub fn window(&self) -> u32 {
        1u32 << self.window_bits
    }
}

impl FieldCodec for WindowField {
    type Value = GridPos;

    fn bits(&self) -> u32 {
        self.window_bits * 2
    }

    fn encode(&self, value: &GridPos) -> Result<u32, EncodeError> {
        let window = self.window();
        Ok(residue(value.x, window) | (residue(value.y, window) << self.window_bits))
    }

    fn decode(&self, raw: u32, ctx: &DecodeContext) -> Result<GridPos, DecodeError> {
        let window = self.window();
        if (raw >> self.bits()) != 0 {
            return Err(DecodeError::FieldOutOfRange {
                field: self.name,
                raw,
            });
        }
        let x = unwrap_residue(raw & (window - 1), window, ctx.reference.x);
        let y = unwrap_residue(raw >> self.window_bits, window, ctx.reference.y);
        Ok(GridPos::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{Direction, UnitKind};

    const HERE: DecodeContext = DecodeContext::at(GridPos::ORIGIN);

    #[test]
    fn unsigned_rejects_values_wider_than_field() {
        let field = UIntField::new("count", 4);
        assert_eq!(field.encode(&15), Ok(15));
        assert!(matches!(
            field.encode(&16),
            Err(EncodeError::FieldOutOfRange { field: "count", value: 16, bits: 4 })
        ));
    }

    #[test]
    fn signed_is_offset_binary() {
        let field = SignedField::new("d", 4);
        assert_eq!((field.min(), field.max()), (-8, 7));
        assert_eq!(field.encode(&-8), Ok(0));
        assert_eq!(field.encode(&0), Ok(8));
        assert_eq!(field.encode(&7), Ok(15));
        assert!(field.encode(&8).is_err());
        assert!(field.encode(&-9).is_err());
        for raw in 0..16 {
            let value = field.decode(raw, &HERE).unwrap();
            assert_eq!(field.encode(&value), Ok(raw));
        }
    }

    #[test]
    fn enum_field_rejects_unused_ordinals() {
        let field = EnumField::<UnitKind>::new("unit_kind");
        assert_eq!(field.bits(), 3);
        assert_eq!(field.decode(4, &HERE), Ok(UnitKind::Worker));
        assert_eq!(
            field.decode(5, &HERE),
            Err(DecodeError::FieldOutOfRange { field: "unit_kind", raw: 5 })
        );

        let direction = EnumField::<Direction>::new("direction");
        assert_eq!(direction.encode(&Direction::SouthEast), Ok(7));
        assert_eq!(direction.decode(7, &HERE), Ok(Direction::SouthEast));
    }

    #[test]
    fn angle_is_exact_on_whole_degrees() {
        let field = AngleField::new("heading");
        assert_eq!(field.bits(), 9);
        assert_eq!(field.encode(&359), Ok(359));
        assert!(field.encode(&360).is_err());
        assert_eq!(field.decode(90, &HERE), Ok(90));
        assert!(field.decode(360, &HERE).is_err());
        assert!(field.decode(511, &HERE).is_err());
    }

    #[test]
    fn offset_packs_dx_low() {
        let field = OffsetField::new(4);
        assert_eq!(field.bits(), 8);
        let raw = field.encode(&Offset::new(-1, 3)).unwrap();
        assert_eq!(raw, 7 | (11 << 4));
        assert_eq!(field.decode(raw, &HERE), Ok(Offset::new(-1, 3)));
        assert!(field.encode(&Offset::new(0, 8)).is_err());
    }

    #[test]
    fn window_reconstructs_near_reference() {
        let field = WindowField::new("position", 7);
        let here = DecodeContext::at(GridPos::new(200, -70));
        for target in [
            GridPos::new(200, -70),
            GridPos::new(263, -7),
            GridPos::new(137, -133),
            GridPos::new(190, -64),
        ] {
            let raw = field.encode(&target).unwrap();
            assert!(raw < 1 << 14);
            assert_eq!(field.decode(raw, &here), Ok(target));
        }
    }

    #[test]
    fn write_and_read_advance_cursor() {
        let heading = AngleField::new("heading");
        let kind = EnumField::<UnitKind>::new("unit_kind");
        let mut cursor = BitCursor::empty(24);
        heading.write(&mut cursor, &270).unwrap();
        kind.write(&mut cursor, &UnitKind::Scout).unwrap();
        assert_eq!(cursor.position(), 12);

        cursor.seek(0);
        assert_eq!(heading.read(&mut cursor, &HERE), Ok(270));
        assert_eq!(kind.read(&mut cursor, &HERE), Ok(UnitKind::Scout));
    }
}
