//! Stateful read/write cursor over a fixed-width flag value.

/// Widest channel a [`BitCursor`] can address.
pub const MAX_CHANNEL_WIDTH: u32 = u32::BITS;

/// Number of bits needed to tell `count` distinct values apart.
///
/// `bits_for(1) == 0`, `bits_for(2) == 1`, `bits_for(5) == 3`.
pub const fn bits_for(count: usize) -> u32 {
    if count <= 1 {
        0
    } else {
        usize::BITS - (count - 1).leading_zeros()
    }
}

#[inline]
const fn mask(n: u32) -> u32 {
    if n >= u32::BITS {
        u32::MAX
    } else {
        (1u32 << n) - 1
    }
}

#[inline]
pub(crate) const fn fits(value: u32, n: u32) -> bool {
    n >= u32::BITS || (value >> n) == 0
}

/// Cursor over the bits of a `width`-bit value, starting at the least
/// significant bit.
///
/// Sender and receiver must walk fields in exactly the same order: the value
/// carries no length or type information beyond the layout both sides agree on.
/// Out-of-range arguments are programmer errors and panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitCursor {
    value: u32,
    width: u32,
    position: u32,
}

impl BitCursor {
    pub fn new(value: u32, width: u32) -> Self {
        assert!(
            width > 0 && width <= MAX_CHANNEL_WIDTH,
            "cursor width must be in 1..={MAX_CHANNEL_WIDTH}, got {width}"
        );
        assert!(
            fits(value, width),
            "value {value:#x} does not fit in {width} bits"
        );
        Self {
            value,
            width,
            position: 0,
        }
    }

    pub fn empty(width: u32) -> Self {
        Self::new(0, width)
    }

    /// Writes the low `n` bits of `value` at the cursor, replacing what was there.
    pub fn write_bits(&mut self, n: u32, value: u32) {
        self.check_span(n);
        assert!(fits(value, n), "value {value:#x} does not fit in {n} bits");
        let field = mask(n) << self.position;
        self.value = (self.value & !field) | (value << self.position);
        self.position += n;
    }

    /// Reads the next `n` bits as an unsigned integer and advances.
    pub fn read_bits(&mut self, n: u32) -> u32 {
        let out = self.peek_bits(n);
        self.position += n;
        out
    }

    /// Reads the next `n` bits without moving the cursor.
    pub fn peek_bits(&self, n: u32) -> u32 {
        self.check_span(n);
        (self.value >> self.position) & mask(n)
    }

    /// Moves the cursor to an absolute bit position. Re-reading is side-effect free.
    pub fn seek(&mut self, position: u32) {
        assert!(
            position <= self.width,
            "seek to bit {position} past the {}-bit width",
            self.width
        );
        self.position = position;
    }

    pub fn remaining_bits(&self) -> u32 {
        self.width - self.position
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn into_value(self) -> u32 {
        self.value
    }

    fn check_span(&self, n: u32) {
        assert!(
            n > 0 && n <= self.remaining_bits(),
            "bit span {n} invalid with {} bits remaining",
            self.remaining_bits()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_for_matches_ceil_log2() {
        assert_eq!(bits_for(0), 0);
        assert_eq!(bits_for(1), 0);
        assert_eq!(bits_for(2), 1);
        assert_eq!(bits_for(3), 2);
        assert_eq!(bits_for(4), 2);
        assert_eq!(bits_for(5), 3);
        assert_eq!(bits_for(8), 3);
        assert_eq!(bits_for(9), 4);
        assert_eq!(bits_for(360), 9);
    }

    #[test]
    fn writes_start_at_least_significant_bit() {
        let mut cursor = BitCursor::empty(24);
        cursor.write_bits(3, 0b101);
        cursor.write_bits(9, 90);
        assert_eq!(cursor.position(), 12);
        assert_eq!(cursor.remaining_bits(), 12);
        assert_eq!(cursor.value(), 0b101 | (90 << 3));
    }

    #[test]
    fn write_replaces_existing_bits() {
        let mut cursor = BitCursor::new(0xFF_FFFF, 24);
        cursor.seek(4);
        cursor.write_bits(4, 0);
        assert_eq!(cursor.value(), 0xFF_FF0F);
    }

    #[test]
    fn read_and_reread_after_seek() {
        let mut cursor = BitCursor::new(0b1101_0110, 8);
        assert_eq!(cursor.read_bits(4), 0b0110);
        assert_eq!(cursor.read_bits(4), 0b1101);
        assert_eq!(cursor.remaining_bits(), 0);

        cursor.seek(4);
        assert_eq!(cursor.peek_bits(4), 0b1101);
        assert_eq!(cursor.read_bits(4), 0b1101);
        assert_eq!(cursor.value(), 0b1101_0110);
    }

    #[test]
    fn full_width_span() {
        let mut cursor = BitCursor::empty(32);
        cursor.write_bits(32, u32::MAX);
        cursor.seek(0);
        assert_eq!(cursor.read_bits(32), u32::MAX);
    }

    #[test]
    #[should_panic(expected = "does not fit in 3 bits")]
    fn oversized_value_panics() {
        BitCursor::empty(24).write_bits(3, 8);
    }

    #[test]
    #[should_panic(expected = "bit span 5 invalid")]
    fn read_past_end_panics() {
        let mut cursor = BitCursor::empty(8);
        cursor.seek(4);
        cursor.read_bits(5);
    }

    #[test]
    #[should_panic(expected = "bit span 0 invalid")]
    fn zero_span_panics() {
        BitCursor::empty(8).read_bits(0);
    }

    #[test]
    #[should_panic(expected = "does not fit in 24 bits")]
    fn construction_rejects_wide_value() {
        BitCursor::new(1 << 24, 24);
    }
}
