//! Layout of the 24-bit conversion word shifted out of the converter.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

/// Number of bytes making up one conversion.
pub const CONVERSION_BYTES: usize = 3;

/// Largest code the converter reports (`0x7FFFFF`).
pub const CODE_MAX: i32 = 0x7F_FFFF;
/// Smallest code the converter reports (`0x800000`).
pub const CODE_MIN: i32 = -0x80_0000;

/// Bitfield view of one conversion, two's complement, 24 bits wide.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionWord {
    // Bits 22:0 of the result.
    pub magnitude: B23,
    // Sign bit (bit 23).
    pub negative: bool,
}

impl ConversionWord {
    /// Builds a word from the bytes in wire order, most significant first.
    pub fn from_be_bytes(bytes: [u8; CONVERSION_BYTES]) -> Self {
        Self::from_bytes([bytes[2], bytes[1], bytes[0]])
    }

    /// Returns the result sign-extended to 32 bits.
    pub fn value(self) -> i32 {
        let magnitude = self.magnitude() as i32;
        if self.negative() {
            magnitude + CODE_MIN
        } else {
            magnitude
        }
    }
}

impl From<ConversionWord> for i32 {
    fn from(word: ConversionWord) -> Self {
        word.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: [u8; 3]) -> i32 {
        ConversionWord::from_be_bytes(bytes).value()
    }

    #[test]
    fn positive_codes_keep_upper_bits_clear() {
        assert_eq!(decode([0x00, 0x00, 0x01]), 1);
        assert_eq!(decode([0x12, 0x34, 0x56]), 0x12_3456);
        assert_eq!(decode([0x7F, 0xFF, 0xFF]), CODE_MAX);
    }

    #[test]
    fn negative_codes_are_sign_extended() {
        assert_eq!(decode([0xFF, 0xFF, 0xFF]), -1);
        assert_eq!(decode([0x80, 0x00, 0x00]), CODE_MIN);
        assert_eq!(decode([0x80, 0x00, 0x00]), -8_388_608);
        assert_eq!(decode([0xFF, 0xFF, 0x00]), -256);
    }

    #[test]
    fn sign_bit_comes_from_most_significant_byte() {
        let word = ConversionWord::from_be_bytes([0x80, 0x00, 0x7F]);
        assert!(word.negative());
        assert_eq!(word.magnitude(), 0x7F);
    }

    #[test]
    fn wire_order_differs_from_storage_order() {
        let wire = [0x01, 0x00, 0x80];
        assert_eq!(ConversionWord::from_be_bytes(wire).value(), 0x01_0080);
        assert_eq!(i32::from(ConversionWord::from_bytes(wire)), CODE_MIN + 1);
    }
}
