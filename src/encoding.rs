//! Bit walking and burst-pair encoding for pulse-distance IR frames.
//!
//! A command is sent most-significant bit first. Each bit occupies a fixed
//! window split into two equal halves, and the value is carried by which half
//! has the carrier gated on:
//!
//! | Bit | First half | Second half |
//! |-----|------------|-------------|
//! | `1` | low        | high        |
//! | `0` | high       | low         |
//!
//! The carrier frequency stays constant for the whole frame; only the gating
//! changes.
//!
//! ## Functions
//!
//! - [`Command::bits`]: restartable MSB-first iterator over a command
//! - [`BurstEncoding::pair`]: maps one bit to its [`BurstPair`]
//! - [`encode_buffer`]: materialises a whole frame's bursts
//! - [`decode_bursts`]: the inverse, used for loopback checks
//!
//! ## Limitations
//!
//! - Commands are at most 32 bits wide; longer lengths are clamped
//! - Decoding rejects any pair that is not exactly one low and one high burst

use crate::consts::{BURST_CYCLES, MAX_COMMAND_BITS, PATTERN_HIGH, PATTERN_LOW};
use crate::fmt::warn;

/// A command value together with the number of low-order bits to send.
///
/// The bit length is protocol metadata and cannot be inferred from the value:
/// an RC5 frame is always 14 bits even when its leading bits are zero.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Command {
    value: u32,
    bit_length: u8,
}

impl Command {
    /// Creates a command. `bit_length` above 32 is clamped to 32.
    pub fn new(value: u32, bit_length: u8) -> Self {
        let bit_length = if bit_length > MAX_COMMAND_BITS {
            warn!(
                "bit length {} exceeds {}, clamping",
                bit_length, MAX_COMMAND_BITS
            );
            MAX_COMMAND_BITS
        } else {
            bit_length
        };
        Self { value, bit_length }
    }

    /// The full command value, including any bits above `bit_length`.
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Number of significant low-order bits.
    pub fn bit_length(&self) -> u8 {
        self.bit_length
    }

    /// The value masked down to its significant bits.
    pub fn significant(&self) -> u32 {
        match self.bit_length {
            0 => 0,
            MAX_COMMAND_BITS => self.value,
            n => self.value & ((1u32 << n) - 1),
        }
    }

    /// Iterates the significant bits, most significant first.
    pub fn bits(&self) -> Bits {
        Bits {
            value: self.value,
            bit_length: self.bit_length,
            remaining: self.bit_length,
        }
    }
}

/// MSB-first iterator over the significant bits of a [`Command`].
///
/// Yields exactly `bit_length` values. [`restart`](Bits::restart) rewinds it
/// to the first bit.
#[derive(Clone, Debug)]
pub struct Bits {
    value: u32,
    bit_length: u8,
    remaining: u8,
}

impl Bits {
    /// Rewinds to the most significant bit.
    pub fn restart(&mut self) {
        self.remaining = self.bit_length;
    }
}

impl Iterator for Bits {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.remaining == 0 {
            return None;
        }
        let position = self.remaining - 1;
        self.remaining = position;
        Some((self.value >> position) & 1 == 1)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::from(self.remaining);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Bits {}

/// One SPI transaction's worth of carrier, either gated on or off.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Burst {
    /// Length of the transaction in SPI clock cycles.
    pub cycles: u8,
    /// Whether the carrier is gated on.
    pub active: bool,
}

impl Burst {
    /// A burst with the carrier gated on.
    pub const fn high(cycles: u8) -> Self {
        Self {
            cycles,
            active: true,
        }
    }

    /// A burst with the carrier gated off.
    pub const fn low(cycles: u8) -> Self {
        Self {
            cycles,
            active: false,
        }
    }

    /// Data pattern clocked out for this burst.
    pub const fn pattern(&self) -> u32 {
        if self.active { PATTERN_HIGH } else { PATTERN_LOW }
    }
}

/// The two bursts making up one bit window.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct BurstPair(pub Burst, pub Burst);

/// Which half of the bit window carries a `1`.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum BurstEncoding {
    /// `1` is low then high; `0` is high then low. This is what RC5 sends.
    #[default]
    LowHighIsOne,
    /// `1` is high then low; `0` is low then high.
    HighLowIsOne,
}

impl BurstEncoding {
    /// The burst pair for one bit, each half `cycles` long.
    pub const fn pair(self, bit: bool, cycles: u8) -> BurstPair {
        let one = match self {
            Self::LowHighIsOne => true,
            Self::HighLowIsOne => false,
        };
        if bit == one {
            BurstPair(Burst::low(cycles), Burst::high(cycles))
        } else {
            BurstPair(Burst::high(cycles), Burst::low(cycles))
        }
    }

    /// Recovers a bit from a burst pair, or `None` if both halves match.
    pub const fn bit(self, pair: &BurstPair) -> Option<bool> {
        let low_high = match (pair.0.active, pair.1.active) {
            (false, true) => true,
            (true, false) => false,
            _ => return None,
        };
        Some(match self {
            Self::LowHighIsOne => low_high,
            Self::HighLowIsOne => !low_high,
        })
    }
}

/// Encodes `command` into `output` as a flat burst sequence using the
/// reference 32-cycle bursts.
///
/// # Returns
/// The number of bursts written, always `2 * bit_length`.
///
/// # Panics
/// If `output` is shorter than `2 * bit_length`.
pub fn encode_buffer(command: &Command, encoding: BurstEncoding, output: &mut [Burst]) -> usize {
    encode_buffer_with(command, encoding, BURST_CYCLES, output)
}

/// As [`encode_buffer`], with a custom burst length.
pub fn encode_buffer_with(
    command: &Command,
    encoding: BurstEncoding,
    cycles: u8,
    output: &mut [Burst],
) -> usize {
    let mut i = 0;
    for bit in command.bits() {
        let BurstPair(first, second) = encoding.pair(bit, cycles);
        output[i] = first;
        output[i + 1] = second;
        i += 2;
    }
    i
}

/// Decodes a burst sequence back into a [`Command`].
///
/// # Returns
/// `None` if the sequence has odd length, more than 32 pairs, or contains a
/// pair that is not one low and one high burst.
pub fn decode_bursts(input: &[Burst], encoding: BurstEncoding) -> Option<Command> {
    if input.len() % 2 != 0 || input.len() / 2 > usize::from(MAX_COMMAND_BITS) {
        return None;
    }
    let mut value: u32 = 0;
    for chunk in input.chunks(2) {
        let bit = encoding.bit(&BurstPair(chunk[0], chunk[1]))?;
        value = (value << 1) | u32::from(bit);
    }
    Some(Command::new(value, (input.len() / 2) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_BURSTS_USIZE;

    const LOW: Burst = Burst::low(BURST_CYCLES);
    const HIGH: Burst = Burst::high(BURST_CYCLES);

    #[test]
    fn test_bits_are_msb_first() {
        let bits: Vec<bool> = Command::new(0b1011, 4).bits().collect();
        assert_eq!(bits, vec![true, false, true, true]);
    }

    #[test]
    fn test_bits_respect_length_over_magnitude() {
        let bits: Vec<bool> = Command::new(0b1, 5).bits().collect();
        assert_eq!(bits, vec![false, false, false, false, true]);

        // Bits above the length are ignored
        let bits: Vec<bool> = Command::new(0xFF, 2).bits().collect();
        assert_eq!(bits, vec![true, true]);
    }

    #[test]
    fn test_bits_restart() {
        let mut bits = Command::new(0b10, 2).bits();
        assert_eq!(bits.len(), 2);
        assert_eq!(bits.next(), Some(true));
        bits.restart();
        assert_eq!(bits.next(), Some(true));
        assert_eq!(bits.next(), Some(false));
        assert_eq!(bits.next(), None);
    }

    #[test]
    fn test_zero_length_yields_nothing() {
        assert_eq!(Command::new(0xFFFF, 0).bits().count(), 0);
        let mut out = [LOW; 4];
        assert_eq!(encode_buffer(&Command::new(0xFFFF, 0), BurstEncoding::default(), &mut out), 0);
    }

    #[test]
    fn test_bit_length_is_clamped() {
        let cmd = Command::new(u32::MAX, 40);
        assert_eq!(cmd.bit_length(), 32);
        assert_eq!(cmd.bits().count(), 32);
        assert_eq!(cmd.significant(), u32::MAX);
    }

    #[test]
    fn test_encode_one_then_zero() {
        let mut out = [LOW; 4];
        let n = encode_buffer(&Command::new(0b10, 2), BurstEncoding::LowHighIsOne, &mut out);
        assert_eq!(n, 4);
        assert_eq!(out, [LOW, HIGH, HIGH, LOW]);
    }

    #[test]
    fn test_encode_zero_command_is_all_high_low() {
        for len in 1..=8u8 {
            let mut out = [LOW; MAX_BURSTS_USIZE];
            let n = encode_buffer(&Command::new(0, len), BurstEncoding::default(), &mut out);
            assert_eq!(n, usize::from(len) * 2);
            for pair in out[..n].chunks(2) {
                assert_eq!(pair, [HIGH, LOW]);
            }
        }
    }

    #[test]
    fn test_inverted_encoding() {
        let mut out = [LOW; 4];
        let _ = encode_buffer(&Command::new(0b10, 2), BurstEncoding::HighLowIsOne, &mut out);
        assert_eq!(out, [HIGH, LOW, LOW, HIGH]);
    }

    #[test]
    fn test_custom_burst_length() {
        let mut out = [LOW; 2];
        let _ = encode_buffer_with(&Command::new(1, 1), BurstEncoding::default(), 16, &mut out);
        assert_eq!(out, [Burst::low(16), Burst::high(16)]);
    }

    #[test]
    fn test_decode_reconstructs_low_order_bits() {
        let cases = [
            (0x0000_0000, 1),
            (0x0000_3A5C, 14),
            (0xDEAD_BEEF, 16),
            (0xDEAD_BEEF, 32),
            (0x8000_0001, 32),
            (0x0000_0155, 9),
        ];
        for encoding in [BurstEncoding::LowHighIsOne, BurstEncoding::HighLowIsOne] {
            for (value, len) in cases {
                let cmd = Command::new(value, len);
                let mut out = [LOW; MAX_BURSTS_USIZE];
                let n = encode_buffer(&cmd, encoding, &mut out);
                let decoded = decode_bursts(&out[..n], encoding).unwrap();
                assert_eq!(decoded.bit_length(), len);
                assert_eq!(decoded.significant(), cmd.significant());
            }
        }
    }

    #[test]
    fn test_decode_rejects_malformed_pairs() {
        assert!(decode_bursts(&[LOW, HIGH, HIGH], BurstEncoding::default()).is_none());
        assert!(decode_bursts(&[LOW, LOW], BurstEncoding::default()).is_none());
        assert!(decode_bursts(&[HIGH, HIGH], BurstEncoding::default()).is_none());
        assert!(decode_bursts(&[LOW; 66], BurstEncoding::default()).is_none());
    }

    #[test]
    fn test_burst_patterns() {
        assert_eq!(HIGH.pattern(), PATTERN_HIGH);
        assert_eq!(LOW.pattern(), PATTERN_LOW);
    }
}
