//! Constants shared by the carrier configurator and the pulse encoder.
//!
//! This module collects the raw selector values, clock assumptions, burst
//! geometry and register field layout used across the driver.
//!
//! ## Key Concepts
//!
//! - **Selectors**: raw byte values for carrier frequency and duty cycle, as
//!   stored in firmware configuration or sent over a control channel.
//! - **Clocks**: the 80 MHz system clock is pre-divided down to an 8 MHz
//!   intermediate clock, which the cycle-count divisor then divides into the
//!   carrier rate.
//! - **Bursts**: one SPI transaction of a fixed number of clock cycles with the
//!   data line held either low (carrier gated off) or high (carrier gated on).
//! - **Register layout**: the ESP8266 HSPI `SPI_CLOCK` register packs four
//!   divider fields into one word.

/// Raw selector for a 36 kHz carrier.
pub const F36KHZ: u8 = 0x00;
/// Raw selector for a 38 kHz carrier.
pub const F38KHZ: u8 = 0x01;
/// Raw selector for a 40 kHz carrier.
pub const F40KHZ: u8 = 0x02;
/// Raw selector for a 56 kHz carrier.
pub const F56KHZ: u8 = 0x03;

/// Raw selector for a 25 % duty cycle.
pub const DCP25: u8 = 0x00;
/// Raw selector for a 33 % duty cycle.
pub const DCP33: u8 = 0x01;
/// Raw selector for a 50 % duty cycle.
pub const DCP50: u8 = 0x02;
/// Raw selector for a 100 % duty cycle. Not verified on hardware.
pub const DCP100: u8 = 0x03;

/// System clock feeding the SPI block, in Hz.
pub const SYSTEM_CLOCK_HZ: u32 = 80_000_000;

/// Pre-divider applied to [`SYSTEM_CLOCK_HZ`] for every tabulated carrier.
pub const PRE_DIVIDER: u16 = 10;

/// Intermediate clock after the pre-divider, in Hz.
pub const BASE_CLOCK_HZ: u32 = SYSTEM_CLOCK_HZ / PRE_DIVIDER as u32;

/// Cycle-count divisor giving 36.036 kHz from [`BASE_CLOCK_HZ`].
pub const CYCLES_36KHZ: u16 = 222;
/// Cycle-count divisor giving 38.09 kHz from [`BASE_CLOCK_HZ`].
pub const CYCLES_38KHZ: u16 = 210;
/// Cycle-count divisor giving 40 kHz from [`BASE_CLOCK_HZ`].
pub const CYCLES_40KHZ: u16 = 200;
/// Cycle-count divisor giving 55.94 kHz from [`BASE_CLOCK_HZ`].
pub const CYCLES_56KHZ: u16 = 143;

/// Number of SPI clock cycles in one half-bit burst.
pub const BURST_CYCLES: u8 = 32;

/// Longest burst a single 32-bit pattern can describe.
pub const MAX_BURST_CYCLES: u8 = 32;

/// Data pattern for a burst with the carrier gated off.
pub const PATTERN_LOW: u32 = 0x0000_0000;

/// Data pattern for a burst with the carrier gated on.
pub const PATTERN_HIGH: u32 = 0xFFFF_FFFF;

/// Widest command the encoder can walk.
pub const MAX_COMMAND_BITS: u8 = 32;

/// See [`MAX_COMMAND_BITS`](crate::consts::MAX_COMMAND_BITS)
pub const MAX_COMMAND_BITS_USIZE: usize = MAX_COMMAND_BITS as usize;

/// Upper bound on bursts in one frame: two per bit.
pub const MAX_BURSTS_USIZE: usize = MAX_COMMAND_BITS_USIZE * 2;

/// Number of bits in an RC5 frame (2 start, 1 toggle, 5 address, 6 command).
pub const RC5_BITS: u8 = 14;

/// `SPI_CLKDIV_PRE` field mask.
pub const SPI_CLKDIV_PRE: u32 = 0x0000_1FFF;
/// `SPI_CLKDIV_PRE` field shift.
pub const SPI_CLKDIV_PRE_S: u8 = 18;
/// `SPI_CLKCNT_N` field mask.
pub const SPI_CLKCNT_N: u32 = 0x0000_003F;
/// `SPI_CLKCNT_N` field shift.
pub const SPI_CLKCNT_N_S: u8 = 12;
/// `SPI_CLKCNT_H` field mask.
pub const SPI_CLKCNT_H: u32 = 0x0000_003F;
/// `SPI_CLKCNT_H` field shift.
pub const SPI_CLKCNT_H_S: u8 = 6;
/// `SPI_CLKCNT_L` field mask.
pub const SPI_CLKCNT_L: u32 = 0x0000_003F;
/// `SPI_CLKCNT_L` field shift.
pub const SPI_CLKCNT_L_S: u8 = 0;
