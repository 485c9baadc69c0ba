//! Divider and burst-duration calculators.
//!
//! The carrier table in [`crate::carrier`] is tuned for an 80 MHz system clock.
//! These helpers reproduce that arithmetic for other base clocks and report how
//! long a burst lasts on air, which is what a receiver actually decodes.
//!
//! Because the SPI clock *is* the carrier, a burst of `n` SPI cycles lasts `n`
//! carrier periods. At 36 kHz a 32-cycle burst is ~889 µs, the RC5 half-bit.
//!
//! | Carrier    | Cycle count | 32-cycle burst |
//! |------------|-------------|----------------|
//! | 36.036 kHz |         222 |       888.0 µs |
//! | 38.09 kHz  |         210 |       840.0 µs |
//! | 40 kHz     |         200 |       800.0 µs |
//! | 55.94 kHz  |         143 |       572.0 µs |

use libm::{round, roundf};

use crate::carrier::CarrierTiming;

/// 1,000,000 microseconds = 1 second
pub const MICROSECONDS_PER_SECOND: f32 = 1_000_000.0;

/// Computes the cycle-count divisor for `carrier_hz` from `base_hz`.
///
/// # Arguments
/// - `base_hz`: clock after the pre-divider (e.g., 8 MHz)
/// - `carrier_hz`: desired carrier (e.g., 36 kHz)
///
/// # Returns
/// - The divisor, rounded to nearest and at least 1
pub fn compute_cycle_count(base_hz: u32, carrier_hz: u32) -> u16 {
    if carrier_hz == 0 {
        return u16::MAX;
    }
    let ratio = round(f64::from(base_hz) / f64::from(carrier_hz));
    ratio.clamp(1.0, f64::from(u16::MAX)) as u16
}

/// Compile-time cycle-count calculator
///
/// Integer round-to-nearest; agrees with [`compute_cycle_count`] except on
/// exact half-way ratios.
pub const fn const_cycle_count(base_hz: u32, carrier_hz: u32) -> u16 {
    if carrier_hz == 0 {
        return u16::MAX;
    }
    let ratio = (base_hz as u64 + carrier_hz as u64 / 2) / carrier_hz as u64;
    if ratio == 0 {
        1
    } else if ratio > u16::MAX as u64 {
        u16::MAX
    } else {
        ratio as u16
    }
}

/// Duration of one burst of `cycles` SPI clocks, in microseconds.
///
/// # Arguments
/// - `timing`: the carrier dividers in effect
/// - `system_clock_hz`: clock feeding the pre-divider (80 MHz reference)
/// - `cycles`: burst length in SPI clock cycles
pub fn burst_duration_us(timing: &CarrierTiming, system_clock_hz: u32, cycles: u8) -> f32 {
    let period_us = MICROSECONDS_PER_SECOND / timing.carrier_hz(system_clock_hz);
    roundf(period_us * f32::from(cycles) * 10.0) / 10.0
}
