//! Carrier frequency and duty-cycle arithmetic.
//!
//! The SPI clock output is repurposed as the IR carrier. Its rate is set by
//! two cascaded dividers: a pre-divider taking the 80 MHz system clock down to
//! an 8 MHz intermediate clock, and a cycle-count divisor taking that down to
//! the carrier rate. A third field sets how many of those cycles the clock is
//! held high, which gives the duty cycle.
//!
//! Everything here is pure: [`CarrierTiming::resolve`] turns a pair of
//! selectors into timing values, and [`CarrierTiming::fields`] turns those
//! into register-ready [`ClockFields`]. Writing them to hardware is the job of
//! [`crate::driver::IrBlaster::configure_carrier`].
//!
//! ## Carrier table
//!
//! | Selector | Pre-divider | Cycle count | Rate       |
//! |----------|-------------|-------------|------------|
//! | 36 kHz   |          10 |         222 | 36.036 kHz |
//! | 38 kHz   |          10 |         210 | 38.09 kHz  |
//! | 40 kHz   |          10 |         200 | 40 kHz     |
//! | 56 kHz   |          10 |         143 | 55.94 kHz  |

use crate::consts::{
    CYCLES_36KHZ, CYCLES_38KHZ, CYCLES_40KHZ, CYCLES_56KHZ, DCP25, DCP33, DCP50, DCP100, F36KHZ,
    F38KHZ, F40KHZ, F56KHZ, PRE_DIVIDER,
};

/// Carrier frequency selector.
///
/// Each variant maps to a pre-tabulated `(pre_divider, cycle_count)` pair
/// tuned for an 8 MHz intermediate clock. Raw selector bytes outside the known
/// range resolve to [`CarrierFrequency::F36kHz`].
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum CarrierFrequency {
    /// 36.036 kHz (RC5, RC6).
    #[default]
    F36kHz,
    /// 38.09 kHz (NEC and most consumer remotes).
    F38kHz,
    /// 40 kHz (Sony SIRC).
    F40kHz,
    /// 55.94 kHz.
    F56kHz,
}

impl CarrierFrequency {
    /// Resolves a raw selector byte, falling back to 36 kHz for unknown values.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            F36KHZ => Self::F36kHz,
            F38KHZ => Self::F38kHz,
            F40KHZ => Self::F40kHz,
            F56KHZ => Self::F56kHz,
            _ => Self::F36kHz,
        }
    }

    /// The raw selector byte for this frequency.
    pub const fn raw(self) -> u8 {
        match self {
            Self::F36kHz => F36KHZ,
            Self::F38kHz => F38KHZ,
            Self::F40kHz => F40KHZ,
            Self::F56kHz => F56KHZ,
        }
    }

    /// Returns `(pre_divider, cycle_count)` for this frequency.
    pub const fn dividers(self) -> (u16, u16) {
        match self {
            Self::F36kHz => (PRE_DIVIDER, CYCLES_36KHZ),
            Self::F38kHz => (PRE_DIVIDER, CYCLES_38KHZ),
            Self::F40kHz => (PRE_DIVIDER, CYCLES_40KHZ),
            Self::F56kHz => (PRE_DIVIDER, CYCLES_56KHZ),
        }
    }
}

impl From<u8> for CarrierFrequency {
    fn from(raw: u8) -> Self {
        Self::from_raw(raw)
    }
}

/// Duty-cycle selector.
///
/// Raw selector bytes outside the known range resolve to
/// [`DutyCycle::Percent25`].
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum DutyCycle {
    /// High for a quarter of the period.
    #[default]
    Percent25,
    /// High for a third of the period (rounded down).
    Percent33,
    /// High for half of the period.
    Percent50,
    /// High for the whole period. This leaves a zero-length low phase and has
    /// not been verified on hardware.
    Percent100,
}

impl DutyCycle {
    /// Resolves a raw selector byte, falling back to 25 % for unknown values.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            DCP25 => Self::Percent25,
            DCP33 => Self::Percent33,
            DCP50 => Self::Percent50,
            DCP100 => Self::Percent100,
            _ => Self::Percent25,
        }
    }

    /// The raw selector byte for this duty cycle.
    pub const fn raw(self) -> u8 {
        match self {
            Self::Percent25 => DCP25,
            Self::Percent33 => DCP33,
            Self::Percent50 => DCP50,
            Self::Percent100 => DCP100,
        }
    }

    /// Number of high cycles out of `cycle_count`.
    pub const fn high_count(self, cycle_count: u16) -> u16 {
        match self {
            Self::Percent25 => cycle_count >> 2,
            Self::Percent33 => cycle_count / 3,
            Self::Percent50 => cycle_count >> 1,
            Self::Percent100 => cycle_count,
        }
    }
}

impl From<u8> for DutyCycle {
    fn from(raw: u8) -> Self {
        Self::from_raw(raw)
    }
}

/// Divider values for one carrier configuration.
///
/// Recomputed on every configuration call; nothing caches it.
///
/// Invariants: `pre_divider >= 1`, `cycle_count >= 1`, and
/// `high_count <= cycle_count`. Only [`resolve`](Self::resolve) and
/// [`from_raw`](Self::from_raw) construct it, so the invariants always hold.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct CarrierTiming {
    pre_divider: u16,
    cycle_count: u16,
    high_count: u16,
}

impl CarrierTiming {
    /// Looks up the dividers for `frequency` and derives the high count for
    /// `duty_cycle`.
    pub const fn resolve(frequency: CarrierFrequency, duty_cycle: DutyCycle) -> Self {
        let (pre_divider, cycle_count) = frequency.dividers();
        Self {
            pre_divider,
            cycle_count,
            high_count: duty_cycle.high_count(cycle_count),
        }
    }

    /// Same as [`resolve`](Self::resolve), from raw selector bytes.
    pub const fn from_raw(frequency: u8, duty_cycle: u8) -> Self {
        Self::resolve(
            CarrierFrequency::from_raw(frequency),
            DutyCycle::from_raw(duty_cycle),
        )
    }

    /// Divider from the system clock to the intermediate clock.
    pub const fn pre_divider(&self) -> u16 {
        self.pre_divider
    }

    /// Intermediate-clock cycles per carrier period.
    pub const fn cycle_count(&self) -> u16 {
        self.cycle_count
    }

    /// Intermediate-clock cycles the carrier is held high per period.
    pub const fn high_count(&self) -> u16 {
        self.high_count
    }

    /// Cycles per period the carrier is low. Zero at 100 % duty.
    pub const fn low_count(&self) -> u16 {
        self.cycle_count - self.high_count
    }

    /// Register-ready fields. Both dividers count from zero, so a divisor of
    /// `N` is written as `N - 1`. The low-duration field is always 0.
    pub const fn fields(&self) -> ClockFields {
        ClockFields {
            pre_divider: self.pre_divider - 1,
            cycle_count: self.cycle_count - 1,
            high_count: self.high_count,
            low_count: 0,
        }
    }

    /// Carrier rate in Hz produced from `system_clock_hz`.
    pub fn carrier_hz(&self, system_clock_hz: u32) -> f32 {
        system_clock_hz as f32 / (self.pre_divider as f32 * self.cycle_count as f32)
    }
}

/// The four clock-divider register fields, already in their zero-based
/// encoding but not yet masked or shifted.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ClockFields {
    /// `pre_divider - 1`
    pub pre_divider: u16,
    /// `cycle_count - 1`
    pub cycle_count: u16,
    /// High-duration count.
    pub high_count: u16,
    /// Low-duration count.
    pub low_count: u16,
}

/// Bit order used when shifting data out.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum BitOrder {
    /// Most significant bit first.
    #[default]
    MsbFirst,
    /// Least significant bit first.
    LsbFirst,
}

/// Transaction phases and ordering for the SPI block.
///
/// The carrier only needs a clock and a gated data-out line, so the default
/// mode enables the output phase alone.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct TransportMode {
    /// Byte ordering on the output line.
    pub bit_order: BitOrder,
    /// Data-out phase.
    pub output: bool,
    /// Data-in phase.
    pub input: bool,
    /// Command phase.
    pub command: bool,
    /// Address phase.
    pub address: bool,
    /// Dummy-cycle phase.
    pub dummy: bool,
    /// Chip-select setup time.
    pub cs_setup: bool,
    /// Chip-select hold time.
    pub cs_hold: bool,
}

impl TransportMode {
    /// Output-only, MSB first, every other phase disabled.
    pub const OUTPUT_ONLY: Self = Self {
        bit_order: BitOrder::MsbFirst,
        output: true,
        input: false,
        command: false,
        address: false,
        dummy: false,
        cs_setup: false,
        cs_hold: false,
    };
}

impl Default for TransportMode {
    fn default() -> Self {
        Self::OUTPUT_ONLY
    }
}
