//! `embedded-hal` adapter for the [`IrPeripheral`] primitives.
//!
//! [`SpiIrPeripheral`] issues bursts through any
//! [`embedded_hal::spi::SpiBus<u8>`] and writes the clock divider through a
//! [`ClockRegisterWrite`], which is the one piece a HAL cannot express
//! portably: the SPI clock register of the target chip.
//!
//! The divider fields are packed according to a [`ClockRegisterLayout`]. The
//! default layout is the ESP8266 HSPI `SPI_CLOCK` register.
//!
//! ## Limitations
//!
//! - Bursts must be a whole number of bytes and at most 32 bits
//! - The ESP8266 `SPI_CLKCNT_*` fields are 6 bits wide, so cycle counts above 64
//!   are truncated by the mask. A warning is logged when that happens.

use core::fmt::Debug;

use embedded_hal::spi::SpiBus;

use crate::carrier::{ClockFields, TransportMode};
use crate::consts::{
    SPI_CLKCNT_H, SPI_CLKCNT_H_S, SPI_CLKCNT_L, SPI_CLKCNT_L_S, SPI_CLKCNT_N, SPI_CLKCNT_N_S,
    SPI_CLKDIV_PRE, SPI_CLKDIV_PRE_S,
};
use crate::driver::IrPeripheral;
use crate::fmt::{trace, warn};

/// Mask and shift of one register field.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct FieldLayout {
    /// Right-aligned field mask.
    pub mask: u32,
    /// Position of the field's least significant bit.
    pub shift: u8,
}

impl FieldLayout {
    /// Creates a field layout.
    pub const fn new(mask: u32, shift: u8) -> Self {
        Self { mask, shift }
    }

    /// Masks `value` to the field width and moves it into place.
    pub const fn place(&self, value: u16) -> u32 {
        (value as u32 & self.mask) << self.shift
    }

    /// Whether `value` has bits outside the field mask.
    pub const fn overflows(&self, value: u16) -> bool {
        value as u32 & !self.mask != 0
    }
}

/// Where the four divider fields live in the clock register.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ClockRegisterLayout {
    /// Pre-divider field.
    pub pre_divider: FieldLayout,
    /// Cycle-count field.
    pub cycle_count: FieldLayout,
    /// High-duration field.
    pub high_count: FieldLayout,
    /// Low-duration field.
    pub low_count: FieldLayout,
}

impl ClockRegisterLayout {
    /// ESP8266 HSPI `SPI_CLOCK`.
    pub const ESP8266_SPI_CLOCK: Self = Self {
        pre_divider: FieldLayout::new(SPI_CLKDIV_PRE, SPI_CLKDIV_PRE_S),
        cycle_count: FieldLayout::new(SPI_CLKCNT_N, SPI_CLKCNT_N_S),
        high_count: FieldLayout::new(SPI_CLKCNT_H, SPI_CLKCNT_H_S),
        low_count: FieldLayout::new(SPI_CLKCNT_L, SPI_CLKCNT_L_S),
    };

    /// Packs `fields` into one register word.
    pub const fn pack(&self, fields: &ClockFields) -> u32 {
        self.pre_divider.place(fields.pre_divider)
            | self.cycle_count.place(fields.cycle_count)
            | self.high_count.place(fields.high_count)
            | self.low_count.place(fields.low_count)
    }

    /// Whether packing `fields` would drop any bits.
    pub const fn truncates(&self, fields: &ClockFields) -> bool {
        self.pre_divider.overflows(fields.pre_divider)
            || self.cycle_count.overflows(fields.cycle_count)
            || self.high_count.overflows(fields.high_count)
            || self.low_count.overflows(fields.low_count)
    }
}

impl Default for ClockRegisterLayout {
    fn default() -> Self {
        Self::ESP8266_SPI_CLOCK
    }
}

/// Raw access to the SPI block's clock and user registers.
pub trait ClockRegisterWrite {
    /// Error reported by the register access.
    type Error: Debug;

    /// Overwrites the clock register with `word`.
    fn write_clock(&mut self, word: u32) -> Result<(), Self::Error>;

    /// Applies phase and bit-order settings.
    ///
    /// HALs that fix these when the bus is constructed should check `mode`
    /// against that configuration and report a mismatch, not ignore it.
    fn write_transport_mode(&mut self, mode: &TransportMode) -> Result<(), Self::Error>;
}

/// Errors from [`SpiIrPeripheral`].
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum SpiIrError<S, R> {
    /// The SPI bus failed.
    #[error("spi bus error: {0:?}")]
    Spi(S),
    /// The clock register write failed.
    #[error("clock register error: {0:?}")]
    Register(R),
    /// The burst bit count is not a whole number of bytes, or exceeds 32.
    #[error("burst of {0} bits is not byte aligned")]
    UnalignedBurst(u8),
}

/// [`IrPeripheral`] over an `embedded-hal` SPI bus and a clock register writer.
///
/// ## Type Parameters
///
/// - `SPI`: a [`SpiBus<u8>`] whose clock line drives the IR LED transistor and
///   whose data-out line gates it
/// - `REG`: access to the chip's SPI clock register
#[derive(Debug)]
pub struct SpiIrPeripheral<SPI, REG> {
    /// The SPI bus.
    pub spi: SPI,
    /// The clock register writer.
    pub register: REG,
    /// Packing used for [`ClockFields`].
    pub layout: ClockRegisterLayout,
}

impl<SPI, REG> SpiIrPeripheral<SPI, REG>
where
    SPI: SpiBus<u8>,
    REG: ClockRegisterWrite,
{
    /// Creates the adapter with the ESP8266 register layout.
    pub fn new(spi: SPI, register: REG) -> Self {
        Self::with_layout(spi, register, ClockRegisterLayout::ESP8266_SPI_CLOCK)
    }

    /// Creates the adapter with a custom register layout.
    pub fn with_layout(spi: SPI, register: REG, layout: ClockRegisterLayout) -> Self {
        Self {
            spi,
            register,
            layout,
        }
    }

    /// Returns the bus and register writer.
    pub fn release(self) -> (SPI, REG) {
        (self.spi, self.register)
    }
}

impl<SPI, REG> IrPeripheral for SpiIrPeripheral<SPI, REG>
where
    SPI: SpiBus<u8>,
    REG: ClockRegisterWrite,
{
    type Error = SpiIrError<SPI::Error, REG::Error>;

    fn set_transport_mode(&mut self, mode: &TransportMode) -> Result<(), Self::Error> {
        self.register
            .write_transport_mode(mode)
            .map_err(SpiIrError::Register)
    }

    fn write_clock_register(&mut self, fields: ClockFields) -> Result<(), Self::Error> {
        if self.layout.truncates(&fields) {
            warn!("clock fields {:?} do not fit the register layout", fields);
        }
        let word = self.layout.pack(&fields);
        trace!("clock register <- {:#x}", word);
        self.register.write_clock(word).map_err(SpiIrError::Register)
    }

    fn issue_transaction(&mut self, bit_count: u8, bit_pattern: u32) -> Result<(), Self::Error> {
        if bit_count % 8 != 0 || bit_count > 32 {
            return Err(SpiIrError::UnalignedBurst(bit_count));
        }
        let bytes = bit_pattern.to_be_bytes();
        self.spi
            .write(&bytes[..usize::from(bit_count / 8)])
            .map_err(SpiIrError::Spi)?;
        self.spi.flush().map_err(SpiIrError::Spi)
    }
}
