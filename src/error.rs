//! Error type surfaced at the peripheral boundary.
//!
//! Carrier and duty selectors never fail; they fall back to defaults. Errors
//! come from the injected hardware primitives, a [`Protocol`] whose burst
//! length cannot be expressed, or the global helpers being used before setup.
//!
//! [`Protocol`]: crate::driver::Protocol

/// Errors returned by [`IrBlaster`](crate::driver::IrBlaster) operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Error<E> {
    /// The register writer or transaction primitive failed.
    #[error("peripheral error: {0:?}")]
    Peripheral(E),
    /// The protocol's burst length is 0 or longer than
    /// [`MAX_BURST_CYCLES`](crate::consts::MAX_BURST_CYCLES). Nothing was
    /// written to the peripheral.
    #[error("invalid burst length: {0} cycles")]
    InvalidBurst(u8),
    /// A global driver helper was called before the driver was installed.
    #[error("driver not initialized")]
    Uninitialized,
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Peripheral(err)
    }
}
