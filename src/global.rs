//! Shared-driver helpers for firmware that sends from interrupt context.
//!
//! A typical remote sends a frame from a button interrupt while `main` owns
//! the peripherals. These helpers keep the one [`IrBlaster`] in a
//! `critical_section::Mutex`, and hold the critical section for the whole
//! frame so the burst timing is never split by another interrupt.
//!
//! ```rust
//! use core::cell::RefCell;
//! use critical_section::Mutex;
//! use irblaster::driver::IrBlaster;
//! # use irblaster::carrier::{ClockFields, TransportMode};
//! # use irblaster::driver::IrPeripheral;
//! # struct Null;
//! # impl IrPeripheral for Null {
//! #     type Error = core::convert::Infallible;
//! #     fn set_transport_mode(&mut self, _: &TransportMode) -> Result<(), Self::Error> { Ok(()) }
//! #     fn write_clock_register(&mut self, _: ClockFields) -> Result<(), Self::Error> { Ok(()) }
//! #     fn issue_transaction(&mut self, _: u8, _: u32) -> Result<(), Self::Error> { Ok(()) }
//! # }
//!
//! static IR_BLASTER: Mutex<RefCell<Option<IrBlaster<Null>>>> =
//!     irblaster::global::global_ir_blaster_init();
//!
//! irblaster::global::global_ir_blaster_setup(&IR_BLASTER, IrBlaster::new(Null));
//! irblaster::global::global_send_rc5(&IR_BLASTER, 0x3A5C).unwrap();
//! ```

use core::cell::RefCell;

use critical_section::Mutex;

use crate::driver::{IrBlaster, IrPeripheral};
use crate::encoding::Command;
use crate::error::Error;

/// A `critical_section`-protected, optionally installed driver.
pub type GlobalIrBlaster<P> = Mutex<RefCell<Option<IrBlaster<P>>>>;

/// Used to initialize a global static [`IrBlaster`] slot.
///
/// # Returns
/// * An empty mutex-protected cell
pub const fn global_ir_blaster_init<P: IrPeripheral>() -> GlobalIrBlaster<P> {
    Mutex::new(RefCell::new(None))
}

/// Installs `blaster` into the global slot, returning any previous driver.
pub fn global_ir_blaster_setup<P: IrPeripheral>(
    global: &'static GlobalIrBlaster<P>,
    blaster: IrBlaster<P>,
) -> Option<IrBlaster<P>> {
    critical_section::with(|cs| global.borrow(cs).replace(Some(blaster)))
}

/// Removes the driver from the global slot.
pub fn global_ir_blaster_take<P: IrPeripheral>(
    global: &'static GlobalIrBlaster<P>,
) -> Option<IrBlaster<P>> {
    critical_section::with(|cs| global.borrow(cs).borrow_mut().take())
}

/// Sends `command` through the global driver.
///
/// # Errors
/// - [`Error::Uninitialized`] if no driver has been installed
/// - [`Error::Peripheral`] if the hardware failed mid-frame
pub fn global_send<P: IrPeripheral>(
    global: &'static GlobalIrBlaster<P>,
    command: &Command,
) -> Result<(), Error<P::Error>> {
    critical_section::with(|cs| match global.borrow(cs).borrow_mut().as_mut() {
        Some(blaster) => blaster.send(command),
        None => Err(Error::Uninitialized),
    })
}

/// Sends a 14-bit RC5 frame through the global driver.
pub fn global_send_rc5<P: IrPeripheral>(
    global: &'static GlobalIrBlaster<P>,
    value: u32,
) -> Result<(), Error<P::Error>> {
    critical_section::with(|cs| match global.borrow(cs).borrow_mut().as_mut() {
        Some(blaster) => blaster.send_rc5(value),
        None => Err(Error::Uninitialized),
    })
}

/// Declares a static global `IR_BLASTER` slot.
///
/// # Arguments
/// - `$p`: the concrete [`IrPeripheral`](crate::driver::IrPeripheral) type
///
/// # Example
/// ```rust,ignore
/// init_ir_blaster!(SpiIrPeripheral<Hspi, Esp8266Clock>);
/// ```
#[macro_export]
macro_rules! init_ir_blaster {
    ( $p:ty ) => {
        pub static IR_BLASTER: $crate::critical_section::Mutex<
            core::cell::RefCell<Option<$crate::driver::IrBlaster<$p>>>,
        > = $crate::critical_section::Mutex::new(core::cell::RefCell::new(None));
    };
}
