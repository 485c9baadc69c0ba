//! # irblaster
//!
//! A portable, no_std Rust driver that turns a microcontroller's SPI block into an
//! infrared remote-control transmitter.
//!
//! The SPI clock output becomes the IR carrier (36–56 kHz) by programming the clock
//! divider, and the data-out line gates that carrier: an all-ones transaction lets the
//! carrier through, an all-zeros transaction blocks it. Wire the clock to the LED
//! driver transistor and the data line to its enable, and each transaction is one
//! burst of modulated light.
//!
//! ## Crate features
//! | Feature            | Description |
//! |--------------------|-------------|
//! | `std`              | Disables `#![no_std]` support and replaces `heapless::Vec`s with
//! `std::vec::Vec`s |
//! | `global` (default) | `critical_section` helpers for sharing one driver with interrupt handlers |
//! | `defmt-0-3`        | Uses `defmt` logging |
//! | `log`              | Uses `log` logging |
//!
//! ## Software Features
//!
//! - Carrier table for 36, 38, 40 and 56 kHz at 25, 33, 50 or 100 % duty
//! - RC5-style Manchester framing: each bit is a pair of 32-cycle bursts
//! - Hardware access through an injected [`driver::IrPeripheral`], so the whole
//!   driver runs against a recorder in tests
//! - An `embedded-hal` [`SpiBus`](embedded_hal::spi::SpiBus) adapter in [`hal`]
//! - Burst decoding for loopback checks
//!
//! ## Usage
//!
//! ```rust,ignore
//! use irblaster::driver::IrBlaster;
//! use irblaster::hal::SpiIrPeripheral;
//!
//! let mut blaster = IrBlaster::new(SpiIrPeripheral::new(spi, clock_register));
//! blaster.send_rc5(0x3A5C)?;
//! ```
//!
//! ## Integration Notes
//!
//! - Pin multiplexing and the 80 MHz system clock are set up by the caller
//! - The carrier is reprogrammed at the start of every frame
//! - Frames block until the last burst has been clocked out
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(any(feature = "std", test)), no_std)]

#[cfg(feature = "global")]
pub use critical_section;

#[cfg(not(feature = "std"))]
pub use heapless;

mod fmt;

pub mod carrier;
pub mod consts;
pub mod driver;
pub mod encoding;
pub mod error;
#[cfg(feature = "global")]
pub mod global;
pub mod hal;
pub mod timing;

pub use error::Error;
