//! Infrared carrier driver built on an SPI clock divider.
//!
//! This module provides the [`IrBlaster`] struct, which programs an SPI block's
//! clock divider as an IR carrier and then gates that carrier on and off with
//! all-zero / all-one data transactions to send pulse-distance frames.
//!
//! The driver never touches registers directly. Everything goes through an
//! [`IrPeripheral`] handle that it owns, so tests can substitute a recorder and
//! ports can provide their own register access. For any HAL exposing an
//! `embedded_hal::spi::SpiBus`, see [`crate::hal::SpiIrPeripheral`].
//!
//! ## Example
//!
//! ```rust
//! use irblaster::carrier::{ClockFields, TransportMode};
//! use irblaster::driver::{IrBlaster, IrPeripheral};
//!
//! struct Null;
//!
//! impl IrPeripheral for Null {
//!     type Error = core::convert::Infallible;
//!
//!     fn set_transport_mode(&mut self, _: &TransportMode) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//!     fn write_clock_register(&mut self, _: ClockFields) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//!     fn issue_transaction(&mut self, _: u8, _: u32) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//! }
//!
//! let mut blaster = IrBlaster::new(Null);
//! blaster.send_rc5(0x3A5C).unwrap();
//! assert_eq!(blaster.frames_sent, 1);
//! ```
//!
//! ## Design Notes
//!
//! The carrier is reconfigured from scratch at the start of every frame. Nothing
//! about the previous configuration is cached, so a frame always goes out with
//! the dividers its [`Protocol`] asks for even if something else reprogrammed
//! the SPI block in between.

use crate::carrier::{CarrierFrequency, CarrierTiming, ClockFields, DutyCycle, TransportMode};
use crate::consts::{BURST_CYCLES, MAX_BURST_CYCLES, RC5_BITS};
#[cfg(not(feature = "std"))]
use crate::consts::MAX_BURSTS_USIZE;
use crate::encoding::{Burst, BurstEncoding, BurstPair, Command};
use crate::error::Error;
use crate::fmt::{debug, trace, warn};

use core::fmt::Debug;

#[cfg(not(feature = "std"))]
use heapless::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

/// Hardware primitives the driver needs from an SPI block.
///
/// All three calls block until the hardware has accepted the request.
/// Implementations own the peripheral; the driver owns the implementation.
pub trait IrPeripheral {
    /// Error reported by the underlying hardware access.
    type Error: Debug;

    /// Selects which transaction phases run and the output bit order.
    fn set_transport_mode(&mut self, mode: &TransportMode) -> Result<(), Self::Error>;

    /// Overwrites the clock-divider register with `fields`.
    ///
    /// The fields arrive unmasked; masking to the register's widths is up to
    /// the implementation.
    fn write_clock_register(&mut self, fields: ClockFields) -> Result<(), Self::Error>;

    /// Clocks out the top `bit_count` bits of `bit_pattern`, MSB first.
    fn issue_transaction(&mut self, bit_count: u8, bit_pattern: u32) -> Result<(), Self::Error>;
}

/// Carrier and framing parameters for one IR protocol.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Protocol {
    /// Carrier frequency selector.
    pub frequency: CarrierFrequency,
    /// Carrier duty cycle selector.
    pub duty_cycle: DutyCycle,
    /// SPI clock cycles per half-bit burst, `1..=32`.
    ///
    /// Each burst is one transaction carrying a 32-bit pattern, so longer
    /// bursts cannot be expressed. Sending with a value outside the range
    /// fails with [`Error::InvalidBurst`] before the carrier is touched.
    pub burst_cycles: u8,
    /// Which half of a bit window carries a `1`.
    pub encoding: BurstEncoding,
    /// Frame length used by [`IrBlaster::send_value`].
    pub bit_length: u8,
}

impl Protocol {
    /// RC5: 36 kHz, 25 % duty, 32-cycle bursts, 14-bit frames.
    pub const RC5: Self = Self {
        frequency: CarrierFrequency::F36kHz,
        duty_cycle: DutyCycle::Percent25,
        burst_cycles: BURST_CYCLES,
        encoding: BurstEncoding::LowHighIsOne,
        bit_length: RC5_BITS,
    };

    /// Same framing with a different carrier.
    pub const fn with_carrier(self, frequency: CarrierFrequency, duty_cycle: DutyCycle) -> Self {
        Self {
            frequency,
            duty_cycle,
            ..self
        }
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Self::RC5
    }
}

/// An IR transmitter driving an SPI block through an [`IrPeripheral`].
///
/// ## Type Parameters
///
/// - `P`: the owned peripheral handle
///
/// ## Notes
///
/// - One instance per SPI block. Configuration is a full overwrite, so two
///   drivers sharing a block would silently fight over the dividers.
/// - Every send blocks until the last burst has been clocked out.
#[derive(Debug)]
pub struct IrBlaster<P>
where
    P: IrPeripheral,
{
    /// The owned peripheral handle.
    pub peripheral: P,
    /// Protocol used by [`send`](Self::send) and [`send_value`](Self::send_value).
    pub protocol: Protocol,
    /// Counter of frames sent in full.
    pub frames_sent: u16,
    /// Counter of frames aborted by a peripheral error.
    pub frames_failed: u16,
}

impl<P> IrBlaster<P>
where
    P: IrPeripheral,
{
    /// Creates a driver using the [`Protocol::RC5`] parameters.
    pub fn new(peripheral: P) -> Self {
        Self::with_protocol(peripheral, Protocol::RC5)
    }

    /// Creates a driver with explicit protocol parameters.
    pub fn with_protocol(peripheral: P, protocol: Protocol) -> Self {
        Self {
            peripheral,
            protocol,
            frames_sent: 0,
            frames_failed: 0,
        }
    }

    /// Consumes the driver, returning the peripheral handle.
    pub fn release(self) -> P {
        self.peripheral
    }

    /// Programs the SPI block to emit the carrier described by `frequency` and
    /// `duty_cycle`.
    ///
    /// # Behavior
    /// - Sets the transport to output-only, MSB first, every other phase off
    /// - Resolves the dividers with [`CarrierTiming::resolve`]
    /// - Writes `(pre_divider - 1, cycle_count - 1, high_count, 0)` in one
    ///   register write
    ///
    /// # Returns
    /// The timing that was written.
    pub fn configure_carrier(
        &mut self,
        frequency: CarrierFrequency,
        duty_cycle: DutyCycle,
    ) -> Result<CarrierTiming, Error<P::Error>> {
        self.peripheral.set_transport_mode(&TransportMode::OUTPUT_ONLY)?;

        let timing = CarrierTiming::resolve(frequency, duty_cycle);
        debug!(
            "carrier {:?} / {:?}: prediv {} cntdiv {} high {}",
            frequency,
            duty_cycle,
            timing.pre_divider(),
            timing.cycle_count(),
            timing.high_count()
        );
        self.peripheral.write_clock_register(timing.fields())?;
        Ok(timing)
    }

    /// Sends the low `bit_length` bits of `command` using the driver's protocol.
    ///
    /// See [`send`](Self::send).
    pub fn encode_command(&mut self, command: u32, bit_length: u8) -> Result<(), Error<P::Error>> {
        self.send(&Command::new(command, bit_length))
    }

    /// Sends `value` with the protocol's default frame length.
    pub fn send_value(&mut self, value: u32) -> Result<(), Error<P::Error>> {
        self.send(&Command::new(value, self.protocol.bit_length))
    }

    /// Sends a 14-bit RC5 frame at 36 kHz / 25 %, regardless of the driver's
    /// configured protocol.
    pub fn send_rc5(&mut self, value: u32) -> Result<(), Error<P::Error>> {
        self.send_with(&Protocol::RC5, &Command::new(value, RC5_BITS))
    }

    /// Sends `command` using the driver's protocol.
    pub fn send(&mut self, command: &Command) -> Result<(), Error<P::Error>> {
        let protocol = self.protocol;
        self.send_with(&protocol, command)
    }

    /// Configures the carrier for `protocol` once, then emits one burst pair
    /// per bit of `command`, most significant first.
    ///
    /// # Behavior
    /// - A `1` bit is a low burst followed by a high burst, a `0` the reverse
    ///   (for [`BurstEncoding::LowHighIsOne`])
    /// - A zero-length command configures the carrier and sends nothing
    /// - The first failing primitive aborts the frame; bursts already clocked
    ///   out are not retracted
    /// - A `burst_cycles` outside `1..=32` fails with [`Error::InvalidBurst`]
    ///   before any primitive is called
    pub fn send_with(
        &mut self,
        protocol: &Protocol,
        command: &Command,
    ) -> Result<(), Error<P::Error>> {
        match self.transmit(protocol, command) {
            Ok(()) => {
                self.frames_sent = self.frames_sent.wrapping_add(1);
                Ok(())
            }
            Err(err) => {
                self.frames_failed = self.frames_failed.wrapping_add(1);
                Err(err)
            }
        }
    }

    fn transmit(&mut self, protocol: &Protocol, command: &Command) -> Result<(), Error<P::Error>> {
        if protocol.burst_cycles == 0 || protocol.burst_cycles > MAX_BURST_CYCLES {
            warn!("burst of {} cycles does not fit one pattern", protocol.burst_cycles);
            return Err(Error::InvalidBurst(protocol.burst_cycles));
        }
        let _ = self.configure_carrier(protocol.frequency, protocol.duty_cycle)?;
        debug!(
            "sending {:#x} ({} bits)",
            command.significant(),
            command.bit_length()
        );
        for bit in command.bits() {
            let BurstPair(first, second) = protocol.encoding.pair(bit, protocol.burst_cycles);
            trace!("bit {}", bit);
            self.issue_burst(first)?;
            self.issue_burst(second)?;
        }
        Ok(())
    }

    fn issue_burst(&mut self, burst: Burst) -> Result<(), Error<P::Error>> {
        self.peripheral.issue_transaction(burst.cycles, burst.pattern())?;
        Ok(())
    }

    /// Returns the bursts `command` would produce under the driver's protocol,
    /// without touching the peripheral.
    #[cfg(not(feature = "std"))]
    pub fn plan(&self, command: &Command) -> Vec<Burst, MAX_BURSTS_USIZE> {
        let mut bursts = Vec::new();
        for bit in command.bits() {
            let BurstPair(first, second) =
                self.protocol.encoding.pair(bit, self.protocol.burst_cycles);
            // Command caps bit_length at 32, so 64 bursts always fit
            let _ = bursts.push(first);
            let _ = bursts.push(second);
        }
        bursts
    }

    /// Returns the bursts `command` would produce under the driver's protocol,
    /// without touching the peripheral.
    #[cfg(feature = "std")]
    pub fn plan(&self, command: &Command) -> Vec<Burst> {
        let mut bursts = Vec::with_capacity(usize::from(command.bit_length()) * 2);
        for bit in command.bits() {
            let BurstPair(first, second) =
                self.protocol.encoding.pair(bit, self.protocol.burst_cycles);
            bursts.push(first);
            bursts.push(second);
        }
        bursts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{PATTERN_HIGH, PATTERN_LOW};
    use crate::encoding::decode_bursts;
    use std::vec::Vec as StdVec;

    #[derive(PartialEq, Eq, Clone, Copy, Debug)]
    enum Call {
        Mode(TransportMode),
        Clock(ClockFields),
        Tx(u8, u32),
    }

    /// Records every primitive call. Can fail the transport-mode or clock
    /// write, or the nth transaction.
    #[derive(Debug, Default)]
    struct Recorder {
        calls: StdVec<Call>,
        fail_mode: bool,
        fail_clock: bool,
        fail_tx_at: Option<usize>,
        tx_count: usize,
    }

    #[derive(Debug, PartialEq, Eq)]
    struct Fault;

    impl IrPeripheral for Recorder {
        type Error = Fault;

        fn set_transport_mode(&mut self, mode: &TransportMode) -> Result<(), Fault> {
            if self.fail_mode {
                return Err(Fault);
            }
            self.calls.push(Call::Mode(*mode));
            Ok(())
        }

        fn write_clock_register(&mut self, fields: ClockFields) -> Result<(), Fault> {
            if self.fail_clock {
                return Err(Fault);
            }
            self.calls.push(Call::Clock(fields));
            Ok(())
        }

        fn issue_transaction(&mut self, bit_count: u8, bit_pattern: u32) -> Result<(), Fault> {
            if self.fail_tx_at == Some(self.tx_count) {
                return Err(Fault);
            }
            self.tx_count += 1;
            self.calls.push(Call::Tx(bit_count, bit_pattern));
            Ok(())
        }
    }

    impl Recorder {
        fn transactions(&self) -> StdVec<Burst> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Tx(cycles, pattern) => Some(Burst {
                        cycles: *cycles,
                        active: *pattern == PATTERN_HIGH,
                    }),
                    _ => None,
                })
                .collect()
        }

        fn clock_writes(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, Call::Clock(_)))
                .count()
        }
    }

    const LOW: Call = Call::Tx(BURST_CYCLES, PATTERN_LOW);
    const HIGH: Call = Call::Tx(BURST_CYCLES, PATTERN_HIGH);

    #[test]
    fn test_configure_carrier_writes_mode_then_dividers() {
        let mut blaster = IrBlaster::new(Recorder::default());
        let timing = blaster
            .configure_carrier(CarrierFrequency::F38kHz, DutyCycle::Percent50)
            .unwrap();

        assert_eq!(timing.high_count(), 105);
        assert_eq!(
            blaster.peripheral.calls,
            vec![
                Call::Mode(TransportMode::OUTPUT_ONLY),
                Call::Clock(ClockFields {
                    pre_divider: 9,
                    cycle_count: 209,
                    high_count: 105,
                    low_count: 0,
                }),
            ]
        );
    }

    #[test]
    fn test_unknown_selectors_configure_default_carrier() {
        let mut blaster = IrBlaster::new(Recorder::default());
        let _ = blaster
            .configure_carrier(CarrierFrequency::from_raw(0x7F), DutyCycle::from_raw(0x42))
            .unwrap();
        assert_eq!(
            blaster.peripheral.calls[1],
            Call::Clock(ClockFields {
                pre_divider: 9,
                cycle_count: 221,
                high_count: 55,
                low_count: 0,
            })
        );
    }

    #[test]
    fn test_encode_command_two_bits() {
        let mut blaster = IrBlaster::new(Recorder::default());
        blaster.encode_command(0b10, 2).unwrap();

        assert_eq!(&blaster.peripheral.calls[2..], &[LOW, HIGH, HIGH, LOW]);
        assert_eq!(blaster.frames_sent, 1);
    }

    #[test]
    fn test_encode_zero_command() {
        for n in 1..=16u8 {
            let mut blaster = IrBlaster::new(Recorder::default());
            blaster.encode_command(0, n).unwrap();

            let tx = &blaster.peripheral.calls[2..];
            assert_eq!(tx.len(), usize::from(n) * 2);
            for pair in tx.chunks(2) {
                assert_eq!(pair, &[HIGH, LOW]);
            }
        }
    }

    #[test]
    fn test_carrier_configured_once_before_transactions() {
        for n in [0u8, 1, 14, 32] {
            let mut blaster = IrBlaster::new(Recorder::default());
            blaster.encode_command(0x1234_5678, n).unwrap();

            let calls = &blaster.peripheral.calls;
            assert_eq!(blaster.peripheral.clock_writes(), 1);
            assert!(matches!(calls[0], Call::Mode(_)));
            assert!(matches!(calls[1], Call::Clock(_)));
            assert!(calls[2..].iter().all(|c| matches!(c, Call::Tx(..))));
            assert_eq!(calls.len(), 2 + usize::from(n) * 2);
        }
    }

    #[test]
    fn test_every_frame_reconfigures() {
        let mut blaster = IrBlaster::new(Recorder::default());
        blaster.encode_command(1, 1).unwrap();
        blaster.encode_command(1, 1).unwrap();
        assert_eq!(blaster.peripheral.clock_writes(), 2);
        assert_eq!(blaster.frames_sent, 2);
    }

    #[test]
    fn test_sent_bursts_decode_to_command() {
        let mut blaster = IrBlaster::new(Recorder::default());
        blaster.encode_command(0xCAFE, 16).unwrap();

        let decoded = decode_bursts(&blaster.peripheral.transactions(), BurstEncoding::default())
            .unwrap();
        assert_eq!(decoded.significant(), 0xCAFE);
        assert_eq!(decoded.bit_length(), 16);
    }

    #[test]
    fn test_send_rc5_uses_reference_carrier() {
        let protocol = Protocol::RC5.with_carrier(CarrierFrequency::F56kHz, DutyCycle::Percent50);
        let mut blaster = IrBlaster::with_protocol(Recorder::default(), protocol);
        blaster.send_rc5(0x3FFF).unwrap();

        assert_eq!(
            blaster.peripheral.calls[1],
            Call::Clock(ClockFields {
                pre_divider: 9,
                cycle_count: 221,
                high_count: 55,
                low_count: 0,
            })
        );
        assert_eq!(blaster.peripheral.transactions().len(), 28);
    }

    #[test]
    fn test_send_value_uses_protocol() {
        let protocol = Protocol {
            frequency: CarrierFrequency::F40kHz,
            duty_cycle: DutyCycle::Percent33,
            burst_cycles: 16,
            encoding: BurstEncoding::HighLowIsOne,
            bit_length: 3,
        };
        let mut blaster = IrBlaster::with_protocol(Recorder::default(), protocol);
        blaster.send_value(0b100).unwrap();

        assert_eq!(
            blaster.peripheral.calls[1],
            Call::Clock(ClockFields {
                pre_divider: 9,
                cycle_count: 199,
                high_count: 66,
                low_count: 0,
            })
        );
        assert_eq!(
            &blaster.peripheral.calls[2..],
            &[
                Call::Tx(16, PATTERN_HIGH),
                Call::Tx(16, PATTERN_LOW),
                Call::Tx(16, PATTERN_LOW),
                Call::Tx(16, PATTERN_HIGH),
                Call::Tx(16, PATTERN_LOW),
                Call::Tx(16, PATTERN_HIGH),
            ]
        );
    }

    #[test]
    fn test_transaction_failure_aborts_frame() {
        let recorder = Recorder {
            fail_tx_at: Some(3),
            ..Default::default()
        };
        let mut blaster = IrBlaster::new(recorder);

        assert_eq!(blaster.encode_command(0xFF, 8), Err(Error::Peripheral(Fault)));
        assert_eq!(blaster.peripheral.transactions().len(), 3);
        assert_eq!(blaster.frames_sent, 0);
        assert_eq!(blaster.frames_failed, 1);
    }

    #[test]
    fn test_clock_register_failure_aborts_before_bursts() {
        let recorder = Recorder {
            fail_clock: true,
            ..Default::default()
        };
        let mut blaster = IrBlaster::new(recorder);

        assert_eq!(blaster.encode_command(0xFF, 8), Err(Error::Peripheral(Fault)));
        assert_eq!(blaster.peripheral.calls, vec![Call::Mode(TransportMode::OUTPUT_ONLY)]);
        assert_eq!(blaster.frames_sent, 0);
        assert_eq!(blaster.frames_failed, 1);
    }

    #[test]
    fn test_transport_mode_failure_aborts_frame() {
        let recorder = Recorder {
            fail_mode: true,
            ..Default::default()
        };
        let mut blaster = IrBlaster::new(recorder);

        assert_eq!(blaster.send_rc5(0x3A5C), Err(Error::Peripheral(Fault)));
        assert_eq!(
            blaster.configure_carrier(CarrierFrequency::F38kHz, DutyCycle::Percent50),
            Err(Error::Peripheral(Fault))
        );
        assert!(blaster.peripheral.calls.is_empty());
        assert_eq!(blaster.frames_failed, 1);
    }

    #[test]
    fn test_unusable_burst_length_is_rejected() {
        for burst_cycles in [0, MAX_BURST_CYCLES + 1, u8::MAX] {
            let protocol = Protocol {
                burst_cycles,
                ..Protocol::RC5
            };
            let mut blaster = IrBlaster::with_protocol(Recorder::default(), protocol);

            assert_eq!(blaster.send_value(0x2A), Err(Error::InvalidBurst(burst_cycles)));
            assert!(blaster.peripheral.calls.is_empty());
            assert_eq!(blaster.frames_failed, 1);
        }

        let protocol = Protocol {
            burst_cycles: MAX_BURST_CYCLES,
            ..Protocol::RC5
        };
        let mut blaster = IrBlaster::with_protocol(Recorder::default(), protocol);
        blaster.send_value(0x2A).unwrap();
        assert_eq!(blaster.frames_sent, 1);
    }

    #[test]
    fn test_plan_matches_sent_bursts() {
        let mut blaster = IrBlaster::new(Recorder::default());
        let command = Command::new(0x2A5, 14);
        let planned = blaster.plan(&command);
        blaster.send(&command).unwrap();

        assert_eq!(&planned[..], &blaster.peripheral.transactions()[..]);
    }

    #[test]
    fn test_release_returns_peripheral() {
        let mut blaster = IrBlaster::new(Recorder::default());
        blaster.encode_command(1, 1).unwrap();
        let recorder = blaster.release();
        assert_eq!(recorder.calls.len(), 4);
    }
}
