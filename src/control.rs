//! Multiplexer controller driven by GPIO address pins and an enable pin.

use core::convert::Infallible;

use embedded_hal::digital::{Error as HalError, ErrorKind, ErrorType, OutputPin};

use crate::SelectableResource;

/// Possible errors from the GPIO mux controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MuxControlError {
    /// Requested state is not below `state_count()`.
    InvalidState,
    /// Another state is currently selected.
    Busy,
    /// State count does not fit the address pins.
    InvalidConfig,
    /// Underlying pin error from the HAL pin.
    PinError,
}

impl HalError for MuxControlError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Enable pin for muxes whose enable input is tied active.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysEnabled;

impl ErrorType for AlwaysEnabled {
    type Error = Infallible;
}

impl OutputPin for AlwaysEnabled {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Controller for a 74HC153 / 74HC4052 style mux.
///
/// `BITS` address pins select the state, LSB first. The enable pin is
/// active-low: high while nothing is selected.
pub struct GpioMuxControl<A, E, const BITS: usize>
where
    A: OutputPin,
    E: OutputPin,
{
    address: [A; BITS],
    enable: E,
    states: u8,
    current: Option<u8>,
}

impl<A, E, const BITS: usize> GpioMuxControl<A, E, BITS>
where
    A: OutputPin,
    E: OutputPin,
{
    /// Create a controller exposing `states` states and park all pins.
    pub fn new(mut address: [A; BITS], mut enable: E, states: u8) -> Result<Self, MuxControlError> {
        if states == 0 || BITS > 8 || u16::from(states) > (1u16 << BITS) {
            return Err(MuxControlError::InvalidConfig);
        }

        for pin in address.iter_mut() {
            pin.set_low().map_err(|_| MuxControlError::PinError)?;
        }
        enable.set_high().map_err(|_| MuxControlError::PinError)?;

        Ok(Self {
            address,
            enable,
            states,
            current: None,
        })
    }

    /// Currently selected state, if any.
    pub fn selected(&self) -> Option<u8> {
        self.current
    }

    /// Give the pins back.
    pub fn into_parts(self) -> ([A; BITS], E) {
        (self.address, self.enable)
    }

    fn set_address_bits(&mut self, state: u8) -> Result<(), MuxControlError> {
        for (bit, pin) in self.address.iter_mut().enumerate() {
            if state & (1 << bit) != 0 {
                pin.set_high().map_err(|_| MuxControlError::PinError)?;
            } else {
                pin.set_low().map_err(|_| MuxControlError::PinError)?;
            }
        }
        Ok(())
    }
}

impl<A, E, const BITS: usize> SelectableResource for GpioMuxControl<A, E, BITS>
where
    A: OutputPin,
    E: OutputPin,
{
    type Error = MuxControlError;

    fn state_count(&self) -> u8 {
        self.states
    }

    fn select(&mut self, state: u8) -> Result<(), MuxControlError> {
        if state >= self.states {
            return Err(MuxControlError::InvalidState);
        }
        if self.current.is_some() {
            return Err(MuxControlError::Busy);
        }

        self.set_address_bits(state)?;
        self.enable.set_low().map_err(|_| MuxControlError::PinError)?;
        self.current = Some(state);
        Ok(())
    }

    fn deselect(&mut self) {
        if self.current.take().is_some() {
            // A stuck enable pin is not the caller's problem; the next
            // select reprograms every pin anyway.
            let _ = self.enable.set_high();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{Mock, State, Transaction};

    #[test]
    fn test_init_and_select() {
        // 1) new() => s0=low, s1=low, en=high
        // 2) select(2) => s0=low, s1=high, en=low
        // 3) deselect() => en=high

        let s0 = Mock::new(&[Transaction::set(State::Low), Transaction::set(State::Low)]);
        let s1 = Mock::new(&[Transaction::set(State::Low), Transaction::set(State::High)]);
        let en = Mock::new(&[
            Transaction::set(State::High),
            Transaction::set(State::Low),
            Transaction::set(State::High),
        ]);

        let mut mux = GpioMuxControl::new([s0, s1], en, 4).expect("Failed to create controller");
        assert_eq!(mux.state_count(), 4);

        mux.select(2).unwrap();
        assert_eq!(mux.selected(), Some(2));
        mux.deselect();
        assert_eq!(mux.selected(), None);

        let ([mut s0, mut s1], mut en) = mux.into_parts();
        s0.done();
        s1.done();
        en.done();
    }

    #[test]
    fn test_select_while_busy() {
        // new(), select(1), select(0) => Busy => no pin calls, deselect()

        let s0 = Mock::new(&[Transaction::set(State::Low), Transaction::set(State::High)]);
        let s1 = Mock::new(&[Transaction::set(State::Low), Transaction::set(State::Low)]);
        let en = Mock::new(&[
            Transaction::set(State::High),
            Transaction::set(State::Low),
            Transaction::set(State::High),
        ]);

        let mut mux = GpioMuxControl::new([s0, s1], en, 4).unwrap();

        mux.select(1).unwrap();
        assert_eq!(mux.select(0), Err(MuxControlError::Busy));
        // even the same state is exclusive
        assert_eq!(mux.select(1), Err(MuxControlError::Busy));
        mux.deselect();
        // nothing selected => no pin calls
        mux.deselect();

        let ([mut s0, mut s1], mut en) = mux.into_parts();
        s0.done();
        s1.done();
        en.done();
    }

    #[test]
    fn test_out_of_range_state() {
        let s0 = Mock::new(&[Transaction::set(State::Low)]);
        let s1 = Mock::new(&[Transaction::set(State::Low)]);

        let mut mux = GpioMuxControl::new([s0, s1], AlwaysEnabled, 3).unwrap();
        assert_eq!(mux.select(3), Err(MuxControlError::InvalidState));

        let ([mut s0, mut s1], _) = mux.into_parts();
        s0.done();
        s1.done();
    }

    #[test]
    fn test_invalid_config() {
        let s0 = Mock::new(&[]);
        let en = Mock::new(&[]);
        let mut s0_check = s0.clone();
        let mut en_check = en.clone();

        // one address pin can only route two inputs
        let res = GpioMuxControl::new([s0], en, 3);
        assert!(matches!(res, Err(MuxControlError::InvalidConfig)));

        s0_check.done();
        en_check.done();
    }
}
