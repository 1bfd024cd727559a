//! Scoped selection and controllers shared between consumers.

use crate::SelectableResource;
use crate::mutex::PortMutex;

/// A selection that is released when the guard goes out of scope.
///
/// Dropping happens on every exit path, so code between `acquire` and the
/// end of the scope can use `?` freely without leaving the mux selected.
pub struct Selected<'a, S>
where
    S: SelectableResource + ?Sized,
{
    mux: &'a mut S,
}

impl<'a, S> Selected<'a, S>
where
    S: SelectableResource + ?Sized,
{
    /// Select `state`. On error nothing is held and nothing needs releasing.
    pub fn acquire(mux: &'a mut S, state: u8) -> Result<Self, S::Error> {
        mux.select(state)?;
        Ok(Self { mux })
    }
}

impl<S> Drop for Selected<'_, S>
where
    S: SelectableResource + ?Sized,
{
    fn drop(&mut self) {
        self.mux.deselect();
    }
}

/// Handle onto a controller that several consumers share.
///
/// Every handle goes through the same [`PortMutex`], so the controller's own
/// exclusion decides who gets to select. A handle only ever deselects a
/// selection it made itself.
pub struct SharedMux<'a, M>
where
    M: PortMutex,
    M::Port: SelectableResource,
{
    mux: &'a M,
    holding: bool,
}

impl<'a, M> SharedMux<'a, M>
where
    M: PortMutex,
    M::Port: SelectableResource,
{
    pub fn new(mux: &'a M) -> Self {
        Self {
            mux,
            holding: false,
        }
    }
}

impl<M> SelectableResource for SharedMux<'_, M>
where
    M: PortMutex,
    M::Port: SelectableResource,
{
    type Error = <M::Port as SelectableResource>::Error;

    fn state_count(&self) -> u8 {
        self.mux.lock(|c| c.state_count())
    }

    fn select(&mut self, state: u8) -> Result<(), Self::Error> {
        self.mux.lock(|c| c.select(state))?;
        self.holding = true;
        Ok(())
    }

    fn deselect(&mut self) {
        if self.holding {
            self.mux.lock(|c| c.deselect());
            self.holding = false;
        }
    }
}

impl<M> Drop for SharedMux<'_, M>
where
    M: PortMutex,
    M::Port: SelectableResource,
{
    fn drop(&mut self) {
        self.deselect();
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::control::{AlwaysEnabled, GpioMuxControl, MuxControlError};
    use core::cell::RefCell;
    use embedded_hal_mock::eh1::digital::{Mock, State, Transaction};
    use std::vec::Vec;

    #[derive(Debug, PartialEq)]
    struct Refused;

    /// Records calls; refuses `select` for one configured state.
    struct Recorder {
        events: Vec<&'static str>,
        refuse: Option<u8>,
    }

    impl SelectableResource for Recorder {
        type Error = Refused;

        fn state_count(&self) -> u8 {
            4
        }

        fn select(&mut self, state: u8) -> Result<(), Refused> {
            if self.refuse == Some(state) {
                self.events.push("refused");
                return Err(Refused);
            }
            self.events.push("select");
            Ok(())
        }

        fn deselect(&mut self) {
            self.events.push("deselect");
        }
    }

    fn work(mux: &mut Recorder, state: u8, fail: bool) -> Result<u8, Refused> {
        let _selected = Selected::acquire(mux, state)?;
        if fail {
            return Err(Refused);
        }
        Ok(state)
    }

    #[test]
    fn test_guard_releases_on_every_path() {
        let mut mux = Recorder {
            events: Vec::new(),
            refuse: Some(3),
        };

        assert_eq!(work(&mut mux, 1, false), Ok(1));
        assert_eq!(work(&mut mux, 2, true), Err(Refused));
        assert_eq!(work(&mut mux, 3, false), Err(Refused));

        assert_eq!(
            mux.events,
            ["select", "deselect", "select", "deselect", "refused"]
        );
    }

    #[test]
    fn test_shared_handles_exclude_each_other() {
        // new() => s0=low, s1=low ; a selects 1 => s0=high, s1=low ; b selects 2 => Busy ;
        // a deselects ; b selects 2 => s0=low, s1=high
        let s0 = Mock::new(&[
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::set(State::Low),
        ]);
        let s1 = Mock::new(&[
            Transaction::set(State::Low),
            Transaction::set(State::Low),
            Transaction::set(State::High),
        ]);

        let control = RefCell::new(GpioMuxControl::new([s0, s1], AlwaysEnabled, 4).unwrap());
        {
            let mut a = SharedMux::new(&control);
            let mut b = SharedMux::new(&control);
            assert_eq!(a.state_count(), 4);

            a.select(1).unwrap();
            assert_eq!(b.select(2), Err(MuxControlError::Busy));
            assert!(!b.holding);

            // b holds nothing, so this must not release a's selection
            b.deselect();
            assert_eq!(control.borrow().selected(), Some(1));

            a.deselect();
            b.select(2).unwrap();
            assert_eq!(control.borrow().selected(), Some(2));
        }
        // dropping b released its selection
        assert_eq!(control.borrow().selected(), None);

        let ([mut s0, mut s1], _) = control.into_inner().into_parts();
        s0.done();
        s1.done();
    }
}
