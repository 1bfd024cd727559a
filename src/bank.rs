use core::marker::PhantomData;

use embedded_hal::digital::{ErrorType, InputPin};

use crate::error::{CreateError, ReadError};
use crate::mutex::PortMutex;
use crate::provider::{LineProvider, MuxProvider, Registrar, Registration};
use crate::select::Selected;
use crate::{Direction, InputBank, SelectableResource};

/// The two resources a bank owns, kept behind the bank's mutex.
pub struct BankPort<S, P>
where
    S: SelectableResource,
    P: InputPin,
{
    mux: S,
    line: P,
}

impl<S, P> BankPort<S, P>
where
    S: SelectableResource,
    P: InputPin,
{
    /// Select `index`, sample the pin, deselect.
    fn sample(&mut self, index: u8) -> Result<bool, ReadError<S::Error, P::Error>> {
        let _selected = Selected::acquire(&mut self.mux, index).map_err(ReadError::SelectFailed)?;
        self.line.is_high().map_err(ReadError::ReadFailed)
    }
}

/// `line_count` virtual inputs read through one pin and a mux.
///
/// `M` serializes reads (e.g. `RefCell`), `T` is the handle the registrar
/// returned for this bank. Reads report `P::is_high`; an active-low input
/// must be inverted by the supplied pin.
pub struct MuxedInputBank<M, S, P, T>
where
    M: PortMutex<Port = BankPort<S, P>>,
    S: SelectableResource,
    P: InputPin,
{
    port: M,
    line_count: u8,
    label: &'static str,
    handle: T,
}

impl<M, S, P, T> MuxedInputBank<M, S, P, T>
where
    M: PortMutex<Port = BankPort<S, P>>,
    S: SelectableResource,
    P: InputPin,
{
    /// Acquire the mux, then the pin, then register with the host.
    ///
    /// Any failure hands back what was already acquired, most recent first.
    pub fn create<C>(
        ctx: &mut C,
        label: &'static str,
        mux: C::MuxDescriptor,
        line: C::LineDescriptor,
    ) -> Result<Self, CreateError<C::MuxError, C::LineError, C::RegistrarError>>
    where
        C: MuxProvider<Mux = S> + LineProvider<Line = P> + Registrar<Handle = T>,
    {
        let mux = ctx.acquire_mux(mux).map_err(|cause| {
            #[cfg(feature = "defmt")]
            if !cause.is_deferred() {
                defmt::warn!("{}: unable to get mux", label);
            }
            CreateError::MuxUnavailable(cause)
        })?;

        let line = match ctx.acquire_line(line) {
            Ok(line) => line,
            Err(cause) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("{}: unable to claim input pin", label);
                ctx.release_mux(mux);
                return Err(CreateError::LineUnavailable(cause));
            }
        };

        let line_count = mux.state_count();
        let handle = match ctx.register(&Registration::input_bank(label, line_count)) {
            Ok(handle) => handle,
            Err(err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("{}: unable to register {} lines", label, line_count);
                ctx.release_line(line);
                ctx.release_mux(mux);
                return Err(CreateError::RegistrationFailed(err));
            }
        };

        #[cfg(feature = "defmt")]
        defmt::debug!("{}: registered {} lines", label, line_count);

        Ok(Self {
            port: M::create(BankPort { mux, line }),
            line_count,
            label,
            handle,
        })
    }

    /// Unregister, then release the pin, then the mux.
    pub fn destroy<C>(self, ctx: &mut C)
    where
        C: MuxProvider<Mux = S> + LineProvider<Line = P> + Registrar<Handle = T>,
    {
        #[cfg(feature = "defmt")]
        defmt::debug!("{}: removing {} lines", self.label, self.line_count);

        ctx.unregister(self.handle);
        let BankPort { mux, line } = self.port.into_port();
        ctx.release_line(line);
        ctx.release_mux(mux);
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn handle(&self) -> &T {
        &self.handle
    }

    /// All lines, in index order.
    pub fn lines(&self) -> impl Iterator<Item = MuxedLine<'_, M, S, P>> {
        let port = &self.port;
        (0..self.line_count).map(move |index| MuxedLine::new(port, index))
    }

    fn check(&self, index: u8) -> Result<(), ReadError<S::Error, P::Error>> {
        if index < self.line_count {
            Ok(())
        } else {
            Err(ReadError::InvalidIndex)
        }
    }
}

impl<M, S, P, T> InputBank for MuxedInputBank<M, S, P, T>
where
    M: PortMutex<Port = BankPort<S, P>>,
    S: SelectableResource,
    P: InputPin,
{
    type Error = ReadError<S::Error, P::Error>;

    type Line<'a>
        = MuxedLine<'a, M, S, P>
    where
        Self: 'a;

    fn line_count(&self) -> u8 {
        self.line_count
    }

    fn get(&self, index: u8) -> Result<bool, Self::Error> {
        self.check(index)?;
        self.port.lock(|port| port.sample(index))
    }

    fn direction(&self, _index: u8) -> Direction {
        Direction::Input
    }

    fn set_direction(&self, index: u8, direction: Direction) -> Result<(), Self::Error> {
        match direction {
            Direction::Output => Err(ReadError::Unsupported),
            Direction::Input => self.check(index),
        }
    }

    fn set(&self, _index: u8, _high: bool) -> Result<(), Self::Error> {
        Err(ReadError::Unsupported)
    }

    fn line(&self, index: u8) -> Result<Self::Line<'_>, Self::Error> {
        self.check(index)?;
        Ok(MuxedLine::new(&self.port, index))
    }
}

/// A proxy implementing `embedded_hal::digital::InputPin` for one logical line.
pub struct MuxedLine<'a, M, S, P>
where
    M: PortMutex<Port = BankPort<S, P>>,
    S: SelectableResource,
    P: InputPin,
{
    port: &'a M,
    index: u8,
    _resources: PhantomData<(S, P)>,
}

impl<'a, M, S, P> MuxedLine<'a, M, S, P>
where
    M: PortMutex<Port = BankPort<S, P>>,
    S: SelectableResource,
    P: InputPin,
{
    pub(crate) fn new(port: &'a M, index: u8) -> Self {
        Self {
            port,
            index,
            _resources: PhantomData,
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }
}

impl<M, S, P> ErrorType for MuxedLine<'_, M, S, P>
where
    M: PortMutex<Port = BankPort<S, P>>,
    S: SelectableResource,
    P: InputPin,
{
    type Error = ReadError<S::Error, P::Error>;
}

impl<M, S, P> InputPin for MuxedLine<'_, M, S, P>
where
    M: PortMutex<Port = BankPort<S, P>>,
    S: SelectableResource,
    P: InputPin,
{
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.port.lock(|port| port.sample(self.index))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}
