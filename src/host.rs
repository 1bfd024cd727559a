//! A ready-made parent context for building banks.

use embedded_hal::digital::InputPin;

use crate::SelectableResource;
use crate::error::Unavailable;
use crate::provider::{LineProvider, MuxProvider, Registrar, Registration, ResourceSlot, SlotError};

/// Holds a mux controller and an input pin until a bank claims them, and
/// forwards registration to `R`.
///
/// Either resource may be provided late; creating a bank before that
/// reports a deferred cause.
pub struct Host<S, P, R> {
    pub mux: ResourceSlot<S>,
    pub line: ResourceSlot<P>,
    pub registrar: R,
}

impl<S, P, R> Host<S, P, R> {
    /// A host with nothing provided yet.
    pub fn new(registrar: R) -> Self {
        Self {
            mux: ResourceSlot::Pending,
            line: ResourceSlot::Pending,
            registrar,
        }
    }

    pub fn with_resources(mux: S, line: P, registrar: R) -> Self {
        Self {
            mux: ResourceSlot::Ready(mux),
            line: ResourceSlot::Ready(line),
            registrar,
        }
    }
}

impl<S, P, R> MuxProvider for Host<S, P, R>
where
    S: SelectableResource,
{
    type Mux = S;
    type MuxDescriptor = ();
    type MuxError = SlotError;

    fn acquire_mux(&mut self, _: ()) -> Result<S, Unavailable<SlotError>> {
        self.mux.claim()
    }

    fn release_mux(&mut self, mux: S) {
        // Only a mux claimed from this slot comes back, and a claimed slot
        // refuses `provide`, so the slot is still `Claimed` here.
        let _ = self.mux.restore(mux);
    }
}

impl<S, P, R> LineProvider for Host<S, P, R>
where
    P: InputPin,
{
    type Line = P;
    type LineDescriptor = ();
    type LineError = SlotError;

    fn acquire_line(&mut self, _: ()) -> Result<P, Unavailable<SlotError>> {
        self.line.claim()
    }

    fn release_line(&mut self, line: P) {
        let _ = self.line.restore(line);
    }
}

impl<S, P, R> Registrar for Host<S, P, R>
where
    R: Registrar,
{
    type Handle = R::Handle;
    type RegistrarError = R::RegistrarError;

    fn register(&mut self, registration: &Registration) -> Result<R::Handle, R::RegistrarError> {
        self.registrar.register(registration)
    }

    fn unregister(&mut self, handle: R::Handle) {
        self.registrar.unregister(handle);
    }
}
