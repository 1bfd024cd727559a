//! Collaborators a bank needs from its parent context.
//!
//! A parent context hands out the mux controller and the physical input
//! pin, takes them back on teardown, and makes the bank's lines known to the
//! rest of the system through a [`Registrar`].

use core::mem;

use embedded_hal::digital::InputPin;

use crate::error::Unavailable;
use crate::{Direction, SelectableResource};

/// Hands out multiplexer controllers.
pub trait MuxProvider {
    type Mux: SelectableResource;
    type MuxDescriptor;
    type MuxError: core::fmt::Debug;

    fn acquire_mux(
        &mut self,
        descriptor: Self::MuxDescriptor,
    ) -> Result<Self::Mux, Unavailable<Self::MuxError>>;

    fn release_mux(&mut self, mux: Self::Mux);
}

/// Hands out physical input pins.
pub trait LineProvider {
    type Line: InputPin;
    type LineDescriptor;
    type LineError: core::fmt::Debug;

    fn acquire_line(
        &mut self,
        descriptor: Self::LineDescriptor,
    ) -> Result<Self::Line, Unavailable<Self::LineError>>;

    fn release_line(&mut self, line: Self::Line);
}

/// What a bank tells the host about itself when it registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Registration {
    pub label: &'static str,
    pub line_count: u8,
    pub direction: Direction,
    /// Reads may block on the shared mux.
    pub can_sleep: bool,
}

impl Registration {
    pub fn input_bank(label: &'static str, line_count: u8) -> Self {
        Self {
            label,
            line_count,
            direction: Direction::Input,
            can_sleep: true,
        }
    }
}

/// Makes banks addressable to the rest of the system.
pub trait Registrar {
    type Handle;
    type RegistrarError: core::fmt::Debug;

    fn register(
        &mut self,
        registration: &Registration,
    ) -> Result<Self::Handle, Self::RegistrarError>;

    fn unregister(&mut self, handle: Self::Handle);
}

/// Errors from a [`ResourceSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotError {
    /// The resource has been handed out and not returned.
    Claimed,
}

/// Storage for a single resource that is provided at some point, claimed
/// by one consumer and possibly returned.
#[derive(Debug)]
pub enum ResourceSlot<T> {
    /// Not provided yet.
    Pending,
    Ready(T),
    Claimed,
}

impl<T> Default for ResourceSlot<T> {
    fn default() -> Self {
        ResourceSlot::Pending
    }
}

impl<T> ResourceSlot<T> {
    /// Make the resource available in an empty slot.
    ///
    /// A slot that already holds or has handed out a resource refuses and
    /// gives `resource` back.
    pub fn provide(&mut self, resource: T) -> Result<(), T> {
        match self {
            ResourceSlot::Pending => {
                *self = ResourceSlot::Ready(resource);
                Ok(())
            }
            ResourceSlot::Ready(_) | ResourceSlot::Claimed => Err(resource),
        }
    }

    /// Take the resource. A pending slot reports [`Unavailable::Deferred`].
    pub fn claim(&mut self) -> Result<T, Unavailable<SlotError>> {
        match mem::replace(self, ResourceSlot::Claimed) {
            ResourceSlot::Ready(resource) => Ok(resource),
            ResourceSlot::Pending => {
                *self = ResourceSlot::Pending;
                Err(Unavailable::Deferred)
            }
            ResourceSlot::Claimed => Err(Unavailable::Failed(SlotError::Claimed)),
        }
    }

    /// Hand a claimed resource back. Only a claimed slot accepts it.
    pub fn restore(&mut self, resource: T) -> Result<(), T> {
        match self {
            ResourceSlot::Claimed => {
                *self = ResourceSlot::Ready(resource);
                Ok(())
            }
            ResourceSlot::Pending | ResourceSlot::Ready(_) => Err(resource),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ResourceSlot::Ready(_))
    }
}
