#![no_std]

//! Virtual input pins behind a multiplexer.
//!
//! A [`MuxedInputBank`](bank::MuxedInputBank) owns one physical input pin and
//! the controller of a multiplexer (for example a 74HC153) whose selected
//! input is routed to that pin. Reading logical line `i` selects state `i`,
//! samples the pin and deselects again, all inside one lock of the bank's
//! [`PortMutex`](mutex::PortMutex).
//!
//! # Features
//!
//! - `critical-section`: `PortMutex` for `critical_section::Mutex<RefCell<T>>`
//! - `defmt`: `defmt::Format` on public types and logging on construction paths

pub mod bank;
pub mod control;
pub mod error;
pub mod host;
pub mod mutex;
pub mod provider;
pub mod registry;
pub mod select;

use embedded_hal::digital::{Error as HalError, InputPin};

pub use bank::{MuxedInputBank, MuxedLine};
pub use error::{CreateError, ReadError, Unavailable};

/// Direction of a logical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Input,
    Output,
}

/// A multiplexer controller with a fixed number of mutually exclusive states.
///
/// At most one state is selected at a time. `select` may refuse while a
/// state is held; `deselect` always succeeds from the caller's point of view.
pub trait SelectableResource {
    type Error: core::fmt::Debug;

    /// Number of states, fixed for the lifetime of the controller.
    fn state_count(&self) -> u8;

    /// Route `state` to the common output.
    fn select(&mut self, state: u8) -> Result<(), Self::Error>;

    /// Release the current selection, if any.
    fn deselect(&mut self);
}

/// A bank of input-only lines addressed by index.
pub trait InputBank {
    type Error: HalError;

    type Line<'a>: InputPin<Error = Self::Error>
    where
        Self: 'a;

    fn line_count(&self) -> u8;

    /// Sample line `index`.
    fn get(&self, index: u8) -> Result<bool, Self::Error>;

    /// Lines are always inputs.
    fn direction(&self, index: u8) -> Direction;

    fn set_direction(&self, index: u8, direction: Direction) -> Result<(), Self::Error>;

    /// Driving a line is never supported.
    fn set(&self, index: u8, high: bool) -> Result<(), Self::Error>;

    /// Borrow line `index` as a standalone input pin.
    fn line(&self, index: u8) -> Result<Self::Line<'_>, Self::Error>;
}
