//! A generic “mutex” trait with `RefCell` and `critical-section` implementations.

use core::cell::RefCell;

/// Common interface for mutex-like wrappers.
///
/// Everything done inside one `lock` call is serialized against every other
/// `lock` call on the same wrapper.
pub trait PortMutex {
    type Port;

    fn create(port: Self::Port) -> Self;

    fn lock<R, F: FnOnce(&mut Self::Port) -> R>(&self, f: F) -> R;

    /// Consume the wrapper and hand back the port.
    fn into_port(self) -> Self::Port;
}

/// A simple single-threaded “mutex” using `RefCell`.
///
/// Suitable for many embedded-hal use-cases in a single execution context.
impl<T> PortMutex for RefCell<T> {
    type Port = T;

    fn create(port: Self::Port) -> Self {
        RefCell::new(port)
    }

    fn lock<R, F: FnOnce(&mut Self::Port) -> R>(&self, f: F) -> R {
        let mut borrowed = self.borrow_mut();
        f(&mut borrowed)
    }

    fn into_port(self) -> Self::Port {
        self.into_inner()
    }
}

/// Interrupt-safe “mutex”: the closure runs inside a critical section.
///
/// Keep the work short; reads through a bank hold the section for one
/// select, one pin sample and one deselect.
#[cfg(feature = "critical-section")]
impl<T> PortMutex for critical_section::Mutex<RefCell<T>> {
    type Port = T;

    fn create(port: Self::Port) -> Self {
        critical_section::Mutex::new(RefCell::new(port))
    }

    fn lock<R, F: FnOnce(&mut Self::Port) -> R>(&self, f: F) -> R {
        critical_section::with(|cs| {
            let mut borrowed = self.borrow_ref_mut(cs);
            f(&mut borrowed)
        })
    }

    fn into_port(self) -> Self::Port {
        self.into_inner().into_inner()
    }
}
