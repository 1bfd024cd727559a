//! Global line numbering for registered banks.

use crate::provider::{Registrar, Registration};

/// Possible errors from the line registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Every bank slot is taken.
    Full,
    /// No contiguous range of global numbers is large enough.
    NoSpace,
    /// A bank without lines cannot be registered.
    Empty,
}

/// Global numbers handed to a registered bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineRange {
    pub base: u16,
    pub count: u8,
    slot: usize,
}

impl LineRange {
    pub fn contains(&self, global: u16) -> bool {
        global >= self.base && global - self.base < u16::from(self.count)
    }
}

#[derive(Clone, Copy)]
struct Entry {
    label: &'static str,
    range: LineRange,
}

/// Registers up to `N` banks in a number space of `capacity` lines.
///
/// Bases are assigned first-fit from zero.
pub struct LineRegistry<const N: usize> {
    entries: [Option<Entry>; N],
    capacity: u16,
}

impl<const N: usize> LineRegistry<N> {
    pub const fn new(capacity: u16) -> Self {
        Self {
            entries: [None; N],
            capacity,
        }
    }

    /// Map a global line number to the owning bank's label and local index.
    pub fn resolve(&self, global: u16) -> Option<(&'static str, u8)> {
        self.entries
            .iter()
            .flatten()
            .find(|e| e.range.contains(global))
            .map(|e| (e.label, (global - e.range.base) as u8))
    }

    fn find_base(&self, count: u8) -> Option<u16> {
        let count = u16::from(count);
        let mut base = 0u16;
        loop {
            let end = base.checked_add(count)?;
            if end > self.capacity {
                return None;
            }
            let overlap = self.entries.iter().flatten().find(|e| {
                let e_end = e.range.base + u16::from(e.range.count);
                base < e_end && e.range.base < end
            });
            match overlap {
                Some(e) => base = e.range.base + u16::from(e.range.count),
                None => return Some(base),
            }
        }
    }
}

impl<const N: usize> Registrar for LineRegistry<N> {
    type Handle = LineRange;
    type RegistrarError = RegistryError;

    fn register(&mut self, registration: &Registration) -> Result<LineRange, RegistryError> {
        if registration.line_count == 0 {
            return Err(RegistryError::Empty);
        }
        let slot = self
            .entries
            .iter()
            .position(Option::is_none)
            .ok_or(RegistryError::Full)?;
        let base = self
            .find_base(registration.line_count)
            .ok_or(RegistryError::NoSpace)?;

        let range = LineRange {
            base,
            count: registration.line_count,
            slot,
        };
        self.entries[slot] = Some(Entry {
            label: registration.label,
            range,
        });
        Ok(range)
    }

    fn unregister(&mut self, handle: LineRange) {
        if let Some(entry) = self.entries.get_mut(handle.slot) {
            if entry.is_some_and(|e| e.range == handle) {
                *entry = None;
            }
        }
    }
}
