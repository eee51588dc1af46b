//! Conversion between extension records and host primitives.

mod body;
mod coords;
mod shape;

pub use body::*;
pub use coords::*;
pub use shape::*;

use crate::diagnostics::Diagnostic;

/// The result of a conversion which may have lost information.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted<T> {
    pub value: T,
    /// Set when a round-trip through this conversion won't reproduce the input exactly.
    pub lossy: Option<String>,
}

impl<T> Converted<T> {
    #[inline]
    pub fn exact(value: T) -> Self {
        Self { value, lossy: None }
    }

    #[inline]
    pub fn lossy(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            lossy: Some(reason.into()),
        }
    }

    #[inline]
    pub fn is_lossy(&self) -> bool {
        self.lossy.is_some()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Converted<U> {
        Converted {
            value: f(self.value),
            lossy: self.lossy,
        }
    }

    /// Split into the value and a lossy-conversion diagnostic, if any.
    pub fn into_parts(self) -> (T, Option<Diagnostic>) {
        (self.value, self.lossy.map(Diagnostic::lossy))
    }
}
