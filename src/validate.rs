//! Stateless structural & numeric checks over extension records.
//!
//! Every check returns a [Validation] instead of failing: hard errors mark a record as
//! structurally impossible, warnings mark values that are representable but physically unusual.
//! Nothing is ever clamped or truncated here; callers decide what to do with the result.

mod audio;
mod joint;
mod physics;
mod sky;
mod social;

use std::fmt;

pub use audio::*;
pub use joint::*;
pub use physics::*;
pub use sky::*;
pub use social::*;

use crate::{settings::ValidationSettings, Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Validation {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            warnings: Vec::new(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            errors: Vec::new(),
            warnings: vec![message.into()],
        }
    }

    /// Valid iff no errors were recorded; warnings don't affect validity.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[inline]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    #[inline]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    #[inline]
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    #[inline]
    pub fn push_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Union the error & warning lists of both results.
    #[must_use]
    pub fn merge(mut self, other: Validation) -> Self {
        self.absorb(other);
        self
    }

    pub fn absorb(&mut self, other: Validation) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Prefix every message with `context`, e.g. `shapes[2]`.
    #[must_use]
    pub fn with_context(self, context: impl fmt::Display) -> Self {
        let prefix = |m: String| format!("{context}: {m}");
        Self {
            errors: self.errors.into_iter().map(prefix).collect(),
            warnings: self.warnings.into_iter().map(prefix).collect(),
        }
    }

    /// Turn the result into a hard pass/fail according to `settings`.
    ///
    /// On success, the (possibly empty) list of warnings is handed back for reporting.
    pub fn into_result(self, settings: &ValidationSettings) -> Result<Self> {
        if !self.is_valid() {
            return Err(Error::ValidationFailed(self));
        }
        if settings.warnings_as_errors && !self.warnings.is_empty() {
            return Err(Error::ValidationFailed(Self {
                errors: self.warnings,
                warnings: Vec::new(),
            }));
        }
        Ok(self)
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() && self.warnings.is_empty() {
            return write!(f, "valid");
        }
        for e in &self.errors {
            writeln!(f, "error: {e}")?;
        }
        for w in &self.warnings {
            writeln!(f, "warning: {w}")?;
        }
        Ok(())
    }
}

// field checks shared by the per-extension validators

pub(crate) fn check_max_len(v: &mut Validation, field: &str, value: Option<&str>, max: usize) {
    if let Some(value) = value {
        let len = value.chars().count();
        if len > max {
            v.push_error(format!(
                "{field} is {len} characters long; the maximum is {max}"
            ));
        }
    }
}

pub(crate) fn check_required(v: &mut Validation, field: &str, value: &str) {
    if value.is_empty() {
        v.push_error(format!("{field} is required"));
    }
}

pub(crate) fn check_positive(v: &mut Validation, field: &str, value: f32) {
    // negated so that NaN fails too
    if !(value > 0.0) {
        v.push_error(format!("{field} must be greater than 0 (got {value})"));
    }
}

pub(crate) fn check_non_negative(v: &mut Validation, field: &str, value: f32) {
    if !(value >= 0.0) {
        v.push_error(format!("{field} must not be negative (got {value})"));
    }
}

pub(crate) fn check_finite(v: &mut Validation, field: &str, values: &[f32]) {
    if values.iter().any(|x| !x.is_finite()) {
        v.push_error(format!("{field} must be finite (got {values:?})"));
    }
}

pub(crate) fn warn_outside(v: &mut Validation, field: &str, value: f32, min: f32, max: f32) {
    if value < min || value > max {
        v.push_warning(format!(
            "{field} ({value}) is outside the expected range [{min}, {max}]"
        ));
    }
}
