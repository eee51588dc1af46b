//! Per-pass state: index ↔ object maps, the typed side channel, and collected diagnostics.
//!
//! A context is created by the pass driver, lent to every handler it invokes, and dropped when
//! the pass ends; nothing in it outlives the pass.

mod export;
mod import;
mod side;

pub use export::*;
pub use import::*;
pub use side::*;
