//! Small pieces shared by every crate in the workspace.

mod canonical;
mod defaulted;

pub use canonical::*;
pub use defaulted::*;
