//! Type system utilities and aliases.
//!
//! - [`aliases`]: collaborator handles

pub mod aliases;

pub use aliases::*;
